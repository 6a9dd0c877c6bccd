/// Lowercases `s` one character at a time.
///
/// Both search paths fold through here. `str::to_lowercase` is context
/// sensitive (a word-final `Σ` becomes `ς`), which a per-character `ILIKE`
/// never does.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_case_is_per_character() {
        assert_eq!(fold_case("Senior RUST"), "senior rust");
        assert_eq!(fold_case("ΟΔΟΣ"), "οδοσ");
        assert_eq!(fold_case("ΟΣ"), "οσ");
    }
}
