use std::collections::BTreeSet;

/// Distinct tags across all rows, sorted ascending.
pub fn distinct_tags<I, T>(tag_lists: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = String>,
{
    tag_lists
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
