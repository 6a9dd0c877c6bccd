//! Translation of a [`PageRequest`] into a PostgREST query on the `jobs`
//! table.
//!
//! The query is kept as a typed value so that it can be rendered to URL
//! parameters for the remote store, or evaluated directly by an in-memory
//! store.

use std::fmt;

use chrono::NaiveDate;

use crate::job::JobId;
use crate::page::PageRequest;
use crate::text::fold_case;

/// Name of the remote collection.
pub const JOBS_TABLE: &str = "jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    JobTitle,
    Company,
    DatePosted,
    Tags,
    Url,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::JobTitle => "job_title",
            Column::Company => "company",
            Column::DatePosted => "date_posted",
            Column::Tags => "tags",
            Column::Url => "url",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SQL `LIKE` pattern: `%` and `_` are wildcards, `\` escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnySequence,
    AnyChar,
    Literal(char),
}

impl LikePattern {
    /// Pattern matching any value that contains `text` literally.
    pub fn containing(text: &str) -> Self {
        let mut pattern = String::with_capacity(text.len() + 2);
        pattern.push('%');
        for c in text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Evaluates the pattern the way Postgres `ILIKE` does.
    pub fn matches_ignore_case(&self, value: &str) -> bool {
        let tokens = self.tokens();
        let text: Vec<char> = fold_case(value).chars().collect();

        let (mut p, mut t) = (0, 0);
        // Position of the last `%` seen, and the text index it was tried at.
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match tokens.get(p) {
                Some(LikeToken::AnySequence) => {
                    backtrack = Some((p, t));
                    p += 1;
                    continue;
                }
                Some(LikeToken::AnyChar) => {
                    p += 1;
                    t += 1;
                    continue;
                }
                Some(LikeToken::Literal(c)) if *c == text[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
            match backtrack {
                Some((star, from)) => {
                    p = star + 1;
                    t = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            }
        }

        tokens[p..].iter().all(|token| *token == LikeToken::AnySequence)
    }

    /// The same match as a case-insensitive POSIX regex, for PostgREST's
    /// `imatch`. PostgREST rewrites `*` to `%` inside `like`/`ilike` values,
    /// so a literal `*` can only be sent this way.
    pub fn to_regex(&self) -> String {
        let tokens = self.tokens();
        let open_start = tokens.first() == Some(&LikeToken::AnySequence);
        let open_end = tokens.last() == Some(&LikeToken::AnySequence);

        let mut body: &[LikeToken] = &tokens;
        while let [LikeToken::AnySequence, rest @ ..] = body {
            body = rest;
        }
        while let [rest @ .., LikeToken::AnySequence] = body {
            body = rest;
        }

        let mut regex = String::with_capacity(body.len() + 2);
        if !open_start {
            regex.push('^');
        }
        for token in body {
            match token {
                LikeToken::AnySequence => regex.push_str(".*"),
                LikeToken::AnyChar => regex.push('.'),
                LikeToken::Literal(c) => {
                    if "\\^$.|?*+()[]{}".contains(*c) {
                        regex.push('\\');
                    }
                    regex.push(*c);
                }
            }
        }
        if !open_end {
            regex.push('$');
        }
        regex
    }

    fn tokens(&self) -> Vec<LikeToken> {
        let mut tokens = Vec::new();
        let mut chars = self.0.chars();
        while let Some(c) = chars.next() {
            match c {
                '%' => tokens.push(LikeToken::AnySequence),
                '_' => tokens.push(LikeToken::AnyChar),
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        tokens.extend(escaped.to_lowercase().map(LikeToken::Literal));
                    }
                }
                other => tokens.extend(other.to_lowercase().map(LikeToken::Literal)),
            }
        }
        tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// At least one of `columns` matches `pattern`, case-insensitively.
    AnyIlike {
        columns: Vec<Column>,
        pattern: LikePattern,
    },
    /// The array `column` contains every one of `values`.
    Contains { column: Column, values: Vec<String> },
    /// The date `column` is on or after `date`. `NULL` never passes.
    OnOrAfter { column: Column, date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub descending: bool,
    pub nulls_last: bool,
}

impl Order {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            descending: false,
            nulls_last: true,
        }
    }

    pub fn desc_nulls_last(column: Column) -> Self {
        Self {
            column,
            descending: true,
            nulls_last: true,
        }
    }

    /// The null placement is only spelled out where it differs from the
    /// Postgres default (last ascending, first descending).
    fn render(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        match (self.descending, self.nulls_last) {
            (true, true) => format!("{}.{direction}.nullslast", self.column),
            (false, false) => format!("{}.{direction}.nullsfirst", self.column),
            _ => format!("{}.{direction}", self.column),
        }
    }
}

/// A filtered, ordered and ranged read of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub predicates: Vec<Predicate>,
    pub order: Vec<Order>,
    pub offset: u64,
    pub limit: u32,
}

impl JobQuery {
    /// Builds the store query for one page of the filtered listing.
    ///
    /// Newest postings first, undated ones last, ties by id.
    pub fn from_request(request: &PageRequest, today: NaiveDate) -> Self {
        let filters = &request.filters;
        let mut predicates = Vec::new();

        if !filters.search_text.is_empty() {
            predicates.push(Predicate::AnyIlike {
                columns: vec![Column::JobTitle, Column::Company],
                pattern: LikePattern::containing(&filters.search_text),
            });
        }
        if !filters.selected_tags.is_empty() {
            predicates.push(Predicate::Contains {
                column: Column::Tags,
                values: filters.selected_tags.iter().cloned().collect(),
            });
        }
        if let Some(date) = filters.date_filter.lower_bound(today) {
            predicates.push(Predicate::OnOrAfter {
                column: Column::DatePosted,
                date,
            });
        }

        Self {
            predicates,
            order: vec![
                Order::desc_nulls_last(Column::DatePosted),
                Order::asc(Column::Id),
            ],
            offset: request.offset(),
            limit: request.limit(),
        }
    }

    /// PostgREST query-string parameters, unencoded.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for predicate in &self.predicates {
            params.push(match predicate {
                Predicate::AnyIlike { columns, pattern } => {
                    let alternatives: Vec<String> = columns
                        .iter()
                        .map(|column| format!("{column}.imatch.{}", quote(&pattern.to_regex())))
                        .collect();
                    ("or".to_string(), format!("({})", alternatives.join(",")))
                }
                Predicate::Contains { column, values } => {
                    let elements: Vec<String> = values.iter().map(|v| quote(v)).collect();
                    (column.to_string(), format!("cs.{{{}}}", elements.join(",")))
                }
                Predicate::OnOrAfter { column, date } => {
                    (column.to_string(), format!("gte.{}", date.format("%Y-%m-%d")))
                }
            });
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(Order::render).collect();
            params.push(("order".to_string(), order.join(",")));
        }
        params.push(("offset".to_string(), self.offset.to_string()));
        params.push(("limit".to_string(), self.limit.to_string()));
        params
    }
}

/// Parameters for fetching a single row by id.
pub fn detail_params(id: &JobId) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        (Column::Id.to_string(), format!("eq.{}", quote(id.as_str()))),
        ("limit".to_string(), "1".to_string()),
    ]
}

/// Parameters for finding the id of the row already holding `url`.
pub fn url_lookup_params(url: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), Column::Id.to_string()),
        (Column::Url.to_string(), format!("eq.{}", quote(url))),
        ("limit".to_string(), "1".to_string()),
    ]
}

/// Filter that targets exactly one row by id, for updates.
pub fn id_filter(id: &JobId) -> (String, String) {
    (Column::Id.to_string(), format!("eq.{}", quote(id.as_str())))
}

/// Parameters for reading the `tags` column of every row.
pub fn tag_catalog_params() -> Vec<(String, String)> {
    vec![("select".to_string(), Column::Tags.to_string())]
}

/// Total row count from a `Content-Range` header such as `0-9/42` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

// PostgREST reserves `,.:()` in filter values; a double-quoted value may
// contain anything once `"` and `\` are escaped.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
