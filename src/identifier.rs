//! Conversion of free-form sheet and column labels into SQLite identifiers.

use std::collections::HashMap;

use tracing::info;

/// Identifier used when a label is missing or normalizes to nothing.
pub const FALLBACK_IDENTIFIER: &str = "unnamed_column";

/// Prefix added to identifiers that would otherwise start with a digit.
const DIGIT_PREFIX: &str = "col_";

/// Normalizes a raw label into a non-empty identifier made of ASCII letters,
/// digits, and single inner underscores that never starts with a digit.
///
/// The function is total: missing, blank, or punctuation-only labels map to
/// [`FALLBACK_IDENTIFIER`].
pub fn normalize(label: Option<&str>) -> String {
    let Some(label) = label else {
        return FALLBACK_IDENTIFIER.to_string();
    };

    let mut cleaned = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        match ch {
            ' ' | '-' | '.' | '/' | '\\' => cleaned.push('_'),
            '(' | ')' | '[' | ']' => {}
            '&' => cleaned.push_str("and"),
            ch if ch.is_ascii_alphanumeric() || ch == '_' => cleaned.push(ch),
            _ => cleaned.push('_'),
        }
    }

    let mut collapsed = String::with_capacity(cleaned.len());
    for ch in cleaned.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }

    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        return FALLBACK_IDENTIFIER.to_string();
    }

    if trimmed.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("{DIGIT_PREFIX}{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Assigns final column identifiers for one sheet, suffixing repeated base
/// identifiers with a per-base counter (`qty`, `qty_1`, `qty_2`, ...).
///
/// Bases are compared case-insensitively because SQLite column names are.
/// A synthesized name can still collide with a later header that literally
/// normalizes to it; that collision is left to the database to reject.
#[derive(Debug, Default)]
pub struct ColumnNamer {
    counts: HashMap<String, usize>,
}

impl ColumnNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the final identifier for the next column label.
    pub fn assign(&mut self, label: Option<&str>) -> String {
        let base = normalize(label);
        match self.counts.get_mut(&base.to_lowercase()) {
            Some(count) => {
                *count += 1;
                let renamed = format!("{base}_{count}");
                info!(column = ?label, %renamed, "renaming duplicate column");
                renamed
            }
            None => {
                self.counts.insert(base.to_lowercase(), 0);
                base
            }
        }
    }
}

/// Resolves a full header row into unique column identifiers, left to right.
pub fn resolve_columns<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut namer = ColumnNamer::new();
    labels.into_iter().map(|label| namer.assign(label)).collect()
}
