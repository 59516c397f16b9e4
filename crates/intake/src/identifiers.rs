//! Slash-delimited identifier fields (MBL, invoice and UTR numbers).

/// Separator used by multi-valued identifier fields.
pub const SEPARATOR: char = '/';

/// Ordered identifiers parsed from a raw `/`-delimited field.
///
/// Tokens are trimmed and empty segments dropped. Duplicates are kept: every
/// occurrence is checked, and the occurrence count matters for status
/// derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet(Vec<String>);

impl IdentifierSet {
    /// Parse a raw field. Absent or blank input yields an empty set.
    pub fn parse(raw: Option<&str>) -> Self {
        let tokens = raw
            .unwrap_or_default()
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self(tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Rejoin into the canonical `/`-delimited form.
    pub fn join(&self) -> String {
        self.0.join("/")
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
