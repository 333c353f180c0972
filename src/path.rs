//! Structural field paths.
//!
//! A path names a field nested inside records, e.g. `leaf_name` is the `name`
//! field of the `leaf` record. The same type keys custom field overlays, where
//! the first segment is the record or embedded shape name.

use std::fmt;

/// Separator between path segments. It is the only non-alphanumeric character a
/// GraphQL name may contain, so it is stripped from every generated field name.
pub const FIELD_PATH_SEPARATOR: char = '_';

/// An ordered sequence of field name segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a path joined with [`FIELD_PATH_SEPARATOR`].
    ///
    /// Empty segments are dropped, so `""` parses to the empty path.
    ///
    /// # Example
    ///
    /// ```
    /// use nomnom_graphql::FieldPath;
    ///
    /// let path = FieldPath::parse("ground_base_id");
    /// assert_eq!(path.segments().len(), 3);
    /// assert_eq!(path.to_string(), "ground_base_id");
    /// ```
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split(FIELD_PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { segments }
    }

    /// A single segment path, typically a record or shape name.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Return a new path with `name` appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Compare two structural keys. The root segment is a type name and compares
    /// case-insensitively, field segments must match exactly.
    pub fn same_shape(&self, other: &FieldPath) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }
        let mut pairs = self.segments.iter().zip(other.segments.iter());
        match pairs.next() {
            Some((a, b)) if a.eq_ignore_ascii_case(b) => pairs.all(|(a, b)| a == b),
            Some(_) => false,
            None => true,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", FIELD_PATH_SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_parse() {
        let path = FieldPath::parse("ground_base_id");

        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[0], "ground");
        assert_eq!(path.segments()[1], "base");
        assert_eq!(path.segments()[2], "id");
    }

    #[test]
    fn test_empty_path() {
        let path = FieldPath::parse("");
        assert!(path.is_empty());
        assert_eq!(path.first(), None);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_child_and_display() {
        let path = FieldPath::root("TestBase").child("childa").child("leaf");
        assert_eq!(path.to_string(), "TestBase_childa_leaf");
        assert_eq!(FieldPath::parse(&path.to_string()), path);
    }

    #[test]
    fn test_same_shape_root_is_case_insensitive() {
        let key = FieldPath::parse("TestBase_childa");
        assert!(key.same_shape(&FieldPath::root("testbase").child("childa")));
        assert!(!key.same_shape(&FieldPath::root("testbase").child("ChildA")));
        assert!(!key.same_shape(&FieldPath::root("testbase")));
    }
}
