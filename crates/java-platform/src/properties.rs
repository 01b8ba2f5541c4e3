//! Java properties documents.
//!
//! Entries keep their insertion order so generated files read like the
//! hand-written references shipped with the services. Values are escaped only
//! where the format requires it: backslashes and line breaks.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::FormatError;

/// Flat, insertion-ordered `key=value` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesFile {
    entries: Vec<(String, String)>,
}

impl PropertiesFile {
    /// Builds an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Appends an entry, consuming and returning the document.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Looks up the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the document holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the document as text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::DuplicateKey`] when a key repeats and
    /// [`FormatError::InvalidKey`] when a key is empty or contains characters
    /// the format treats as separators.
    pub fn render(&self) -> Result<String, FormatError> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut text = String::new();
        for (key, value) in &self.entries {
            validate_key(key)?;
            if !seen.insert(key.as_str()) {
                return Err(FormatError::DuplicateKey { key: key.clone() });
            }
            text.push_str(key);
            text.push('=');
            text.push_str(&escape_value(value));
            text.push('\n');
        }
        Ok(text)
    }

    /// Renders the document into `writer`.
    ///
    /// # Errors
    ///
    /// Propagates [`PropertiesFile::render`] failures and write errors.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let text = self.render()?;
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| FormatError::write(None, source))
    }

    /// Renders the document to a UTF-8 file at `path`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Propagates [`PropertiesFile::render`] failures and write errors.
    pub fn write_to_file(&self, path: &Path) -> Result<(), FormatError> {
        let text = self.render()?;
        fs::write(path, text).map_err(|source| FormatError::write(Some(path.to_path_buf()), source))
    }
}

impl<K, V> FromIterator<(K, V)> for PropertiesFile
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn validate_key(key: &str) -> Result<(), FormatError> {
    let invalid = key.is_empty()
        || key
            .chars()
            .any(|ch| matches!(ch, '=' | ':' | '#' | '!' | '\\') || ch.is_whitespace());
    if invalid {
        return Err(FormatError::InvalidKey {
            key: key.to_owned(),
        });
    }
    Ok(())
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn renders_in_insertion_order() {
        let file = PropertiesFile::new()
            .with("zeta", "1")
            .with("alpha", "2")
            .with("mid.key", "3");
        assert_eq!(file.render().expect("render"), "zeta=1\nalpha=2\nmid.key=3\n");
    }

    #[test]
    fn rejects_duplicate_keys() {
        let file = PropertiesFile::new().with("a", "1").with("a", "2");
        let error = file.render().expect_err("duplicate must fail");
        assert!(matches!(error, FormatError::DuplicateKey { key } if key == "a"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::equals("a=b")]
    #[case::space("a b")]
    #[case::colon("a:b")]
    fn rejects_unwritable_keys(#[case] key: &str) {
        let file = PropertiesFile::new().with(key, "v");
        assert!(matches!(
            file.render(),
            Err(FormatError::InvalidKey { .. })
        ));
    }

    #[rstest]
    #[case::plain("INFO,console,file", "INFO,console,file")]
    #[case::backslash(r"C:\data", r"C:\\data")]
    #[case::newline("a\nb", r"a\nb")]
    #[case::pattern("[%d] %p %m (%c)%n", "[%d] %p %m (%c)%n")]
    fn escapes_only_what_the_format_requires(#[case] value: &str, #[case] expected: &str) {
        let file = PropertiesFile::new().with("k", value);
        assert_eq!(file.render().expect("render"), format!("k={expected}\n"));
    }

    #[test]
    fn writes_utf8_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.properties");
        PropertiesFile::new()
            .with("name", "héllo")
            .write_to_file(&path)
            .expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "name=héllo\n");
    }

    #[test]
    fn reports_missing_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("out.properties");
        let error = PropertiesFile::new()
            .with("k", "v")
            .write_to_file(&path)
            .expect_err("write must fail");
        assert!(matches!(error, FormatError::Write { path: Some(_), .. }));
    }
}
