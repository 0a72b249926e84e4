//! Minimal INI-style configuration files.
//!
//! The format understood here:
//!
//! ```text
//! # comment
//! ; also a comment
//! [references]
//! bird1 = /refs/bird1.fasta
//! bird2: /refs/bird2.fasta
//!
//! [individuals]
//! bird1
//! bird2
//! ```
//!
//! Section and key names are case-sensitive. Keys may appear without a value. Repeating a
//! section header or a key within a section is an error, as is any line before the first
//! section header. Sections and keys keep their file order.

use std::fs;
use std::path::Path;

use crate::errors::{HapbalError, Result};

/// One `[section]` with its entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, Option<String>)>,
}

impl Section {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(key, value)` pairs in file order; value-less keys yield `None`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).and_then(|(_, value)| value.as_deref())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniConfig {
    sections: Vec<Section>,
}

fn malformed(line_number: usize, reason: impl std::fmt::Display) -> HapbalError {
    HapbalError::Configuration { reason: format!("line {line_number}: {reason}") }
}

impl IniConfig {
    /// Parses configuration text.
    ///
    /// # Errors
    /// Returns [`HapbalError::Configuration`] naming the offending line for malformed headers,
    /// entries outside a section, empty keys, or duplicate sections or keys.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: Vec<Section> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| malformed(line_number, format!("malformed section header '{line}'")))?;
                if sections.iter().any(|s| s.name == name) {
                    return Err(malformed(line_number, format!("duplicate section [{name}]")));
                }
                sections.push(Section { name: name.to_string(), entries: Vec::new() });
                continue;
            }

            let Some(section) = sections.last_mut() else {
                return Err(malformed(line_number, format!("entry '{line}' outside of any section")));
            };

            let (key, value) = match line.find(['=', ':']) {
                Some(pos) => (line[..pos].trim(), Some(line[pos + 1..].trim().to_string())),
                None => (line, None),
            };
            if key.is_empty() {
                return Err(malformed(line_number, format!("missing key in '{line}'")));
            }
            if section.contains_key(key) {
                return Err(malformed(
                    line_number,
                    format!("duplicate key '{key}' in section [{}]", section.name),
                ));
            }
            section.entries.push((key.to_string(), value));
        }

        Ok(Self { sections })
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// Returns [`HapbalError::Configuration`] if the file cannot be read or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| HapbalError::Configuration {
            reason: format!("cannot read '{}': {e}", path.display()),
        })?;
        Self::parse(&text).map_err(|e| match e {
            HapbalError::Configuration { reason } => {
                HapbalError::Configuration { reason: format!("{}: {reason}", path.display()) }
            }
            other => other,
        })
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const EXAMPLE: &str = "\
# run configuration
[references]
bird2 = /refs/bird2.fasta
bird1: /refs/bird1.fasta
  ; indented comment

[individuals]
bird2
bird1 =
";

    #[test]
    fn test_parse_preserves_order_and_separators() {
        let config = IniConfig::parse(EXAMPLE).unwrap();
        let names: Vec<_> = config.sections().map(Section::name).collect();
        assert_eq!(names, vec!["references", "individuals"]);

        let references = config.section("references").unwrap();
        assert_eq!(references.keys().collect::<Vec<_>>(), vec!["bird2", "bird1"]);
        assert_eq!(references.get("bird1"), Some("/refs/bird1.fasta"));
        assert_eq!(references.get("bird2"), Some("/refs/bird2.fasta"));

        let individuals = config.section("individuals").unwrap();
        assert_eq!(individuals.len(), 2);
        assert_eq!(individuals.get("bird2"), None);
        assert!(individuals.contains_key("bird2"));
        assert_eq!(individuals.get("bird1"), Some(""));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let config = IniConfig::parse("[references]\nBird1 = a\nbird1 = b\n").unwrap();
        let references = config.section("references").unwrap();
        assert_eq!(references.get("Bird1"), Some("a"));
        assert_eq!(references.get("bird1"), Some("b"));
        assert!(!config.has_section("References"));
    }

    #[rstest]
    #[case("[references]\na = 1\na = 2\n", "line 3: duplicate key 'a'")]
    #[case("[references]\n[references]\n", "line 2: duplicate section [references]")]
    #[case("a = 1\n", "line 1: entry 'a = 1' outside of any section")]
    #[case("[references\n", "line 1: malformed section header")]
    #[case("[]\n", "line 1: malformed section header")]
    #[case("[references]\n= value\n", "line 2: missing key")]
    fn test_malformed_configuration(#[case] text: &str, #[case] expected: &str) {
        let err = IniConfig::parse(text).unwrap_err();
        assert!(matches!(err, HapbalError::Configuration { .. }));
        assert!(err.to_string().contains(expected), "{err}");
    }

    #[test]
    fn test_from_path_reports_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phasing.conf");
        fs::write(&path, "[references]\nx = 1\nx = 2\n").unwrap();
        let err = IniConfig::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("phasing.conf: line 3"), "{err}");

        let err = IniConfig::from_path(dir.path().join("absent.conf")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_empty_text_has_no_sections() {
        let config = IniConfig::parse("# nothing here\n\n").unwrap();
        assert_eq!(config.sections().count(), 0);
    }
}
