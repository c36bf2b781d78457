//! Character dictionary for the plate recognizer

use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while loading a character dictionary
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Failed to read character dictionary from '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered glyph table. Class index `i` maps to `glyphs[i]`; index `len()` is
/// the CTC blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDictionary {
    glyphs: Vec<String>,
}

impl CharacterDictionary {
    /// Build a dictionary from an in-memory glyph list
    #[must_use]
    pub fn from_glyphs(glyphs: Vec<String>) -> Self {
        Self { glyphs }
    }

    /// Read a dictionary file, one glyph per line. Empty lines are kept so
    /// that class indices stay aligned with line numbers. An empty file gives
    /// an empty dictionary in which every class decodes as blank.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let glyphs: Vec<String> = content.lines().map(str::to_string).collect();
        if glyphs.is_empty() {
            warn!("Character dictionary {} is empty", path.display());
        }

        debug!(
            "Loaded {} glyphs from character dictionary {}",
            glyphs.len(),
            path.display()
        );
        Ok(Self { glyphs })
    }

    /// Number of glyphs (not counting blank)
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Class index reserved for the CTC blank symbol
    #[must_use]
    pub fn blank_index(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn glyph(&self, index: usize) -> Option<&str> {
        self.glyphs.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_dictionary_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "A").unwrap();

        let dict = CharacterDictionary::from_file(file.path()).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.blank_index(), 3);
        assert_eq!(dict.glyph(2), Some("A"));
        assert_eq!(dict.glyph(3), None);
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "A\r\nB\r\n").unwrap();

        let dict = CharacterDictionary::from_file(file.path()).unwrap();
        assert_eq!(dict.glyph(0), Some("A"));
        assert_eq!(dict.glyph(1), Some("B"));
    }

    #[test]
    fn test_missing_file() {
        let result = CharacterDictionary::from_file("/nonexistent/us_lp_characters.txt");
        assert!(matches!(result, Err(DictionaryError::Read { .. })));
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let dict = CharacterDictionary::from_file(file.path()).unwrap();
        assert!(dict.is_empty());
        assert_eq!(dict.blank_index(), 0);
    }
}
