//! Wordlist loading

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::WordlistError;

/// How raw lines become words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordlistOptions {
    /// Drop a trailing `\r` so CRLF files behave like LF files
    pub strip_carriage_returns: bool,
    /// Drop lines that are empty after normalization
    pub skip_empty: bool,
    /// Drop lines starting with `#`
    pub skip_comments: bool,
    /// Keep only the first occurrence of each word
    pub dedupe: bool,
}

impl Default for WordlistOptions {
    fn default() -> Self {
        Self {
            strip_carriage_returns: true,
            skip_empty: false,
            skip_comments: false,
            dedupe: false,
        }
    }
}

/// An ordered list of words, one per line of the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    /// Load a wordlist file in full
    ///
    /// Invalid UTF-8 is replaced rather than rejected; wordlists in the wild
    /// are often Latin-1.
    pub fn from_file(path: &Path, options: &WordlistOptions) -> Result<Self, WordlistError> {
        let bytes = std::fs::read(path).map_err(|source| WordlistError::ReadError {
            path: path.display().to_string(),
            source,
        })?;

        let wordlist = Self::parse(&String::from_utf8_lossy(&bytes), options);
        tracing::info!(
            path = %path.display(),
            words = wordlist.len(),
            "Loaded wordlist"
        );
        Ok(wordlist)
    }

    /// Split text on `\n` into words
    ///
    /// The newline terminating the last line does not start another word.
    /// This departs from a plain split on purpose: a file ending in `\n`
    /// never requests the bare base URL for a trailing empty segment. Interior
    /// empty lines are kept unless `skip_empty` is set.
    pub fn parse(contents: &str, options: &WordlistOptions) -> Self {
        if contents.is_empty() {
            return Self::default();
        }

        let body = contents.strip_suffix('\n').unwrap_or(contents);
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        let words = body
            .split('\n')
            .map(|line| {
                if options.strip_carriage_returns {
                    line.strip_suffix('\r').unwrap_or(line)
                } else {
                    line
                }
            })
            .filter(|word| {
                let keep = !(options.skip_empty && word.is_empty())
                    && !(options.skip_comments && word.starts_with('#'))
                    && (!options.dedupe || seen.insert(*word));
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .map(str::to_string)
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, "Filtered wordlist entries");
        }

        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
