//! Filesystem-safe leaf names from user-supplied file names.

use regex::Regex;
use thiserror::Error;

/// Characters outside this set are replaced by default.
pub const DEFAULT_UNSAFE_PATTERN: &str = r"[^0-9a-zA-Z.\-_]";

/// Replacement for every unsafe character by default.
pub const DEFAULT_SUBSTITUTION: char = '_';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerConfig {
    /// regex matched against each character on its own
    pub unsafe_pattern: String,
    pub substitution: char,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            unsafe_pattern: DEFAULT_UNSAFE_PATTERN.to_string(),
            substitution: DEFAULT_SUBSTITUTION,
        }
    }
}

#[derive(Debug, Error)]
pub enum SanitizerConfigError {
    #[error("invalid unsafe-character pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The substitution would itself need sanitizing.
    #[error("substitution character {0:?} is not a safe filename character")]
    UnsafeSubstitution(char),
}

/// Maps arbitrary names to safe filesystem leaf names.
///
/// `sanitize(sanitize(x)) == sanitize(x)` for every input, and the result
/// never contains a path separator.
#[derive(Debug, Clone)]
pub struct NameSanitizer {
    unsafe_chars: Regex,
    substitution: char,
}

impl NameSanitizer {
    pub fn new(config: &SanitizerConfig) -> Result<Self, SanitizerConfigError> {
        let sanitizer = Self {
            unsafe_chars: Regex::new(&config.unsafe_pattern)?,
            substitution: config.substitution,
        };

        let sub = config.substitution;
        if sub == '.' || sanitizer.is_unsafe(sub) {
            return Err(SanitizerConfigError::UnsafeSubstitution(sub));
        }
        Ok(sanitizer)
    }

    /// Sanitize an optional name; absent names become `""`.
    pub fn sanitize(&self, name: Option<&str>) -> String {
        name.map(|name| self.sanitize_str(name)).unwrap_or_default()
    }

    pub fn sanitize_str(&self, name: &str) -> String {
        let leaf = name
            .split(is_separator)
            .filter(|segment| !segment.is_empty())
            .last()
            .unwrap_or("");

        let safe: String = leaf
            .chars()
            .map(|c| if self.is_unsafe(c) { self.substitution } else { c })
            .collect();

        // "." and ".." would still navigate
        if !safe.is_empty() && safe.chars().all(|c| c == '.') {
            return std::iter::repeat(self.substitution).take(safe.len()).collect();
        }
        safe
    }

    fn is_unsafe(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        is_separator(c) || self.unsafe_chars.is_match(c.encode_utf8(&mut buf))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}
