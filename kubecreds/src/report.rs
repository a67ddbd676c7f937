use std::fmt;

use base64::Engine;

/// Longest value shown in full in a change summary.
const SHOW_IN_FULL: usize = 15;

/// Shortens a secret for display: anything longer than 15 characters becomes
/// its first and last five characters around `...`.
pub fn shorten(s: &str) -> String {
    let len = s.chars().count();
    if len <= SHOW_IN_FULL {
        return s.to_owned();
    }
    let head: String = s.chars().take(5).collect();
    let tail: String = s.chars().skip(len - 5).collect();
    format!("{head}...{tail}")
}

/// Base64-encodes `data` and shortens it, or `<empty>` for no data.
pub fn shorten_bytes(data: &[u8]) -> String {
    if data.is_empty() {
        return "<empty>".to_owned();
    }
    shorten(&base64::engine::general_purpose::STANDARD.encode(data))
}

/// What a merge changed, one line per field, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog(Vec<String>);

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: impl Into<String>) {
        self.0.push(change.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ChangeLog {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(w, "Summary of changes:")?;
        if self.0.is_empty() {
            return writeln!(w, "No changes made.");
        }
        for change in &self.0 {
            writeln!(w, "- {change}")?;
        }
        Ok(())
    }
}
