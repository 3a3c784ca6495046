// ⚠️ Warnings - Per-reconstruction notice batch
// Every non-fatal failure lands here as a human-readable line, in the order
// it happened. One value per `reconstruct` call; nothing is shared.

use serde::{Deserialize, Serialize};

/// Lines shown ahead of a non-empty batch
pub const NOTICE_HEADER: [&str; 3] = [
    "Errors have occurred which may affect the integrity and informative value of the data collected.",
    "The following errors have occurred:",
    "#################################",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings {
    messages: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Take every message, leaving the batch empty
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Messages prefixed with [`NOTICE_HEADER`]; empty when nothing went wrong
    pub fn notice_batch(&self) -> Vec<String> {
        if self.messages.is_empty() {
            return Vec::new();
        }

        NOTICE_HEADER
            .iter()
            .map(|line| line.to_string())
            .chain(self.messages.iter().cloned())
            .collect()
    }
}

impl Extend<String> for Warnings {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.messages.extend(iter);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order() {
        let mut warnings = Warnings::new();
        warnings.record("first");
        warnings.record(String::from("second"));

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.messages(), ["first", "second"]);
    }

    #[test]
    fn test_drain_clears() {
        let mut warnings = Warnings::new();
        warnings.record("only");

        assert_eq!(warnings.drain(), vec!["only".to_string()]);
        assert!(warnings.is_empty());
        assert!(warnings.drain().is_empty());
    }

    #[test]
    fn test_notice_batch_header() {
        let mut warnings = Warnings::new();
        assert!(warnings.notice_batch().is_empty());

        warnings.record("alliance 700 unavailable");
        let batch = warnings.notice_batch();

        assert_eq!(batch.len(), NOTICE_HEADER.len() + 1);
        assert_eq!(batch[0], NOTICE_HEADER[0]);
        assert_eq!(batch.last().unwrap(), "alliance 700 unavailable");
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut warnings = Warnings::new();
        warnings.record("x");

        assert_eq!(serde_json::to_string(&warnings).unwrap(), r#"["x"]"#);
    }
}
