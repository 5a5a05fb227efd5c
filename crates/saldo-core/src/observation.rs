use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one extraction attempt. Exactly one variant is ever produced;
/// this is the system's primary output contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// A structured balance, with the signal it was derived from (matched
    /// page text or intercepted response body).
    StructuredBalance { amount: f64, source: String },
    /// A truncated snapshot of the page text, for manual inspection.
    RawContentSample { text: String },
    /// The page yielded no text at all.
    Empty,
}

impl ExtractionResult {
    pub fn is_structured(&self) -> bool {
        matches!(self, ExtractionResult::StructuredBalance { .. })
    }
}

/// One timestamped extraction outcome; the unit of record in the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub at: DateTime<Utc>,
    pub result: ExtractionResult,
}

impl Observation {
    pub fn new(at: DateTime<Utc>, result: ExtractionResult) -> Self {
        Self { at, result }
    }

    pub fn now(result: ExtractionResult) -> Self {
        Self::new(Utc::now(), result)
    }

    /// Timestamp rendered at second precision, e.g. `2026-08-29 07:30:00 UTC`.
    pub fn timestamp(&self) -> String {
        format!("{} UTC", self.at.format("%Y-%m-%d %H:%M:%S"))
    }

    /// Journal section header.
    pub fn header(&self) -> String {
        format!("## {}", self.timestamp())
    }

    /// Full journal section: header plus pretty-printed structured body.
    pub fn render(&self) -> String {
        let body = serde_json::to_string_pretty(&self.result)
            .unwrap_or_else(|_| "{}".to_string());
        format!("{}\n\n```json\n{}\n```\n", self.header(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 7, 30, 0).unwrap()
    }

    #[test]
    fn test_header_format() {
        let obs = Observation::new(fixed_time(), ExtractionResult::Empty);
        assert_eq!(obs.header(), "## 2026-08-29 07:30:00 UTC");
    }

    #[test]
    fn test_render_contains_tagged_body() {
        let obs = Observation::new(
            fixed_time(),
            ExtractionResult::StructuredBalance {
                amount: 128.5,
                source: "¥128.50".to_string(),
            },
        );

        let section = obs.render();
        assert!(section.starts_with("## 2026-08-29 07:30:00 UTC\n\n```json\n"));
        assert!(section.contains("\"kind\": \"structured_balance\""));
        assert!(section.contains("\"source\": \"¥128.50\""));
        assert!(section.ends_with("```\n"));
    }

    #[test]
    fn test_empty_serializes_with_kind_only() {
        let json = serde_json::to_string(&ExtractionResult::Empty).unwrap();
        assert_eq!(json, r#"{"kind":"empty"}"#);
    }
}
