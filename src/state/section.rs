//! Section record
//!
//! JSON shape: `{"a": 30000, "b": 45000, "memo": "", "recordingUri": "file://..."}`.
//! `recordingUri` is omitted until a take is committed.

use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::PlaybackRange;

/// A saved [A, B] region with its memo and optional personal take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Start in milliseconds
    pub a: u64,
    /// End in milliseconds, never before `a`
    pub b: u64,
    #[serde(default)]
    pub memo: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub recording_uri: Option<String>,
}

impl Section {
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            a,
            b,
            memo: String::new(),
            recording_uri: None,
        }
    }

    pub fn range(&self) -> PlaybackRange {
        PlaybackRange::new(self.a, self.b)
    }

    pub fn len_ms(&self) -> u64 {
        self.b.saturating_sub(self.a)
    }

    pub fn has_recording(&self) -> bool {
        self.recording_uri.is_some()
    }
}

// Older files store an empty string when a take was saved without audio.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|uri| !uri.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_section_has_empty_memo() {
        let section = Section::new(30_000, 45_000);
        assert_eq!(section.memo, "");
        assert!(!section.has_recording());
        assert_eq!(section.len_ms(), 15_000);
        assert_eq!(section.range(), PlaybackRange::new(30_000, 45_000));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Section::new(1, 2)).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2,"memo":""}"#);

        let mut section = Section::new(1, 2);
        section.recording_uri = Some("file:///take.wav".to_string());
        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains(r#""recordingUri":"file:///take.wav""#));
    }

    #[test]
    fn test_missing_memo_defaults() {
        let section: Section = serde_json::from_str(r#"{"a":10,"b":20}"#).unwrap();
        assert_eq!(section.memo, "");
        assert_eq!(section.recording_uri, None);
    }

    #[test]
    fn test_empty_recording_uri_is_none() {
        let section: Section =
            serde_json::from_str(r#"{"a":10,"b":20,"memo":"x","recordingUri":""}"#).unwrap();
        assert_eq!(section.recording_uri, None);
    }
}
