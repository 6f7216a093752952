use app_helpers::time::parse_timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Offset into the source video where segmentation starts.
///
/// Written by hand in the manifest, either as a number of seconds or as a timestamp string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skip {
    Seconds(u64),
    Timestamp(String),
    /// Anything else (negative, fractional, ...), rejected when the job runs
    Other(Value),
}

impl Skip {
    /// `Ok(None)` for an empty timestamp string.
    pub fn seconds(&self) -> Result<Option<u64>, String> {
        match self {
            Self::Seconds(seconds) => Ok(Some(*seconds)),
            Self::Timestamp(value) if value.trim().is_empty() => Ok(None),
            Self::Timestamp(value) => parse_timestamp(value).map(Some),
            Self::Other(value) => Err(format!(
                "Invalid skip {value}, expected whole seconds or HH:MM:SS"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Name of the source file inside the input directory
    pub filename: String,

    /// Naming root for the output segments, filled in by hand
    #[serde(default, deserialize_with = "null_as_empty")]
    pub base_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Skip>,

    /// Keys we don't know about, kept so that user notes survive a rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDescriptor {
    /// A freshly scanned file, waiting for a `base_name` to be filled in.
    #[must_use]
    pub fn pending<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            base_name: String::new(),
            directory_name: Some(String::new()),
            skip: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.base_name.trim().is_empty()
    }

    /// Folder the segments are grouped under: `directory_name`, or `base_name` if that is empty.
    #[must_use]
    pub fn folder_name(&self) -> &str {
        self.directory_name
            .as_deref()
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .unwrap_or_else(|| self.base_name.trim())
    }

    pub fn skip_seconds(&self) -> Result<Option<u64>, String> {
        self.skip.as_ref().map_or(Ok(None), Skip::seconds)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> JobDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_and_numeric_skip_are_equivalent() {
        let as_text = parse(json!({"filename": "a.mp4", "base_name": "a", "skip": "00:05:30"}));
        let as_number = parse(json!({"filename": "a.mp4", "base_name": "a", "skip": 330}));

        assert_eq!(as_text.skip_seconds(), Ok(Some(330)));
        assert_eq!(as_text.skip_seconds(), as_number.skip_seconds());
    }

    #[test]
    fn empty_or_missing_skip_means_no_offset() {
        assert_eq!(parse(json!({"filename": "a.mp4", "skip": ""})).skip_seconds(), Ok(None));
        assert_eq!(parse(json!({"filename": "a.mp4"})).skip_seconds(), Ok(None));
    }

    #[test]
    fn bad_skip_is_reported() {
        let d = parse(json!({"filename": "a.mp4", "base_name": "a", "skip": "soon"}));

        assert!(d.skip_seconds().is_err());
    }

    #[test]
    fn negative_or_fractional_skip_is_reported_not_rejected() {
        let negative = parse(json!({"filename": "a.mp4", "base_name": "a", "skip": -5}));
        let fractional = parse(json!({"filename": "a.mp4", "base_name": "a", "skip": 12.5}));

        assert_eq!(negative.skip, Some(Skip::Other(json!(-5))));
        assert!(negative.skip_seconds().is_err());
        assert!(fractional.skip_seconds().is_err());
        assert_eq!(
            serde_json::to_value(&negative).unwrap(),
            json!({"filename": "a.mp4", "base_name": "a", "skip": -5})
        );
    }

    #[test]
    fn missing_or_null_base_name_is_not_ready() {
        assert!(!parse(json!({"filename": "a.mp4"})).is_ready());
        assert!(!parse(json!({"filename": "a.mp4", "base_name": null})).is_ready());
        assert!(!parse(json!({"filename": "a.mp4", "base_name": "  "})).is_ready());
        assert!(parse(json!({"filename": "a.mp4", "base_name": "holiday"})).is_ready());
    }

    #[test]
    fn folder_name_falls_back_to_base_name() {
        let grouped = parse(json!({
            "filename": "a.mp4",
            "base_name": "beach",
            "directory_name": "family"
        }));
        let blank = parse(json!({"filename": "a.mp4", "base_name": "beach", "directory_name": ""}));
        let absent = parse(json!({"filename": "a.mp4", "base_name": "beach"}));

        assert_eq!(grouped.folder_name(), "family");
        assert_eq!(blank.folder_name(), "beach");
        assert_eq!(absent.folder_name(), "beach");
    }

    #[test]
    fn unknown_keys_survive_roundtrip() {
        let input = json!({
            "filename": "a.mp4",
            "base_name": "a",
            "skip": 12,
            "note": "audio drifts after 10 min"
        });

        let output = serde_json::to_value(parse(input.clone())).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn pending_descriptor_matches_scan_template() {
        let value = serde_json::to_value(JobDescriptor::pending("clip.mkv")).unwrap();

        assert_eq!(
            value,
            json!({"filename": "clip.mkv", "base_name": "", "directory_name": ""})
        );
    }
}
