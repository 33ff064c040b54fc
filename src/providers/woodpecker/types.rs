//! Raw Woodpecker API payloads.
//!
//! Every field is optional and tolerant: a missing key, `null`, or a value of
//! the wrong JSON type all decode as `None`. Defaults are applied later, in
//! [`super::normalize`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Entry of `GET /api/user/repos`.
#[derive(Debug, Default, Deserialize)]
pub struct RawRepo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_pipeline: Option<RawPipeline>,
}

/// Pipeline record, embedded in a repo or listed by `/api/repos/{id}/pipelines`.
#[derive(Debug, Default, Deserialize)]
pub struct RawPipeline {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub number: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub branch: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub commit: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub started: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub finished: Option<i64>,
}

/// Response of `GET /api/repos/{id}/pipelines/{number}`.
///
/// Carries the same fields as [`RawPipeline`]; only the workflow tree is read.
#[derive(Debug, Default, Deserialize)]
pub struct RawPipelineDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub workflows: Option<Vec<RawWorkflow>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawWorkflow {
    #[serde(default, deserialize_with = "lenient")]
    pub children: Option<Vec<RawStep>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawStep {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
}

/// Decodes a field, mapping any type mismatch to `None` instead of failing
/// the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_decode_as_none() {
        let raw: RawPipeline = serde_json::from_value(json!({})).unwrap();
        assert!(raw.id.is_none());
        assert!(raw.status.is_none());
        assert!(raw.created.is_none());
    }

    #[test]
    fn test_wrong_types_decode_as_none() {
        let raw: RawPipeline = serde_json::from_value(json!({
            "id": "not-a-number",
            "number": 7,
            "message": 42,
            "started": null,
        }))
        .unwrap();

        assert!(raw.id.is_none());
        assert_eq!(raw.number, Some(7));
        assert!(raw.message.is_none());
        assert!(raw.started.is_none());
    }

    #[test]
    fn test_null_last_pipeline() {
        let raw: RawRepo = serde_json::from_value(json!({
            "id": 3,
            "active": true,
            "last_pipeline": null,
        }))
        .unwrap();

        assert_eq!(raw.id, Some(3));
        assert!(raw.last_pipeline.is_none());
    }

    #[test]
    fn test_step_type_field() {
        let raw: RawStep = serde_json::from_value(json!({
            "name": "clone",
            "state": "success",
            "type": "clone",
        }))
        .unwrap();

        assert_eq!(raw.kind.as_deref(), Some("clone"));
    }
}
