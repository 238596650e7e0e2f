//! Scene documents: the persisted marker lists of a project

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CameraRecord, FireRecord};

/// Committed markers of a project, as saved and loaded by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub fires: Vec<FireRecord>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub cameras: Vec<CameraRecord>,
}

impl SceneDocument {
    pub fn new(fires: Vec<FireRecord>, cameras: Vec<CameraRecord>) -> Self {
        Self { fires, cameras }
    }

    /// Parse a scene document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_empty(&self) -> bool {
        self.fires.is_empty() && self.cameras.is_empty()
    }
}

/// Accept an array of records; anything else (null, object, string) is an empty list.
fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lists_normalize_to_empty() {
        let doc = SceneDocument::from_json("{}").unwrap();
        assert!(doc.is_empty());

        let doc = SceneDocument::from_json(r#"{"fires": null, "cameras": "nope"}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_lists_are_read() {
        let json = r#"{
            "fires": [{"name": "A", "x": 1, "y": 0, "z": 2, "scale": 1}],
            "cameras": [{"name": "C", "x": 0, "y": 2, "z": 0, "yaw": 90, "pitch": -10}]
        }"#;
        let doc = SceneDocument::from_json(json).unwrap();
        assert_eq!(doc.fires.len(), 1);
        assert_eq!(doc.cameras[0].yaw, 90.0);

        let again = SceneDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again, doc);
    }
}
