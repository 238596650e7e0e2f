//! Fire-origin marker types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::numeric::{
    coerce_component, coerce_scale, default_scale, lenient_component, lenient_scale,
};

/// A committed fire-origin marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_component")]
    pub x: f64,
    /// Height above the ground; the editor keeps it non-negative.
    #[serde(default, deserialize_with = "lenient_component")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub z: f64,
    /// Multiplier applied on top of the marker's base scale.
    #[serde(default = "default_scale", deserialize_with = "lenient_scale")]
    pub scale: f64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl FireRecord {
    /// Sanitized placement of this record.
    pub fn pose(&self) -> FirePose {
        FirePose::new(self.x, self.y, self.z, self.scale)
    }
}

/// An in-progress fire marker that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_component")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub z: f64,
    #[serde(default = "default_scale", deserialize_with = "lenient_scale")]
    pub scale: f64,
}

impl Default for FireDraft {
    fn default() -> Self {
        Self {
            name: "Fire".to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            scale: 1.0,
        }
    }
}

impl FireDraft {
    /// Load a committed record back into an editable draft.
    pub fn from_record(record: &FireRecord) -> Self {
        let pose = record.pose();
        Self {
            name: if record.name.is_empty() {
                "Fire".to_string()
            } else {
                record.name.clone()
            },
            x: pose.x,
            y: pose.y.max(0.0),
            z: pose.z,
            scale: pose.scale,
        }
    }

    /// Sanitized placement of this draft.
    pub fn pose(&self) -> FirePose {
        FirePose::new(self.x, self.y, self.z, self.scale)
    }

    /// Merge a drag delta into the draft.
    pub fn apply_move(&mut self, delta: FireMove) {
        self.x = delta.x;
        self.z = delta.z;
    }
}

/// Horizontal position proposed while dragging a fire draft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireMove {
    pub x: f64,
    pub z: f64,
}

/// Coerced placement shared by committed and draft fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub scale: f64,
}

impl FirePose {
    pub fn new(x: f64, y: f64, z: f64, scale: f64) -> Self {
        Self {
            x: coerce_component(x),
            y: coerce_component(y),
            z: coerce_component(z),
            scale: coerce_scale(scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_loose_json() {
        let json = r#"{
            "id": "5b0c5a52-0a55-4c1b-9b0e-7d0f6f0f7a11",
            "name": "Kitchen",
            "x": "1.5",
            "y": null,
            "z": 2,
            "scale": "huge",
            "createdAt": "2025-01-02T03:04:05Z"
        }"#;
        let fire: FireRecord = serde_json::from_str(json).unwrap();
        assert_eq!(fire.name, "Kitchen");
        assert_eq!(fire.x, 1.5);
        assert_eq!(fire.y, 0.0);
        assert_eq!(fire.z, 2.0);
        assert_eq!(fire.scale, 1.0);
    }

    #[test]
    fn test_record_without_id_gets_one() {
        let a: FireRecord = serde_json::from_str(r#"{"x": 1}"#).unwrap();
        let b: FireRecord = serde_json::from_str(r#"{"x": 1}"#).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_pose_coerces_non_finite_values() {
        let draft = FireDraft {
            x: f64::NAN,
            scale: f64::INFINITY,
            ..FireDraft::default()
        };
        let pose = draft.pose();
        assert_eq!(pose.x, 0.0);
        assert_eq!(pose.scale, 1.0);
    }

    #[test]
    fn test_apply_move_keeps_height() {
        let mut draft = FireDraft {
            y: 1.25,
            ..FireDraft::default()
        };
        draft.apply_move(FireMove { x: 3.0, z: -4.0 });
        assert_eq!((draft.x, draft.y, draft.z), (3.0, 1.25, -4.0));
    }

    #[test]
    fn test_draft_from_record_clamps_height() {
        let record = FireRecord {
            id: Uuid::new_v4(),
            name: String::new(),
            x: 1.0,
            y: -3.0,
            z: 2.0,
            scale: 2.0,
            created_at: Utc::now(),
        };
        let draft = FireDraft::from_record(&record);
        assert_eq!(draft.name, "Fire");
        assert_eq!(draft.y, 0.0);
        assert_eq!(draft.scale, 2.0);
    }
}
