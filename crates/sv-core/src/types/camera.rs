//! Surveillance camera marker types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::numeric::{coerce_component, lenient_component};

/// A committed surveillance camera viewpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_component")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub z: f64,
    /// Heading in degrees about the vertical axis.
    #[serde(default, deserialize_with = "lenient_component")]
    pub yaw: f64,
    /// Tilt of the camera head in degrees.
    #[serde(default, deserialize_with = "lenient_component")]
    pub pitch: f64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl CameraRecord {
    /// Sanitized pose of this record.
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.x, self.y, self.z, self.yaw, self.pitch)
    }
}

/// An in-progress camera viewpoint that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_component")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub z: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub yaw: f64,
    #[serde(default, deserialize_with = "lenient_component")]
    pub pitch: f64,
}

impl Default for CameraDraft {
    fn default() -> Self {
        Self {
            name: "Camera".to_string(),
            x: 0.0,
            y: 2.0,
            z: 0.0,
            yaw: 0.0,
            pitch: -20.0,
        }
    }
}

impl CameraDraft {
    /// Load a committed record back into an editable draft.
    pub fn from_record(record: &CameraRecord) -> Self {
        let pose = record.pose();
        Self {
            name: if record.name.is_empty() {
                "Camera".to_string()
            } else {
                record.name.clone()
            },
            x: pose.x,
            y: pose.y.max(0.0),
            z: pose.z,
            yaw: pose.yaw,
            pitch: pose.pitch,
        }
    }

    /// Sanitized pose of this draft.
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.x, self.y, self.z, self.yaw, self.pitch)
    }

    /// Merge a partial patch into the draft; absent fields are left untouched.
    pub fn apply(&mut self, patch: &CameraPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(z) = patch.z {
            self.z = z;
        }
        if let Some(yaw) = patch.yaw {
            self.yaw = yaw;
        }
        if let Some(pitch) = patch.pitch {
            self.pitch = pitch;
        }
    }
}

/// Partial update proposed while dragging a camera draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

impl CameraPatch {
    /// Patch carrying a new horizontal position.
    pub fn position(x: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            z: Some(z),
            ..Self::default()
        }
    }

    /// Patch carrying a new orientation.
    pub fn orientation(yaw: f64, pitch: f64) -> Self {
        Self {
            yaw: Some(yaw),
            pitch: Some(pitch),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.z.is_none() && self.yaw.is_none() && self.pitch.is_none()
    }
}

/// Coerced pose shared by committed and draft cameras.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl CameraPose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64, pitch: f64) -> Self {
        Self {
            x: coerce_component(x),
            y: coerce_component(y),
            z: coerce_component(z),
            yaw: coerce_component(yaw),
            pitch: coerce_component(pitch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let draft = CameraDraft::default();
        assert_eq!(draft.name, "Camera");
        assert_eq!(draft.y, 2.0);
        assert_eq!(draft.pitch, -20.0);
    }

    #[test]
    fn test_patch_merges_present_fields_only() {
        let mut draft = CameraDraft::default();
        draft.apply(&CameraPatch::position(1.0, 2.0));
        assert_eq!((draft.x, draft.z, draft.yaw, draft.pitch), (1.0, 2.0, 0.0, -20.0));

        draft.apply(&CameraPatch::orientation(45.0, 10.0));
        assert_eq!((draft.x, draft.z, draft.yaw, draft.pitch), (1.0, 2.0, 45.0, 10.0));
    }

    #[test]
    fn test_patch_serializes_partially() {
        let json = serde_json::to_string(&CameraPatch::orientation(1.5, -3.0)).unwrap();
        assert_eq!(json, r#"{"yaw":1.5,"pitch":-3.0}"#);
        assert!(CameraPatch::default().is_empty());
    }

    #[test]
    fn test_record_with_bad_angles() {
        let json = r#"{"name": "Lobby", "x": 1, "y": 3, "z": 0, "yaw": "north", "pitch": false}"#;
        let camera: CameraRecord = serde_json::from_str(json).unwrap();
        let pose = camera.pose();
        assert_eq!(pose.yaw, 0.0);
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(pose.y, 3.0);
    }
}
