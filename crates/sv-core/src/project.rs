//! Project records

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scene::SceneDocument;
use crate::types::{CameraRecord, FireRecord};

/// Supported 3D model formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFormat {
    Glb,
    Gltf,
    Usdz,
}

impl ModelFormat {
    /// Detect format from a file name's extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("glb") => Some(ModelFormat::Glb),
            Some("gltf") => Some(ModelFormat::Gltf),
            Some("usdz") => Some(ModelFormat::Usdz),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Glb => "glb",
            ModelFormat::Gltf => "gltf",
            ModelFormat::Usdz => "usdz",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ModelFormat::Glb => "model/gltf-binary",
            ModelFormat::Gltf => "model/gltf+json",
            ModelFormat::Usdz => "model/vnd.usdz+zip",
        }
    }
}

/// Metadata of the model attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub file_name: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
    /// Resolved, loadable handle for the viewer.
    #[serde(default)]
    pub signed_url: Option<String>,
    /// The stored object could not be found.
    #[serde(default)]
    pub missing: bool,
}

/// A project: one site model plus its markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub fires: Vec<FireRecord>,
    #[serde(default)]
    pub cameras: Vec<CameraRecord>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            model: None,
            fires: Vec::new(),
            cameras: Vec::new(),
        }
    }

    /// The committed markers of this project.
    pub fn scene(&self) -> SceneDocument {
        SceneDocument::new(self.fires.clone(), self.cameras.clone())
    }

    /// Handle the viewer should load, if the model is present.
    pub fn model_handle(&self) -> Option<&str> {
        self.model
            .as_ref()
            .filter(|m| !m.missing)
            .and_then(|m| m.signed_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ModelFormat::from_file_name("site.GLB"), Some(ModelFormat::Glb));
        assert_eq!(ModelFormat::from_file_name("a/b/site.gltf"), Some(ModelFormat::Gltf));
        assert_eq!(ModelFormat::from_file_name("scan.usdz"), Some(ModelFormat::Usdz));
        assert_eq!(ModelFormat::from_file_name("scan.obj"), None);
        assert_eq!(ModelFormat::from_file_name("noext"), None);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ModelFormat::Glb.content_type(), "model/gltf-binary");
        assert_eq!(ModelFormat::Usdz.extension(), "usdz");
    }

    #[test]
    fn test_model_handle_skips_missing_models() {
        let mut project = Project::new("Depot");
        assert_eq!(project.model_handle(), None);

        project.model = Some(ModelInfo {
            file_name: "model.glb".into(),
            storage_path: "x/model.glb".into(),
            uploaded_at: Utc::now(),
            signed_url: Some("https://example.test/model.glb".into()),
            missing: false,
        });
        assert_eq!(project.model_handle(), Some("https://example.test/model.glb"));

        if let Some(model) = project.model.as_mut() {
            model.missing = true;
        }
        assert_eq!(project.model_handle(), None);
    }
}
