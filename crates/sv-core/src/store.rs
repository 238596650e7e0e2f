//! Project record store
//!
//! The viewer's host loads and saves scenes through [`ProjectStore`]. The
//! store is an interface only; [`MemoryProjectStore`] backs tests, the replay
//! tool and embedding hosts that keep projects in memory.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::project::{ModelFormat, ModelInfo, Project};
use crate::scene::SceneDocument;

/// Store error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Project name is required")]
    NameRequired,
    #[error("Project not found: {0}")]
    NotFound(Uuid),
    #[error("Unsupported model format: {0} (use .glb, .gltf or .usdz)")]
    UnsupportedFormat(String),
}

/// Data-access interface for projects and their scenes.
pub trait ProjectStore: Send + Sync {
    /// All projects, newest first.
    fn list_projects(&self) -> Vec<Project>;

    /// Create an empty project. The name is trimmed and must not be empty.
    fn create_project(&self, name: &str) -> Result<Project, StoreError>;

    fn get_project(&self, id: Uuid) -> Result<Project, StoreError>;

    /// Committed markers of a project.
    fn load_scene(&self, id: Uuid) -> Result<SceneDocument, StoreError>;

    /// Replace the committed markers of a project.
    fn save_scene(&self, id: Uuid, scene: SceneDocument) -> Result<Project, StoreError>;

    /// Record that a model file was attached to a project.
    fn set_model(&self, id: Uuid, file_name: &str) -> Result<Project, StoreError>;
}

/// Shared store handle
pub type SharedStore = Arc<dyn ProjectStore>;

/// In-memory project store
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a new store in a shared handle
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}

impl ProjectStore for MemoryProjectStore {
    fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.read().values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::NameRequired);
        }

        let project = Project::new(name);
        self.projects.write().insert(project.id, project.clone());
        tracing::info!(id = %project.id, name, "Created project");
        Ok(project)
    }

    fn get_project(&self, id: Uuid) -> Result<Project, StoreError> {
        self.projects
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn load_scene(&self, id: Uuid) -> Result<SceneDocument, StoreError> {
        self.get_project(id).map(|p| p.scene())
    }

    fn save_scene(&self, id: Uuid, scene: SceneDocument) -> Result<Project, StoreError> {
        let mut projects = self.projects.write();
        let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        project.fires = scene.fires;
        project.cameras = scene.cameras;
        tracing::debug!(
            id = %id,
            fires = project.fires.len(),
            cameras = project.cameras.len(),
            "Saved scene"
        );
        Ok(project.clone())
    }

    fn set_model(&self, id: Uuid, file_name: &str) -> Result<Project, StoreError> {
        let format = ModelFormat::from_file_name(file_name)
            .ok_or_else(|| StoreError::UnsupportedFormat(file_name.to_string()))?;

        let mut projects = self.projects.write();
        let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let stored_name = format!("model.{}", format.extension());
        let storage_path = format!("{}/{}", id, stored_name);
        project.model = Some(ModelInfo {
            file_name: stored_name,
            signed_url: Some(storage_path.clone()),
            storage_path,
            uploaded_at: Utc::now(),
            missing: false,
        });
        Ok(project.clone())
    }
}
