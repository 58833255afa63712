use crate::color::ChannelOrder;
use crate::error::ModelLoadError;
use crate::model::{ModelHandle, OrtBackend, DEFAULT_INPUT_SHAPE};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Holds loaded model handles and the single active pointer. Reads vastly
/// outnumber writes: requests clone an `Arc` under a read lock, while
/// `set_active` replaces the pointer in one store under the write lock, so a
/// reader either sees the old handle or the new one, never a torn mix.
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelHandle>>>,
    active: RwLock<Option<Arc<ModelHandle>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
        }
    }

    /// Loads an artifact from disk and registers the resulting handle. A load
    /// failure is returned to the caller to log; the registry itself stays
    /// unchanged, leaving the service in degraded mode if nothing else is
    /// registered.
    pub fn load(
        &self,
        id: &str,
        artifact_path: &Path,
        channel_order: ChannelOrder,
    ) -> Result<Arc<ModelHandle>, ModelLoadError> {
        let (backend, declared_shape) = OrtBackend::load(artifact_path)?;

        let input_shape = match declared_shape {
            Some(shape) => shape,
            None => {
                tracing::warn!(
                    model = id,
                    fallback = ?DEFAULT_INPUT_SHAPE,
                    "artifact does not declare a static input shape, using fallback"
                );
                DEFAULT_INPUT_SHAPE
            }
        };

        let handle = ModelHandle::new(id, input_shape, channel_order, Box::new(backend));
        Ok(self.register(handle))
    }

    /// Inserts a fully constructed handle. The first registered handle
    /// becomes active.
    pub fn register(&self, handle: ModelHandle) -> Arc<ModelHandle> {
        let handle = Arc::new(handle);
        self.models
            .write()
            .insert(handle.id().to_string(), handle.clone());

        let mut active = self.active.write();
        if active.is_none() {
            *active = Some(handle.clone());
        }

        handle
    }

    /// Fetches a handle by id, or the active handle when no id is given.
    pub fn get(&self, id: Option<&str>) -> Option<Arc<ModelHandle>> {
        match id {
            Some(id) => self.models.read().get(id).cloned(),
            None => self.active.read().clone(),
        }
    }

    /// Repoints the active handle. In-flight requests that already cloned
    /// the previous `Arc` keep running on it. Returns false when no handle
    /// with that id is registered.
    pub fn set_active(&self, id: &str) -> bool {
        let handle = self.models.read().get(id).cloned();
        match handle {
            Some(handle) => {
                *self.active.write() = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Removes a handle. Clears the active pointer if it pointed at the
    /// removed handle; in-flight holders of the `Arc` are unaffected.
    pub fn unload(&self, id: &str) -> bool {
        let removed = self.models.write().remove(id);
        match removed {
            Some(_) => {
                let mut active = self.active.write();
                if active.as_ref().is_some_and(|h| h.id() == id) {
                    *active = None;
                }
                true
            }
            None => false,
        }
    }

    pub fn active_id(&self) -> Option<String> {
        self.active.read().as_ref().map(|h| h.id().to_string())
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().is_some()
    }
}
