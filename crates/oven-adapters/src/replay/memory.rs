//! In-memory replay store for testing.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use oven_core::{
    application::{ApplicationError, ports::ReplayStore},
    domain::Context,
    error::OvenResult,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryReplayStore {
    contexts: Arc<RwLock<HashMap<String, Context>>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contexts.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn save(&self, template: &str, context: &Context) -> OvenResult<()> {
        let mut contexts = self
            .contexts
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        contexts.insert(template.to_string(), context.clone());
        Ok(())
    }

    fn load(&self, template: &str) -> OvenResult<Context> {
        let contexts = self
            .contexts
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        contexts.get(template).cloned().ok_or_else(|| {
            ApplicationError::ReplayNotFound {
                template: template.to_string(),
                path: PathBuf::from("<memory>"),
            }
            .into()
        })
    }
}
