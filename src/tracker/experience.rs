use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Last experience values fetched from the backend.
///
/// Read from game callbacks, so it uses a blocking lock rather than an async one.
#[derive(Debug, Clone, Default)]
pub struct ExperienceCache {
    values: Arc<RwLock<HashMap<String, i64>>>,
}

impl ExperienceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> i64 {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }

    /// Replaces the cached values with a fresh fetch. Players that are no
    /// longer part of the fetch are forgotten.
    pub fn replace(&self, fetched: HashMap<String, i64>) {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) = fetched;
    }
}
