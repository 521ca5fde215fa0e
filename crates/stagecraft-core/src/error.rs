/// Errors that can occur when driving a [`Stage`](crate::stage::Stage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// No scene is registered under the requested name.
    #[error("scene '{name}' not found")]
    SceneNotFound { name: String },
}

impl StageError {
    pub(crate) fn not_found(name: &str) -> Self {
        StageError::SceneNotFound {
            name: name.to_string(),
        }
    }
}
