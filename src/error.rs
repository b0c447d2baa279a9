use thiserror::Error;

/// Errors that stop a player build before or instead of the artifact copy
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build configuration incomplete: {0}")]
    ConfigurationIncomplete(String),

    #[error("External build failed: {0}")]
    ExternalBuildFailure(String),

    #[error("Failed to run the build pipeline: {0}")]
    Pipeline(#[from] std::io::Error),

    #[error("Artifact copy task did not complete: {0}")]
    CopyTask(#[from] tokio::task::JoinError),
}
