pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use error::BuildError;
pub use models::{BuildProfile, BuildTarget, CopyBatch, CopyEntry, Placeholder};
pub use services::{
    copy_artifacts, execute_player_build, plan_player_build, resolve, BuildOutcome,
    BuildPipeline, CommandPipeline, CopyReport, PlaceholderValues, PlayerBuildConfig,
    PlayerBuildReport,
};

use std::path::PathBuf;

/// External pipeline program and its arguments
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub program: Option<String>,
    pub args: Vec<String>,
}

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile_path: PathBuf,
    pub target: BuildTarget,
    pub player_build: PlayerBuildConfig,
    pub pipeline: PipelineConfig,
    pub resolve_only: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from("build-profile.json"),
            target: BuildTarget::StandaloneWindows64,
            player_build: PlayerBuildConfig::default(),
            pipeline: PipelineConfig::default(),
            resolve_only: false,
            log_level: "info".to_string(),
        }
    }
}
