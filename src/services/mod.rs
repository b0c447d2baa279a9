pub mod artifact_copy;
pub mod path_template;
pub mod pipeline;
pub mod player_build;

pub use artifact_copy::{
    copy_artifacts, copy_artifacts_with_progress, CopyError, CopyReport, EntryOutcome,
    EntryReport, SkipReason,
};
pub use path_template::{contains_placeholders, resolve, PlaceholderValues};
pub use pipeline::{BuildOutcome, BuildPipeline, BuildRequest, CommandPipeline};
pub use player_build::{
    configure, execute_player_build, execute_player_build_at, plan_player_build,
    BuildNumberSetting, BuildPlan, PlayerBuildConfig, PlayerBuildReport, PlayerBuildStatus,
    PlayerSettings,
};
