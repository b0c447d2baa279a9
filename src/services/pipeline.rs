use crate::models::BuildTarget;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Number of trailing stderr lines kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// Everything the external pipeline needs to produce a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: BuildTarget,
    pub scenes: Vec<String>,
    /// Where the player itself is written (may carry a platform extension)
    pub location: PathBuf,
    /// Resolved output directory that artifacts get copied into
    pub output_root: PathBuf,
}

/// Coarse result reported by the external pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    Failed(String),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded)
    }
}

/// External collaborator that compiles, links and packages the player
pub trait BuildPipeline {
    /// An `Err` means the pipeline could not be run at all, as opposed to
    /// running and reporting [`BuildOutcome::Failed`].
    fn build(&self, request: &BuildRequest) -> impl Future<Output = io::Result<BuildOutcome>> + Send;
}

/// Runs an external program as the build pipeline.
///
/// The request is passed through environment variables so the program can be a
/// plain shell script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPipeline {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandPipeline {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Environment handed to the pipeline program
    pub fn request_env(request: &BuildRequest) -> Vec<(&'static str, String)> {
        vec![
            ("PLAYER_BUILD_TARGET", request.target.name().to_string()),
            (
                "PLAYER_BUILD_LOCATION",
                request.location.to_string_lossy().to_string(),
            ),
            (
                "PLAYER_BUILD_OUTPUT_ROOT",
                request.output_root.to_string_lossy().to_string(),
            ),
            ("PLAYER_BUILD_SCENES", request.scenes.join(";")),
        ]
    }
}

impl BuildPipeline for CommandPipeline {
    async fn build(&self, request: &BuildRequest) -> io::Result<BuildOutcome> {
        info!(
            "Running build pipeline '{}' for {} -> {}",
            self.program,
            request.target,
            request.location.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .envs(Self::request_env(request))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await?;

        debug!("Build pipeline exited with {}", output.status);

        if output.status.success() {
            return Ok(BuildOutcome::Succeeded);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");

        let message = if tail.trim().is_empty() {
            format!("pipeline exited with {}", output.status)
        } else {
            format!("pipeline exited with {}: {}", output.status, tail.trim())
        };
        Ok(BuildOutcome::Failed(message))
    }
}
