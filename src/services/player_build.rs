use crate::error::BuildError;
use crate::models::{BuildProfile, BuildTarget, TargetGroup};
use crate::services::artifact_copy::{copy_artifacts_with_progress, CopyReport};
use crate::services::path_template::{contains_placeholders, resolve, PlaceholderValues};
use crate::services::pipeline::{BuildOutcome, BuildPipeline, BuildRequest};
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Caller-side settings for a player build
#[derive(Debug, Clone)]
pub struct PlayerBuildConfig {
    /// Used when the profile has no output path template
    pub fallback_location: Option<String>,
    /// Used for the Windows executable name when the profile has no product name
    pub fallback_product_name: String,
    /// Stop after the config step even if the profile asks for a build
    pub config_only: bool,
}

impl Default for PlayerBuildConfig {
    fn default() -> Self {
        Self {
            fallback_location: None,
            fallback_product_name: "Player".to_string(),
            config_only: false,
        }
    }
}

/// How the build number lands in the player settings of each target group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildNumberSetting {
    MacOs(String),
    Ios(String),
    AndroidVersionCode(i32),
    NotApplied,
}

/// Player settings applied before building. `None` leaves the host value alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSettings {
    pub company_name: Option<String>,
    pub product_name: Option<String>,
    pub bundle_version: Option<String>,
    pub application_identifier: Option<String>,
    pub build_number: BuildNumberSetting,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Pure function computing the settings a profile applies for a target
pub fn configure(profile: &BuildProfile, target: &BuildTarget) -> PlayerSettings {
    let build_number = match target.group() {
        TargetGroup::Standalone => BuildNumberSetting::MacOs(profile.build_number.to_string()),
        TargetGroup::Ios => BuildNumberSetting::Ios(profile.build_number.to_string()),
        TargetGroup::Android => BuildNumberSetting::AndroidVersionCode(profile.build_number),
        TargetGroup::Other => BuildNumberSetting::NotApplied,
    };

    PlayerSettings {
        company_name: non_empty(&profile.company_name),
        product_name: non_empty(&profile.product_name),
        bundle_version: non_empty(&profile.bundle_version),
        application_identifier: non_empty(&profile.bundle_identifier),
        build_number,
    }
}

/// Resolved paths for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub output_root: PathBuf,
    pub location: PathBuf,
}

/// Resolve the output template and derive the platform-specific player location
pub fn plan_player_build(
    profile: &BuildProfile,
    target: &BuildTarget,
    config: &PlayerBuildConfig,
    now: NaiveDateTime,
) -> Result<BuildPlan, BuildError> {
    let template = if profile.location_path_name.is_empty() {
        match config.fallback_location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => {
                return Err(BuildError::ConfigurationIncomplete(
                    "no output path template and no fallback location".to_string(),
                ))
            }
        }
    } else {
        profile.location_path_name.as_str()
    };

    let values = PlaceholderValues::for_build(profile, target, now);
    let resolved = resolve(template, &values);
    if contains_placeholders(&resolved) {
        // Values are substituted once and never re-expanded.
        warn!("Resolved output path still contains placeholder tokens: {}", resolved);
    }

    let product_name = if profile.product_name.is_empty() {
        config.fallback_product_name.as_str()
    } else {
        profile.product_name.as_str()
    };

    let location = match target {
        BuildTarget::StandaloneWindows | BuildTarget::StandaloneWindows64 => {
            PathBuf::from(&resolved).join(format!("{}.exe", product_name))
        }
        BuildTarget::Android => PathBuf::from(format!("{}.apk", resolved)),
        _ => PathBuf::from(&resolved),
    };

    Ok(BuildPlan {
        output_root: PathBuf::from(resolved),
        location,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerBuildStatus {
    /// Settings were applied, no build was requested
    Configured,
    Built,
}

/// Report structure for a player build
#[derive(Debug, Clone)]
pub struct PlayerBuildReport {
    pub target: BuildTarget,
    pub settings: PlayerSettings,
    pub status: PlayerBuildStatus,
    pub plan: Option<BuildPlan>,
    pub copy_report: CopyReport,
}

/// Main player build operation using the local clock for date/time placeholders
pub async fn execute_player_build<P: BuildPipeline>(
    profile: &BuildProfile,
    target: &BuildTarget,
    pipeline: &P,
    config: &PlayerBuildConfig,
) -> Result<PlayerBuildReport, BuildError> {
    execute_player_build_at(profile, target, pipeline, config, Local::now().naive_local()).await
}

/// Configure, build through `pipeline`, then copy artifacts on success
pub async fn execute_player_build_at<P: BuildPipeline>(
    profile: &BuildProfile,
    target: &BuildTarget,
    pipeline: &P,
    config: &PlayerBuildConfig,
    now: NaiveDateTime,
) -> Result<PlayerBuildReport, BuildError> {
    info!("Configuring player build for {}", target);
    let settings = configure(profile, target);
    info!("Player settings: {:?}", settings);

    if profile.config_but_dont_build || config.config_only {
        info!("Configuration applied, skipping build");
        return Ok(PlayerBuildReport {
            target: target.clone(),
            settings,
            status: PlayerBuildStatus::Configured,
            plan: None,
            copy_report: CopyReport::empty(),
        });
    }

    let plan = plan_player_build(profile, target, config, now)?;
    info!(
        "Building {} into {}",
        target,
        plan.location.display()
    );

    if profile.scenes.is_empty() {
        warn!("Build profile lists no scenes");
    }

    let request = BuildRequest {
        target: target.clone(),
        scenes: profile.scenes.clone(),
        location: plan.location.clone(),
        output_root: plan.output_root.clone(),
    };

    match pipeline.build(&request).await? {
        BuildOutcome::Succeeded => info!("Build Succeeded"),
        BuildOutcome::Failed(message) => {
            error!("Build Failed: {}", message);
            return Err(BuildError::ExternalBuildFailure(message));
        }
    }

    let output_root = plan.output_root.clone();
    let batch = profile.copy_list.clone();
    let copy_report = tokio::task::spawn_blocking(move || {
        copy_artifacts_with_progress(&output_root, &batch, |progress| {
            debug!("Copying files: {:.0}%", progress * 100.0);
        })
    })
    .await?;

    Ok(PlayerBuildReport {
        target: target.clone(),
        settings,
        status: PlayerBuildStatus::Built,
        plan: Some(plan),
        copy_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CopyEntry;
    use chrono::NaiveDate;
    use std::fs;
    use std::io;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakePipeline {
        outcome: BuildOutcome,
        requests: Mutex<Vec<BuildRequest>>,
    }

    impl FakePipeline {
        fn new(outcome: BuildOutcome) -> Self {
            Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<BuildRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl BuildPipeline for FakePipeline {
        async fn build(&self, request: &BuildRequest) -> io::Result<BuildOutcome> {
            self.requests.lock().unwrap().push(request.clone());
            if self.outcome.is_success() {
                fs::create_dir_all(&request.output_root)?;
            }
            Ok(self.outcome.clone())
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap()
    }

    fn profile() -> BuildProfile {
        BuildProfile {
            company_name: "Acme".to_string(),
            product_name: "Rocket".to_string(),
            bundle_identifier: "com.acme.rocket".to_string(),
            bundle_version: "2.1".to_string(),
            build_number: 17,
            scenes: vec!["Assets/Scenes/Main.unity".to_string()],
            ..BuildProfile::default()
        }
    }

    #[test]
    fn test_configure_applies_non_empty_fields() {
        let mut profile = profile();
        profile.company_name.clear();

        let settings = configure(&profile, &BuildTarget::Android);
        assert_eq!(settings.company_name, None);
        assert_eq!(settings.product_name.as_deref(), Some("Rocket"));
        assert_eq!(settings.application_identifier.as_deref(), Some("com.acme.rocket"));
        assert_eq!(settings.build_number, BuildNumberSetting::AndroidVersionCode(17));
    }

    #[test]
    fn test_configure_build_number_per_group() {
        let profile = profile();
        assert_eq!(
            configure(&profile, &BuildTarget::StandaloneOsx).build_number,
            BuildNumberSetting::MacOs("17".to_string())
        );
        assert_eq!(
            configure(&profile, &BuildTarget::Ios).build_number,
            BuildNumberSetting::Ios("17".to_string())
        );
        assert_eq!(
            configure(&profile, &BuildTarget::WebGl).build_number,
            BuildNumberSetting::NotApplied
        );
    }

    #[test]
    fn test_plan_locations_per_target() {
        let profile = profile();
        let config = PlayerBuildConfig::default();

        let windows =
            plan_player_build(&profile, &BuildTarget::StandaloneWindows64, &config, now()).unwrap();
        assert_eq!(
            windows.output_root,
            PathBuf::from("Builds/Rocket-StandaloneWindows64-17-2.1")
        );
        assert_eq!(
            windows.location,
            PathBuf::from("Builds/Rocket-StandaloneWindows64-17-2.1/Rocket.exe")
        );

        let android = plan_player_build(&profile, &BuildTarget::Android, &config, now()).unwrap();
        assert_eq!(android.location, PathBuf::from("Builds/Rocket-Android-17-2.1.apk"));
        assert_eq!(android.output_root, PathBuf::from("Builds/Rocket-Android-17-2.1"));

        let linux =
            plan_player_build(&profile, &BuildTarget::StandaloneLinux64, &config, now()).unwrap();
        assert_eq!(linux.location, linux.output_root);
    }

    #[test]
    fn test_plan_uses_fallback_product_name_for_exe() {
        let mut profile = profile();
        profile.product_name.clear();
        profile.location_path_name = "out/<Date>-<Time>".to_string();

        let plan = plan_player_build(
            &profile,
            &BuildTarget::StandaloneWindows,
            &PlayerBuildConfig::default(),
            now(),
        )
        .unwrap();
        assert_eq!(plan.location, PathBuf::from("out/20231231-235958/Player.exe"));
    }

    #[test]
    fn test_plan_empty_template_without_fallback() {
        let mut profile = profile();
        profile.location_path_name.clear();

        let result = plan_player_build(
            &profile,
            &BuildTarget::Android,
            &PlayerBuildConfig::default(),
            now(),
        );
        assert!(matches!(result, Err(BuildError::ConfigurationIncomplete(_))));
    }

    #[test]
    fn test_plan_empty_template_with_fallback() {
        let mut profile = profile();
        profile.location_path_name.clear();
        let config = PlayerBuildConfig {
            fallback_location: Some("chosen/<BuildTarget>".to_string()),
            ..PlayerBuildConfig::default()
        };

        let plan = plan_player_build(&profile, &BuildTarget::WebGl, &config, now()).unwrap();
        assert_eq!(plan.output_root, PathBuf::from("chosen/WebGL"));
    }

    #[tokio::test]
    async fn test_successful_build_copies_artifacts() {
        let dir = TempDir::new().unwrap();
        let readme = dir.path().join("README.txt");
        fs::write(&readme, "hello").unwrap();

        let mut profile = profile();
        profile.location_path_name = dir
            .path()
            .join("Builds/<ProductName>-<BuildNumber>")
            .to_string_lossy()
            .to_string();
        profile.copy_list = vec![
            CopyEntry::new(readme.to_string_lossy(), "README.txt"),
            CopyEntry::new("", ""),
        ];

        let pipeline = FakePipeline::new(BuildOutcome::Succeeded);
        let report = execute_player_build_at(
            &profile,
            &BuildTarget::StandaloneLinux64,
            &pipeline,
            &PlayerBuildConfig::default(),
            now(),
        )
        .await
        .unwrap();

        let root = dir.path().join("Builds/Rocket-17");
        assert_eq!(report.status, PlayerBuildStatus::Built);
        assert_eq!(report.copy_report.copied_count(), 1);
        assert_eq!(report.copy_report.skipped_count(), 1);
        assert_eq!(fs::read_to_string(root.join("README.txt")).unwrap(), "hello");

        let calls = pipeline.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output_root, root);
        assert_eq!(calls[0].scenes, profile.scenes);
    }

    #[tokio::test]
    async fn test_failed_build_skips_copy() {
        let dir = TempDir::new().unwrap();
        let readme = dir.path().join("README.txt");
        fs::write(&readme, "hello").unwrap();
        let root = dir.path().join("out");
        fs::create_dir_all(&root).unwrap();

        let mut profile = profile();
        profile.location_path_name = root.to_string_lossy().to_string();
        profile.copy_list = vec![CopyEntry::new(readme.to_string_lossy(), "README.txt")];

        let pipeline = FakePipeline::new(BuildOutcome::Failed("compile errors".to_string()));
        let result = execute_player_build_at(
            &profile,
            &BuildTarget::StandaloneLinux64,
            &pipeline,
            &PlayerBuildConfig::default(),
            now(),
        )
        .await;

        match result {
            Err(BuildError::ExternalBuildFailure(message)) => assert_eq!(message, "compile errors"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!root.join("README.txt").exists());
    }

    #[tokio::test]
    async fn test_config_only_never_builds() {
        let mut profile = profile();
        profile.config_but_dont_build = true;
        profile.location_path_name.clear();

        let pipeline = FakePipeline::new(BuildOutcome::Succeeded);
        let report = execute_player_build_at(
            &profile,
            &BuildTarget::Ios,
            &pipeline,
            &PlayerBuildConfig::default(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(report.status, PlayerBuildStatus::Configured);
        assert!(report.plan.is_none());
        assert!(pipeline.calls().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_configuration_never_builds() {
        let mut profile = profile();
        profile.location_path_name.clear();

        let pipeline = FakePipeline::new(BuildOutcome::Succeeded);
        let result = execute_player_build_at(
            &profile,
            &BuildTarget::Android,
            &pipeline,
            &PlayerBuildConfig::default(),
            now(),
        )
        .await;

        assert!(matches!(result, Err(BuildError::ConfigurationIncomplete(_))));
        assert!(pipeline.calls().is_empty());
    }
}
