use anyhow::{Context, Result};
use chrono::Local;
use clap::{Arg, ArgAction, Command};
use player_builder::services::{EntryOutcome, PlayerBuildStatus};
use player_builder::{
    execute_player_build, plan_player_build, AppConfig, BuildError, BuildProfile, BuildTarget,
    CommandPipeline, CopyReport, PipelineConfig, PlayerBuildConfig, PlayerBuildReport,
};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("Player Builder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolves the player output path, runs the build pipeline and copies artifacts")
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("FILE")
                .help("Build profile (JSON)")
                .required(true),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("TARGET")
                .help("Build target, e.g. StandaloneWindows64, Android, iOS")
                .required(true),
        )
        .arg(
            Arg::new("pipeline")
                .long("pipeline")
                .value_name("PROGRAM")
                .help("Program that performs the player build (defaults to $PLAYER_BUILD_PIPELINE)"),
        )
        .arg(
            Arg::new("pipeline-arg")
                .long("pipeline-arg")
                .value_name("ARG")
                .help("Argument passed to the pipeline program (repeatable)")
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("DIR")
                .help("Output location used when the profile has no path template"),
        )
        .arg(
            Arg::new("config-only")
                .long("config-only")
                .help("Apply the configuration without building")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("resolve-only")
                .long("resolve-only")
                .help("Print the resolved output path and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .get_matches();

    // Initialize configuration from command line arguments
    let mut config = create_app_config(&matches)?;

    // Initialize logging
    initialize_logging(&config.log_level)?;

    // Load environment variables
    load_environment_variables(&mut config);

    // Run the application
    run_application(config).await
}

/// Pure function to create application configuration from CLI arguments
fn create_app_config(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let profile_path = matches
        .get_one::<String>("profile")
        .map(PathBuf::from)
        .context("Missing --profile")?;

    let target: BuildTarget = matches
        .get_one::<String>("target")
        .context("Missing --target")?
        .parse()?;

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| "info".to_string());

    let pipeline = PipelineConfig {
        program: matches.get_one::<String>("pipeline").cloned(),
        args: matches
            .get_many::<String>("pipeline-arg")
            .map(|args| args.cloned().collect())
            .unwrap_or_default(),
    };

    Ok(AppConfig {
        profile_path,
        target,
        player_build: PlayerBuildConfig {
            fallback_location: matches.get_one::<String>("output").cloned(),
            config_only: matches.get_flag("config-only"),
            ..PlayerBuildConfig::default()
        },
        pipeline,
        resolve_only: matches.get_flag("resolve-only"),
        log_level,
    })
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("tokio=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

/// Load optional settings from the environment
fn load_environment_variables(config: &mut AppConfig) {
    // Load .env file if it exists
    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using system environment variables");
    }

    if config.pipeline.program.is_none() {
        match env::var("PLAYER_BUILD_PIPELINE") {
            Ok(program) if !program.is_empty() => {
                info!("Using build pipeline from PLAYER_BUILD_PIPELINE");
                config.pipeline.program = Some(program);
            }
            _ => {}
        }
    }
}

/// Main application logic
async fn run_application(config: AppConfig) -> Result<()> {
    info!("Starting player build");
    info!("Configuration: {:#?}", config);

    let profile = BuildProfile::from_file(&config.profile_path)?;

    if config.resolve_only {
        let plan = plan_player_build(
            &profile,
            &config.target,
            &config.player_build,
            Local::now().naive_local(),
        )?;
        println!("{}", plan.output_root.display());
        return Ok(());
    }

    let needs_pipeline = !(profile.config_but_dont_build || config.player_build.config_only);
    let program = match config.pipeline.program {
        Some(program) => program,
        None if needs_pipeline => {
            return Err(BuildError::ConfigurationIncomplete(
                "no build pipeline configured (use --pipeline or PLAYER_BUILD_PIPELINE)"
                    .to_string(),
            )
            .into())
        }
        None => String::new(),
    };
    let pipeline = CommandPipeline::new(program, config.pipeline.args);

    let report = execute_player_build(&profile, &config.target, &pipeline, &config.player_build)
        .await
        .inspect_err(|e| error!("{}", e))?;

    print_build_report(&report);
    if report.status == PlayerBuildStatus::Built {
        print_copy_report(&report.copy_report);
    }

    info!("Player build completed");
    Ok(())
}

/// Print player build summary
fn print_build_report(report: &PlayerBuildReport) {
    info!("=== PLAYER BUILD REPORT ===");
    info!("Target: {}", report.target);
    info!("Status: {:?}", report.status);
    if let Some(plan) = &report.plan {
        info!("Output root: {}", plan.output_root.display());
        info!("Player location: {}", plan.location.display());
    }
}

/// Print artifact copy report
fn print_copy_report(report: &CopyReport) {
    info!("=== ARTIFACT COPY REPORT ===");
    info!("Entries copied: {}", report.copied_count());
    info!("Entries skipped: {}", report.skipped_count());
    info!("Entries failed: {}", report.failed_count());
    info!("Files copied: {}", report.files_copied());

    for entry in &report.entries {
        if let EntryOutcome::Skipped(reason) = &entry.outcome {
            info!(
                "  skipped #{} {:?} -> {:?}: {}",
                entry.index, entry.entry.src_path, entry.entry.dst_path, reason
            );
        }
    }

    if report.has_failures() {
        warn!("Copy errors encountered:");
        for error in report.errors() {
            warn!(
                "  {} -> {}: {}",
                error.source.display(),
                error.destination.display(),
                error.error
            );
        }
    }
}
