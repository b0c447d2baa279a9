use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_LOCATION_PATH_NAME: &str =
    "Builds/<ProductName>-<BuildTarget>-<BuildNumber>-<BundleVersion>";

/// A single source -> destination mapping copied after a successful build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyEntry {
    pub src_path: String,
    pub dst_path: String,
}

impl CopyEntry {
    pub fn new(src_path: impl Into<String>, dst_path: impl Into<String>) -> Self {
        Self {
            src_path: src_path.into(),
            dst_path: dst_path.into(),
        }
    }

    /// Entries with an empty side are skipped rather than treated as errors
    pub fn is_empty(&self) -> bool {
        self.src_path.is_empty() || self.dst_path.is_empty()
    }
}

pub type CopyBatch = Vec<CopyEntry>;

/// User-authored build settings for one player build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildProfile {
    pub config_but_dont_build: bool,
    pub location_path_name: String,
    pub scenes: Vec<String>,
    pub company_name: String,
    pub product_name: String,
    pub bundle_identifier: String,
    pub bundle_version: String,
    pub build_number: i32,
    pub copy_list: CopyBatch,
}

impl Default for BuildProfile {
    fn default() -> Self {
        Self {
            config_but_dont_build: false,
            location_path_name: DEFAULT_LOCATION_PATH_NAME.to_string(),
            scenes: Vec::new(),
            company_name: String::new(),
            product_name: String::new(),
            bundle_identifier: String::new(),
            bundle_version: String::new(),
            build_number: 0,
            copy_list: Vec::new(),
        }
    }
}

impl BuildProfile {
    /// Parse a profile from its JSON representation
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse build profile JSON")
    }

    /// Load a profile from a JSON file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read build profile: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid build profile: {}", path.display()))
    }
}

/// Platform group used to decide how the build number is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGroup {
    Standalone,
    Ios,
    Android,
    Other,
}

/// Player build target. Unknown names are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    StandaloneWindows,
    StandaloneWindows64,
    StandaloneOsx,
    StandaloneLinux64,
    Android,
    Ios,
    WebGl,
    Other(String),
}

impl BuildTarget {
    pub fn name(&self) -> &str {
        match self {
            BuildTarget::StandaloneWindows => "StandaloneWindows",
            BuildTarget::StandaloneWindows64 => "StandaloneWindows64",
            BuildTarget::StandaloneOsx => "StandaloneOSX",
            BuildTarget::StandaloneLinux64 => "StandaloneLinux64",
            BuildTarget::Android => "Android",
            BuildTarget::Ios => "iOS",
            BuildTarget::WebGl => "WebGL",
            BuildTarget::Other(name) => name,
        }
    }

    pub fn group(&self) -> TargetGroup {
        match self {
            BuildTarget::StandaloneWindows
            | BuildTarget::StandaloneWindows64
            | BuildTarget::StandaloneOsx
            | BuildTarget::StandaloneLinux64 => TargetGroup::Standalone,
            BuildTarget::Ios => TargetGroup::Ios,
            BuildTarget::Android => TargetGroup::Android,
            BuildTarget::WebGl | BuildTarget::Other(_) => TargetGroup::Other,
        }
    }
}

impl FromStr for BuildTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let target = match s {
            "StandaloneWindows" => BuildTarget::StandaloneWindows,
            "StandaloneWindows64" => BuildTarget::StandaloneWindows64,
            "StandaloneOSX" => BuildTarget::StandaloneOsx,
            "StandaloneLinux64" => BuildTarget::StandaloneLinux64,
            "Android" => BuildTarget::Android,
            "iOS" => BuildTarget::Ios,
            "WebGL" => BuildTarget::WebGl,
            other => BuildTarget::Other(other.to_string()),
        };
        Ok(target)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
