pub mod build_profile;
pub mod placeholder;

pub use build_profile::{
    BuildProfile, BuildTarget, CopyBatch, CopyEntry, TargetGroup, DEFAULT_LOCATION_PATH_NAME,
};
pub use placeholder::Placeholder;
