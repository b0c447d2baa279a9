pub mod file_operations;

pub use file_operations::{
    classify_source, copy_file_overwrite, is_sidecar_metadata, mirror_directory, CopyResult,
    SourceKind, SIDECAR_METADATA_SUFFIX,
};
