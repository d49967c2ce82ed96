pub mod manifest;
pub mod resolver;
pub mod version_file;

pub use manifest::{VersionEntry, VersionManifest};
pub use resolver::VersionResolver;
pub use version_file::{
    AssetIndexInfo, ClientArtifact, LibraryArtifact, LibraryEntry, LibraryRule, RuleAction,
    VersionDescriptor,
};
