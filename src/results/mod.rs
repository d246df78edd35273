//! Results produced by the external semantic engine

pub mod loader;
pub mod source;
pub mod table;

pub use loader::{load_artifacts, ArtifactPaths, LoadedArtifacts, Summary};
pub use source::{ArtifactSource, LocalArtifactSource, RemoteArtifactSource};
pub use table::ScoreTable;
