use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::document::Anchor;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Failures of a markup producer.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("dictionary not found: {}", .0.display())]
    DictionaryNotFound(PathBuf),

    #[error("no entry for {0:?}")]
    NoEntry(String),

    #[error("malformed entry: {0}")]
    Malformed(String),

    #[error("external tool failed: {0}")]
    Tool(#[from] ToolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to stage temporary input: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} produced non-UTF-8 output")]
    InvalidOutput { program: String },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("failed to read stylesheet {}: {source}", .path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("markup has no {0} anchor")]
    MissingAnchor(Anchor),
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("no dictionary asset directory found (tried {})", display_paths(.tried))]
    NoAssetRoot { tried: Vec<PathBuf> },

    #[error("dictionary {0:?} is not installed")]
    NotInstalled(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid state file: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
