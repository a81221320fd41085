use std::path::PathBuf;

use crate::discovery::{DEFAULT_ASSET_ROOTS, PREFERRED_DICTIONARY};
use crate::xslt::{TEMPLATE_FILE, XSLTPROC};

pub const VIEW_TYPE: &str = "yourMacDict";
pub const PANEL_TITLE: &str = "Your Mac Dict";
pub const MEDIA_DIR: &str = "media";
pub const SCRIPT_FILE: &str = "main.js";

#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Root of the bundled resources (`media/main.js`, `style.xsl`).
    pub extension_path: PathBuf,
    pub view_type: String,
    pub title: String,
    pub preferred_dictionary: String,
    /// Candidate dictionary asset directories, in search order.
    pub asset_roots: Vec<PathBuf>,
    pub xsltproc: PathBuf,
    pub state_path: PathBuf,
}

impl PanelConfig {
    pub fn media_dir(&self) -> PathBuf {
        self.extension_path.join(MEDIA_DIR)
    }

    pub fn script_path(&self) -> PathBuf {
        self.media_dir().join(SCRIPT_FILE)
    }

    pub fn template_path(&self) -> PathBuf {
        self.extension_path.join(TEMPLATE_FILE)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            extension_path: PathBuf::from("."),
            view_type: VIEW_TYPE.to_string(),
            title: PANEL_TITLE.to_string(),
            preferred_dictionary: PREFERRED_DICTIONARY.to_string(),
            asset_roots: DEFAULT_ASSET_ROOTS.iter().map(PathBuf::from).collect(),
            xsltproc: PathBuf::from(XSLTPROC),
            state_path: default_state_path(),
        }
    }
}

/// `macdict/state.json` under the platform config directory
/// (`~/Library/Application Support` on macOS).
pub fn default_state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("macdict")
        .join("state.json")
}
