//! Locating the system dictionary assets.
//!
//! Dictionaries are installed as mobile assets under one of a few system
//! directories. Each asset directory holds an `AssetData` folder whose first
//! entry is a `.dictionary` bundle; the definition data lives at
//! `Contents/Resources/Body.data` inside the bundle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DiscoveryError;

/// Asset directories searched in order.
pub const DEFAULT_ASSET_ROOTS: &[&str] = &[
    "/System/Library/Assets/com_apple_MobileAsset_DictionaryServices_dictionaryOSX",
    "/System/Library/AssetsV2/com_apple_MobileAsset_DictionaryServices_dictionaryOSX",
];

pub const PREFERRED_DICTIONARY: &str =
    "Sanseido The WISDOM English-Japanese Japanese-English Dictionary";

const ASSET_DATA_DIR: &str = "AssetData";
const BUNDLE_EXTENSION: &str = "dictionary";

/// Returns the first candidate that is an existing directory.
pub fn locate_asset_root(candidates: &[PathBuf]) -> Result<PathBuf, DiscoveryError> {
    for candidate in candidates {
        if candidate.is_dir() {
            debug!(root = %candidate.display(), "found dictionary asset root");
            return Ok(candidate.clone());
        }
        debug!(root = %candidate.display(), "dictionary asset root missing");
    }
    Err(DiscoveryError::NoAssetRoot {
        tried: candidates.to_vec(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDictionary {
    pub name: String,
    pub bundle: PathBuf,
}

impl InstalledDictionary {
    pub fn data_path(&self) -> PathBuf {
        self.bundle
            .join("Contents")
            .join("Resources")
            .join("Body.data")
    }
}

#[derive(Debug, Clone)]
pub struct DictionaryCatalog {
    root: PathBuf,
}

impl DictionaryCatalog {
    pub fn discover(candidates: &[PathBuf]) -> Result<Self, DiscoveryError> {
        locate_asset_root(candidates).map(|root| Self { root })
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists installed dictionaries ordered by asset directory name.
    pub fn installed(&self) -> Result<Vec<InstalledDictionary>, DiscoveryError> {
        let mut asset_dirs: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        asset_dirs.sort();

        let mut dictionaries = Vec::new();
        for asset_dir in asset_dirs {
            match bundle_in(&asset_dir.join(ASSET_DATA_DIR)) {
                Some(bundle) => {
                    let name = bundle
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    dictionaries.push(InstalledDictionary { name, bundle });
                }
                None => debug!(asset = %asset_dir.display(), "asset has no dictionary bundle"),
            }
        }
        Ok(dictionaries)
    }

    /// First installed dictionary whose name contains `name`.
    pub fn find(&self, name: &str) -> Result<InstalledDictionary, DiscoveryError> {
        self.installed()?
            .into_iter()
            .find(|dictionary| dictionary.name.contains(name))
            .ok_or_else(|| DiscoveryError::NotInstalled(name.to_string()))
    }
}

fn bundle_in(asset_data: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(asset_data)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    entries
        .into_iter()
        .find(|path| path.extension().is_some_and(|ext| ext == BUNDLE_EXTENSION))
}
