//! Host commands routed to the panel controller.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PanelConfig;
use crate::discovery::{DictionaryCatalog, InstalledDictionary};
use crate::error::{DiscoveryError, Result};
use crate::panel::{OutboundMessage, PanelController, PanelHost, PanelSurface};
use crate::render::RenderPipeline;
use crate::settings::{DICTIONARY_PATH_KEY, StateStore};

pub const NO_DICTIONARY_MESSAGE: &str = "Sorry, you don't have dictionary on your Mac.";
pub const PICK_PLACEHOLDER: &str = "Please selected your dictionary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up the selection, or the word at the cursor.
    Start { word: String },
    /// Signal the open document.
    Refactor,
    /// Choose which installed dictionary to use.
    Dict,
}

pub struct Extension<H: PanelHost, S: StateStore> {
    controller: PanelController<H>,
    store: S,
    config: PanelConfig,
}

impl<H: PanelHost, S: StateStore> Extension<H, S> {
    pub fn new(host: H, store: S, pipeline: RenderPipeline, config: PanelConfig) -> Self {
        let controller = PanelController::new(host, pipeline, &config);
        Self {
            controller,
            store,
            config,
        }
    }

    /// Runs `command`; failures are logged, never propagated to the host.
    pub fn execute(&mut self, command: Command) {
        let outcome = match command {
            Command::Start { word } => self.start(&word),
            Command::Refactor => {
                self.refactor();
                Ok(())
            }
            Command::Dict => self.select_dictionary().map(|_| ()),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "command failed");
        }
    }

    pub fn start(&mut self, word: &str) -> Result<()> {
        let Some(dictionary_path) = self.resolve_dictionary_path()? else {
            return Ok(());
        };
        self.controller.show(dictionary_path, word);
        Ok(())
    }

    pub fn refactor(&mut self) -> bool {
        self.controller.broadcast(&OutboundMessage::Refactor)
    }

    /// Asks the user to pick an installed dictionary and persists its path.
    pub fn select_dictionary(&mut self) -> Result<Option<InstalledDictionary>> {
        let Some(catalog) = self.catalog() else {
            return Ok(None);
        };
        let installed = catalog.installed()?;
        let names: Vec<String> = installed.iter().map(|d| d.name.clone()).collect();
        let Some(choice) = self
            .controller
            .host_mut()
            .quick_pick(&names, PICK_PLACEHOLDER)
        else {
            return Ok(None);
        };
        let Some(dictionary) = installed.into_iter().find(|d| d.name.contains(&choice)) else {
            return Err(DiscoveryError::NotInstalled(choice).into());
        };
        self.persist(&dictionary.data_path())?;
        self.controller.host_mut().show_info(&format!(
            "Complete your setting!\nYour Mac Dict is {}!!",
            dictionary.name
        ));
        info!(dictionary = %dictionary.name, "dictionary selected");
        Ok(Some(dictionary))
    }

    /// Host-initiated restoration of a panel saved in an earlier session.
    ///
    /// Without a usable dictionary the restored surface is disposed rather
    /// than rendered.
    pub fn restore(&mut self, mut surface: H::Surface) {
        match self.resolve_dictionary_path() {
            Ok(Some(dictionary_path)) => self.controller.revive(surface, dictionary_path, None),
            Ok(None) => surface.dispose(),
            Err(err) => {
                warn!(error = %err, "cannot restore panel");
                surface.dispose();
            }
        }
    }

    /// The persisted path while it exists, else the preferred dictionary.
    pub fn resolve_dictionary_path(&mut self) -> Result<Option<PathBuf>> {
        if let Some(stored) = self.store.get(DICTIONARY_PATH_KEY) {
            let stored = PathBuf::from(stored);
            if stored.exists() {
                return Ok(Some(stored));
            }
            info!(path = %stored.display(), "stored dictionary missing; rediscovering");
        }
        let Some(catalog) = self.catalog() else {
            return Ok(None);
        };
        let dictionary = match catalog.find(&self.config.preferred_dictionary) {
            Ok(dictionary) => dictionary,
            Err(err) => {
                self.controller.host_mut().show_info(NO_DICTIONARY_MESSAGE);
                return Err(err.into());
            }
        };
        let data_path = dictionary.data_path();
        self.persist(&data_path)?;
        Ok(Some(data_path))
    }

    pub fn controller(&self) -> &PanelController<H> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PanelController<H> {
        &mut self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn catalog(&mut self) -> Option<DictionaryCatalog> {
        match DictionaryCatalog::discover(&self.config.asset_roots) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                warn!(error = %err, "no dictionary installation");
                self.controller.host_mut().show_info(NO_DICTIONARY_MESSAGE);
                None
            }
        }
    }

    fn persist(&mut self, data_path: &Path) -> Result<()> {
        self.store.update(
            DICTIONARY_PATH_KEY,
            data_path.to_string_lossy().into_owned(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::PREFERRED_DICTIONARY;
    use crate::settings::MemoryStore;
    use crate::stylesheet::STYLESHEET_FILE;
    use crate::testing::{DefinitionFixture, FRAGMENT, FakeHost, STYLESHEET, StaticMarkup};
    use std::fs;

    fn install(fixture: &DefinitionFixture, asset: &str, name: &str) -> PathBuf {
        let resources = fixture
            .root()
            .join("Assets")
            .join(asset)
            .join("AssetData")
            .join(format!("{name}.dictionary"))
            .join("Contents/Resources");
        fs::create_dir_all(&resources).unwrap();
        fs::write(resources.join("Body.data"), b"data").unwrap();
        fs::write(resources.join(STYLESHEET_FILE), STYLESHEET).unwrap();
        resources.join("Body.data")
    }

    fn extension(fixture: &DefinitionFixture) -> Extension<FakeHost, MemoryStore> {
        Extension::new(
            FakeHost::new(),
            MemoryStore::new(),
            RenderPipeline::new(StaticMarkup::new(FRAGMENT)),
            fixture.config(),
        )
    }

    #[test]
    fn start_uses_the_stored_dictionary() {
        let fixture = DefinitionFixture::new();
        let mut extension = extension(&fixture);
        extension
            .store
            .update(
                DICTIONARY_PATH_KEY,
                fixture.data_path().display().to_string(),
            )
            .unwrap();

        extension.execute(Command::Start {
            word: "hello".to_string(),
        });
        let controller = extension.controller();
        assert_eq!(controller.current_dictionary(), Some(fixture.data_path().as_path()));
        assert_eq!(controller.host().log().surfaces[0].borrow().html.len(), 1);
    }

    #[test]
    fn start_discovers_and_persists_the_preferred_dictionary() {
        let fixture = DefinitionFixture::new();
        install(&fixture, "a1", "Oxford Dictionary of English");
        let expected = install(&fixture, "b2", PREFERRED_DICTIONARY);
        let mut extension = extension(&fixture);
        extension
            .store
            .update(DICTIONARY_PATH_KEY, "/gone/Body.data".to_string())
            .unwrap();

        extension.start("hello").unwrap();
        assert_eq!(
            extension.store().get(DICTIONARY_PATH_KEY),
            Some(expected.display().to_string())
        );
        assert_eq!(
            extension.controller().current_dictionary(),
            Some(expected.as_path())
        );
    }

    #[test]
    fn start_without_installation_informs_the_user() {
        let fixture = DefinitionFixture::new();
        let mut extension = extension(&fixture);
        extension.execute(Command::Start {
            word: "hello".to_string(),
        });

        assert!(!extension.controller().is_open());
        let host = extension.controller().host().log();
        assert_eq!(host.infos, vec![NO_DICTIONARY_MESSAGE.to_string()]);
    }

    #[test]
    fn start_without_preferred_dictionary_is_an_error() {
        let fixture = DefinitionFixture::new();
        install(&fixture, "a1", "Oxford Dictionary of English");
        let mut extension = extension(&fixture);
        assert!(extension.start("hello").is_err());
        assert!(!extension.controller().is_open());
        assert_eq!(extension.store().get(DICTIONARY_PATH_KEY), None);
    }

    #[test]
    fn refactor_only_reaches_an_open_panel() {
        let fixture = DefinitionFixture::new();
        let mut extension = extension(&fixture);
        assert!(!extension.refactor());

        extension.controller_mut().show(fixture.data_path(), "hello");
        extension.execute(Command::Refactor);
        let host = extension.controller().host().log();
        assert_eq!(
            host.surfaces[0].borrow().messages,
            vec![r#"{"command":"refactor"}"#.to_string()]
        );
    }

    #[test]
    fn dict_persists_the_picked_dictionary() {
        let fixture = DefinitionFixture::new();
        install(&fixture, "a1", PREFERRED_DICTIONARY);
        let oxford = install(&fixture, "b2", "Oxford Dictionary of English");
        let mut extension = extension(&fixture);
        extension.controller_mut().host_mut().pick = Some("Oxford Dictionary of English".into());

        let picked = extension.select_dictionary().unwrap().unwrap();
        assert_eq!(picked.data_path(), oxford);
        assert_eq!(
            extension.store().get(DICTIONARY_PATH_KEY),
            Some(oxford.display().to_string())
        );
        let host = extension.controller().host().log();
        let (items, placeholder) = &host.picks[0];
        assert_eq!(
            items,
            &vec![
                PREFERRED_DICTIONARY.to_string(),
                "Oxford Dictionary of English".to_string()
            ]
        );
        assert_eq!(placeholder, PICK_PLACEHOLDER);
        assert_eq!(
            host.infos,
            vec!["Complete your setting!\nYour Mac Dict is Oxford Dictionary of English!!".to_string()]
        );
    }

    #[test]
    fn cancelled_pick_changes_nothing() {
        let fixture = DefinitionFixture::new();
        install(&fixture, "a1", PREFERRED_DICTIONARY);
        let mut extension = extension(&fixture);
        extension.execute(Command::Dict);
        assert_eq!(extension.store().get(DICTIONARY_PATH_KEY), None);
        assert!(extension.controller().host().log().infos.is_empty());
    }

    #[test]
    fn restore_revives_with_the_default_word() {
        let fixture = DefinitionFixture::new();
        let mut extension = extension(&fixture);
        extension
            .store
            .update(
                DICTIONARY_PATH_KEY,
                fixture.data_path().display().to_string(),
            )
            .unwrap();
        let (surface, log) = crate::testing::FakeSurface::detached();
        extension.restore(surface);

        assert_eq!(extension.controller().current_word(), Some("initial"));
        assert_eq!(log.borrow().html.len(), 1);
    }

    #[test]
    fn restore_with_empty_store_discovers_the_dictionary() {
        let fixture = DefinitionFixture::new();
        let expected = install(&fixture, "a1", PREFERRED_DICTIONARY);
        let mut extension = extension(&fixture);
        let (surface, log) = crate::testing::FakeSurface::detached();
        extension.restore(surface);

        assert_eq!(
            extension.controller().current_dictionary(),
            Some(expected.as_path())
        );
        assert_eq!(
            extension.store().get(DICTIONARY_PATH_KEY),
            Some(expected.display().to_string())
        );
        assert_eq!(log.borrow().html.len(), 1);
    }

    #[test]
    fn restore_without_any_dictionary_disposes_the_surface() {
        let fixture = DefinitionFixture::new();
        let mut extension = extension(&fixture);
        let (surface, log) = crate::testing::FakeSurface::detached();
        extension.restore(surface);

        assert!(!extension.controller().is_open());
        assert!(log.borrow().html.is_empty());
        assert_eq!(log.borrow().disposed, 1);
    }
}
