//! Fixtures and recording host fakes shared by the unit tests.

use std::cell::{Ref, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::{TempDir, tempdir};

use crate::config::PanelConfig;
use crate::error::LookupError;
use crate::panel::{OutboundMessage, PanelHost, PanelOptions, PanelSurface, ViewColumn};
use crate::render::RenderRequest;
use crate::source::MarkupSource;
use crate::stylesheet::STYLESHEET_FILE;

pub const FRAGMENT: &str = concat!(
    "<html><head><title>hello</title><meta charset=\"utf-8\">",
    "<meta name=\"viewport\" content=\"width=device-width\"></head>",
    "<body><d:entry><span class=\"hw\">hello</span></d:entry></body></html>",
);

pub const STYLESHEET: &str = "html { font-size: 12pt; color: text; }\n\
    a { color: -webkit-link; }\n\
    .pos { color: -apple-system-secondary-label; }\n\
    .ex { color: -apple-system-secondary-label; }\n\
    .note { color: -apple-system-tertiary-label; }\n\
    body { background-color: -apple-system-text-background; }\n";

pub struct StaticMarkup {
    markup: &'static str,
    failing: Vec<&'static str>,
}

impl StaticMarkup {
    pub fn new(markup: &'static str) -> Self {
        Self {
            markup,
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, word: &'static str) -> Self {
        self.failing.push(word);
        self
    }
}

impl MarkupSource for StaticMarkup {
    fn lookup(&self, _dictionary_path: &Path, word: &str) -> Result<String, LookupError> {
        if self.failing.iter().any(|failing| *failing == word) {
            return Err(LookupError::NoEntry(word.to_string()));
        }
        Ok(self.markup.to_string())
    }
}

/// A dictionary data file with its stylesheet and an extension root.
pub struct DefinitionFixture {
    dir: TempDir,
}

impl DefinitionFixture {
    pub fn new() -> Self {
        let fixture = Self::without_stylesheet();
        fs::write(fixture.resources().join(STYLESHEET_FILE), STYLESHEET).unwrap();
        fixture
    }

    pub fn without_stylesheet() -> Self {
        let dir = tempdir().unwrap();
        let fixture = Self { dir };
        fs::create_dir_all(fixture.resources()).unwrap();
        fs::create_dir_all(fixture.extension().join("media")).unwrap();
        fs::write(fixture.data_path(), b"data").unwrap();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn resources(&self) -> PathBuf {
        self.root().join("Dict.dictionary/Contents/Resources")
    }

    pub fn data_path(&self) -> PathBuf {
        self.resources().join("Body.data")
    }

    pub fn extension(&self) -> PathBuf {
        self.root().join("extension")
    }

    pub fn request(&self, word: &str) -> RenderRequest {
        RenderRequest::new(self.data_path(), word)
    }

    pub fn config(&self) -> PanelConfig {
        PanelConfig {
            extension_path: self.extension(),
            asset_roots: vec![self.root().join("Assets")],
            state_path: self.root().join("state.json"),
            ..PanelConfig::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub titles: Vec<String>,
    pub html: Vec<String>,
    pub reveals: Vec<Option<ViewColumn>>,
    pub messages: Vec<String>,
    pub disposed: usize,
}

pub struct FakeSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl FakeSurface {
    /// A surface not created through a host, as restored by a session.
    pub fn detached() -> (Self, Rc<RefCell<SurfaceLog>>) {
        let log = Rc::new(RefCell::new(SurfaceLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl PanelSurface for FakeSurface {
    fn set_title(&mut self, title: &str) {
        self.log.borrow_mut().titles.push(title.to_string());
    }

    fn set_html(&mut self, html: String) {
        self.log.borrow_mut().html.push(html);
    }

    fn reveal(&mut self, column: Option<ViewColumn>) {
        self.log.borrow_mut().reveals.push(column);
    }

    fn post_message(&mut self, message: &OutboundMessage) -> bool {
        let json = serde_json::to_string(message).unwrap();
        self.log.borrow_mut().messages.push(json);
        true
    }

    fn csp_source(&self) -> String {
        "fake-resource:".to_string()
    }

    fn resource_uri(&self, path: &Path) -> String {
        format!("fake-resource:{}", path.display())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

#[derive(Debug, Default)]
pub struct HostLog {
    pub created: Vec<PanelOptions>,
    pub surfaces: Vec<Rc<RefCell<SurfaceLog>>>,
    pub errors: Vec<String>,
    pub infos: Vec<String>,
    pub picks: Vec<(Vec<String>, String)>,
}

impl HostLog {
    pub fn live_surfaces(&self) -> usize {
        self.surfaces
            .iter()
            .filter(|surface| surface.borrow().disposed == 0)
            .count()
    }
}

#[derive(Default)]
pub struct FakeHost {
    log: Rc<RefCell<HostLog>>,
    pub active_editor: bool,
    pub pick: Option<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, HostLog> {
        self.log.borrow()
    }
}

impl PanelHost for FakeHost {
    type Surface = FakeSurface;

    fn create_panel(&mut self, options: &PanelOptions) -> FakeSurface {
        let (surface, log) = FakeSurface::detached();
        let mut host = self.log.borrow_mut();
        host.created.push(options.clone());
        host.surfaces.push(log);
        surface
    }

    fn has_active_editor(&self) -> bool {
        self.active_editor
    }

    fn show_error(&mut self, message: &str) {
        self.log.borrow_mut().errors.push(message.to_string());
    }

    fn show_info(&mut self, message: &str) {
        self.log.borrow_mut().infos.push(message.to_string());
    }

    fn quick_pick(&mut self, items: &[String], placeholder: &str) -> Option<String> {
        self.log
            .borrow_mut()
            .picks
            .push((items.to_vec(), placeholder.to_string()));
        self.pick.clone()
    }
}
