//! Single-panel lifecycle.
//!
//! The controller owns at most one live panel. `show` either opens it or
//! updates and re-renders the one already open; `dispose` closes it, clears
//! the slot and runs the registered cleanups newest first. The embedding
//! application owns the controller and routes every host event through it on
//! one thread, so transitions take `&mut self` and need no locking.
//!
//! ```text
//! Closed --show/revive--> Open --show--> Open --dispose--> Closed
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PanelConfig;
use crate::render::{RenderPipeline, RenderRequest, ViewerContext};

/// Word shown when a restored panel carries none.
pub const DEFAULT_WORD: &str = "initial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewColumn {
    One,
    Beside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOptions {
    pub view_type: String,
    pub title: String,
    pub column: ViewColumn,
    pub enable_scripts: bool,
    pub local_resource_roots: Vec<PathBuf>,
}

/// A visual surface provided by the host.
pub trait PanelSurface {
    fn set_title(&mut self, title: &str);
    fn set_html(&mut self, html: String);
    fn reveal(&mut self, column: Option<ViewColumn>);
    /// Returns `false` when the document could not receive the message.
    fn post_message(&mut self, message: &OutboundMessage) -> bool;
    /// Origin the surface serves local resources from.
    fn csp_source(&self) -> String;
    /// Surface-resolvable URI for a local file.
    fn resource_uri(&self, path: &Path) -> String;
    fn dispose(&mut self);
}

/// The host window: creates surfaces and talks to the user.
pub trait PanelHost {
    type Surface: PanelSurface;

    fn create_panel(&mut self, options: &PanelOptions) -> Self::Surface;
    fn has_active_editor(&self) -> bool;
    fn show_error(&mut self, message: &str);
    fn show_info(&mut self, message: &str);
    fn quick_pick(&mut self, items: &[String], placeholder: &str) -> Option<String>;
}

/// Message posted by the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMessage {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PanelMessage {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Message pushed into the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum OutboundMessage {
    Refactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupId(usize);

type Cleanup = Box<dyn FnOnce()>;

struct LivePanel<S> {
    surface: S,
    request: RenderRequest,
    cleanups: Vec<Option<Cleanup>>,
}

pub struct PanelController<H: PanelHost> {
    host: H,
    pipeline: RenderPipeline,
    view_type: String,
    title: String,
    resource_root: PathBuf,
    script_path: PathBuf,
    current: Option<LivePanel<H::Surface>>,
}

impl<H: PanelHost> PanelController<H> {
    pub fn new(host: H, pipeline: RenderPipeline, config: &PanelConfig) -> Self {
        Self {
            host,
            pipeline,
            view_type: config.view_type.clone(),
            title: config.title.clone(),
            resource_root: config.media_dir(),
            script_path: config.script_path(),
            current: None,
        }
    }

    /// Opens the panel for `word`, or retargets and re-renders the open one.
    pub fn show(&mut self, dictionary_path: impl Into<PathBuf>, word: impl Into<String>) {
        let request = RenderRequest::new(dictionary_path, word);
        let column = self
            .host
            .has_active_editor()
            .then_some(ViewColumn::Beside);

        if let Some(panel) = self.current.as_mut() {
            debug!(word = %request.word, "retargeting open panel");
            panel.request = request;
            self.update();
            if let Some(panel) = self.current.as_mut() {
                panel.surface.reveal(column);
            }
            return;
        }

        let options = PanelOptions {
            view_type: self.view_type.clone(),
            title: self.title.clone(),
            column: column.unwrap_or(ViewColumn::One),
            enable_scripts: true,
            local_resource_roots: vec![self.resource_root.clone()],
        };
        let surface = self.host.create_panel(&options);
        info!(word = %request.word, "opened definition panel");
        self.establish(surface, request);
    }

    /// Adopts a surface restored by the host, e.g. after a session restart.
    pub fn revive(
        &mut self,
        surface: H::Surface,
        dictionary_path: impl Into<PathBuf>,
        word: Option<&str>,
    ) {
        if self.current.is_some() {
            debug!("replacing open panel with restored surface");
            self.dispose();
        }
        let request = RenderRequest::new(dictionary_path, word.unwrap_or(DEFAULT_WORD));
        info!(word = %request.word, "restored definition panel");
        self.establish(surface, request);
    }

    /// Host notification that the panel's visibility changed.
    pub fn on_view_state_changed(&mut self, visible: bool) {
        if visible {
            self.on_visibility_restored();
        }
    }

    /// Re-renders the current definition; content does not survive hiding.
    pub fn on_visibility_restored(&mut self) -> bool {
        self.update()
    }

    pub fn on_message(&mut self, message: PanelMessage) {
        match message.command.as_str() {
            "alert" => {
                let text = message.text.unwrap_or_default();
                self.host.show_error(&text);
            }
            other => debug!(command = other, "ignoring unrecognized panel message"),
        }
    }

    pub fn on_raw_message(&mut self, raw: &str) {
        match PanelMessage::from_json(raw) {
            Ok(message) => self.on_message(message),
            Err(err) => debug!(error = %err, "ignoring malformed panel message"),
        }
    }

    /// Posts `message` into the live document; `false` when nothing is open.
    pub fn broadcast(&mut self, message: &OutboundMessage) -> bool {
        match self.current.as_mut() {
            Some(panel) => panel.surface.post_message(message),
            None => false,
        }
    }

    /// The host closed the panel.
    pub fn on_disposed(&mut self) {
        self.dispose();
    }

    pub fn dispose(&mut self) {
        let Some(mut panel) = self.current.take() else {
            return;
        };
        panel.surface.dispose();
        let mut ran = 0usize;
        while let Some(slot) = panel.cleanups.pop() {
            if let Some(cleanup) = slot {
                cleanup();
                ran += 1;
            }
        }
        info!(cleanups = ran, "closed definition panel");
    }

    /// Registers `cleanup` to run when the open panel is disposed.
    pub fn register_cleanup(&mut self, cleanup: impl FnOnce() + 'static) -> Option<CleanupId> {
        let panel = self.current.as_mut()?;
        panel.cleanups.push(Some(Box::new(cleanup)));
        Some(CleanupId(panel.cleanups.len() - 1))
    }

    /// Drops a cleanup without running it; its owner already released it.
    pub fn release_cleanup(&mut self, id: CleanupId) -> bool {
        self.current
            .as_mut()
            .and_then(|panel| panel.cleanups.get_mut(id.0))
            .and_then(Option::take)
            .is_some()
    }

    pub fn status(&self) -> PanelStatus {
        if self.current.is_some() {
            PanelStatus::Open
        } else {
            PanelStatus::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current.as_ref().map(|panel| panel.request.word.as_str())
    }

    pub fn current_dictionary(&self) -> Option<&Path> {
        self.current
            .as_ref()
            .map(|panel| panel.request.dictionary_path.as_path())
    }

    pub fn surface(&self) -> Option<&H::Surface> {
        self.current.as_ref().map(|panel| &panel.surface)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn establish(&mut self, surface: H::Surface, request: RenderRequest) {
        self.current = Some(LivePanel {
            surface,
            request,
            cleanups: Vec::new(),
        });
        self.update();
    }

    // Leaves the previous document in place when the render fails.
    fn update(&mut self) -> bool {
        let Some(panel) = self.current.as_mut() else {
            return false;
        };
        panel.surface.set_title(&self.title);
        let viewer = ViewerContext {
            csp_source: panel.surface.csp_source(),
            script_uri: panel.surface.resource_uri(&self.script_path),
        };
        match self.pipeline.render(&panel.request, &viewer) {
            Some(document) => {
                panel.surface.set_html(document.html);
                true
            }
            None => false,
        }
    }
}
