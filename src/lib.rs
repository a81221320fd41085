//! Look up a word in an installed system dictionary and show the definition
//! in a single hardened panel.

pub mod commands;
pub mod config;
pub mod csp;
pub mod discovery;
pub mod document;
pub mod error;
pub mod nonce;
pub mod panel;
pub mod render;
pub mod settings;
pub mod source;
pub mod stylesheet;
pub mod xslt;

#[cfg(test)]
mod testing;

pub use commands::{Command, Extension};
pub use config::PanelConfig;
pub use discovery::{DictionaryCatalog, InstalledDictionary};
pub use error::{Error, Result};
pub use nonce::Nonce;
pub use panel::{
    OutboundMessage, PanelController, PanelHost, PanelMessage, PanelOptions, PanelStatus,
    PanelSurface, ViewColumn,
};
pub use render::{RenderPipeline, RenderRequest, RenderedDocument, ViewerContext};
pub use settings::{JsonFileStore, MemoryStore, StateStore};
pub use source::{CommandSource, FallbackSource, MarkupSource};
pub use xslt::XsltMarkupSource;
