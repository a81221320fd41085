//! Hardening pipeline from raw definition markup to an embeddable document.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::csp::ContentSecurityPolicy;
use crate::document::{Document, escape_attr};
use crate::error::RenderError;
use crate::nonce::Nonce;
use crate::source::MarkupSource;
use crate::stylesheet::StyleSheet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub dictionary_path: PathBuf,
    pub word: String,
}

impl RenderRequest {
    pub fn new(dictionary_path: impl Into<PathBuf>, word: impl Into<String>) -> Self {
        Self {
            dictionary_path: dictionary_path.into(),
            word: word.into(),
        }
    }
}

/// What the displaying surface contributes to a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerContext {
    /// Origin the viewer serves local resources from.
    pub csp_source: String,
    /// Viewer-resolvable URI of the companion script.
    pub script_uri: String,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub nonce: Nonce,
}

pub struct RenderPipeline {
    source: Box<dyn MarkupSource>,
}

impl RenderPipeline {
    pub fn new(source: impl MarkupSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Renders `request`, logging any failure and yielding no document.
    pub fn render(
        &self,
        request: &RenderRequest,
        viewer: &ViewerContext,
    ) -> Option<RenderedDocument> {
        match self.try_render(request, viewer) {
            Ok(document) => {
                debug!(
                    word = %request.word,
                    dictionary = %request.dictionary_path.display(),
                    bytes = document.html.len(),
                    "rendered definition"
                );
                Some(document)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    word = %request.word,
                    dictionary = %request.dictionary_path.display(),
                    "render unavailable"
                );
                None
            }
        }
    }

    pub fn try_render(
        &self,
        request: &RenderRequest,
        viewer: &ViewerContext,
    ) -> Result<RenderedDocument, RenderError> {
        let markup = self
            .source
            .lookup(&request.dictionary_path, &request.word)?;
        let nonce = Nonce::generate();
        let mut document = Document::parse(markup)?;

        document.append_to_body(script_tag(&viewer.script_uri, &nonce));

        let stylesheet = StyleSheet::load_for(&request.dictionary_path)?;
        document.append_to_head(stylesheet.style_tag(&nonce));

        let policy = ContentSecurityPolicy::for_viewer(&viewer.csp_source, &nonce);
        document.insert_before_meta(policy.meta_tag());

        Ok(RenderedDocument {
            html: document.into_html(),
            nonce,
        })
    }
}

fn script_tag(script_uri: &str, nonce: &Nonce) -> String {
    format!(
        r#"<script nonce="{nonce}" src="{}"></script>"#,
        escape_attr(script_uri)
    )
}
