use crate::document::escape_attr;
use crate::nonce::Nonce;

/// Policy for a rendered definition: nothing loads by default, images come
/// from the viewer or any https origin, and only nonce-tagged inline script
/// and style may run.
#[derive(Debug, Clone)]
pub struct ContentSecurityPolicy {
    img_sources: Vec<String>,
    nonce: Nonce,
}

impl ContentSecurityPolicy {
    pub fn for_viewer(csp_source: &str, nonce: &Nonce) -> Self {
        let mut img_sources = Vec::with_capacity(2);
        let csp_source = csp_source.trim();
        if !csp_source.is_empty() {
            img_sources.push(csp_source.to_string());
        }
        img_sources.push("https:".to_string());
        Self {
            img_sources,
            nonce: nonce.clone(),
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "default-src 'none'; img-src {images}; script-src 'nonce-{nonce}'; style-src 'nonce-{nonce}'",
            images = self.img_sources.join(" "),
            nonce = self.nonce,
        )
    }

    pub fn meta_tag(&self) -> String {
        format!(
            r#"<meta http-equiv="Content-Security-Policy" content="{}">"#,
            escape_attr(&self.header_value())
        )
    }
}
