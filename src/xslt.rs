//! Markup produced by running `xsltproc` over an intermediate XML entry.
//!
//! The entry is staged in a named temporary file that lives exactly as long
//! as the tool invocation; it is unlinked when the guard drops, whether the
//! tool succeeded, failed or never started.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{LookupError, ToolError};
use crate::source::MarkupSource;

pub const XSLTPROC: &str = "xsltproc";
/// Template bundled at the extension root.
pub const TEMPLATE_FILE: &str = "style.xsl";

#[derive(Debug, Clone)]
pub struct XsltMarkupSource<S> {
    entries: S,
    template: PathBuf,
    program: PathBuf,
}

impl<S: MarkupSource> XsltMarkupSource<S> {
    /// `entries` yields the intermediate XML for a word.
    pub fn new(entries: S, template: impl Into<PathBuf>) -> Self {
        Self {
            entries,
            template: template.into(),
            program: PathBuf::from(XSLTPROC),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Applies the template to `xml` and returns the tool's stdout.
    pub fn transform(&self, xml: &str) -> Result<String, ToolError> {
        let mut staged = NamedTempFile::new().map_err(ToolError::TempFile)?;
        staged
            .write_all(xml.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(ToolError::TempFile)?;

        let program = self.program.display().to_string();
        debug!(
            program = %program,
            template = %self.template.display(),
            input = %staged.path().display(),
            "running stylesheet transform"
        );
        let output = Command::new(&self.program)
            .arg(&self.template)
            .arg(staged.path())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| ToolError::InvalidOutput { program })
    }
}

impl<S: MarkupSource> MarkupSource for XsltMarkupSource<S> {
    fn lookup(&self, dictionary_path: &Path, word: &str) -> Result<String, LookupError> {
        let xml = self.entries.lookup(dictionary_path, word)?;
        self.transform(&xml).map_err(|err| {
            warn!(error = %err, word, "stylesheet transform failed");
            LookupError::from(err)
        })
    }
}
