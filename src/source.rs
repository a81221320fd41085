//! Producers of raw definition markup.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{LookupError, ToolError};

/// Maps a dictionary resource and a search word to definition markup.
pub trait MarkupSource {
    fn lookup(&self, dictionary_path: &Path, word: &str) -> Result<String, LookupError>;
}

impl<S: MarkupSource + ?Sized> MarkupSource for Box<S> {
    fn lookup(&self, dictionary_path: &Path, word: &str) -> Result<String, LookupError> {
        (**self).lookup(dictionary_path, word)
    }
}

/// Runs `program [args..] <dictionary> <word>` and treats stdout as markup.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandSource {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl MarkupSource for CommandSource {
    fn lookup(&self, dictionary_path: &Path, word: &str) -> Result<String, LookupError> {
        if !dictionary_path.exists() {
            return Err(LookupError::DictionaryNotFound(dictionary_path.to_path_buf()));
        }
        let program = self.program_name();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(dictionary_path)
            .arg(word)
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
            }
            .into());
        }
        let markup =
            String::from_utf8(output.stdout).map_err(|_| ToolError::InvalidOutput { program })?;
        if markup.trim().is_empty() {
            return Err(LookupError::NoEntry(word.to_string()));
        }
        Ok(markup)
    }
}

/// Tries `primary`, then `alternate` when the primary producer fails.
#[derive(Debug, Clone)]
pub struct FallbackSource<P, A> {
    primary: P,
    alternate: A,
}

impl<P, A> FallbackSource<P, A> {
    pub fn new(primary: P, alternate: A) -> Self {
        Self { primary, alternate }
    }
}

impl<P: MarkupSource, A: MarkupSource> MarkupSource for FallbackSource<P, A> {
    fn lookup(&self, dictionary_path: &Path, word: &str) -> Result<String, LookupError> {
        match self.primary.lookup(dictionary_path, word) {
            Ok(markup) => Ok(markup),
            Err(err) => {
                debug!(error = %err, word, "primary markup source failed; trying alternate");
                self.alternate.lookup(dictionary_path, word)
            }
        }
    }
}
