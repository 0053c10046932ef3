//! Settings for the interactive interpreter.
//!
//! Defaults can be overridden from the process environment (`LISPY_*` variables) and
//! then from the command line.

use std::env;
use std::path::PathBuf;

use crate::Error;

pub const DEFAULT_PROMPT: &str = "lispy> ";
pub const DEFAULT_STACK_MB: usize = 256;

pub const PROMPT_VAR: &str = "LISPY_PROMPT";
pub const HISTORY_VAR: &str = "LISPY_HISTORY";
pub const NO_PRELUDE_VAR: &str = "LISPY_NO_PRELUDE";
pub const STACK_MB_VAR: &str = "LISPY_STACK_MB";

#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub prompt: String,
    /// Line-editor history is loaded from and saved to this file when set
    pub history_file: Option<PathBuf>,
    pub load_prelude: bool,
    /// Source files loaded, in order, before the prompt appears
    pub files: Vec<PathBuf>,
    /// Stack size of the interpreter thread, in MiB
    pub stack_size_mb: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: DEFAULT_PROMPT.to_owned(),
            history_file: None,
            load_prelude: true,
            files: Vec::new(),
            stack_size_mb: DEFAULT_STACK_MB,
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(Error::Config(format!("invalid {name}: {raw}"))),
    }
}

fn parse_usize(name: &str, raw: &str) -> Result<usize, Error> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("invalid {name}: {raw}")))
}

impl ReplConfig {
    /// Apply overrides looked up through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prompt) = lookup(PROMPT_VAR) {
            self.prompt = prompt;
        }
        if let Some(path) = lookup(HISTORY_VAR).filter(|p| !p.trim().is_empty()) {
            self.history_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(NO_PRELUDE_VAR) {
            self.load_prelude = !parse_flag(NO_PRELUDE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(STACK_MB_VAR) {
            self.stack_size_mb = parse_usize(STACK_MB_VAR, &raw)?;
        }
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, Error> {
        self.apply_vars(|name| env::var(name).ok())
    }

    pub fn stack_size_bytes(&self) -> Result<usize, Error> {
        self.stack_size_mb
            .checked_mul(1024 * 1024)
            .filter(|bytes| *bytes > 0)
            .ok_or_else(|| {
                Error::Config(format!("invalid {STACK_MB_VAR}: {}", self.stack_size_mb))
            })
    }
}
