use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SSACLI_PATH: &str = "/usr/sbin/ssacli";

const SHOW_CONFIG_ARGS: [&str; 5] = ["ctrl", "all", "show", "config", "detail"];

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {code}: {detail}")]
    Failed {
        command: String,
        code: String,
        detail: String,
    },
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait Invoke {
    fn show_config_detail(&self) -> Result<CommandOutput, CommandError>;
}

#[derive(Debug, Clone)]
pub struct Ssacli {
    path: PathBuf,
}

impl Ssacli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for Ssacli {
    fn default() -> Self {
        Self::new(Path::new(DEFAULT_SSACLI_PATH))
    }
}

impl Invoke for Ssacli {
    fn show_config_detail(&self) -> Result<CommandOutput, CommandError> {
        let command = self.path.display().to_string();
        debug!(command = %command, args = ?SHOW_CONFIG_ARGS, "running ssacli");

        // LC_ALL=C keeps the output in the collation the parser expects.
        let output = Command::new(&self.path)
            .args(SHOW_CONFIG_ARGS)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let mut detail = String::new();
            if !stdout.is_empty() {
                detail.push_str(&format!("stdout: {stdout}"));
            }
            if !stderr.is_empty() {
                detail.push_str(&format!("stderr: {stderr}"));
            }
            return Err(CommandError::Failed {
                command,
                code: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                detail,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
