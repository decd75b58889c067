//! Lifecycle hook runner.
//!
//! Hooks are user-authored commands bound to fixed lifecycle points (see
//! [`HookName`]). Each run is awaited to completion with output captured in
//! full; there is no timeout and no retry.
//!
//! A hook value is one of:
//! - a path to an executable (`~/bin/x`, `/abs/x`, `./x`), invoked with the
//!   target directory as its only argument;
//! - an inline script body, run as `<shell> -c <script> <hook> <target>` so the
//!   target is `$1`.
//!
//! Either way the working directory is the target and the environment carries
//! `TRY_DIR` and `TRY_HOOK`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::config::{HookConfig, expand_tilde};
use crate::model::types::HookName;

/// Environment variable holding the target directory.
pub const DIR_ENV: &str = "TRY_DIR";
/// Environment variable holding the hook name.
pub const HOOK_ENV: &str = "TRY_HOOK";

const DEFAULT_SHELL: &str = "sh";
const EXIT_NOT_FOUND: i32 = 127;
const EXIT_SPAWN_FAILED: i32 = 126;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("hook executable not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to start {hook} hook: {source}")]
    Spawn {
        hook: HookName,
        #[source]
        source: std::io::Error,
    },

    #[error("{hook} hook aborted the operation: {reason}")]
    Aborted { hook: HookName, reason: String },
}

/// Outcome of one hook execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInvocation {
    pub hook: HookName,
    pub target: PathBuf,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
}

impl HookInvocation {
    fn absent(hook: HookName, target: &Path) -> Self {
        Self {
            hook,
            target: target.to_path_buf(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    fn failed(hook: HookName, target: &Path, exit_code: i32, message: String) -> Self {
        Self {
            hook,
            target: target.to_path_buf(),
            stdout: String::new(),
            stderr: message,
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Human-readable failure reason: stderr, or the exit code when stderr is empty.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exited with code {}", self.exit_code)
        } else {
            stderr.to_string()
        }
    }
}

/// How a configured hook value is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HookCommand {
    Executable(PathBuf),
    Inline(String),
}

impl HookCommand {
    fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let looks_like_path = !trimmed.contains('\n')
            && (trimmed.starts_with('/') || trimmed.starts_with('~') || trimmed.starts_with("./"));
        if looks_like_path {
            HookCommand::Executable(expand_tilde(trimmed))
        } else {
            HookCommand::Inline(value.to_string())
        }
    }
}

/// Runs configured hooks. Holds its configuration by value.
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    config: HookConfig,
}

impl HookRunner {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    /// Run `hook` against `target`.
    ///
    /// Never fails: an unconfigured hook is an immediate success, and a missing
    /// executable or spawn failure comes back as an unsuccessful invocation.
    pub async fn run(&self, hook: HookName, target: &Path) -> HookInvocation {
        match self.try_run(hook, target).await {
            Ok(invocation) => invocation,
            Err(HookError::NotFound(path)) => HookInvocation::failed(
                hook,
                target,
                EXIT_NOT_FOUND,
                format!("hook executable not found: {}", path.display()),
            ),
            Err(e) => HookInvocation::failed(hook, target, EXIT_SPAWN_FAILED, e.to_string()),
        }
    }

    async fn try_run(&self, hook: HookName, target: &Path) -> Result<HookInvocation, HookError> {
        let Some(value) = self.config.command(hook) else {
            return Ok(HookInvocation::absent(hook, target));
        };

        let mut cmd = match HookCommand::parse(value) {
            HookCommand::Executable(path) => {
                if !path.exists() {
                    return Err(HookError::NotFound(path));
                }
                // Relative paths resolve against our cwd, not the target's.
                let path = std::path::absolute(&path).unwrap_or(path);
                let mut cmd = Command::new(&path);
                cmd.arg(target);
                cmd
            }
            HookCommand::Inline(script) => {
                let shell = self.config.shell.as_deref().unwrap_or(DEFAULT_SHELL);
                let shell = which::which(shell).map_err(|_| HookError::NotFound(shell.into()))?;
                let mut cmd = Command::new(shell);
                cmd.arg("-c").arg(script).arg(hook.as_str()).arg(target);
                cmd
            }
        };

        cmd.current_dir(target)
            .env(DIR_ENV, target)
            .env(HOOK_ENV, hook.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::info!(hook = %hook, target = %target.display(), "running hook");
        let output = cmd
            .output()
            .await
            .map_err(|source| HookError::Spawn { hook, source })?;

        let invocation = HookInvocation {
            hook,
            target: target.to_path_buf(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };
        tracing::debug!(hook = %hook, exit_code = invocation.exit_code, "hook finished");
        Ok(invocation)
    }

    /// Run a notification hook; failures are logged and otherwise ignored.
    pub async fn notify(&self, hook: HookName, target: &Path) -> HookInvocation {
        let invocation = self.run(hook, target).await;
        if !invocation.success() {
            tracing::warn!(
                hook = %hook,
                target = %target.display(),
                exit_code = invocation.exit_code,
                reason = %invocation.failure_reason(),
                "hook failed; continuing"
            );
        }
        invocation
    }

    /// Run a gating hook; a non-zero exit becomes [`HookError::Aborted`].
    pub async fn gate(&self, hook: HookName, target: &Path) -> Result<HookInvocation, HookError> {
        let invocation = self.run(hook, target).await;
        if invocation.success() {
            Ok(invocation)
        } else {
            Err(HookError::Aborted {
                hook,
                reason: invocation.failure_reason(),
            })
        }
    }
}
