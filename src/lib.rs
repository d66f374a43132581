//! Core implementation of npw
//!
//! npw runs `npm` from anywhere inside an npm workspace. It walks up from the current
//! directory to the nearest `package.json` that declares `workspaces`, then runs npm at
//! that root with `-w <package>` pointing back at the directory it was invoked from.
//! Termination signals are relayed to npm and npm's exit code becomes npw's own.

use std::io::IsTerminal;
use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use crate::locate::locate_root;
use crate::supervisor::command::SpawnSpec;
use crate::supervisor::{ExitOutcome, SupervisorError, run_supervised};
use crate::workspace::Workspace;

pub mod locate;
pub mod logger;
pub mod manifest;
pub mod messages;
pub mod supervisor;
pub mod workspace;

/// Package manager executable launched at the workspace root
pub const PACKAGE_MANAGER: &str = "npm";

/// Flag that scopes an npm command to one workspace package
pub const SCOPE_FLAG: &str = "-w";

/// Options parsed from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Suppress informational output
    pub quiet: bool,
    /// Run npm through this shell instead of directly
    pub shell: Option<String>,
    /// Tokens forwarded to npm, starting with the npm sub-command
    pub args: Vec<String>,
}

/// Errors that end an invocation
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to find workspace root (searched from {})", .0.display())]
    RootNotFound(PathBuf),
    #[error("Unknown working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    /// npm ran but the run failed; npw exits with `code` and prints nothing
    #[error("process exited with code {code}")]
    ProcessExit { code: i32 },
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Build the spawn description for `options` invoked inside `workspace`.
#[must_use]
pub fn spawn_spec(options: &InvocationOptions, workspace: &Workspace) -> SpawnSpec {
    SpawnSpec {
        program: PACKAGE_MANAGER.to_string(),
        args: workspace.scoped_args(&options.args, SCOPE_FLAG),
        cwd: workspace.root.clone(),
        shell: options.shell.clone(),
    }
}

/// Locate the workspace root for the current directory and run npm there.
///
/// # Errors
///
/// Returns `LaunchError::RootNotFound` if no ancestor declares workspaces,
/// `LaunchError::ProcessExit` if npm failed or was interrupted, and
/// `LaunchError::Supervisor` if npm could not be run at all.
pub async fn launch(options: &InvocationOptions) -> Result<(), LaunchError> {
    let cwd = std::env::current_dir().map_err(LaunchError::CurrentDir)?;
    let root = locate_root(&cwd)
        .await
        .ok_or_else(|| LaunchError::RootNotFound(cwd.clone()))?;
    let workspace = Workspace::new(root, cwd);
    debug!("Resolved workspace: {workspace:?}");

    let spec = spawn_spec(options, &workspace);
    if !options.quiet {
        eprintln!(
            "{}",
            messages::format_run_message(
                &spec.command_line(),
                &spec.cwd,
                std::io::stderr().is_terminal()
            )
        );
    }

    match run_supervised(&spec).await? {
        ExitOutcome::Success => {
            info!("'{}' finished successfully", spec.program);
            Ok(())
        }
        ExitOutcome::Failure { code } => Err(LaunchError::ProcessExit { code }),
    }
}
