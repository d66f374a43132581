//! Spawning and supervising the package manager
//!
//! The child runs with inherited stdio, environment and a caller-chosen working
//! directory. While it runs, interrupt/terminate/quit are relayed to it and remembered:
//! any relayed signal turns the final outcome into [`INTERRUPTED_EXIT_CODE`], no matter
//! how the child itself exits. The supervisor always waits for the child to actually
//! terminate before resolving.

pub mod command;
pub mod signals;

use std::process::ExitStatus;

use log::{debug, info};
use thiserror::Error;
use tokio::process::Command;

use self::command::SpawnSpec;
use self::signals::SignalSubscription;

/// Exit code reported when a termination signal was relayed to the child
pub const INTERRUPTED_EXIT_CODE: i32 = 2;

/// Errors that prevent a supervised run from producing an exit code
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a supervised child ended, after signal overrides are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure { code: i32 },
}

impl ExitOutcome {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure { code } => code,
        }
    }
}

/// Combine a recorded signal override with the child's own exit code.
///
/// The override wins whenever present, even over a clean exit.
#[must_use]
pub fn resolve_exit(interrupted: Option<i32>, child_code: i32) -> ExitOutcome {
    match interrupted {
        Some(code) => ExitOutcome::Failure { code },
        None if child_code != 0 => ExitOutcome::Failure { code: child_code },
        None => ExitOutcome::Success,
    }
}

/// Exit code of a finished child; signal deaths follow the shell's `128 + signo`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Run `spec` to completion, relaying termination signals to it.
///
/// Signal listeners exist only for the duration of this call and are released on
/// every return path.
///
/// # Errors
///
/// Returns `SupervisorError::Spawn` if the program could not be started at all,
/// `SupervisorError::Signals` if signal listeners could not be installed, or
/// `SupervisorError::Wait` if waiting on the child failed.
pub async fn run_supervised(spec: &SpawnSpec) -> Result<ExitOutcome, SupervisorError> {
    let mut signals = SignalSubscription::install().map_err(SupervisorError::Signals)?;
    let result = supervise(spec, &mut signals).await;
    drop(signals);
    result
}

async fn supervise(
    spec: &SpawnSpec,
    signals: &mut SignalSubscription,
) -> Result<ExitOutcome, SupervisorError> {
    let mut child = Command::from(spec)
        .spawn()
        .map_err(|e| SupervisorError::Spawn {
            program: spec.program.clone(),
            source: e,
        })?;
    debug!("Spawned '{}' (pid {:?})", spec.program, child.id());

    let mut interrupted = None;
    let status = loop {
        tokio::select! {
            status = child.wait() => {
                break status.map_err(|e| SupervisorError::Wait {
                    program: spec.program.clone(),
                    source: e,
                })?;
            }
            Some(signal) = signals.recv() => {
                info!("Received {signal:?}, forwarding to '{}'", spec.program);
                // `id()` is `None` once the child has been reaped
                if let Some(pid) = child.id() {
                    signal.forward_to(pid);
                }
                interrupted = Some(INTERRUPTED_EXIT_CODE);
            }
        }
    };

    let code = status_code(status);
    debug!("'{}' exited with {status}", spec.program);
    Ok(resolve_exit(interrupted, code))
}
