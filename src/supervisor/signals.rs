//! Scoped termination-signal handling for a supervised child
//!
//! A [`SignalSubscription`] listens for interrupt, terminate and quit only while it is
//! alive. Dropping it releases all three listeners.

use log::debug;

/// A termination signal received while a child was being supervised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedSignal {
    Interrupt,
    Terminate,
    Quit,
}

#[cfg(unix)]
mod imp {
    use std::io;

    use log::{debug, warn};
    use nix::sys::signal::{Signal as NixSignal, kill};
    use nix::unistd::Pid;
    use tokio::signal::unix::{Signal, SignalKind, signal};

    use super::ForwardedSignal;

    impl ForwardedSignal {
        fn as_nix(self) -> NixSignal {
            match self {
                ForwardedSignal::Interrupt => NixSignal::SIGINT,
                ForwardedSignal::Terminate => NixSignal::SIGTERM,
                ForwardedSignal::Quit => NixSignal::SIGQUIT,
            }
        }

        /// Send the same signal to `pid`. Failures are logged, never fatal.
        pub fn forward_to(self, pid: u32) {
            let Ok(raw) = i32::try_from(pid) else {
                warn!("Cannot forward {self:?}: pid {pid} out of range");
                return;
            };
            match kill(Pid::from_raw(raw), self.as_nix()) {
                Ok(()) => debug!("Forwarded {self:?} to pid {pid}"),
                Err(e) => debug!("Failed to forward {self:?} to pid {pid}: {e}"),
            }
        }
    }

    pub struct SignalSubscription {
        interrupt: Signal,
        terminate: Signal,
        quit: Signal,
    }

    impl SignalSubscription {
        /// Start listening for SIGINT, SIGTERM and SIGQUIT.
        ///
        /// # Errors
        ///
        /// Returns an error if a listener cannot be registered.
        pub fn install() -> io::Result<Self> {
            let subscription = Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
                quit: signal(SignalKind::quit())?,
            };
            debug!("Signal handlers installed");
            Ok(subscription)
        }

        /// Wait for the next signal. Returns `None` once no listener can fire again.
        pub async fn recv(&mut self) -> Option<ForwardedSignal> {
            tokio::select! {
                Some(()) = self.interrupt.recv() => Some(ForwardedSignal::Interrupt),
                Some(()) = self.terminate.recv() => Some(ForwardedSignal::Terminate),
                Some(()) = self.quit.recv() => Some(ForwardedSignal::Quit),
                else => None,
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io;

    use log::debug;

    use super::ForwardedSignal;

    impl ForwardedSignal {
        /// Console Ctrl-C already reaches every process attached to the console.
        pub fn forward_to(self, pid: u32) {
            debug!("{self:?} reaches pid {pid} through the console");
        }
    }

    pub struct SignalSubscription {
        ctrl_c: tokio::signal::windows::CtrlC,
    }

    impl SignalSubscription {
        /// Start listening for Ctrl-C.
        ///
        /// # Errors
        ///
        /// Returns an error if the listener cannot be registered.
        pub fn install() -> io::Result<Self> {
            let subscription = Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            };
            debug!("Signal handlers installed");
            Ok(subscription)
        }

        /// Wait for the next signal. Returns `None` once no listener can fire again.
        pub async fn recv(&mut self) -> Option<ForwardedSignal> {
            self.ctrl_c.recv().await.map(|()| ForwardedSignal::Interrupt)
        }
    }
}

pub use imp::SignalSubscription;

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        debug!("Signal handlers released");
    }
}
