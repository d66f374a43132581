use std::path::PathBuf;
use std::process::Stdio;

use log::debug;
use tokio::process::Command;

/// Shell used when `--shell` is passed without a value
#[cfg(not(windows))]
pub const DEFAULT_SHELL: &str = "sh";
#[cfg(windows)]
pub const DEFAULT_SHELL: &str = "cmd.exe";

/// Everything needed to start the package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub shell: Option<String>,
}

impl SpawnSpec {
    /// The full command line as a single, shell-quoted string.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|arg| quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&SpawnSpec> for Command {
    fn from(spec: &SpawnSpec) -> Self {
        debug!(
            "Building command '{}' in {}",
            spec.command_line(),
            spec.cwd.display()
        );
        let mut command = match &spec.shell {
            Some(shell) => {
                let mut command = Command::new(shell);
                command.args(shell_args()).arg(spec.command_line());
                command
            }
            None => {
                let mut command = Command::new(&spec.program);
                command.args(&spec.args);
                command
            }
        };
        command
            .current_dir(&spec.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

#[cfg(not(windows))]
fn shell_args() -> &'static [&'static str] {
    &["-c"]
}

#[cfg(windows)]
fn shell_args() -> &'static [&'static str] {
    &["/d", "/s", "/c"]
}

/// Quote a single word for a POSIX shell, leaving plain words untouched.
fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
