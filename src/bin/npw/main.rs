use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use npw::supervisor::command::DEFAULT_SHELL;
use npw::{InvocationOptions, LaunchError, launch};

#[derive(Parser, Debug)]
#[command(
    name = "npw",
    about = "Run npm from anywhere in a workspace, scoped to the current package"
)]
struct Cli {
    /// Suppress informational output
    #[arg(short, long)]
    quiet: bool,

    /// Run npm through a shell (default shell if no value is given)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = DEFAULT_SHELL, value_name = "SHELL")]
    shell: Option<String>,

    /// Log file path (enables file logging in addition to stderr)
    #[arg(long)]
    log_file: Option<String>,

    /// npm command and arguments, e.g. `run build`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl From<Cli> for InvocationOptions {
    fn from(cli: Cli) -> Self {
        Self {
            quiet: cli.quiet,
            shell: cli.shell,
            args: cli.args,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchError::ProcessExit { code }) => exit_code(code),
        Err(e) => {
            let color = std::io::IsTerminal::is_terminal(&std::io::stderr());
            eprintln!("{}", npw::messages::format_error_message(&e.to_string(), color));
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli) -> Result<(), LaunchError> {
    let log_file = match cli.log_file.as_ref().map(std::fs::File::create).transpose() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Unable to open log file: {e}");
            None
        }
    };
    npw::logger::init(cli.quiet, log_file);

    launch(&cli.into()).await
}

/// Map a child exit code onto the process exit code; out-of-range codes become 1.
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
