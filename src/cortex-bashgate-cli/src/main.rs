//! Cortex Bashgate - main entry point.
//!
//! Exit codes: 0 allow, 1 ask, 2 deny, 3 error (bad arguments, unreadable
//! or invalid pattern configuration, I/O failure).

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cortex_bashgate_cli::EXIT_ERROR;
use cortex_bashgate_cli::cli::Cli;
use cortex_bashgate_cli::logging::{self, LOG_ENV_VAR};

fn run(cli: &Cli) -> Result<u8> {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = cli.effective_log_level(env_level.as_deref());
    let _log_guard = logging::init(level, cli.log_file.as_deref())?;

    cortex_bashgate_cli::dispatch(cli)
}

fn main() -> ExitCode {
    // clap's own usage-error code (2) would read as a deny.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(if err.use_stderr() { EXIT_ERROR } else { 0 });
        }
    };

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
