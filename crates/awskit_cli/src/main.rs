//! Command-line entry point for awskit.

use std::process::ExitCode;

use awskit_core::Error;
use clap::{Parser, Subcommand};

mod commands;
mod prompt;

use commands::ssm::SsmCommand;
use commands::stepfunctions::StepFunctionsCommand;

#[derive(Parser)]
#[command(name = "awskit")]
#[command(about = "Housekeeping for SSM parameters and Step Functions executions", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage SSM Parameter Store entries
    Ssm(SsmCommand),
    /// Manage Step Functions state machines
    Stepfunctions(StepFunctionsCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Ssm(command) => command.run().await,
        Command::Stepfunctions(command) => command.run().await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Aborted) => {
            // A declined prompt is a deliberate stop, not an error report.
            println!("Aborted");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Configures the logging facade. Progress and results go to stdout via
/// plain echoes; diagnostics go to stderr through `log` and stay hidden
/// below warn level unless `RUST_LOG` overrides it.
fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}
