//! `awskit stepfunctions` subcommands: redrive.

use aws_config::BehaviorVersion;
use awskit_core::error::Error;
use awskit_core::stepfunctions::{
    list_executions, parse_datetime, redrive_executions, validate_state_machine_arn, DateWindow,
    ExecutionStatus, RedrivePolicy, SfnExecutionEngine,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
pub struct StepFunctionsCommand {
    #[command(subcommand)]
    command: StepFunctionsSubcommand,
}

impl StepFunctionsCommand {
    pub async fn run(self) -> Result<(), Error> {
        match self.command {
            StepFunctionsSubcommand::Redrive(args) => redrive(args).await,
        }
    }
}

#[derive(Subcommand)]
enum StepFunctionsSubcommand {
    /// Redrive failed executions of a state machine
    Redrive(RedriveArgs),
}

#[derive(Args)]
struct RedriveArgs {
    /// State machine whose failed executions should be redriven
    state_machine_arn: String,
    /// Seconds to sleep between batches
    #[arg(long, short = 't', default_value_t = 60)]
    sleep_time: u64,
    /// Executions per batch; 0 disables pacing
    #[arg(long, short = 'n', default_value_t = 0)]
    batch_size: usize,
    /// Redrive executions started at or after this date (default: 14 days ago)
    #[arg(long)]
    start_date: Option<String>,
    /// Redrive executions started at or before this date (default: now)
    #[arg(long)]
    stop_date: Option<String>,
}

/// Lists failed executions inside the date window and redrives them in
/// batches. Everything is validated before the first remote call.
async fn redrive(args: RedriveArgs) -> Result<(), Error> {
    validate_state_machine_arn(&args.state_machine_arn)?;
    let start = args.start_date.as_deref().map(parse_datetime).transpose()?;
    let stop = args.stop_date.as_deref().map(parse_datetime).transpose()?;
    let window = DateWindow::resolve(start, stop)?;
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let engine = SfnExecutionEngine::new(&config);
    let executions = list_executions(
        &engine,
        &args.state_machine_arn,
        ExecutionStatus::Failed,
        &window,
    )
    .await?;
    if executions.is_empty() {
        println!("No redrivable executions found");
        return Ok(());
    }
    println!("Found {} redrivable executions", executions.len());
    let policy = RedrivePolicy {
        sleep_secs: args.sleep_time,
        batch_size: args.batch_size,
    };
    let summary = redrive_executions(&engine, &executions, &policy).await;
    println!("Redrove {} executions", summary.redriven);
    Ok(())
}
