//! `awskit ssm` subcommands: delete-unused and copy.

use aws_config::BehaviorVersion;
use awskit_core::error::Error;
use awskit_core::ssm::{
    create_parameters, delete_parameters, fetch_parameters, list_parameter_names, plan_copy,
    referenced_parameters, unused_parameters, SsmParameterStore, ValueRewrite,
};
use clap::{Args, Parser, Subcommand};

use crate::prompt;

#[derive(Parser)]
pub struct SsmCommand {
    #[command(subcommand)]
    command: SsmSubcommand,
}

impl SsmCommand {
    pub async fn run(self) -> Result<(), Error> {
        match self.command {
            SsmSubcommand::DeleteUnused(args) => delete_unused(args).await,
            SsmSubcommand::Copy(args) => copy(args).await,
        }
    }
}

#[derive(Subcommand)]
enum SsmSubcommand {
    /// Delete parameters no longer referenced by a deployment template
    DeleteUnused(DeleteUnusedArgs),
    /// Recursively copy parameters from one path prefix to another
    Copy(CopyArgs),
}

#[derive(Args)]
struct DeleteUnusedArgs {
    /// Path prefix the stack's parameters live under
    path_prefix: String,
    /// Template file the parameters are referenced from
    #[arg(long, short = 't', default_value = "template.yaml")]
    template_path: String,
}

#[derive(Args)]
struct CopyArgs {
    /// Source path prefix
    source: String,
    /// Destination path prefix
    destination: String,
    /// Overwrite parameters that already exist at the destination
    #[arg(long, overrides_with = "no_overwrite")]
    overwrite: bool,
    /// Keep parameters that already exist at the destination (default)
    #[arg(long, overrides_with = "overwrite")]
    no_overwrite: bool,
    /// Value substitution s/PATTERN/REPLACEMENT/ applied to copied values
    #[arg(long, short = 'r')]
    replace: Option<String>,
}

/// Diffs the parameters stored under the prefix against the ones the
/// template references, then deletes the difference after confirmation.
async fn delete_unused(args: DeleteUnusedArgs) -> Result<(), Error> {
    let referenced = referenced_parameters(&args.template_path, &args.path_prefix)?;
    if referenced.is_empty() {
        // A template that matches nothing would mark the whole subtree
        // unused; stop before listing the store.
        println!("No parameters found in the template");
        return Ok(());
    }
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = SsmParameterStore::new(&config);
    let remote = list_parameter_names(&store, &args.path_prefix).await?;
    let unused = unused_parameters(&remote, &referenced);
    if unused.is_empty() {
        println!("No parameters to delete");
        return Ok(());
    }
    println!("Found {} parameters to delete:", unused.len());
    for name in &unused {
        println!("\t{name}");
    }
    if !prompt::confirm("Proceed with deletion? (y/[n])") {
        return Err(Error::Aborted);
    }
    delete_parameters(&store, &unused).await?;
    println!("Deleted all unused parameters");
    Ok(())
}

/// Copies every parameter under the source prefix to the destination
/// prefix, optionally rewriting values, after confirmation.
async fn copy(args: CopyArgs) -> Result<(), Error> {
    // Parse the rewrite rule before any remote call so a bad rule costs
    // nothing.
    let rewrite = args
        .replace
        .as_deref()
        .map(|rule| rule.parse::<ValueRewrite>())
        .transpose()?;
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = SsmParameterStore::new(&config);
    log::info!("Copying parameters from {} to {}", args.source, args.destination);
    let parameters = fetch_parameters(&store, &args.source).await?;
    let existing = list_parameter_names(&store, &args.destination).await?;
    let batch = plan_copy(
        parameters,
        &existing,
        &args.source,
        &args.destination,
        rewrite.as_ref(),
        args.overwrite,
    );
    if batch.is_empty() {
        println!("No parameters to copy");
        return Ok(());
    }
    println!("{} parameters will be created/overwritten:", batch.len());
    for parameter in &batch {
        println!("\t{}", parameter.name);
    }
    if !prompt::confirm("Proceed? (y/[n])") {
        return Err(Error::Aborted);
    }
    create_parameters(&store, &batch, args.overwrite).await;
    Ok(())
}
