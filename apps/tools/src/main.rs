use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server_api::{dispatch, ApiContext};
use shared::{domain::RenamePolicy, protocol::OperationRequest};
use storage::Registry;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the built-in seed as a JSON seed file.
    DumpSeed,
    /// Validate a JSON seed file.
    CheckSeed { path: String },
    /// Run one operation against a fresh registry and print the result.
    Run {
        #[arg(long)]
        seed_path: Option<String>,
        #[arg(long, default_value = "move_to_end")]
        rename_policy: String,
        /// e.g. '{"operation":"list-events","args":{"doctorId":"1"}}'
        operation: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DumpSeed => {
            let doctors = Registry::seeded().snapshot();
            println!("{}", serde_json::to_string_pretty(&doctors)?);
        }
        Command::CheckSeed { path } => {
            let registry = Registry::load(&path)?;
            let events: usize = registry
                .doctors()
                .map(|record| record.events().len())
                .sum();
            println!(
                "seed ok: doctors={} events={events}",
                registry.doctor_count()
            );
        }
        Command::Run {
            seed_path,
            rename_policy,
            operation,
        } => {
            let registry = match seed_path {
                Some(path) => Registry::load(path)?,
                None => Registry::seeded(),
            };
            let rename_policy = rename_policy
                .parse::<RenamePolicy>()
                .map_err(anyhow::Error::msg)?;
            let request: OperationRequest =
                serde_json::from_str(&operation).context("invalid operation json")?;

            let ctx = ApiContext::new(registry, rename_policy);
            let dispatched = dispatch(&ctx, request);
            println!("{}", serde_json::to_string_pretty(&dispatched.response)?);
        }
    }

    Ok(())
}
