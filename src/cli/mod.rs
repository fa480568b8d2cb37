// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands off to the
// application layer:
//   1. `train`   — trains the reconstruction model
//   2. `inspect` — rebuilds a trained model and summarises it
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "model-lifecycle",
    version,
    about = "Train, checkpoint, resume and inspect burn models."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use model_lifecycle::application::train_use_case::TrainUseCase;

    tracing::info!("Starting run '{}'", args.options.name);
    let summary = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete: {} epoch(s), {} step(s), validation loss {:.4}. Checkpoints in '{}'.",
        summary.epochs_run,
        summary.total_steps,
        summary.val_loss,
        summary.save_dir.display(),
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use model_lifecycle::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.options).execute()?;
    println!("{}", report.model_name);
    println!("{}", report.summary);
    match report.states {
        Some(states) => println!("states: {}", serde_json::Value::Object(states)),
        None => println!("states: none saved"),
    }
    Ok(())
}
