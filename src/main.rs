// Thin command-line shell; all network logic lives in the library.
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use nnhs::{check_range, load_model, InferenceConfig, InferenceEngine, RangeCounters};

#[derive(Parser)]
#[command(name = "nnhs", about = "Inspect and evaluate feed-forward .net descriptors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the declared variables and topology of a model.
    Describe { model: PathBuf },
    /// Evaluate one feature vector.
    Eval {
        model: PathBuf,
        /// Use the tabulated sigmoid.
        #[arg(long)]
        fast: bool,
        #[arg(required = true, allow_negative_numbers = true)]
        features: Vec<f64>,
    },
    /// Write the parsed model as JSON.
    ExportJson { model: PathBuf, output: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nnhs=info".into()),
        )
        .init();

    match Cli::parse().command {
        Commands::Describe { model } => {
            let net = load_model(&model)?;
            println!("{net}");
            for line in net.info() {
                println!("  {line}");
            }
            for (name, range) in net.input_variables().iter().zip(net.input_range()) {
                println!("  in  {name:<24} [{}, {}]", range.min, range.max);
            }
            for (name, range) in net.output_variables().iter().zip(net.output_range()) {
                println!("  out {name:<24} [{}, {}]", range.min, range.max);
            }
        }
        Commands::Eval { model, fast, features } => {
            let net = load_model(&model)?;
            let config = if fast { InferenceConfig::fast() } else { InferenceConfig::default() };
            let engine = InferenceEngine::new(&config);

            let mut counters = RangeCounters::for_model(&net);
            check_range(&net, &features, &mut counters)?;
            for row in counters.report(&net) {
                warn!(variable = %row.variable, min = row.min, max = row.max, "feature out of training range");
            }

            let outputs = engine.forward(&net, &features)?;
            for (i, value) in outputs.iter().enumerate() {
                match net.output_variables().get(i) {
                    Some(name) => println!("{name} = {value}"),
                    None => println!("output[{i}] = {value}"),
                }
            }
        }
        Commands::ExportJson { model, output } => {
            let net = load_model(&model)?;
            let out = output.to_str().context("output path is not valid UTF-8")?;
            net.save_json(out)?;
            println!("wrote {}", output.display());
        }
    }

    Ok(())
}
