use std::{path::PathBuf, process};

use clap::Parser;
use mcc_lang::{common::Config, write_files, CompileConfig};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compiles an mcc script into minecraft function files
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The script to compile
    input: PathBuf,
    /// The directory which receives the function files
    #[arg(short, long, default_value = "out")]
    output: PathBuf,
    /// The namespace of the generated functions
    #[arg(long, default_value = "mcc")]
    namespace: String,
    /// Emit source lines and condition descriptions as comments
    #[arg(long)]
    decorate: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let config = Config {
        namespace: args.namespace,
        decorate: args.decorate,
        ..Config::default()
    };
    let mut compile_config = CompileConfig::new(config);

    let id = match compile_config.add_file(&args.input) {
        Ok(id) => id,
        Err(error) => {
            eprintln!("Could not read {}: {error}", args.input.display());
            return 1;
        }
    };

    let compilation = match compile_config.compile(id) {
        Ok(compilation) => compilation,
        Err(error) => {
            eprintln!("{}", compile_config.format_error(&error));
            return 1;
        }
    };

    match write_files(&compilation, &args.output) {
        Ok(paths) => {
            info!(files = paths.len(), output = %args.output.display(), "Compilation finished");
            0
        }
        Err(error) => {
            eprintln!("Could not write to {}: {error}", args.output.display());
            1
        }
    }
}
