use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hypergen_cli::config::Config;
use hypergen_cli::generate::{self, GenerateArgs};
use hypergen_cli::rewrite::{self, RewriteArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hypergen", version, about = "Hyperschema-driven client code generation")]
struct Cli {
    /// Path to hypergen.toml (defaults to ./hypergen.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract endpoint metadata and the simplified schema
    Generate(GenerateArgs),
    /// Rewrite compiler-produced declarations into their generic form
    Rewrite(RewriteArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hypergen_core=info,hypergen_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Command::Generate(args) => generate::run(args, config).await,
        Command::Rewrite(args) => rewrite::run(args, &config),
    };
    std::process::exit(code);
}
