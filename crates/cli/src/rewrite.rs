//! `hypergen rewrite`: compiler-produced declarations -> generic declarations.

use std::path::{Path, PathBuf};

use clap::Args;
use hypergen_core::{RuleSet, RuleTable, rewrite_declaration_source};
use tracing::info;

use crate::config::Config;
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct RewriteArgs {
    /// Declaration file produced by the schema compiler
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
    /// Destination of the rewritten declarations
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

/// Rewrite `input` into `output`. The output file is only touched on success.
pub fn rewrite_file(input: &Path, output: &Path, rules: &RuleSet) -> Result<(), CliError> {
    let table = RuleTable::build(rules)?;
    let src = std::fs::read_to_string(input).map_err(|e| CliError::io(input, e))?;
    let rewritten = rewrite_declaration_source(&src, &table)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    std::fs::write(output, &rewritten).map_err(|e| CliError::io(output, e))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rules = table.len(),
        "Rewrote declarations."
    );
    Ok(())
}

pub fn run(args: RewriteArgs, config: &Config) -> i32 {
    match rewrite_file(&args.input, &args.output, &config.rules) {
        Ok(()) => {
            println!("wrote {}", args.output.display());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
