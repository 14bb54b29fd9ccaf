use std::process;

use clap::Parser;
use huffpack::if_tracing;

use crate::cli::Cli;

mod cli;

if_tracing! {
    use tracing_subscriber::{EnvFilter, fmt};
}

fn main() {
    if_tracing! {
        let subscriber = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    let cli = Cli::parse();
    if let Err(err) = cli::execute_command(cli) {
        eprintln!("error: {}", cli::error_chain(&err));
        process::exit(1);
    }
}
