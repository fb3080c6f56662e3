// Entrypoint for the CLI application.
// - Keeps `main` small: parse the command line and dispatch.
// - This is the only place the process exits non-zero; everything
//   below returns `anyhow::Result` so the client stays composable.

use clap::Parser;
use song_cli::cli::{self, Cli};

fn main() {
    let args = Cli::parse();
    if let Err(e) = cli::run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
