mod cleanup;
mod cli;
mod dates;
mod error;
mod far;
mod fmt;
mod formats;
mod layout;
mod models;
mod pipeline;
mod settings;
mod sheet;
mod splitter;
mod writer;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process { file, output } => cli::process::run(&file, output),
        Commands::Inspect { file, csv } => cli::inspect::run(&file, csv),
        Commands::Demo { output } => cli::demo::run(output),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "maprep", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
