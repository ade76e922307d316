pub mod demo;
pub mod inspect;
pub mod process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "maprep", about = "Management-accounts workbook processor.", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a client workbook: recalculate the Fixed Asset Register and
    /// rebuild the per-account summary sheets.
    Process {
        /// Path to the input .xlsx workbook
        file: String,
        /// Output path (default: <input>-processed.xlsx)
        #[arg(long)]
        output: Option<String>,
    },
    /// Parse a workbook's FAR sheet and show the recalculated asset tables.
    Inspect {
        /// Path to the input .xlsx workbook
        file: String,
        /// Directory to also dump each table as CSV
        #[arg(long)]
        csv: Option<String>,
    },
    /// Write a sample input workbook to explore the tool with.
    Demo {
        /// Output path (default: maprep-demo.xlsx)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
