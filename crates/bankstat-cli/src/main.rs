mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bankstat",
    version,
    about = "Extract normalized transactions from bank statements"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a statement (PDF, CSV or spreadsheet) into transactions
    Parse {
        /// Path to the statement file
        input_file: PathBuf,

        /// Input format: pdf, delimited or workbook (default: by extension)
        #[arg(short, long)]
        format: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input_file,
            format,
            output,
            out,
        } => commands::parse::run(input_file, format.as_deref(), &output, out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
