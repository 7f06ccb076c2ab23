use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quickscan", version, about = "Scan photos and PDF documents into text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize text from images and PDF documents
    Scan {
        /// Image or PDF files to scan, in page order
        inputs: Vec<PathBuf>,
        /// Print the session as JSON instead of plain text
        #[arg(long)]
        json: bool,
        /// Also run the listing-field extractor over the result
        #[arg(long)]
        fields: bool,
        /// Read the recognized text aloud when done
        #[arg(long)]
        speak: bool,
        /// Reassemble the scanned pages into a PDF at this path
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
    /// Print listing fields (brand/model/price/ram/storage) for one source
    Extract {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Reassemble images into a PDF without running recognition
    Export {
        images: Vec<PathBuf>,
        /// Output path; defaults to QuickScan_<millis>.pdf in the documents folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Watch a folder and scan files as they appear
    Watch {
        dir: PathBuf,
        /// Run the listing-field extractor after each scan
        #[arg(long)]
        fields: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickscan=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan { inputs, json, fields, speak, export } => {
            commands::scan(inputs, commands::ScanOptions { json, fields, speak, export }).await
        }
        Commands::Extract { input, json } => commands::extract(input, json).await,
        Commands::Export { images, output } => commands::export(images, output).await,
        Commands::Watch { dir, fields } => commands::watch(dir, fields).await,
    }
}
