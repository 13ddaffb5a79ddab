//! cbf - binary container archive command line interface

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cbf::archive::{compress, extract};
use cbf::{decode, Dataset, Value};

#[derive(Parser)]
#[command(name = "cbf")]
#[command(about = "binary container format - pack directory trees into single files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// pack a directory into a cbf archive
    Compress {
        /// directory to pack
        path: PathBuf,

        /// output archive path (default: <basename>.cbf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// unpack a cbf archive into a directory
    Extract {
        /// archive to unpack
        path: PathBuf,

        /// output directory (default: archive name without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// list archive contents without reading blob payloads
    Ls {
        /// archive to list
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> cbf::Result<()> {
    match cli.command {
        Commands::Compress { path, output } => {
            let output = output.unwrap_or_else(|| default_archive_name(&path));
            compress(&path, &output)?;
            println!("compressed {} to {}", path.display(), output.display());
        }

        Commands::Extract { path, output } => {
            let output = output.unwrap_or_else(|| default_extract_name(&path));
            extract(&path, &output)?;
            println!("extracted {} to {}", path.display(), output.display());
        }

        Commands::Ls { path } => {
            let file = std::fs::File::open(&path).map_err(|source| cbf::Error::File {
                path: path.clone(),
                source,
            })?;
            let dataset = decode(std::io::BufReader::new(file))?;
            print_dataset(&dataset, 0);
        }
    }

    Ok(())
}

/// default archive name: source basename plus ".cbf"
fn default_archive_name(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(".cbf");
            PathBuf::from(name)
        }
        None => PathBuf::from("archive.cbf"),
    }
}

/// default extraction target: archive name without its extension
fn default_extract_name(path: &Path) -> PathBuf {
    match path.file_stem() {
        Some(stem) => PathBuf::from(stem),
        None => PathBuf::from("archive"),
    }
}

fn print_dataset(dataset: &Dataset, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in dataset.iter() {
        match value {
            Value::Dataset(nested) => {
                println!("{}{}/", indent, key);
                print_dataset(nested, depth + 1);
            }
            Value::Blob(blob) => {
                println!("{}{} ({} bytes)", indent, key, blob.len());
            }
            other => {
                println!("{}{} ({})", indent, key, other.type_name());
            }
        }
    }
}
