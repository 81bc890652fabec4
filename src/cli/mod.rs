use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use townydb::persist::HandlerConfig;
use townydb::storage::{FlatFileParser, FlatFileWriter, ParsedRecord};

#[derive(Parser)]
#[command(name = "townydb")]
#[command(about = "Inspect and normalize flat key-value record files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the entries of a record file, sorted by key
    Parse {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a record file in canonical escaped form
    Normalize {
        file: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Handler configuration (JSON) supplying the file header
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default handler configuration as JSON
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse { file, json } => parse(&file, json),
        Command::Normalize { file, out, config } => {
            normalize(&file, out.as_deref(), config.as_deref())
        }
        Command::Config => {
            println!("{}", HandlerConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn read_record(file: &Path) -> Result<ParsedRecord> {
    FlatFileParser::parse_file(file)
        .with_context(|| format!("Failed to parse '{}'", file.display()))
}

fn parse(file: &Path, json: bool) -> Result<()> {
    let record = read_record(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    for (key, value) in record.iter() {
        println!("{} = {}", key, value);
    }
    log::info!("{} entries in {}", record.len(), file.display());
    Ok(())
}

fn load_config(path: &Path) -> Result<HandlerConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    HandlerConfig::from_json(&text).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

fn normalize(file: &Path, out: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let record = read_record(file)?;
    let config = match config {
        Some(path) => load_config(path)?,
        None => HandlerConfig::default(),
    };
    let writer = match config.file_header {
        Some(header) => FlatFileWriter::new().with_header(header),
        None => FlatFileWriter::new(),
    };

    match out {
        Some(out) => {
            writer
                .write_entries(out, record.iter())
                .with_context(|| format!("Failed to write '{}'", out.display()))?;
            println!("Normalized {} entries into {}", record.len(), out.display());
        }
        None => print!("{}", writer.render_entries(record.iter())),
    }
    Ok(())
}
