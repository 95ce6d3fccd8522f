use crate::config::{Config, load_config};
use crate::content::{CardContext, FileMap};
use crate::graph::FileMapping;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "logicmap",
    version,
    about = "Lays out a classified conversation graph as a canvas document"
)]
pub struct Args {
    /// Classifier response (JSON, possibly inside a code fence) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output .canvas file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Session title, used as the note folder in back-link paths
    #[arg(short = 's', long = "session-title", default_value = "")]
    pub session_title: String,

    /// Vault base path prefixed to back-link paths
    #[arg(short = 'b', long = "base-path", default_value = "")]
    pub base_path: String,

    /// Note-file mapping JSON: [{"index": 1, "fileName": "001-... .md"}, ...]
    #[arg(short = 'm', long = "mapping")]
    pub mapping: Option<PathBuf>,

    /// Raw conversation item count driving the density policy.
    /// Defaults to the number of nodes in the response.
    #[arg(short = 'n', long = "raw-count")]
    pub raw_count: Option<usize>,

    /// Config JSON file (theme and layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long = "compact")]
    pub compact: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    let raw = read_input(args.input.as_deref())?;
    let mapping = read_mapping(args.mapping.as_deref())?;
    let ctx = CardContext {
        session_title: args.session_title,
        base_path: args.base_path,
        files: FileMap::from_mapping(&mapping),
    };
    let config: Option<Config> = match args.config.as_deref() {
        Some(path) => Some(load_config(Some(path))?),
        None => None,
    };

    let canvas = crate::generate_canvas(&raw, &ctx, args.raw_count, config.as_ref())
        .context("failed to lay out classifier response")?;

    let json = if args.compact {
        serde_json::to_string(&canvas)?
    } else {
        serde_json::to_string_pretty(&canvas)?
    };

    match args.output.as_deref() {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_mapping(path: Option<&Path>) -> Result<Vec<FileMapping>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mapping: Vec<FileMapping> = serde_json::from_str(&contents)
        .with_context(|| format!("invalid file mapping in {}", path.display()))?;
    Ok(mapping)
}
