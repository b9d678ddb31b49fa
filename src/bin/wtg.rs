use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};
use wtg::{
    Decoder, Document, DocumentDiff, Encoder, Listing, Severity, Summary, TriggerData, Version,
    DEFAULT_MAX_DEPTH,
};

#[derive(Parser)]
#[command(name = "wtg")]
#[command(about = "Read, check, and rewrite Warcraft III trigger files (war3map.wtg)")]
#[command(version)]
struct Cli {
    /// TriggerData.txt describing the parameters of every function
    #[arg(long, global = true, value_name = "FILE")]
    trigger_data: Option<PathBuf>,

    /// Deepest nesting of functions and parameters accepted while reading
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Skip the category and variable reference check after reading
    #[arg(long, global = true)]
    no_verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a trigger file and write it back out
    Copy {
        input: PathBuf,
        output: PathBuf,

        /// Format version to write (4 or 7, default: the input's version)
        #[arg(long)]
        target_version: Option<i32>,
    },

    /// Decode a trigger file and report what it contains
    Validate { input: PathBuf },

    /// Print the category tree and the triggers within
    List { input: PathBuf },

    /// Compare two trigger files by name
    Diff { old: PathBuf, new: PathBuf },

    /// Renumber category ids and rehome orphaned triggers
    Repair { input: PathBuf, output: PathBuf },
}

impl Cli {
    fn trigger_data(&self) -> Result<TriggerData> {
        let Some(path) = &self.trigger_data else {
            log::warn!("no trigger data given, only files without functions can be read");
            return Ok(TriggerData::new());
        };

        let data = fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
        let result = TriggerData::from_text(&data)
            .with_context(|| format!("unable to parse {}", path.display()))?;
        Ok(result)
    }

    fn decoder(&self) -> Decoder {
        Decoder::builder()
            .max_depth(self.max_depth)
            .verify_references(!self.no_verify)
            .build()
    }
}

fn read_document(path: &Path, decoder: &Decoder, data: &TriggerData) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
    let doc = decoder
        .decode(&bytes, data)
        .with_context(|| format!("unable to decode {}", path.display()))?;
    Ok(doc)
}

/// Writes next to the destination and renames into place so a failed write
/// never leaves a partial file behind
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(x) if !x.as_os_str().is_empty() => x,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("unable to create a temporary file in {}", dir.display()))?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .with_context(|| format!("unable to write {}", path.display()))?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let data = cli.trigger_data()?;
    let decoder = cli.decoder();

    match &cli.command {
        Commands::Copy {
            input,
            output,
            target_version,
        } => {
            let doc = read_document(input, &decoder, &data)?;
            let encoder = match target_version {
                Some(x) => Encoder::with_version(Version::new(*x)),
                None => Encoder::new(),
            };

            let bytes = encoder
                .encode_resolved(&doc, &data)
                .context("unable to encode trigger file")?;
            write_atomic(output, &bytes)?;
            println!(
                "Wrote {} ({} bytes, version {})",
                output.display(),
                bytes.len(),
                target_version.map_or(doc.version(), Version::new)
            );
        }
        Commands::Validate { input } => {
            let doc = read_document(input, &decoder, &data)?;
            print!("{}", Summary::new(&doc));

            let diagnostics = doc.diagnose(&data);
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }

            let errors = diagnostics
                .iter()
                .filter(|x| x.severity == Severity::Error)
                .count();
            if errors > 0 {
                bail!("{} decoded with {} errors", input.display(), errors);
            }
            println!("WTG is valid");
        }
        Commands::List { input } => {
            let doc = read_document(input, &decoder, &data)?;
            print!("{}", Listing::new(&doc));
        }
        Commands::Diff { old, new } => {
            let old = read_document(old, &decoder, &data)?;
            let new = read_document(new, &decoder, &data)?;
            print!("{}", DocumentDiff::between(&old, &new));
        }
        Commands::Repair { input, output } => {
            let lenient = Decoder::builder()
                .max_depth(cli.max_depth)
                .verify_references(false)
                .build();
            let mut doc = read_document(input, &lenient, &data)?;

            let repairs = doc.repair();
            println!("Renumbered {} categories", repairs.renumbered);
            println!("Rehomed {} orphaned triggers", repairs.rehomed);

            doc.verify()
                .with_context(|| format!("{} still has dangling references", input.display()))?;
            let bytes = Encoder::new()
                .encode_resolved(&doc, &data)
                .context("unable to encode trigger file")?;
            write_atomic(output, &bytes)?;
            println!("Wrote {} ({} bytes)", output.display(), bytes.len());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(x) => x,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
