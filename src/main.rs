//! multirange — create, inspect, split and convert range files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use multirange::payload::SampleRef;
use multirange::persistence::{self, PersistError};
use multirange::{Bound, MultiRangeConfig, RangeCollection, RangeKind, OPEN_TOP};

#[derive(Parser, Debug)]
#[command(version, about = "Edit multi-range instrument files", long_about = None)]
struct Cli {
    /// Override the configured maximum number of ranges
    #[arg(long, global = true)]
    max_ranges: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a file holding one open-ended range
    New {
        #[arg(long, value_enum, default_value = "sampled")]
        kind: KindArg,
        /// Output path (defaults to a fresh name in the per-kind folder)
        file: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// List the ranges in a file
    Show { file: PathBuf },
    /// Insert a range at INDEX ending at bound AT
    Split {
        file: PathBuf,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        at: Bound,
    },
    /// Convert every range to the other kind, resizing to SIZE ranges
    Convert {
        file: PathBuf,
        #[arg(long)]
        size: Option<usize>,
    },
    /// Attach a WAV sample to a sampled range
    AddSample {
        file: PathBuf,
        #[arg(long)]
        index: usize,
        wav: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Sampled,
    Wavetable,
}

impl From<KindArg> for RangeKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Sampled => RangeKind::Sampled,
            KindArg::Wavetable => RangeKind::Wavetable,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).unwrap_or("info".to_string()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = MultiRangeConfig::load().unwrap_or_default();
    if cli.max_ranges.is_some() {
        config = config.with_max_ranges(cli.max_ranges);
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &MultiRangeConfig) -> Result<(), PersistError> {
    match command {
        Command::New { kind, file, force } => {
            let kind = RangeKind::from(kind);
            let path = file.unwrap_or_else(|| {
                persistence::suggest_path(&persistence::default_folder(kind), "ranges")
            });
            let mut ranges = RangeCollection::new(kind, config);
            ranges.insert_multi_range(0)?.upper = OPEN_TOP;
            persistence::save(&path, &ranges, force)?;
            println!("{}", path.display());
        }
        Command::Show { file } => {
            let ranges = persistence::load(&file, config)?;
            print_ranges(&file, &ranges);
        }
        Command::Split { file, index, at } => {
            let mut ranges = persistence::load(&file, config)?;
            if index > ranges.len() {
                return Err(PersistError::Invalid(format!(
                    "index {index} is past the last range ({})",
                    ranges.len()
                )));
            }
            ranges.insert_multi_range(index)?;
            if let Err(e) = ranges.set_upper(index, at) {
                ranges.remove_range(index);
                return Err(e.into());
            }
            persistence::save(&file, &ranges, true)?;
            print_ranges(&file, &ranges);
        }
        Command::Convert { file, size } => {
            let mut ranges = persistence::load(&file, config)?;
            let size = size.unwrap_or(ranges.len());
            ranges.change_type(size)?;
            persistence::save(&file, &ranges, true)?;
            print_ranges(&file, &ranges);
        }
        Command::AddSample { file, index, wav } => {
            let mut ranges = persistence::load(&file, config)?;
            let sample = SampleRef::probe(&wav)
                .map_err(|e| PersistError::Invalid(format!("{}: {e}", wav.display())))?;
            let Some(range) = ranges.get_mut(index) else {
                return Err(PersistError::Invalid(format!("no range at index {index}")));
            };
            let Some(payload) = range.payload.as_sampled_mut() else {
                return Err(PersistError::Invalid(format!(
                    "range {index} is not a sampled range"
                )));
            };
            *payload = std::mem::take(payload).with_sample(sample);
            persistence::save(&file, &ranges, true)?;
            print_ranges(&file, &ranges);
        }
    }
    Ok(())
}

fn print_ranges(file: &Path, ranges: &RangeCollection) {
    println!(
        "{}: {} {} range(s)",
        file.display(),
        ranges.len(),
        ranges.kind()
    );
    for index in 0..ranges.len() {
        let span = ranges.span(index);
        let range = ranges.element(index);
        let upper = if index + 1 == ranges.len() && range.is_open_top() {
            "top".to_string()
        } else {
            span.end().to_string()
        };
        println!(
            "  [{index}] {:>5}..{:<5} {}",
            span.start(),
            upper,
            range.payload.summary()
        );
    }
}
