mod commands;
mod error;
mod labels;

use std::error::Error as _;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use pcd_core::label::LearningMap;
use pcd_dataset::{DatasetConfig, IndexStrategy};
use pcd_parser::reader::bin::NUSCENES_COLUMNS;

use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scan Ingest",
    about = "A tool for indexing, loading and exporting LiDAR sweeps",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DatasetArgs {
    /// Dataset config (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    #[arg(long)]
    strategy: Option<IndexStrategy>,

    #[arg(long, allow_hyphen_values = true)]
    ignore_index: Option<i64>,

    #[arg(long = "loop")]
    loop_count: Option<usize>,
}

impl DatasetArgs {
    fn load(&self) -> Result<DatasetConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => DatasetConfig::from_path(path)?,
            None => DatasetConfig::default(),
        };
        if let Some(root) = &self.root {
            config.data_root = root.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(ignore_index) = self.ignore_index {
            config.ignore_index = ignore_index;
        }
        if let Some(loop_count) = self.loop_count {
            config.loop_count = loop_count;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the discovered scan list
    Index {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load one sample and report its contents
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[arg(short, long, default_value_t = 0)]
        index: usize,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load every sample and report point counts
    Summary {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Attach predicted labels to a scan and write it as PCD
    Export {
        #[arg(short, long, required = true, value_name = "FILE")]
        scan: PathBuf,

        #[arg(short, long, required = true, value_name = "FILE")]
        labels: PathBuf,

        #[arg(short, long, required = true, value_name = "FILE")]
        output: PathBuf,

        /// Map raw class ids to training classes first
        #[arg(long)]
        remap: bool,

        #[arg(long, default_value_t = 255, allow_hyphen_values = true)]
        ignore_index: i64,
    },
    /// Convert float32 sweeps to PCD
    Convert {
        #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
        input: Vec<String>,

        #[arg(short, long, required = true, value_name = "PATH")]
        output: PathBuf,

        #[arg(long, default_value_t = NUSCENES_COLUMNS)]
        columns: usize,
    },
    /// Print the raw-to-training class table
    LearningMap {
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        ignore_index: i64,
    },
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Index { dataset, output } => {
            let config = dataset.load()?;
            commands::index(&config, output.as_deref())?;
        }
        Command::Inspect {
            dataset,
            index,
            output,
        } => {
            let dataset = commands::build_dataset(dataset.load()?)?;
            commands::inspect(dataset.as_ref(), index, output.as_deref())?;
        }
        Command::Summary { dataset } => {
            let dataset = commands::build_dataset(dataset.load()?)?;
            commands::summary(dataset.as_ref())?;
        }
        Command::Export {
            scan,
            labels,
            output,
            remap,
            ignore_index,
        } => {
            let learning_map = remap.then(|| LearningMap::new(ignore_index));
            commands::export(&scan, &labels, &output, learning_map.as_ref())?;
        }
        Command::Convert {
            input,
            output,
            columns,
        } => {
            log::info!("input files: {:?}", input);
            let inputs = commands::expand_globs(&input)?;
            log::info!("expanded input files: {}", inputs.len());
            commands::convert(&inputs, &output, columns)?;
        }
        Command::LearningMap { ignore_index } => {
            println!("{}", commands::learning_map_json(ignore_index)?);
        }
    }
    Ok(())
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();

    let start = std::time::Instant::now();
    if let Err(err) = run(args.command) {
        log::error!("{}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            log::error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
    log::info!("Elapsed: {:?}", start.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, r#"{ "data_root": "/data/a", "loop": 2, "ignore_index": 0 }"#)
            .unwrap();

        let cli = Cli::try_parse_from([
            "scan-ingest",
            "summary",
            "--config",
            path.to_str().unwrap(),
            "--root",
            "/data/b",
            "--strategy",
            "flat",
            "--ignore-index",
            "-1",
        ])
        .unwrap();
        let Command::Summary { dataset } = cli.command else {
            panic!("expected summary");
        };
        let config = dataset.load().unwrap();
        assert_eq!(config.data_root, PathBuf::from("/data/b"));
        assert_eq!(config.strategy, IndexStrategy::FlatDirectory);
        assert_eq!(config.ignore_index, -1);
        assert_eq!(config.loop_count, 2);
    }

    #[test]
    fn zero_loop_is_rejected() {
        let cli = Cli::try_parse_from(["scan-ingest", "index", "--loop", "0"]).unwrap();
        let Command::Index { dataset, .. } = cli.command else {
            panic!("expected index");
        };
        assert!(dataset.load().is_err());
    }

    #[test]
    fn unknown_strategy_is_a_usage_error() {
        assert!(Cli::try_parse_from(["scan-ingest", "index", "--strategy", "tiled"]).is_err());
    }
}
