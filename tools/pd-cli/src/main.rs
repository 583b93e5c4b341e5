//! 胞间连丝识别的命令行入口.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pd_berry::consts::{
    DEFAULT_DIR_THRESHOLD, DEFAULT_MAX_SIZE, DEFAULT_MAX_VOXEL, DEFAULT_MIN_SIZE, DEFAULT_THRESHOLD,
};
use pd_berry::pipeline::{PipelineConfig, ThresholdMethod, Workflow};

mod result;
mod runner;

#[derive(Parser, Debug)]
#[command(
    name = "pd-cli",
    about = "Find and quantify plasmodesmata in fluorescence microscopy z-stacks",
    version
)]
struct Cli {
    /// Log level, e.g. `info` or `debug`
    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find spots in the max-intensity projection of one series
    Find {
        /// Path to a manifest directory or a .npy stack
        input: PathBuf,
        /// Zero based index of the series to analyse
        series: usize,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        opts: Options,
        /// Absolute threshold
        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u16,
    },

    /// Analyse plasmodesmata in 3D for one series
    Analyse {
        /// Path to a manifest directory or a .npy stack
        input: PathBuf,
        /// Zero based index of the series to analyse
        series: usize,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        opts: Options,
        /// Absolute threshold
        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u16,
    },

    /// Analyse every series of one input
    Series {
        /// Path to a manifest directory or a .npy stack
        input: PathBuf,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        opts: Options,
        /// Absolute threshold
        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u16,
        /// Workflow to run on each series
        #[arg(long, value_enum, default_value_t = WorkflowArg::Spots)]
        workflow: WorkflowArg,
    },

    /// Analyse every input in a directory, skipping existing outputs
    Images {
        /// Input directory
        input_dir: PathBuf,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        opts: Options,
        /// Absolute threshold
        #[arg(short = 't', long, default_value_t = DEFAULT_DIR_THRESHOLD)]
        threshold: u16,
        /// Workflow to run on each series
        #[arg(long, value_enum, default_value_t = WorkflowArg::Volume)]
        workflow: WorkflowArg,
    },

    /// Analyse every sub-directory of a directory
    Lines {
        /// Input directory containing one directory per line
        input_dir: PathBuf,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        opts: Options,
        /// Absolute threshold
        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u16,
        /// Workflow to run on each series
        #[arg(long, value_enum, default_value_t = WorkflowArg::Volume)]
        workflow: WorkflowArg,
    },
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct Options {
    /// Maximum number of pixels of a spot
    #[arg(short = 'l', long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: usize,
    /// Minimum number of pixels of a spot
    #[arg(short = 's', long, default_value_t = DEFAULT_MIN_SIZE)]
    min_size: usize,
    /// Maximum voxel volume
    #[arg(long, default_value_t = DEFAULT_MAX_VOXEL)]
    max_voxel: usize,
    /// Minimum voxel volume [default: 0, or 2 for `images` and `lines`]
    #[arg(long)]
    min_voxel: Option<usize>,
    /// Use an automatic (Otsu) threshold instead of the absolute one
    #[arg(long)]
    otsu: bool,
    /// Also write projection, threshold and filter masks
    #[arg(long)]
    write_intermediates: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum WorkflowArg {
    /// 2D spots in the max-intensity projection
    Spots,
    /// 3D regions filtered by voxel count
    Volume,
}

impl From<WorkflowArg> for Workflow {
    fn from(w: WorkflowArg) -> Self {
        match w {
            WorkflowArg::Spots => Workflow::Spots,
            WorkflowArg::Volume => Workflow::Volume,
        }
    }
}

impl Options {
    fn to_config(&self, threshold: u16, min_voxel: usize) -> PipelineConfig {
        PipelineConfig {
            threshold: if self.otsu {
                ThresholdMethod::Otsu
            } else {
                ThresholdMethod::Absolute(threshold)
            },
            max_size: self.max_size,
            min_size: self.min_size,
            max_voxel: self.max_voxel,
            min_voxel: self.min_voxel.unwrap_or(min_voxel),
            write_intermediates: self.write_intermediates,
            ..Default::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    runner::run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pd_berry::consts::DEFAULT_MIN_VOXEL;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_per_command_threshold_defaults() {
        let cli = Cli::parse_from(["pd-cli", "images", "in", "out"]);
        let Command::Images {
            threshold, workflow, ..
        } = cli.command
        else {
            panic!("expected images");
        };
        assert_eq!(threshold, 500);
        assert_eq!(workflow, WorkflowArg::Volume);

        let cli = Cli::parse_from(["pd-cli", "find", "in.npy", "0", "out", "-l", "80", "--otsu"]);
        let Command::Find {
            threshold, opts, ..
        } = cli.command
        else {
            panic!("expected find");
        };
        assert_eq!(threshold, 15000);
        let cfg = opts.to_config(threshold, DEFAULT_MIN_VOXEL);
        assert_eq!(cfg.threshold, ThresholdMethod::Otsu);
        assert_eq!(cfg.max_size, 80);
        assert_eq!(cfg.min_size, 2);
    }

    #[test]
    fn test_per_command_min_voxel_defaults() {
        let analyse = Cli::parse_from(["pd-cli", "analyse", "in.npy", "0", "out"]);
        assert_eq!(analyse.command.config().min_voxel, 0);
        assert_eq!(analyse.command.config(), PipelineConfig::default());

        let images = Cli::parse_from(["pd-cli", "images", "in", "out"]);
        assert_eq!(images.command.config().min_voxel, 2);
        let lines = Cli::parse_from(["pd-cli", "lines", "in", "out"]);
        assert_eq!(lines.command.config().min_voxel, 2);

        let explicit = Cli::parse_from(["pd-cli", "images", "in", "out", "--min-voxel", "0"]);
        assert_eq!(explicit.command.config().min_voxel, 0);
        let explicit = Cli::parse_from(["pd-cli", "analyse", "in.npy", "0", "out", "--min-voxel", "3"]);
        assert_eq!(explicit.command.config().min_voxel, 3);
    }
}
