//! 程序运行函数.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use pd_berry::consts::{DEFAULT_DIR_MIN_VOXEL, DEFAULT_MIN_VOXEL};
use pd_berry::pipeline::{
    analyse_all_series, analyse_dir, analyse_lines, find_plasmodesmata, plasmodesmata_analysis,
    BatchReport, OutputDir, PipelineConfig,
};
use pd_berry::source::VolumeSource;
use utils::loader;

use crate::result;
use crate::{Cli, Command};

impl Command {
    /// 输入路径与输出目录.
    fn paths(&self) -> (&Path, &Path) {
        match self {
            Command::Find {
                input, output_dir, ..
            }
            | Command::Analyse {
                input, output_dir, ..
            }
            | Command::Series {
                input, output_dir, ..
            } => (input.as_path(), output_dir.as_path()),
            Command::Images {
                input_dir,
                output_dir,
                ..
            }
            | Command::Lines {
                input_dir,
                output_dir,
                ..
            } => (input_dir.as_path(), output_dir.as_path()),
        }
    }

    /// 由命令行参数生成流程配置. 目录批处理入口的最小体素数默认为 2, 其余为 0.
    pub(crate) fn config(&self) -> PipelineConfig {
        match self {
            Command::Find {
                opts, threshold, ..
            }
            | Command::Analyse {
                opts, threshold, ..
            }
            | Command::Series {
                opts, threshold, ..
            } => opts.to_config(*threshold, DEFAULT_MIN_VOXEL),
            Command::Images {
                opts, threshold, ..
            }
            | Command::Lines {
                opts, threshold, ..
            } => opts.to_config(*threshold, DEFAULT_DIR_MIN_VOXEL),
        }
    }
}

fn resolve(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    loader::resolve_input(path)
        .ok_or_else(|| format!("No such file or directory: {}", path.display()).into())
}

fn finish_batch(name: &str, report: BatchReport) -> Result<(), Box<dyn Error>> {
    if !report.is_ok() {
        log::warn!("{} unit(s) failed", report.failed.len());
    }
    result::report_batch(name, &report)?;
    Ok(())
}

/// 实际运行.
pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let (input, output_dir) = cli.command.paths();
    let input = resolve(input)?;
    fs::create_dir_all(output_dir)?;

    // 句柄存活到函数结束, 保证日志完整写出.
    let _logger = utils::setup_logging(&cli.log_level, output_dir)?;
    log::info!("pd-cli {}", env!("CARGO_PKG_VERSION"));
    log::info!("Input                   : {}", input.display());
    log::info!("Output directory        : {}", output_dir.display());
    log::debug!("Available cpus          : {}", utils::cpus());

    let cfg = cli.command.config();
    cfg.log();
    if let Err(e) = dispatch(&cli.command, &input, &cfg) {
        log::error!("Failed: {e}");
        return Err(e);
    }
    log::info!("Done");
    Ok(())
}

/// 检查配置并按子命令执行流程.
fn dispatch(command: &Command, input: &Path, cfg: &PipelineConfig) -> Result<(), Box<dyn Error>> {
    cfg.validate()?;
    let (_, output_dir) = command.paths();
    match command {
        Command::Find { series, .. } => {
            let source = loader::open_input(input)?;
            let volume = source.zstack(*series)?;
            let summary = find_plasmodesmata(&volume, cfg, &OutputDir::create(output_dir)?)?;
            result::report_spots(&summary);
        }
        Command::Analyse { series, .. } => {
            let source = loader::open_input(input)?;
            let out = OutputDir::create(output_dir)?;
            let summary = plasmodesmata_analysis(source.as_ref(), *series, cfg, &out)?;
            result::report_volume(&summary);
        }
        Command::Series { workflow, .. } => {
            let source = loader::open_input(input)?;
            let report = analyse_all_series(source.as_ref(), (*workflow).into(), cfg, output_dir);
            finish_batch("series", report)?;
        }
        Command::Images { workflow, .. } => {
            let report = analyse_dir(input, (*workflow).into(), cfg, output_dir)?;
            finish_batch("images", report)?;
        }
        Command::Lines { workflow, .. } => {
            let report = analyse_lines(input, (*workflow).into(), cfg, output_dir)?;
            finish_batch("lines", report)?;
        }
    }
    Ok(())
}
