//! 各个入口程序共用的组件: 日志, 分隔线, 默认路径.

use std::path::Path;

use flexi_logger::{Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle};

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 日志文件名, 位于输出目录下.
pub const LOG_FILE: &str = "log";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 初始化日志: 写入 `dir/log` (覆盖已有文件), 同时全部输出到 stdout.
///
/// `level` 形如 `"info"` 或 `"debug, pd_berry=trace"`. 返回的句柄在程序结束前
/// 不能被丢弃, 否则日志会停止写出.
pub fn setup_logging<P: AsRef<Path>>(level: &str, dir: P) -> Result<LoggerHandle, FlexiLoggerError> {
    let file_spec = FileSpec::try_from(dir.as_ref().join(LOG_FILE))?.suppress_timestamp();
    Logger::try_with_str(level)?
        .log_to_file(file_spec)
        .format_for_files(flexi_logger::detailed_format)
        .duplicate_to_stdout(Duplicate::All)
        .start()
}
