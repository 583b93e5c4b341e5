//! 对 `pd-berry::source` 的更一层封装: 默认数据目录与输入路径解析.

use std::env;
use std::path::{Path, PathBuf};

use pd_berry::source::{open_source, BoxedSource, VolumeSource};
use pd_berry::PdResult;

/// 指定默认数据目录的环境变量.
pub const DATA_DIR_ENV: &str = "PD_DATA_DIR";

/// 获取 `{用户主目录}/dataset/plasmodesmata` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.extend(["dataset", "plasmodesmata"]);
    Some(ans)
}

/// 获取默认数据目录.
///
/// 1. 若环境变量 `$PD_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/plasmodesmata`;
/// 3. 无法确定主目录时返回 `None`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(DATA_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir(),
    }
}

/// 解析输入路径.
///
/// 路径本身存在时原样返回; 否则若是相对路径, 尝试在默认数据目录下查找.
/// 都不存在时返回 `None`.
pub fn resolve_input<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    if path.exists() {
        return Some(path.to_owned());
    }
    if path.is_relative() {
        let candidate = data_dir_from_env_or_home()?.join(path);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// 打开数据源, 并记录其 series 个数.
pub fn open_input<P: AsRef<Path>>(path: P) -> PdResult<BoxedSource> {
    let source = open_source(path.as_ref())?;
    log::info!(
        "Opened {} ({} series)",
        path.as_ref().display(),
        source.series().len()
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_input(dir.path()), Some(dir.path().to_owned()));
        assert_eq!(resolve_input(dir.path().join("missing.npy")), None);
    }
}
