use std::cell::Cell;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::{ImgWriteVis, PdResult};

/// 一次流程的输出目的地.
///
/// 图像按写出顺序编号, 文件名形如 `{:03}_{namespace}{name}.png`;
/// CSV 等固定文件名的输出不参与编号. 同一目录下的不同命名空间共享计数器,
/// 因此文件名在目录内唯一.
#[derive(Debug)]
pub struct OutputDir {
    dir: PathBuf,
    namespace: String,
    counter: std::rc::Rc<Cell<usize>>,
}

impl OutputDir {
    /// 在 `dir` 下输出. 目录不存在时会被创建.
    pub fn create<P: AsRef<Path>>(dir: P) -> PdResult<Self> {
        let dir = dir.as_ref().to_owned();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            namespace: String::new(),
            counter: Default::default(),
        })
    }

    /// 输出目录.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 当前命名空间.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 同一目录, 同一计数器, 但使用命名空间 `namespace`.
    pub fn namespaced(&self, namespace: &str) -> Self {
        Self {
            dir: self.dir.clone(),
            namespace: namespace.to_string(),
            counter: self.counter.clone(),
        }
    }

    /// 获取下一张编号图像的路径, 并推进计数器.
    pub fn next_image_path(&self, name: &str) -> PathBuf {
        let n = self.counter.get();
        self.counter.set(n + 1);
        self.dir.join(format!("{n:03}_{}{name}.png", self.namespace))
    }

    /// 固定文件名的输出路径, 会加上命名空间前缀.
    #[inline]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{name}", self.namespace))
    }

    /// 以编号文件名保存可视化图像.
    pub fn save<I: ImgWriteVis>(&self, name: &str, img: &I) -> PdResult<PathBuf> {
        let path = self.next_image_path(name);
        img.save(&path)?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// 以编号文件名保存彩色图像.
    pub fn save_rgb(&self, name: &str, img: &RgbImage) -> PdResult<PathBuf> {
        let path = self.next_image_path(name);
        img.save(&path)?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }
}
