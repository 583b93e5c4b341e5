//! 图像的持久化存储.

use std::path::Path;

use image::{ImageBuffer, ImageResult, Luma};
use ndarray::{ArrayView2, ArrayView3};

use super::{IntensityVolume, LabeledImage};
use crate::annotate::{normalise, pretty_color};
use crate::consts::gray;
use crate::consts::BACKGROUND_LABEL;
use crate::{BinaryMask, BinaryMask3d};

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于二值掩膜, 前景为白色, 背景为黑色; 对于标记图像, 每个区域使用
/// 由标签决定的固定颜色; 对于荧光强度图像, 会线性拉伸到 8 位灰度.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// 荧光强度图像会保存为 16 位灰度 PNG, 不损失精度.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

fn mask_to_gray(mask: ArrayView2<bool>) -> image::GrayImage {
    let (height, width) = mask.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in mask.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Luma([gray::from_mask(pix)]));
    }
    buf
}

impl ImgWriteVis for BinaryMask {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        mask_to_gray(self.view()).save(path)
    }
}

impl ImgWriteVis for ArrayView2<'_, bool> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        mask_to_gray(self.view()).save(path)
    }
}

/// 最大值投影后保存.
impl ImgWriteVis for BinaryMask3d {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let projected = self.map_axis(ndarray::Axis(0), |lane| lane.iter().any(|&p| p));
        mask_to_gray(projected.view()).save(path)
    }
}

/// 背景为黑色, 区域颜色与标注图像一致.
impl ImgWriteVis for LabeledImage {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::RgbImage::new(width as u32, height as u32);
        for ((h, w), &label) in self.data().indexed_iter() {
            if label != BACKGROUND_LABEL {
                buf.put_pixel(w as u32, h as u32, image::Rgb(pretty_color(label)));
            }
        }
        buf.save(path)
    }
}

macro_rules! impl_intensity_2d {
    ($($img: ty),+) => {
        $(
            /// 线性拉伸到 `[0, 255]`.
            impl ImgWriteVis for $img {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.dim();
                    let gray = normalise(self.view());
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in gray.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, Luma([pix]));
                    }
                    buf.save(path)
                }
            }

            /// 16 位灰度.
            impl ImgWriteRaw for $img {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.dim();
                    let mut buf: ImageBuffer<Luma<u16>, Vec<u16>> =
                        ImageBuffer::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, Luma([pix]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_intensity_2d!(ndarray::Array2<u16>, ArrayView2<'_, u16>);

/// 保存最大强度投影.
impl ImgWriteVis for IntensityVolume {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        project(self.data()).save(path)
    }
}

fn project(data: ArrayView3<u16>) -> ndarray::Array2<u16> {
    data.map_axis(ndarray::Axis(0), |lane| {
        lane.iter().copied().max().unwrap_or_default()
    })
}
