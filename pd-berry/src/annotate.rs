//! 标注图像: 在灰度强度图上用彩色勾勒每个区域的轮廓.

use image::{Rgb, RgbImage};
use ndarray::{Array2, ArrayView2};

use crate::{IntensityVolume, LabeledImage, LabeledVolume, PdError, PdResult};

/// 黄金分割比的小数部分. 相邻标签的色相因此相距甚远.
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// 将强度图线性拉伸到 `[0, 255]`: 最小值映射为 0, 最大值映射为 255.
///
/// 所有像素值相同时, 结果全为 0.
pub fn normalise(image: ArrayView2<u16>) -> Array2<u8> {
    let (lo, hi) = image
        .iter()
        .fold((u16::MAX, u16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if image.is_empty() || lo >= hi {
        return Array2::zeros(image.dim());
    }
    let span = (hi - lo) as f64;
    image.mapv(|v| ((v - lo) as f64 / span * 255.0) as u8)
}

/// 由标签确定的标注颜色.
///
/// 同一标签在任何时候都得到同一颜色; 色相按黄金分割比步进, 饱和度和亮度固定.
pub fn pretty_color(label: u32) -> [u8; 3] {
    let hue = (label as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    hsv_to_rgb(hue, 0.75, 0.95)
}

/// `h`, `s`, `v` 均在 `[0, 1]` 内.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let to_u8 = |x: f64| (x * 255.0).round() as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// 在强度图上标注所有区域.
///
/// 背景为拉伸后的灰度图; 每个区域膨胀 1 步后的边缘被涂成该区域标签的颜色,
/// 区域内部不填充.
pub fn annotate(intensity: ArrayView2<u16>, labeled: &LabeledImage) -> PdResult<RgbImage> {
    if intensity.dim() != labeled.shape() {
        return Err(PdError::shape_mismatch(
            labeled.data().shape(),
            intensity.shape(),
        ));
    }
    let gray = normalise(intensity);
    let (height, width) = gray.dim();
    let mut buf = RgbImage::new(width as u32, height as u32);
    for ((h, w), &g) in gray.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Rgb([g, g, g]));
    }
    for (label, region) in labeled.regions() {
        let color = Rgb(pretty_color(label));
        for (h, w) in region.dilate(1).border().iter() {
            buf.put_pixel(w as u32, h as u32, color);
        }
    }
    Ok(buf)
}

/// 对每个 z 切片分别标注, 按 z 升序返回.
///
/// 每个切片独立拉伸灰度. 同一三维区域在各切片中使用同一颜色.
pub fn annotate_3d(volume: &IntensityVolume, labeled: &LabeledVolume) -> PdResult<Vec<RgbImage>> {
    let (z, h, w) = labeled.shape();
    if volume.shape() != (z, h, w) {
        return Err(PdError::shape_mismatch(
            labeled.data().shape(),
            volume.data().shape(),
        ));
    }
    (0..z)
        .map(|i| annotate(volume.slice_at(i), &labeled.label_slice(i)))
        .collect()
}
