//! 测量结果的 CSV 表格.

use std::io::Write;
use std::path::Path;

use super::{SpotRecord, VoxelRecord};
use crate::consts::header;
use crate::PdResult;

/// 将二维测量结果写入 `wtr`.
///
/// 质心取整到个位, 平均强度保留 3 位小数, 轴长保留 2 位小数.
pub fn write_spot_csv_to<W: Write>(records: &[SpotRecord], wtr: W) -> PdResult<()> {
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(header::SPOT)?;
    for r in records {
        let (row, col) = r.rounded_centroid();
        wtr.write_record([
            r.id.to_string(),
            format!("{row:.0}"),
            format!("{col:.0}"),
            r.area.to_string(),
            r.sum_intensity.to_string(),
            r.max_intensity.to_string(),
            format!("{:.3}", r.mean_intensity),
            format!("{:.2}", r.major_axis_length),
            format!("{:.2}", r.minor_axis_length),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// 将三维测量结果写入 `wtr`.
///
/// `rgb` 列形如 `"(r, g, b)"`, 平均强度保留 3 位小数.
pub fn write_voxel_csv_to<W: Write>(records: &[VoxelRecord], wtr: W) -> PdResult<()> {
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(header::VOXEL)?;
    for r in records {
        let [red, green, blue] = r.rgb;
        wtr.write_record([
            r.id.to_string(),
            format!("({red}, {green}, {blue})"),
            r.voxels.to_string(),
            r.sum.to_string(),
            r.min.to_string(),
            r.max.to_string(),
            format!("{:.3}", r.mean),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// 将二维测量结果写入 `path`, 覆盖已有文件.
pub fn write_spot_csv<P: AsRef<Path>>(records: &[SpotRecord], path: P) -> PdResult<()> {
    write_spot_csv_to(records, std::fs::File::create(path)?)
}

/// 将三维测量结果写入 `path`, 覆盖已有文件.
pub fn write_voxel_csv<P: AsRef<Path>>(records: &[VoxelRecord], path: P) -> PdResult<()> {
    write_voxel_csv_to(records, std::fs::File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_rows() {
        let records = [SpotRecord {
            id: 1,
            centroid: (7.4, 9.5),
            area: 25,
            sum_intensity: 5000,
            max_intensity: 200,
            mean_intensity: 200.0,
            major_axis_length: 5.656854,
            minor_axis_length: 5.656854,
        }];
        let mut buf = Vec::new();
        write_spot_csv_to(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,centroid_row,centroid_col,area,sum_intensity,max_intensity,mean_intensity,major_axis_length,minor_axis_length")
        );
        assert_eq!(lines.next(), Some("1,7,10,25,5000,200,200.000,5.66,5.66"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_voxel_rows_quote_rgb() {
        let records = [VoxelRecord {
            id: 3,
            rgb: [12, 200, 7],
            voxels: 4,
            sum: 10,
            min: 1,
            max: 4,
            mean: 2.5,
        }];
        let mut buf = Vec::new();
        write_voxel_csv_to(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "id,rgb,voxels,sum,min,max,mean\n3,\"(12, 200, 7)\",4,10,1,4,2.500\n"
        );
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.csv");
        write_spot_csv(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
