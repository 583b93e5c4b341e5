//! 运行结果汇总.

use std::io::{self, Write};

use pd_berry::pipeline::{BatchReport, SpotSummary, VolumeSummary};

const S4: &str = "    ";

/// 将批处理汇总写进 `w` 中.
fn describe_into<W: Write>(name: &str, r: &BatchReport, w: &mut W) -> io::Result<()> {
    writeln!(w, "Batch `{name}`:")?;
    writeln!(w, "{S4}Processed: {}", r.processed.len())?;
    writeln!(w, "{S4}Skipped: {}", r.skipped.len())?;
    for unit in r.skipped.iter() {
        writeln!(w, "{S4}{S4}{unit}")?;
    }
    write!(w, "{S4}Failed: {}", r.failed.len())?;
    for (unit, e) in r.failed.iter() {
        write!(w, "\n{S4}{S4}{unit}: {e}")?;
    }
    Ok(())
}

/// 打印批处理汇总.
pub fn report_batch(name: &str, r: &BatchReport) -> io::Result<()> {
    let mut out = io::stdout().lock();
    utils::sep_to(&mut out)?;
    describe_into(name, r, &mut out)?;
    writeln!(out)?;
    utils::sep_to(&mut out)
}

/// 打印二维流程的结果.
pub fn report_spots(s: &SpotSummary) {
    utils::sep();
    println!("Spots: {}", s.spots);
    println!("{S4}Ignored pixels: {}", s.ignored_pixels);
    utils::sep();
}

/// 打印三维流程的结果.
pub fn report_volume(s: &VolumeSummary) {
    utils::sep();
    println!("Cutoff: {}", s.cutoff);
    println!("{S4}Plasmodesmata: {}", s.kept);
    println!("{S4}Removed: {}", s.removed);
    utils::sep();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_batch() {
        let r = BatchReport {
            processed: vec!["a/0".into(), "a/1".into()],
            skipped: vec!["b".into()],
            failed: vec![("c/0".into(), "empty series".into())],
        };
        let mut buf = Vec::new();
        describe_into("lines", &r, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Batch `lines`:\n    Processed: 2\n    Skipped: 1\n        b\n    Failed: 1\n        c/0: empty series"
        );
    }
}
