//! # 结果导出
//!
//! 每个样本一行，按样本序号排列；这是流程唯一的持久化产物。
//!
//! ## 列
//! `sample_id, mean_measurement, resolved_concentration, dispense_volume, diluent_volume, status`
//! 被拒样本的体积列为空。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `models/sample.rs` 的 UnknownResult
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{PlatenormError, Result};
use crate::models::UnknownResult;

use std::io::Write;
use std::path::Path;

const HEADER: [&str; 6] = [
    "sample_id",
    "mean_measurement",
    "resolved_concentration",
    "dispense_volume",
    "diluent_volume",
    "status",
];

/// 导出归一化结果
pub fn to_csv(results: &[UnknownResult], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    write_rows(&mut wtr, results)?;
    wtr.flush().map_err(|e| PlatenormError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, results: &[UnknownResult]) -> Result<()> {
    wtr.write_record(HEADER)?;

    let mut ordered: Vec<&UnknownResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.sample_index);

    let volume = |v: Option<f64>| v.map(|v| format!("{:.4}", v)).unwrap_or_default();

    for r in ordered {
        wtr.write_record(&[
            r.sample_id(),
            format!("{:.6}", r.mean_measurement),
            format!("{:.6}", r.resolved_concentration),
            volume(r.dispense_volume()),
            volume(r.diluent_volume()),
            r.outcome.label().to_string(),
        ])?;
    }
    Ok(())
}
