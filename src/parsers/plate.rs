//! # 读板仪数据解析器
//!
//! 将读板仪导出的 CSV 视为矩形数值网格读取。
//!
//! ## 格式说明
//! ```text
//! <skip_rows 行前导信息>
//! <skip_columns 列标签>, v(A,1), v(A,2), ..., v(A,12)
//! ...
//! <skip_columns 列标签>, v(H,1), ..., v(H,12)
//! ```
//! 典型导出前有 6 行仪器信息、2 列行标签（对应 `--skip-rows 6 --skip-columns 2`）。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `models/grid.rs` 的 PlateGrid
//! - 使用 `csv` 读取记录

use crate::error::{PlatenormError, Result};
use crate::models::PlateGrid;

use std::fs;
use std::path::Path;

/// 网格读取参数
#[derive(Debug, Clone)]
pub struct PlateReadOptions {
    /// 跳过的前导行数
    pub skip_rows: usize,
    /// 每行跳过的前导列数
    pub skip_columns: usize,
    pub rows: usize,
    pub columns: usize,
    pub delimiter: u8,
}

impl Default for PlateReadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            skip_columns: 0,
            rows: 8,
            columns: 12,
            delimiter: b',',
        }
    }
}

/// 从文件读取测量网格
pub fn parse_plate_file(path: &Path, options: &PlateReadOptions) -> Result<PlateGrid> {
    let content = fs::read_to_string(path).map_err(|e| PlatenormError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_plate_content(&content, options, &path.display().to_string())
}

/// 从字符串读取测量网格
pub fn parse_plate_content(
    content: &str,
    options: &PlateReadOptions,
    source_name: &str,
) -> Result<PlateGrid> {
    let parse_err = |reason: String| PlatenormError::ParseError {
        format: "plate reader CSV".to_string(),
        path: source_name.to_string(),
        reason,
    };

    // 按原始行跳过前导信息（csv 读取时会丢弃空行）
    let body: String = content
        .lines()
        .skip(options.skip_rows)
        .flat_map(|line| [line, "\n"])
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(body.as_bytes());

    let mut values = Vec::with_capacity(options.rows * options.columns);
    let mut rows_read = 0;

    for (line, record) in reader.records().take(options.rows).enumerate() {
        let record = record?;
        let row_label = (b'A' + (line % 26) as u8) as char;

        let cells: Vec<&str> = record
            .iter()
            .skip(options.skip_columns)
            .take(options.columns)
            .collect();
        if cells.len() < options.columns {
            return Err(parse_err(format!(
                "row {} has {} values, expected {}",
                row_label,
                cells.len(),
                options.columns
            )));
        }

        for (col, cell) in cells.iter().enumerate() {
            let value = cell.trim().parse::<f64>().map_err(|_| {
                parse_err(format!(
                    "invalid value '{}' at {}{}",
                    cell.trim(),
                    row_label,
                    col + 1
                ))
            })?;
            values.push(value);
        }
        rows_read += 1;
    }

    if rows_read < options.rows {
        return Err(parse_err(format!(
            "found {} data rows, expected {}",
            rows_read, options.rows
        )));
    }

    PlateGrid::new(options.rows, options.columns, values)
}
