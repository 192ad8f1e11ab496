//! # 板位坐标与测量网格
//!
//! 微孔板上的孔位坐标（`B12` 形式）以及读板仪输出的矩形数值网格。
//!
//! ## 依赖关系
//! - 被 `engine/`, `parsers/`, `report/` 使用
//! - 使用 `regex` 解析孔位名称

use crate::error::{PlatenormError, Result};

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// 标准 96 孔板行字母
pub const PLATE_ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// 孔位坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoordinate {
    /// 行字母（大写）
    pub row: char,
    /// 列号（从 1 开始）
    pub column: usize,
}

impl GridCoordinate {
    pub fn new(row: char, column: usize) -> Self {
        Self {
            row: row.to_ascii_uppercase(),
            column,
        }
    }

    /// 行索引（A = 0）
    pub fn row_index(&self) -> usize {
        (self.row as u8).saturating_sub(b'A') as usize
    }

    /// 列索引（1 列 = 0）
    pub fn column_index(&self) -> usize {
        self.column.saturating_sub(1)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

fn well_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z])0*([1-9][0-9]*)$").expect("valid well regex"))
}

impl FromStr for GridCoordinate {
    type Err = PlatenormError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = well_pattern()
            .captures(s.trim())
            .ok_or_else(|| PlatenormError::InvalidWell(s.to_string()))?;

        let row = caps[1]
            .chars()
            .next()
            .ok_or_else(|| PlatenormError::InvalidWell(s.to_string()))?;
        let column = caps[2]
            .parse::<usize>()
            .map_err(|_| PlatenormError::InvalidWell(s.to_string()))?;

        Ok(GridCoordinate::new(row, column))
    }
}

/// 第 `index` 行的字母（0 → A）
pub fn row_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// 读板仪输出的矩形数值网格（行优先存储）
#[derive(Debug, Clone)]
pub struct PlateGrid {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl PlateGrid {
    pub fn new(rows: usize, columns: usize, values: Vec<f64>) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(PlatenormError::InvalidArgument(
                "plate grid must have at least one row and one column".to_string(),
            ));
        }
        if values.len() != rows * columns {
            return Err(PlatenormError::InvalidArgument(format!(
                "plate grid expects {} values ({}x{}), got {}",
                rows * columns,
                rows,
                columns,
                values.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// 读取单孔测量值
    pub fn measurement(&self, well: &GridCoordinate) -> Result<f64> {
        let (r, c) = (well.row_index(), well.column_index());
        if well.column == 0 || r >= self.rows || c >= self.columns {
            return Err(PlatenormError::WellOutOfRange {
                well: well.to_string(),
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(self.values[r * self.columns + c])
    }

    /// 按顺序读取一组重复孔
    pub fn replicates(&self, wells: &[GridCoordinate]) -> Result<Vec<f64>> {
        wells.iter().map(|w| self.measurement(w)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_names() {
        let well: GridCoordinate = "B12".parse().unwrap();
        assert_eq!(well, GridCoordinate::new('B', 12));
        assert_eq!(well.to_string(), "B12");

        let lower: GridCoordinate = "h01".parse().unwrap();
        assert_eq!(lower, GridCoordinate::new('H', 1));

        assert!("12B".parse::<GridCoordinate>().is_err());
        assert!("B0".parse::<GridCoordinate>().is_err());
        assert!("".parse::<GridCoordinate>().is_err());
    }

    #[test]
    fn test_grid_lookup() {
        let values: Vec<f64> = (0..6).map(|v| v as f64).collect();
        let grid = PlateGrid::new(2, 3, values).unwrap();

        assert_eq!(grid.measurement(&GridCoordinate::new('A', 1)).unwrap(), 0.0);
        assert_eq!(grid.measurement(&GridCoordinate::new('B', 3)).unwrap(), 5.0);
        assert!(grid.measurement(&GridCoordinate::new('C', 1)).is_err());
        assert!(grid.measurement(&GridCoordinate::new('A', 4)).is_err());

        let reps = grid
            .replicates(&[GridCoordinate::new('B', 1), GridCoordinate::new('B', 2)])
            .unwrap();
        assert_eq!(reps, vec![3.0, 4.0]);
    }

    #[test]
    fn test_grid_shape_mismatch() {
        assert!(PlateGrid::new(2, 2, vec![1.0; 3]).is_err());
        assert!(PlateGrid::new(0, 2, vec![]).is_err());
    }
}
