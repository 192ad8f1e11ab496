//! # 样本板位映射
//!
//! 将样本数映射到源架位置和检测板重复孔，纯函数实现，与循环顺序无关。
//!
//! ## 映射规则
//! - 源架：按行填充，每行 `columns` 个位置（B1..B6, C1..C6, ...）
//! - 检测板：样本 `i` 位于第 `i mod 8` 行，占据同一行相邻三列；
//!   每 8 个样本共用一个列带，之后列带右移 3 列（4-6, 7-9, 10-12）
//! - 归一化板：样本 `i` 位于第 `i mod 8` 行、第 `i div 8 + 1` 列
//!
//! ## 依赖关系
//! - 被 `engine/pipeline.rs`, `commands/assign.rs` 调用
//! - 使用 `models/grid.rs`, `models/sample.rs`

use crate::error::{PlatenormError, Result};
use crate::models::{GridCoordinate, SampleSlot, PLATE_ROWS};

/// 样本管源架（默认 24 孔铝块的 B-E 行，每行 6 个）
#[derive(Debug, Clone)]
pub struct SourceRack {
    rows: Vec<char>,
    columns: usize,
}

impl Default for SourceRack {
    fn default() -> Self {
        Self {
            rows: vec!['B', 'C', 'D', 'E'],
            columns: 6,
        }
    }
}

impl SourceRack {
    pub fn new(rows: Vec<char>, columns: usize) -> Self {
        Self {
            rows: rows.into_iter().map(|r| r.to_ascii_uppercase()).collect(),
            columns,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len() * self.columns
    }

    /// 第 `index` 个样本的位置
    pub fn location(&self, index: usize) -> Option<GridCoordinate> {
        if self.columns == 0 || index >= self.capacity() {
            return None;
        }
        let row = self.rows[index / self.columns];
        Some(GridCoordinate::new(row, index % self.columns + 1))
    }

    /// 分配源架位置，超出容量时截断
    pub fn assign_samples(&self, count: usize) -> SourceAssignment {
        let locations = (0..count).map_while(|i| self.location(i)).collect();
        SourceAssignment {
            locations,
            requested: count,
            capacity: self.capacity(),
        }
    }
}

/// 源架分配结果；调用方需检查是否被截断
#[derive(Debug, Clone)]
pub struct SourceAssignment {
    pub locations: Vec<GridCoordinate>,
    pub requested: usize,
    pub capacity: usize,
}

impl SourceAssignment {
    pub fn capacity_exceeded(&self) -> bool {
        self.locations.len() < self.requested
    }

    /// 要求全部样本都有位置
    pub fn into_complete(self) -> Result<Vec<GridCoordinate>> {
        if self.capacity_exceeded() {
            return Err(PlatenormError::CapacityExceeded {
                requested: self.requested,
                capacity: self.capacity,
            });
        }
        Ok(self.locations)
    }
}

/// 检测板布局：标准品三联孔 + 按列带排布的未知样本
#[derive(Debug, Clone)]
pub struct DestinationLayout {
    rows: Vec<char>,
    standards_column: usize,
    first_column: usize,
    replicates: usize,
    plate_columns: usize,
}

impl Default for DestinationLayout {
    fn default() -> Self {
        Self {
            rows: PLATE_ROWS.to_vec(),
            standards_column: 1,
            first_column: 4,
            replicates: 3,
            plate_columns: 12,
        }
    }
}

impl DestinationLayout {
    pub fn new(
        rows: Vec<char>,
        standards_column: usize,
        first_column: usize,
        replicates: usize,
        plate_columns: usize,
    ) -> Result<Self> {
        if rows.is_empty() || replicates == 0 || standards_column == 0 || first_column == 0 {
            return Err(PlatenormError::InvalidArgument(
                "destination layout needs rows, a replicate width and 1-based columns".to_string(),
            ));
        }
        let standards_end = standards_column + replicates - 1;
        let bands = plate_columns.saturating_sub(first_column - 1) / replicates;
        let samples_end = first_column + bands * replicates - 1;
        if standards_end > plate_columns
            || (bands > 0 && standards_column <= samples_end && first_column <= standards_end)
        {
            return Err(PlatenormError::InvalidArgument(format!(
                "standards triplet at column {} overlaps the sample bands or leaves the plate",
                standards_column
            )));
        }
        Ok(Self {
            rows,
            standards_column,
            first_column,
            replicates,
            plate_columns,
        })
    }

    /// 每个列带的样本数（= 板行数）
    pub fn samples_per_band(&self) -> usize {
        self.rows.len()
    }

    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// 板上可容纳的列带数
    pub fn band_count(&self) -> usize {
        if self.first_column > self.plate_columns {
            return 0;
        }
        (self.plate_columns - self.first_column + 1) / self.replicates
    }

    pub fn capacity(&self) -> usize {
        self.band_count() * self.samples_per_band()
    }

    /// 第 `band` 个列带的起始列
    pub fn band_start(&self, band: usize) -> usize {
        self.first_column + band * self.replicates
    }

    /// 第 `index` 个样本的重复孔
    pub fn destinations(&self, index: usize) -> Result<Vec<GridCoordinate>> {
        let band = index / self.samples_per_band();
        if band >= self.band_count() {
            return Err(PlatenormError::CapacityExceeded {
                requested: index + 1,
                capacity: self.capacity(),
            });
        }
        let row = self.rows[index % self.samples_per_band()];
        let base = self.band_start(band);
        Ok((0..self.replicates)
            .map(|offset| GridCoordinate::new(row, base + offset))
            .collect())
    }

    /// 第 `level` 个标准品的重复孔（浓度从高到低对应 A..H）
    pub fn standard_wells(&self, level: usize) -> Result<Vec<GridCoordinate>> {
        let row = *self.rows.get(level).ok_or_else(|| PlatenormError::CapacityExceeded {
            requested: level + 1,
            capacity: self.rows.len(),
        })?;
        Ok((0..self.replicates)
            .map(|offset| GridCoordinate::new(row, self.standards_column + offset))
            .collect())
    }
}

/// 为每个样本生成源位置和检测孔
pub fn assign_slots(
    rack: &SourceRack,
    layout: &DestinationLayout,
    count: usize,
) -> Result<Vec<SampleSlot>> {
    let sources = rack.assign_samples(count).into_complete()?;

    sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            Ok(SampleSlot {
                index,
                source,
                destinations: layout.destinations(index)?,
            })
        })
        .collect()
}

/// 归一化板（按列填充）
#[derive(Debug, Clone)]
pub struct NormalizationPlate {
    rows: Vec<char>,
    columns: usize,
}

impl Default for NormalizationPlate {
    fn default() -> Self {
        Self {
            rows: PLATE_ROWS.to_vec(),
            columns: 12,
        }
    }
}

impl NormalizationPlate {
    /// 第 `index` 个样本的归一化孔
    pub fn well(&self, index: usize) -> Result<GridCoordinate> {
        let column = index / self.rows.len() + 1;
        if column > self.columns {
            return Err(PlatenormError::CapacityExceeded {
                requested: index + 1,
                capacity: self.rows.len() * self.columns,
            });
        }
        Ok(GridCoordinate::new(self.rows[index % self.rows.len()], column))
    }

    /// 已用列的首孔（多通道加样目标），按列号升序
    pub fn column_heads(&self, wells: &[GridCoordinate]) -> Vec<GridCoordinate> {
        let mut columns: Vec<usize> = wells.iter().map(|w| w.column).collect();
        columns.sort_unstable();
        columns.dedup();
        columns
            .into_iter()
            .map(|c| GridCoordinate::new(self.rows[0], c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_source_assignment_row_first() {
        let rack = SourceRack::default();
        let assignment = rack.assign_samples(8);
        let names: Vec<String> = assignment.locations.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            names,
            vec!["B1", "B2", "B3", "B4", "B5", "B6", "C1", "C2"]
        );
        assert!(!assignment.capacity_exceeded());
    }

    #[test]
    fn test_source_assignment_counts() {
        let rack = SourceRack::default();
        let allowed: HashSet<char> = ['B', 'C', 'D', 'E'].into_iter().collect();

        for n in 0..=30 {
            let assignment = rack.assign_samples(n);
            assert_eq!(assignment.locations.len(), n.min(24));
            assert_eq!(assignment.capacity_exceeded(), n > 24);

            let unique: HashSet<_> = assignment.locations.iter().collect();
            assert_eq!(unique.len(), assignment.locations.len());
            assert!(assignment.locations.iter().all(|w| allowed.contains(&w.row)));
            assert!(assignment.locations.iter().all(|w| (1..=6).contains(&w.column)));
        }

        assert!(rack.assign_samples(0).locations.is_empty());
        assert!(matches!(
            rack.assign_samples(25).into_complete(),
            Err(PlatenormError::CapacityExceeded {
                requested: 25,
                capacity: 24
            })
        ));
    }

    #[test]
    fn test_destination_banding() {
        let layout = DestinationLayout::default();

        for i in 0..8 {
            let wells = layout.destinations(i).unwrap();
            assert_eq!(wells[0].column, 4);
            assert_eq!(wells[0].row, PLATE_ROWS[i]);
        }
        for i in 8..16 {
            let wells = layout.destinations(i).unwrap();
            assert_eq!(wells[0].column, 7);
            assert_eq!(wells[0].row, PLATE_ROWS[i - 8]);
        }

        let wells = layout.destinations(9).unwrap();
        let names: Vec<String> = wells.iter().map(|w| w.to_string()).collect();
        assert_eq!(names, vec!["B7", "B8", "B9"]);

        assert_eq!(layout.destinations(23).unwrap()[2], GridCoordinate::new('H', 12));
        assert!(layout.destinations(24).is_err());
    }

    #[test]
    fn test_destinations_never_collide() {
        let layout = DestinationLayout::default();
        let mut seen = HashSet::new();
        for i in 0..layout.capacity() {
            for well in layout.destinations(i).unwrap() {
                assert!(seen.insert(well), "duplicate well {}", well);
                assert!(well.column > 3, "sample well {} overlaps standards", well);
            }
        }
        assert_eq!(seen.len(), 72);
    }

    #[test]
    fn test_parameterized_layout() {
        // 12 行板，双重复
        let rows: Vec<char> = "ABCDEFGHIJKL".chars().collect();
        let layout = DestinationLayout::new(rows, 1, 3, 2, 8).unwrap();
        assert_eq!(layout.band_count(), 3);
        assert_eq!(layout.destinations(12).unwrap()[0], GridCoordinate::new('A', 5));
        assert!(DestinationLayout::new(PLATE_ROWS.to_vec(), 3, 4, 3, 12).is_err());
    }

    #[test]
    fn test_assign_slots() {
        let slots = assign_slots(&SourceRack::default(), &DestinationLayout::default(), 10).unwrap();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[9].source, GridCoordinate::new('C', 4));
        assert_eq!(slots[9].destinations[0], GridCoordinate::new('B', 7));
        assert_eq!(crate::models::sample::sample_id(slots[9].index), "Sample 10");
    }

    #[test]
    fn test_normalization_plate() {
        let plate = NormalizationPlate::default();
        assert_eq!(plate.well(0).unwrap(), GridCoordinate::new('A', 1));
        assert_eq!(plate.well(9).unwrap(), GridCoordinate::new('B', 2));

        let wells: Vec<_> = (0..10).map(|i| plate.well(i).unwrap()).collect();
        let heads: Vec<String> = plate.column_heads(&wells).iter().map(|w| w.to_string()).collect();
        assert_eq!(heads, vec!["A1", "A2"]);
    }
}
