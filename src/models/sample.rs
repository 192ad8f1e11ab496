//! # 样本与标准品数据模型
//!
//! ## 依赖关系
//! - 被 `engine/`, `report/`, `commands/` 使用
//! - 使用 `models/grid.rs` 的 GridCoordinate

use super::grid::GridCoordinate;

/// 单个样本的位置分配（创建后不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSlot {
    /// 样本序号（从 0 开始）
    pub index: usize,
    /// 样本管在源架上的位置
    pub source: GridCoordinate,
    /// 检测板上的重复孔（同一行相邻三列）
    pub destinations: Vec<GridCoordinate>,
}

/// 样本编号格式
pub fn sample_id(index: usize) -> String {
    format!("Sample {}", index + 1)
}

/// 标准品（或未知样本）的重复测量
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPoint {
    /// 已知浓度 (mg/mL)，未知样本为 0
    pub known_concentration: f64,
    /// 重复测量的吸光度
    pub replicates: Vec<f64>,
}

impl CalibrationPoint {
    pub fn new(known_concentration: f64, replicates: Vec<f64>) -> Self {
        Self {
            known_concentration,
            replicates,
        }
    }

    /// 未知样本：仅有测量值
    pub fn unknown(replicates: Vec<f64>) -> Self {
        Self::new(0.0, replicates)
    }

    /// 重复测量平均值（无测量值时为 None）
    pub fn mean(&self) -> Option<f64> {
        if self.replicates.is_empty() {
            return None;
        }
        Some(self.replicates.iter().sum::<f64>() / self.replicates.len() as f64)
    }
}

/// 样本体积 / 稀释液体积
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumePair {
    /// 样本体积 (µL)
    pub dispense: f64,
    /// 稀释液体积 (µL)
    pub diluent: f64,
}

/// 单样本归一化结果
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// 正常稀释
    Normalized(VolumePair),
    /// 超出上限，按原液使用（低于目标浓度）
    Clamped(VolumePair),
    /// 测量无效，不参与转移
    Rejected(String),
}

impl SampleOutcome {
    pub fn volumes(&self) -> Option<VolumePair> {
        match self {
            SampleOutcome::Normalized(v) | SampleOutcome::Clamped(v) => Some(*v),
            SampleOutcome::Rejected(_) => None,
        }
    }

    /// 状态标签（用于表格和 CSV）
    pub fn label(&self) -> &'static str {
        match self {
            SampleOutcome::Normalized(_) => "ok",
            SampleOutcome::Clamped(_) => "clamped",
            SampleOutcome::Rejected(_) => "rejected",
        }
    }
}

/// 未知样本的定量与归一化结果
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownResult {
    pub sample_index: usize,
    pub mean_measurement: f64,
    pub resolved_concentration: f64,
    pub outcome: SampleOutcome,
}

impl UnknownResult {
    pub fn sample_id(&self) -> String {
        sample_id(self.sample_index)
    }

    pub fn dispense_volume(&self) -> Option<f64> {
        self.outcome.volumes().map(|v| v.dispense)
    }

    pub fn diluent_volume(&self) -> Option<f64> {
        self.outcome.volumes().map(|v| v.diluent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_mean() {
        let point = CalibrationPoint::new(5.0, vec![1.0, 2.0, 3.0]);
        assert_eq!(point.mean(), Some(2.0));
        assert_eq!(CalibrationPoint::unknown(vec![]).mean(), None);
    }

    #[test]
    fn test_outcome_volumes() {
        let pair = VolumePair {
            dispense: 50.0,
            diluent: 0.0,
        };
        assert_eq!(SampleOutcome::Clamped(pair).volumes(), Some(pair));
        assert_eq!(SampleOutcome::Rejected("neg".into()).volumes(), None);
        assert_eq!(sample_id(0), "Sample 1");
    }
}
