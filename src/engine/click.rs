//! # Click 反应体积计算
//!
//! 归一化后的每孔加入 click 预混液；预混液按 2n 个反应配制。
//! n 取实际进入反应的样本数，被拒样本不计入，因此可能小于上样总数。
//!
//! ## 依赖关系
//! - 被 `engine/pipeline.rs` 调用
//! - 混合总体积传给 `engine/tier.rs` 选择档位

use crate::error::{PlatenormError, Result};

/// 每个反应各试剂的体积 (µL)，按加样顺序；(名称, 温控模块孔位, 体积)
const PREMIX_RECIPE: [(&str, &str, f64); 4] = [
    ("rhodamine_azide", "A3", 1.0),
    ("tbta", "A5", 3.0),
    ("copper_sulfate", "A2", 1.0),
    ("tcep", "A4", 1.0),
];

/// 预混液所在孔
pub const PREMIX_WELL: &str = "A6";

/// 参考终体积；每孔 click 体积按此等比缩放
const REFERENCE_VOLUME: f64 = 50.0;

/// 单种试剂加样
#[derive(Debug, Clone, PartialEq)]
pub struct ReagentAddition {
    pub reagent: &'static str,
    pub source: &'static str,
    pub volume: f64,
}

/// Click 反应参数
#[derive(Debug, Clone, Copy)]
pub struct ClickReaction {
    num_samples: usize,
    final_volume: f64,
}

impl ClickReaction {
    pub fn new(num_samples: usize, final_volume: f64) -> Result<Self> {
        if num_samples == 0 {
            return Err(PlatenormError::InvalidArgument(
                "click reaction needs at least one sample".to_string(),
            ));
        }
        if !(final_volume > 0.0 && final_volume.is_finite()) {
            return Err(PlatenormError::InvalidArgument(format!(
                "final volume must be positive, got {}",
                final_volume
            )));
        }
        Ok(Self {
            num_samples,
            final_volume,
        })
    }

    /// 每孔加入的 click 预混液体积
    pub fn per_well_volume(&self) -> f64 {
        6.0 * self.final_volume / REFERENCE_VOLUME
    }

    /// 混合总体积（决定混合档位）
    pub fn mix_volume(&self) -> f64 {
        self.final_volume + self.per_well_volume()
    }

    /// 预混液配制的反应数（两倍余量）
    pub fn reactions(&self) -> usize {
        self.num_samples * 2
    }

    /// 预混液配方
    pub fn premix(&self) -> Vec<ReagentAddition> {
        let n = self.reactions() as f64;
        PREMIX_RECIPE
            .iter()
            .map(|&(reagent, source, per_reaction)| ReagentAddition {
                reagent,
                source,
                volume: per_reaction * n,
            })
            .collect()
    }

    /// 上样缓冲液体积，保留一位小数
    pub fn loading_buffer_volume(&self) -> f64 {
        (self.final_volume / 3.0 * 10.0).round() / 10.0
    }
}
