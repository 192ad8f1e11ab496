//! # 样本体积归一化
//!
//! 根据反算浓度计算样本体积和稀释液体积，使每孔达到目标浓度和终体积。
//!
//! `dispense = target · final / resolved`，`diluent = final − dispense`
//!
//! 样本体积超过终体积时的处理由 [`DilutionPolicy`] 显式决定：
//! - `Clamp`：按原液使用（dispense = final, diluent = 0），样本低于目标浓度
//! - `Strict`：返回 `InfeasibleDilution`，整批中止
//!
//! ## 依赖关系
//! - 被 `engine/pipeline.rs` 调用
//! - 使用 `models/sample.rs`

use crate::error::{PlatenormError, Result};
use crate::models::{SampleOutcome, VolumePair};

/// 稀释不可行时的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DilutionPolicy {
    /// 截断为原液并继续
    #[default]
    Clamp,
    /// 整批中止
    Strict,
}

impl std::fmt::Display for DilutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DilutionPolicy::Clamp => write!(f, "clamp"),
            DilutionPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// 归一化目标
#[derive(Debug, Clone, Copy)]
pub struct NormalizationTarget {
    /// 目标浓度 (mg/mL = µg/µL)
    pub concentration: f64,
    /// 终体积 (µL)
    pub final_volume: f64,
}

impl NormalizationTarget {
    pub fn new(concentration: f64, final_volume: f64) -> Result<Self> {
        if !(concentration > 0.0 && concentration.is_finite()) {
            return Err(PlatenormError::InvalidArgument(format!(
                "target concentration must be positive, got {}",
                concentration
            )));
        }
        if !(final_volume > 0.0 && final_volume.is_finite()) {
            return Err(PlatenormError::InvalidArgument(format!(
                "final volume must be positive, got {}",
                final_volume
            )));
        }
        Ok(Self {
            concentration,
            final_volume,
        })
    }

    /// 由上样蛋白量 (µg) 推算目标浓度
    pub fn from_mass(mass_ug: f64, final_volume: f64) -> Result<Self> {
        if !(final_volume > 0.0) {
            return Err(PlatenormError::InvalidArgument(format!(
                "final volume must be positive, got {}",
                final_volume
            )));
        }
        Self::new(mass_ug / final_volume, final_volume)
    }
}

/// 计算单个样本的体积
///
/// `sample` 仅用于错误信息。返回值区分正常稀释与被截断的样本。
pub fn normalize(
    sample: usize,
    resolved_concentration: f64,
    target: &NormalizationTarget,
    policy: DilutionPolicy,
) -> Result<SampleOutcome> {
    if !(resolved_concentration > 0.0 && resolved_concentration.is_finite()) {
        return Err(PlatenormError::InvalidMeasurement {
            sample,
            concentration: resolved_concentration,
        });
    }

    let dispense = target.concentration * target.final_volume / resolved_concentration;

    if dispense > target.final_volume {
        return match policy {
            DilutionPolicy::Clamp => Ok(SampleOutcome::Clamped(VolumePair {
                dispense: target.final_volume,
                diluent: 0.0,
            })),
            DilutionPolicy::Strict => Err(PlatenormError::InfeasibleDilution {
                sample,
                required: dispense,
                ceiling: target.final_volume,
            }),
        };
    }

    Ok(SampleOutcome::Normalized(VolumePair {
        dispense,
        diluent: target.final_volume - dispense,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> NormalizationTarget {
        NormalizationTarget::new(1.5, 50.0).unwrap()
    }

    #[test]
    fn test_normalize_within_range() {
        let outcome = normalize(0, 2.0, &target(), DilutionPolicy::Clamp).unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Normalized(VolumePair {
                dispense: 37.5,
                diluent: 12.5
            })
        );
        // 严格模式下结果相同
        let strict = normalize(0, 2.0, &target(), DilutionPolicy::Strict).unwrap();
        assert_eq!(strict, outcome);
    }

    #[test]
    fn test_normalize_exact_ceiling() {
        let outcome = normalize(0, 1.5, &target(), DilutionPolicy::Strict).unwrap();
        let v = outcome.volumes().unwrap();
        assert!((v.dispense - 50.0).abs() < 1e-12);
        assert!(v.diluent.abs() < 1e-12);
        assert_eq!(outcome.label(), "ok");
    }

    #[test]
    fn test_normalize_clamp() {
        let outcome = normalize(3, 0.5, &target(), DilutionPolicy::Clamp).unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Clamped(VolumePair {
                dispense: 50.0,
                diluent: 0.0
            })
        );
    }

    #[test]
    fn test_normalize_strict() {
        let err = normalize(3, 0.5, &target(), DilutionPolicy::Strict).unwrap_err();
        match err {
            PlatenormError::InfeasibleDilution {
                sample,
                required,
                ceiling,
            } => {
                assert_eq!(sample, 3);
                assert!((required - 150.0).abs() < 1e-9);
                assert_eq!(ceiling, 50.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_invalid_measurement() {
        for bad in [0.0, -1.2, f64::NAN] {
            assert!(matches!(
                normalize(1, bad, &target(), DilutionPolicy::Clamp),
                Err(PlatenormError::InvalidMeasurement { sample: 1, .. })
            ));
        }
    }

    #[test]
    fn test_target_from_mass() {
        let t = NormalizationTarget::from_mass(40.0, 20.0).unwrap();
        assert_eq!(t.concentration, 2.0);
        assert!(NormalizationTarget::new(0.0, 50.0).is_err());
        assert!(NormalizationTarget::new(1.5, -5.0).is_err());
    }
}
