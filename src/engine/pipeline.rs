//! # 定量归一化流程
//!
//! 串联各组件，顺序固定：
//! 1. 板位映射（源架 + 检测板重复孔）
//! 2. 读取标准品并拟合标准曲线，检查 R²
//! 3. 逐样本反算浓度并计算体积
//! 4. 生成归一化转移计划
//! 5. （可选）按 click 混合总体积选择档位
//!
//! 模型错误（退化标准曲线、斜率为零）和严格模式下的稀释不可行会中止整批；
//! 单样本的无效测量记录在该样本上，默认不影响其他样本。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `engine/` 下全部组件

use crate::engine::actuator::{self, Actuator, Transfer};
use crate::engine::calibration::{self, CalibrationModel, BSA_STANDARD_SERIES};
use crate::engine::click::ClickReaction;
use crate::engine::mapper::{assign_slots, DestinationLayout, NormalizationPlate, SourceRack};
use crate::engine::normalizer::{self, DilutionPolicy, NormalizationTarget};
use crate::engine::tier::{self, ResourceTierPlan, TierTable};
use crate::error::{PlatenormError, Result};
use crate::models::{
    CalibrationPoint, GridCoordinate, Layout, PlateGrid, SampleOutcome, SampleSlot, UnknownResult,
};

/// 流程参数
#[derive(Debug, Clone)]
pub struct AssayConfig {
    pub rack: SourceRack,
    pub destinations: DestinationLayout,
    pub normalization_plate: NormalizationPlate,
    /// 标准品浓度，对应检测板 A.. 行
    pub standards: Vec<f64>,
    pub target: NormalizationTarget,
    pub policy: DilutionPolicy,
    /// 低于此 R² 时中止；None 不检查
    pub min_r_squared: Option<f64>,
    /// 无效测量是否中止整批
    pub fail_on_invalid: bool,
    /// 稀释液来源
    pub diluent_source: String,
}

impl AssayConfig {
    pub fn new(target: NormalizationTarget, policy: DilutionPolicy) -> Self {
        Self {
            rack: SourceRack::default(),
            destinations: DestinationLayout::default(),
            normalization_plate: NormalizationPlate::default(),
            standards: BSA_STANDARD_SERIES.to_vec(),
            target,
            policy,
            min_r_squared: Some(0.95),
            fail_on_invalid: false,
            diluent_source: "reservoir A7".to_string(),
        }
    }
}

/// 一批样本的定量结果
#[derive(Debug, Clone)]
pub struct QuantificationReport {
    pub model: CalibrationModel,
    pub standards: Vec<CalibrationPoint>,
    pub slots: Vec<SampleSlot>,
    pub results: Vec<UnknownResult>,
    /// 每个样本的归一化孔（按样本序号）
    pub normalization_wells: Vec<GridCoordinate>,
    pub transfers: Vec<Transfer>,
}

impl QuantificationReport {
    pub fn clamped(&self) -> usize {
        self.count(|o| matches!(o, SampleOutcome::Clamped(_)))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, SampleOutcome::Rejected(_)))
    }

    fn count(&self, pred: impl Fn(&SampleOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// 可进入 click 反应的样本孔
    pub fn reaction_wells(&self) -> Vec<GridCoordinate> {
        self.results
            .iter()
            .zip(&self.normalization_wells)
            .filter(|(r, _)| r.outcome.volumes().is_some())
            .map(|(_, w)| *w)
            .collect()
    }

    /// 为 click 预混液混合选择档位
    pub fn plan_click_mix(
        &self,
        final_volume: f64,
        current: &Layout,
        canonical: &Layout,
        table: &TierTable,
    ) -> Result<ClickMixPlan> {
        let click = ClickReaction::new(self.reaction_wells().len(), final_volume)?;
        let plan = tier::select_tier(click.mix_volume(), current, canonical, table)?;
        Ok(ClickMixPlan {
            click,
            plan,
            final_volume,
        })
    }
}

/// Click 混合计划：档位按混合总体积选择，混合程序按终体积展开
#[derive(Debug, Clone)]
pub struct ClickMixPlan {
    pub click: ClickReaction,
    pub plan: ResourceTierPlan,
    pub final_volume: f64,
}

impl ClickMixPlan {
    /// 交给执行层完成搬移、混合与恢复
    pub fn execute<A: Actuator>(&self, layout: &mut Layout, actuator: &mut A) -> Result<()> {
        actuator::run_mix(&self.plan, layout, actuator, self.final_volume)
    }
}

/// 读取标准品重复孔
pub fn read_standards(
    grid: &PlateGrid,
    layout: &DestinationLayout,
    concentrations: &[f64],
) -> Result<Vec<CalibrationPoint>> {
    concentrations
        .iter()
        .enumerate()
        .map(|(level, &conc)| {
            let wells = layout.standard_wells(level)?;
            Ok(CalibrationPoint::new(conc, grid.replicates(&wells)?))
        })
        .collect()
}

/// 执行定量与归一化
pub fn quantify(
    grid: &PlateGrid,
    num_samples: usize,
    config: &AssayConfig,
) -> Result<QuantificationReport> {
    let slots = assign_slots(&config.rack, &config.destinations, num_samples)?;

    let standards = read_standards(grid, &config.destinations, &config.standards)?;
    let model = calibration::fit(&standards)?;
    if let Some(minimum) = config.min_r_squared {
        model.check_fit(minimum)?;
    }

    let mut results = Vec::with_capacity(slots.len());
    for slot in &slots {
        let point = CalibrationPoint::unknown(grid.replicates(&slot.destinations)?);
        let mean_measurement = point.mean().unwrap_or(f64::NAN);
        let resolved = calibration::resolve(&model, &point)?;

        let outcome = match normalizer::normalize(slot.index, resolved, &config.target, config.policy)
        {
            Ok(outcome) => outcome,
            Err(e @ PlatenormError::InvalidMeasurement { .. }) => {
                if config.fail_on_invalid {
                    return Err(e);
                }
                SampleOutcome::Rejected(e.to_string())
            }
            Err(e) => return Err(e),
        };

        results.push(UnknownResult {
            sample_index: slot.index,
            mean_measurement,
            resolved_concentration: resolved,
            outcome,
        });
    }

    let normalization_wells = (0..slots.len())
        .map(|i| config.normalization_plate.well(i))
        .collect::<Result<Vec<_>>>()?;

    let transfers = plan_transfers(&slots, &results, &normalization_wells, &config.diluent_source);

    Ok(QuantificationReport {
        model,
        standards,
        slots,
        results,
        normalization_wells,
        transfers,
    })
}

/// 样本 + 稀释液转移；跳过被拒样本和零体积
fn plan_transfers(
    slots: &[SampleSlot],
    results: &[UnknownResult],
    wells: &[GridCoordinate],
    diluent_source: &str,
) -> Vec<Transfer> {
    let mut transfers = Vec::new();
    for ((slot, result), well) in slots.iter().zip(results).zip(wells) {
        let Some(volumes) = result.outcome.volumes() else {
            continue;
        };
        if volumes.dispense > 0.0 {
            transfers.push(Transfer {
                volume: volumes.dispense,
                from: format!("rack {}", slot.source),
                to: format!("plate {}", well),
            });
        }
        if volumes.diluent > 0.0 {
            transfers.push(Transfer {
                volume: volumes.diluent,
                from: diluent_source.to_string(),
                to: format!("plate {}", well),
            });
        }
    }
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actuator::TranscriptActuator;
    use crate::engine::tier::{canonical_layout, Tier};

    /// 信号 = 2 · 浓度 + 1
    fn signal(conc: f64) -> f64 {
        2.0 * conc + 1.0
    }

    const UNKNOWN_MEANS: [f64; 10] = [
        7.0,  // 3.0 mg/mL
        5.0,  // 2.0
        4.75, // 1.875
        3.0,  // 1.0 -> 截断
        13.0, // 6.0
        2.0,  // 0.5 -> 截断
        9.0,  // 4.0
        6.0,  // 2.5
        16.0, // 7.5
        0.6,  // -0.2 -> 无效
    ];

    fn synthetic_grid() -> PlateGrid {
        let mut values = vec![0.0; 96];
        let mut put = |well: &GridCoordinate, v: f64| {
            values[well.row_index() * 12 + well.column_index()] = v;
        };

        let layout = DestinationLayout::default();
        for (level, &conc) in BSA_STANDARD_SERIES.iter().enumerate() {
            let y = signal(conc);
            for (well, v) in layout
                .standard_wells(level)
                .unwrap()
                .iter()
                .zip([y - 0.02, y, y + 0.02])
            {
                put(well, v);
            }
        }
        for (i, &mean) in UNKNOWN_MEANS.iter().enumerate() {
            for (well, v) in layout
                .destinations(i)
                .unwrap()
                .iter()
                .zip([mean + 0.05, mean - 0.1, mean + 0.05])
            {
                put(well, v);
            }
        }
        PlateGrid::new(8, 12, values).unwrap()
    }

    fn config(policy: DilutionPolicy) -> AssayConfig {
        AssayConfig::new(NormalizationTarget::new(1.5, 50.0).unwrap(), policy)
    }

    #[test]
    fn test_end_to_end_clamp() {
        let report = quantify(&synthetic_grid(), 10, &config(DilutionPolicy::Clamp)).unwrap();

        assert!((report.model.slope - 2.0).abs() < 1e-6);
        assert!((report.model.intercept - 1.0).abs() < 1e-6);
        assert!((report.model.r_squared - 1.0).abs() < 1e-6);

        // (浓度, 样本体积, 稀释液体积, 状态)
        let expected: [(f64, Option<(f64, f64)>, &str); 10] = [
            (3.0, Some((25.0, 25.0)), "ok"),
            (2.0, Some((37.5, 12.5)), "ok"),
            (1.875, Some((40.0, 10.0)), "ok"),
            (1.0, Some((50.0, 0.0)), "clamped"),
            (6.0, Some((12.5, 37.5)), "ok"),
            (0.5, Some((50.0, 0.0)), "clamped"),
            (4.0, Some((18.75, 31.25)), "ok"),
            (2.5, Some((30.0, 20.0)), "ok"),
            (7.5, Some((10.0, 40.0)), "ok"),
            (-0.2, None, "rejected"),
        ];

        assert_eq!(report.results.len(), 10);
        for (result, (conc, volumes, label)) in report.results.iter().zip(expected) {
            assert!(
                (result.resolved_concentration - conc).abs() < 1e-6,
                "{}: {} != {}",
                result.sample_id(),
                result.resolved_concentration,
                conc
            );
            assert_eq!(result.outcome.label(), label, "{}", result.sample_id());
            match (result.outcome.volumes(), volumes) {
                (Some(v), Some((dispense, diluent))) => {
                    assert!((v.dispense - dispense).abs() < 1e-6);
                    assert!((v.diluent - diluent).abs() < 1e-6);
                }
                (None, None) => {}
                (got, want) => panic!("{}: {:?} vs {:?}", result.sample_id(), got, want),
            }
        }

        assert_eq!(report.clamped(), 2);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.normalization_wells[9], GridCoordinate::new('B', 2));
        assert_eq!(report.reaction_wells().len(), 9);

        // 截断样本没有稀释液转移；被拒样本没有任何转移
        let to_d1: Vec<_> = report.transfers.iter().filter(|t| t.to == "plate D1").collect();
        assert_eq!(to_d1.len(), 1);
        assert_eq!(to_d1[0].from, "rack B4");
        assert_eq!(to_d1[0].volume, 50.0);
        assert!(!report.transfers.iter().any(|t| t.to == "plate B2"));
        assert_eq!(report.transfers.len(), 9 * 2 - 2);
    }

    #[test]
    fn test_end_to_end_strict_aborts() {
        let result = quantify(&synthetic_grid(), 10, &config(DilutionPolicy::Strict));
        assert!(matches!(
            result,
            Err(PlatenormError::InfeasibleDilution { sample: 3, .. })
        ));
        // 与表格 / CSV 一致，按 1 起始编号
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Sample 4:"), "{}", message);
    }

    #[test]
    fn test_fail_on_invalid() {
        let mut cfg = config(DilutionPolicy::Clamp);
        cfg.fail_on_invalid = true;
        let result = quantify(&synthetic_grid(), 10, &cfg);
        assert!(matches!(
            result,
            Err(PlatenormError::InvalidMeasurement { sample: 9, .. })
        ));
        assert!(result.unwrap_err().to_string().contains("Sample 10:"));
        // 前 9 个样本无无效测量
        assert!(quantify(&synthetic_grid(), 9, &cfg).is_ok());
    }

    #[test]
    fn test_capacity_exceeded() {
        let result = quantify(&synthetic_grid(), 25, &config(DilutionPolicy::Clamp));
        assert!(matches!(result, Err(PlatenormError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_poor_fit_aborts() {
        let mut grid_values = vec![0.0; 96];
        // 标准品信号随机
        let noise = [0.9, 0.1, 0.7, 0.3, 0.8, 0.2, 0.6, 0.4];
        for (row, v) in noise.iter().enumerate() {
            for col in 0..3 {
                grid_values[row * 12 + col] = *v;
            }
        }
        let grid = PlateGrid::new(8, 12, grid_values).unwrap();
        assert!(matches!(
            quantify(&grid, 1, &config(DilutionPolicy::Clamp)),
            Err(PlatenormError::PoorCalibration { .. })
        ));
    }

    #[test]
    fn test_click_mix_plan() {
        let report = quantify(&synthetic_grid(), 10, &config(DilutionPolicy::Clamp)).unwrap();
        let mix = report
            .plan_click_mix(50.0, &canonical_layout(), &canonical_layout(), &TierTable::default())
            .unwrap();
        assert_eq!(mix.click.reactions(), 18);
        assert_eq!(mix.plan.total_volume, 56.0);
        assert_eq!(mix.plan.tier, Tier::Small);

        let mix = report
            .plan_click_mix(150.0, &canonical_layout(), &canonical_layout(), &TierTable::default())
            .unwrap();
        // 150 + 18
        assert_eq!(mix.plan.tier, Tier::Medium);
        assert_eq!(mix.plan.relocations.len(), 1);
    }

    #[test]
    fn test_click_mix_uses_final_volume() {
        let report = quantify(&synthetic_grid(), 10, &config(DilutionPolicy::Clamp)).unwrap();
        let mix = report
            .plan_click_mix(50.0, &canonical_layout(), &canonical_layout(), &TierTable::default())
            .unwrap();

        let mut layout = canonical_layout();
        let mut transcript = TranscriptActuator::default();
        mix.execute(&mut layout, &mut transcript).unwrap();

        // 档位按 56 µL 选择，混合程序按 50 µL 终体积
        assert_eq!(transcript.lines[1], "aspirate 25.0 µL @ 1 mm");
        assert_eq!(transcript.lines.last().unwrap(), "mix 3x 50.0 µL @ 1 mm");
        assert_eq!(layout, canonical_layout());
    }
}
