//! # tier 子命令实现
//!
//! 按混合总体积选择档位，打印搬移与恢复计划，可选模拟执行并保存布局。
//!
//! ## 依赖关系
//! - 使用 `cli/tier.rs` 定义的参数
//! - 使用 `engine/tier.rs`, `engine/actuator.rs`
//! - 使用 `parsers/layout.rs`
//! - 使用 `utils/output.rs`

use crate::cli::tier::{FallbackTierArgs, TierArgs};
use crate::engine::actuator::{self, TranscriptActuator};
use crate::engine::tier::{self, canonical_layout, Pipette, Tier, TierSpec, TIPS_200};
use crate::engine::TierTable;
use crate::error::{PlatenormError, Result};
use crate::parsers::layout;
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 布局行
#[derive(Debug, Clone, Tabled)]
struct SlotRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "During mix")]
    during: String,
}

/// 执行档位规划
pub fn execute(args: TierArgs) -> Result<()> {
    output::print_header("Mixing Tier");

    let mut current = match args.layout {
        Some(ref path) => {
            output::print_info(&format!("Reading deck layout from '{}'", path.display()));
            layout::read_layout(path)?
        }
        None => canonical_layout(),
    };

    let plan = tier::select_tier(
        args.volume,
        &current,
        &canonical_layout(),
        &tier_table(&args.fallback)?,
    )?;

    let [bottom, middle, top] = plan.mix_depths;
    output::print_success(&format!(
        "{:.1} µL -> {} tier: {} with {}, depths {}/{}/{} mm",
        plan.total_volume, plan.tier, plan.pipette, plan.tip_rack, bottom, middle, top
    ));

    let working = plan.working_layout(&current)?;
    let rows: Vec<SlotRow> = current
        .resources()
        .map(|(resource, slot)| SlotRow {
            resource: resource.to_string(),
            before: slot.to_string(),
            during: working.slot_of(resource).unwrap_or("-").to_string(),
        })
        .collect();
    println!("{}", Table::new(&rows));

    if plan.relocations.is_empty() {
        output::print_info("No relocations needed");
    }
    for relocation in &plan.relocations {
        output::print_move(&relocation.resource, &relocation.from, &relocation.to);
    }
    if !plan.restorations.is_empty() {
        output::print_info("After mixing:");
        for relocation in &plan.restorations {
            output::print_move(&relocation.resource, &relocation.from, &relocation.to);
        }
    }

    if args.simulate {
        output::print_header("Simulated Run");
        let mut transcript = TranscriptActuator::default();
        actuator::run_mix(&plan, &mut current, &mut transcript, args.final_volume)?;
        transcript.lines.iter().for_each(|l| output::print_step(l));
    } else {
        current = plan.final_layout(&current)?;
    }

    if let Some(ref path) = args.save_layout {
        if path == Path::new("-") {
            layout::write_layout_to(std::io::stdout().lock(), &current)?;
        } else {
            layout::write_layout(path, &current)?;
            output::print_success(&format!("Layout saved to '{}'", path.display()));
        }
    }

    Ok(())
}

/// 默认分档表，兜底档位的混合深度取自命令行
pub(crate) fn tier_table(args: &FallbackTierArgs) -> Result<TierTable> {
    let depths: [f64; 3] = args.fallback_depths.as_slice().try_into().map_err(|_| {
        PlatenormError::InvalidArgument(format!(
            "fallback depths need exactly 3 values, got {}",
            args.fallback_depths.len()
        ))
    })?;
    if depths.iter().any(|d| !(d.is_finite() && *d >= 0.0)) {
        return Err(PlatenormError::InvalidArgument(format!(
            "fallback depths must be non-negative, got {:?}",
            depths
        )));
    }

    Ok(TierTable::default().with_fallback(TierSpec::new(
        Tier::Default,
        depths,
        Pipette::P1000,
        TIPS_200,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback(depths: &[f64]) -> FallbackTierArgs {
        FallbackTierArgs {
            fallback_depths: depths.to_vec(),
        }
    }

    #[test]
    fn test_fallback_depths_reach_large_volumes() {
        let table = tier_table(&fallback(&[2.0, 12.0, 20.0])).unwrap();
        let plan = tier::select_tier(1500.0, &canonical_layout(), &canonical_layout(), &table)
            .unwrap();
        assert_eq!(plan.tier, Tier::Default);
        assert_eq!(plan.mix_depths, [2.0, 12.0, 20.0]);
        assert!(plan.relocations.is_empty());

        // 有界档位不受影响
        let plan = tier::select_tier(150.0, &canonical_layout(), &canonical_layout(), &table)
            .unwrap();
        assert_eq!(plan.mix_depths, [1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_fallback_depths_validated() {
        assert!(tier_table(&fallback(&[1.0, 2.0])).is_err());
        assert!(tier_table(&fallback(&[1.0, -2.0, 3.0])).is_err());
    }
}
