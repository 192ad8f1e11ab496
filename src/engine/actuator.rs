//! # 执行层接口
//!
//! 引擎只产生计划；`Actuator` 把计划翻译为设备调用。
//! `run_mix` 保证无论混合是否成功，已发出的搬移都会被撤回。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs`, `commands/tier.rs` 调用
//! - 使用 `engine/tier.rs` 的 ResourceTierPlan, Pipette
//! - 使用 `models/layout.rs`

use crate::engine::tier::{Pipette, ResourceTierPlan};
use crate::error::Result;
use crate::models::{Layout, Relocation};

/// 单步液体操作（深度为距孔底 mm）
#[derive(Debug, Clone, PartialEq)]
pub enum MixStep {
    Aspirate { volume: f64, depth: f64 },
    Dispense { volume: f64, depth: f64 },
    Mix { repetitions: u32, volume: f64, depth: f64 },
}

impl std::fmt::Display for MixStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixStep::Aspirate { volume, depth } => {
                write!(f, "aspirate {:.1} µL @ {} mm", volume, depth)
            }
            MixStep::Dispense { volume, depth } => {
                write!(f, "dispense {:.1} µL @ {} mm", volume, depth)
            }
            MixStep::Mix {
                repetitions,
                volume,
                depth,
            } => write!(f, "mix {}x {:.1} µL @ {} mm", repetitions, volume, depth),
        }
    }
}

/// 液体转移
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub volume: f64,
    pub from: String,
    pub to: String,
}

/// 设备执行层
pub trait Actuator {
    fn move_resource(&mut self, resource: &str, to: &str) -> Result<()>;
    fn configure(&mut self, pipette: Pipette, tip_rack: &str) -> Result<()>;
    fn mix_step(&mut self, step: &MixStep) -> Result<()>;
    fn transfer(&mut self, transfer: &Transfer) -> Result<()>;
}

/// 由三个深度展开的混合序列
pub fn mix_program(depths: [f64; 3], final_volume: f64) -> Vec<MixStep> {
    let [bottom, middle, top] = depths;
    vec![
        MixStep::Aspirate {
            volume: final_volume / 2.0,
            depth: bottom,
        },
        MixStep::Dispense {
            volume: final_volume / 2.0,
            depth: middle,
        },
        MixStep::Aspirate {
            volume: final_volume / 3.0,
            depth: top,
        },
        MixStep::Dispense {
            volume: final_volume / 3.0,
            depth: bottom,
        },
        MixStep::Mix {
            repetitions: 3,
            volume: final_volume,
            depth: bottom,
        },
    ]
}

/// 执行一次分档混合：搬移 → 配置移液器 → 混合 → 恢复布局
///
/// `layout` 随每次搬移更新。与布局冲突的搬移不会下发到设备。
/// 前向步骤失败时撤回已发出的搬移后再返回错误。
pub fn run_mix<A: Actuator>(
    plan: &ResourceTierPlan,
    layout: &mut Layout,
    actuator: &mut A,
    final_volume: f64,
) -> Result<()> {
    let mut issued: Vec<Relocation> = Vec::new();
    let outcome = forward(plan, layout, actuator, final_volume, &mut issued);

    let restore: Vec<Relocation> = if outcome.is_ok() {
        plan.restorations.clone()
    } else {
        issued.iter().rev().map(Relocation::reversed).collect()
    };

    for relocation in &restore {
        relocate(layout, actuator, relocation)?;
    }

    outcome
}

/// 先在布局副本上校验，通过后才驱动设备并提交布局
fn relocate<A: Actuator>(
    layout: &mut Layout,
    actuator: &mut A,
    relocation: &Relocation,
) -> Result<()> {
    let mut next = layout.clone();
    next.apply(relocation)?;
    actuator.move_resource(&relocation.resource, &relocation.to)?;
    *layout = next;
    Ok(())
}

fn forward<A: Actuator>(
    plan: &ResourceTierPlan,
    layout: &mut Layout,
    actuator: &mut A,
    final_volume: f64,
    issued: &mut Vec<Relocation>,
) -> Result<()> {
    for relocation in &plan.relocations {
        relocate(layout, actuator, relocation)?;
        issued.push(relocation.clone());
    }

    actuator.configure(plan.pipette, &plan.tip_rack)?;
    for step in mix_program(plan.mix_depths, final_volume) {
        actuator.mix_step(&step)?;
    }
    Ok(())
}

/// 记录命令而不驱动设备
#[derive(Debug, Default)]
pub struct TranscriptActuator {
    pub lines: Vec<String>,
}

impl Actuator for TranscriptActuator {
    fn move_resource(&mut self, resource: &str, to: &str) -> Result<()> {
        self.lines.push(format!("move {} -> {}", resource, to));
        Ok(())
    }

    fn configure(&mut self, pipette: Pipette, tip_rack: &str) -> Result<()> {
        self.lines
            .push(format!("configure {} single-nozzle with {}", pipette, tip_rack));
        Ok(())
    }

    fn mix_step(&mut self, step: &MixStep) -> Result<()> {
        self.lines.push(step.to_string());
        Ok(())
    }

    fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self.lines.push(format!(
            "transfer {:.2} µL {} -> {}",
            transfer.volume, transfer.from, transfer.to
        ));
        Ok(())
    }
}
