//! # 体积分档与耗材搬移规划
//!
//! 按混合总体积选择移液器/枪头配置，并计算到达该配置所需的最少搬移序列，
//! 以及混合完成后恢复标准布局的逆序列。
//!
//! ## 分档（半开区间）
//! | 体积 (µL)   | 档位    | 混合深度 (mm) | 搬移                     |
//! |-------------|---------|---------------|--------------------------|
//! | (0, 100)    | small   | 1, 2, 3       | 无                       |
//! | [100, 200)  | medium  | 1, 4, 9       | partial_50 → B4          |
//! | [200, 500)  | large   | 1, 6, 11      | partial_50 → B4, tips_1000 → B3 |
//! | [500, 1000) | xlarge  | 1, 10, 16     | partial_50 → B4, tips_1000 → B3 |
//! | ≥ 1000      | default | 可配置（默认 1, 1, 1） | 可配置（默认无）   |
//!
//! 搬移规划是 `(当前布局, 目标布局)` 的纯函数：只移动位置不同的资源，
//! 并保证每一步的目标槽位空闲。
//!
//! ## 依赖关系
//! - 被 `engine/pipeline.rs`, `engine/actuator.rs`, `commands/tier.rs` 使用
//! - 使用 `models/layout.rs`

use crate::error::{PlatenormError, Result};
use crate::models::{Layout, Relocation};

/// 50 µL 单通道枪头盒（耗材 A）
pub const PARTIAL_50: &str = "partial_50";
/// 1000 µL 枪头盒（耗材 B）
pub const TIPS_1000: &str = "tips_1000";
/// 200 µL 枪头盒（不搬移）
pub const TIPS_200: &str = "tips_200";

/// 体积档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Small,
    Medium,
    Large,
    XLarge,
    Default,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Small => write!(f, "small"),
            Tier::Medium => write!(f, "medium"),
            Tier::Large => write!(f, "large"),
            Tier::XLarge => write!(f, "xlarge"),
            Tier::Default => write!(f, "default"),
        }
    }
}

/// 移液器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipette {
    /// flex_8channel_50，单通道模式
    P50,
    /// flex_8channel_1000，单通道模式
    P1000,
}

impl std::fmt::Display for Pipette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipette::P50 => write!(f, "p50"),
            Pipette::P1000 => write!(f, "p1000"),
        }
    }
}

/// 单个档位的配置
#[derive(Debug, Clone, PartialEq)]
pub struct TierSpec {
    pub tier: Tier,
    /// 吸/排液深度（距孔底 mm）
    pub mix_depths: [f64; 3],
    pub pipette: Pipette,
    /// 使用的枪头盒
    pub tip_rack: String,
    /// 本档要求的非标准位置（资源, 槽位）
    pub placements: Vec<(String, String)>,
}

impl TierSpec {
    pub fn new(tier: Tier, mix_depths: [f64; 3], pipette: Pipette, tip_rack: &str) -> Self {
        Self {
            tier,
            mix_depths,
            pipette,
            tip_rack: tip_rack.to_string(),
            placements: Vec::new(),
        }
    }

    pub fn place(mut self, resource: &str, slot: &str) -> Self {
        self.placements.push((resource.to_string(), slot.to_string()));
        self
    }
}

/// 分档表：按上界升序排列的有界档位 + 兜底档位
#[derive(Debug, Clone)]
pub struct TierTable {
    /// (上界（不含）, 配置)
    bands: Vec<(f64, TierSpec)>,
    fallback: TierSpec,
}

impl Default for TierTable {
    fn default() -> Self {
        let large_volume = |tier, depths| {
            TierSpec::new(tier, depths, Pipette::P1000, TIPS_1000)
                .place(PARTIAL_50, "B4")
                .place(TIPS_1000, "B3")
        };

        Self {
            bands: vec![
                (
                    100.0,
                    TierSpec::new(Tier::Small, [1.0, 2.0, 3.0], Pipette::P50, PARTIAL_50),
                ),
                (
                    200.0,
                    TierSpec::new(Tier::Medium, [1.0, 4.0, 9.0], Pipette::P1000, TIPS_200)
                        .place(PARTIAL_50, "B4"),
                ),
                (500.0, large_volume(Tier::Large, [1.0, 6.0, 11.0])),
                (1000.0, large_volume(Tier::XLarge, [1.0, 10.0, 16.0])),
            ],
            fallback: TierSpec::new(Tier::Default, [1.0, 1.0, 1.0], Pipette::P1000, TIPS_200),
        }
    }
}

impl TierTable {
    /// 替换 ≥ 最大上界时使用的兜底档位
    pub fn with_fallback(mut self, fallback: TierSpec) -> Self {
        self.fallback = fallback;
        self
    }

    /// 按体积查找档位
    pub fn lookup(&self, total_volume: f64) -> Result<&TierSpec> {
        if !(total_volume > 0.0 && total_volume.is_finite()) {
            return Err(PlatenormError::InvalidArgument(format!(
                "total volume must be positive, got {}",
                total_volume
            )));
        }
        Ok(self
            .bands
            .iter()
            .find(|(upper, _)| total_volume < *upper)
            .map(|(_, spec)| spec)
            .unwrap_or(&self.fallback))
    }
}

/// 一次混合事件的档位与搬移计划
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTierPlan {
    pub total_volume: f64,
    pub tier: Tier,
    pub mix_depths: [f64; 3],
    pub pipette: Pipette,
    pub tip_rack: String,
    /// 混合前执行
    pub relocations: Vec<Relocation>,
    /// 混合后执行，恢复标准布局
    pub restorations: Vec<Relocation>,
}

impl ResourceTierPlan {
    /// 混合时的布局
    pub fn working_layout(&self, current: &Layout) -> Result<Layout> {
        let mut layout = current.clone();
        for relocation in &self.relocations {
            layout.apply(relocation)?;
        }
        Ok(layout)
    }

    /// 完整执行（搬移 + 恢复）后的布局
    pub fn final_layout(&self, current: &Layout) -> Result<Layout> {
        let mut layout = self.working_layout(current)?;
        for relocation in &self.restorations {
            layout.apply(relocation)?;
        }
        Ok(layout)
    }
}

/// 选择档位并规划搬移
pub fn select_tier(
    total_volume: f64,
    current: &Layout,
    canonical: &Layout,
    table: &TierTable,
) -> Result<ResourceTierPlan> {
    let spec = table.lookup(total_volume)?;

    // 受管资源：标准布局中的全部资源
    for (resource, _) in canonical.resources() {
        if current.slot_of(resource).is_none() {
            return Err(PlatenormError::UnknownResource(resource.to_string()));
        }
    }

    let mut baseline = current.clone();
    for (resource, slot) in canonical.resources() {
        baseline.set(resource, slot);
    }

    let mut required = baseline.clone();
    for (resource, slot) in &spec.placements {
        if canonical.slot_of(resource).is_none() {
            return Err(PlatenormError::UnknownResource(resource.clone()));
        }
        required.set(resource.clone(), slot.clone());
    }

    let relocations = plan_relocations(current, &required)?;
    let restorations = plan_relocations(&required, &baseline)?;

    Ok(ResourceTierPlan {
        total_volume,
        tier: spec.tier,
        mix_depths: spec.mix_depths,
        pipette: spec.pipette,
        tip_rack: spec.tip_rack.clone(),
        relocations,
        restorations,
    })
}

/// 计算从 `from` 到 `to` 的搬移序列
///
/// 只移动位置不同的资源；每一步的目标槽位在该步执行时必须空闲。
pub fn plan_relocations(from: &Layout, to: &Layout) -> Result<Vec<Relocation>> {
    let mut working = from.clone();
    let mut pending = Vec::new();

    for (resource, target) in to.resources() {
        match working.slot_of(resource) {
            None => return Err(PlatenormError::UnknownResource(resource.to_string())),
            Some(slot) if slot != target => pending.push(Relocation::new(resource, slot, target)),
            Some(_) => {}
        }
    }

    let mut plan = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|m| working.occupant(&m.to).is_none());

        match ready {
            Some(i) => {
                let relocation = pending.remove(i);
                working.apply(&relocation)?;
                plan.push(relocation);
            }
            None => {
                // 剩余搬移互相阻塞（环或被不动的资源占用）
                let blocked = &pending[0];
                let occupant = working.occupant(&blocked.to).unwrap_or("?");
                return Err(PlatenormError::SlotOccupied {
                    resource: blocked.resource.clone(),
                    slot: blocked.to.clone(),
                    occupant: occupant.to_string(),
                });
            }
        }
    }

    Ok(plan)
}

/// 流程默认的标准布局
pub fn canonical_layout() -> Layout {
    Layout::new()
        .with(PARTIAL_50, "B3")
        .with(TIPS_1000, "C4")
        .with(TIPS_200, "A3")
}
