//! # tier 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/tier.rs`

use clap::Args;
use std::path::PathBuf;

/// tier 子命令参数
#[derive(Args, Debug)]
pub struct TierArgs {
    /// Total volume to be mixed (µL)
    #[arg(long)]
    pub volume: f64,

    /// Final well volume used to expand the mix program (µL)
    #[arg(long, env = "PLATENORM_FINAL_VOLUME", default_value_t = 50.0)]
    pub final_volume: f64,

    #[command(flatten)]
    pub fallback: FallbackTierArgs,

    /// Current deck layout CSV (defaults to the canonical layout)
    #[arg(long, env = "PLATENORM_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Print the simulated command sequence for the mix
    #[arg(long, default_value_t = false)]
    pub simulate: bool,

    /// Write the layout after the mix to this CSV ('-' for stdout)
    #[arg(long)]
    pub save_layout: Option<PathBuf>,
}

/// 兜底档位参数（tier / quantify --click 共用）
#[derive(Args, Debug, Clone)]
pub struct FallbackTierArgs {
    /// Mix depths (mm, bottom,middle,top) for volumes above the largest tier
    #[arg(
        long,
        env = "PLATENORM_FALLBACK_DEPTHS",
        value_delimiter = ',',
        num_args = 3,
        default_values_t = [1.0, 1.0, 1.0]
    )]
    pub fallback_depths: Vec<f64>,
}
