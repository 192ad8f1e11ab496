//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `assign`: 样本板位映射预览
//! - `quantify`: 读板数据定量并生成归一化方案
//! - `tier`: 按混合体积选择档位并规划耗材搬移
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: assign, quantify, tier

pub mod assign;
pub mod quantify;
pub mod tier;

use clap::{Parser, Subcommand};

/// Platenorm - 微孔板定量与样本归一化规划
#[derive(Parser)]
#[command(name = "platenorm")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "BCA quantification and sample normalization planner for liquid-handling decks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Show source rack positions and assay plate wells for each sample
    Assign(assign::AssignArgs),

    /// Fit the standard curve, quantify samples and plan normalization transfers
    Quantify(quantify::QuantifyArgs),

    /// Select the mixing tier for a volume and plan labware relocations
    Tier(tier::TierArgs),
}
