//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `engine/`, `parsers/`, `report/`, `utils/`
//! - 子模块: assign, quantify, tier

pub mod assign;
pub mod quantify;
pub mod tier;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Assign(args) => assign::execute(args),
        Commands::Quantify(args) => quantify::execute(args),
        Commands::Tier(args) => tier::execute(args),
    }
}
