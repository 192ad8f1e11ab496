//! # Platenorm - 微孔板定量与样本归一化规划
//!
//! 由 BCA 读板数据拟合标准曲线，反算样本浓度，
//! 计算归一化转移体积，并为混合步骤规划移液器档位与耗材搬移。
//!
//! ## 子命令
//! - `assign`   - 样本板位映射预览
//! - `quantify` - 定量并生成归一化方案（可选 click 预混液规划）
//! - `tier`     - 按混合体积选择档位并规划耗材搬移
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (读板数据 / 布局文件)
//!   │     ├── engine/    (映射、标定、归一化、分档)
//!   │     ├── report/    (CSV 与标准曲线图)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod engine;
mod error;
mod models;
mod parsers;
mod report;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
