//! # 报告模块
//!
//! ## 子模块
//! - `export`: 归一化结果 CSV
//! - `plot`: 标准曲线图
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 使用
//! - 使用 `engine/pipeline.rs` 的结果

pub mod export;
pub mod plot;
