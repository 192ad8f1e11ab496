//! # 工具函数模块
//!
//! 提供美化输出、spinner、数据文件定位等工具。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 子模块: output, progress, discovery

pub mod discovery;
pub mod output;
pub mod progress;
