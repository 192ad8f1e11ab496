//! # 解析器模块
//!
//! 读板仪测量网格和甲板布局文件的读写。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: plate, layout

pub mod layout;
pub mod plate;

pub use plate::PlateReadOptions;
