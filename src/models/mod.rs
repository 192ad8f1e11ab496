//! # 数据模型模块
//!
//! 定义孔位坐标、测量网格、样本和甲板布局数据模型。
//!
//! ## 依赖关系
//! - 被 `engine/`, `parsers/`, `report/`, `commands/` 使用
//! - 子模块: grid, sample, layout

pub mod grid;
pub mod layout;
pub mod sample;

pub use grid::{GridCoordinate, PlateGrid, PLATE_ROWS};
pub use layout::{Layout, LayoutEntry, Relocation};
pub use sample::{CalibrationPoint, SampleOutcome, SampleSlot, UnknownResult, VolumePair};
