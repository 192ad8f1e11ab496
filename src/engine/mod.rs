//! # 定量归一化引擎
//!
//! 纯计算部分：不驱动设备，只产生计划。
//!
//! ## 子模块
//! - `mapper`: 样本板位映射
//! - `calibration`: 标准曲线拟合与浓度反算
//! - `normalizer`: 体积归一化（截断 / 严格策略）
//! - `tier`: 混合体积分档与耗材搬移规划
//! - `click`: click 反应体积
//! - `actuator`: 执行层接口
//! - `pipeline`: 组件串联
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`

pub mod actuator;
pub mod calibration;
pub mod click;
pub mod mapper;
pub mod normalizer;
pub mod pipeline;
pub mod tier;

pub use normalizer::{DilutionPolicy, NormalizationTarget};
pub use pipeline::QuantificationReport;
pub use tier::TierTable;
