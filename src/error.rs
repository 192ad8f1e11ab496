//! # 统一错误处理模块
//!
//! 定义 platenorm 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - 批次致命：`DegenerateCalibration`, `NonInvertibleModel`, `PoorCalibration`,
//!   严格模式下的 `InfeasibleDilution`
//! - 单样本：`InvalidMeasurement`（由调用方策略决定是否继续）
//! - 可恢复：`CapacityExceeded`（减少样本数或增加容器）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// platenorm 统一错误类型
#[derive(Error, Debug)]
pub enum PlatenormError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No file matching '{pattern}' found in {dir}")]
    NoFilesFound { dir: String, pattern: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid well name: '{0}'")]
    InvalidWell(String),

    // ─────────────────────────────────────────────────────────────
    // 板位映射错误
    // ─────────────────────────────────────────────────────────────
    #[error("Capacity exceeded: {requested} samples requested, only {capacity} positions available")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Well {well} is outside the {rows}x{columns} plate")]
    WellOutOfRange {
        well: String,
        rows: usize,
        columns: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 标准曲线错误
    // ─────────────────────────────────────────────────────────────
    #[error("Degenerate calibration: {0}")]
    DegenerateCalibration(String),

    #[error("Calibration model is not invertible (slope = {slope})")]
    NonInvertibleModel { slope: f64 },

    #[error("Standard curve fit is too poor: R² = {r_squared:.4} (minimum {minimum:.4})")]
    PoorCalibration { r_squared: f64, minimum: f64 },

    // ─────────────────────────────────────────────────────────────
    // 归一化错误
    // ─────────────────────────────────────────────────────────────
    /// `sample` 为 0 起始的样本序号，信息中按 "Sample N" 显示
    #[error(
        "Invalid measurement for Sample {}: resolved concentration {:.4}",
        .sample + 1,
        .concentration
    )]
    InvalidMeasurement { sample: usize, concentration: f64 },

    #[error(
        "Infeasible dilution for Sample {}: needs {:.2} µL, ceiling is {:.2} µL",
        .sample + 1,
        .required,
        .ceiling
    )]
    InfeasibleDilution {
        sample: usize,
        required: f64,
        ceiling: f64,
    },

    // ─────────────────────────────────────────────────────────────
    // 甲板布局错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unknown resource '{0}' in deck layout")]
    UnknownResource(String),

    #[error("Cannot move '{resource}' to {slot}: slot is occupied by '{occupant}'")]
    SlotOccupied {
        resource: String,
        slot: String,
        occupant: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PlatenormError>;
