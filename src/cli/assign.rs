//! # assign 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/assign.rs`

use clap::Args;

/// assign 子命令参数
#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Number of samples to place
    #[arg(short = 'n', long, env = "PLATENORM_NUM_SAMPLES", default_value_t = 10)]
    pub num_samples: usize,

    /// Source rack rows, in fill order (e.g., 'BCDE')
    #[arg(long, default_value = "BCDE")]
    pub rack_rows: String,

    /// Columns per source rack row
    #[arg(long, default_value_t = 6)]
    pub rack_columns: usize,

    #[command(flatten)]
    pub plate: PlateLayoutArgs,
}

/// 检测板布局参数（assign / quantify 共用）
#[derive(Args, Debug, Clone)]
pub struct PlateLayoutArgs {
    /// First assay plate column of the standards replicates
    #[arg(long, env = "PLATENORM_STANDARDS_COLUMN", default_value_t = 1)]
    pub standards_column: usize,

    /// First assay plate column of the sample bands
    #[arg(long, env = "PLATENORM_FIRST_COLUMN", default_value_t = 4)]
    pub first_column: usize,

    /// Replicate wells per sample (band width in columns)
    #[arg(long, env = "PLATENORM_REPLICATES", default_value_t = 3)]
    pub replicates: usize,

    /// Columns on the assay plate
    #[arg(long, default_value_t = 12)]
    pub plate_columns: usize,
}
