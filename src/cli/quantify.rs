//! # quantify 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/quantify.rs`

use super::assign::PlateLayoutArgs;
use super::tier::FallbackTierArgs;
use crate::engine::DilutionPolicy;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 稀释不可行时的处理方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum PolicyArg {
    /// Use neat sample and flag it
    #[default]
    Clamp,
    /// Abort the whole batch
    Strict,
}

impl From<PolicyArg> for DilutionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Clamp => DilutionPolicy::Clamp,
            PolicyArg::Strict => DilutionPolicy::Strict,
        }
    }
}

/// quantify 子命令参数
#[derive(Args, Debug)]
pub struct QuantifyArgs {
    /// Plate reader export to analyze (defaults to the newest file in --data-dir)
    pub plate_file: Option<PathBuf>,

    /// Directory searched for plate reader exports
    #[arg(long, env = "PLATENORM_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Filename pattern for plate reader exports
    #[arg(long, env = "PLATENORM_PATTERN", default_value = "*.csv")]
    pub pattern: String,

    /// Search --data-dir recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Wait for a new export to appear instead of using the newest existing one
    #[arg(long, default_value_t = false)]
    pub wait: bool,

    /// Seconds to wait for a new export
    #[arg(long, default_value_t = 600)]
    pub timeout: u64,

    /// Polling interval in seconds while waiting
    #[arg(long, default_value_t = 5)]
    pub poll: u64,

    /// Leading lines to skip before the measurement grid
    #[arg(long, env = "PLATENORM_SKIP_ROWS", default_value_t = 0)]
    pub skip_rows: usize,

    /// Leading columns to skip on each grid row
    #[arg(long, env = "PLATENORM_SKIP_COLUMNS", default_value_t = 0)]
    pub skip_columns: usize,

    /// Field delimiter of the export
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    #[command(flatten)]
    pub plate: PlateLayoutArgs,

    /// Number of samples on the assay plate
    #[arg(short = 'n', long, env = "PLATENORM_NUM_SAMPLES", default_value_t = 10)]
    pub num_samples: usize,

    /// Target concentration (mg/mL)
    #[arg(long, env = "PLATENORM_TARGET_CONCENTRATION", default_value_t = 1.5)]
    pub target_concentration: f64,

    /// Target protein mass per well (µg); overrides --target-concentration
    #[arg(long, conflicts_with = "target_concentration")]
    pub target_mass: Option<f64>,

    /// Final volume per normalized well (µL)
    #[arg(long, env = "PLATENORM_FINAL_VOLUME", default_value_t = 50.0)]
    pub final_volume: f64,

    /// What to do when a sample is too dilute to reach the target
    #[arg(long, value_enum, env = "PLATENORM_POLICY", default_value_t = PolicyArg::Clamp)]
    pub policy: PolicyArg,

    /// Minimum R² accepted for the standard curve
    #[arg(long, env = "PLATENORM_MIN_R_SQUARED", default_value_t = 0.95)]
    pub min_r_squared: f64,

    /// Accept the standard curve regardless of R²
    #[arg(long, default_value_t = false)]
    pub skip_fit_check: bool,

    /// Abort when any sample resolves to a non-positive concentration
    #[arg(long, default_value_t = false)]
    pub fail_on_invalid: bool,

    /// Print the normalization transfer list
    #[arg(long, default_value_t = false)]
    pub show_transfers: bool,

    /// Plan the click chemistry premix and its mixing tier
    #[arg(long, default_value_t = false)]
    pub click: bool,

    #[command(flatten)]
    pub fallback: FallbackTierArgs,

    /// Current deck layout CSV (defaults to the canonical layout)
    #[arg(long, env = "PLATENORM_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Filename for the per-sample protocol CSV
    #[arg(long, default_value = "protocol_output.csv")]
    pub output_csv: PathBuf,

    /// Filename for the standard curve plot (PNG, or SVG by extension)
    #[arg(long, default_value = "standard_curve.png")]
    pub output_plot: PathBuf,

    /// Skip plot generation
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,
}
