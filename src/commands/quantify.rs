//! # quantify 子命令实现
//!
//! 读取读板仪导出，拟合标准曲线，反算样本浓度并生成归一化方案。
//!
//! ## 功能
//! - 定位数据文件（指定文件 / 目录中最新文件 / 等待新文件）
//! - 终端表格、CSV 输出和标准曲线图
//! - 可选 click 预混液与混合档位规划
//!
//! ## 依赖关系
//! - 使用 `cli/quantify.rs` 定义的参数
//! - 使用 `parsers/plate.rs`, `parsers/layout.rs`
//! - 使用 `engine/pipeline.rs`, `engine/actuator.rs`
//! - 使用 `report/`
//! - 使用 `utils/output.rs`, `utils/discovery.rs`

use crate::cli::quantify::QuantifyArgs;
use crate::engine::actuator::{Actuator, TranscriptActuator};
use crate::engine::click::PREMIX_WELL;
use crate::engine::pipeline::{self, AssayConfig, QuantificationReport};
use crate::engine::tier::canonical_layout;
use crate::engine::NormalizationTarget;
use crate::error::{PlatenormError, Result};
use crate::models::grid::row_letter;
use crate::models::{Layout, SampleOutcome};
use crate::parsers::{layout, plate, PlateReadOptions};
use crate::report::{export, plot};
use crate::utils::discovery::DataFileLocator;
use crate::utils::output;

use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};

/// 样本结果行
#[derive(Debug, Clone, Tabled)]
struct SampleRow {
    #[tabled(rename = "Sample")]
    sample: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Mean A562")]
    mean: String,
    #[tabled(rename = "Conc. (mg/mL)")]
    concentration: String,
    #[tabled(rename = "Sample (µL)")]
    dispense: String,
    #[tabled(rename = "Diluent (µL)")]
    diluent: String,
    #[tabled(rename = "Well")]
    well: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// 标准品行
#[derive(Debug, Clone, Tabled)]
struct StandardRow {
    #[tabled(rename = "Row")]
    row: char,
    #[tabled(rename = "BSA (mg/mL)")]
    concentration: String,
    #[tabled(rename = "Replicates")]
    replicates: String,
    #[tabled(rename = "Mean A562")]
    mean: String,
}

/// 预混液配方行
#[derive(Debug, Clone, Tabled)]
struct ReagentRow {
    #[tabled(rename = "Reagent")]
    reagent: String,
    #[tabled(rename = "From")]
    source: String,
    #[tabled(rename = "Volume (µL)")]
    volume: String,
}

/// 执行定量
pub fn execute(args: QuantifyArgs) -> Result<()> {
    output::print_header("Quantifying Samples");

    if args.num_samples == 0 {
        return Err(PlatenormError::InvalidArgument(
            "at least one sample is required".to_string(),
        ));
    }

    let data_file = locate_data_file(&args)?;
    output::print_info(&format!("Reading plate data from '{}'", data_file.display()));

    if !args.delimiter.is_ascii() {
        return Err(PlatenormError::InvalidArgument(format!(
            "delimiter must be a single ASCII character, got '{}'",
            args.delimiter
        )));
    }
    let options = PlateReadOptions {
        skip_rows: args.skip_rows,
        skip_columns: args.skip_columns,
        delimiter: args.delimiter as u8,
        ..Default::default()
    };
    let grid = plate::parse_plate_file(&data_file, &options)?;
    output::print_info(&format!("Read {}x{} measurement grid", grid.rows(), grid.columns()));

    let target = match args.target_mass {
        Some(mass) => NormalizationTarget::from_mass(mass, args.final_volume)?,
        None => NormalizationTarget::new(args.target_concentration, args.final_volume)?,
    };
    let mut config = AssayConfig::new(target, args.policy.into());
    config.destinations = super::assign::destination_layout(&args.plate)?;
    config.min_r_squared = (!args.skip_fit_check).then_some(args.min_r_squared);
    config.fail_on_invalid = args.fail_on_invalid;

    output::print_info(&format!(
        "Normalizing {} samples to {:.3} mg/mL in {} µL ({} policy)",
        args.num_samples, target.concentration, target.final_volume, config.policy
    ));

    let report = pipeline::quantify(&grid, args.num_samples, &config)?;

    println!("{}", Table::new(standard_rows(&report)));
    output::print_success(&format!(
        "Standard curve: A = {:.4} · c + {:.4}  (R² = {:.4})",
        report.model.slope, report.model.intercept, report.model.r_squared
    ));

    output::print_header("Normalization Plan");
    println!("{}", Table::new(sample_rows(&report)));

    report_flags(&report);

    if args.show_transfers {
        output::print_header("Transfers");
        let mut transcript = TranscriptActuator::default();
        for transfer in &report.transfers {
            transcript.transfer(transfer)?;
        }
        transcript.lines.iter().for_each(|l| output::print_step(l));
    }

    export::to_csv(&report.results, &args.output_csv)?;
    output::print_success(&format!(
        "Protocol saved to '{}'",
        args.output_csv.display()
    ));

    if !args.no_plot {
        plot::generate_curve_plot(&report, &args.output_plot, 1024, 768)?;
        output::print_success(&format!(
            "Standard curve plot saved to '{}'",
            args.output_plot.display()
        ));
    }

    if args.click {
        plan_click(&report, &config, &args)?;
    }

    Ok(())
}

/// 确定要读取的数据文件
fn locate_data_file(args: &QuantifyArgs) -> Result<PathBuf> {
    if let Some(ref path) = args.plate_file {
        return Ok(path.clone());
    }

    let locator = DataFileLocator::new(&args.data_dir, &args.pattern)?.recursive(args.recursive);
    if args.wait {
        locator.wait_for_new(
            Duration::from_secs(args.timeout),
            Duration::from_secs(args.poll.max(1)),
        )
    } else {
        locator.latest(None)
    }
}

fn standard_rows(report: &QuantificationReport) -> Vec<StandardRow> {
    report
        .standards
        .iter()
        .enumerate()
        .map(|(level, point)| StandardRow {
            row: row_letter(level),
            concentration: format!("{:.5}", point.known_concentration),
            replicates: point
                .replicates
                .iter()
                .map(|v| format!("{:.3}", v))
                .collect::<Vec<_>>()
                .join(" "),
            mean: point
                .mean()
                .map(|m| format!("{:.4}", m))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn sample_rows(report: &QuantificationReport) -> Vec<SampleRow> {
    let volume = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());

    report
        .results
        .iter()
        .zip(&report.slots)
        .zip(&report.normalization_wells)
        .map(|((r, slot), well)| SampleRow {
            sample: r.sample_id(),
            source: slot.source.to_string(),
            mean: format!("{:.4}", r.mean_measurement),
            concentration: format!("{:.4}", r.resolved_concentration),
            dispense: volume(r.dispense_volume()),
            diluent: volume(r.diluent_volume()),
            well: well.to_string(),
            status: r.outcome.label().to_string(),
        })
        .collect()
}

/// 汇总被截断 / 被拒的样本
fn report_flags(report: &QuantificationReport) {
    for r in &report.results {
        match &r.outcome {
            SampleOutcome::Clamped(_) => output::print_warning(&format!(
                "{} is below target concentration; using neat sample",
                r.sample_id()
            )),
            SampleOutcome::Rejected(reason) => {
                output::print_warning(&format!("{} skipped: {}", r.sample_id(), reason))
            }
            SampleOutcome::Normalized(_) => {}
        }
    }

    let ok = report.results.len() - report.clamped() - report.rejected();
    output::print_info(&format!(
        "{} normalized, {} clamped, {} rejected",
        ok,
        report.clamped(),
        report.rejected()
    ));
}

/// 规划 click 预混液与混合
fn plan_click(
    report: &QuantificationReport,
    config: &AssayConfig,
    args: &QuantifyArgs,
) -> Result<()> {
    output::print_header("Click Chemistry");

    let mut current: Layout = match args.layout {
        Some(ref path) => layout::read_layout(path)?,
        None => canonical_layout(),
    };

    let mix = report.plan_click_mix(
        config.target.final_volume,
        &current,
        &canonical_layout(),
        &super::tier::tier_table(&args.fallback)?,
    )?;
    let (click, plan) = (&mix.click, &mix.plan);

    output::print_info(&format!(
        "Premix for {} reactions in {}",
        click.reactions(),
        PREMIX_WELL
    ));
    let reagents: Vec<ReagentRow> = click
        .premix()
        .into_iter()
        .map(|r| ReagentRow {
            reagent: r.reagent.to_string(),
            source: r.source.to_string(),
            volume: format!("{:.1}", r.volume),
        })
        .collect();
    println!("{}", Table::new(&reagents));

    let heads: Vec<String> = config
        .normalization_plate
        .column_heads(&report.reaction_wells())
        .iter()
        .map(|w| w.to_string())
        .collect();
    output::print_info(&format!(
        "Add {:.1} µL premix per well, mix at {:.1} µL total ({} tier, {} with {})",
        click.per_well_volume(),
        click.mix_volume(),
        plan.tier,
        plan.pipette,
        plan.tip_rack
    ));
    if !heads.is_empty() {
        output::print_info(&format!("Multichannel columns: {}", heads.join(" ")));
    }

    let mut transcript = TranscriptActuator::default();
    mix.execute(&mut current, &mut transcript)?;
    for relocation in &plan.relocations {
        output::print_move(&relocation.resource, &relocation.from, &relocation.to);
    }
    transcript.lines.iter().for_each(|l| output::print_step(l));

    output::print_info(&format!(
        "Loading buffer: {:.1} µL per well",
        click.loading_buffer_volume()
    ));
    output::print_success("Click mix planned; deck layout restored");
    Ok(())
}

