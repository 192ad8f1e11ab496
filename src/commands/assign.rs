//! # assign 子命令实现
//!
//! 预览样本在源架、检测板和归一化板上的位置。
//!
//! ## 依赖关系
//! - 使用 `cli/assign.rs` 定义的参数
//! - 使用 `engine/mapper.rs`
//! - 使用 `utils/output.rs`

use crate::cli::assign::{AssignArgs, PlateLayoutArgs};
use crate::engine::mapper::{DestinationLayout, NormalizationPlate, SourceRack};
use crate::error::{PlatenormError, Result};
use crate::models::sample::sample_id;
use crate::models::PLATE_ROWS;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 板位映射行
#[derive(Debug, Clone, Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Sample")]
    sample: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Assay wells")]
    wells: String,
    #[tabled(rename = "Norm. well")]
    normalization: String,
}

/// 执行板位映射预览
pub fn execute(args: AssignArgs) -> Result<()> {
    output::print_header("Sample Plate Map");

    if args.num_samples == 0 {
        return Err(PlatenormError::InvalidArgument(
            "at least one sample is required".to_string(),
        ));
    }

    let rows: Vec<char> = args.rack_rows.chars().collect();
    if rows.is_empty() || !rows.iter().all(|r| r.is_ascii_alphabetic()) {
        return Err(PlatenormError::InvalidArgument(format!(
            "rack rows must be letters, got '{}'",
            args.rack_rows
        )));
    }

    let rack = SourceRack::new(rows, args.rack_columns);
    let destinations = destination_layout(&args.plate)?;
    let plate = NormalizationPlate::default();

    let assignment = rack.assign_samples(args.num_samples);
    if assignment.capacity_exceeded() {
        output::print_warning(&format!(
            "{} samples requested but the rack holds {}; showing the first {}",
            assignment.requested,
            assignment.capacity,
            assignment.locations.len()
        ));
    }

    let placed = assignment.locations.len().min(destinations.capacity());
    if placed < assignment.locations.len() {
        output::print_warning(&format!(
            "Assay plate holds {} samples in {}-well replicates; showing the first {}",
            destinations.capacity(),
            destinations.replicates(),
            placed
        ));
    }

    let rows = assignment
        .locations
        .iter()
        .take(placed)
        .enumerate()
        .map(|(i, source)| {
            let wells = destinations
                .destinations(i)?
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(AssignmentRow {
                sample: sample_id(i),
                source: source.to_string(),
                wells,
                normalization: plate.well(i)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    println!("{}", Table::new(&rows));

    let standards = destinations.standard_wells(0)?;
    if let (Some(first), Some(last)) = (standards.first(), standards.last()) {
        output::print_info(&format!(
            "Standards occupy columns {}-{} of the assay plate",
            first.column, last.column
        ));
    }

    output::print_success(&format!("Placed {} samples", rows.len()));
    Ok(())
}

/// 由命令行参数构造检测板布局（8 行板）
pub(crate) fn destination_layout(args: &PlateLayoutArgs) -> Result<DestinationLayout> {
    DestinationLayout::new(
        PLATE_ROWS.to_vec(),
        args.standards_column,
        args.first_column,
        args.replicates,
        args.plate_columns,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate_args(first_column: usize, replicates: usize) -> PlateLayoutArgs {
        PlateLayoutArgs {
            standards_column: 1,
            first_column,
            replicates,
            plate_columns: 12,
        }
    }

    #[test]
    fn test_destination_layout_from_args() {
        let layout = destination_layout(&plate_args(4, 2)).unwrap();
        assert_eq!(layout.replicates(), 2);
        let wells: Vec<String> = layout
            .destinations(8)
            .unwrap()
            .iter()
            .map(|w| w.to_string())
            .collect();
        assert_eq!(wells, vec!["A6", "A7"]);
    }

    #[test]
    fn test_destination_layout_overlap_rejected() {
        // 标准品占 1-3 列，样本带从第 2 列开始
        assert!(destination_layout(&plate_args(2, 3)).is_err());
    }
}
