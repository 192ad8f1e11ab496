//! # 标准曲线图
//!
//! 使用 `plotters` 绘制标准品平均信号、拟合直线和反算的未知样本。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `engine/pipeline.rs` 的 QuantificationReport
//! - 使用 `plotters` 渲染图表

use crate::engine::QuantificationReport;
use crate::error::{PlatenormError, Result};

use plotters::prelude::*;
use std::path::Path;

/// 生成标准曲线图（扩展名为 .svg 时输出 SVG，否则 PNG）
pub fn generate_curve_plot(
    report: &QuantificationReport,
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_curve(&root, report)?;
        root.present()
            .map_err(|e| PlatenormError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_curve(&root, report)?;
        root.present()
            .map_err(|e| PlatenormError::Other(e.to_string()))?;
    }
    Ok(())
}

fn draw_curve<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    report: &QuantificationReport,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?;

    let model = report.model;
    let standards: Vec<(f64, f64)> = report
        .standards
        .iter()
        .filter_map(|p| p.mean().map(|m| (p.known_concentration, m)))
        .collect();
    let unknowns: Vec<(f64, f64)> = report
        .results
        .iter()
        .filter(|r| r.outcome.volumes().is_some())
        .map(|r| (r.resolved_concentration, r.mean_measurement))
        .collect();

    let x_max = standards
        .iter()
        .chain(&unknowns)
        .map(|(x, _)| *x)
        .fold(0.0, f64::max)
        * 1.1;
    let y_values = standards.iter().chain(&unknowns).map(|(_, y)| *y);
    let y_min = y_values.clone().fold(f64::INFINITY, f64::min).min(model.intercept);
    let y_max = y_values.fold(f64::NEG_INFINITY, f64::max);
    let y_margin = ((y_max - y_min).abs() * 0.1).max(1e-3);

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!(
                "Standard curve: y = {:.4}x + {:.4}, R² = {:.4}",
                model.slope, model.intercept, model.r_squared
            ),
            ("sans-serif", 24).into_font(),
        )
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max.max(1.0), (y_min - y_margin)..(y_max + y_margin))
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Protein concentration (mg/mL)")
        .y_desc("Mean absorbance")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?;

    // 拟合直线
    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            [0.0, x_max].iter().map(|&x| (x, model.predict(x))),
            line_color.stroke_width(2),
        ))
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?
        .label("Linear fit")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2)));

    chart
        .draw_series(
            standards
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, BLACK.filled())),
        )
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?
        .label("Standards")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, BLACK.filled()));

    chart
        .draw_series(
            unknowns
                .iter()
                .map(|&(x, y)| TriangleMarker::new((x, y), 6, RED.filled())),
        )
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?
        .label("Samples")
        .legend(|(x, y)| TriangleMarker::new((x + 10, y), 6, RED.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| PlatenormError::Other(format!("{:?}", e)))?;

    Ok(())
}
