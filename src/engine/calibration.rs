//! # 标准曲线拟合与浓度反算
//!
//! ## 算法
//! 1. 每个标准品取重复测量平均值
//! 2. 最小二乘拟合 `mean ≈ slope · conc + intercept`
//! 3. `R² = 1 − SS_res / SS_tot`
//! 4. 未知样本：`conc = (mean − intercept) / slope`
//!
//! ## 依赖关系
//! - 被 `engine/pipeline.rs`, `report/plot.rs` 使用
//! - 使用 `models/sample.rs` 的 CalibrationPoint

use crate::error::{PlatenormError, Result};
use crate::models::CalibrationPoint;

/// BSA 标准品两倍稀释系列 (mg/mL)，对应检测板 A..H 行
pub const BSA_STANDARD_SERIES: [f64; 8] = [10.0, 5.0, 2.5, 1.25, 0.625, 0.3125, 0.15625, 0.0];

/// 线性标准曲线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationModel {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl CalibrationModel {
    /// 由浓度预测信号
    pub fn predict(&self, concentration: f64) -> f64 {
        self.slope * concentration + self.intercept
    }

    /// 由信号反算浓度
    pub fn invert(&self, signal: f64) -> Result<f64> {
        if self.slope == 0.0 || !self.slope.is_finite() {
            return Err(PlatenormError::NonInvertibleModel { slope: self.slope });
        }
        Ok((signal - self.intercept) / self.slope)
    }

    /// 检查拟合优度
    pub fn check_fit(&self, minimum: f64) -> Result<()> {
        if self.r_squared < minimum {
            return Err(PlatenormError::PoorCalibration {
                r_squared: self.r_squared,
                minimum,
            });
        }
        Ok(())
    }
}

/// 拟合标准曲线
pub fn fit(points: &[CalibrationPoint]) -> Result<CalibrationModel> {
    if points.len() < 2 {
        return Err(PlatenormError::DegenerateCalibration(format!(
            "need at least 2 standards, got {}",
            points.len()
        )));
    }

    let mut xs = Vec::with_capacity(points.len());
    let mut ys = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let mean = point.mean().ok_or_else(|| {
            PlatenormError::DegenerateCalibration(format!("standard {} has no measurements", i + 1))
        })?;
        if !mean.is_finite() || !point.known_concentration.is_finite() {
            return Err(PlatenormError::DegenerateCalibration(format!(
                "standard {} is not a finite value",
                i + 1
            )));
        }
        xs.push(point.known_concentration);
        ys.push(mean);
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();

    if sxx == 0.0 {
        return Err(PlatenormError::DegenerateCalibration(
            "all standards have the same known concentration".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(PlatenormError::DegenerateCalibration(
            "all standards produced the same signal".to_string(),
        ));
    }
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    let r_squared = (1.0 - ss_res / ss_tot).clamp(0.0, 1.0);

    Ok(CalibrationModel {
        slope,
        intercept,
        r_squared,
    })
}

/// 反算未知样本浓度（重复测量取平均）
pub fn resolve(model: &CalibrationModel, sample: &CalibrationPoint) -> Result<f64> {
    let mean = sample.mean().ok_or_else(|| {
        PlatenormError::InvalidArgument("sample has no replicate measurements".to_string())
    })?;
    model.invert(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_standards(slope: f64, intercept: f64) -> Vec<CalibrationPoint> {
        BSA_STANDARD_SERIES
            .iter()
            .map(|&c| {
                let y = slope * c + intercept;
                CalibrationPoint::new(c, vec![y - 0.01, y, y + 0.01])
            })
            .collect()
    }

    #[test]
    fn test_fit_perfect_line() {
        let model = fit(&linear_standards(2.0, 1.0)).unwrap();
        assert!((model.slope - 2.0).abs() < 1e-6);
        assert!((model.intercept - 1.0).abs() < 1e-6);
        assert!((model.r_squared - 1.0).abs() < 1e-6);
        assert!((model.predict(2.5) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_noisy_line() {
        let mut points = linear_standards(0.12, 0.08);
        points[2].replicates = vec![0.40, 0.41, 0.39];
        let model = fit(&points).unwrap();
        assert!(model.r_squared < 1.0);
        assert!(model.r_squared > 0.95);
        assert!(model.check_fit(0.9).is_ok());
        assert!(matches!(
            model.check_fit(0.9999),
            Err(PlatenormError::PoorCalibration { .. })
        ));
    }

    #[test]
    fn test_fit_identical_concentrations() {
        let points: Vec<_> = (0..8)
            .map(|i| CalibrationPoint::new(2.5, vec![i as f64; 3]))
            .collect();
        assert!(matches!(
            fit(&points),
            Err(PlatenormError::DegenerateCalibration(_))
        ));
    }

    #[test]
    fn test_fit_flat_signal() {
        let points: Vec<_> = BSA_STANDARD_SERIES
            .iter()
            .map(|&c| CalibrationPoint::new(c, vec![0.5; 3]))
            .collect();
        assert!(matches!(
            fit(&points),
            Err(PlatenormError::DegenerateCalibration(_))
        ));
    }

    #[test]
    fn test_fit_too_few_points() {
        let points = vec![CalibrationPoint::new(1.0, vec![1.0])];
        assert!(fit(&points).is_err());
        assert!(fit(&[]).is_err());
    }

    #[test]
    fn test_resolve() {
        let model = fit(&linear_standards(2.0, 1.0)).unwrap();
        let sample = CalibrationPoint::unknown(vec![6.9, 7.0, 7.1]);
        let conc = resolve(&model, &sample).unwrap();
        assert!((conc - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_zero_slope() {
        let model = CalibrationModel {
            slope: 0.0,
            intercept: 1.0,
            r_squared: 0.0,
        };
        let sample = CalibrationPoint::unknown(vec![1.0, 1.0, 1.0]);
        assert!(matches!(
            resolve(&model, &sample),
            Err(PlatenormError::NonInvertibleModel { .. })
        ));
    }
}
