//! Historical growth estimation.
//!
//! Revenue arrives newest first, so the period-over-period change computed here is the
//! decline from each newer period to the one before it. A company that grew 10% a year
//! shows roughly -9% per step, and `1 - mean` turns that into a forward multiplier above one.

use crate::domain::model::GrowthRates;
use crate::utils::error::{DcfError, Result};

/// Relative change between consecutive entries, dropping the undefined first value.
pub fn period_changes(revenue: &[f64]) -> Result<Vec<f64>> {
    revenue
        .windows(2)
        .map(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            if previous == 0.0 {
                return Err(DcfError::division_by_zero("historical revenue"));
            }
            Ok((current - previous) / previous)
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn estimate_growth(revenue: &[f64]) -> Result<GrowthRates> {
    if revenue.len() < 2 {
        return Err(DcfError::InsufficientHistory {
            message: format!(
                "{} revenue period(s) available, at least 2 are required",
                revenue.len()
            ),
        });
    }

    let changes = period_changes(revenue)?;
    let mean_growth = mean(&changes);
    let spread = std_dev(&changes);

    Ok(GrowthRates {
        mean_growth,
        std_dev: spread,
        base: 1.0 + -mean_growth,
        bull: 1.0 + -(mean_growth - spread),
        bear: 1.0 + -(mean_growth + spread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::Scenario;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_period_changes_newest_first() {
        // 2023: 120, 2022: 100, 2021: 80
        let changes = period_changes(&[120.0, 100.0, 80.0]).unwrap();
        assert!((changes[0] - (100.0 - 120.0) / 120.0).abs() < EPS);
        assert!((changes[1] - (80.0 - 100.0) / 100.0).abs() < EPS);
    }

    #[test]
    fn test_growing_company_gets_multiplier_above_one() {
        let rates = estimate_growth(&[121.0, 110.0, 100.0]).unwrap();
        assert!(rates.base > 1.0);
    }

    #[test]
    fn test_shrinking_company_gets_multiplier_below_one() {
        let rates = estimate_growth(&[80.0, 100.0, 125.0]).unwrap();
        assert!(rates.base < 1.0);
    }

    #[test]
    fn test_bull_and_bear_symmetric_about_base() {
        for history in [
            vec![394.3, 365.8, 274.5, 260.2],
            vec![50.0, 75.0, 60.0],
            vec![10.0, 9.0, 11.0, 8.5, 12.0],
        ] {
            let rates = estimate_growth(&history).unwrap();
            let up = (rates.bull - rates.base).abs();
            let down = (rates.bear - rates.base).abs();
            assert!((up - down).abs() < 1e-12, "{} vs {}", up, down);
        }
    }

    #[test]
    fn test_two_periods_has_zero_spread() {
        let rates = estimate_growth(&[110.0, 100.0]).unwrap();
        assert_eq!(rates.std_dev, 0.0);
        assert_eq!(rates.base, rates.bull);
        assert_eq!(rates.base, rates.bear);
        assert!((rates.base - (1.0 + 10.0 / 110.0)).abs() < EPS);
    }

    #[test]
    fn test_multiplier_selection() {
        let rates = estimate_growth(&[130.0, 110.0, 100.0]).unwrap();
        assert_eq!(rates.multiplier(Scenario::Base), rates.base);
        assert_eq!(rates.multiplier(Scenario::Bull), rates.bull);
        assert_eq!(rates.multiplier(Scenario::Bear), rates.bear);
    }

    #[test]
    fn test_insufficient_history() {
        assert!(matches!(
            estimate_growth(&[100.0]).unwrap_err(),
            DcfError::InsufficientHistory { .. }
        ));
        assert!(matches!(
            estimate_growth(&[]).unwrap_err(),
            DcfError::InsufficientHistory { .. }
        ));
    }

    #[test]
    fn test_zero_revenue_denominator() {
        assert!(matches!(
            estimate_growth(&[100.0, 0.0, 50.0]).unwrap_err(),
            DcfError::DivisionByZero { .. }
        ));
    }
}
