//! Line-item projection across the forecast horizon.
//!
//! Every item except revenue is tied to revenue (or, for legacy depreciation, to capex)
//! through a ratio averaged over the historical periods. The ratios do not drift over the
//! horizon.

use crate::config::model::{DepreciationMethod, ModelConfig, WorkingCapitalAnchor};
use crate::core::fcf;
use crate::domain::model::{FinancialTable, LineItem, ProjectionSchedule, RatioConstants};
use crate::utils::error::{DcfError, Result};

/// Projects depreciation for each forecast year.
pub trait DepreciationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn project(&self, history: &FinancialTable, projected_capex: &[f64]) -> Result<Vec<f64>>;
}

/// Mean historical depreciation/capex ratio applied to projected capex.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioOfCapex;

impl DepreciationStrategy for RatioOfCapex {
    fn name(&self) -> &'static str {
        "ratio-of-capex"
    }

    fn project(&self, history: &FinancialTable, projected_capex: &[f64]) -> Result<Vec<f64>> {
        let ratio = mean_ratio(
            history.row(LineItem::ReconciledDepreciation)?,
            history.row(LineItem::CapitalExpenditure)?,
            "historical capital expenditure",
        )?;
        Ok(projected_capex.iter().map(|capex| capex * ratio).collect())
    }
}

/// Flat historical mean of depreciation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalAverage;

impl DepreciationStrategy for HistoricalAverage {
    fn name(&self) -> &'static str {
        "historical-average"
    }

    fn project(&self, history: &FinancialTable, projected_capex: &[f64]) -> Result<Vec<f64>> {
        let row = history.row(LineItem::ReconciledDepreciation)?;
        let average = row.iter().sum::<f64>() / row.len() as f64;
        Ok(vec![average; projected_capex.len()])
    }
}

impl DepreciationMethod {
    pub fn strategy(&self) -> &'static dyn DepreciationStrategy {
        match self {
            DepreciationMethod::RatioOfCapex => &RatioOfCapex,
            DepreciationMethod::HistoricalAverage => &HistoricalAverage,
        }
    }
}

/// Projected line items before free cash flow is derived. One entry per forecast year.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemProjection {
    pub revenue: Vec<f64>,
    pub operating_expense: Vec<f64>,
    pub working_capital: Vec<f64>,
    pub change_in_working_capital: Vec<f64>,
    pub capital_expenditure: Vec<f64>,
    pub depreciation: Vec<f64>,
}

/// `revenue[i] = latest * multiplier^i` for i in 1..=years.
pub fn project_revenue(latest_revenue: f64, multiplier: f64, years: u32) -> Vec<f64> {
    (1..=years)
        .map(|i| latest_revenue * multiplier.powi(i as i32))
        .collect()
}

pub fn ratio_constants(history: &FinancialTable) -> Result<RatioConstants> {
    let revenue = history.row(LineItem::TotalRevenue)?;
    Ok(RatioConstants {
        opex_to_revenue: mean_ratio(
            history.row(LineItem::OperatingExpense)?,
            revenue,
            "historical revenue",
        )?,
        working_capital_to_revenue: mean_ratio(
            history.row(LineItem::WorkingCapital)?,
            revenue,
            "historical revenue",
        )?,
        capex_to_revenue: mean_ratio(
            history.row(LineItem::CapitalExpenditure)?,
            revenue,
            "historical revenue",
        )?,
    })
}

fn mean_ratio(numerator: &[f64], denominator: &[f64], context: &str) -> Result<f64> {
    if denominator.is_empty() {
        return Err(DcfError::InsufficientHistory {
            message: format!("no periods to average {} over", context),
        });
    }
    let mut total = 0.0;
    for (n, d) in numerator.iter().zip(denominator) {
        if *d == 0.0 {
            return Err(DcfError::division_by_zero(context));
        }
        total += n / d;
    }
    Ok(total / denominator.len() as f64)
}

pub fn project_line_items(
    history: &FinancialTable,
    multiplier: f64,
    years: u32,
    config: &ModelConfig,
) -> Result<(RatioConstants, LineItemProjection)> {
    let latest_revenue = history.most_recent(LineItem::TotalRevenue)?;
    if latest_revenue == 0.0 {
        return Err(DcfError::division_by_zero("most recent revenue"));
    }

    let ratios = ratio_constants(history)?;
    let revenue = project_revenue(latest_revenue, multiplier, years);

    let operating_expense = revenue.iter().map(|r| r * ratios.opex_to_revenue).collect();
    let capital_expenditure: Vec<f64> =
        revenue.iter().map(|r| r * ratios.capex_to_revenue).collect();

    let anchor = match config.working_capital_anchor {
        WorkingCapitalAnchor::MostRecent => history.most_recent(LineItem::WorkingCapital)?,
        WorkingCapitalAnchor::Oldest => history.oldest(LineItem::WorkingCapital)?,
    };
    let working_capital: Vec<f64> = revenue
        .iter()
        .map(|r| r * ratios.working_capital_to_revenue)
        .collect();
    let change_in_working_capital = std::iter::once(anchor)
        .chain(working_capital.iter().copied())
        .collect::<Vec<f64>>()
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();

    let depreciation = config
        .depreciation_method
        .strategy()
        .project(history, &capital_expenditure)?;

    Ok((
        ratios,
        LineItemProjection {
            revenue,
            operating_expense,
            working_capital,
            change_in_working_capital,
            capital_expenditure,
            depreciation,
        },
    ))
}

/// Full projection schedule including free cash flow.
pub fn build_schedule(
    history: &FinancialTable,
    multiplier: f64,
    years: u32,
    config: &ModelConfig,
) -> Result<ProjectionSchedule> {
    let (ratios, items) = project_line_items(history, multiplier, years, config)?;
    let tax_rate = history.most_recent(LineItem::TaxRateForCalcs)?;

    Ok(ProjectionSchedule {
        multiplier,
        tax_rate,
        ratios,
        years: fcf::derive(&items, tax_rate),
    })
}
