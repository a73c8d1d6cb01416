//! Entry points into the valuation model.
//!
//! Each function runs the pipeline forward from a frozen snapshot:
//! growth estimation, aggregation, projection, free cash flow, WACC and discounting.
//! Nothing here logs, prints or keeps state between calls.

use crate::config::model::ModelConfig;
use crate::core::aggregator::aggregate;
use crate::core::growth::estimate_growth;
use crate::core::projection::build_schedule;
use crate::core::valuation::{value_equity, EquityBridge};
use crate::core::wacc::{compute_wacc, WaccInputs};
use crate::domain::model::{
    CompanySnapshot, FinancialTable, GrowthRates, LineItem, ProjectionSchedule, Valuation,
};
use crate::domain::scenario::Scenario;
use crate::utils::error::{DcfError, Result};
use crate::utils::validation::MAX_PROJECTION_YEARS;

/// Output of a full run: the inputs the model derived along the way plus the valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct DcfOutcome {
    pub growth: GrowthRates,
    pub history: FinancialTable,
    pub schedule: ProjectionSchedule,
    pub valuation: Option<Valuation>,
}

pub fn build_projection(
    snapshot: &CompanySnapshot,
    years: u32,
    scenario: Scenario,
    config: &ModelConfig,
) -> Result<(GrowthRates, FinancialTable, ProjectionSchedule)> {
    if years > MAX_PROJECTION_YEARS {
        return Err(DcfError::invalid_input(
            "years",
            format!("must not exceed {}", MAX_PROJECTION_YEARS),
        ));
    }
    let growth = estimate_growth(&snapshot.revenue_history())?;
    let history = aggregate(snapshot, config.history_periods)?;
    let schedule = build_schedule(&history, growth.multiplier(scenario), years, config)?;
    Ok((growth, history, schedule))
}

/// Projected revenue for each year of the horizon.
pub fn project_revenue(
    snapshot: &CompanySnapshot,
    years: u32,
    scenario: Scenario,
    config: &ModelConfig,
) -> Result<Vec<f64>> {
    let (_, _, schedule) = build_projection(snapshot, years, scenario, config)?;
    Ok(schedule.revenues())
}

pub fn run_model(
    snapshot: &CompanySnapshot,
    years: u32,
    scenario: Scenario,
    config: &ModelConfig,
) -> Result<DcfOutcome> {
    let (growth, history, schedule) = build_projection(snapshot, years, scenario, config)?;
    let valuation = value_schedule(snapshot, &history, &schedule, config)?;
    Ok(DcfOutcome {
        growth,
        history,
        schedule,
        valuation: Some(valuation),
    })
}

/// Estimated intrinsic value per share.
pub fn compute_valuation(
    snapshot: &CompanySnapshot,
    years: u32,
    scenario: Scenario,
    config: &ModelConfig,
) -> Result<Valuation> {
    let (_, history, schedule) = build_projection(snapshot, years, scenario, config)?;
    value_schedule(snapshot, &history, &schedule, config)
}

fn value_schedule(
    snapshot: &CompanySnapshot,
    history: &FinancialTable,
    schedule: &ProjectionSchedule,
    config: &ModelConfig,
) -> Result<Valuation> {
    if schedule.is_empty() {
        return Err(DcfError::invalid_input("years", "must be a positive integer"));
    }

    let wacc = compute_wacc(&WaccInputs::from_snapshot(snapshot, history)?, config)?;
    let shares_outstanding = snapshot
        .profile
        .shares_outstanding
        .filter(|s| s.is_finite())
        .ok_or_else(|| DcfError::missing_market_data("shares outstanding"))?;

    value_equity(
        &schedule.free_cash_flows(),
        wacc,
        EquityBridge {
            terminal_growth_rate: config.terminal_growth_rate,
            net_debt: history.most_recent(LineItem::NetDebt)?,
            shares_outstanding,
        },
    )
}
