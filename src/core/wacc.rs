use crate::config::model::ModelConfig;
use crate::domain::model::{CompanySnapshot, FinancialTable, LineItem, WaccBreakdown};
use crate::utils::error::{DcfError, Result};

/// Capital-structure and risk inputs for the discount rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaccInputs {
    pub beta: f64,
    pub interest_expense: f64,
    pub total_debt: f64,
    pub market_cap: f64,
    pub tax_rate: f64,
}

impl WaccInputs {
    pub fn from_snapshot(snapshot: &CompanySnapshot, history: &FinancialTable) -> Result<Self> {
        let profile = &snapshot.profile;
        let beta = profile
            .beta
            .filter(|b| b.is_finite())
            .ok_or_else(|| DcfError::missing_market_data("beta"))?;
        let market_cap = profile
            .market_cap
            .filter(|m| m.is_finite())
            .ok_or_else(|| DcfError::missing_market_data("market capitalization"))?;

        Ok(Self {
            beta,
            interest_expense: history.most_recent(LineItem::InterestExpense)?,
            total_debt: history.most_recent(LineItem::TotalDebt)?,
            market_cap,
            tax_rate: history.most_recent(LineItem::TaxRateForCalcs)?,
        })
    }
}

/// CAPM: `rf + beta * (rm - rf)`.
pub fn cost_of_equity(beta: f64, risk_free_rate: f64, market_return: f64) -> f64 {
    risk_free_rate + beta * (market_return - risk_free_rate)
}

pub fn cost_of_debt(interest_expense: f64, total_debt: f64) -> Result<f64> {
    if total_debt == 0.0 {
        return Err(DcfError::ZeroDebt);
    }
    Ok(interest_expense / total_debt)
}

pub fn compute_wacc(inputs: &WaccInputs, config: &ModelConfig) -> Result<WaccBreakdown> {
    let cost_of_equity = cost_of_equity(inputs.beta, config.risk_free_rate, config.market_return);
    let cost_of_debt = cost_of_debt(inputs.interest_expense, inputs.total_debt)?;

    let capital = inputs.market_cap + inputs.total_debt;
    if capital == 0.0 {
        return Err(DcfError::division_by_zero("market capitalization plus total debt"));
    }
    let equity_weight = inputs.market_cap / capital;
    let debt_weight = inputs.total_debt / capital;

    Ok(WaccBreakdown {
        cost_of_equity,
        cost_of_debt,
        equity_weight,
        debt_weight,
        tax_rate: inputs.tax_rate,
        wacc: cost_of_equity * equity_weight
            + cost_of_debt * debt_weight * (1.0 - inputs.tax_rate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::{aggregate, tests::sample_snapshot};

    fn inputs() -> WaccInputs {
        WaccInputs {
            beta: 1.2,
            interest_expense: 20.0,
            total_debt: 400.0,
            market_cap: 1600.0,
            tax_rate: 0.25,
        }
    }

    #[test]
    fn test_capm_cost_of_equity() {
        let re = cost_of_equity(1.2, 0.03, 0.08);
        assert!((re - 0.09).abs() < 1e-15);
    }

    #[test]
    fn test_weighted_average() {
        let breakdown = compute_wacc(&inputs(), &ModelConfig::default()).unwrap();
        assert!((breakdown.cost_of_debt - 0.05).abs() < 1e-15);
        assert!((breakdown.equity_weight - 0.8).abs() < 1e-15);
        assert!((breakdown.debt_weight - 0.2).abs() < 1e-15);
        // 0.09 * 0.8 + 0.05 * 0.2 * 0.75
        assert!((breakdown.wacc - 0.0795).abs() < 1e-12);
    }

    #[test]
    fn test_overridden_rates() {
        let config = ModelConfig {
            risk_free_rate: 0.04,
            market_return: 0.10,
            ..ModelConfig::default()
        };
        let breakdown = compute_wacc(&inputs(), &config).unwrap();
        assert!((breakdown.cost_of_equity - 0.112).abs() < 1e-12);
    }

    #[test]
    fn test_zero_debt() {
        let inputs = WaccInputs {
            total_debt: 0.0,
            ..inputs()
        };
        assert!(matches!(
            compute_wacc(&inputs, &ModelConfig::default()).unwrap_err(),
            DcfError::ZeroDebt
        ));
    }

    #[test]
    fn test_inputs_from_snapshot() {
        let snapshot = sample_snapshot();
        let history = aggregate(&snapshot, 3).unwrap();
        let inputs = WaccInputs::from_snapshot(&snapshot, &history).unwrap();
        assert_eq!(inputs.beta, 1.2);
        assert_eq!(inputs.interest_expense, 20.0);
        assert_eq!(inputs.total_debt, 400.0);
        assert_eq!(inputs.market_cap, 8000.0);
        assert_eq!(inputs.tax_rate, 0.21);
    }

    #[test]
    fn test_missing_beta_or_market_cap() {
        let mut snapshot = sample_snapshot();
        let history = aggregate(&snapshot, 3).unwrap();

        snapshot.profile.beta = None;
        match WaccInputs::from_snapshot(&snapshot, &history).unwrap_err() {
            DcfError::MissingMarketData { field } => assert_eq!(field, "beta"),
            other => panic!("unexpected error: {:?}", other),
        }

        snapshot.profile.beta = Some(1.0);
        snapshot.profile.market_cap = None;
        assert!(matches!(
            WaccInputs::from_snapshot(&snapshot, &history).unwrap_err(),
            DcfError::MissingMarketData { .. }
        ));
    }
}
