use crate::domain::model::{Valuation, WaccBreakdown};
use crate::utils::error::{DcfError, Result};

/// Inputs needed to turn a free cash flow schedule into a per-share value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityBridge {
    pub terminal_growth_rate: f64,
    pub net_debt: f64,
    pub shares_outstanding: f64,
}

pub fn present_value(cash_flow: f64, rate: f64, period: u32) -> f64 {
    cash_flow / (1.0 + rate).powi(period as i32)
}

/// Gordon growth terminal value anchored at the final projected cash flow.
pub fn terminal_value(final_cash_flow: f64, wacc: f64, growth: f64) -> Result<f64> {
    if wacc <= growth {
        return Err(DcfError::InvalidDiscountRate { wacc, growth });
    }
    Ok(final_cash_flow * (1.0 + growth) / (wacc - growth))
}

pub fn price_per_share(equity_value: f64, shares_outstanding: f64) -> Result<f64> {
    if shares_outstanding == 0.0 {
        return Err(DcfError::division_by_zero("shares outstanding"));
    }
    Ok(equity_value / shares_outstanding)
}

pub fn value_equity(
    free_cash_flows: &[f64],
    wacc: WaccBreakdown,
    bridge: EquityBridge,
) -> Result<Valuation> {
    let Some(&final_cash_flow) = free_cash_flows.last() else {
        return Err(DcfError::invalid_input(
            "years",
            "must be a positive integer, the projection schedule is empty",
        ));
    };
    let rate = wacc.wacc;
    let growth = bridge.terminal_growth_rate;

    let terminal_value = terminal_value(final_cash_flow, rate, growth)?;
    let present_values: Vec<f64> = free_cash_flows
        .iter()
        .enumerate()
        .map(|(i, fcf)| present_value(*fcf, rate, i as u32 + 1))
        .collect();
    let present_terminal_value = present_value(terminal_value, rate, free_cash_flows.len() as u32);

    let enterprise_value = present_values.iter().sum::<f64>() + present_terminal_value;
    let equity_value = enterprise_value - bridge.net_debt;
    let price_per_share = price_per_share(equity_value, bridge.shares_outstanding)?;

    Ok(Valuation {
        wacc,
        terminal_growth_rate: growth,
        present_values,
        terminal_value,
        present_terminal_value,
        enterprise_value,
        net_debt: bridge.net_debt,
        equity_value,
        shares_outstanding: bridge.shares_outstanding,
        price_per_share,
    })
}
