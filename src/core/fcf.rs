use crate::core::projection::LineItemProjection;
use crate::domain::model::ProjectedYear;

pub fn ebit(revenue: f64, operating_expense: f64) -> f64 {
    revenue - operating_expense
}

/// Unlevered free cash flow. Capex keeps its source sign (outflows are negative), so it is
/// added rather than subtracted.
pub fn free_cash_flow(
    ebit: f64,
    tax_rate: f64,
    depreciation: f64,
    change_in_working_capital: f64,
    capital_expenditure: f64,
) -> f64 {
    ebit * (1.0 - tax_rate) + depreciation - change_in_working_capital + capital_expenditure
}

pub fn derive(items: &LineItemProjection, tax_rate: f64) -> Vec<ProjectedYear> {
    (0..items.revenue.len())
        .map(|i| {
            let ebit = ebit(items.revenue[i], items.operating_expense[i]);
            ProjectedYear {
                year: i as u32 + 1,
                revenue: items.revenue[i],
                operating_expense: items.operating_expense[i],
                working_capital: items.working_capital[i],
                change_in_working_capital: items.change_in_working_capital[i],
                capital_expenditure: items.capital_expenditure[i],
                depreciation: items.depreciation[i],
                ebit,
                free_cash_flow: free_cash_flow(
                    ebit,
                    tax_rate,
                    items.depreciation[i],
                    items.change_in_working_capital[i],
                    items.capital_expenditure[i],
                ),
            }
        })
        .collect()
}
