//! Report rendering: console text, the JSON report and the CSV projection schedule.

use crate::domain::model::{ProjectionSchedule, ValuationReport};
use crate::utils::error::{DcfError, Result};
use std::fmt::Write;

pub fn valuation_file_name(ticker: &str) -> String {
    format!("{}_valuation.json", ticker.to_lowercase())
}

pub fn projection_file_name(ticker: &str) -> String {
    format!("{}_projection.csv", ticker.to_lowercase())
}

pub fn to_json(report: &ValuationReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// One row per projected year, header row included.
pub fn schedule_csv(schedule: &ProjectionSchedule) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for year in &schedule.years {
        writer.serialize(year)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| DcfError::IoError(e.into_error()))
}

/// Truncates toward zero and groups digits by thousands: `-1234567.8` -> `-1,234,567`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let whole = value.trunc();
    let digits = format!("{:.0}", whole.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if whole < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `Year i: <revenue>` lines for the projection-only mode.
pub fn render_projection(schedule: &ProjectionSchedule) -> String {
    schedule
        .years
        .iter()
        .map(|y| format!("Year {}: {}", y.year, format_thousands(y.revenue)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_summary(report: &ValuationReport) -> String {
    let mut out = String::new();
    let name = report.company_name.as_deref().unwrap_or(&report.ticker);
    let currency = report.currency.as_deref().unwrap_or("");

    // write! 到 String 不會失敗
    let _ = writeln!(out, "{} ({}), {} case, {} year(s)", name, report.ticker, report.scenario, report.years);
    let _ = writeln!(
        out,
        "Revenue growth: mean {:.2}%, std dev {:.2}%, multiplier {:.4}",
        report.growth.mean_growth * 100.0,
        report.growth.std_dev * 100.0,
        report.projection.multiplier
    );
    out.push_str(&render_projection(&report.projection));

    if let Some(valuation) = &report.valuation {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "WACC: {:.2}% (cost of equity {:.2}%, cost of debt {:.2}%)",
            valuation.wacc.wacc * 100.0,
            valuation.wacc.cost_of_equity * 100.0,
            valuation.wacc.cost_of_debt * 100.0
        );
        let _ = writeln!(out, "Terminal value: {}", format_thousands(valuation.terminal_value));
        let _ = writeln!(out, "Enterprise value: {}", format_thousands(valuation.enterprise_value));
        let _ = writeln!(out, "Net debt: {}", format_thousands(valuation.net_debt));
        let _ = writeln!(out, "Equity value: {}", format_thousands(valuation.equity_value));
        let _ = write!(
            out,
            "Estimated price per share: {:.2} {}",
            valuation.price_per_share, currency
        );
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ProjectedYear, RatioConstants};

    fn schedule() -> ProjectionSchedule {
        let year = |year: u32, revenue: f64| ProjectedYear {
            year,
            revenue,
            operating_expense: revenue * 0.3,
            working_capital: revenue * 0.2,
            change_in_working_capital: 10.0,
            capital_expenditure: -revenue * 0.1,
            depreciation: 50.0,
            ebit: revenue * 0.7 - 50.0,
            free_cash_flow: 400.0,
        };
        ProjectionSchedule {
            multiplier: 1.1,
            tax_rate: 0.21,
            ratios: RatioConstants {
                opex_to_revenue: 0.3,
                working_capital_to_revenue: 0.2,
                capex_to_revenue: -0.1,
            },
            years: vec![year(1, 1100.0), year(2, 1210.0)],
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.9), "999");
        assert_eq!(format_thousands(1234.7), "1,234");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(383_285_000_000.0), "383,285,000,000");
        assert_eq!(format_thousands(-1_234_567.8), "-1,234,567");
        assert_eq!(format_thousands(-0.6), "0");
    }

    #[test]
    fn test_render_projection() {
        assert_eq!(render_projection(&schedule()), "Year 1: 1,100\nYear 2: 1,210");

        let mut fractional = schedule();
        fractional.years[0].revenue = 1331.99;
        assert!(render_projection(&fractional).starts_with("Year 1: 1,331\n"));
    }

    #[test]
    fn test_schedule_csv() {
        let csv = String::from_utf8(schedule_csv(&schedule()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("year,revenue,operating_expense,working_capital,change_in_working_capital,capital_expenditure,depreciation,ebit,free_cash_flow")
        );
        assert!(lines.next().unwrap().starts_with("1,1100.0,"));
        assert!(lines.next().unwrap().starts_with("2,1210.0,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(valuation_file_name("AAPL"), "aapl_valuation.json");
        assert_eq!(projection_file_name("BRK-B"), "brk-b_projection.csv");
    }
}
