use crate::domain::model::{CompanySnapshot, FinancialTable, IncomeStatement, LineItem, StatementView};
use crate::utils::error::{DcfError, Result};
use chrono::NaiveDate;

/// Merges the required rows of the three statements over the `periods` most recent reporting
/// periods and derives the free cash flow proxy row.
///
/// The income statement dates select the columns; the other statements are looked up by date.
/// Rows only the valuation reads are carried when complete and left out otherwise, so a
/// projection never fails on them.
pub fn aggregate(snapshot: &CompanySnapshot, periods: usize) -> Result<FinancialTable> {
    let income = &snapshot.income_statement;
    if income.table().is_empty() {
        return Err(DcfError::InsufficientHistory {
            message: format!("{} has no reporting periods", IncomeStatement::KIND),
        });
    }

    let selected = periods.min(income.table().periods().len());
    let dates = income.table().periods()[..selected].to_vec();
    let mut table = FinancialTable::new(dates.clone());

    collect_rows(&mut table, income, &dates)?;
    collect_rows(&mut table, &snapshot.cash_flow, &dates)?;
    collect_rows(&mut table, &snapshot.balance_sheet, &dates)?;

    let free_cash_flow: Vec<f64> = table
        .row(LineItem::OperatingCashFlow)?
        .iter()
        .zip(table.row(LineItem::CapitalExpenditure)?)
        .map(|(ocf, capex)| ocf + capex)
        .collect();
    table.insert(LineItem::FreeCashFlow, free_cash_flow);

    Ok(table)
}

fn collect_rows<V: StatementView>(table: &mut FinancialTable, view: &V, dates: &[NaiveDate]) -> Result<()> {
    for item in LineItem::required_for(V::KIND) {
        match row_by_date(view, *item, dates) {
            Ok(values) => table.insert(*item, values),
            Err(_) if item.is_valuation_only() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn row_by_date<V: StatementView>(view: &V, item: LineItem, dates: &[NaiveDate]) -> Result<Vec<f64>> {
    let source = view.table();
    let missing = || DcfError::MissingLineItem {
        item: item.label().to_string(),
        statement: V::KIND.to_string(),
    };

    source.row(item.label()).ok_or_else(missing)?;
    dates
        .iter()
        .map(|date| {
            let column = source.periods().iter().position(|p| p == date).ok_or_else(missing)?;
            source.value(item.label(), column).ok_or_else(missing)
        })
        .collect()
}
