use crate::domain::scenario::Scenario;
use crate::utils::error::{DcfError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    IncomeStatement,
    CashFlow,
    BalanceSheet,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::IncomeStatement => "income statement",
            StatementKind::CashFlow => "cash flow statement",
            StatementKind::BalanceSheet => "balance sheet",
        };
        f.write_str(name)
    }
}

/// Statement rows the valuation model reads, plus the derived free cash flow row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineItem {
    TotalRevenue,
    OperatingExpense,
    ReconciledDepreciation,
    InterestExpense,
    TaxRateForCalcs,
    OperatingCashFlow,
    CapitalExpenditure,
    WorkingCapital,
    TotalDebt,
    NetDebt,
    FreeCashFlow,
}

impl LineItem {
    pub const INCOME_STATEMENT: [LineItem; 5] = [
        LineItem::TotalRevenue,
        LineItem::OperatingExpense,
        LineItem::ReconciledDepreciation,
        LineItem::InterestExpense,
        LineItem::TaxRateForCalcs,
    ];

    pub const CASH_FLOW: [LineItem; 2] = [LineItem::OperatingCashFlow, LineItem::CapitalExpenditure];

    pub const BALANCE_SHEET: [LineItem; 3] = [
        LineItem::WorkingCapital,
        LineItem::TotalDebt,
        LineItem::NetDebt,
    ];

    /// Row label as it appears in the source statement.
    pub fn label(&self) -> &'static str {
        match self {
            LineItem::TotalRevenue => "Total Revenue",
            LineItem::OperatingExpense => "Operating Expense",
            LineItem::ReconciledDepreciation => "Reconciled Depreciation",
            LineItem::InterestExpense => "Interest Expense",
            LineItem::TaxRateForCalcs => "Tax Rate For Calcs",
            LineItem::OperatingCashFlow => "Operating Cash Flow",
            LineItem::CapitalExpenditure => "Capital Expenditure",
            LineItem::WorkingCapital => "Working Capital",
            LineItem::TotalDebt => "Total Debt",
            LineItem::NetDebt => "Net Debt",
            LineItem::FreeCashFlow => "FCF",
        }
    }

    /// Statement the item is read from. `None` for derived rows.
    pub fn statement(&self) -> Option<StatementKind> {
        match self {
            LineItem::TotalRevenue
            | LineItem::OperatingExpense
            | LineItem::ReconciledDepreciation
            | LineItem::InterestExpense
            | LineItem::TaxRateForCalcs => Some(StatementKind::IncomeStatement),
            LineItem::OperatingCashFlow | LineItem::CapitalExpenditure => Some(StatementKind::CashFlow),
            LineItem::WorkingCapital | LineItem::TotalDebt | LineItem::NetDebt => {
                Some(StatementKind::BalanceSheet)
            }
            LineItem::FreeCashFlow => None,
        }
    }

    /// Rows read only by the discount rate and equity bridge, never by the projection.
    pub fn is_valuation_only(&self) -> bool {
        matches!(
            self,
            LineItem::InterestExpense | LineItem::TotalDebt | LineItem::NetDebt
        )
    }

    pub fn required_for(kind: StatementKind) -> &'static [LineItem] {
        match kind {
            StatementKind::IncomeStatement => &Self::INCOME_STATEMENT,
            StatementKind::CashFlow => &Self::CASH_FLOW,
            StatementKind::BalanceSheet => &Self::BALANCE_SHEET,
        }
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single financial statement with reporting periods as columns, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    periods: Vec<NaiveDate>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
}

impl StatementTable {
    /// Periods are sorted newest first regardless of input order.
    pub fn new(mut periods: Vec<NaiveDate>) -> Self {
        periods.sort_by(|a, b| b.cmp(a));
        periods.dedup();
        Self {
            periods,
            rows: BTreeMap::new(),
        }
    }

    pub fn insert_row(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let label = label.into();
        if values.len() != self.periods.len() {
            return Err(DcfError::ProviderError {
                message: format!(
                    "row '{}' has {} values but the statement has {} periods",
                    label,
                    values.len(),
                    self.periods.len()
                ),
            });
        }
        self.rows.insert(label, values);
        Ok(())
    }

    pub fn with_row(mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Result<Self> {
        self.insert_row(label, values)?;
        Ok(self)
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn row(&self, label: &str) -> Option<&[Option<f64>]> {
        self.rows.get(label).map(Vec::as_slice)
    }

    pub fn value(&self, label: &str, period_index: usize) -> Option<f64> {
        self.row(label)
            .and_then(|values| values.get(period_index).copied().flatten())
            .filter(|v| v.is_finite())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Read-only typed access to one of the three statements.
pub trait StatementView {
    const KIND: StatementKind;

    fn table(&self) -> &StatementTable;
}

macro_rules! statement_view {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub StatementTable);

        impl StatementView for $name {
            const KIND: StatementKind = $kind;

            fn table(&self) -> &StatementTable {
                &self.0
            }
        }
    };
}

statement_view!(IncomeStatement, StatementKind::IncomeStatement);
statement_view!(CashFlowStatement, StatementKind::CashFlow);
statement_view!(BalanceSheet, StatementKind::BalanceSheet);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
}

/// Everything the valuation reads about one company, fetched once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub ticker: String,
    pub income_statement: IncomeStatement,
    pub cash_flow: CashFlowStatement,
    pub balance_sheet: BalanceSheet,
    pub profile: CompanyProfile,
}

impl CompanySnapshot {
    /// Reported revenue across every available period, newest first, gaps skipped.
    pub fn revenue_history(&self) -> Vec<f64> {
        let table = self.income_statement.table();
        (0..table.periods().len())
            .filter_map(|i| table.value(LineItem::TotalRevenue.label(), i))
            .collect()
    }
}

/// Required line items for the selected periods, merged from the three statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialTable {
    periods: Vec<NaiveDate>,
    rows: BTreeMap<LineItem, Vec<f64>>,
}

impl FinancialTable {
    pub(crate) fn new(periods: Vec<NaiveDate>) -> Self {
        Self {
            periods,
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, item: LineItem, values: Vec<f64>) {
        self.rows.insert(item, values);
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn row(&self, item: LineItem) -> Result<&[f64]> {
        self.rows
            .get(&item)
            .map(Vec::as_slice)
            .ok_or_else(|| DcfError::MissingLineItem {
                item: item.label().to_string(),
                statement: item
                    .statement()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "derived rows".to_string()),
            })
    }

    pub fn most_recent(&self, item: LineItem) -> Result<f64> {
        self.edge_value(item, true)
    }

    pub fn oldest(&self, item: LineItem) -> Result<f64> {
        self.edge_value(item, false)
    }

    fn edge_value(&self, item: LineItem, newest: bool) -> Result<f64> {
        let row = self.row(item)?;
        let value = if newest { row.first() } else { row.last() };
        value.copied().ok_or_else(|| DcfError::InsufficientHistory {
            message: format!("no periods available for {}", item),
        })
    }

    pub fn items(&self) -> impl Iterator<Item = (&LineItem, &Vec<f64>)> {
        self.rows.iter()
    }
}

/// Historical means of line items relative to revenue, held fixed for every projected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioConstants {
    pub opex_to_revenue: f64,
    pub working_capital_to_revenue: f64,
    pub capex_to_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    pub year: u32,
    pub revenue: f64,
    pub operating_expense: f64,
    pub working_capital: f64,
    pub change_in_working_capital: f64,
    pub capital_expenditure: f64,
    pub depreciation: f64,
    pub ebit: f64,
    pub free_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSchedule {
    pub multiplier: f64,
    pub tax_rate: f64,
    pub ratios: RatioConstants,
    pub years: Vec<ProjectedYear>,
}

impl ProjectionSchedule {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn revenues(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.revenue).collect()
    }

    pub fn free_cash_flows(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.free_cash_flow).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaccBreakdown {
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub tax_rate: f64,
    pub wacc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub wacc: WaccBreakdown,
    pub terminal_growth_rate: f64,
    pub present_values: Vec<f64>,
    pub terminal_value: f64,
    pub present_terminal_value: f64,
    pub enterprise_value: f64,
    pub net_debt: f64,
    pub equity_value: f64,
    pub shares_outstanding: f64,
    pub price_per_share: f64,
}

/// Growth multipliers per scenario, expressed as `1 + (-growth)` over a newest-first series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRates {
    pub mean_growth: f64,
    pub std_dev: f64,
    pub base: f64,
    pub bull: f64,
    pub bear: f64,
}

impl GrowthRates {
    pub fn multiplier(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Base => self.base,
            Scenario::Bull => self.bull,
            Scenario::Bear => self.bear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Valuation,
    ProjectionOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub ticker: String,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub scenario: Scenario,
    pub years: u32,
    pub generated_at: DateTime<Utc>,
    pub growth: GrowthRates,
    pub projection: ProjectionSchedule,
    pub valuation: Option<Valuation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
    }

    #[test]
    fn test_statement_periods_sorted_newest_first() {
        let table = StatementTable::new(vec![date(2021), date(2023), date(2022)]);
        assert_eq!(table.periods(), &[date(2023), date(2022), date(2021)]);
    }

    #[test]
    fn test_insert_row_rejects_length_mismatch() {
        let mut table = StatementTable::new(vec![date(2023), date(2022)]);
        assert!(table.insert_row("Total Revenue", vec![Some(1.0)]).is_err());
        assert!(table.insert_row("Total Revenue", vec![Some(1.0), None]).is_ok());
        assert_eq!(table.value("Total Revenue", 0), Some(1.0));
        assert_eq!(table.value("Total Revenue", 1), None);
    }

    #[test]
    fn test_revenue_history_skips_gaps() {
        let income = StatementTable::new(vec![date(2023), date(2022), date(2021)])
            .with_row("Total Revenue", vec![Some(300.0), None, Some(100.0)])
            .unwrap();
        let snapshot = CompanySnapshot {
            ticker: "TEST".to_string(),
            income_statement: IncomeStatement(income),
            cash_flow: CashFlowStatement::default(),
            balance_sheet: BalanceSheet::default(),
            profile: CompanyProfile::default(),
        };
        assert_eq!(snapshot.revenue_history(), vec![300.0, 100.0]);
    }

    #[test]
    fn test_every_required_item_maps_back_to_its_statement() {
        for kind in [
            StatementKind::IncomeStatement,
            StatementKind::CashFlow,
            StatementKind::BalanceSheet,
        ] {
            for item in LineItem::required_for(kind) {
                assert_eq!(item.statement(), Some(kind));
            }
        }
        assert_eq!(LineItem::FreeCashFlow.statement(), None);
    }
}
