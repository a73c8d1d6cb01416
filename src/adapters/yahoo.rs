use crate::config::toml_config::SourceConfig;
use crate::core::{CompanySnapshot, FinancialDataSource};
use crate::domain::model::{
    BalanceSheet, CashFlowStatement, CompanyProfile, IncomeStatement, LineItem, StatementKind,
    StatementTable,
};
use crate::utils::error::{DcfError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Earliest timestamp requested from the fundamentals endpoint (1985-08-22).
const HISTORY_START: i64 = 493_590_046;
const PROFILE_MODULES: &str = "defaultKeyStatistics,summaryDetail,price";

/// Annual statements and market attributes from Yahoo Finance.
pub struct YahooFinanceSource {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
struct TimeseriesBody {
    #[serde(default)]
    result: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    as_of_date: NaiveDate,
    #[serde(default)]
    reported_value: RawValue,
}

#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    #[serde(default)]
    market_cap: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    currency: Option<String>,
    #[serde(default)]
    market_cap: RawValue,
    #[serde(default)]
    beta: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    shares_outstanding: RawValue,
    #[serde(default)]
    beta: RawValue,
}

/// Timeseries type name for a statement row, e.g. `annualTotalRevenue`.
fn series_key(item: LineItem) -> String {
    format!("annual{}", item.label().replace(' ', ""))
}

fn reported_items() -> impl Iterator<Item = LineItem> {
    LineItem::INCOME_STATEMENT
        .into_iter()
        .chain(LineItem::CASH_FLOW)
        .chain(LineItem::BALANCE_SHEET)
}

impl YahooFinanceSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            headers: config.headers.clone().unwrap_or_default(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ticker: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let mut request = self.client.get(url).query(query);

        // 添加自定義 headers (cookie / crumb)
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        match status {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(DcfError::InvalidTicker {
                ticker: ticker.to_string(),
                reason: "symbol not found by the data provider".to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DcfError::ProviderError {
                message: format!(
                    "{} rejected the request with HTTP {}; set cookie/crumb headers under [source.headers]",
                    url, status
                ),
            }),
            _ => Err(DcfError::ProviderError {
                message: format!("{} returned HTTP {}", url, status),
            }),
        }
    }

    /// Fetches the three annual statements in one fundamentals request.
    pub async fn fetch_statements(
        &self,
        ticker: &str,
    ) -> Result<(IncomeStatement, CashFlowStatement, BalanceSheet)> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.endpoint, ticker
        );
        let types = reported_items().map(series_key).collect::<Vec<_>>().join(",");
        let query = [
            ("symbol", ticker.to_string()),
            ("type", types),
            ("period1", HISTORY_START.to_string()),
            ("period2", Utc::now().timestamp().to_string()),
        ];

        let response: TimeseriesResponse = self.get_json(ticker, &url, &query).await?;
        if let Some(error) = response.timeseries.error.filter(|e| !e.is_null()) {
            return Err(DcfError::ProviderError {
                message: format!("timeseries error for {}: {}", ticker, error),
            });
        }

        let series = parse_series(response.timeseries.result.unwrap_or_default())?;
        if series.is_empty() {
            return Err(DcfError::InvalidTicker {
                ticker: ticker.to_string(),
                reason: "no financial statements available".to_string(),
            });
        }
        tracing::debug!("Received {} statement series for {}", series.len(), ticker);

        Ok((
            IncomeStatement(build_table(StatementKind::IncomeStatement, &series)?),
            CashFlowStatement(build_table(StatementKind::CashFlow, &series)?),
            BalanceSheet(build_table(StatementKind::BalanceSheet, &series)?),
        ))
    }

    pub async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.endpoint, ticker);
        let query = [("modules", PROFILE_MODULES.to_string())];

        let response: QuoteSummaryResponse = self.get_json(ticker, &url, &query).await?;
        let body = response.quote_summary;
        let result = body
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| DcfError::InvalidTicker {
                ticker: ticker.to_string(),
                reason: match body.error.filter(|e| !e.is_null()) {
                    Some(error) => format!("quote summary unavailable: {}", error),
                    None => "quote summary unavailable".to_string(),
                },
            })?;

        Ok(build_profile(result))
    }
}

#[async_trait]
impl FinancialDataSource for YahooFinanceSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_snapshot(&self, ticker: &str) -> Result<CompanySnapshot> {
        let (statements, profile) =
            tokio::try_join!(self.fetch_statements(ticker), self.fetch_profile(ticker))?;
        let (income_statement, cash_flow, balance_sheet) = statements;

        Ok(CompanySnapshot {
            ticker: ticker.to_string(),
            income_statement,
            cash_flow,
            balance_sheet,
            profile,
        })
    }
}

/// Collects the reported points of each known series. Series without points are skipped.
fn parse_series(results: Vec<serde_json::Value>) -> Result<HashMap<LineItem, Vec<(NaiveDate, f64)>>> {
    let keys: HashMap<String, LineItem> = reported_items().map(|i| (series_key(i), i)).collect();
    let mut series = HashMap::new();

    for result in results {
        let Some(key) = result
            .pointer("/meta/type/0")
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            continue;
        };
        let Some(item) = keys.get(&key) else {
            tracing::debug!("Ignoring unrequested series: {}", key);
            continue;
        };
        let Some(raw_points) = result.get(&key) else {
            continue;
        };

        let points: Vec<Option<DataPoint>> = serde_json::from_value(raw_points.clone())?;
        let points: Vec<(NaiveDate, f64)> = points
            .into_iter()
            .flatten()
            .filter_map(|p| p.reported_value.raw.map(|v| (p.as_of_date, v)))
            .collect();

        if !points.is_empty() {
            series.insert(*item, points);
        }
    }

    Ok(series)
}

fn build_table(
    kind: StatementKind,
    series: &HashMap<LineItem, Vec<(NaiveDate, f64)>>,
) -> Result<StatementTable> {
    let items = LineItem::required_for(kind);
    let periods = items
        .iter()
        .filter_map(|item| series.get(item))
        .flat_map(|points| points.iter().map(|(date, _)| *date))
        .collect();

    let mut table = StatementTable::new(periods);
    let columns = table.periods().to_vec();

    for item in items {
        if let Some(points) = series.get(item) {
            let values = columns
                .iter()
                .map(|period| {
                    points
                        .iter()
                        .find(|(date, _)| date == period)
                        .map(|(_, value)| *value)
                })
                .collect();
            table.insert_row(item.label(), values)?;
        }
    }

    Ok(table)
}

fn build_profile(result: QuoteSummaryResult) -> CompanyProfile {
    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    CompanyProfile {
        name: price.long_name.or(price.short_name),
        currency: price.currency.or(detail.currency),
        market_cap: price.market_cap.raw.or(detail.market_cap.raw),
        shares_outstanding: stats.shares_outstanding.raw,
        beta: detail.beta.raw.or(stats.beta.raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn source_for(server: &MockServer) -> YahooFinanceSource {
        let config = SourceConfig {
            endpoint: server.base_url(),
            timeout_seconds: 5,
            ..SourceConfig::default()
        };
        YahooFinanceSource::new(&config).unwrap()
    }

    fn series(key: &str, points: &[(&str, f64)]) -> serde_json::Value {
        let values: Vec<_> = points
            .iter()
            .map(|(date, value)| {
                json!({
                    "asOfDate": date,
                    "periodType": "12M",
                    "reportedValue": { "raw": value, "fmt": value.to_string() }
                })
            })
            .collect();
        json!({ "meta": { "symbol": ["AAPL"], "type": [key] }, key: values })
    }

    #[test]
    fn test_series_key() {
        assert_eq!(series_key(LineItem::TotalRevenue), "annualTotalRevenue");
        assert_eq!(series_key(LineItem::TaxRateForCalcs), "annualTaxRateForCalcs");
    }

    #[tokio::test]
    async fn test_fetch_statements_builds_tables() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ws/fundamentals-timeseries/v1/finance/timeseries/AAPL")
                .query_param("symbol", "AAPL");
            then.status(200).json_body(json!({
                "timeseries": {
                    "result": [
                        series("annualTotalRevenue", &[("2022-09-30", 394.0), ("2023-09-30", 383.0)]),
                        series("annualCapitalExpenditure", &[("2023-09-30", -11.0)]),
                        series("annualWorkingCapital", &[("2023-09-30", -1.7), ("2022-09-30", -18.5)]),
                        { "meta": { "symbol": ["AAPL"], "type": ["annualNetDebt"] } }
                    ],
                    "error": null
                }
            }));
        });

        let (income, cash_flow, balance) = source_for(&server).fetch_statements("AAPL").await.unwrap();
        mock.assert();

        let table = &income.0;
        assert_eq!(
            table.periods(),
            &[
                NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
                NaiveDate::from_ymd_opt(2022, 9, 30).unwrap()
            ]
        );
        assert_eq!(table.value("Total Revenue", 0), Some(383.0));
        assert_eq!(table.value("Total Revenue", 1), Some(394.0));
        assert!(table.row("Operating Expense").is_none());

        assert_eq!(cash_flow.0.value("Capital Expenditure", 0), Some(-11.0));
        assert_eq!(balance.0.value("Working Capital", 1), Some(-18.5));
        assert!(balance.0.row("Net Debt").is_none());
    }

    #[tokio::test]
    async fn test_empty_timeseries_is_invalid_ticker() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/ws/fundamentals-timeseries/v1/finance/timeseries/ZZZZ");
            then.status(200).json_body(json!({
                "timeseries": {
                    "result": [{ "meta": { "symbol": ["ZZZZ"], "type": ["annualTotalRevenue"] } }],
                    "error": null
                }
            }));
        });

        let err = source_for(&server).fetch_statements("ZZZZ").await.unwrap_err();
        assert!(matches!(err, DcfError::InvalidTicker { .. }));
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/AAPL")
                .query_param("modules", PROFILE_MODULES);
            then.status(200).json_body(json!({
                "quoteSummary": {
                    "result": [{
                        "price": {
                            "longName": "Apple Inc.",
                            "currency": "USD",
                            "marketCap": { "raw": 2.9e12, "fmt": "2.9T" }
                        },
                        "summaryDetail": { "beta": { "raw": 1.29, "fmt": "1.29" } },
                        "defaultKeyStatistics": {
                            "sharesOutstanding": { "raw": 1.55e10, "fmt": "15.5B" },
                            "beta": {}
                        }
                    }],
                    "error": null
                }
            }));
        });

        let profile = source_for(&server).fetch_profile("AAPL").await.unwrap();
        mock.assert();

        assert_eq!(profile.name.as_deref(), Some("Apple Inc."));
        assert_eq!(profile.currency.as_deref(), Some("USD"));
        assert_eq!(profile.market_cap, Some(2.9e12));
        assert_eq!(profile.shares_outstanding, Some(1.55e10));
        assert_eq!(profile.beta, Some(1.29));
    }

    #[tokio::test]
    async fn test_not_found_is_invalid_ticker() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/NOPE");
            then.status(404).json_body(json!({
                "quoteSummary": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "Quote not found for symbol: NOPE" }
                }
            }));
        });

        let err = source_for(&server).fetch_profile("NOPE").await.unwrap_err();
        assert!(matches!(err, DcfError::InvalidTicker { .. }));
        assert_eq!(err.exit_code(), 10);
    }

    #[tokio::test]
    async fn test_unauthorized_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/AAPL");
            then.status(401).body("Invalid Crumb");
        });

        let err = source_for(&server).fetch_profile("AAPL").await.unwrap_err();
        assert!(matches!(err, DcfError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_configured_headers_are_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/AAPL")
                .header("cookie", "A3=abc");
            then.status(200).json_body(json!({
                "quoteSummary": { "result": [{}], "error": null }
            }));
        });

        let config = SourceConfig {
            endpoint: server.base_url(),
            headers: Some(HashMap::from([("cookie".to_string(), "A3=abc".to_string())])),
            ..SourceConfig::default()
        };
        let profile = YahooFinanceSource::new(&config)
            .unwrap()
            .fetch_profile("AAPL")
            .await
            .unwrap();
        mock.assert();
        assert_eq!(profile, CompanyProfile::default());
    }
}
