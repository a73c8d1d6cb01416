use clap::Parser;
use dcf_valuation::adapters::{save_snapshot, LocalStorage, YahooFinanceSource};
use dcf_valuation::app::report::format_thousands;
use dcf_valuation::config::cli::DEFAULT_CONFIG_PATH;
use dcf_valuation::config::toml_config::TomlConfig;
use dcf_valuation::core::aggregator::aggregate;
use dcf_valuation::core::FinancialDataSource;
use dcf_valuation::domain::model::{CompanySnapshot, FinancialTable};
use dcf_valuation::utils::{logger, validation::validate_ticker, validation::Validate};

#[derive(Parser)]
#[command(name = "inspect-snapshot")]
#[command(about = "Fetch a company's statements and show the table the valuation model reads")]
struct Args {
    /// Stock ticker symbol
    ticker: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of most recent periods to aggregate (defaults to the config value)
    #[arg(long)]
    periods: Option<usize>,

    /// Write the fetched snapshot as JSON for later `dcf --snapshot` runs
    #[arg(long)]
    save: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_profile(snapshot: &CompanySnapshot) {
    let profile = &snapshot.profile;
    println!(
        "{} ({})",
        profile.name.as_deref().unwrap_or("<unnamed>"),
        snapshot.ticker
    );
    println!("  currency:           {}", profile.currency.as_deref().unwrap_or("-"));
    println!("  market cap:         {}", profile.market_cap.map(format_thousands).unwrap_or("-".into()));
    println!(
        "  shares outstanding: {}",
        profile.shares_outstanding.map(format_thousands).unwrap_or("-".into())
    );
    println!(
        "  beta:               {}",
        profile.beta.map(|b| format!("{:.3}", b)).unwrap_or("-".into())
    );
}

fn print_table(table: &FinancialTable) {
    let header: Vec<String> = table.periods().iter().map(|p| format!("{:>18}", p.to_string())).collect();
    println!("{:<26}{}", "", header.join(""));
    for (item, values) in table.items() {
        let cells: Vec<String> = values
            .iter()
            .map(|v| format!("{:>18}", format_thousands(*v)))
            .collect();
        println!("{:<26}{}", item.label(), cells.join(""));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let ticker = validate_ticker(&args.ticker)?;
    let config = match &args.config {
        Some(path) => TomlConfig::load_or_default(path, true)?,
        None => TomlConfig::load_or_default(DEFAULT_CONFIG_PATH, false)?,
    };
    config.validate()?;

    tracing::info!("📥 Fetching statements for {} from {}", ticker, config.source.endpoint);
    let source = YahooFinanceSource::new(&config.source)?;
    let snapshot = source.fetch_snapshot(&ticker).await?;

    if let Some(path) = &args.save {
        save_snapshot(&LocalStorage::new("."), path, &snapshot).await?;
        println!("📁 Snapshot saved to: {}", path);
    }

    print_profile(&snapshot);
    println!();

    let periods = args.periods.unwrap_or(config.model.history_periods);
    match aggregate(&snapshot, periods) {
        Ok(table) => print_table(&table),
        Err(e) => {
            // 快照仍可保存，只是無法組成估值所需的表
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
