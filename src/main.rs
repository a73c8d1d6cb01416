use clap::Parser;
use dcf_valuation::app::{self, report};
use dcf_valuation::domain::model::RunMode;
use dcf_valuation::utils::{logger, validation::Validate};
use dcf_valuation::{CliConfig, DcfError};

fn fail(e: &DcfError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Valuation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    let verbose = cli.verbose;

    // 載入配置並套用命令列覆蓋
    let resolved = cli.into_run_config();

    // 初始化日誌 (--log-json 或 [monitoring] json_logs)
    if resolved.as_ref().map(|c| c.json_logs).unwrap_or(false) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting dcf CLI");
    let config = match resolved {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    tracing::debug!("Run config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mode = config.mode;
    match app::run(config).await {
        Ok(outcome) => {
            match mode {
                RunMode::ProjectionOnly => println!("{}", report::render_projection(&outcome.report.projection)),
                RunMode::Valuation => println!("{}", report::render_summary(&outcome.report)),
            }
            for path in &outcome.written {
                println!("📁 Report saved to: {}", path);
            }
        }
        Err(e) => fail(&e),
    }
}
