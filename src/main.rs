use clap::Parser;
use sg_checkup::utils::{logger, validation::Validate};
use sg_checkup::{run_checkup, CheckupError, CliConfig, ConfigProvider, Status, TomlConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    match &cli.config {
        Some(path) => {
            let config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    logger::init_cli_logger(cli.verbose);
                    fail(&e);
                }
            };
            init_logging(cli.verbose || config.verbose(), cli.log_json || config.json_logs());
            tracing::info!("Loaded configuration from {}", path);
            run(&config).await;
        }
        None => {
            init_logging(cli.verbose, cli.log_json);
            if cli.verbose {
                tracing::debug!("CLI config: {:?}", cli);
            }
            run(&cli).await;
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    if json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
}

async fn run<C: ConfigProvider + Validate>(config: &C) {
    tracing::info!("Starting sg-checkup");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    match run_checkup(config).await {
        Ok(outcome) => {
            let report = &outcome.report;
            println!(
                "✅ Rated {} security groups for account {}: {} red, {} yellow, {} green",
                report.rows.len(),
                report.metadata.account_id,
                report.count(Status::Red),
                report.count(Status::Yellow),
                report.count(Status::Green)
            );
            for path in &outcome.written {
                println!("📁 {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Report generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e);
        }
    }
}

fn fail(e: &CheckupError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
