use anyhow::Context;
use clap::Parser;
use domain_monitor::utils::error::{ErrorSeverity, MonitorError};
use domain_monitor::utils::{logger, validation::Validate};
use domain_monitor::{
    ChangeNotifier, CommandWhoisLookup, DomainMonitor, FileStateStore, HttpProbe, MonitorConfig,
    SmtpMailer, WhoisProbe,
};

#[derive(Parser, Debug)]
#[command(name = "domain-monitor")]
#[command(about = "Alert by email when a domain's WHOIS Updated Date or HTTP status changes")]
struct Args {
    /// Path to TOML configuration file (falls back to DOMAIN_MONITOR_* variables when absent)
    #[arg(short, long, default_value = "domain-monitor.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Probe and show the alert that would be sent, without sending or saving state
    #[arg(long)]
    dry_run: bool,

    /// Print the persisted state and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_state: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

fn exit_code(e: &MonitorError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &MonitorError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入配置（日誌尚未初始化，直接輸出到 stderr）
    let config = match MonitorConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose, &config.logging.level);
    } else {
        logger::init_cli_logger(args.verbose, &config.logging.level);
    }
    tracing::debug!("Configuration: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = FileStateStore::new(&config.state.path);

    if args.show_state {
        let record = match store.read_record().await {
            Ok(record) => record,
            Err(e) => fail(&e),
        };
        match record {
            Some(record) if args.json => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Some(record) => {
                println!("📁 {}", store.path().display());
                println!(
                    "Whois Updated Date: {}",
                    record.whois_updated_date.as_deref().unwrap_or("unknown")
                );
                println!("HTTP status:        {}", record.http_status);
                println!("Recorded at:        {}", record.recorded_at);
            }
            None => println!("No state recorded at {}", store.path().display()),
        }
        return Ok(());
    }

    let http = match HttpProbe::from_config(&config) {
        Ok(http) => http,
        Err(e) => fail(&e),
    };
    let mailer = match SmtpMailer::from_config(&config) {
        Ok(mailer) => mailer,
        Err(e) => fail(&e),
    };
    let monitor = DomainMonitor::new(
        config.domain.name.clone(),
        WhoisProbe::new(
            CommandWhoisLookup::from_config(&config),
            config.whois.normalize_dates,
        ),
        http,
        ChangeNotifier::new(store, mailer),
    );

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no email is sent and no state is written");
        let (snapshot, alert) = match monitor.dry_run().await {
            Ok(result) => result,
            Err(e) => fail(&e),
        };
        if args.json {
            let preview = serde_json::json!({
                "domain": monitor.domain(),
                "snapshot": snapshot,
                "alert": alert,
            });
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            match alert {
                Some(alert) => {
                    println!("Subject: {}\n", alert.subject);
                    println!("{}", alert.body);
                }
                None => println!("No change for {}", monitor.domain()),
            }
        }
        return Ok(());
    }

    let report = match monitor.run().await {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to render run report")?;
        println!("{}", json);
    }

    Ok(())
}
