use clap::Parser;
use storage_locations::config::Command;
use storage_locations::utils::error::ErrorSeverity;
use storage_locations::utils::{logger, validation::Validate};
use storage_locations::{
    CliConfig, LocationValidator, LocationsConfig, StorageError, StorageLocation,
    StorageLocationType,
};

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &StorageError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()));
}

async fn validate(
    config: &LocationsConfig,
    id: Option<&str>,
    location_type: Option<StorageLocationType>,
) -> Result<(), StorageError> {
    let locations: Vec<&StorageLocation> = match id {
        Some(id) => vec![config.find(id)?],
        None => config.locations_of_type(location_type).collect(),
    };

    if locations.is_empty() {
        tracing::warn!("⚠️ No storage locations matched the filter");
        return Ok(());
    }

    let summary = LocationValidator::new(locations).run().await;

    for report in &summary.reports {
        let label = format!(
            "{} [{}/{}] ({})",
            report.id, report.kind, report.location_type, report.uri
        );
        match &report.result {
            Ok(()) => println!("✅ {} {:?}", label, report.elapsed),
            Err(e) => println!("❌ {}: {}", label, e),
        }
    }

    // 以最嚴重的錯誤決定退出碼
    if let Some(worst) = summary
        .failed()
        .filter_map(|r| r.result.as_ref().err())
        .max_by_key(|e| e.severity())
    {
        eprintln!("💡 {}", worst.recovery_suggestion());
        std::process::exit(exit_code(worst.severity()));
    }

    Ok(())
}

async fn list(
    config: &LocationsConfig,
    id: &str,
    path: &str,
    deep: bool,
) -> Result<(), StorageError> {
    let adapter = config.find(id)?.adapter()?;
    let storage = adapter.storage_adapter().await?;

    for entry in storage.list_contents(path, deep).await? {
        match entry.size {
            Some(size) => println!("{}\t{}", size, entry.path),
            None => println!("-\t{}/", entry.path),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading storage locations from: {}", args.config);

    let config = match LocationsConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let result = match &args.command {
        Command::Validate { id, location_type } => {
            validate(&config, id.as_deref(), *location_type).await
        }
        Command::Uri { id, suffix } => config.find(id).map(|location| {
            println!("{}", location.uri(suffix.as_deref()));
        }),
        Command::List { id, path, deep } => list(&config, id, path, *deep).await,
    };

    if let Err(e) = result {
        fail(&e);
    }
}
