//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    news_api: CheckResult,
    cache: CheckResult,
    identity: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        news_api: CheckResult::error("Not checked"),
        cache: CheckResult::error("Not checked"),
        identity: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.news_api = check_news_api(config);
        report.cache = check_cache(config);
        report.identity = check_identity(config);
    }

    // Identity is an optional surface; only config and the news API gate the
    // overall status.
    let gating = [&report.config, &report.news_api];
    let has_error = gating.iter().any(|c| c.is_error());
    let all_ok = gating.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_news_api(config: &AppConfig) -> CheckResult {
    match config.api.provider.as_str() {
        "http" => {
            let base_url = config.api.base_url.trim();
            if base_url.is_empty() {
                return CheckResult::error("Provider: http, base_url is empty");
            }
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return CheckResult::warn(format!(
                    "Provider: http, base_url does not look like a URL: {}",
                    base_url
                ));
            }
            CheckResult::ok(format!(
                "Provider: http, base_url: {}, timeout: {}s",
                base_url, config.api.timeout_secs
            ))
        }
        "stub" => CheckResult::ok("Provider: stub (offline fixtures)"),
        other => CheckResult::error(format!("Unknown news provider: {}", other)),
    }
}

fn check_cache(config: &AppConfig) -> CheckResult {
    if config.cache.staleness_window_secs == 0 {
        return CheckResult::warn("staleness_window_secs is 0; every read refetches");
    }
    if config.cache.related_limit == 0 {
        return CheckResult::warn("related_limit is 0; related articles disabled");
    }
    CheckResult::ok(format!(
        "Staleness window: {}s, related limit: {}",
        config.cache.staleness_window_secs, config.cache.related_limit
    ))
}

fn check_identity(config: &AppConfig) -> CheckResult {
    match config.identity.provider.as_str() {
        "cognito" => {
            if config.identity.client_id.trim().is_empty() {
                return CheckResult::warn(
                    "Provider: cognito, client_id not set (auth commands unavailable)",
                );
            }
            CheckResult::ok(format!(
                "Provider: cognito, region: {}, client_id set",
                config.identity.region
            ))
        }
        "stub" => CheckResult::ok("Provider: stub (offline)"),
        other => CheckResult::warn(format!("Unknown identity provider: {}", other)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("newsdesk Doctor Report");
    println!("======================");
    println!();

    print_check("Config", &report.config);
    print_check("News API", &report.news_api);
    print_check("Cache", &report.cache);
    print_check("Identity", &report.identity);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to browse! Try: newsdesk news list");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
