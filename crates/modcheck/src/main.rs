//! Modcheck - sort code / account number modulus checker
//!
//! # Usage
//! ```bash
//! modcheck 20-00-00 58177632               # validate one pair
//! modcheck --config modcheck.toml --check  # load rules and report counts
//! modcheck --refresh 200000 58177632       # pull remote tables first
//! modcheck --explain 089999 66374958       # show the rules applied
//! modcheck < pairs.txt                     # one "sort_code account" per line
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use modcheck_config::{ConfigLoader, ModcheckConfig};
use modcheck_core::engine;
use modcheck_refresh::Checker;

/// Modcheck - validate UK sort code and account number pairs
#[derive(Parser, Debug)]
#[command(name = "modcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply if absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load rules, report counts and exit
    #[arg(long)]
    check: bool,

    /// Fetch the remote tables before validating
    #[arg(long)]
    refresh: bool,

    /// Print the rules matching each sort code
    #[arg(long)]
    explain: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(long)]
    log_level: Option<String>,

    /// Sort code, e.g. 20-00-00
    sort_code: Option<String>,

    /// Account number, 6 to 8 digits
    account_number: Option<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::load_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => ConfigLoader::new(),
    };
    let config = loader.get();

    init_logging(args.log_level.as_deref().unwrap_or(&config.log.level));

    tracing::info!("Modcheck v{}", env!("CARGO_PKG_VERSION"));

    let checker = Checker::from_config(&config);

    if args.refresh {
        refresh_once(&checker).await?;
    }

    if args.check {
        report(&checker, &config);
        return Ok(());
    }

    if !checker.ready() {
        tracing::warn!("no weight rules loaded; every well-formed pair will pass");
    }

    let _timer = if config.refresh.enabled {
        checker.start_timer()
    } else {
        None
    };

    match (&args.sort_code, &args.account_number) {
        (Some(sort_code), Some(account_number)) => {
            let line = check_pair(&checker, sort_code, account_number, args.explain);
            println!("{}", line);
        }
        (None, None) => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("Failed to read stdin")?;
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (None, _, _) => continue,
                    (Some(sort_code), Some(account_number), None) => {
                        let verdict = check_pair(&checker, sort_code, account_number, args.explain);
                        println!("{}", verdict);
                    }
                    _ => println!(
                        "{}\terror: expected \"<sort_code> <account_number>\"",
                        line.trim()
                    ),
                }
            }
        }
        _ => anyhow::bail!("both SORT_CODE and ACCOUNT_NUMBER are required"),
    }

    Ok(())
}

/// Run one remote refresh to completion
async fn refresh_once(checker: &Checker) -> Result<()> {
    let scheduler = checker
        .scheduler()
        .context("--refresh needs refresh.weights_url and refresh.substitutions_url")?;

    if let Some(handle) = scheduler.refresh() {
        handle.await.context("refresh task failed")?;
    }

    if let Some(err) = scheduler.status().last_error {
        tracing::warn!("remote refresh failed ({}); using bundled rules", err);
    }
    Ok(())
}

fn check_pair(checker: &Checker, sort_code: &str, account_number: &str, explain: bool) -> String {
    if explain {
        explain_rules(checker, sort_code);
    }

    let verdict = match checker.validate(sort_code, account_number) {
        Ok(true) => "valid".to_string(),
        Ok(false) => "invalid".to_string(),
        Err(err) => format!("error: {}", err),
    };
    format!("{} {}\t{}", sort_code, account_number, verdict)
}

fn explain_rules(checker: &Checker, sort_code: &str) {
    let Some(value) = engine::sort_code_value(sort_code) else {
        return;
    };

    let snapshot = checker.store().current();
    let rules = snapshot.matching(value);
    if rules.is_empty() {
        eprintln!("{}: no rules; passes unchecked", sort_code);
    }
    for rule in rules {
        eprintln!(
            "{}: {:06}-{:06} {} {:?} exception={}",
            sort_code,
            rule.range_start,
            rule.range_end,
            rule.algorithm,
            rule.weights,
            rule.exception.map_or_else(|| "-".to_string(), |e| e.to_string()),
        );
    }
}

fn report(checker: &Checker, config: &ModcheckConfig) {
    let snapshot = checker.store().current();
    println!("weight rules:    {}", snapshot.rule_count());
    println!("substitutions:   {}", snapshot.substitution_count());
    println!("ready:           {}", checker.ready());
    println!(
        "remote refresh:  {}",
        if checker.scheduler().is_some() {
            if config.refresh.enabled {
                "enabled"
            } else {
                "manual only"
            }
        } else {
            "not configured"
        }
    );
    if let Some(last) = checker.refresh_status().and_then(|s| s.last_success) {
        println!("last refreshed:  {}", last.to_rfc3339());
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
