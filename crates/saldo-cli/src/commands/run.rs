use crate::sync::{self, SyncOutcome};
use anyhow::{anyhow, Context, Result};
use console::style;
use saldo_browser::{extract, with_authenticated_page, SessionConfig};
use saldo_core::{CredentialResolver, ExtractionResult, Journal, Observation};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Account page the balance is read from
    #[arg(long, env = "SALDO_URL", value_name = "URL")]
    pub url: String,

    /// JSON file holding the raw session cookie ({"cookie": "..."})
    #[arg(long, default_value = "cookie.json", value_name = "FILE")]
    pub cookie_file: PathBuf,

    /// Environment variable consulted when the cookie file yields nothing
    #[arg(long, default_value = "SALDO_COOKIE", value_name = "VAR")]
    pub cookie_env: String,

    /// Journal file that receives the observation
    #[arg(long, default_value = "BALANCE.md", value_name = "FILE")]
    pub journal: PathBuf,

    /// Explicit Chrome/Chromium binary
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,

    /// Skip the git publish step
    #[arg(long)]
    pub no_sync: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let domain = host_of(&args.url)?;

    // Credential resolution is the pre-flight check: it must succeed before
    // any browser resource is allocated.
    let resolver = CredentialResolver::new(&args.cookie_file, &args.cookie_env);
    let credential = resolver.resolve(&domain)?;
    println!(
        "🔐 Session cookie resolved ({} pair(s), domain {})",
        credential.pairs().len(),
        domain
    );

    let config = SessionConfig {
        chrome_path: args.chrome_path.clone(),
        headless: !args.headful,
        ..SessionConfig::default()
    };

    println!("🚀 Launching browser...");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(with_authenticated_page(
        &config,
        &credential,
        &args.url,
        |page| async move { extract(&page).await },
    ))?;

    report(&result);

    let observation = Observation::now(result);
    let journal = Journal::new(&args.journal);
    journal
        .record(&observation)
        .with_context(|| format!("failed to update journal {}", args.journal.display()))?;
    println!(
        "📝 Recorded observation at {} in {}",
        observation.timestamp(),
        args.journal.display()
    );

    if args.no_sync {
        return Ok(());
    }

    match sync::publish(&args.journal, &observation) {
        SyncOutcome::Success => println!("☁️ Journal published to remote"),
        SyncOutcome::SkippedNoChange => println!("☁️ Nothing new to publish"),
        SyncOutcome::Failed(reason) => {
            // Best-effort by contract: the local journal write already
            // succeeded and is the durable source of truth.
            tracing::warn!("publish failed: {reason}");
            println!(
                "{} publish failed (journal saved locally): {reason}",
                style("⚠").yellow()
            );
        }
    }

    Ok(())
}

fn report(result: &ExtractionResult) {
    match result {
        ExtractionResult::StructuredBalance { amount, source } => println!(
            "💰 Balance: {} (from {})",
            style(amount).green().bold(),
            source
        ),
        ExtractionResult::RawContentSample { text } => println!(
            "📄 No structured balance; captured {} chars of page text",
            text.chars().count()
        ),
        ExtractionResult::Empty => {
            println!("{} Page yielded no text at all", style("∅").red())
        }
    }
}

fn host_of(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("URL has no host: {url}"))
}
