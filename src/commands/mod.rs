//! CLI command implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::tiktok::TikTokFetcher;
use crate::logging::EventLog;
use crate::monitor::{run_check, Scheduler};
use crate::notify::telegram::TelegramChannel;
use crate::notify::NotificationService;
use crate::session::SessionManager;
use crate::state::StateStore;

/// Start the monitoring loop. Returns only when the scheduler decides to
/// exit; every scheduler exit maps to code 0 so the supervisor relaunches
/// restart-path exits and treats shutdowns as clean.
pub fn run() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    println!("{}", crate::LOGO);
    println!("Monitoring @{} with configuration:", config.username);
    for (key, value) in config.display_entries() {
        println!("  {key}: {value}");
    }
    println!();

    let log = EventLog::new(&config.log_file);
    let store = StateStore::load(&config.state_file);
    let notifier = build_notifier(&config)?;
    let mut fetcher = TikTokFetcher::new(&config.username);

    // Initial open failures are startup failures: exit non-zero and let the
    // operator look at the configuration or network.
    fetcher
        .open()
        .context("Failed to open initial fetch session")?;

    let stats = store.stats();
    log.info(&format!(
        "Started monitoring @{} ({} seen, {} logged, last check: {})",
        config.username,
        stats.total_seen,
        stats.total_logged,
        stats
            .last_check
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    ));

    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_handler = stop.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived stop signal, shutting down...");
        stop_for_handler.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let mut scheduler = Scheduler::new(
        fetcher,
        notifier,
        store,
        log,
        config.retry_policy(),
        config.scheduler_config(),
        stop,
    );

    let reason = scheduler.run();
    println!("{}", format!("Monitor stopped: {reason}").yellow());
    Ok(())
}

/// Run a single fetch/diff/record/notify cycle and exit. Useful for smoke
/// testing a deployment without waiting out the interval.
pub fn check() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    let log = EventLog::new(&config.log_file);
    let mut store = StateStore::load(&config.state_file);
    let notifier = build_notifier(&config)?;
    let mut fetcher = TikTokFetcher::new(&config.username);

    let result = run_check(&mut fetcher, &mut store, &notifier, &log);
    fetcher.close();

    let new_items = result.context("Check cycle failed")?;
    if new_items.is_empty() {
        println!("{}", "No new reposts.".dimmed());
    } else {
        println!("{}", format!("{} new repost(s):", new_items.len()).green());
        for item in &new_items {
            println!("  {} ({})", item.url, item.id);
        }
    }
    Ok(())
}

/// Print persisted stats without touching the network.
pub fn status() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let store = StateStore::load(&config.state_file);
    let stats = store.stats();

    println!("{}", format!("@{}", config.username).bold());
    println!("  reposts seen:   {}", stats.total_seen);
    println!("  reposts logged: {}", stats.total_logged);
    println!(
        "  last check:     {}",
        stats
            .last_check
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );
    println!("  state file:     {}", store.path().display());
    Ok(())
}

/// Send a test notification through every enabled channel.
pub fn notify_test() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let notifier = build_notifier(&config)?;

    println!("Testing notification configuration...");
    notifier.send_test();
    Ok(())
}

fn build_notifier(config: &Config) -> Result<NotificationService> {
    let mut service = NotificationService::new(&config.username);

    if !config.notifications_enabled {
        return Ok(service);
    }

    if let Some(telegram) = &config.telegram {
        let channel = TelegramChannel::new(&telegram.bot_token, &telegram.chat_id)?;
        service = service.with_telegram(channel);
    }

    service = service.with_desktop(config.desktop_notifications);
    Ok(service)
}
