//! Human-facing notifications for newly detected reposts.
//!
//! Delivery is best-effort and fire-and-forget: every channel catches and
//! logs its own failures, nothing propagates to the monitoring loop, and
//! there are no delivery retries.

pub mod desktop;
pub mod telegram;

use crate::models::Item;
use crate::notify::telegram::TelegramChannel;

/// Alerting seam consumed by the scheduler. Invoked once per cycle with the
/// confirmed-persisted new items.
pub trait Notifier {
    fn notify(&self, items: &[Item]);
}

/// Fans one notification out to every enabled channel.
pub struct NotificationService {
    username: String,
    telegram: Option<TelegramChannel>,
    desktop: bool,
}

impl NotificationService {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            telegram: None,
            desktop: false,
        }
    }

    pub fn with_telegram(mut self, channel: TelegramChannel) -> Self {
        self.telegram = Some(channel);
        self
    }

    pub fn with_desktop(mut self, enabled: bool) -> Self {
        self.desktop = enabled;
        self
    }

    /// Whether any channel is enabled.
    pub fn is_enabled(&self) -> bool {
        self.telegram.is_some() || self.desktop
    }

    /// Send a test notification to verify channel configuration.
    pub fn send_test(&self) {
        if !self.is_enabled() {
            println!("No notification channels enabled.");
            return;
        }

        let items = vec![Item::new(
            "1234567890",
            "https://www.tiktok.com/@test/video/1234567890",
        )];
        let (title, body) = format_message(&self.username, &items);
        self.deliver(&format!("[test] {title}"), &body);
    }

    fn deliver(&self, title: &str, body: &str) {
        if let Some(telegram) = &self.telegram {
            if let Err(e) = telegram.send(title, body) {
                eprintln!("Failed to send Telegram notification: {e}");
            } else {
                println!("Telegram notification sent");
            }
        }

        if self.desktop {
            desktop::send_desktop_notification(title, body);
        }
    }
}

impl Notifier for NotificationService {
    fn notify(&self, items: &[Item]) {
        if !self.is_enabled() || items.is_empty() {
            return;
        }

        let (title, body) = format_message(&self.username, items);
        self.deliver(&title, &body);
    }
}

/// Build the notification title and body for a batch of new reposts.
pub fn format_message(username: &str, items: &[Item]) -> (String, String) {
    let count = items.len();
    let plural = if count > 1 { "s" } else { "" };

    let title = format!("{count} new TikTok repost{plural} detected");

    let mut lines = vec![format!("Found {count} new repost{plural} from @{username}:"), String::new()];
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, item.url));
    }

    (title, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_single() {
        let items = vec![Item::new("1", "https://www.tiktok.com/@u/video/1")];
        let (title, body) = format_message("u", &items);

        assert_eq!(title, "1 new TikTok repost detected");
        assert!(body.starts_with("Found 1 new repost from @u:"));
        assert!(body.contains("1. https://www.tiktok.com/@u/video/1"));
    }

    #[test]
    fn test_format_message_plural_and_numbered() {
        let items = vec![
            Item::new("1", "https://example/1"),
            Item::new("2", "https://example/2"),
        ];
        let (title, body) = format_message("u", &items);

        assert_eq!(title, "2 new TikTok reposts detected");
        assert!(body.contains("1. https://example/1"));
        assert!(body.contains("2. https://example/2"));
    }

    #[test]
    fn test_disabled_service_does_nothing() {
        let service = NotificationService::new("u");
        assert!(!service.is_enabled());
        // Must be a silent no-op.
        service.notify(&[Item::new("1", "https://example/1")]);
    }
}
