//! Bot detection module
//!
//! Identifies link-preview and search crawlers from their User-Agent so that
//! content pages can be answered with pre-rendered HTML instead of the SPA
//! shell.

use once_cell::sync::Lazy;

/// Known crawler signatures, lowercase, matched by substring containment.
///
/// `"bot "` keeps its trailing space: it catches the generic "SomethingBot /1.0"
/// style without matching words that merely contain "bot". `"google"` is
/// deliberately broad and also hits Google-branded browsers.
static BOT_SIGNATURES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Social link previews
        "facebookexternalhit",
        "twitterbot",
        "linkedinbot",
        "slackbot",
        "discordbot",
        "telegrambot",
        "whatsapp",
        "pinterest",
        "opengraph",
        "opengraphbot",
        // Generic
        "bot ",
        "crawler",
        // Embed services
        "embedly",
        "vkshare",
        "quora link preview",
        "redditbot",
        "rogerbot",
        "showyoubot",
        // Search engines
        "google",
        "bingbot",
        "baiduspider",
        "duckduckbot",
    ]
});

/// Bot detector
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BotDetector {
    /// Additional signatures from configuration (already lowercased)
    custom_signatures: Vec<String>,
}

impl BotDetector {
    /// Create a detector with only the built-in signatures
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with extra signatures appended to the built-in list
    pub fn with_signatures<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let custom_signatures = extra
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .filter(|s| !s.trim().is_empty())
            .collect();
        Self { custom_signatures }
    }

    /// Number of active signatures
    pub fn signature_count(&self) -> usize {
        BOT_SIGNATURES.len() + self.custom_signatures.len()
    }

    /// Return the first signature contained in the User-Agent, if any
    pub fn matched_signature(&self, user_agent: &str) -> Option<&str> {
        if user_agent.is_empty() {
            return None;
        }
        let ua_lower = user_agent.to_lowercase();

        if let Some(sig) = BOT_SIGNATURES.iter().find(|sig| ua_lower.contains(**sig)) {
            return Some(sig);
        }

        self.custom_signatures
            .iter()
            .find(|sig| ua_lower.contains(sig.as_str()))
            .map(String::as_str)
    }

    /// Check if a (possibly absent) User-Agent belongs to a known bot
    pub fn is_bot(&self, user_agent: Option<&str>) -> bool {
        user_agent.is_some_and(|ua| self.matched_signature(ua).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_preview_bots() {
        let detector = BotDetector::new();
        assert!(detector.is_bot(Some("facebookexternalhit/1.1")));
        assert!(detector.is_bot(Some("Twitterbot/1.0")));
        assert!(detector.is_bot(Some(
            "Mozilla/5.0 (compatible; Discordbot/2.0; +https://discordapp.com)"
        )));
        assert!(detector.is_bot(Some("WhatsApp/2.23.20.0 A")));
    }

    #[test]
    fn test_search_engine_bots() {
        let detector = BotDetector::new();
        assert!(detector.is_bot(Some(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        )));
        assert!(detector.is_bot(Some(
            "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)"
        )));
        assert!(detector.is_bot(Some("DuckDuckBot/1.1; (+http://duckduckgo.com/duckduckbot.html)")));
    }

    #[test]
    fn test_normal_user_agent() {
        let detector = BotDetector::new();
        assert!(!detector.is_bot(Some(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        )));
        assert!(!detector.is_bot(None));
        assert!(!detector.is_bot(Some("")));
    }

    #[test]
    fn test_generic_bot_needs_trailing_space() {
        let detector = BotDetector::new();
        assert_eq!(detector.matched_signature("SomeBot /1.0"), Some("bot "));
        assert!(!detector.is_bot(Some("Mozilla/5.0 Robotics-Browser/3.0")));
    }

    #[test]
    fn test_google_is_broad() {
        let detector = BotDetector::new();
        assert_eq!(
            detector.matched_signature("Mozilla/5.0 (Linux; Android 14; Google Pixel 8)"),
            Some("google")
        );
    }

    #[test]
    fn test_custom_signatures() {
        let detector = BotDetector::with_signatures(["MastodonPreview", "  "]);
        assert_eq!(detector.signature_count(), BOT_SIGNATURES.len() + 1);
        assert_eq!(
            detector.matched_signature("http.rb/5.1 (Mastodonpreview/4.2)"),
            Some("mastodonpreview")
        );
    }
}
