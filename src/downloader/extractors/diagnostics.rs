// Failure diagnostics - classifies extraction and download errors
//
// Analyzes error messages to decide:
// - What went wrong (bot wall, rate limit, timeout, ...)
// - Whether the run must halt to avoid compounding detection risk
// - What to tell the user

/// Classified failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// YouTube's bot wall: sign-in demands, captchas, "unusual traffic".
    /// Continuing only digs the hole deeper, so this halts the run.
    BotDetection,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// Geographic restriction
    GeoBlocked,

    /// Video deleted, private, or otherwise gone
    Unavailable,

    /// Generic/unknown failure
    Unknown,
}

impl FailureKind {
    /// Whether this failure terminates the whole run. Only the bot wall
    /// does; everything else is skip-and-continue.
    pub fn halts_run(&self) -> bool {
        matches!(self, Self::BotDetection)
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::BotDetection => "Bot detection triggered",
            Self::RateLimited => "Rate limited by YouTube",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::GeoBlocked => "Geographic restriction",
            Self::Unavailable => "Video unavailable",
            Self::Unknown => "Unknown failure",
        }
    }

    /// Remediation guidance, shown when a run halts or a channel fetch
    /// fails outright.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::BotDetection => Some(
                "What to try:\n\
                 1) Wait 10-15 minutes before trying again\n\
                 2) Try a smaller or different channel\n\
                 3) Use a VPN to change your IP address\n\
                 4) Point --cookies at a logged-in browser export",
            ),
            Self::RateLimited => Some(
                "What to try:\n\
                 1) Wait 10-15 minutes\n\
                 2) Use a different IP (VPN/proxy)",
            ),
            Self::NetworkTimeout => Some(
                "What to try:\n\
                 1) Check your internet connection\n\
                 2) Use a proxy/VPN\n\
                 3) Try again later",
            ),
            _ => None,
        }
    }
}

/// Classify an error message. Patterns are checked in order of importance:
/// the bot wall first, since it is the one class that must stop the run.
pub fn classify(error: &str) -> FailureKind {
    let lower = error.to_lowercase();

    if lower.contains("sign in")
        || lower.contains("bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
        || lower.contains("automated")
    {
        return FailureKind::BotDetection;
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return FailureKind::RateLimited;
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return FailureKind::NetworkTimeout;
    }

    if lower.contains("not available in your country") || lower.contains("blocked in your country")
    {
        return FailureKind::GeoBlocked;
    }

    if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
    {
        return FailureKind::Unavailable;
    }

    FailureKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_detection() {
        let error = "ERROR: Sign in to confirm you're not a bot";
        assert_eq!(classify(error), FailureKind::BotDetection);
    }

    #[test]
    fn test_bot_substring_detection() {
        let error = "blocked: suspected bot activity";
        assert_eq!(classify(error), FailureKind::BotDetection);
    }

    #[test]
    fn test_captcha_detection() {
        let error = "Please solve this CAPTCHA to continue";
        assert_eq!(classify(error), FailureKind::BotDetection);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("SIGN IN required"), FailureKind::BotDetection);
        assert_eq!(classify("Detected as BOT"), FailureKind::BotDetection);
    }

    #[test]
    fn test_rate_limit_detection() {
        let error = "HTTP Error 429: Too Many Requests";
        assert_eq!(classify(error), FailureKind::RateLimited);
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Timed out after 30s";
        assert_eq!(classify(error), FailureKind::NetworkTimeout);
    }

    #[test]
    fn test_geo_detection() {
        let error = "Video not available in your country";
        assert_eq!(classify(error), FailureKind::GeoBlocked);
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: Video unavailable";
        assert_eq!(classify(error), FailureKind::Unavailable);
    }

    #[test]
    fn test_unknown_fallthrough() {
        assert_eq!(classify("something odd happened"), FailureKind::Unknown);
    }

    #[test]
    fn test_only_bot_detection_halts() {
        assert!(FailureKind::BotDetection.halts_run());
        assert!(!FailureKind::RateLimited.halts_run());
        assert!(!FailureKind::NetworkTimeout.halts_run());
        assert!(!FailureKind::GeoBlocked.halts_run());
        assert!(!FailureKind::Unavailable.halts_run());
        assert!(!FailureKind::Unknown.halts_run());
    }

    #[test]
    fn test_halting_kind_has_remediation() {
        assert!(FailureKind::BotDetection.remediation().is_some());
        assert!(FailureKind::Unavailable.remediation().is_none());
    }
}
