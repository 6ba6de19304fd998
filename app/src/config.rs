//! Runtime application configuration from environment variables with
//! built-in defaults.

/// Runtime configuration for the generation pipelines.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Field separator between identifier and label in a raw line.
    pub separator: char,
    /// Deliberate pause before a single-record render begins (UX pacing).
    pub processing_delay_ms: u64,
    /// Throttle between consecutive bulk records.
    pub bulk_record_delay_ms: u64,
    /// Shorter pause after a skipped malformed line.
    pub bulk_skip_delay_ms: u64,
    /// Upper bound on one record's encode + composite stage.
    pub render_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            separator: '|',
            processing_delay_ms: 1000,
            bulk_record_delay_ms: 50,
            bulk_skip_delay_ms: 10,
            render_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            separator: parse_char(&env("BADGE_SEPARATOR"), defaults.separator),
            processing_delay_ms: parse_u64(
                &env("PROCESSING_DELAY_MS"),
                defaults.processing_delay_ms,
            ),
            bulk_record_delay_ms: parse_u64(
                &env("BULK_RECORD_DELAY_MS"),
                defaults.bulk_record_delay_ms,
            ),
            bulk_skip_delay_ms: parse_u64(&env("BULK_SKIP_DELAY_MS"), defaults.bulk_skip_delay_ms),
            render_timeout_secs: parse_u64(
                &env("RENDER_TIMEOUT_SECS"),
                defaults.render_timeout_secs,
            ),
        }
    }
}

fn env(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

fn parse_u64(s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn parse_char(s: &str, default: char) -> char {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => default,
    }
}
