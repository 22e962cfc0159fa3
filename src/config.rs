use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn nse_option_chain_url(symbol: &str) -> String {
    format!(
        "{}/api/option-chain-indices?symbol={}",
        NSE_BASE_URL,
        urlencoding::encode(symbol)
    )
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 3;
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
pub const RETRY_MAX_ATTEMPTS: usize = 5;

// -----------------------------------------------
// TRACKER DEFAULTS
// -----------------------------------------------
pub const DEFAULT_SYMBOL: &str = "NIFTY";
pub const DEFAULT_STRIKE_GAP: i64 = 50;
pub const DEFAULT_STRIKE_RANGE: i64 = 4;
pub const DEFAULT_REFRESH_SECS: u64 = 5;
pub const DEFAULT_SPREADSHEET_FILE: &str = "option_levels.csv";
pub const DEFAULT_PINE_FILE: &str = "nifty_oi_auto.pine";
pub const DEFAULT_SAMPLE_FILE: &str = "sample_nifty.json";

/// Execution mode: "live" polls the NSE API on the refresh interval,
/// "sample" runs one tick from a saved chain JSON and exits.
pub fn get_execution_mode() -> String {
    std::env::var("NSE_MODE").unwrap_or_else(|_| "live".to_string())
}

/// Recognized options, read once at startup. Unparsable values fall back to
/// the defaults above.
#[derive(Debug, Clone)]
pub struct Settings {
    pub symbol: String,
    pub strike_gap: i64,
    pub strike_range: i64,
    pub refresh_secs: u64,
    pub spreadsheet_file: String,
    pub pine_file: String,
    pub sample_file: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            symbol: env_or("NSE_SYMBOL", DEFAULT_SYMBOL),
            strike_gap: env_parse("NSE_STRIKE_GAP", DEFAULT_STRIKE_GAP),
            strike_range: env_parse("NSE_STRIKE_RANGE", DEFAULT_STRIKE_RANGE),
            refresh_secs: env_parse("NSE_REFRESH_SECS", DEFAULT_REFRESH_SECS),
            spreadsheet_file: env_or("NSE_SPREADSHEET_FILE", DEFAULT_SPREADSHEET_FILE),
            pine_file: env_or("NSE_PINE_FILE", DEFAULT_PINE_FILE),
            sample_file: env_or("NSE_SAMPLE_FILE", DEFAULT_SAMPLE_FILE),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            strike_gap: DEFAULT_STRIKE_GAP,
            strike_range: DEFAULT_STRIKE_RANGE,
            refresh_secs: DEFAULT_REFRESH_SECS,
            spreadsheet_file: DEFAULT_SPREADSHEET_FILE.to_string(),
            pine_file: DEFAULT_PINE_FILE.to_string(),
            sample_file: DEFAULT_SAMPLE_FILE.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
