use crate::config::Config;
use crate::domain::market::timeframe::Timeframe;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const SCREENER_VARS: [&str; 8] = [
    "SCAN_INTERVAL_SECONDS",
    "SCAN_BATCH_SIZE",
    "SCAN_BATCH_DELAY_MS",
    "SEEN_SIGNAL_CAPACITY",
    "SEEN_SIGNAL_RETAIN",
    "VISIBLE_SIGNAL_CAPACITY",
    "CONFIRMATION_TIMEFRAMES",
    "STRONG_CONFIRMATION_MIN",
];

fn clear_env() {
    let vars = SCREENER_VARS.iter().copied().chain([
        "BYBIT_TESTNET",
        "BYBIT_BASE_URL",
        "BYBIT_CATEGORY",
        "BYBIT_QUOTE_COIN",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
        "TELEGRAM_API_URL",
        "OBSERVABILITY_ENABLED",
    ]);
    for var in vars {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.bybit.base_url, "https://api.bybit.com");
    assert_eq!(config.bybit.category, "linear");
    assert!(!config.telegram.is_configured());
    assert!(config.observability.enabled);

    let screener = config.screener.screener_config();
    assert_eq!(screener.scan_interval, Duration::from_secs(300));
    assert_eq!(screener.batch_size, 5);
    assert_eq!(screener.batch_delay, Duration::from_millis(200));
    assert_eq!(screener.store.seen_capacity, 1000);
    assert_eq!(screener.store.seen_retain, 500);
    assert_eq!(screener.store.visible_capacity, 100);

    let analyzer = config.screener.analyzer_config();
    assert_eq!(
        analyzer.cross_timeframes,
        vec![
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::OneHour,
            Timeframe::OneDay
        ]
    );
    assert_eq!(analyzer.strong_threshold, 2);
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    unsafe {
        env::set_var("BYBIT_TESTNET", "true");
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("TELEGRAM_CHAT_ID", "-1001");
        env::set_var("SCAN_INTERVAL_SECONDS", "60");
        env::set_var("CONFIRMATION_TIMEFRAMES", "15, 60");
        env::set_var("STRONG_CONFIRMATION_MIN", "1");
        env::set_var("OBSERVABILITY_ENABLED", "false");
    }

    let config = Config::from_env().unwrap();

    assert!(config.bybit.testnet);
    assert_eq!(config.bybit.base_url, "https://api-testnet.bybit.com");
    assert!(config.telegram.is_configured());
    assert!(!config.observability.enabled);
    assert_eq!(
        config.screener.screener_config().scan_interval,
        Duration::from_secs(60)
    );

    let analyzer = config.screener.analyzer_config();
    assert_eq!(
        analyzer.cross_timeframes,
        vec![Timeframe::FifteenMin, Timeframe::OneHour]
    );
    assert_eq!(analyzer.strong_threshold, 1);

    clear_env();
}

#[test]
fn test_unknown_confirmation_timeframe_fails() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    unsafe { env::set_var("CONFIRMATION_TIMEFRAMES", "5,7,60") };
    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("CONFIRMATION_TIMEFRAMES"));

    clear_env();
}

#[test]
fn test_invalid_number_fails() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    unsafe { env::set_var("SCAN_BATCH_SIZE", "five") };
    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("SCAN_BATCH_SIZE"));

    clear_env();
}

#[test]
fn test_empty_telegram_token_is_unset() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    unsafe {
        env::set_var("TELEGRAM_BOT_TOKEN", "  ");
        env::set_var("TELEGRAM_CHAT_ID", "42");
    }
    let config = Config::from_env().unwrap();
    assert!(config.telegram.bot_token.is_none());
    assert!(!config.telegram.is_configured());

    clear_env();
}
