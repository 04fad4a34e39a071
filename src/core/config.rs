// Configuration Management for Signal Scanner
// Indicator strategy selection, order book settings, monitoring

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Indicator Configuration
// ============================================================================

/// Active indicator strategy. Serde names match the original wire strings
/// used by the scanner frontend ("price-ema", "stoch-rsi", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorType {
    Volume,
    Ema,
    PriceEma,
    StochRsi,
    Ma,
    Trend,
    Atr,
    Adx,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub period: u32,
    pub spike_threshold: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            period: 20,
            spike_threshold: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaConfig {
    pub fast_period: u32,
    pub slow_period: u32,
}

impl Default for EmaConfig {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 21,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEmaConfig {
    pub period: u32,
}

impl Default for PriceEmaConfig {
    fn default() -> Self {
        Self { period: 21 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiConfig {
    pub period: u32,
    pub k_period: u32,
    pub d_period: u32,
    // Alert bounds consumed by the orchestrator, not by the engine
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for StochRsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            k_period: 3,
            d_period: 3,
            overbought: 80.0,
            oversold: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaConfig {
    pub fast_period: u32,
    pub slow_period: u32,
}

impl Default for MaConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrConfig {
    pub period: u32,
}

impl Default for AtrConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxConfig {
    pub period: u32,
}

impl Default for AdxConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// Indicator strategy selection: a type tag plus optional parameter sections.
///
/// Only the section matching `indicator_type` is read. A declared type whose
/// section is absent is not an error; the engine has nothing to read and
/// returns an empty result. Trend mode has no section: its periods are fixed
/// (RSI 14, EMA 21/50, Bollinger 20/2, volume MA 20).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub indicator_type: IndicatorType,
    pub timeframe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema: Option<EmaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_ema: Option<PriceEmaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_rsi: Option<StochRsiConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma: Option<MaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adx: Option<AdxConfig>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            indicator_type: IndicatorType::Ema,
            timeframe: "5m".to_string(),
            volume: None,
            ema: Some(EmaConfig::default()),
            price_ema: None,
            stoch_rsi: None,
            ma: None,
            atr: None,
            adx: None,
        }
    }
}

impl IndicatorConfig {
    /// Convenience constructor with the default parameters for `indicator_type`.
    pub fn with_defaults(indicator_type: IndicatorType, timeframe: impl Into<String>) -> Self {
        let mut config = Self {
            indicator_type,
            timeframe: timeframe.into(),
            volume: None,
            ema: None,
            price_ema: None,
            stoch_rsi: None,
            ma: None,
            atr: None,
            adx: None,
        };
        match indicator_type {
            IndicatorType::Volume => config.volume = Some(VolumeConfig::default()),
            IndicatorType::Ema => config.ema = Some(EmaConfig::default()),
            IndicatorType::PriceEma => config.price_ema = Some(PriceEmaConfig::default()),
            IndicatorType::StochRsi => config.stoch_rsi = Some(StochRsiConfig::default()),
            IndicatorType::Ma => config.ma = Some(MaConfig::default()),
            IndicatorType::Atr => config.atr = Some(AtrConfig::default()),
            IndicatorType::Adx => config.adx = Some(AdxConfig::default()),
            IndicatorType::Trend => {}
        }
        config
    }
}

// ============================================================================
// Scanner / Order Book / Monitoring Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub symbol: String,
    /// Upper bound on the candle window kept per symbol; the engine
    /// recomputes from the full supplied window each call.
    pub candle_window: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            candle_window: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookConfig {
    pub depth: u32,
    pub update_interval_ms: u64,
    pub imbalance_threshold: f64,
    pub price_impact_threshold: f64,
    /// Volume walked through the book when estimating price impact.
    pub target_volume: f64,
}

impl Default for OrderBookConfig {
    fn default() -> Self {
        Self {
            depth: 20,
            update_interval_ms: 1000,
            imbalance_threshold: 0.2,
            price_impact_threshold: 0.01,
            target_volume: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            json_logs: false,
        }
    }
}

// ============================================================================
// Configuration Summary
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub symbol: String,
    pub indicator_type: IndicatorType,
    pub timeframe: String,
    pub order_book_depth: u32,
    pub log_level: String,
}

// ============================================================================
// Configuration Manager
// ============================================================================

pub struct ConfigManager {
    scanner: Arc<RwLock<ScannerConfig>>,
    indicator: Arc<RwLock<IndicatorConfig>>,
    order_book: Arc<RwLock<OrderBookConfig>>,
    monitoring: Arc<RwLock<MonitoringConfig>>,
}

impl ConfigManager {
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut manager = Self {
            scanner: Arc::new(RwLock::new(ScannerConfig::default())),
            indicator: Arc::new(RwLock::new(IndicatorConfig::default())),
            order_book: Arc::new(RwLock::new(OrderBookConfig::default())),
            monitoring: Arc::new(RwLock::new(MonitoringConfig::default())),
        };

        if let Some(path) = config_path {
            manager.load_from_file(path)?;
        }

        manager.load_from_env();

        info!("Configuration initialized");
        Ok(manager)
    }

    /// Load configuration from JSON file
    pub fn load_from_file(&mut self, config_path: &str) -> Result<(), ConfigError> {
        let path = Path::new(config_path);
        if !path.exists() {
            warn!(path = config_path, "Config file not found");
            return Ok(());
        }

        let content = fs::read_to_string(path)?;
        let config_data: HashMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        if let Some(data) = config_data.get("scanner") {
            if let Ok(scanner) = serde_json::from_value::<ScannerConfig>(data.clone()) {
                *self.scanner.write() = scanner;
            }
        }

        if let Some(data) = config_data.get("indicator") {
            if let Ok(indicator) = serde_json::from_value::<IndicatorConfig>(data.clone()) {
                *self.indicator.write() = indicator;
            }
        }

        if let Some(data) = config_data.get("order_book") {
            if let Ok(order_book) = serde_json::from_value::<OrderBookConfig>(data.clone()) {
                *self.order_book.write() = order_book;
            }
        }

        if let Some(data) = config_data.get("monitoring") {
            if let Ok(monitoring) = serde_json::from_value::<MonitoringConfig>(data.clone()) {
                *self.monitoring.write() = monitoring;
            }
        }

        info!(path = config_path, "Configuration loaded");
        Ok(())
    }

    /// Load overrides from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(symbol) = std::env::var("SCANNER_SYMBOL") {
            self.scanner.write().symbol = symbol;
        }
        if let Ok(timeframe) = std::env::var("SCANNER_TIMEFRAME") {
            self.indicator.write().timeframe = timeframe;
        }
        if let Ok(level) = std::env::var("SCANNER_LOG_LEVEL") {
            self.monitoring.write().log_level = level;
        }
    }

    /// Save configuration to JSON file
    pub fn save_to_file(&self, config_path: &str) -> Result<(), ConfigError> {
        let mut config_map = HashMap::new();
        config_map.insert("scanner", serde_json::to_value(&*self.scanner.read())?);
        config_map.insert("indicator", serde_json::to_value(&*self.indicator.read())?);
        config_map.insert("order_book", serde_json::to_value(&*self.order_book.read())?);
        config_map.insert("monitoring", serde_json::to_value(&*self.monitoring.read())?);

        if let Some(parent) = Path::new(config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&config_map)?;
        fs::write(config_path, json)?;

        info!(path = config_path, "Configuration saved");
        Ok(())
    }

    /// Validate configuration. Returns Ok(false) with warnings logged when a
    /// check fails; the engine itself never enforces these (a bad config
    /// degrades to empty results).
    pub fn validate(&self) -> Result<bool, ConfigError> {
        let mut errors = Vec::new();
        let scanner = self.scanner.read();
        let indicator = self.indicator.read();
        let order_book = self.order_book.read();

        if scanner.symbol.is_empty() {
            errors.push("symbol must not be empty".to_string());
        }
        if scanner.candle_window < 2 {
            errors.push("candle_window must be at least 2".to_string());
        }

        if let Some(v) = &indicator.volume {
            if v.period == 0 {
                errors.push("volume.period must be positive".to_string());
            }
            if v.spike_threshold <= 0.0 {
                errors.push("volume.spike_threshold must be positive".to_string());
            }
        }
        if let Some(e) = &indicator.ema {
            if e.fast_period == 0 || e.slow_period == 0 {
                errors.push("ema periods must be positive".to_string());
            }
            if e.fast_period >= e.slow_period {
                errors.push("ema.fast_period should be below ema.slow_period".to_string());
            }
        }
        if let Some(p) = &indicator.price_ema {
            if p.period == 0 {
                errors.push("price_ema.period must be positive".to_string());
            }
        }
        if let Some(s) = &indicator.stoch_rsi {
            if s.period == 0 || s.k_period == 0 || s.d_period == 0 {
                errors.push("stoch_rsi periods must be positive".to_string());
            }
            if s.oversold >= s.overbought {
                errors.push("stoch_rsi.oversold should be below overbought".to_string());
            }
        }
        if let Some(m) = &indicator.ma {
            if m.fast_period == 0 || m.slow_period == 0 {
                errors.push("ma periods must be positive".to_string());
            }
            if m.fast_period >= m.slow_period {
                errors.push("ma.fast_period should be below ma.slow_period".to_string());
            }
        }
        if let Some(a) = &indicator.atr {
            if a.period == 0 {
                errors.push("atr.period must be positive".to_string());
            }
        }
        if let Some(a) = &indicator.adx {
            if a.period == 0 {
                errors.push("adx.period must be positive".to_string());
            }
        }

        if order_book.depth == 0 {
            errors.push("order_book.depth must be positive".to_string());
        }
        if order_book.target_volume <= 0.0 {
            errors.push("order_book.target_volume must be positive".to_string());
        }

        if !errors.is_empty() {
            for error in &errors {
                warn!(error = %error, "Config validation error");
            }
            return Ok(false);
        }

        info!("Configuration validated successfully");
        Ok(true)
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        let scanner = self.scanner.read();
        let indicator = self.indicator.read();
        let order_book = self.order_book.read();
        let monitoring = self.monitoring.read();

        ConfigSummary {
            symbol: scanner.symbol.clone(),
            indicator_type: indicator.indicator_type,
            timeframe: indicator.timeframe.clone(),
            order_book_depth: order_book.depth,
            log_level: monitoring.log_level.clone(),
        }
    }

    // Getters for each config section
    pub fn scanner(&self) -> ScannerConfig {
        self.scanner.read().clone()
    }

    pub fn indicator(&self) -> IndicatorConfig {
        self.indicator.read().clone()
    }

    pub fn order_book(&self) -> OrderBookConfig {
        self.order_book.read().clone()
    }

    pub fn monitoring(&self) -> MonitoringConfig {
        self.monitoring.read().clone()
    }

    pub fn set_indicator(&self, config: IndicatorConfig) {
        *self.indicator.write() = config;
    }
}

// Global config instance (thread-safe singleton)
static GLOBAL_CONFIG: OnceLock<Arc<RwLock<ConfigManager>>> = OnceLock::new();

/// Get global configuration instance (singleton)
pub fn get_config() -> Arc<RwLock<ConfigManager>> {
    Arc::clone(GLOBAL_CONFIG.get_or_init(|| {
        Arc::new(RwLock::new(
            ConfigManager::new(None).expect("Failed to create default config"),
        ))
    }))
}
