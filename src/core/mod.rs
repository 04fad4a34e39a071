// Core Module - Foundational types, config, logging

pub mod config;
pub mod logger;
pub mod types;

// Re-export commonly used items for convenience
pub use config::{
    get_config, AdxConfig, AtrConfig, ConfigError, ConfigManager, ConfigSummary, EmaConfig,
    IndicatorConfig, IndicatorType, MaConfig, MonitoringConfig, OrderBookConfig, PriceEmaConfig,
    ScannerConfig, StochRsiConfig, VolumeConfig,
};
pub use logger::setup_logging;
pub use types::*;
