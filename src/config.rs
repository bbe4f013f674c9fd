//! System configuration parameters
//!
//! All tunable parameters for the alarm controller.  Loaded once at startup
//! from `config.json`.  Key names for the access code, threshold, kit and
//! notification credentials match the deployed config files (`CODE`,
//! `NOISE_THRESHOLD`, `kit`, `SERVER`, ...); every key is optional.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which wiring layout / board kit is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    /// Grove starter kit: sound sensor + JHD1313M1 RGB LCD on I2C.
    #[default]
    Grove,
    /// DFRobot starter kit: analog microphone + LCD keypad shield.
    Dfrobot,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Access control ---
    /// Code that defuses or disables the alarm.
    #[serde(rename = "CODE")]
    pub access_code: String,
    /// Noise level at or above which a sample counts as loud.
    #[serde(rename = "NOISE_THRESHOLD")]
    pub noise_threshold: u32,
    /// Board variant to instantiate.
    pub kit: BoardKind,

    // --- Timing ---
    /// Monitoring poll interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Pending-code evaluation interval while alerting/sounding (milliseconds)
    pub code_check_interval_ms: u32,
    /// Time from noise detection to the alarm sounding (seconds)
    pub escalation_secs: u32,
    /// Grace period after a valid code before monitoring resumes (seconds)
    pub settle_secs: u32,

    // --- Admission endpoint ---
    /// TCP port for the code-entry web server
    pub http_port: u16,
    /// Sustained submissions per second accepted by the endpoint
    pub submission_rate_per_sec: u32,

    // --- Board buses ---
    /// `/dev/i2c-N` bus number used by the Grove LCD
    pub i2c_bus: u8,
    /// IIO device index that exposes the analog inputs
    pub iio_device: u8,
    /// ADC samples read per noise check
    pub mic_burst_samples: u16,

    // --- Notification backends ---
    /// Remote datastore URL (PUT target)
    #[serde(rename = "SERVER")]
    pub datastore_url: Option<String>,
    /// Datastore `X-Auth-Token` header value
    #[serde(rename = "AUTH_TOKEN")]
    pub datastore_token: Option<String>,
    /// Optional transports (`services.sms`, ...)
    pub services: ServicesConfig,
}

/// The `services` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub sms: Option<SmsSection>,
}

/// Raw `services.sms` section; every key must be present to enable it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsSection {
    pub url: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Access control
            access_code: "1234".into(),
            noise_threshold: 30,
            kit: BoardKind::Grove,

            // Timing
            poll_interval_ms: 20,        // 50 Hz
            code_check_interval_ms: 100, // 10 Hz
            escalation_secs: 30,
            settle_secs: 30,

            // Endpoint
            http_port: 3000,
            submission_rate_per_sec: 10,

            // Buses
            i2c_bus: 6,
            iio_device: 0,
            mic_burst_samples: 16,

            // Notifications (disabled until credentials are present)
            datastore_url: None,
            datastore_token: None,
            services: ServicesConfig::default(),
        }
    }
}

/// Credentials for the remote datastore backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreConfig {
    pub url: String,
    pub token: String,
}

/// Settings for the SMS gateway backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsConfig {
    pub url: String,
    pub user: String,
    pub pass: String,
}

impl SystemConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file is not an error: the defaults are returned and a
    /// warning is logged.  A file that exists but cannot be parsed, or that
    /// fails [`validate`](Self::validate), is rejected.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_json(&raw)?;
        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_code.is_empty() {
            return Err(ConfigError::ValidationFailed("CODE must not be empty"));
        }
        if self.noise_threshold == 0 {
            return Err(ConfigError::ValidationFailed("NOISE_THRESHOLD must be > 0"));
        }
        if self.poll_interval_ms == 0 || self.code_check_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll intervals must be > 0"));
        }
        if self.code_check_interval_ms < self.poll_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "code_check_interval_ms must not be shorter than poll_interval_ms",
            ));
        }
        if self.escalation_secs == 0 || self.settle_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "escalation_secs and settle_secs must be > 0",
            ));
        }
        if self.submission_rate_per_sec == 0 {
            return Err(ConfigError::ValidationFailed("submission_rate_per_sec must be > 0"));
        }
        if self.mic_burst_samples == 0 || self.mic_burst_samples > 256 {
            return Err(ConfigError::ValidationFailed("mic_burst_samples must be 1..=256"));
        }
        Ok(())
    }

    /// Datastore backend settings, when both URL and token are configured.
    pub fn datastore(&self) -> Option<DatastoreConfig> {
        Some(DatastoreConfig {
            url: self.datastore_url.clone()?,
            token: self.datastore_token.clone()?,
        })
    }

    /// SMS gateway settings, when `services.sms` is present and complete.
    /// An incomplete section is logged and treated as absent.
    pub fn sms(&self) -> Option<SmsConfig> {
        let section = self.services.sms.as_ref()?;
        match (&section.url, &section.user, &section.pass) {
            (Some(url), Some(user), Some(pass)) => Some(SmsConfig {
                url: url.clone(),
                user: user.clone(),
                pass: pass.clone(),
            }),
            _ => {
                warn!("Config: services.sms is missing url, user or pass; SMS disabled");
                None
            }
        }
    }
}
