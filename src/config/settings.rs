use serde::Deserialize;

/// Smallest accepted number of random bytes in a subscriber id.
pub const MIN_ID_BYTES: usize = 50;

/// Top-level configuration settings for the crate.
///
/// Includes settings for the broker and for logging.
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Configuration settings for the broker.
///
/// `channel_capacity` is the number of undelivered messages a subscriber
/// channel holds before delivery tasks start waiting on the reader. The
/// default of one is a single in-flight slot per subscriber.
///
/// `max_in_flight` caps how many delivery tasks run at once; zero means no
/// cap.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    pub channel_capacity: usize,
    pub id_bytes: usize,
    pub max_in_flight: usize,
}

impl BrokerSettings {
    /// Clamps values into their accepted ranges.
    pub fn normalized(mut self) -> Self {
        self.channel_capacity = self.channel_capacity.max(1);
        self.id_bytes = self.id_bytes.max(MIN_ID_BYTES);
        self
    }
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub channel_capacity: Option<usize>,
    pub id_bytes: Option<usize>,
    pub max_in_flight: Option<usize>,
}

/// Partial log settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
            id_bytes: MIN_ID_BYTES,
            max_in_flight: 0,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PartialSettings {
    /// Fills every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();
        let broker = self.broker;
        let log = self.log;

        Settings {
            broker: BrokerSettings {
                channel_capacity: broker
                    .as_ref()
                    .and_then(|b| b.channel_capacity)
                    .unwrap_or(default.broker.channel_capacity),
                id_bytes: broker
                    .as_ref()
                    .and_then(|b| b.id_bytes)
                    .unwrap_or(default.broker.id_bytes),
                max_in_flight: broker
                    .as_ref()
                    .and_then(|b| b.max_in_flight)
                    .unwrap_or(default.broker.max_in_flight),
            }
            .normalized(),
            log: LogSettings {
                level: log
                    .and_then(|l| l.level)
                    .unwrap_or(default.log.level),
            },
        }
    }
}
