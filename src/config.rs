use chrono::{FixedOffset, Offset, Utc};
use derive_builder::Builder;
use secrecy::SecretString;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::str::FromStr;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.podio.com";
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

fn default_api_url() -> Url {
    Url::from_str(DEFAULT_API_URL).expect("default api url is valid")
}

fn default_time_zone() -> FixedOffset {
    Utc.fix()
}

fn default_date_format() -> String {
    String::from(DEFAULT_DATE_FORMAT)
}

#[serde_as]
#[derive(Deserialize, Debug, Clone, Builder)]
pub struct Config {
    #[builder(setter(into), default = default_api_url())]
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Display time zone, e.g. `+02:00`
    #[builder(default = default_time_zone())]
    #[serde(default = "default_time_zone")]
    #[serde_as(as = "DisplayFromStr")]
    pub time_zone: FixedOffset,

    /// strftime format used to read user-entered dates
    #[builder(setter(into), default = default_date_format())]
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            time_zone: default_time_zone(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("PODIO"))
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
    }

    pub fn locale(&self) -> Locale {
        Locale {
            time_zone: self.time_zone,
            date_format: self.date_format.clone(),
        }
    }
}

/// Display settings applied by date and datetime accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub time_zone: FixedOffset,
    pub date_format: String,
}

impl Default for Locale {
    fn default() -> Self {
        Config::default().locale()
    }
}

impl From<&Config> for Locale {
    fn from(config: &Config) -> Self {
        config.locale()
    }
}
