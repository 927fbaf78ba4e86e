//! Builder configuration: the ambient clock/zone and the sample values used
//! when a typed call is not given an example.
//!
//! Nothing here reads process state on its own. `now`/`zone` are resolved by
//! [`Config::resolve_clock`] once per generator call when left unset.
use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Instant used when a date/time call gives none. `None` = wall clock.
    pub now: Option<DateTime<Utc>>,
    /// Zone used when a date/time call gives none. `None` = platform offset.
    pub zone: Option<FixedOffset>,
    pub samples: Samples,
}

/// Resolved clock for one generator call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    pub now: DateTime<Utc>,
    pub zone: FixedOffset,
}

impl Config {
    /// Fully pinned configuration; generation is reproducible.
    pub fn fixed(now: DateTime<Utc>, zone: FixedOffset) -> Self {
        Self { now: Some(now), zone: Some(zone), samples: Samples::default() }
    }

    pub fn with_samples(mut self, samples: Samples) -> Self {
        self.samples = samples;
        self
    }

    /// Apply explicit overrides, falling back to the config, then to the system.
    pub fn resolve_clock(&self, at: Option<DateTime<Utc>>, zone: Option<FixedOffset>) -> Clock {
        let now = at.or(self.now).unwrap_or_else(Utc::now);
        let zone = zone
            .or(self.zone)
            .unwrap_or_else(|| *Local::now().offset());
        Clock { now, zone }
    }

    /// Load [`Samples`] from JSON, reporting the offending JSON path on failure.
    pub fn samples_from_json_str(src: &str) -> Result<Samples> {
        from_str_with_path(src)
    }
}

/// Examples synthesized for typed calls that were given none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Samples {
    pub string: String,
    pub integer: i64,
    pub decimal: f64,
    pub boolean: bool,
    pub id: i64,
    /// Lowercase hex digits.
    pub hex: String,
    pub uuid: String,
    pub ip_address: String,
    /// Elements generated by array-like calls unless the call asks otherwise.
    pub examples: usize,
}

impl Default for Samples {
    fn default() -> Self {
        Self {
            string: "string".to_string(),
            integer: 100,
            decimal: 100.25,
            boolean: true,
            id: 1234567890,
            hex: "3f2a9c1e0b".to_string(),
            uuid: "e2490de5-5bd3-43d5-b7c4-526e33f71304".to_string(),
            ip_address: "127.0.0.1".to_string(),
            examples: 1,
        }
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(BuildError::Config { path, reason: err.into_inner().to_string() })
        }
    }
}
