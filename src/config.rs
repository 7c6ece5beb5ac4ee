//! Typed init-time configuration, plus an untyped-map constructor for
//! callers that assemble configuration dynamically.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::wire::constants::{
    DEFAULT_MAX_SEND_TIME_SECS, DEFAULT_NAMED_PIPE_PATH, DEFAULT_SOCKET_PATH,
    MIN_MAX_SEND_TIME_SECS,
};

/// A single recognized configuration value. Unrecognized keys passed to
/// [`InitOptions::from_map`] are ignored, matching the reference client.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Str(String),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub socket_path: PathBuf,
    pub named_pipe_path: String,
    pub max_send_time: Duration,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            named_pipe_path: DEFAULT_NAMED_PIPE_PATH.to_string(),
            max_send_time: Duration::from_secs_f64(DEFAULT_MAX_SEND_TIME_SECS),
        }
    }
}

impl InitOptions {
    /// Builds options from the untyped `socketPath` / `namedPipePath` /
    /// `maxSendTime` key set described in the protocol spec. Unknown keys
    /// are ignored; `maxSendTime` is floored at
    /// [`MIN_MAX_SEND_TIME_SECS`].
    pub fn from_map(map: &HashMap<String, ConfigValue>) -> Self {
        let mut options = Self::default();

        if let Some(ConfigValue::Str(path)) = map.get("socketPath") {
            options.socket_path = PathBuf::from(path);
        }

        if let Some(ConfigValue::Str(path)) = map.get("namedPipePath") {
            options.named_pipe_path = path.clone();
        }

        if let Some(value) = map.get("maxSendTime") {
            let secs = match value {
                ConfigValue::Float(f) => *f,
                ConfigValue::Str(s) => s.parse().unwrap_or(DEFAULT_MAX_SEND_TIME_SECS),
            };
            options.max_send_time = Duration::from_secs_f64(secs.max(MIN_MAX_SEND_TIME_SECS));
        }

        options
    }

    pub fn with_max_send_time_secs(mut self, secs: f64) -> Self {
        self.max_send_time = Duration::from_secs_f64(secs.max(MIN_MAX_SEND_TIME_SECS));
        self
    }
}
