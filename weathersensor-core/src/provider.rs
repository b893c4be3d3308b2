use crate::model::{AstronomyResponse, CurrentResponse, WeatherRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::{fmt::Debug, time::Duration};

pub mod weatherapi;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from a single weather API call.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("failed to reach weather API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode weather API response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request failed with code {status}, and no {missing} in response body")]
    UnexpectedStatus {
        status: StatusCode,
        missing: &'static str,
    },

    #[error("request failed with code {status}, and non-numeric code {code} in response body")]
    NonNumericCode {
        status: StatusCode,
        code: serde_json::Value,
    },

    #[error("error fetching weather info, code: {code}, message: {message}")]
    Api {
        code: i64,
        message: String,
        /// Parsed error body, kept for callers that want more than code/message.
        body: serde_json::Value,
    },
}

/// HTTP settings handed to a provider at construction.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for the requested location.
    async fn current_conditions(
        &self,
        request: &WeatherRequest,
    ) -> Result<CurrentResponse, WeatherError>;

    /// Sun and moon data for the requested location on `date`.
    async fn astronomy(
        &self,
        request: &WeatherRequest,
        date: NaiveDate,
    ) -> Result<AstronomyResponse, WeatherError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_use_ten_second_timeout() {
        let settings = ClientSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.base_url, "https://api.weatherapi.com/v1");
    }

    #[test]
    fn unexpected_status_names_missing_field() {
        let err = WeatherError::UnexpectedStatus {
            status: StatusCode::BAD_GATEWAY,
            missing: "message",
        };
        assert_eq!(
            err.to_string(),
            "request failed with code 502 Bad Gateway, and no message in response body"
        );
    }
}
