use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::{AstronomyResponse, CurrentResponse, WeatherRequest};

use super::{ClientSettings, WeatherError, WeatherProvider};

// api ref: https://www.weatherapi.com/docs/

/// weatherapi.com client for the two endpoints the weather sensor reads.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(settings: ClientSettings) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(WeatherError::Transport)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` and return the JSON object body.
    ///
    /// A non-200 body is still parsed so its `code`/`message` pair can be
    /// reported; weatherapi.com nests them under `error`, so that object is
    /// consulted when they are absent at the top level.
    pub async fn fetch_endpoint(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Map<String, Value>, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint, error = %e, "error making request");
                WeatherError::Transport(e)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::error!(endpoint, error = %e, "error reading response body");
            WeatherError::Transport(e)
        })?;

        let parsed: Map<String, Value> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(endpoint, error = %e, "error decoding response body");
            WeatherError::Decode(e)
        })?;

        if status != StatusCode::OK {
            tracing::error!(endpoint, %status, "unexpected status code");
            return Err(api_error(status, parsed));
        }

        Ok(parsed)
    }

    async fn fetch_typed<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let body = self.fetch_endpoint(endpoint, query).await?;
        serde_json::from_value(Value::Object(body)).map_err(|e| {
            tracing::error!(endpoint, error = %e, "unexpected response shape");
            WeatherError::Decode(e)
        })
    }
}

fn api_error(status: StatusCode, body: Map<String, Value>) -> WeatherError {
    let fields = match body.get("error") {
        Some(Value::Object(inner)) if !body.contains_key("code") && !body.contains_key("message") => {
            inner
        }
        _ => &body,
    };

    let Some(raw_code) = fields.get("code") else {
        return WeatherError::UnexpectedStatus { status, missing: "code" };
    };
    let message = match fields.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => return WeatherError::UnexpectedStatus { status, missing: "message" },
    };
    let Some(code) = numeric_code(raw_code) else {
        return WeatherError::NonNumericCode {
            status,
            code: raw_code.clone(),
        };
    };

    WeatherError::Api {
        code,
        message,
        body: Value::Object(body),
    }
}

/// Integer code from `1006`, `1006.0` or `"1006"`.
fn numeric_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_conditions(
        &self,
        request: &WeatherRequest,
    ) -> Result<CurrentResponse, WeatherError> {
        let zipcode = request.zipcode.to_string();
        self.fetch_typed(
            "current.json",
            &[("q", zipcode.as_str()), ("key", request.api_key.as_str())],
        )
        .await
    }

    async fn astronomy(
        &self,
        request: &WeatherRequest,
        date: NaiveDate,
    ) -> Result<AstronomyResponse, WeatherError> {
        let zipcode = request.zipcode.to_string();
        let dt = date.format("%Y-%m-%d").to_string();
        self.fetch_typed(
            "astronomy.json",
            &[
                ("q", zipcode.as_str()),
                ("dt", dt.as_str()),
                ("key", request.api_key.as_str()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn api_error_reads_top_level_fields() {
        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            object(json!({ "code": 1006, "message": "No matching location found." })),
        );
        match err {
            WeatherError::Api { code, message, body } => {
                assert_eq!(code, 1006);
                assert_eq!(message, "No matching location found.");
                assert_eq!(body["code"], 1006);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_nested_error_object() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            object(json!({ "error": { "code": 2006, "message": "API key is invalid." } })),
        );
        assert!(matches!(err, WeatherError::Api { code: 2006, .. }));
    }

    #[test]
    fn api_error_without_code_is_unexpected_status() {
        let err = api_error(StatusCode::BAD_REQUEST, object(json!({ "message": "nope" })));
        assert!(matches!(
            err,
            WeatherError::UnexpectedStatus { status: StatusCode::BAD_REQUEST, missing: "code" }
        ));
    }

    #[test]
    fn api_error_accepts_code_sent_as_string_or_float() {
        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            object(json!({ "code": "1006", "message": "No matching location found." })),
        );
        assert!(matches!(err, WeatherError::Api { code: 1006, .. }));

        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            object(json!({ "code": 1006.0, "message": "No matching location found." })),
        );
        assert!(matches!(err, WeatherError::Api { code: 1006, .. }));
    }

    #[test]
    fn api_error_with_non_numeric_code_does_not_claim_it_is_missing() {
        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            object(json!({ "code": "E_LOCATION", "message": "No matching location found." })),
        );
        assert!(matches!(&err, WeatherError::NonNumericCode { code, .. } if code == "E_LOCATION"));
        assert!(!err.to_string().contains("no code"));
    }

    #[test]
    fn api_error_without_message_is_unexpected_status() {
        let err = api_error(StatusCode::BAD_REQUEST, object(json!({ "code": 9999 })));
        assert!(matches!(err, WeatherError::UnexpectedStatus { missing: "message", .. }));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let provider = WeatherApiProvider::new(ClientSettings::with_base_url("http://localhost/v1/"))
            .expect("client should build");
        assert_eq!(provider.base_url, "http://localhost/v1");
    }
}
