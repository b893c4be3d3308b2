use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error as _, Unexpected},
};
use serde_json::{Map, Value, json};

/// Mapping returned by every sensor's `readings()`.
pub type Readings = Map<String, Value>;

/// Per-call query parameters shared by both weather endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub zipcode: i64,
    pub api_key: String,
}

/// `current.json` body, only the fields the composite reading uses.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub current: Current,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temp_f: f64,
    pub condition: Condition,
    pub cloud: f64,
    pub precip_in: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
    pub code: i64,
}

/// `astronomy.json` body.
#[derive(Debug, Clone, Deserialize)]
pub struct AstronomyResponse {
    pub astronomy: Astronomy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Astronomy {
    pub astro: Astro,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Astro {
    /// weatherapi.com sends 0/1 here.
    #[serde(deserialize_with = "bool_like")]
    pub is_sun_up: bool,
}

/// Outside conditions gathered from both endpoints for one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub outside_f: f64,
    pub condition: String,
    pub code: i64,
    pub cloud_cover_pct: f64,
    pub precipitation_inches: f64,
    pub is_day: bool,
}

impl WeatherSnapshot {
    pub fn from_responses(current: CurrentResponse, astronomy: AstronomyResponse) -> Self {
        let current = current.current;
        Self {
            outside_f: current.temp_f,
            condition: current.condition.text,
            code: current.condition.code,
            cloud_cover_pct: current.cloud,
            precipitation_inches: current.precip_in,
            is_day: astronomy.astronomy.astro.is_sun_up,
        }
    }
}

/// Outside snapshot plus the inside temperature, in Fahrenheit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeReading {
    #[serde(flatten)]
    pub weather: WeatherSnapshot,
    pub inside_f: f64,
}

impl From<CompositeReading> for Readings {
    fn from(reading: CompositeReading) -> Self {
        let WeatherSnapshot {
            outside_f,
            condition,
            code,
            cloud_cover_pct,
            precipitation_inches,
            is_day,
        } = reading.weather;

        let mut out = Readings::new();
        out.insert("outside_f".into(), json!(outside_f));
        out.insert("condition".into(), json!(condition));
        out.insert("code".into(), json!(code));
        out.insert("cloud_cover_pct".into(), json!(cloud_cover_pct));
        out.insert("precipitation_inches".into(), json!(precipitation_inches));
        out.insert("is_day".into(), json!(is_day));
        out.insert("inside_f".into(), json!(reading.inside_f));
        out
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

fn bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Int(n) => Ok(n != 0),
        BoolLike::Float(f) => Ok(f != 0.0),
        BoolLike::Text(s) => match s.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => Err(D::Error::invalid_value(Unexpected::Str(other), &"a boolean-like value")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn astro(value: Value) -> Result<AstronomyResponse, serde_json::Error> {
        serde_json::from_value(json!({ "astronomy": { "astro": { "is_sun_up": value } } }))
    }

    #[test]
    fn fahrenheit_at_freezing_and_boiling() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn is_sun_up_accepts_numbers_and_bools() {
        assert!(astro(json!(1)).unwrap().astronomy.astro.is_sun_up);
        assert!(!astro(json!(0)).unwrap().astronomy.astro.is_sun_up);
        assert!(astro(json!(true)).unwrap().astronomy.astro.is_sun_up);
        assert!(!astro(json!("0")).unwrap().astronomy.astro.is_sun_up);
    }

    #[test]
    fn is_sun_up_rejects_other_text() {
        assert!(astro(json!("maybe")).is_err());
        assert!(astro(Value::Null).is_err());
    }

    #[test]
    fn current_response_requires_nested_condition() {
        let err = serde_json::from_value::<CurrentResponse>(json!({
            "current": { "temp_f": 70.0, "cloud": 10, "precip_in": 0.0 }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("condition"));
    }

    #[test]
    fn composite_reading_has_exactly_seven_keys() {
        let reading = CompositeReading {
            weather: WeatherSnapshot {
                outside_f: 71.1,
                condition: "Sunny".into(),
                code: 1000,
                cloud_cover_pct: 0.0,
                precipitation_inches: 0.0,
                is_day: true,
            },
            inside_f: 68.0,
        };

        let map = Readings::from(reading.clone());
        let mut keys: Vec<_> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "cloud_cover_pct",
                "code",
                "condition",
                "inside_f",
                "is_day",
                "outside_f",
                "precipitation_inches",
            ]
        );

        // Serialize impl agrees with the mapping.
        assert_eq!(serde_json::to_value(&reading).unwrap(), Value::Object(map));
    }
}
