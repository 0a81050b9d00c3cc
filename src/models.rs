use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Request payload for the oracle endpoint
#[derive(Debug, Default, Deserialize)]
pub struct OracleRequest {
    #[serde(default, deserialize_with = "scalar_text")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub model: Option<String>,
}

/// Request payload for the astro endpoint
///
/// `birthChart` is kept as raw JSON so that a missing or malformed planet list is
/// reported as a validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AstroRequest {
    #[serde(default, rename = "birthChart")]
    pub birth_chart: Option<Value>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub focus: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub model: Option<String>,
}

/// A planet placement reduced to the fields forwarded upstream.
///
/// Values are copied as-is; callers send degrees as numbers or as strings like `12°18'`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetPlacement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
}

/// The validated, projected chart that is serialized into the user prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPrompt {
    pub planets: Vec<PlanetPlacement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houses: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// Successful relay envelope
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub ok: bool,
    pub text: String,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            service: env!("CARGO_PKG_NAME").to_string(),
            status: "alive".to_string(),
        }
    }
}

impl RelayResponse {
    pub fn new(text: String) -> Self {
        Self { ok: true, text }
    }
}

impl PlanetPlacement {
    fn project(entry: &Map<String, Value>) -> Self {
        let field = |key: &str| entry.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            name: field("name"),
            sign: field("sign"),
            degree: field("degree"),
            longitude: field("longitude"),
        }
    }
}

impl OracleRequest {
    /// Returns the trimmed question, or the 400 error when it is missing or blank
    pub fn validated_question(&self) -> AppResult<&str> {
        non_blank(self.question.as_deref())
            .ok_or_else(|| AppError::InvalidRequest("Missing question".to_string()))
    }
}

impl AstroRequest {
    /// Validates the birth chart and projects it into the prompt payload.
    ///
    /// Entries that are not objects are skipped; a list with no object entries
    /// counts as missing.
    pub fn chart_prompt(&self) -> AppResult<ChartPrompt> {
        let missing = || AppError::InvalidRequest("Missing birthChart.planets".to_string());

        let chart = self.birth_chart.as_ref().ok_or_else(missing)?;
        let planets: Vec<PlanetPlacement> = match chart.get("planets") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(PlanetPlacement::project)
                .collect(),
            _ => Vec::new(),
        };
        if planets.is_empty() {
            return Err(missing());
        }

        let text_field = |key: &str| {
            non_blank(chart.get(key).and_then(Value::as_str)).map(str::to_string)
        };

        Ok(ChartPrompt {
            planets,
            houses: chart.get("houses").filter(|h| !h.is_null()).cloned(),
            date: text_field("date"),
            time: text_field("time"),
            place: text_field("place"),
            focus: self.focus_text().map(str::to_string),
        })
    }

    /// `question` wins over `focus` when both carry text
    fn focus_text(&self) -> Option<&str> {
        non_blank(self.question.as_deref()).or_else(|| non_blank(self.focus.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Strings pass through, numbers and booleans are stringified, anything else is absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Only strings count; any other JSON type is treated as absent.
fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}
