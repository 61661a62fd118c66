//! View parameters: request overrides, configured defaults, and validation.

use serde::{Deserialize, Serialize};

use crate::views::{ViewError, ViewKind};

pub const DEFAULT_WINDOW_LENGTH: usize = 21;
pub const DEFAULT_MIN_POPULATION: f64 = 1_000_000.0;

/// View settings from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Trailing days counted as "recent".
    pub window_length: usize,
    pub min_population: f64,
    /// Worker threads for rendering many views at once; 0 uses every core.
    pub workers: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            min_population: DEFAULT_MIN_POPULATION,
            workers: 0,
        }
    }
}

/// Caller-supplied overrides. Absent fields fall back to the view's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRequest {
    pub threshold: Option<f64>,
    pub periods: Option<usize>,
    pub min_population: Option<f64>,
    /// Literal labels, `top-areas` or `top-states`.
    pub highlight: Vec<String>,
}

impl ViewRequest {
    /// Parse a URL query string (`threshold=5&highlight=top-areas&highlight=Oregon`).
    /// Unknown keys are ignored.
    pub fn from_query(query: &str) -> Result<Self, ViewError> {
        let mut request = ViewRequest::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.trim() {
                "threshold" => request.threshold = Some(parse_number("threshold", &value)?),
                "periods" => request.periods = Some(parse_count("periods", &value)?),
                "min_population" | "minpop" => {
                    request.min_population = Some(parse_number("min_population", &value)?)
                }
                "highlight" if !value.trim().is_empty() => {
                    request.highlight.push(value.trim().to_string())
                }
                _ => {}
            }
        }
        Ok(request)
    }
}

pub fn parse_number(name: &'static str, raw: &str) -> Result<f64, ViewError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ViewError::InvalidParameter {
            name,
            message: format!("'{raw}' must be a number"),
        })
}

pub fn parse_count(name: &'static str, raw: &str) -> Result<usize, ViewError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ViewError::InvalidParameter {
            name,
            message: format!("'{raw}' must be an integer"),
        })
}

/// Fully resolved parameters of one view computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewParams {
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_population: Option<f64>,
    pub window_length: usize,
}

impl ViewParams {
    pub fn resolve(
        kind: ViewKind,
        request: &ViewRequest,
        settings: &ViewSettings,
    ) -> Result<Self, ViewError> {
        let threshold = request.threshold.unwrap_or_else(|| kind.default_threshold());
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ViewError::InvalidParameter {
                name: "threshold",
                message: "must be a non-negative number".to_string(),
            });
        }

        let periods = match kind.default_periods() {
            Some(default) => {
                let periods = request.periods.unwrap_or(default);
                if periods == 0 {
                    return Err(ViewError::InvalidParameter {
                        name: "periods",
                        message: "must be a positive integer".to_string(),
                    });
                }
                Some(periods)
            }
            None => None,
        };

        let min_population = if kind.uses_min_population() {
            let floor = request.min_population.unwrap_or(settings.min_population);
            if !floor.is_finite() || floor < 0.0 {
                return Err(ViewError::InvalidParameter {
                    name: "min_population",
                    message: "must be a non-negative number".to_string(),
                });
            }
            Some(floor)
        } else {
            None
        };

        Ok(Self {
            threshold,
            periods,
            min_population,
            window_length: settings.window_length,
        })
    }
}
