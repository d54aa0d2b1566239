//! Travel-time estimation: live distance-matrix adapter plus fallback.
//!
//! The adapter issues one driving-mode "depart now" query per leg and fails
//! closed: any problem at all resolves to `None` and the caller substitutes
//! the haversine fallback. No retries, bounded timeout.

use serde::Deserialize;

use crate::sequencer::haversine_km;
use crate::traits::TravelTimeProvider;

/// Assumed average driving speed for the fallback estimate.
pub const FALLBACK_SPEED_KMH: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub base_url: String,
    /// Unset means the live path is unconfigured and every query resolves
    /// to `None`.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/distancematrix/json".to_string(),
            api_key: None,
            timeout_secs: 5,
        }
    }
}

/// Blocking HTTP client for a Google-style distance matrix endpoint.
#[derive(Debug, Clone)]
pub struct MatrixClient {
    config: MatrixConfig,
    client: reqwest::blocking::Client,
}

impl MatrixClient {
    pub fn new(config: MatrixConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl TravelTimeProvider for MatrixClient {
    fn duration_minutes(&self, origin: (f64, f64), destination: (f64, f64)) -> Option<i64> {
        let api_key = self.config.api_key.as_deref()?;

        let url = format!(
            "{}?origins={:.6},{:.6}&destinations={:.6},{:.6}&mode=driving&departure_time=now&key={}",
            self.config.base_url, origin.0, origin.1, destination.0, destination.1, api_key
        );

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<MatrixResponse>());

        match response {
            Ok(body) => first_duration_minutes(body),
            Err(err) => {
                tracing::warn!(error = %err, "distance matrix query failed");
                None
            }
        }
    }
}

/// Duration of the first element of the first row, rounded to the nearest
/// minute. Plain `duration` wins over `duration_in_traffic`.
fn first_duration_minutes(body: MatrixResponse) -> Option<i64> {
    let element = body
        .rows
        .unwrap_or_default()
        .into_iter()
        .next()?
        .elements
        .unwrap_or_default()
        .into_iter()
        .next()?;
    let seconds = element.duration.or(element.duration_in_traffic)?.value;
    Some((seconds / 60.0).round() as i64)
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    rows: Option<Vec<MatrixRow>>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Option<Vec<MatrixElement>>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    duration: Option<DurationValue>,
    duration_in_traffic: Option<DurationValue>,
}

#[derive(Debug, Deserialize)]
struct DurationValue {
    value: f64,
}

/// Straight-line estimate at `FALLBACK_SPEED_KMH`, rounded to the nearest
/// whole minute.
pub fn fallback_minutes(origin: (f64, f64), destination: (f64, f64)) -> i64 {
    let km = haversine_km(origin, destination);
    (km / FALLBACK_SPEED_KMH * 60.0).round() as i64
}

/// Best available estimate for one leg: the live provider when it answers,
/// the haversine fallback otherwise.
pub fn estimate_minutes(
    provider: &dyn TravelTimeProvider,
    origin: (f64, f64),
    destination: (f64, f64),
) -> i64 {
    provider.duration_minutes(origin, destination).unwrap_or_else(|| {
        tracing::debug!(?origin, ?destination, "no live estimate, using haversine fallback");
        fallback_minutes(origin, destination)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NoLiveTraffic;

    #[test]
    fn fallback_for_one_degree_of_latitude() {
        // ~111.2 km at 30 km/h.
        assert_eq!(fallback_minutes((0.0, 0.0), (1.0, 0.0)), 222);
    }

    #[test]
    fn fallback_for_same_point_is_zero() {
        assert_eq!(fallback_minutes((36.1, -115.1), (36.1, -115.1)), 0);
    }

    #[test]
    fn unconfigured_client_returns_none() {
        let client = MatrixClient::new(MatrixConfig::default()).unwrap();
        assert_eq!(client.duration_minutes((0.0, 0.0), (1.0, 0.0)), None);
    }

    #[test]
    fn estimate_substitutes_fallback_when_provider_is_silent() {
        assert_eq!(estimate_minutes(&NoLiveTraffic, (0.0, 0.0), (1.0, 0.0)), 222);
    }

    #[test]
    fn parses_first_element_duration() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"rows":[{"elements":[{"duration":{"value":1234.0}}]}]}"#,
        )
        .unwrap();
        // 1234 s = 20.57 min, rounds to 21.
        assert_eq!(first_duration_minutes(body), Some(21));
    }

    #[test]
    fn falls_back_to_traffic_duration() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"rows":[{"elements":[{"duration_in_traffic":{"value":600.0}}]}]}"#,
        )
        .unwrap();
        assert_eq!(first_duration_minutes(body), Some(10));
    }

    #[test]
    fn empty_rows_mean_unknown() {
        let body: MatrixResponse = serde_json::from_str(r#"{"rows":[]}"#).unwrap();
        assert_eq!(first_duration_minutes(body), None);

        let body: MatrixResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(first_duration_minutes(body), None);
    }

    #[test]
    fn element_without_duration_means_unknown() {
        let body: MatrixResponse =
            serde_json::from_str(r#"{"rows":[{"elements":[{}]}]}"#).unwrap();
        assert_eq!(first_duration_minutes(body), None);
    }
}
