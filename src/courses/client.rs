use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::CourseApiConfig;

/// Course record as returned by the external course-data API.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseImport {
    pub id: i64,
    #[serde(default)]
    pub club_name: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub location: LocationImport,
    #[serde(default)]
    pub tees: TeeSetImport,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationImport {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Tees are grouped by gender upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeeSetImport {
    #[serde(default)]
    pub male: Vec<TeeImport>,
    #[serde(default)]
    pub female: Vec<TeeImport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeeImport {
    pub tee_name: String,
    #[serde(default)]
    pub course_rating: f64,
    #[serde(default = "default_slope")]
    pub slope_rating: i32,
    #[serde(default)]
    pub bogey_rating: f64,
    #[serde(default)]
    pub total_yards: i32,
    #[serde(default)]
    pub total_meters: i32,
    #[serde(default)]
    pub number_of_holes: i32,
    #[serde(default)]
    pub par_total: i32,
    #[serde(default)]
    pub front_course_rating: f64,
    #[serde(default)]
    pub front_slope_rating: i32,
    #[serde(default)]
    pub front_bogey_rating: f64,
    #[serde(default)]
    pub back_course_rating: f64,
    #[serde(default)]
    pub back_slope_rating: i32,
    #[serde(default)]
    pub back_bogey_rating: f64,
    #[serde(default)]
    pub holes: Vec<HoleImport>,
}

// Neutral slope per the rating system.
fn default_slope() -> i32 {
    113
}

/// Hole number is implied by position in the list.
#[derive(Debug, Clone, Deserialize)]
pub struct HoleImport {
    #[serde(default = "default_par")]
    pub par: i32,
    #[serde(default)]
    pub yardage: i32,
    #[serde(default)]
    pub handicap: i32,
}

fn default_par() -> i32 {
    4
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    courses: Vec<CourseImport>,
}

/// Thin client over the external course-data API.
pub struct CourseApiClient<'a> {
    http: &'a reqwest::Client,
    config: &'a CourseApiConfig,
}

impl<'a> CourseApiClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a CourseApiConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<CourseImport>> {
        let url = format!("{}/v1/search", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(&url)
            .query(&[("search_query", query)])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Key {}", self.config.api_key),
            )
            .send()
            .await
            .context("course api request failed")?
            .error_for_status()
            .context("course api returned an error status")?;

        let body: SearchResponse = resp.json().await.context("course api invalid payload")?;
        debug!(count = body.courses.len(), "course search results");
        Ok(body.courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_payload() {
        let raw = r#"{
            "courses": [{
                "id": 1404,
                "club_name": "Pinehill Golf Club",
                "course_name": "Lakes",
                "location": {
                    "address": "1 Clubhouse Dr",
                    "city": "Springfield",
                    "state": "OR",
                    "country": "United States",
                    "latitude": 44.05,
                    "longitude": -123.02
                },
                "tees": {
                    "male": [{
                        "tee_name": "Blue",
                        "course_rating": 71.4,
                        "slope_rating": 128,
                        "number_of_holes": 18,
                        "par_total": 72,
                        "holes": [
                            {"par": 4, "yardage": 402, "handicap": 7},
                            {"par": 3, "yardage": 188, "handicap": 15}
                        ]
                    }],
                    "female": []
                }
            }]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.courses.len(), 1);
        let course = &parsed.courses[0];
        assert_eq!(course.id, 1404);
        assert_eq!(course.location.city, "Springfield");
        assert_eq!(course.tees.male.len(), 1);
        assert_eq!(course.tees.male[0].holes[1].par, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let raw = r#"{"courses": [{"id": 7, "course_name": "Bare", "tees": {"male": [{"tee_name": "White"}]}}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        let tee = &parsed.courses[0].tees.male[0];
        assert_eq!(tee.slope_rating, 113);
        assert!(tee.holes.is_empty());
        assert_eq!(parsed.courses[0].location.latitude, 0.0);
    }

    #[test]
    fn empty_response_is_fine() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.courses.is_empty());
    }
}
