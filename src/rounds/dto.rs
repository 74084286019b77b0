use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::rounds::repo::{RoundWithContext, ScoredHole};
use crate::rounds::scoring::RoundSummary;

/// One hole of a submitted scorecard. A missing or unknown `hole_id` gets the
/// entry skipped, not the whole submission.
#[derive(Debug, Clone, Deserialize)]
pub struct HoleScoreEntry {
    #[serde(default)]
    pub hole_id: Option<Uuid>,
    pub strokes: i32,
    #[serde(default)]
    pub putts: i32,
    #[serde(default)]
    pub fairway_hit: bool,
    #[serde(default)]
    pub green_in_regulation: bool,
    #[serde(default)]
    pub penalties: i32,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRoundRequest {
    pub tee_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_played: Option<OffsetDateTime>,
    pub hole_scores: Vec<HoleScoreEntry>,
}

/// PUT body: notes and/or a full replacement scorecard.
#[derive(Debug, Deserialize)]
pub struct UpdateRoundRequest {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub hole_scores: Option<Vec<HoleScoreEntry>>,
}

#[derive(Debug, Serialize)]
pub struct RoundResponse {
    pub id: Uuid,
    pub player_id: Uuid,
    pub course_id: Uuid,
    pub tee_id: Uuid,
    pub course_name: String,
    pub club_name: String,
    pub tee_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_played: OffsetDateTime,
    pub notes: String,
    pub is_complete: bool,
    pub summary: RoundSummary,
    /// USGA-style handicap differential for this round, when computable.
    pub differential: Option<f64>,
    /// How many submitted entries were dropped for an unknown hole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_entries: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RoundDetails {
    #[serde(flatten)]
    pub round: RoundResponse,
    pub hole_scores: Vec<ScoredHole>,
}

impl RoundResponse {
    pub fn build(round: RoundWithContext, scores: &[ScoredHole]) -> Self {
        let summary = RoundSummary::from_scores(scores);
        let differential = crate::stats::handicap::differential(
            summary.total_score,
            summary.holes_played,
            round.course_rating,
            round.slope_rating,
        );
        Self {
            id: round.id,
            player_id: round.player_id,
            course_id: round.course_id,
            tee_id: round.tee_id,
            course_name: round.course_name,
            club_name: round.club_name,
            tee_name: round.tee_name,
            date_played: round.date_played,
            notes: round.notes,
            is_complete: round.is_complete,
            summary,
            differential,
            skipped_entries: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn context() -> RoundWithContext {
        RoundWithContext {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            tee_id: Uuid::new_v4(),
            date_played: OffsetDateTime::now_utc(),
            notes: String::new(),
            is_complete: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            course_name: "Lakes".into(),
            club_name: "Pinehill".into(),
            tee_name: "Blue".into(),
            course_rating: 71.5,
            slope_rating: 128,
            number_of_holes: 18,
        }
    }

    #[test]
    fn skipped_entries_appear_only_when_set() {
        let mut response = RoundResponse::build(context(), &[]);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("skipped_entries").is_none());

        response.skipped_entries = Some(2);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["skipped_entries"], 2);
    }
}
