use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::rounds::dto::HoleScoreEntry;
use crate::rounds::repo::ScoredHole;

/// Derived per-round numbers, computed by summing the hole scores.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundSummary {
    pub holes_played: i64,
    pub total_score: i64,
    pub front_nine_score: i64,
    pub back_nine_score: i64,
    pub putt_total: i64,
    pub putts_per_hole: f64,
    pub penalties_total: i64,
    pub penalties_per_hole: f64,
    pub gir_percent: f64,
    pub fairway_percent: f64,
}

impl RoundSummary {
    pub fn from_scores(scores: &[ScoredHole]) -> Self {
        let holes_played = scores.len() as i64;
        let total_score: i64 = scores.iter().map(|s| s.strokes as i64).sum();
        let front_nine_score: i64 = scores
            .iter()
            .filter(|s| s.hole_number <= 9)
            .map(|s| s.strokes as i64)
            .sum();
        let back_nine_score: i64 = scores
            .iter()
            .filter(|s| s.hole_number > 9)
            .map(|s| s.strokes as i64)
            .sum();
        let putt_total: i64 = scores.iter().map(|s| s.putts as i64).sum();
        let penalties_total: i64 = scores.iter().map(|s| s.penalties as i64).sum();
        let girs = scores.iter().filter(|s| s.green_in_regulation).count();
        let fairways = scores.iter().filter(|s| s.fairway_hit).count();

        let per_hole = |v: i64| {
            if holes_played == 0 {
                0.0
            } else {
                round2(v as f64 / holes_played as f64)
            }
        };
        let percent = |hits: usize| {
            if holes_played == 0 {
                0.0
            } else {
                round2(hits as f64 / holes_played as f64 * 100.0)
            }
        };

        Self {
            holes_played,
            total_score,
            front_nine_score,
            back_nine_score,
            putt_total,
            putts_per_hole: per_hole(putt_total),
            penalties_total,
            penalties_per_hole: per_hole(penalties_total),
            gir_percent: percent(girs),
            fairway_percent: percent(fairways),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A scorecard entry that survived validation and refers to a real hole.
#[derive(Debug, Clone)]
pub struct ValidatedScore {
    pub hole_id: Uuid,
    pub strokes: i32,
    pub putts: i32,
    pub fairway_hit: bool,
    pub green_in_regulation: bool,
    pub penalties: i32,
}

/// Checks a submitted scorecard against the holes that exist on the tee.
///
/// Entries pointing at a missing or unknown hole are dropped, not fatal; the
/// second element of the result is how many were dropped. Impossible numbers
/// (no strokes, more putts than strokes, negative counts) reject the whole
/// submission.
pub fn validate_scorecard(
    entries: &[HoleScoreEntry],
    known_holes: &HashSet<Uuid>,
) -> Result<(Vec<ValidatedScore>, usize), String> {
    if entries.is_empty() {
        return Err("scorecard must contain at least one hole score".into());
    }

    let mut valid = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for entry in entries {
        let hole_id = match entry.hole_id {
            Some(id) if known_holes.contains(&id) => id,
            _ => {
                skipped += 1;
                continue;
            }
        };

        if entry.strokes < 1 {
            return Err("strokes must be at least 1".into());
        }
        if entry.putts < 0 || entry.penalties < 0 {
            return Err("putts and penalties cannot be negative".into());
        }
        if entry.putts > entry.strokes {
            return Err("putts cannot exceed strokes for a hole".into());
        }

        valid.push(ValidatedScore {
            hole_id,
            strokes: entry.strokes,
            putts: entry.putts,
            fairway_hit: entry.fairway_hit,
            green_in_regulation: entry.green_in_regulation,
            penalties: entry.penalties,
        });
    }

    if valid.is_empty() {
        return Err("no scorecard entry referenced a known hole".into());
    }

    Ok((valid, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(hole_number: i32, strokes: i32, putts: i32, fw: bool, gir: bool, pen: i32) -> ScoredHole {
        ScoredHole {
            id: Uuid::new_v4(),
            round_id: Uuid::new_v4(),
            hole_id: Uuid::new_v4(),
            hole_number,
            par: 4,
            strokes,
            putts,
            fairway_hit: fw,
            green_in_regulation: gir,
            penalties: pen,
        }
    }

    fn full_round() -> Vec<ScoredHole> {
        (1..=18)
            .map(|n| score(n, 4 + (n % 3), 2, n % 2 == 0, n % 3 == 0, i32::from(n == 9)))
            .collect()
    }

    #[test]
    fn total_equals_sum_of_strokes() {
        let scores = full_round();
        let expected: i64 = scores.iter().map(|s| s.strokes as i64).sum();
        let summary = RoundSummary::from_scores(&scores);
        assert_eq!(summary.total_score, expected);
    }

    #[test]
    fn front_plus_back_equals_total() {
        let summary = RoundSummary::from_scores(&full_round());
        assert_eq!(
            summary.front_nine_score + summary.back_nine_score,
            summary.total_score
        );
        assert_eq!(summary.holes_played, 18);
    }

    #[test]
    fn nine_hole_round_has_empty_back_nine() {
        let scores: Vec<_> = (1..=9).map(|n| score(n, 5, 2, false, false, 0)).collect();
        let summary = RoundSummary::from_scores(&scores);
        assert_eq!(summary.total_score, 45);
        assert_eq!(summary.front_nine_score, 45);
        assert_eq!(summary.back_nine_score, 0);
    }

    #[test]
    fn percentages_are_rounded_to_two_decimals() {
        // 1 GIR out of 3 holes -> 33.33
        let scores = vec![
            score(1, 4, 2, true, true, 0),
            score(2, 5, 2, false, false, 0),
            score(3, 4, 2, true, false, 0),
        ];
        let summary = RoundSummary::from_scores(&scores);
        assert_eq!(summary.gir_percent, 33.33);
        assert_eq!(summary.fairway_percent, 66.67);
        assert_eq!(summary.putts_per_hole, 2.0);
    }

    #[test]
    fn empty_scores_stay_at_zero() {
        let summary = RoundSummary::from_scores(&[]);
        assert_eq!(summary.total_score, 0);
        assert_eq!(summary.gir_percent, 0.0);
        assert_eq!(summary.putts_per_hole, 0.0);
    }

    fn entry(hole_id: Option<Uuid>, strokes: i32, putts: i32) -> HoleScoreEntry {
        HoleScoreEntry {
            hole_id,
            strokes,
            putts,
            fairway_hit: false,
            green_in_regulation: false,
            penalties: 0,
        }
    }

    #[test]
    fn unknown_hole_is_skipped_not_fatal() {
        let known: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let good = *known.iter().next().unwrap();
        let entries = vec![
            entry(Some(good), 4, 2),
            entry(Some(Uuid::new_v4()), 5, 2), // not on this tee
            entry(None, 5, 2),                 // missing hole_id
        ];
        let (valid, skipped) = validate_scorecard(&entries, &known).unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(skipped, 2);
        assert_eq!(valid[0].hole_id, good);
    }

    #[test]
    fn putts_exceeding_strokes_is_rejected() {
        let known: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let good = *known.iter().next().unwrap();
        let err = validate_scorecard(&[entry(Some(good), 3, 4)], &known).unwrap_err();
        assert!(err.contains("putts"));
    }

    #[test]
    fn zero_strokes_is_rejected() {
        let known: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let good = *known.iter().next().unwrap();
        assert!(validate_scorecard(&[entry(Some(good), 0, 0)], &known).is_err());
    }

    #[test]
    fn empty_scorecard_is_rejected() {
        let known = HashSet::new();
        assert!(validate_scorecard(&[], &known).is_err());
    }

    #[test]
    fn all_unknown_holes_is_rejected() {
        let known = HashSet::new();
        let entries = vec![entry(Some(Uuid::new_v4()), 4, 2)];
        assert!(validate_scorecard(&entries, &known).is_err());
    }
}
