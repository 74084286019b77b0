//! USGA-style handicap arithmetic.
//!
//! A round's differential is `(adjusted score - course rating) * 113 / slope`.
//! Nine-hole rounds count their score twice against the full course rating;
//! rounds covering neither nine nor a full eighteen holes carry no
//! differential at all, since a partial score compared against the full
//! rating is meaningless. The handicap index averages the best half of the
//! most recent 20 differentials.

/// How many rounds back the index looks.
pub const ROUND_WINDOW: usize = 20;

const STANDARD_SLOPE: f64 = 113.0;

/// Differential for a single round. `None` when the tee carries no usable
/// slope rating or the round is a partial scorecard (anything other than
/// exactly nine or at least eighteen holes).
pub fn differential(
    total_strokes: i64,
    holes_played: i64,
    course_rating: f64,
    slope_rating: i32,
) -> Option<f64> {
    if slope_rating <= 0 {
        return None;
    }
    let adjusted = match holes_played {
        9 => (total_strokes * 2) as f64,
        n if n >= 18 => total_strokes as f64,
        _ => return None,
    };
    Some((adjusted - course_rating) * STANDARD_SLOPE / slope_rating as f64)
}

/// Handicap index over differentials ordered newest first. Averages the best
/// half (rounded up, so one round still yields an index) of the last
/// [`ROUND_WINDOW`] rounds. `None` without any differential.
pub fn handicap_index(differentials_newest_first: &[f64]) -> Option<f64> {
    if differentials_newest_first.is_empty() {
        return None;
    }
    let mut window: Vec<f64> = differentials_newest_first
        .iter()
        .take(ROUND_WINDOW)
        .copied()
        .collect();
    window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let take = window.len().div_ceil(2).max(1);
    let sum: f64 = window.iter().take(take).sum();
    Some(round1(sum / take as f64))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eighteen_hole_differential_uses_raw_score() {
        // (90 - 71.5) * 113 / 128
        let d = differential(90, 18, 71.5, 128).unwrap();
        assert!((d - 16.332).abs() < 0.01);
    }

    #[test]
    fn nine_hole_differential_doubles_score() {
        // Doubled 45 -> 90 against the full rating.
        let nine = differential(45, 9, 71.5, 128).unwrap();
        let eighteen = differential(90, 18, 71.5, 128).unwrap();
        assert!((nine - eighteen).abs() < f64::EPSILON);
    }

    #[test]
    fn neutral_slope_reduces_to_score_minus_rating() {
        let d = differential(85, 18, 70.0, 113).unwrap();
        assert!((d - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_slope_yields_none() {
        assert!(differential(90, 18, 71.5, 0).is_none());
        assert!(differential(90, 18, 71.5, -5).is_none());
        assert!(differential(0, 0, 71.5, 128).is_none());
    }

    #[test]
    fn partial_rounds_carry_no_differential() {
        // 12 of 18 holes at 60 strokes would land around -10 against the
        // full rating and dominate the best-half average.
        assert!(differential(60, 12, 71.5, 128).is_none());
        assert!(differential(20, 3, 71.5, 128).is_none());
        assert!(differential(50, 10, 71.5, 128).is_none());
        assert!(differential(80, 17, 71.5, 128).is_none());
    }

    #[test]
    fn single_round_yields_an_index() {
        assert_eq!(handicap_index(&[12.4]), Some(12.4));
    }

    #[test]
    fn index_averages_the_best_half() {
        // Best half of [10, 20, 14, 18] is [10, 14] -> 12.0
        assert_eq!(handicap_index(&[10.0, 20.0, 14.0, 18.0]), Some(12.0));
    }

    #[test]
    fn odd_count_rounds_half_up() {
        // Best 2 of [9, 15, 21] -> (9 + 15) / 2
        assert_eq!(handicap_index(&[21.0, 9.0, 15.0]), Some(12.0));
    }

    #[test]
    fn only_the_latest_twenty_count() {
        // 25 differentials: the newest 20 are all 10.0, the oldest five are 0.0
        // and must be ignored.
        let mut diffs = vec![10.0; 20];
        diffs.extend([0.0; 5]);
        assert_eq!(handicap_index(&diffs), Some(10.0));
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(handicap_index(&[]), None);
    }
}
