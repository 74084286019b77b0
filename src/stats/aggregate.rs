use serde::Serialize;
use uuid::Uuid;

use crate::stats::handicap::{differential, handicap_index};
use crate::stats::repo::PlayerRoundRow;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    pub player_id: Uuid,
    pub username: String,
    pub rounds_played: usize,
    pub holes_played: i64,
    pub avg_score: Option<f64>,
    pub best_score: Option<i64>,
    pub handicap_index: Option<f64>,
    pub gir_percent: f64,
    pub fairway_percent: f64,
    pub avg_putts_per_round: Option<f64>,
    pub avg_penalties_per_round: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: Uuid,
    pub username: String,
    pub rounds_played: usize,
    pub avg_score: f64,
    pub handicap_index: Option<f64>,
    pub gir_percent: f64,
    pub fairway_percent: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn differentials(rows: &[PlayerRoundRow]) -> Vec<f64> {
    rows.iter()
        .filter_map(|r| {
            differential(
                r.total_strokes,
                r.holes_played,
                r.course_rating,
                r.slope_rating,
            )
        })
        .collect()
}

/// Aggregate one player's rounds (rows newest first) into their stat line.
pub fn player_stats(player_id: Uuid, username: &str, rows: &[PlayerRoundRow]) -> PlayerStats {
    let rounds_played = rows.len();
    let holes_played: i64 = rows.iter().map(|r| r.holes_played).sum();
    let total_strokes: i64 = rows.iter().map(|r| r.total_strokes).sum();
    let girs: i64 = rows.iter().map(|r| r.girs).sum();
    let fairways: i64 = rows.iter().map(|r| r.fairways).sum();
    let putts: i64 = rows.iter().map(|r| r.total_putts).sum();
    let penalties: i64 = rows.iter().map(|r| r.total_penalties).sum();

    let per_round = |v: i64| {
        if rounds_played == 0 {
            None
        } else {
            Some(round2(v as f64 / rounds_played as f64))
        }
    };
    let pct = |hits: i64| {
        if holes_played == 0 {
            0.0
        } else {
            round2(hits as f64 / holes_played as f64 * 100.0)
        }
    };

    PlayerStats {
        player_id,
        username: username.to_string(),
        rounds_played,
        holes_played,
        avg_score: per_round(total_strokes),
        best_score: rows.iter().map(|r| r.total_strokes).min(),
        handicap_index: handicap_index(&differentials(rows)),
        gir_percent: pct(girs),
        fairway_percent: pct(fairways),
        avg_putts_per_round: per_round(putts),
        avg_penalties_per_round: per_round(penalties),
    }
}

/// Collapse per-round rows (grouped by player) into a leaderboard ordered by
/// average score, lowest first. Ties keep username order for stability.
pub fn rank_leaderboard(rows: &[PlayerRoundRow]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    let mut idx = 0;
    while idx < rows.len() {
        let player_id = rows[idx].player_id;
        let start = idx;
        while idx < rows.len() && rows[idx].player_id == player_id {
            idx += 1;
        }
        let player_rows = &rows[start..idx];
        let stats = player_stats(player_id, &player_rows[0].username, player_rows);
        if let Some(avg_score) = stats.avg_score {
            entries.push(LeaderboardEntry {
                rank: 0,
                player_id,
                username: stats.username,
                rounds_played: stats.rounds_played,
                avg_score,
                handicap_index: stats.handicap_index,
                gir_percent: stats.gir_percent,
                fairway_percent: stats.fairway_percent,
            });
        }
    }

    entries.sort_by(|a, b| {
        a.avg_score
            .partial_cmp(&b.avg_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.username.cmp(&b.username))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn row(player: Uuid, name: &str, strokes: i64, holes: i64) -> PlayerRoundRow {
        PlayerRoundRow {
            player_id: player,
            username: name.into(),
            round_id: Uuid::new_v4(),
            date_played: OffsetDateTime::now_utc(),
            total_strokes: strokes,
            holes_played: holes,
            total_putts: 30,
            total_penalties: 2,
            girs: 6,
            fairways: 7,
            course_rating: 71.5,
            slope_rating: 128,
        }
    }

    #[test]
    fn stats_average_over_rounds() {
        let p = Uuid::new_v4();
        let rows = vec![row(p, "ada", 90, 18), row(p, "ada", 84, 18)];
        let stats = player_stats(p, "ada", &rows);
        assert_eq!(stats.rounds_played, 2);
        assert_eq!(stats.avg_score, Some(87.0));
        assert_eq!(stats.best_score, Some(84));
        assert_eq!(stats.avg_putts_per_round, Some(30.0));
        assert!(stats.handicap_index.is_some());
    }

    #[test]
    fn stats_for_no_rounds_are_empty() {
        let p = Uuid::new_v4();
        let stats = player_stats(p, "ada", &[]);
        assert_eq!(stats.rounds_played, 0);
        assert_eq!(stats.avg_score, None);
        assert_eq!(stats.best_score, None);
        assert_eq!(stats.handicap_index, None);
        assert_eq!(stats.gir_percent, 0.0);
    }

    #[test]
    fn gir_percent_spans_all_holes() {
        let p = Uuid::new_v4();
        // 6 GIRs per 18-hole round, two rounds: 12/36
        let rows = vec![row(p, "ada", 90, 18), row(p, "ada", 88, 18)];
        let stats = player_stats(p, "ada", &rows);
        assert_eq!(stats.gir_percent, 33.33);
    }

    #[test]
    fn leaderboard_is_sorted_by_average_ascending() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            row(a, "high", 101, 18),
            row(a, "high", 99, 18),
            row(b, "low", 80, 18),
            row(c, "mid", 90, 18),
        ];
        let board = rank_leaderboard(&rows);
        assert_eq!(board.len(), 3);
        let avgs: Vec<f64> = board.iter().map(|e| e.avg_score).collect();
        assert!(avgs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(board[0].username, "low");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].username, "high");
        assert_eq!(board[2].rounds_played, 2);
    }

    #[test]
    fn leaderboard_ties_fall_back_to_username() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![row(a, "zed", 90, 18), row(b, "amy", 90, 18)];
        let board = rank_leaderboard(&rows);
        assert_eq!(board[0].username, "amy");
        assert_eq!(board[1].username, "zed");
    }

    #[test]
    fn empty_rows_give_empty_board() {
        assert!(rank_leaderboard(&[]).is_empty());
    }
}
