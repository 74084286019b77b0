use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One played round collapsed to the numbers the stats layer needs.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRoundRow {
    pub player_id: Uuid,
    pub username: String,
    pub round_id: Uuid,
    pub date_played: OffsetDateTime,
    pub total_strokes: i64,
    pub holes_played: i64,
    pub total_putts: i64,
    pub total_penalties: i64,
    pub girs: i64,
    pub fairways: i64,
    pub course_rating: f64,
    pub slope_rating: i32,
}

const ROUND_ROW_QUERY: &str = r#"
    SELECT u.id AS player_id,
           u.username,
           r.id AS round_id,
           r.date_played,
           SUM(hs.strokes)::int8 AS total_strokes,
           COUNT(hs.id)::int8 AS holes_played,
           SUM(hs.putts)::int8 AS total_putts,
           SUM(hs.penalties)::int8 AS total_penalties,
           COUNT(*) FILTER (WHERE hs.green_in_regulation)::int8 AS girs,
           COUNT(*) FILTER (WHERE hs.fairway_hit)::int8 AS fairways,
           t.course_rating,
           t.slope_rating
    FROM users u
    JOIN rounds r ON r.player_id = u.id
    JOIN tees t ON t.id = r.tee_id
    JOIN hole_scores hs ON hs.round_id = r.id
    WHERE ($1::uuid IS NULL OR u.id = $1)
    GROUP BY u.id, u.username, r.id, r.date_played, t.course_rating, t.slope_rating
    ORDER BY u.id, r.date_played DESC
"#;

/// Round rows for one player, newest first.
pub async fn rounds_for_player(db: &PgPool, player_id: Uuid) -> anyhow::Result<Vec<PlayerRoundRow>> {
    let rows = sqlx::query_as::<_, PlayerRoundRow>(ROUND_ROW_QUERY)
        .bind(Some(player_id))
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Round rows for every player with at least one scored round, grouped by
/// player, newest round first within each player.
pub async fn rounds_for_all(db: &PgPool) -> anyhow::Result<Vec<PlayerRoundRow>> {
    let rows = sqlx::query_as::<_, PlayerRoundRow>(ROUND_ROW_QUERY)
        .bind(None::<Uuid>)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
