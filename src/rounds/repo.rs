use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::rounds::scoring::ValidatedScore;

const ROUND_CONTEXT_COLUMNS: &str = "r.id, r.player_id, r.course_id, r.tee_id, r.date_played, \
     r.notes, r.is_complete, r.created_at, r.updated_at, c.course_name, c.club_name, t.tee_name, \
     t.course_rating, t.slope_rating, t.number_of_holes";

/// A round joined with the course and tee context needed for summaries and
/// differentials.
#[derive(Debug, Clone, FromRow)]
pub struct RoundWithContext {
    pub id: Uuid,
    pub player_id: Uuid,
    pub course_id: Uuid,
    pub tee_id: Uuid,
    pub date_played: OffsetDateTime,
    pub notes: String,
    pub is_complete: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub course_name: String,
    pub club_name: String,
    pub tee_name: String,
    pub course_rating: f64,
    pub slope_rating: i32,
    pub number_of_holes: i32,
}

/// A hole score joined with the hole it was played on.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScoredHole {
    pub id: Uuid,
    pub round_id: Uuid,
    pub hole_id: Uuid,
    pub hole_number: i32,
    pub par: i32,
    pub strokes: i32,
    pub putts: i32,
    pub fairway_hit: bool,
    pub green_in_regulation: bool,
    pub penalties: i32,
}

pub struct Round;

impl Round {
    /// Insert a round and its hole scores in one transaction.
    pub async fn create(
        db: &PgPool,
        player_id: Uuid,
        course_id: Uuid,
        tee_id: Uuid,
        date_played: Option<OffsetDateTime>,
        notes: &str,
        is_complete: bool,
        scores: &[ValidatedScore],
    ) -> anyhow::Result<Uuid> {
        let mut tx = db.begin().await?;

        let round_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO rounds (player_id, course_id, tee_id, date_played, notes, is_complete)
            VALUES ($1, $2, $3, COALESCE($4, now()), $5, $6)
            RETURNING id
            "#,
        )
        .bind(player_id)
        .bind(course_id)
        .bind(tee_id)
        .bind(date_played)
        .bind(notes)
        .bind(is_complete)
        .fetch_one(&mut *tx)
        .await?;

        insert_scores(&mut tx, round_id, scores).await?;

        tx.commit().await?;
        Ok(round_id)
    }

    /// Replace a round's notes and, when given, its entire scorecard.
    pub async fn update(
        db: &PgPool,
        round_id: Uuid,
        notes: Option<&str>,
        is_complete: Option<bool>,
        scores: Option<&[ValidatedScore]>,
    ) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query(
            r#"
            UPDATE rounds SET
                notes = COALESCE($2, notes),
                is_complete = COALESCE($3, is_complete),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(round_id)
        .bind(notes)
        .bind(is_complete)
        .execute(&mut *tx)
        .await?;

        if let Some(scores) = scores {
            sqlx::query("DELETE FROM hole_scores WHERE round_id = $1")
                .bind(round_id)
                .execute(&mut *tx)
                .await?;
            insert_scores(&mut tx, round_id, scores).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_for_player(
        db: &PgPool,
        player_id: Uuid,
    ) -> anyhow::Result<Vec<RoundWithContext>> {
        let rows = sqlx::query_as::<_, RoundWithContext>(&format!(
            r#"
            SELECT {ROUND_CONTEXT_COLUMNS}
            FROM rounds r
            JOIN courses c ON c.id = r.course_id
            JOIN tees t ON t.id = r.tee_id
            WHERE r.player_id = $1
            ORDER BY r.date_played DESC
            "#
        ))
        .bind(player_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_for_player(
        db: &PgPool,
        player_id: Uuid,
        round_id: Uuid,
    ) -> anyhow::Result<Option<RoundWithContext>> {
        let row = sqlx::query_as::<_, RoundWithContext>(&format!(
            r#"
            SELECT {ROUND_CONTEXT_COLUMNS}
            FROM rounds r
            JOIN courses c ON c.id = r.course_id
            JOIN tees t ON t.id = r.tee_id
            WHERE r.id = $1 AND r.player_id = $2
            "#
        ))
        .bind(round_id)
        .bind(player_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn delete_for_player(
        db: &PgPool,
        player_id: Uuid,
        round_id: Uuid,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM rounds WHERE id = $1 AND player_id = $2")
            .bind(round_id)
            .bind(player_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn scores_for_round(db: &PgPool, round_id: Uuid) -> anyhow::Result<Vec<ScoredHole>> {
        let rows = sqlx::query_as::<_, ScoredHole>(
            r#"
            SELECT hs.id, hs.round_id, hs.hole_id, h.hole_number, h.par,
                   hs.strokes, hs.putts, hs.fairway_hit, hs.green_in_regulation, hs.penalties
            FROM hole_scores hs
            JOIN holes h ON h.id = hs.hole_id
            WHERE hs.round_id = $1
            ORDER BY h.hole_number
            "#,
        )
        .bind(round_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Scores for a batch of rounds in one query, for round listings.
    pub async fn scores_for_rounds(
        db: &PgPool,
        round_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ScoredHole>> {
        if round_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ScoredHole>(
            r#"
            SELECT hs.id, hs.round_id, hs.hole_id, h.hole_number, h.par,
                   hs.strokes, hs.putts, hs.fairway_hit, hs.green_in_regulation, hs.penalties
            FROM hole_scores hs
            JOIN holes h ON h.id = hs.hole_id
            WHERE hs.round_id = ANY($1)
            ORDER BY hs.round_id, h.hole_number
            "#,
        )
        .bind(round_ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

async fn insert_scores(
    tx: &mut Transaction<'_, Postgres>,
    round_id: Uuid,
    scores: &[ValidatedScore],
) -> anyhow::Result<()> {
    for s in scores {
        sqlx::query(
            r#"
            INSERT INTO hole_scores (round_id, hole_id, strokes, putts, fairway_hit,
                                     green_in_regulation, penalties)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(round_id)
        .bind(s.hole_id)
        .bind(s.strokes)
        .bind(s.putts)
        .bind(s.fairway_hit)
        .bind(s.green_in_regulation)
        .bind(s.penalties)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
