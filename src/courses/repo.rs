use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::courses::client::{CourseImport, TeeImport};

const COURSE_COLUMNS: &str = "id, external_id, club_name, course_name, address, city, state, \
     country, latitude, longitude, created_at, updated_at";

const TEE_COLUMNS: &str = "id, course_id, tee_name, gender, course_rating, slope_rating, \
     bogey_rating, total_yards, total_meters, number_of_holes, par_total, front_course_rating, \
     front_slope_rating, front_bogey_rating, back_course_rating, back_slope_rating, \
     back_bogey_rating, created_at, updated_at";

const HOLE_COLUMNS: &str = "id, tee_id, hole_number, par, yardage, handicap, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub external_id: i64,
    pub club_name: String,
    pub course_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tee {
    pub id: Uuid,
    pub course_id: Uuid,
    pub tee_name: String,
    pub gender: String,
    pub course_rating: f64,
    pub slope_rating: i32,
    pub bogey_rating: f64,
    pub total_yards: i32,
    pub total_meters: i32,
    pub number_of_holes: i32,
    pub par_total: i32,
    pub front_course_rating: f64,
    pub front_slope_rating: i32,
    pub front_bogey_rating: f64,
    pub back_course_rating: f64,
    pub back_slope_rating: i32,
    pub back_bogey_rating: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hole {
    pub id: Uuid,
    pub tee_id: Uuid,
    pub hole_number: i32,
    pub par: i32,
    pub yardage: i32,
    pub handicap: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Course {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_name"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Course>> {
        let row = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_external_id(db: &PgPool, external_id: i64) -> anyhow::Result<Option<Course>> {
        let row = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Cache a course fetched from the external API.
    ///
    /// For a known course only the descriptive fields are refreshed; tees and
    /// holes are kept as-is because rounds reference them. A brand-new course
    /// gets its full tee and hole tree inserted in one transaction.
    pub async fn upsert_imported(db: &PgPool, import: &CourseImport) -> anyhow::Result<Course> {
        if let Some(existing) = Self::find_by_external_id(db, import.id).await? {
            let course = sqlx::query_as::<_, Course>(&format!(
                r#"
                UPDATE courses SET
                    club_name = $2, course_name = $3, address = $4, city = $5,
                    state = $6, country = $7, latitude = $8, longitude = $9,
                    updated_at = now()
                WHERE id = $1
                RETURNING {COURSE_COLUMNS}
                "#
            ))
            .bind(existing.id)
            .bind(&import.club_name)
            .bind(&import.course_name)
            .bind(&import.location.address)
            .bind(&import.location.city)
            .bind(&import.location.state)
            .bind(&import.location.country)
            .bind(import.location.latitude)
            .bind(import.location.longitude)
            .fetch_one(db)
            .await?;
            return Ok(course);
        }

        let mut tx = db.begin().await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (external_id, club_name, course_name, address, city, state,
                                 country, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(import.id)
        .bind(&import.club_name)
        .bind(&import.course_name)
        .bind(&import.location.address)
        .bind(&import.location.city)
        .bind(&import.location.state)
        .bind(&import.location.country)
        .bind(import.location.latitude)
        .bind(import.location.longitude)
        .fetch_one(&mut *tx)
        .await?;

        for (gender, tees) in [("M", &import.tees.male), ("F", &import.tees.female)] {
            for tee in tees {
                insert_tee(&mut tx, course.id, gender, tee).await?;
            }
        }

        tx.commit().await?;
        info!(course_id = %course.id, external_id = import.id, "course cached");
        Ok(course)
    }
}

async fn insert_tee(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    course_id: Uuid,
    gender: &str,
    tee: &TeeImport,
) -> anyhow::Result<()> {
    let number_of_holes = if tee.number_of_holes > 0 {
        tee.number_of_holes
    } else {
        tee.holes.len() as i32
    };

    let tee_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO tees (course_id, tee_name, gender, course_rating, slope_rating, bogey_rating,
                          total_yards, total_meters, number_of_holes, par_total,
                          front_course_rating, front_slope_rating, front_bogey_rating,
                          back_course_rating, back_slope_rating, back_bogey_rating)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id
        "#,
    )
    .bind(course_id)
    .bind(&tee.tee_name)
    .bind(gender)
    .bind(tee.course_rating)
    .bind(tee.slope_rating)
    .bind(tee.bogey_rating)
    .bind(tee.total_yards)
    .bind(tee.total_meters)
    .bind(number_of_holes)
    .bind(tee.par_total)
    .bind(tee.front_course_rating)
    .bind(tee.front_slope_rating)
    .bind(tee.front_bogey_rating)
    .bind(tee.back_course_rating)
    .bind(tee.back_slope_rating)
    .bind(tee.back_bogey_rating)
    .fetch_one(&mut **tx)
    .await?;

    for (idx, hole) in tee.holes.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO holes (tee_id, hole_number, par, yardage, handicap)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(tee_id)
        .bind((idx + 1) as i32)
        .bind(hole.par)
        .bind(hole.yardage)
        .bind(hole.handicap)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

impl Tee {
    pub async fn list_for_course(db: &PgPool, course_id: Uuid) -> anyhow::Result<Vec<Tee>> {
        let rows = sqlx::query_as::<_, Tee>(&format!(
            "SELECT {TEE_COLUMNS} FROM tees WHERE course_id = $1 ORDER BY tee_name"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Tee>> {
        let row = sqlx::query_as::<_, Tee>(&format!("SELECT {TEE_COLUMNS} FROM tees WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }
}

impl Hole {
    pub async fn list_for_tee(db: &PgPool, tee_id: Uuid) -> anyhow::Result<Vec<Hole>> {
        let rows = sqlx::query_as::<_, Hole>(&format!(
            "SELECT {HOLE_COLUMNS} FROM holes WHERE tee_id = $1 ORDER BY hole_number"
        ))
        .bind(tee_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
