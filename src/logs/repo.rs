use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::LogStoreError;

use super::{
    day::{truncate_to_millis, utc_day_bounds},
    dto::{LogEntry, LogEntryInput, MealType},
};

/// Durable collection of log entries.
///
/// There is a single implicit user. Scoping by owner would add an owner id
/// to `LogEntry` and to every method here.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Validates `input`, assigns `id` and `created_at`, and stores it.
    async fn insert(&self, input: LogEntryInput) -> Result<LogEntry, LogStoreError>;

    /// Entries whose `log_date` falls on `date` (UTC), ascending `created_at`.
    async fn find_by_date(&self, date: Date) -> Result<Vec<LogEntry>, LogStoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), LogStoreError>;
}

#[derive(Debug, FromRow)]
struct LogRow {
    id: Uuid,
    food_name: String,
    serving_size: String,
    quantity: f64,
    calories: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    protein: f64,
    meal_type: String,
    log_date: OffsetDateTime,
    created_at: OffsetDateTime,
}

impl TryFrom<LogRow> for LogEntry {
    type Error = LogStoreError;

    fn try_from(r: LogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            food_name: r.food_name,
            serving_size: r.serving_size,
            quantity: r.quantity,
            calories: r.calories,
            carbs: r.carbs,
            fat: r.fat,
            fiber: r.fiber,
            protein: r.protein,
            meal_type: r.meal_type.parse::<MealType>()?,
            log_date: r.log_date,
            created_at: r.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgLogStore {
    db: PgPool,
}

impl PgLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn insert(&self, input: LogEntryInput) -> Result<LogEntry, LogStoreError> {
        let now = truncate_to_millis(OffsetDateTime::now_utc());
        let new = input.validate(now)?;

        let row = sqlx::query_as::<_, LogRow>(
            r#"
            INSERT INTO food_logs (id, food_name, serving_size, quantity, calories, carbs,
                                   fat, fiber, protein, meal_type, log_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, food_name, serving_size, quantity, calories, carbs,
                      fat, fiber, protein, meal_type, log_date, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.food_name)
        .bind(&new.serving_size)
        .bind(new.quantity)
        .bind(new.calories)
        .bind(new.carbs)
        .bind(new.fat)
        .bind(new.fiber)
        .bind(new.protein)
        .bind(new.meal_type.as_str())
        .bind(new.log_date)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn find_by_date(&self, date: Date) -> Result<Vec<LogEntry>, LogStoreError> {
        let (start, end) = utc_day_bounds(date);
        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT id, food_name, serving_size, quantity, calories, carbs,
                   fat, fiber, protein, meal_type, log_date, created_at
              FROM food_logs
             WHERE log_date >= $1 AND log_date <= $2
             ORDER BY created_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        debug!(%date, rows = rows.len(), "food logs by date");
        rows.into_iter().map(LogEntry::try_from).collect()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), LogStoreError> {
        let result = sqlx::query("DELETE FROM food_logs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LogStoreError::NotFound(id));
        }
        Ok(())
    }
}
