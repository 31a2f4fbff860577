use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::LogStoreError;
use super::day::truncate_to_millis;

/// Meal slot a log entry is recorded against, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snacks => "Snacks",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = LogStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                LogStoreError::Validation(format!(
                    "mealType must be one of Breakfast, Lunch, Dinner, Snacks (got `{s}`)"
                ))
            })
    }
}

/// Creation payload for `POST /log`.
///
/// Every field is optional here so a missing one is reported by
/// [`LogEntryInput::validate`] with its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub log_date: Option<OffsetDateTime>,
}

/// A validated entry, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub food_name: String,
    pub serving_size: String,
    pub quantity: f64,
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub protein: f64,
    pub meal_type: MealType,
    pub log_date: OffsetDateTime,
}

pub const MIN_QUANTITY: f64 = 0.5;

impl LogEntryInput {
    /// Checks required fields and numeric minimums. `now` fills in a missing `logDate`.
    ///
    /// `logDate` is kept at millisecond precision.
    pub fn validate(self, now: OffsetDateTime) -> Result<NewLogEntry, LogStoreError> {
        let food_name = required(self.food_name, "foodName")?.trim().to_string();
        if food_name.is_empty() {
            return Err(LogStoreError::Validation("foodName must not be empty".into()));
        }

        let serving_size = required(self.serving_size, "servingSize")?;
        if serving_size.trim().is_empty() {
            return Err(LogStoreError::Validation("servingSize must not be empty".into()));
        }

        let quantity = at_least(required(self.quantity, "quantity")?, MIN_QUANTITY, "quantity")?;
        let meal_type = required(self.meal_type, "mealType")?.parse::<MealType>()?;

        Ok(NewLogEntry {
            food_name,
            serving_size,
            quantity,
            calories: at_least(required(self.calories, "calories")?, 0.0, "calories")?,
            carbs: at_least(required(self.carbs, "carbs")?, 0.0, "carbs")?,
            fat: at_least(required(self.fat, "fat")?, 0.0, "fat")?,
            fiber: at_least(required(self.fiber, "fiber")?, 0.0, "fiber")?,
            protein: at_least(required(self.protein, "protein")?, 0.0, "protein")?,
            meal_type,
            log_date: truncate_to_millis(self.log_date.unwrap_or(now)),
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, LogStoreError> {
    value.ok_or_else(|| LogStoreError::Validation(format!("{field} is required")))
}

fn at_least(value: f64, min: f64, field: &str) -> Result<f64, LogStoreError> {
    if !value.is_finite() {
        return Err(LogStoreError::Validation(format!("{field} must be a finite number")));
    }
    if value < min {
        return Err(LogStoreError::Validation(format!("{field} must be at least {min}")));
    }
    Ok(value)
}

/// A persisted food log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    pub food_name: String,
    pub serving_size: String,
    pub quantity: f64,
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub protein: f64,
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub log_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl LogEntry {
    pub fn from_new(id: Uuid, new: NewLogEntry, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            food_name: new.food_name,
            serving_size: new.serving_size,
            quantity: new.quantity,
            calories: new.calories,
            carbs: new.carbs,
            fat: new.fat,
            fiber: new.fiber,
            protein: new.protein,
            meal_type: new.meal_type,
            log_date: new.log_date,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}
