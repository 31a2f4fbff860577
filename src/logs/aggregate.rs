//! Per-day derivations over a set of log entries.
//!
//! Everything here is a pure function of its input. Values keep full
//! precision; rounding only happens in the display helpers at the bottom.

use std::{collections::BTreeMap, ops::Add};

use serde::{Deserialize, Serialize};
use time::Date;

use super::day::format_calendar_date;
use super::dto::{LogEntry, MealType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub protein: f64,
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
            protein: self.protein + rhs.protein,
        }
    }
}

impl From<&LogEntry> for NutritionTotals {
    fn from(e: &LogEntry) -> Self {
        Self {
            calories: e.calories,
            carbs: e.carbs,
            fat: e.fat,
            fiber: e.fiber,
            protein: e.protein,
        }
    }
}

/// Fixed daily targets. Only used to express progress as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub protein: f64,
}

pub const DAILY_GOALS: DailyGoals = DailyGoals {
    calories: 2200.0,
    carbs: 275.0,
    fat: 70.0,
    fiber: 30.0,
    protein: 110.0,
};

/// Sums every nutrition field independently. Empty input gives zeros.
pub fn aggregate<'a, I>(entries: I) -> NutritionTotals
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    entries
        .into_iter()
        .map(NutritionTotals::from)
        .fold(NutritionTotals::default(), Add::add)
}

/// Stable partition by meal type. All four meal types are always present.
pub fn bucket_by_meal(entries: &[LogEntry]) -> BTreeMap<MealType, Vec<LogEntry>> {
    let mut buckets: BTreeMap<MealType, Vec<LogEntry>> =
        MealType::ALL.into_iter().map(|m| (m, Vec::new())).collect();
    for entry in entries {
        buckets.entry(entry.meal_type).or_default().push(entry.clone());
    }
    buckets
}

/// Macro progress, capped at 100.
pub fn percent_of_goal(total: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        (total / goal * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Calorie progress. Unlike macros this is not capped and may exceed 100.
pub fn calorie_percent(total: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        total / goal * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub protein: f64,
}

impl DailyProgress {
    pub fn from_totals(totals: &NutritionTotals, goals: &DailyGoals) -> Self {
        Self {
            calories: calorie_percent(totals.calories, goals.calories),
            carbs: percent_of_goal(totals.carbs, goals.carbs),
            fat: percent_of_goal(totals.fat, goals.fat),
            fiber: percent_of_goal(totals.fiber, goals.fiber),
            protein: percent_of_goal(totals.protein, goals.protein),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub totals: NutritionTotals,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// `YYYY-MM-DD`
    pub date: String,
    pub totals: NutritionTotals,
    pub goals: DailyGoals,
    pub progress: DailyProgress,
    pub meals: BTreeMap<MealType, MealSummary>,
}

impl DailySummary {
    pub fn for_day(date: Date, entries: &[LogEntry]) -> Self {
        let totals = aggregate(entries);
        let meals = bucket_by_meal(entries)
            .into_iter()
            .map(|(meal, entries)| {
                let totals = aggregate(&entries);
                (meal, MealSummary { totals, entries })
            })
            .collect();

        Self {
            date: format_calendar_date(date),
            totals,
            goals: DAILY_GOALS,
            progress: DailyProgress::from_totals(&totals, &DAILY_GOALS),
            meals,
        }
    }
}

/// One decimal place, for nutrition figures.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_tenth(value: f64) -> String {
    format!("{:.1}", round_tenth(value))
}
