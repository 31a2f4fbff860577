//! Dashboard state held by a client.
//!
//! [`DashboardState`] is a plain value. Views receive it by reference and every
//! update returns a new state, so there is no ambient shared context.

use time::{macros::format_description, Date, Duration};
use uuid::Uuid;

use crate::foods::FoodReference;
use crate::logs::{
    aggregate::{aggregate, calorie_percent, format_tenth, percent_of_goal, DailySummary, DAILY_GOALS},
    builder::{parse_quantity, preview},
    LogEntry,
};

pub const FETCH_FAILED: &str = "Failed to fetch logs.";
pub const SAVE_FAILED: &str = "Failed to save log. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub selected_date: Date,
    pub logs: Vec<LogEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// One macro progress bar: rounded figures, capped percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroBar {
    pub label: &'static str,
    pub current: i64,
    pub goal: i64,
    pub percent: f64,
}

/// The calorie ring: rounded total and an uncapped percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieRing {
    pub calories: i64,
    pub goal: i64,
    pub percent: f64,
}

/// Nutrition summary shown in the add-food form before anything is logged.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionPreview {
    pub quantity: f64,
    pub calories: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
    pub protein: String,
}

/// Coerces the typed quantity and scales `reference` by it.
pub fn nutrition_preview(reference: &FoodReference, raw_quantity: &str) -> NutritionPreview {
    let quantity = parse_quantity(raw_quantity);
    let t = preview(reference, quantity);
    NutritionPreview {
        quantity,
        calories: format_tenth(t.calories),
        carbs: format_tenth(t.carbs),
        fat: format_tenth(t.fat),
        fiber: format_tenth(t.fiber),
        protein: format_tenth(t.protein),
    }
}

impl DashboardState {
    pub fn new(today: Date) -> Self {
        Self {
            selected_date: today,
            logs: Vec::new(),
            is_loading: false,
            error: None,
        }
    }

    pub fn with_date(&self, date: Date) -> Self {
        Self {
            selected_date: date,
            ..self.clone()
        }
    }

    pub fn shift_date(&self, days: i64) -> Self {
        let date = self
            .selected_date
            .checked_add(Duration::days(days))
            .unwrap_or(self.selected_date);
        self.with_date(date)
    }

    pub fn fetch_started(&self) -> Self {
        Self {
            is_loading: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn fetch_succeeded(&self, logs: Vec<LogEntry>) -> Self {
        Self {
            logs,
            is_loading: false,
            error: None,
            ..self.clone()
        }
    }

    /// A failed fetch empties the list.
    pub fn fetch_failed(&self) -> Self {
        Self {
            logs: Vec::new(),
            is_loading: false,
            error: Some(FETCH_FAILED.into()),
            ..self.clone()
        }
    }

    pub fn log_deleted(&self, id: Uuid) -> Self {
        Self {
            logs: self.logs.iter().filter(|l| l.id != id).cloned().collect(),
            ..self.clone()
        }
    }

    /// The list is left as it was.
    pub fn save_failed(&self) -> Self {
        Self {
            error: Some(SAVE_FAILED.into()),
            ..self.clone()
        }
    }

    pub fn summary(&self) -> DailySummary {
        DailySummary::for_day(self.selected_date, &self.logs)
    }

    pub fn calorie_ring(&self) -> CalorieRing {
        let calories = aggregate(&self.logs).calories;
        CalorieRing {
            calories: calories.round() as i64,
            goal: DAILY_GOALS.calories.round() as i64,
            percent: calorie_percent(calories, DAILY_GOALS.calories),
        }
    }

    pub fn macro_bars(&self) -> [MacroBar; 4] {
        let t = aggregate(&self.logs);
        let bar = |label, current: f64, goal: f64| MacroBar {
            label,
            current: current.round() as i64,
            goal: goal.round() as i64,
            percent: percent_of_goal(current, goal),
        };
        [
            bar("Carbs", t.carbs, DAILY_GOALS.carbs),
            bar("Protein", t.protein, DAILY_GOALS.protein),
            bar("Fat", t.fat, DAILY_GOALS.fat),
            bar("Fiber", t.fiber, DAILY_GOALS.fiber),
        ]
    }

    /// "Today", "Yesterday", otherwise e.g. "Jun 15".
    pub fn date_label(&self, today: Date) -> String {
        if self.selected_date == today {
            return "Today".into();
        }
        if today.previous_day() == Some(self.selected_date) {
            return "Yesterday".into();
        }
        self.selected_date
            .format(format_description!("[month repr:short] [day padding:none]"))
            .unwrap_or_else(|_| self.selected_date.to_string())
    }
}
