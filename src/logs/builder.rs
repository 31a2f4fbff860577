use crate::foods::FoodReference;

use super::{
    aggregate::NutritionTotals,
    dto::{LogEntryInput, MealType, MIN_QUANTITY},
};

pub const SERVING_SIZE: &str = "1 serving";

/// Quantities below the minimum, NaN or infinite are coerced to 0.5 rather than rejected.
pub fn clamp_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() {
        quantity.max(MIN_QUANTITY)
    } else {
        MIN_QUANTITY
    }
}

/// Same coercion for raw text from a quantity field.
pub fn parse_quantity(raw: &str) -> f64 {
    clamp_quantity(raw.trim().parse::<f64>().unwrap_or(f64::NAN))
}

/// Per-serving values scaled by the (clamped) quantity, at full precision.
/// Negative or NaN per-serving figures count as 0.
pub fn preview(reference: &FoodReference, quantity: f64) -> NutritionTotals {
    let q = clamp_quantity(quantity);
    let scale = |per_serving: f64| per_serving.max(0.0) * q;
    NutritionTotals {
        calories: scale(reference.calories_per_serving),
        carbs: scale(reference.carbs_per_serving),
        fat: scale(reference.fat_per_serving),
        fiber: scale(reference.fiber_per_serving),
        protein: scale(reference.protein_per_serving),
    }
}

/// Derives the creation payload for `quantity` servings of `reference`.
pub fn build(reference: &FoodReference, quantity: f64, meal_type: MealType) -> LogEntryInput {
    let quantity = clamp_quantity(quantity);
    let scaled = preview(reference, quantity);
    LogEntryInput {
        food_name: Some(reference.name.clone()),
        serving_size: Some(SERVING_SIZE.to_string()),
        quantity: Some(quantity),
        calories: Some(scaled.calories),
        carbs: Some(scaled.carbs),
        fat: Some(scaled.fat),
        fiber: Some(scaled.fiber),
        protein: Some(scaled.protein),
        meal_type: Some(meal_type.to_string()),
        log_date: None,
    }
}
