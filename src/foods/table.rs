use std::{collections::HashMap, io::Read, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FoodLookupError;

pub const SEARCH_LIMIT: usize = 10;
pub const MIN_QUERY_CHARS: usize = 2;

const COL_NAME: &str = "Dish Name";
const COL_CALORIES: &str = "Calories (kcal)";
const COL_CARBS: &str = "Carbohydrates (g)";
const COL_FAT: &str = "Fats (g)";
const COL_FIBER: &str = "Fibre (g)";
const COL_PROTEIN: &str = "Protein (g)";

/// Per-serving nutrition facts for one dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodReference {
    pub name: String,
    pub calories_per_serving: f64,
    pub carbs_per_serving: f64,
    pub fat_per_serving: f64,
    pub fiber_per_serving: f64,
    pub protein_per_serving: f64,
}

/// Read-only dish table, built once at startup.
#[derive(Debug, Default)]
pub struct FoodTable {
    foods: Vec<FoodReference>,
    by_name: HashMap<String, usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column `{0}`")]
    MissingColumn(&'static str),
}

struct Columns {
    name: usize,
    calories: usize,
    carbs: usize,
    fat: usize,
    fiber: usize,
    protein: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |col: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == col)
                .ok_or(LoadError::MissingColumn(col))
        };
        Ok(Self {
            name: find(COL_NAME)?,
            calories: find(COL_CALORIES)?,
            carbs: find(COL_CARBS)?,
            fat: find(COL_FAT)?,
            fiber: find(COL_FIBER)?,
            protein: find(COL_PROTEIN)?,
        })
    }
}

// Blank or unparseable cells count as zero.
/// Blank, unparseable and negative cells read as 0.
fn number(record: &csv::StringRecord, idx: usize) -> f64 {
    record
        .get(idx)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map_or(0.0, |v| v.max(0.0))
}

impl FoodTable {
    pub fn from_foods(foods: Vec<FoodReference>) -> Self {
        let mut by_name = HashMap::with_capacity(foods.len());
        for (idx, food) in foods.iter().enumerate() {
            // first row wins on duplicate names
            by_name.entry(food.name.to_lowercase()).or_insert(idx);
        }
        Self { foods, by_name }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let cols = Columns::locate(rdr.headers()?)?;

        let mut foods = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let name = record.get(cols.name).unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }
            foods.push(FoodReference {
                name: name.to_string(),
                calories_per_serving: number(&record, cols.calories),
                carbs_per_serving: number(&record, cols.carbs),
                fat_per_serving: number(&record, cols.fat),
                fiber_per_serving: number(&record, cols.fiber),
                protein_per_serving: number(&record, cols.protein),
            });
        }
        Ok(Self::from_foods(foods))
    }

    /// Loads the dataset at `path`. A missing or malformed file yields an empty table.
    pub fn load(path: &Path) -> Self {
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "food dataset unavailable; reference table is empty");
                return Self::default();
            }
        };
        match Self::from_reader(file) {
            Ok(table) => {
                info!(path = %path.display(), foods = table.len(), "food dataset loaded");
                table
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "food dataset malformed; reference table is empty");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Case-insensitive substring search, first [`SEARCH_LIMIT`] matches in table order.
    pub fn search(&self, query: &str) -> Vec<FoodReference> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect()
    }

    pub fn get_by_exact_name(&self, name: &str) -> Result<&FoodReference, FoodLookupError> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.foods[idx])
            .ok_or_else(|| FoodLookupError::NotFound(name.to_string()))
    }
}
