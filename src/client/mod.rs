//! Client side of the diet log: REST client, dashboard state and the
//! controller that ties them together.

pub mod api;
pub mod debounce;
pub mod state;

use time::{Date, OffsetDateTime};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::foods::FoodReference;
use crate::logs::{builder, LogEntry, MealType};

pub use api::{ApiClient, ClientError};
pub use debounce::SearchDebouncer;
pub use state::{nutrition_preview, DashboardState, NutritionPreview};

/// Drives the dashboard: one request per action, state replaced on completion.
pub struct LogController {
    api: ApiClient,
    state: DashboardState,
}

impl LogController {
    pub fn new(api: ApiClient) -> Self {
        Self::with_date(api, OffsetDateTime::now_utc().date())
    }

    pub fn with_date(api: ApiClient, date: Date) -> Self {
        Self {
            api,
            state: DashboardState::new(date),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> &DashboardState {
        self.state = self.state.fetch_started();
        self.state = match self.api.logs_by_date(self.state.selected_date).await {
            Ok(logs) => self.state.fetch_succeeded(logs),
            Err(e) => {
                error!(error = %e, "fetching logs failed");
                self.state.fetch_failed()
            }
        };
        &self.state
    }

    pub async fn select_date(&mut self, date: Date) -> &DashboardState {
        self.state = self.state.with_date(date);
        self.refresh().await
    }

    pub async fn shift_date(&mut self, days: i64) -> &DashboardState {
        self.state = self.state.shift_date(days);
        self.refresh().await
    }

    /// Builds an entry for `quantity` servings, saves it, then refetches the day.
    #[instrument(skip(self, reference), fields(food = %reference.name))]
    pub async fn log_food(
        &mut self,
        reference: &FoodReference,
        quantity: f64,
        meal_type: MealType,
    ) -> Result<LogEntry, ClientError> {
        let input = builder::build(reference, quantity, meal_type);
        match self.api.create_log(&input).await {
            Ok(entry) => {
                self.refresh().await;
                Ok(entry)
            }
            Err(e) => {
                error!(error = %e, "saving log failed");
                self.state = self.state.save_failed();
                Err(e)
            }
        }
    }

    /// On failure the list is left untouched.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete_log(id).await {
            Ok(()) => {
                self.state = self.state.log_deleted(id);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "deleting log failed");
                Err(e)
            }
        }
    }
}
