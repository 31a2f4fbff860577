use std::net::SocketAddr;

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::readiness::require_ready;
use crate::state::AppState;
use crate::{foods, logs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub reference_loaded: bool,
    pub store_connected: bool,
    pub foods: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let r = &state.readiness;
    Json(HealthResponse {
        status: if r.is_ready() { "ok" } else { "starting" },
        reference_loaded: r.reference_loaded(),
        store_connected: r.store_connected(),
        foods: state.food_count(),
    })
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(foods::router())
                .merge(logs::router())
                .route_layer(middleware::from_fn_with_state(state.clone(), require_ready))
                .route("/health", get(health)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::foods::FoodTable;
    use crate::logs::MemoryLogStore;
    use crate::readiness::Readiness;

    const FOODS: &str = "\
Dish Name,Calories (kcal),Carbohydrates (g),Protein (g),Fats (g),Fibre (g)
Idli,40,8,1.5,0.2,0.6
Masala Dosa,165,24,3.8,6.2,1.6
Plain Dosa,120,18,2.9,3.7,0.9
";

    fn test_app() -> Router {
        build_app(AppState::fake_with_foods(
            FoodTable::from_reader(FOODS.as_bytes()).unwrap(),
        ))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn log_body(name: &str, meal: &str, log_date: &str) -> Value {
        json!({
            "foodName": name,
            "servingSize": "1 serving",
            "quantity": 3,
            "calories": 120,
            "carbs": 24,
            "fat": 0.6,
            "fiber": 1.8,
            "protein": 4.5,
            "mealType": meal,
            "logDate": log_date,
        })
    }

    #[tokio::test]
    async fn health_reports_readiness() {
        let (status, json) = send(&test_app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["referenceLoaded"], true);
        assert_eq!(json["foods"], 3);
    }

    #[tokio::test]
    async fn search_returns_matches() {
        let app = test_app();
        let (status, json) = send(&app, Method::GET, "/api/search?q=dosa", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = json.as_array().unwrap().iter().map(|f| f["name"].clone()).collect();
        assert_eq!(names, [json!("Masala Dosa"), json!("Plain Dosa")]);

        let (_, json) = send(&app, Method::GET, "/api/search?q=d", None).await;
        assert!(json.as_array().unwrap().is_empty());

        let (_, json) = send(&app, Method::GET, "/api/search", None).await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn food_lookup_statuses() {
        let app = test_app();
        let (status, json) = send(&app, Method::GET, "/api/food?name=idli", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Idli");
        assert_eq!(json["caloriesPerServing"], 40.0);

        let (status, json) = send(&app, Method::GET, "/api/food", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "Food name query is required");

        let (status, json) = send(&app, Method::GET, "/api/food?name=Pizza", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["msg"], "Food item not found");
    }

    #[tokio::test]
    async fn create_list_delete_cycle() {
        let app = test_app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/log",
            Some(log_body("Idli", "Breakfast", "2025-06-15T08:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["calories"], 120.0);
        let id = created["id"].as_str().unwrap().to_string();

        send(
            &app,
            Method::POST,
            "/api/log",
            Some(log_body("Plain Dosa", "Dinner", "2025-06-16T00:00:00Z")),
        )
        .await;

        let (status, logs) = send(&app, Method::GET, "/api/log/date?date=2025-06-15", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs.as_array().unwrap().len(), 1);
        assert_eq!(logs[0]["id"], id.as_str());

        let (status, json) = send(&app, Method::DELETE, &format!("/api/log/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["msg"], "Log deleted successfully");

        let (_, logs) = send(&app, Method::GET, "/api/log/date?date=2025-06-15", None).await;
        assert!(logs.as_array().unwrap().is_empty());

        let (status, json) = send(&app, Method::DELETE, &format!("/api/log/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["msg"], "Log not found");
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let (status, _) = send(&test_app(), Method::DELETE, "/api/log/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_log_bodies_are_bad_requests() {
        let app = test_app();

        let mut missing = log_body("Idli", "Lunch", "2025-06-15T08:00:00Z");
        missing.as_object_mut().unwrap().remove("calories");
        let (status, json) = send(&app, Method::POST, "/api/log", Some(missing)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "calories is required");

        let bad_meal = log_body("Idli", "Brunch", "2025-06-15T08:00:00Z");
        let (status, _) = send(&app, Method::POST, "/api/log", Some(bad_meal)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, "/api/log", Some(json!({"quantity": "lots"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn date_query_is_required_and_validated() {
        let app = test_app();
        let (status, json) = send(&app, Method::GET, "/api/log/date", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "Date query parameter is required");

        let (status, _) = send(&app, Method::GET, "/api/log/date?date=yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/log/summary", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summary_aggregates_the_day() {
        let app = test_app();
        for (name, meal) in [("Idli", "Breakfast"), ("Masala Dosa", "Breakfast"), ("Plain Dosa", "Dinner")] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/log",
                Some(log_body(name, meal, "2025-06-15T12:00:00Z")),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, summary) = send(&app, Method::GET, "/api/log/summary?date=2025-06-15", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["date"], "2025-06-15");
        assert_eq!(summary["totals"]["calories"], 360.0);
        assert_eq!(summary["goals"]["calories"], 2200.0);
        assert_eq!(summary["meals"]["Breakfast"]["entries"].as_array().unwrap().len(), 2);
        assert!(summary["meals"]["Lunch"]["entries"].as_array().unwrap().is_empty());
        assert!(summary["meals"]["Snacks"].is_object());
    }

    #[tokio::test]
    async fn starting_server_answers_503_until_loaded() {
        let state = AppState::starting(Arc::new(AppConfig::for_tests()));
        let app = build_app(state.clone());

        let (status, json) = send(&app, Method::GET, "/api/log/date?date=2025-06-15", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["msg"], "Service is starting");
        let (_, json) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(json["storeConnected"], false);

        state.load().await.unwrap();
        let (status, json) = send(&app, Method::GET, "/api/log/date?date=2025-06-15", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
        let (_, json) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn api_is_gated_until_ready() {
        let readiness = Arc::new(Readiness::new());
        let state = AppState::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryLogStore::new()),
            FoodTable::from_reader(FOODS.as_bytes()).unwrap(),
            readiness.clone(),
        );
        let app = build_app(state);

        let (status, json) = send(&app, Method::GET, "/api/search?q=idli", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["msg"], "Service is starting");

        let (status, json) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "starting");

        readiness.mark_reference_loaded();
        let (status, _) = send(&app, Method::GET, "/api/log/date?date=2025-06-15", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        readiness.mark_store_connected();
        let (status, json) = send(&app, Method::GET, "/api/search?q=idli", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
