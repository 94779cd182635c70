//! # Bill Tracker Backend
//!
//! REST backend for tracking household bills, their due dates and the
//! spending they add up to.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, Gemini client)
//!     ↓
//! Domain Layer (canonicalization, analytics, classification, reminders)
//!     ↓
//! Storage Layer (JSON file or SQLite)
//! ```
//!
//! `initialize_backend` wires the services from an `AppConfig` and
//! `create_router` exposes them over HTTP.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{AppConfig, CorsConfig};
use crate::domain::{
    BillAssistant, BillClassifier, BillService, CompletionService, DisabledCompletion,
    DisabledMailer, InsightService, MailService, PromptConfig, ReminderNotifier, SmtpMailer,
};
use crate::io::gemini::GeminiClient;
use crate::io::rest::{ai_apis, bill_apis, error::internal_error_response, insight_apis, reminder_apis};
use crate::storage::{open_storage, BillStorage};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub bill_service: BillService,
    pub insight_service: InsightService,
    pub reminder_notifier: ReminderNotifier,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn BillStorage>,
        completion: Arc<dyn CompletionService>,
        mailer: Arc<dyn MailService>,
        prompts: PromptConfig,
        auto_categorize: bool,
    ) -> Self {
        let prompts = Arc::new(prompts);
        let classifier = BillClassifier::new(completion.clone(), prompts.clone());
        let assistant = BillAssistant::new(completion, prompts);

        Self {
            bill_service: BillService::new(storage.clone(), classifier, auto_categorize),
            insight_service: InsightService::new(storage, assistant),
            reminder_notifier: ReminderNotifier::new(mailer),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage");
    let storage = open_storage(&config.storage).await?;

    info!("Setting up completion service");
    let completion: Arc<dyn CompletionService> = match &config.completion.api_key {
        Some(api_key) => Arc::new(GeminiClient::new(api_key.clone(), &config.completion)?),
        None => {
            warn!("No Gemini API key configured, AI features will use fallbacks");
            Arc::new(DisabledCompletion)
        }
    };

    info!("Setting up mail service");
    let mailer: Arc<dyn MailService> = if config.mail.enabled {
        Arc::new(SmtpMailer::new(&config.mail)?)
    } else {
        info!("📧 Email reminders are disabled");
        Arc::new(DisabledMailer)
    };

    Ok(AppState::new(
        storage,
        completion,
        mailer,
        config.prompts.clone(),
        config.classification.auto_categorize_on_create,
    ))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Panics inside handlers become a JSON 500
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);
    internal_error_response()
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route(
            "/bills",
            get(bill_apis::list_bills)
                .post(bill_apis::create_bill)
                .delete(bill_apis::delete_bill),
        )
        // Static segment wins over `:id`, so "by-name" is never looked up as a bill id
        .route("/bills/by-name", delete(bill_apis::delete_bills_by_name))
        .route("/bills/:id", get(bill_apis::get_bill).put(bill_apis::update_bill))
        .route("/reminders", get(reminder_apis::get_reminders))
        .route("/send-reminder", post(reminder_apis::send_reminder))
        .route("/insights", get(insight_apis::get_insights))
        .route("/average-spending", get(insight_apis::get_average_spending))
        .route("/category-comparison", get(insight_apis::get_category_comparison))
        .route("/ai-query", post(ai_apis::ai_query))
        .route("/classify-bill", post(ai_apis::classify_bill))
        .route("/admin/categorize-all-bills", get(ai_apis::categorize_all_bills));

    if let Some(static_dir) = &config.static_dir {
        info!("Serving static files from {}", static_dir.display());
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(app_state)
}
