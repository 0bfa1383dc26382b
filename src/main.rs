mod database;
mod error;
mod filters;
mod handlers;
mod middleware;
mod models;
mod utils;
mod workflow;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::env;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use dotenvy::dotenv;

use database::{create_database_pool, Database};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let app = create_router(db);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Proveo portal starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(db: Database) -> Router {
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

    Router::new()
        // Public routes (no authentication required)
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))

        // Dashboard
        .route("/dashboard", get(handlers::dashboard))

        // Documents (comprobantes)
        .route("/documents", get(handlers::documents::documents_list))
        .route("/documents", post(handlers::documents::submit_document))
        .route("/documents/:id/deliverables", post(handlers::documents::upload_deliverables))
        .route("/documents/:id/approve", post(handlers::documents::approve_document))
        .route("/documents/:id/reject", post(handlers::documents::reject_document))

        // Suppliers
        .route("/suppliers", get(handlers::suppliers::suppliers_list))
        .route("/suppliers/quick-add", post(handlers::suppliers::quick_add_supplier))
        .route("/suppliers/:id/approve", post(handlers::suppliers::approve_supplier))
        .route("/suppliers/:id/reject", post(handlers::suppliers::reject_supplier))
        .route("/suppliers/:id/disable", post(handlers::suppliers::disable_supplier))
        .route("/suppliers/:id/reset-password", post(handlers::suppliers::reset_supplier_password))

        // Payment records
        .route("/payments", get(handlers::payments::payments_list))
        .route("/payments/:id", post(handlers::payments::update_payment))

        // Announcements and company documents
        .route("/announcements", get(handlers::announcements::announcements_list))
        .route("/announcements", post(handlers::announcements::create_announcement))
        .route("/company-documents", get(handlers::company_documents::company_documents_list))
        .route("/company-documents", post(handlers::company_documents::create_company_document))

        // Feedback surveys
        .route("/feedback", post(handlers::feedback::submit_feedback))
        .route("/feedback/summary", get(handlers::feedback::feedback_summary))

        // Notifications
        .route("/notifications", get(handlers::notifications::notifications_list))

        // Uploaded deliverables
        .nest_service("/uploads", ServeDir::new(upload_dir))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
        )
        .with_state(db)
}
