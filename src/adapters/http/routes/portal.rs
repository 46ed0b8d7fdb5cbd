//! Portal pages sitting behind the route guard. The guard has already
//! verified the claim set and stashed it in request extensions, so these
//! handlers only render.

use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};

use crate::{adapters::http::app_state::AppState, application::jwt::Claims};

async fn dashboard(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "page": "dashboard",
        "accountId": claims.sub,
        "role": claims.role,
    }))
}

async fn admin(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "page": "admin",
        "accountId": claims.sub,
    }))
}

async fn partner(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "page": "partner",
        "accountId": claims.sub,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/partner", get(partner))
}
