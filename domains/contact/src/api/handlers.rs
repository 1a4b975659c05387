//! Contact and order API handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};

use planmart_common::{Result, ValidatedJson};

use crate::api::middleware::ContactState;
use crate::domain::entities::{ContactMessage, Order};

/// Forward a contact form submission to the shop inbox
pub async fn send_contact(
    State(state): State<ContactState>,
    ValidatedJson(req): ValidatedJson<ContactMessage>,
) -> Result<Json<Value>> {
    state.notifier.contact(&req).await?;
    Ok(Json(json!({
        "message": "Message sent",
        "status": "success",
    })))
}

/// Forward a checkout order to the shop inbox
pub async fn send_order(
    State(state): State<ContactState>,
    ValidatedJson(req): ValidatedJson<Order>,
) -> Result<Json<Value>> {
    state.notifier.order(&req).await?;
    Ok(Json(json!({
        "message": "Order received",
        "orderId": req.id,
    })))
}
