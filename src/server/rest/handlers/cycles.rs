use axum::{extract::State, Json};
use std::sync::Arc;

use crate::billing::LedgerSnapshot;
use crate::shared::models::AppState;

pub async fn get_cycles(State(state): State<Arc<AppState>>) -> Json<LedgerSnapshot> {
    Json(state.ledger.snapshot().await)
}
