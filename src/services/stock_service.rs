// src/services/stock_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    api::{paging::ListResponse, session::SessionManager},
    common::error::AppError,
    models::stock::{MovementPayload, MovementType, StockMovement},
};

// Filtros aceitos por GET /stock/movements.
#[derive(Debug, Default, Clone)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl MovementFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(product_id) = self.product_id {
            query.push(("product_id", product_id.to_string()));
        }
        if let Some(movement_type) = self.movement_type {
            query.push(("type", movement_type.to_string()));
        }
        if let Some(start) = self.start {
            query.push(("start", start.to_rfc3339()));
        }
        if let Some(end) = self.end {
            query.push(("end", end.to_rfc3339()));
        }
        query
    }
}

#[derive(Clone)]
pub struct StockService {
    session: Arc<SessionManager>,
}

impl StockService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError> {
        let response: ListResponse<StockMovement> = self
            .session
            .get_json("/stock/movements", &filter.to_query())
            .await?;
        Ok(response.into_paged().data)
    }

    pub async fn add_movement(&self, payload: &MovementPayload) -> Result<StockMovement, AppError> {
        self.session.post_json("/stock/movements", payload).await
    }
}
