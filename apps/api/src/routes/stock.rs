//! # Stock Handlers
//!
//! Parse, authenticate, validate, delegate to the ledger or a repository,
//! map the outcome. No business rules live here.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use depot_core::validation::{validate_receive_request, validate_sale_request};
use depot_core::{
    AddInvoiceRequest, AddSaleRequest, CoreError, Invoice, Page, PageRequest, Remainder, Sale,
    SaleLogEntry, StockLogEntry,
};

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::AppState;

/// `?page=&limit=` as raw strings; bad values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    fn request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Body of a successful `add-invoice`.
#[derive(Debug, Serialize)]
pub struct InvoiceCreated {
    pub message: String,
    pub invoice: Invoice,
}

/// Body of a successful `add-sale`.
#[derive(Debug, Serialize)]
pub struct SaleCreated {
    pub message: String,
    pub sale: Sale,
}

// =============================================================================
// Mutations
// =============================================================================

/// `POST /api/stock/add-invoice`
pub async fn add_invoice(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<AddInvoiceRequest>, JsonRejection>,
) -> ApiResult<Json<InvoiceCreated>> {
    let Json(request) = body?;

    let command = validate_receive_request(
        &request,
        Some(principal.actor()),
        &state.config.default_actor,
    )?;
    debug!(
        user = principal.actor(),
        lines = command.lines.len(),
        "Receiving invoice"
    );

    let invoice = state.db.ledger().receive_invoice(&command).await?;
    info!(invoice_id = %invoice.id, user = principal.actor(), "Invoice accepted");

    Ok(Json(InvoiceCreated {
        message: "Invoice added successfully".to_string(),
        invoice,
    }))
}

/// `POST /api/stock/add-sale`
pub async fn add_sale(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<AddSaleRequest>, JsonRejection>,
) -> ApiResult<Json<SaleCreated>> {
    let Json(request) = body?;

    let command = validate_sale_request(&request, principal.actor())?;
    debug!(
        user = principal.actor(),
        lines = command.lines.len(),
        "Recording sale"
    );

    let sale = state.db.ledger().record_sale(&command).await?;
    info!(sale_id = %sale.id, user = principal.actor(), "Sale accepted");

    Ok(Json(SaleCreated {
        message: "Sale recorded successfully".to_string(),
        sale,
    }))
}

// =============================================================================
// Queries
// =============================================================================

/// `GET /api/stock/history`
pub async fn history(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<Invoice>>> {
    let Query(params) = query?;
    Ok(Json(state.db.invoices().list(params.request()).await?))
}

/// `GET /api/stock/history-items`
pub async fn history_items(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<StockLogEntry>>> {
    let Query(params) = query?;
    Ok(Json(
        state.db.invoices().list_stock_logs(params.request()).await?,
    ))
}

/// `GET /api/stock/sales`
pub async fn sales(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<Sale>>> {
    let Query(params) = query?;
    Ok(Json(state.db.sales().list(params.request()).await?))
}

/// `GET /api/stock/sales-items`
pub async fn sales_items(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<SaleLogEntry>>> {
    let Query(params) = query?;
    Ok(Json(state.db.sales().list_sale_logs(params.request()).await?))
}

/// `GET /api/stock/remainders`
pub async fn remainders(State(state): State<AppState>) -> ApiResult<Json<Vec<Remainder>>> {
    Ok(Json(state.db.reports().remainders().await?))
}

/// `GET /api/stock/invoices/{id}`
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    let invoice = state.db.invoices().get_by_id(&id).await?;
    invoice.map(Json).ok_or_else(|| CoreError::InvoiceNotFound(id).into())
}

/// `GET /api/stock/sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    let sale = state.db.sales().get_by_id(&id).await?;
    sale.map(Json).ok_or_else(|| CoreError::SaleNotFound(id).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_are_lenient() {
        let params = PageParams {
            page: Some("abc".to_string()),
            limit: Some("500".to_string()),
        };
        let request = params.request();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 100);

        let defaults = PageParams::default().request();
        assert_eq!(defaults.page(), 1);
        assert_eq!(defaults.limit(), 10);
    }
}
