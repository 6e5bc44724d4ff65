//! Affiliate HTTP handlers.
//!
//! This module implements the affiliate-related API endpoints:
//! - POST /api/v1/affiliates - Register a new affiliate
//! - GET /api/v1/affiliates - List all affiliates, newest first
//! - GET /api/v1/affiliates/:codigo - Get an affiliate by code
//! - DELETE /api/v1/affiliates/:codigo - Delete an affiliate

use crate::{
    error::AppError,
    firestore::FirestoreClient,
    models::affiliate::{AffiliateResponse, RegisterAffiliateRequest},
    services::affiliate_service,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Register a new affiliate.
///
/// # Endpoint
///
/// `POST /api/v1/affiliates`
///
/// # Request Body
///
/// ```json
/// {
///   "nome": "Marcos Silva",
///   "telefone": "34999998888",
///   "cidade": "Ituiutaba - MG",
///   "descricao": "VIP"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the full record, including the
///   derived `codigo` and `link`
/// - **Error (400)**: A required field is empty, or the derived code is empty
/// - **Error (409)**: The derived code is already registered
/// - **Error (403)**: Store permission denied
/// - **Error (502)**: Store unreachable or failed
///
/// ```json
/// {
///   "nome": "MARCOS SILVA",
///   "telefone": "(34) 99999-8888",
///   "cidade": "Ituiutaba - MG",
///   "descricao": "VIP",
///   "codigo": "marcossilvavip",
///   "link": "https://www.sympla.com.br/evento/habity-fight/3089949?utm_source=afiliado&utm_medium=marcossilvavip&utm_campaign=habity-fight",
///   "status": "ativo",
///   "created_at": "2025-08-07T14:30:00Z",
///   "data_cadastro": "07/08/2025 14:30"
/// }
/// ```
pub async fn register_affiliate(
    State(store): State<FirestoreClient>,
    Json(request): Json<RegisterAffiliateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let affiliate = affiliate_service::register_affiliate(&store, request).await?;

    Ok((StatusCode::CREATED, Json(AffiliateResponse::from(affiliate))))
}

/// List all affiliates.
///
/// # Endpoint
///
/// `GET /api/v1/affiliates`
///
/// # Response
///
/// - **Success (200 OK)**: Returns array of affiliates (may be empty)
/// - **Error (403/502)**: Store failure
///
/// # Ordering
///
/// Affiliates are returned in reverse chronological order (newest first).
/// The whole collection is returned at once; there is no pagination.
pub async fn list_affiliates(
    State(store): State<FirestoreClient>,
) -> Result<Json<Vec<AffiliateResponse>>, AppError> {
    let affiliates = affiliate_service::list_affiliates(&store).await?;

    let responses: Vec<AffiliateResponse> = affiliates.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}

/// Get a specific affiliate by its code.
///
/// # URL Parameters
///
/// - `codigo` - The promotional code identifying the record
///
/// # Response
///
/// - **Success (200 OK)**: Returns the affiliate record
/// - **Error (404)**: No record with that code
pub async fn get_affiliate(
    State(store): State<FirestoreClient>,
    Path(codigo): Path<String>,
) -> Result<Json<AffiliateResponse>, AppError> {
    let affiliate = affiliate_service::get_affiliate(&store, &codigo).await?;

    Ok(Json(affiliate.into()))
}

/// Delete an affiliate by its code.
///
/// # Response
///
/// Returns 204 No Content on success, 404 when the code is unknown.
///
/// # Process
///
/// Deletion is permanent and not undoable; any confirmation step belongs to
/// the caller's UI, not to this endpoint.
pub async fn delete_affiliate(
    State(store): State<FirestoreClient>,
    Path(codigo): Path<String>,
) -> Result<StatusCode, AppError> {
    affiliate_service::delete_affiliate(&store, &codigo).await?;

    Ok(StatusCode::NO_CONTENT)
}
