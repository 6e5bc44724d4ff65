//! Affiliate service - registration, listing, and deletion.
//!
//! The registration flow owns the capture-time normalization rules and the
//! uniqueness guarantee:
//!
//! 1. Validate that all four fields are present
//! 2. Normalize name (upper case) and phone (national display mask)
//! 3. Derive the promotional code from name + description
//! 4. Build the tracking link from the fixed template
//! 5. Write the record with a create-only store operation
//!
//! # Uniqueness
//!
//! The code doubles as the document id and the write is create-only, so a
//! colliding registration fails atomically at the store instead of racing a
//! separate existence check against the insert.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::firestore::{FirestoreClient, FirestoreError};
use crate::format;
use crate::models::affiliate::{Affiliate, COLLECTION, RegisterAffiliateRequest, STATUS_ATIVO};

/// Register a new affiliate.
///
/// # Errors
///
/// - `InvalidRequest`: a required field is empty, or the derived code is
///   empty (neither name nor description contained a letter or digit)
/// - `CodeCollision`: the derived code is already registered; no record
///   was written
/// - `Store`: the document store rejected or never received the write
pub async fn register_affiliate(
    store: &FirestoreClient,
    request: RegisterAffiliateRequest,
) -> Result<Affiliate, AppError> {
    let affiliate = build_affiliate(request, Utc::now())?;

    match store
        .create_document(COLLECTION, &affiliate.codigo, &affiliate.to_fields())
        .await
    {
        Ok(_) => {
            tracing::info!(codigo = %affiliate.codigo, "affiliate registered");
            Ok(affiliate)
        }
        // The create-only write doubles as the uniqueness gate.
        Err(FirestoreError::AlreadyExists) => {
            tracing::warn!(codigo = %affiliate.codigo, "registration rejected: code collision");
            Err(AppError::CodeCollision)
        }
        Err(err) => Err(err.into()),
    }
}

/// List every affiliate, most recently registered first.
///
/// The whole collection is fetched in one query; there is no pagination.
pub async fn list_affiliates(store: &FirestoreClient) -> Result<Vec<Affiliate>, AppError> {
    let documents = store.list_descending(COLLECTION, "created_at").await?;
    Ok(documents.iter().map(Affiliate::from_document).collect())
}

/// Fetch a single affiliate by its code.
pub async fn get_affiliate(store: &FirestoreClient, codigo: &str) -> Result<Affiliate, AppError> {
    let document = store
        .get_document(COLLECTION, codigo)
        .await?
        .ok_or(AppError::AffiliateNotFound)?;

    Ok(Affiliate::from_document(&document))
}

/// Delete an affiliate by its code.
///
/// Store deletes are idempotent, so existence is checked first to give the
/// caller a 404 on unknown codes. Deletion is irreversible.
pub async fn delete_affiliate(store: &FirestoreClient, codigo: &str) -> Result<(), AppError> {
    if store.get_document(COLLECTION, codigo).await?.is_none() {
        return Err(AppError::AffiliateNotFound);
    }

    store.delete_document(COLLECTION, codigo).await?;
    tracing::info!(codigo = %codigo, "affiliate deleted");
    Ok(())
}

/// Build the full record from raw capture input.
///
/// Pure: all store interaction stays in [`register_affiliate`]. Name is
/// upper-cased, phone is re-masked from its digit sequence, city and
/// description are stored as typed. The code derives from name and
/// description only.
fn build_affiliate(
    request: RegisterAffiliateRequest,
    registered_at: DateTime<Utc>,
) -> Result<Affiliate, AppError> {
    require("nome", &request.nome)?;
    require("telefone", &request.telefone)?;
    require("cidade", &request.cidade)?;
    require("descricao", &request.descricao)?;

    let codigo = format::generate_code(&request.nome, &request.descricao);
    if codigo.is_empty() {
        return Err(AppError::InvalidRequest(
            "nome and descricao must contain at least one letter or digit".to_string(),
        ));
    }

    let link = format::sales_link(&codigo);

    Ok(Affiliate {
        nome: request.nome.to_uppercase(),
        telefone: format::mask_phone(&request.telefone),
        cidade: request.cidade,
        descricao: request.descricao,
        codigo,
        link,
        status: STATUS_ATIVO.to_string(),
        created_at: Some(registered_at),
    })
}

fn require(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}
