//! Product route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::StatusCode,
};
use ecommers_core::store::ProductStore;
use ecommers_core::{Product, ProductId, ProductInput};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::middleware::RequireAdmin;
use crate::services::{AdminError, ImageUpload, validate_product_input};
use crate::state::AppState;

/// Multipart field that carries the image.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct SavedProduct {
    pub id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Product listing, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list().await?))
}

/// Product detail.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    state
        .products()
        .get(&ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found.".to_owned()))
}

/// Create a product, or update the one named by `id`.
///
/// Responds 201 for a new product and 200 for an update.
#[instrument(skip_all, fields(product_id = ?input.id))]
pub async fn save(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<ProductInput>,
) -> Result<(StatusCode, Json<SavedProduct>)> {
    validate_product_input(&input)?;
    let status = if input.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let id = state.catalog().upsert_product(Some(&admin), input).await?;
    Ok((status, Json(SavedProduct { id })))
}

/// Delete a product.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let deleted = state
        .catalog()
        .delete_product(Some(&admin), &ProductId::new(id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Product not found.".to_owned()))
    }
}

/// Store the `file` part of a multipart upload and return its public URL.
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedImage>> {
    let upload = read_file_field(multipart?)
        .await?
        .ok_or(AdminError::MissingFile)?;
    let url = state
        .catalog()
        .upload_product_image(Some(&admin), upload)
        .await?;
    Ok(Json(UploadedImage { url }))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Option<ImageUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}
