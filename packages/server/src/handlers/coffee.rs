use axum::Json;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State};
use axum::http::header;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::instrument;

use crate::entity::coffee;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::coffee::{
    CoffeeFormFields, CoffeeResponse, DeleteCoffeeResponse, UpdateCoffee,
};
use crate::state::AppState;

/// Uploads are buffered in full, so the route body limit stays above the
/// configured per-file cap enforced by the image store.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024) // 32 MB
}

#[utoipa::path(
    post,
    path = "/coffees/",
    tag = "Coffees",
    operation_id = "createCoffee",
    summary = "Create a coffee",
    description = "Creates a coffee record from a multipart form. Every field and the \
        `image` file are required; the image is stored on disk under a generated key.",
    request_body(content_type = "multipart/form-data", description = "Coffee fields plus the image file"),
    responses(
        (status = 200, description = "Coffee created", body = CoffeeResponse),
        (status = 422, description = "Missing or malformed form field (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_coffee(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CoffeeResponse>, AppError> {
    let (fields, file) = collect_form(multipart).await?;
    let payload = fields.try_into_create()?;
    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'image' file field".into()))?;

    // File first, then the row.
    let image_path = state.images.save(&file_name, &data).await?;

    let new_coffee = coffee::ActiveModel {
        coffee_name: Set(payload.coffee_name),
        coffee_type: Set(payload.coffee_type),
        rate: Set(payload.rate),
        comment_count: Set(payload.comment_count),
        image: Set(image_path.clone()),
        price: Set(payload.price),
        is_liked: Set(payload.is_liked),
        desc: Set(payload.desc),
        buy_count: Set(payload.buy_count),
        coffee_shop_location: Set(payload.coffee_shop_location),
        coffee_address: Set(payload.coffee_address),
        ..Default::default()
    };

    let model = match new_coffee.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            // The row never landed; unlink the staged file.
            if let Err(cleanup) = state.images.delete(&image_path).await {
                tracing::warn!("Failed to remove staged image {image_path}: {cleanup}");
            }
            return Err(e.into());
        }
    };

    Ok(Json(CoffeeResponse::from_model(model, state.images.as_ref())))
}

#[utoipa::path(
    get,
    path = "/coffees/",
    tag = "Coffees",
    operation_id = "listCoffees",
    summary = "List all coffees",
    responses(
        (status = 200, description = "All coffee records", body = [CoffeeResponse]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_coffees(
    State(state): State<AppState>,
) -> Result<Json<Vec<CoffeeResponse>>, AppError> {
    let coffees = coffee::Entity::find().all(&state.db).await?;

    let data = coffees
        .into_iter()
        .map(|m| CoffeeResponse::from_model(m, state.images.as_ref()))
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/coffees/{id}",
    tag = "Coffees",
    operation_id = "getCoffee",
    summary = "Get a coffee by ID",
    params(("id" = i32, Path, description = "Coffee ID")),
    responses(
        (status = 200, description = "Coffee details", body = CoffeeResponse),
        (status = 404, description = "Coffee not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_coffee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CoffeeResponse>, AppError> {
    let model = find_coffee(&state.db, id).await?;
    Ok(Json(CoffeeResponse::from_model(model, state.images.as_ref())))
}

#[utoipa::path(
    put,
    path = "/coffees/{id}",
    tag = "Coffees",
    operation_id = "updateCoffee",
    summary = "Update a coffee",
    description = "Partially updates a coffee; only provided fields change. Fields may \
        arrive as query parameters or multipart form fields; an optional `image` file \
        replaces the stored image and removes the old file. An empty payload returns \
        the current record unchanged.",
    params(("id" = i32, Path, description = "Coffee ID"), UpdateCoffee),
    request_body(content_type = "multipart/form-data", description = "Optional replacement fields and image file"),
    responses(
        (status = 200, description = "Coffee updated", body = CoffeeResponse),
        (status = 404, description = "Coffee not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Malformed field (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, req), fields(id))]
pub async fn update_coffee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<UpdateCoffee>,
    req: Request,
) -> Result<Json<CoffeeResponse>, AppError> {
    let (form, file) = if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
        let (fields, file) = collect_form(multipart).await?;
        (fields.try_into_update()?, file)
    } else {
        (UpdateCoffee::default(), None)
    };

    // Form fields overlay query parameters when both name the same field.
    let changes = query.merge(form);

    if changes == UpdateCoffee::default() && file.is_none() {
        let existing = find_coffee(&state.db, id).await?;
        return Ok(Json(CoffeeResponse::from_model(existing, state.images.as_ref())));
    }

    let existing = find_coffee(&state.db, id).await?;
    let previous_image = existing.image.clone();
    let mut active: coffee::ActiveModel = existing.into();

    if let Some(v) = changes.coffee_name {
        active.coffee_name = Set(v);
    }
    if let Some(v) = changes.coffee_type {
        active.coffee_type = Set(v);
    }
    if let Some(v) = changes.rate {
        active.rate = Set(v);
    }
    if let Some(v) = changes.comment_count {
        active.comment_count = Set(v);
    }
    if let Some(v) = changes.price {
        active.price = Set(v);
    }
    if let Some(v) = changes.is_liked {
        active.is_liked = Set(v);
    }
    if let Some(v) = changes.desc {
        active.desc = Set(v);
    }
    if let Some(v) = changes.buy_count {
        active.buy_count = Set(v);
    }
    if let Some(v) = changes.coffee_shop_location {
        active.coffee_shop_location = Set(v);
    }
    if let Some(v) = changes.coffee_address {
        active.coffee_address = Set(v);
    }

    let new_image = match file {
        Some((file_name, data)) => Some(state.images.save(&file_name, &data).await?),
        None => None,
    };
    if let Some(path) = &new_image {
        active.image = Set(path.clone());
    }

    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            if let Some(path) = &new_image {
                if let Err(cleanup) = state.images.delete(path).await {
                    tracing::warn!("Failed to remove staged image {path}: {cleanup}");
                }
            }
            return Err(e.into());
        }
    };

    // The old file is dead weight once the row points elsewhere.
    if new_image.is_some() {
        if let Err(e) = state.images.delete(&previous_image).await {
            tracing::warn!("Failed to remove replaced image {previous_image}: {e}");
        }
    }

    Ok(Json(CoffeeResponse::from_model(model, state.images.as_ref())))
}

#[utoipa::path(
    delete,
    path = "/coffees/{id}",
    tag = "Coffees",
    operation_id = "deleteCoffee",
    summary = "Delete a coffee",
    description = "Deletes a coffee record and removes its stored image from disk.",
    params(("id" = i32, Path, description = "Coffee ID")),
    responses(
        (status = 200, description = "Coffee deleted", body = DeleteCoffeeResponse),
        (status = 404, description = "Coffee not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_coffee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteCoffeeResponse>, AppError> {
    let existing = find_coffee(&state.db, id).await?;

    coffee::Entity::delete_by_id(id).exec(&state.db).await?;

    // Best effort; the row is gone either way.
    if let Err(e) = state.images.delete(&existing.image).await {
        tracing::warn!("Failed to remove image {}: {}", existing.image, e);
    }

    Ok(Json(DeleteCoffeeResponse::default()))
}

async fn find_coffee<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<coffee::Model, AppError> {
    coffee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Coffee not found".into()))
}

/// Drain a multipart form into collected text fields plus the optional
/// `image` file part.
async fn collect_form(
    mut multipart: Multipart,
) -> Result<(CoffeeFormFields, Option<(String, Vec<u8>)>), AppError> {
    let mut fields = CoffeeFormFields::default();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
            file = Some((file_name, data.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
            fields.set(&name, value);
        }
    }

    Ok((fields, file))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}
