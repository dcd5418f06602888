//! Request extractors that validate before the handler runs.
//!
//! Both extractors turn malformed input into a single `400` carrying every
//! rule violation, so handlers only ever see payloads that passed validation.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, multipart::Field},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::restaurant::{MenuItemForm, RestaurantForm};
use crate::error::AppError;
use crate::infrastructure::assets::ImageUpload;

/// Largest accepted restaurant image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Body limit for multipart restaurant forms: the image plus room for the
/// text fields.
pub const MAX_FORM_BYTES: usize = MAX_IMAGE_BYTES + 512 * 1024;

/// JSON body that has been deserialized and validated.
///
/// Unparsable JSON is reported as a validation error rather than axum's
/// plain-text rejection, keeping every 400 in the same envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::bad_request(
                "Invalid request body",
                json!({ "reason": rejection.body_text() }),
            )
        })?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// The restaurant create/update form, read from `multipart/form-data`.
///
/// Field names follow the web client's bracket notation:
///
/// ```text
/// restaurantName, city, country, deliveryPrice, estimatedDeliveryTime
/// cuisines[0], cuisines[1], ...
/// menuItems[0][name], menuItems[0][price], menuItems[0][_id]
/// imageFile
/// ```
///
/// Unknown fields are ignored.
#[derive(Debug, Clone)]
pub struct RestaurantMultipart(pub RestaurantForm);

impl<S> FromRequest<S> for RestaurantMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            AppError::bad_request(
                "Expected a multipart form",
                json!({ "reason": rejection.body_text() }),
            )
        })?;

        let mut form = RestaurantForm::default();
        let mut cuisines: BTreeMap<usize, String> = BTreeMap::new();
        let mut appended_cuisines = Vec::new();
        let mut menu_items: BTreeMap<usize, MenuItemForm> = BTreeMap::new();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "restaurantName" => form.restaurant_name = Some(text(field).await?),
                "city" => form.city = Some(text(field).await?),
                "country" => form.country = Some(text(field).await?),
                "deliveryPrice" => form.delivery_price = Some(text(field).await?),
                "estimatedDeliveryTime" => form.estimated_delivery_time = Some(text(field).await?),
                "cuisines" | "cuisines[]" => appended_cuisines.push(text(field).await?),
                "imageFile" => form.image = image(field).await?,
                _ => {
                    if let Some((index, "")) = indexed(&name, "cuisines") {
                        cuisines.insert(index, text(field).await?);
                    } else if let Some((index, key)) = indexed(&name, "menuItems") {
                        let item = menu_items.entry(index).or_default();
                        match key {
                            "[name]" => item.name = Some(text(field).await?),
                            "[price]" => item.price = Some(text(field).await?),
                            "[_id]" => item.id = Some(text(field).await?),
                            _ => {}
                        }
                    }
                }
            }
        }

        form.cuisines = cuisines.into_values().chain(appended_cuisines).collect();
        form.menu_items = menu_items.into_values().collect();

        form.validate()?;
        Ok(Self(form))
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::bad_request(
        "Malformed multipart body",
        json!({ "reason": err.body_text() }),
    )
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(malformed)
}

/// Reads the image part. An empty part (a form submitted without choosing a
/// file) counts as no image.
async fn image(field: Field<'_>) -> Result<Option<ImageUpload>, AppError> {
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(malformed)?;

    if bytes.is_empty() {
        return Ok(None);
    }

    let content_type = content_type
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| AppError::invalid_field("imageFile", "Image file must be an image"))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::invalid_field(
            "imageFile",
            "Image file must be at most 5 MB",
        ));
    }

    Ok(Some(ImageUpload {
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// Splits `prefix[index]rest` into `(index, rest)`.
fn indexed<'a>(name: &'a str, prefix: &str) -> Option<(usize, &'a str)> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('[')?;
    let (index, tail) = rest.split_once(']')?;
    Some((index.parse().ok()?, tail))
}

/// Parses an id taken from the URL path.
///
/// A malformed id cannot name an existing record, so it is reported as
/// `404` for the given resource.
pub fn path_id(raw: &str, resource: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::not_found(format!("{resource} not found"), json!({ "id": raw })))
}
