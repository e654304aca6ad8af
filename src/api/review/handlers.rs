//! Review endpoints.
//!
//! Extractor order mirrors the request pipeline: session (attached by the
//! auth layer), then the id segment, then the optional JSON body. A body is
//! parsed for every method so malformed JSON is always rejected, even where
//! the handler has no use for it.

use crate::api::error::AppError;
use crate::api::extract::{JsonBody, ReviewId};
use crate::api::models::{CreatedResponse, MessageResponse};
use crate::storage::{NewReview, Review, ReviewPatch, Session, reviews};
use axum::{Extension, Json, http::StatusCode};
use rusqlite::TransactionBehavior;
use tracing::info;

/// `GET /api/reviews`
pub async fn list_reviews(
    Extension(session): Extension<Session>,
    JsonBody(_): JsonBody,
) -> Result<Json<Vec<Review>>, AppError> {
    let list = session
        .run(|conn| Ok::<_, AppError>(reviews::list(conn)?))
        .await?;
    info!(count = list.len(), "Listed reviews");
    Ok(Json(list))
}

/// `GET /api/reviews/{id}`
pub async fn get_review(
    Extension(session): Extension<Session>,
    ReviewId(id): ReviewId,
    JsonBody(_): JsonBody,
) -> Result<Json<Review>, AppError> {
    let review = session
        .run(move |conn| reviews::find(conn, id)?.ok_or(AppError::NotFound))
        .await?;
    Ok(Json(review))
}

/// `POST /api/reviews`
pub async fn create_review(
    Extension(session): Extension<Session>,
    body: JsonBody,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let payload = body.into_object()?;
    let review = NewReview::from_payload(&payload)?;
    let product_id = review.product_id;

    let id = session
        .run(move |conn| Ok::<_, AppError>(reviews::insert(conn, &review)?))
        .await?;

    info!(id, product_id, "Review created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Review created.".to_string(),
            id,
        }),
    ))
}

/// `POST /api/reviews/{id}` creates as well; the id only has to be well formed.
pub async fn create_review_at_id(
    session: Extension<Session>,
    ReviewId(_): ReviewId,
    body: JsonBody,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    create_review(session, body).await
}

/// `PUT`/`PATCH /api/reviews/{id}`, both partial.
///
/// A missing review is reported before any validation failure. The
/// existence check and the update share one write transaction.
pub async fn update_review(
    Extension(session): Extension<Session>,
    ReviewId(id): ReviewId,
    body: JsonBody,
) -> Result<Json<MessageResponse>, AppError> {
    let payload = body.into_object()?;
    let patch = ReviewPatch::from_payload(&payload);

    session
        .run(move |conn| {
            // IMMEDIATE takes the write lock up front so busy_timeout applies
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !reviews::exists(&tx, id)? {
                return Err(AppError::NotFound);
            }
            reviews::update(&tx, id, &patch?)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

    info!(id, "Review updated");
    Ok(Json(MessageResponse::new("Review updated.")))
}

/// `DELETE /api/reviews/{id}`
pub async fn delete_review(
    Extension(session): Extension<Session>,
    ReviewId(id): ReviewId,
    JsonBody(_): JsonBody,
) -> Result<Json<MessageResponse>, AppError> {
    session
        .run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !reviews::exists(&tx, id)? {
                return Err(AppError::NotFound);
            }
            reviews::delete(&tx, id)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

    info!(id, "Review deleted");
    Ok(Json(MessageResponse::new("Review deleted.")))
}

/// `PUT`/`PATCH /api/reviews`
pub async fn update_without_id(JsonBody(_): JsonBody) -> AppError {
    AppError::BadRequest("ID required in URL for update.")
}

/// `DELETE /api/reviews`
pub async fn delete_without_id(JsonBody(_): JsonBody) -> AppError {
    AppError::BadRequest("ID required in URL for deletion.")
}

/// Any other method on `/api/reviews`, including HEAD
pub async fn method_not_allowed(JsonBody(_): JsonBody) -> AppError {
    AppError::MethodNotAllowed
}

/// Any other method on `/api/reviews/{id}`, including HEAD
pub async fn item_method_not_allowed(ReviewId(_): ReviewId, JsonBody(_): JsonBody) -> AppError {
    AppError::MethodNotAllowed
}
