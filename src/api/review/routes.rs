use crate::api::models::AppState;
use crate::api::review::handlers::*;
use axum::{
    Router,
    routing::{MethodRouter, get},
};

/// A trailing slash is ignored, and so is anything after the id segment.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", collection())
        .route("/api/reviews/", collection())
        .route("/api/reviews/{id}", item())
        .route("/api/reviews/{id}/", item())
        .route("/api/reviews/{id}/{*rest}", item())
}

fn collection() -> MethodRouter<AppState> {
    // explicit HEAD so it is not answered by the GET handler
    get(list_reviews)
        .head(method_not_allowed)
        .post(create_review)
        .put(update_without_id)
        .patch(update_without_id)
        .delete(delete_without_id)
        .fallback(method_not_allowed)
}

fn item() -> MethodRouter<AppState> {
    get(get_review)
        .head(item_method_not_allowed)
        .post(create_review_at_id)
        .put(update_review)
        .patch(update_review)
        .delete(delete_review)
        .fallback(item_method_not_allowed)
}
