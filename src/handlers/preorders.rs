use axum::{extract::State, http::StatusCode, response::Json};

use crate::auth::MaybeAuthUser;
use crate::errors::ServiceError;
use crate::services::preorders::{CreatePreOrderRequest, PreOrderResponse};
use crate::{ApiResponse, AppState};

/// Create a pre-order (registered customer or guest)
#[utoipa::path(
    post,
    path = "/api/v1/preorders",
    summary = "Create pre-order",
    description = "Commit a pre-order through the same atomic engine as orders and return the shareable WhatsApp link",
    request_body = CreatePreOrderRequest,
    responses(
        (status = 201, description = "Pre-order created", body = ApiResponse<PreOrderResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid cart or missing guest phone", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid token presented", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_pre_order(
    State(state): State<AppState>,
    MaybeAuthUser(auth_user): MaybeAuthUser,
    Json(request): Json<CreatePreOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PreOrderResponse>>), ServiceError> {
    let pre_order = state
        .services
        .preorders
        .create_pre_order(auth_user.map(|u| u.user_id), request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(pre_order))))
}
