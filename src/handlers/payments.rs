use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::payments::{PaymentResponse, RecordPaymentInput, UpdatePaymentStatusInput};
use crate::{ApiResponse, AppState};

/// Record (or re-record) the payment for an order
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    summary = "Record payment",
    description = "Upsert the single payment row for an order; a second submission overwrites the first",
    request_body = RecordPaymentInput,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid amount", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the order owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn record_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<RecordPaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), ServiceError> {
    let payment = state.services.payments.record(&auth_user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

/// Get the payment recorded for an order
#[utoipa::path(
    get,
    path = "/api/v1/payments/{order_id}",
    summary = "Get payment",
    params(("order_id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Payment found", body = ApiResponse<PaymentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the order owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "No payment recorded", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment = state.services.payments.get(&auth_user, order_id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

/// Update payment status (privileged roles only)
#[utoipa::path(
    patch,
    path = "/api/v1/payments/{order_id}/status",
    summary = "Update payment status",
    params(("order_id" = Uuid, Path, description = "Order id")),
    request_body = UpdatePaymentStatusInput,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<PaymentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Privileged role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "No payment recorded", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePaymentStatusInput>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment = state
        .services
        .payments
        .update_status(&auth_user, order_id, input.status)
        .await?;
    Ok(Json(ApiResponse::success(payment)))
}
