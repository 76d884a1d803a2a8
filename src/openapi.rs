use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tienda API",
        version = "0.1.0",
        description = r#"
E-commerce order commitment API.

- **Orders**: atomic order creation with cart consolidation, authoritative
  price snapshots and guarded stock decrement
- **Pre-orders**: the same commitment path for registered customers and
  guests, producing a shareable WhatsApp contact link
- **Payments**: one payment per order, recorded and reconciled in place

Authenticate with a JWT bearer token:

```
Authorization: Bearer <token>
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order commitment endpoints"),
        (name = "Pre-orders", description = "Pre-order commitment endpoints"),
        (name = "Payments", description = "Payment reconciliation endpoints")
    ),
    paths(
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::preorders::create_pre_order,
        crate::handlers::payments::record_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::update_payment_status,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,

            crate::services::cart::CartItemInput,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderItemResponse,
            crate::services::orders::ProductSummary,
            crate::entities::order::OrderStatus,
            crate::entities::order::OrderChannel,

            crate::services::preorders::CreatePreOrderRequest,
            crate::services::preorders::PreOrderResponse,
            crate::services::preorders::PreOrderItemResponse,
            crate::entities::pre_order::PreOrderStatus,

            crate::services::payments::RecordPaymentInput,
            crate::services::payments::UpdatePaymentStatusInput,
            crate::services::payments::PaymentResponse,
            crate::entities::payment::PaymentMethod,
            crate::entities::payment::PaymentStatus,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
