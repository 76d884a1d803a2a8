use crate::entities::{pre_order, pre_order_item, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::{cart, catalog, customers::CustomerDirectory};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Minimum digits a guest contact phone must carry after trimming
const MIN_GUEST_PHONE_LEN: usize = 7;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePreOrderRequest {
    pub items: Vec<cart::CartItemInput>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_city: Option<String>,
    /// Business number override; falls back to the configured one
    pub whatsapp_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreOrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub product: Option<super::orders::ProductSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreOrderResponse {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_city: Option<String>,
    pub total: Decimal,
    pub status: pre_order::PreOrderStatus,
    pub whatsapp_link: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PreOrderItemResponse>,
}

enum Payer {
    Customer(Uuid),
    Guest {
        name: Option<String>,
        phone: String,
        city: Option<String>,
    },
}

/// Builds the wa.me deep link: non-digits are stripped from the number and
/// the message is percent-encoded into the text parameter.
fn build_whatsapp_link(to: &str, message: &str) -> String {
    let digits: String = to.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("https://wa.me/{}?text={}", digits, urlencoding::encode(message))
}

fn build_message(
    payer: &Payer,
    lines: &[(String, i32, Decimal)],
    total: Decimal,
) -> String {
    let payer_line = match payer {
        Payer::Customer(_) => "Cliente registrado".to_string(),
        Payer::Guest { name, phone, city } => format!(
            "Invitado: {} | Tel: {} | Ciudad: {}",
            name.as_deref().unwrap_or("N/A"),
            phone,
            city.as_deref().unwrap_or("N/A"),
        ),
    };

    let mut out = String::from("Preorden Tienda\n");
    out.push_str(&payer_line);
    out.push_str("\n\nItems:\n");
    for (name, qty, subtotal) in lines {
        out.push_str(&format!("- {} x{} = {}\n", name, qty, subtotal));
    }
    out.push_str(&format!("\nTotal: {}\n\nPor favor confirmar disponibilidad y forma de pago.", total));
    out
}

/// Order commitment engine, pre-order call site: same atomic algorithm, but
/// the payer may be a guest and the committed row carries a shareable
/// contact link.
#[derive(Clone)]
pub struct PreOrderService {
    db: Arc<DatabaseConnection>,
    directory: CustomerDirectory,
    event_sender: Arc<EventSender>,
    whatsapp_business: String,
}

impl PreOrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        directory: CustomerDirectory,
        event_sender: Arc<EventSender>,
        whatsapp_business: String,
    ) -> Self {
        Self {
            db,
            directory,
            event_sender,
            whatsapp_business,
        }
    }

    /// Resolves who the pre-order belongs to. A linked profile wins; an
    /// authenticated user without one proceeds as guest. Storage failures
    /// abort the request rather than silently downgrading to guest.
    async fn resolve_payer(
        &self,
        user_id: Option<Uuid>,
        request: &CreatePreOrderRequest,
    ) -> Result<Payer, ServiceError> {
        if let Some(user_id) = user_id {
            if let Some(customer) = self.directory.find_by_user(user_id).await? {
                return Ok(Payer::Customer(customer.id));
            }
        }

        let phone = request
            .guest_phone
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if phone.len() < MIN_GUEST_PHONE_LEN {
            return Err(ServiceError::ValidationError(
                "guest_phone is required when no customer profile is linked".to_string(),
            ));
        }

        Ok(Payer::Guest {
            name: request.guest_name.clone(),
            phone: phone.to_string(),
            city: request.guest_city.clone(),
        })
    }

    #[instrument(skip(self, request))]
    pub async fn create_pre_order(
        &self,
        user_id: Option<Uuid>,
        request: CreatePreOrderRequest,
    ) -> Result<PreOrderResponse, ServiceError> {
        let consolidated = cart::normalize(&request.items)?;
        let payer = self.resolve_payer(user_id, &request).await?;

        let business_number = request
            .whatsapp_to
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.whatsapp_business)
            .to_string();

        let txn = self.db.begin().await?;

        let products = catalog::fetch_for_commit(&txn, &consolidated.product_ids()).await?;

        for line in consolidated.lines() {
            let product = products
                .get(&line.product_id)
                .ok_or(ServiceError::ProductNotFound(line.product_id))?;
            if line.quantity > product.stock {
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                });
            }
        }

        let mut summary_lines = Vec::with_capacity(consolidated.len());
        let mut total = Decimal::ZERO;
        for line in consolidated.lines() {
            let product = &products[&line.product_id];
            let subtotal = product.price * Decimal::from(line.quantity);
            total += subtotal;
            summary_lines.push((product.name.clone(), line.quantity, subtotal));
        }

        let message = build_message(&payer, &summary_lines, total);
        let whatsapp_link = build_whatsapp_link(&business_number, &message);

        let (customer_id, guest_name, guest_phone, guest_city) = match &payer {
            Payer::Customer(id) => (Some(*id), None, None, None),
            Payer::Guest { name, phone, city } => {
                (None, name.clone(), Some(phone.clone()), city.clone())
            }
        };

        let now = Utc::now();
        let header = pre_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            guest_name: Set(guest_name),
            guest_phone: Set(guest_phone),
            guest_city: Set(guest_city),
            total: Set(total),
            status: Set(pre_order::PreOrderStatus::Sent),
            whatsapp_link: Set(whatsapp_link),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(consolidated.len());
        for line in consolidated.lines() {
            let product = &products[&line.product_id];
            let item = pre_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                pre_order_id: Set(header.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(product.price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            items.push(item);

            let decremented = catalog::decrement_stock(&txn, line.product_id, line.quantity).await?;
            if !decremented {
                let available = catalog::current_stock(&txn, line.product_id).await?;
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PreOrderCreated(header.id))
            .await
        {
            warn!(pre_order_id = %header.id, error = %e, "Failed to publish pre-order created event");
        }

        Ok(compose_response(header, items, &products))
    }
}

fn compose_response(
    header: pre_order::Model,
    items: Vec<pre_order_item::Model>,
    products: &HashMap<Uuid, product::Model>,
) -> PreOrderResponse {
    let items = items
        .into_iter()
        .map(|it| PreOrderItemResponse {
            id: it.id,
            product_id: it.product_id,
            quantity: it.quantity,
            unit_price: it.unit_price,
            subtotal: it.unit_price * Decimal::from(it.quantity),
            product: products
                .get(&it.product_id)
                .map(super::orders::ProductSummary::from),
        })
        .collect();

    PreOrderResponse {
        id: header.id,
        customer_id: header.customer_id,
        guest_name: header.guest_name,
        guest_phone: header.guest_phone,
        guest_city: header.guest_city,
        total: header.total,
        status: header.status,
        whatsapp_link: header.whatsapp_link,
        created_at: header.created_at,
        items,
    }
}
