use crate::auth::AuthUser;
use crate::entities::{order, order_item, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::{cart, catalog, customers::CustomerDirectory};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<cart::CartItemInput>,
    /// Sales channel; orders placed without one are attributed to whatsapp
    pub channel: Option<order::OrderChannel>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub age_restricted: bool,
}

impl From<&product::Model> for ProductSummary {
    fn from(p: &product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            age_restricted: p.age_restricted,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Catalog price captured at commit time
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: Decimal,
    pub status: order::OrderStatus,
    pub channel: order::OrderChannel,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

fn compose_response(
    header: order::Model,
    items: Vec<order_item::Model>,
    products: &HashMap<Uuid, product::Model>,
) -> OrderResponse {
    let items = items
        .into_iter()
        .map(|it| OrderItemResponse {
            id: it.id,
            product_id: it.product_id,
            quantity: it.quantity,
            unit_price: it.unit_price,
            subtotal: it.unit_price * Decimal::from(it.quantity),
            product: products.get(&it.product_id).map(ProductSummary::from),
        })
        .collect();

    OrderResponse {
        id: header.id,
        customer_id: header.customer_id,
        total: header.total,
        status: header.status,
        channel: header.channel,
        contact_phone: header.contact_phone,
        notes: header.notes,
        created_at: header.created_at,
        items,
    }
}

/// Order commitment engine, registered-customer call site.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    directory: CustomerDirectory,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        directory: CustomerDirectory,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            directory,
            event_sender,
        }
    }

    /// Commits an order atomically: locked catalog read, stock check, price
    /// snapshot, header + items insert, guarded stock decrement. Any failure
    /// rolls the whole unit back.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let consolidated = cart::normalize(&request.items)?;

        // Orders are registered-only; resolve the payer before opening the
        // transaction.
        let customer = self
            .directory
            .find_by_user(user_id)
            .await?
            .ok_or(ServiceError::CustomerProfileMissing)?;

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

        let total: Decimal = consolidated
            .lines()
            .map(|line| products[&line.product_id].price * Decimal::from(line.quantity))
            .sum();

        let now = Utc::now();
        let header = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.id),
            total: Set(total),
            status: Set(order::OrderStatus::AwaitingConfirmation),
            channel: Set(request.channel.unwrap_or(order::OrderChannel::Whatsapp)),
            contact_phone: Set(request.contact_phone.clone()),
            notes: Set(request.notes.clone()),
            confirmed_at: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(consolidated.len());
        for line in consolidated.lines() {
            let product = &products[&line.product_id];
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(header.id),
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
                // Guard failed at write time; a concurrent commit got there
                // first. Re-read so the reported availability is current.
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

        if let Err(e) = self.event_sender.send(Event::OrderCreated(header.id)).await {
            warn!(order_id = %header.id, error = %e, "Failed to publish order created event");
        }

        Ok(compose_response(header, items, &products))
    }

    /// Fetches a committed order; customers see only their own.
    #[instrument(skip(self, actor), fields(order_id = %order_id))]
    pub async fn get_order(
        &self,
        actor: &AuthUser,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let header = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !actor.is_privileged() {
            let owns = self
                .directory
                .find_by_user(actor.user_id)
                .await?
                .map(|c| c.id == header.customer_id)
                .unwrap_or(false);
            if !owns {
                return Err(ServiceError::Forbidden(
                    "You do not have access to this order".to_string(),
                ));
            }
        }

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        let product_ids: Vec<Uuid> = items.iter().map(|it| it.product_id).collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(compose_response(header, items, &products))
    }
}
