use crate::auth::AuthUser;
use crate::entities::{order, payment};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::customers::CustomerDirectory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordPaymentInput {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: payment::PaymentMethod,
    /// Falls back to the configured default when omitted
    pub status: Option<payment::PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusInput {
    pub status: payment::PaymentStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: payment::PaymentMethod,
    pub status: payment::PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<payment::Model> for PaymentResponse {
    fn from(p: payment::Model) -> Self {
        Self {
            id: p.id,
            order_id: p.order_id,
            amount: p.amount,
            method: p.method,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Payment reconciliation: at most one payment row per order, re-submission
/// updates in place.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    directory: CustomerDirectory,
    event_sender: Arc<EventSender>,
    default_status: payment::PaymentStatus,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        directory: CustomerDirectory,
        event_sender: Arc<EventSender>,
        default_status: payment::PaymentStatus,
    ) -> Self {
        Self {
            db,
            directory,
            event_sender,
            default_status,
        }
    }

    /// Privileged roles act on any order; a customer only on an order owned
    /// by their linked profile.
    async fn authorize(&self, actor: &AuthUser, order: &order::Model) -> Result<(), ServiceError> {
        if actor.is_privileged() {
            return Ok(());
        }
        let owns = self
            .directory
            .find_by_user(actor.user_id)
            .await?
            .map(|c| c.id == order.customer_id)
            .unwrap_or(false);
        if owns {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You do not have access to payments for this order".to_string(),
            ))
        }
    }

    async fn find_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn find_payment(&self, order_id: Uuid) -> Result<Option<payment::Model>, ServiceError> {
        let existing = payment::Entity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .one(self.db.as_ref())
            .await?;
        Ok(existing)
    }

    /// Records a payment for an order. Keyed on order_id: the first call
    /// inserts, later calls overwrite the same row.
    #[instrument(skip(self, actor, input), fields(order_id = %input.order_id))]
    pub async fn record(
        &self,
        actor: &AuthUser,
        input: RecordPaymentInput,
    ) -> Result<PaymentResponse, ServiceError> {
        if input.amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must not be negative".to_string(),
            ));
        }

        let order = self.find_order(input.order_id).await?;
        self.authorize(actor, &order).await?;

        let status = input.status.unwrap_or(self.default_status);
        let now = Utc::now();

        // Single atomic statement keyed on the unique order_id index, so two
        // concurrent first submissions cannot both insert.
        payment::Entity::insert(payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(input.order_id),
            amount: Set(input.amount),
            method: Set(input.method),
            status: Set(status),
            created_at: Set(now),
            updated_at: Set(None),
        })
        .on_conflict(
            OnConflict::column(payment::Column::OrderId)
                .update_columns([
                    payment::Column::Amount,
                    payment::Column::Method,
                    payment::Column::Status,
                ])
                .value(payment::Column::UpdatedAt, now)
                .to_owned(),
        )
        .exec(self.db.as_ref())
        .await?;

        let saved = self.find_payment(input.order_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Payment row missing after upsert for order {}",
                input.order_id
            ))
        })?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentRecorded {
                order_id: saved.order_id,
                status: format!("{:?}", saved.status).to_lowercase(),
            })
            .await
        {
            warn!(order_id = %saved.order_id, error = %e, "Failed to publish payment recorded event");
        }

        Ok(saved.into())
    }

    /// Fetches the payment recorded for an order, under the same
    /// ownership-or-privilege rule as record.
    #[instrument(skip(self, actor), fields(order_id = %order_id))]
    pub async fn get(
        &self,
        actor: &AuthUser,
        order_id: Uuid,
    ) -> Result<PaymentResponse, ServiceError> {
        let order = self.find_order(order_id).await?;
        self.authorize(actor, &order).await?;

        self.find_payment(order_id)
            .await?
            .map(PaymentResponse::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No payment recorded for order {}", order_id))
            })
    }

    /// Changes payment status. Privileged roles only.
    #[instrument(skip(self, actor), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        actor: &AuthUser,
        order_id: Uuid,
        new_status: payment::PaymentStatus,
    ) -> Result<PaymentResponse, ServiceError> {
        if !actor.is_privileged() {
            return Err(ServiceError::Forbidden(
                "Only privileged roles may change payment status".to_string(),
            ));
        }

        let existing = self.find_payment(order_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("No payment recorded for order {}", order_id))
        })?;

        let old_status = existing.status;
        let mut active = existing.into_active_model();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let saved = active.update(self.db.as_ref()).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentStatusChanged {
                order_id: saved.order_id,
                old_status: format!("{:?}", old_status).to_lowercase(),
                new_status: format!("{:?}", saved.status).to_lowercase(),
            })
            .await
        {
            warn!(order_id = %saved.order_id, error = %e, "Failed to publish payment status event");
        }

        Ok(saved.into())
    }
}
