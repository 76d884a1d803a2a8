pub mod orders;
pub mod payments;
pub mod preorders;

use crate::config::AppConfig;
use crate::entities::payment::PaymentStatus;
use crate::events::EventSender;
use crate::services::{
    customers::CustomerDirectory, orders::OrderService, payments::PaymentService,
    preorders::PreOrderService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Service container shared through AppState
#[derive(Clone)]
pub struct AppServices {
    pub orders: OrderService,
    pub preorders: PreOrderService,
    pub payments: PaymentService,
    pub customers: CustomerDirectory,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let directory = CustomerDirectory::new(db.clone());
        // The value is validated at config load time
        let default_status =
            PaymentStatus::parse(&config.payment_default_status).unwrap_or(PaymentStatus::Pending);

        Self {
            orders: OrderService::new(db.clone(), directory.clone(), event_sender.clone()),
            preorders: PreOrderService::new(
                db.clone(),
                directory.clone(),
                event_sender.clone(),
                config.whatsapp_business.clone(),
            ),
            payments: PaymentService::new(db, directory.clone(), event_sender, default_status),
            customers: directory,
        }
    }
}
