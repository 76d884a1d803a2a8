use crate::entities::customer;
use crate::errors::ServiceError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only view over customer profiles. Profiles are provisioned by
/// collaborators outside this service; the order and payment paths only
/// need the user → customer linkage.
#[derive(Clone)]
pub struct CustomerDirectory {
    db: Arc<sea_orm::DatabaseConnection>,
}

impl CustomerDirectory {
    pub fn new(db: Arc<sea_orm::DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolves the customer profile linked to an authenticated user, if any
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<customer::Model>, ServiceError> {
        find_by_user_on(self.db.as_ref(), user_id).await
    }
}

/// Linkage query usable on any connection (pool or transaction)
pub async fn find_by_user_on<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<customer::Model>, ServiceError> {
    let customer = customer::Entity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(customer)
}
