use crate::entities::product;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Fetches the requested products for a commit. Returns exactly the subset
/// of ids that exist; the caller decides what an absence means.
///
/// Call this on the commit transaction: on Postgres the read takes row
/// locks (SELECT ... FOR UPDATE) so a stock check cannot race a concurrent
/// decrement. SQLite serializes writers on its own.
pub async fn fetch_for_commit<C: ConnectionTrait>(
    conn: &C,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, product::Model>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = product::Entity::find().filter(product::Column::Id.is_in(ids.iter().copied()));
    if conn.get_database_backend() == DbBackend::Postgres {
        query = query.lock_exclusive();
    }

    let products = query.all(conn).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Current on-hand stock as visible to the given connection. Used to report
/// an accurate availability after a failed decrement; a missing row counts
/// as zero.
pub async fn current_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<i32, ServiceError> {
    let stock = product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .map(|p| p.stock)
        .unwrap_or(0);
    Ok(stock)
}

/// Guarded stock decrement: only succeeds while `stock >= quantity` still
/// holds at write time. Returns false when the guard fails, in which case
/// the caller must roll back the whole commit.
pub async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> Result<bool, ServiceError> {
    let result = product::Entity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}
