use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Raw cart line as submitted by the client. Quantity is accepted as i64 so
/// absurd values fail our validation instead of the deserializer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// One consolidated cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart with duplicate product lines merged. Immutable once built; the
/// commitment engine works exclusively from this form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedCart {
    quantities: BTreeMap<Uuid, i32>,
}

impl ConsolidatedCart {
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Distinct product ids, in stable (sorted) order
    pub fn product_ids(&self) -> Vec<Uuid> {
        self.quantities.keys().copied().collect()
    }

    pub fn quantity_of(&self, product_id: &Uuid) -> Option<i32> {
        self.quantities.get(product_id).copied()
    }

    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.quantities.iter().map(|(&product_id, &quantity)| CartLine {
            product_id,
            quantity,
        })
    }
}

/// Merges duplicate product lines into one line per product, summing
/// quantities. Pure; performs no I/O and never touches the catalog.
pub fn normalize(items: &[CartItemInput]) -> Result<ConsolidatedCart, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "items is required (non-empty array)".to_string(),
        ));
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Each item must have a quantity > 0 (product {})",
                item.product_id
            )));
        }
    }

    let quantities = items.iter().try_fold(
        BTreeMap::<Uuid, i64>::new(),
        |mut acc, item| {
            let entry = acc.entry(item.product_id).or_insert(0);
            *entry = entry.checked_add(item.quantity).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Consolidated quantity overflows for product {}",
                    item.product_id
                ))
            })?;
            Ok::<_, ServiceError>(acc)
        },
    )?;

    let quantities = quantities
        .into_iter()
        .map(|(product_id, total)| {
            i32::try_from(total).map(|qty| (product_id, qty)).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Consolidated quantity too large for product {}",
                    product_id
                ))
            })
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(ConsolidatedCart { quantities })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, quantity: i64) -> CartItemInput {
        CartItemInput {
            product_id,
            quantity,
        }
    }

    #[test]
    fn consolidates_duplicate_lines() {
        let pid = Uuid::new_v4();
        let cart = normalize(&[item(pid, 2), item(pid, 3)]).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&pid), Some(5));
    }

    #[test]
    fn keeps_distinct_products_apart() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let cart = normalize(&[item(a, 1), item(b, 4), item(a, 2)]).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(&a), Some(3));
        assert_eq!(cart.quantity_of(&b), Some(4));
    }

    #[test]
    fn rejects_empty_cart() {
        assert!(matches!(
            normalize(&[]),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_non_positive_quantities() {
        let pid = Uuid::new_v4();
        assert!(normalize(&[item(pid, 0)]).is_err());
        assert!(normalize(&[item(pid, -3)]).is_err());
    }

    #[test]
    fn rejects_consolidated_overflow() {
        let pid = Uuid::new_v4();
        let result = normalize(&[item(pid, i64::from(i32::MAX)), item(pid, 1)]);
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
