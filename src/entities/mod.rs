pub mod customer;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod pre_order;
pub mod pre_order_item;
pub mod product;
