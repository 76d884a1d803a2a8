pub mod cart;
pub mod catalog;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod preorders;
