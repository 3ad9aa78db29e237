//! Core types for Sabiá.
//!
//! This module provides the cart domain model and the payloads exchanged
//! between the client store, the cart endpoint, and the checkout flow.

pub mod cart;
pub mod customer;
pub mod payment;
pub mod reference;

pub use cart::{Cart, CartItem, NewCartItem};
pub use customer::{Address, CustomerData, CustomerDataError, Phone};
pub use payment::PaymentStatus;
pub use reference::OrderReference;
