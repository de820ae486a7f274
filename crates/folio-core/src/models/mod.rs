//! Data models for the portfolio and storefront APIs.
//!
//! - Portfolio dashboard: `Service`, `Plan`, `Project`, `Testimonial`, `Message`
//! - Store back office: `Product`, `Customer`, `Sale`, `Transaction`
//!
//! Every model implements `Resource`, so each gets its own `ResourceCache`,
//! and `Searchable`, so list views can filter it.

pub mod id;
pub mod portfolio;
pub mod retail;

pub use id::RecordId;
pub use portfolio::{Message, Plan, Project, Service, Testimonial};
pub use retail::{
    Customer, FinanceSummary, Product, Sale, SaleItem, Transaction, TransactionKind,
    DEFAULT_LOW_STOCK_THRESHOLD,
};
