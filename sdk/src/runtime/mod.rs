//! Runtime support linked by generated modules

pub mod client;
pub mod coerce;
pub mod filter;
pub mod operations;

pub use client::GraphClient;
pub use coerce::{coerce_value, value_tag};
pub use filter::PropertyFilter;
pub use operations::DatabaseOperations;
