//! The engine's public API.
//!
//! Thin, backend-generic wrappers over the [`crate::traits`] contracts: [`OrderFlowApi`] drives
//! the payment → delivery → settlement flow, [`DisputeApi`] the adjudication and penalty flow,
//! and [`AccountApi`] the query and withdrawal surface.
pub mod account_objects;
pub mod accounts_api;
pub mod dispute_api;
pub mod order_flow_api;
pub mod order_objects;

pub use accounts_api::AccountApi;
pub use dispute_api::DisputeApi;
pub use order_flow_api::OrderFlowApi;
