pub mod audit_service;
pub mod error;
pub mod payout_provider;
pub mod resolution_service;
pub mod settlement_service;
pub mod violation_service;
