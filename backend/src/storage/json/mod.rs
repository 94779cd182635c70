//! TinyDB-compatible JSON file bill store.

pub mod bill_repository;

pub use bill_repository::JsonBillRepository;
