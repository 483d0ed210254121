//! # Mock Provider

pub mod keys;
pub mod realm;

mod store;

pub use realm::Realm;
