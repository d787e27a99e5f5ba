//! azure-dyndns-core – configuration, public-IP discovery and the
//! one-shot/service update drivers.

pub mod cfg;
pub mod error;
pub mod ip;
pub mod service;
pub mod update;

pub use cfg::Config;
pub use error::Error;
