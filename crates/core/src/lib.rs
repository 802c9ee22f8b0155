pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::cart::{Cart, CartEntry, CheckoutReceipt, LineItem};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
