pub mod aggregator;
pub mod app;
pub mod batch;
pub mod category;
pub mod cli_args;
pub mod configuration;
pub mod error;
pub mod id_cache;
pub mod market;
pub mod reqwest_helpers;
pub mod report;
pub mod resolver;
pub mod xiv_client;
pub mod xiv_model;

pub use batch::{BatchResult, BatchRunner, ItemFailure};
pub use error::{ErrorKind, PricecheckError};
pub use xiv_model::{ItemId, ItemRecord, TransactionRecord, NO_RECENT_SALES};
