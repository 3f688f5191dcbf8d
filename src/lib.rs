pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod metrics;
pub mod models;
pub mod proto;
pub mod query;
pub mod region;

pub use error::{AdapterError, Result};
