#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;

pub use client::RemoteStateClient;
pub use config::RemoteConfig;
pub use error::RemoteError;
pub use http::HttpRemoteClient;
pub use memory::{CallCounts, InMemoryRemote};
