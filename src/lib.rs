//! An async client for InfluxDB servers old and new, speaking whichever
//! protocol dialect the server understands.
//!
//! The servers this crate targets changed their HTTP API and their line
//! protocol several times between 0.8 and 1.1. Instead of asking the caller
//! to know which dialect their server speaks, [`Client::connect`] can ping
//! the server, read the advertised version and bind the matching wire
//! client and line protocol formatter once, for the lifetime of the
//! instance.
//!
//! ## Currently Supported Features
//!
//! -   Automatic server version detection, or an explicitly pinned version
//! -   Line protocol writes with per-version formatting dialects
//! -   Raw queries with typed series results
//! -   Database, user, cluster admin and shard space management
//! -   Continuous query listing and retention policy changes
//! -   Per-call error handler chains for custom status handling
//!
//! # Quickstart
//!
//! ```rust,no_run
//! use influxdb_compat::{Client, ClientConfig, Point};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), influxdb_compat::Error> {
//!     // Detect the server version and bind the matching dialect.
//!     let config = ClientConfig::new("http://localhost:8086", "root", "root");
//!     let client = Client::connect(config).await?;
//!
//!     client.create_database("weather").await?;
//!
//!     let point = Point::new("reading")
//!         .tag("location", "us-midwest")
//!         .field("temperature", 82)
//!         .timestamp(chrono::Utc::now());
//!     client.write("weather", &[point]).await?;
//!
//!     let series = client.query("weather", "SELECT * FROM reading").await?;
//!     println!("{:?}", series);
//!     Ok(())
//! }
//! ```
//!
//! For further examples, check out the integration tests in
//! `tests/integration_tests.rs` in the repository.

#![allow(clippy::needless_doctest_main)]

mod client;
mod error;
mod formatter;
mod line_protocol;
mod models;
mod point;
mod response;
mod version;

pub use client::{
    transport::{Handled, Handler, NO_HANDLERS},
    wire::WireClient,
    Client, ClientConfig,
};
pub use error::Error;
pub use formatter::{Formatter, FormatterV092, FormatterV09x, FormatterV0x};
pub use models::{
    ContinuousQuery, Database, DatabaseConfiguration, Pong, Server, ShardSpace, User,
};
pub use point::{Point, Precision, Value, WriteRequest};
pub use response::{
    ApiResponse, CreateResponse, DeleteResponse, QueryResult, Serie, StatementResult,
    WriteResponse,
};
pub use version::Version;
