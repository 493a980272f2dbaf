//! The wire protocol strategy: one trait, one implementation per dialect.

use async_trait::async_trait;

use crate::client::transport::Handler;
use crate::error::Error;
use crate::formatter::Formatter;
use crate::models::{ContinuousQuery, Database, DatabaseConfiguration, ShardSpace, User};
use crate::point::{Precision, WriteRequest};
use crate::response::{ApiResponse, Serie, WriteResponse};
use crate::version::Version;

/// The full operation surface a server dialect can offer.
///
/// Every call takes an ordered slice of error handlers consulted before the
/// default status check. Operations a dialect has no wire equivalent for
/// return [`Error::NotSupportedError`] rather than silently succeeding.
#[async_trait]
pub trait WireClient: Send + Sync {
    /// The protocol version this client was bound for.
    fn version(&self) -> Version;

    /// The line protocol formatter matching that version.
    fn formatter(&self) -> &dyn Formatter;

    /// Pings the server; the response body carries the advertised version.
    async fn ping(&self, handlers: &[&Handler]) -> Result<ApiResponse, Error>;

    async fn create_database(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error>;

    /// Creates a database together with shard spaces and continuous queries.
    async fn create_database_from_config(
        &self,
        handlers: &[&Handler],
        config: &DatabaseConfiguration,
    ) -> Result<ApiResponse, Error>;

    async fn drop_database(&self, handlers: &[&Handler], name: &str)
        -> Result<ApiResponse, Error>;

    async fn show_databases(&self, handlers: &[&Handler]) -> Result<Vec<Database>, Error>;

    /// Writes a batch of points in the precision given.
    async fn write(
        &self,
        handlers: &[&Handler],
        request: &WriteRequest<'_>,
        precision: Precision,
    ) -> Result<WriteResponse, Error>;

    /// Runs a raw query against a database and returns the matched series.
    async fn query(
        &self,
        handlers: &[&Handler],
        database: &str,
        query: &str,
    ) -> Result<Vec<Serie>, Error>;

    async fn get_continuous_queries(
        &self,
        handlers: &[&Handler],
        database: &str,
    ) -> Result<Vec<ContinuousQuery>, Error>;

    async fn delete_continuous_query(
        &self,
        handlers: &[&Handler],
        database: &str,
        id: i64,
    ) -> Result<ApiResponse, Error>;

    async fn drop_series(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn create_cluster_admin(
        &self,
        handlers: &[&Handler],
        user: &User,
    ) -> Result<ApiResponse, Error>;

    async fn delete_cluster_admin(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn describe_cluster_admins(&self, handlers: &[&Handler]) -> Result<Vec<User>, Error>;

    async fn update_cluster_admin(
        &self,
        handlers: &[&Handler],
        user: &User,
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn create_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &User,
    ) -> Result<ApiResponse, Error>;

    async fn delete_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn describe_database_users(
        &self,
        handlers: &[&Handler],
        database: &str,
    ) -> Result<Vec<User>, Error>;

    async fn update_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &User,
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn authenticate_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<ApiResponse, Error>;

    async fn get_shard_spaces(&self, handlers: &[&Handler]) -> Result<Vec<ShardSpace>, Error>;

    async fn drop_shard_space(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error>;

    async fn create_shard_space(
        &self,
        handlers: &[&Handler],
        database: &str,
        shard_space: &ShardSpace,
    ) -> Result<ApiResponse, Error>;

    async fn alter_retention_policy(
        &self,
        handlers: &[&Handler],
        policy: &str,
        database: &str,
        duration: &str,
        replication: i32,
    ) -> Result<ApiResponse, Error>;
}
