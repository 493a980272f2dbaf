//! Client which talks to a server in whichever protocol dialect it speaks.
//!
//! [`Client::connect`] binds one wire dialect and one formatter for the
//! lifetime of the instance. With [`Version::Auto`] the server is pinged
//! once and the advertised version decides the binding; detection never
//! re-runs afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use influxdb_compat::{Client, ClientConfig, Point};
//!
//! # async fn demo() -> Result<(), influxdb_compat::Error> {
//! let config = ClientConfig::new("http://localhost:8086", "root", "root");
//! let client = Client::connect(config).await?;
//!
//! let point = Point::new("cpu").field("value", 0.64);
//! client.write("mydb", &[point]).await?;
//! # Ok(())
//! # }
//! ```

pub mod transport;
mod v08x;
mod v09x;
pub mod wire;

use std::time::{Duration, Instant};

use crate::error::Error;
use crate::formatter::Formatter;
use crate::models::{ContinuousQuery, Database, DatabaseConfiguration, Pong, ShardSpace, User};
use crate::point::{Point, Precision, WriteRequest};
use crate::response::{ApiResponse, Serie, WriteResponse};
use crate::version::Version;

use self::transport::{HttpTransport, NO_HANDLERS};
use self::v08x::SegmentApiClient;
use self::v09x::QueryApiClient;
use self::wire::WireClient;

/// Connection settings for [`Client::connect`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) version: Version,
    pub(crate) timeout: Option<Duration>,
}

impl ClientConfig {
    /// Settings for a server at `base_url` (ex. `http://localhost:8086`),
    /// defaulting to automatic version detection and no request timeout.
    pub fn new<S1, S2, S3>(base_url: S1, username: S2, password: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        ClientConfig {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            version: Version::Auto,
            timeout: None,
        }
    }

    /// Requests a specific protocol version instead of detecting one.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Applies a request timeout to every call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidArgumentError {
                error: "base URL may not be empty".to_string(),
            });
        }
        if self.username.is_empty() {
            return Err(Error::InvalidArgumentError {
                error: "username may not be empty".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(Error::InvalidArgumentError {
                error: "password may not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A connected client, bound to one dialect and one formatter.
///
/// All operations take `&self`; the binding is immutable, so one instance
/// can be shared across tasks.
pub struct Client {
    wire: Box<dyn WireClient>,
}

impl Client {
    /// Connects and binds the wire dialect.
    ///
    /// With [`Version::Auto`] the server is pinged first; a failed ping
    /// fails construction. An advertised version with no dedicated dialect
    /// falls back to [`Version::V0`], which is still reachable.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;

        let version = match config.version {
            Version::Auto => {
                let response =
                    transport
                        .ping(NO_HANDLERS)
                        .await
                        .map_err(|err| Error::VersionDetectionError {
                            error: err.to_string(),
                        })?;
                Version::from_version_string(&response.body)
            }
            explicit => explicit,
        };

        let wire: Box<dyn WireClient> = match version {
            Version::V0_8 => Box::new(SegmentApiClient::new(transport, version)),
            _ => Box::new(QueryApiClient::new(transport, version)),
        };

        Ok(Client { wire })
    }

    /// The protocol version this client is bound to.
    pub fn version(&self) -> Version {
        self.wire.version()
    }

    /// The line protocol formatter matching the bound version.
    pub fn formatter(&self) -> &dyn Formatter {
        self.wire.formatter()
    }

    /// The bound wire client, for calls that need their own error handlers.
    pub fn wire(&self) -> &dyn WireClient {
        self.wire.as_ref()
    }

    /// Pings the server and measures the round trip.
    pub async fn ping(&self) -> Result<Pong, Error> {
        let started = Instant::now();
        let response = self.wire.ping(NO_HANDLERS).await?;
        Ok(Pong {
            version: response.body,
            response_time: started.elapsed(),
            success: true,
        })
    }

    pub async fn create_database(&self, name: &str) -> Result<ApiResponse, Error> {
        self.wire.create_database(NO_HANDLERS, name).await
    }

    /// Creates a database together with its shard spaces and continuous
    /// queries, where the dialect supports configured creation.
    pub async fn create_database_from_config(
        &self,
        config: &DatabaseConfiguration,
    ) -> Result<ApiResponse, Error> {
        self.wire.create_database_from_config(NO_HANDLERS, config).await
    }

    pub async fn drop_database(&self, name: &str) -> Result<ApiResponse, Error> {
        self.wire.drop_database(NO_HANDLERS, name).await
    }

    pub async fn show_databases(&self) -> Result<Vec<Database>, Error> {
        self.wire.show_databases(NO_HANDLERS).await
    }

    /// Writes points under the `default` retention policy with millisecond
    /// precision.
    pub async fn write(&self, database: &str, points: &[Point]) -> Result<WriteResponse, Error> {
        self.write_with_precision(database, points, Precision::Milliseconds)
            .await
    }

    pub async fn write_with_precision(
        &self,
        database: &str,
        points: &[Point],
        precision: Precision,
    ) -> Result<WriteResponse, Error> {
        let request = WriteRequest::new(self.wire.formatter(), database, "default", points);
        self.wire.write(NO_HANDLERS, &request, precision).await
    }

    /// Runs a raw query and returns the matched series. An error embedded
    /// in an HTTP 200 envelope surfaces as [`Error::ApiError`].
    pub async fn query(&self, database: &str, query: &str) -> Result<Vec<Serie>, Error> {
        self.wire.query(NO_HANDLERS, database, query).await
    }

    pub async fn describe_continuous_queries(
        &self,
        database: &str,
    ) -> Result<Vec<ContinuousQuery>, Error> {
        self.wire.get_continuous_queries(NO_HANDLERS, database).await
    }

    pub async fn delete_continuous_query(
        &self,
        database: &str,
        id: i64,
    ) -> Result<ApiResponse, Error> {
        self.wire
            .delete_continuous_query(NO_HANDLERS, database, id)
            .await
    }

    pub async fn drop_series(&self, database: &str, name: &str) -> Result<ApiResponse, Error> {
        self.wire.drop_series(NO_HANDLERS, database, name).await
    }

    pub async fn create_cluster_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiResponse, Error> {
        let user = User {
            name: username.to_string(),
            password: password.to_string(),
            is_admin: true,
            ..User::default()
        };
        self.wire.create_cluster_admin(NO_HANDLERS, &user).await
    }

    pub async fn delete_cluster_admin(&self, name: &str) -> Result<ApiResponse, Error> {
        self.wire.delete_cluster_admin(NO_HANDLERS, name).await
    }

    pub async fn describe_cluster_admins(&self) -> Result<Vec<User>, Error> {
        self.wire.describe_cluster_admins(NO_HANDLERS).await
    }

    pub async fn update_cluster_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiResponse, Error> {
        let user = User {
            name: username.to_string(),
            password: password.to_string(),
            is_admin: true,
            ..User::default()
        };
        self.wire
            .update_cluster_admin(NO_HANDLERS, &user, username)
            .await
    }

    /// Creates a database user, optionally with a `readFrom`/`writeTo`
    /// permission pair.
    pub async fn create_database_user(
        &self,
        database: &str,
        name: &str,
        password: &str,
        permissions: &[&str],
    ) -> Result<ApiResponse, Error> {
        let mut user = User {
            name: name.to_string(),
            password: password.to_string(),
            ..User::default()
        };
        user.set_permissions(permissions)?;
        self.wire
            .create_database_user(NO_HANDLERS, database, &user)
            .await
    }

    pub async fn delete_database_user(
        &self,
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.wire
            .delete_database_user(NO_HANDLERS, database, name)
            .await
    }

    pub async fn describe_database_users(&self, database: &str) -> Result<Vec<User>, Error> {
        self.wire.describe_database_users(NO_HANDLERS, database).await
    }

    pub async fn update_database_user(
        &self,
        database: &str,
        name: &str,
        password: &str,
        permissions: &[&str],
    ) -> Result<ApiResponse, Error> {
        let mut user = User {
            name: name.to_string(),
            password: password.to_string(),
            ..User::default()
        };
        user.set_permissions(permissions)?;
        self.wire
            .update_database_user(NO_HANDLERS, database, &user, name)
            .await
    }

    pub async fn authenticate_database_user(
        &self,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<ApiResponse, Error> {
        self.wire
            .authenticate_database_user(NO_HANDLERS, database, user, password)
            .await
    }

    pub async fn get_shard_spaces(&self) -> Result<Vec<ShardSpace>, Error> {
        self.wire.get_shard_spaces(NO_HANDLERS).await
    }

    pub async fn drop_shard_space(
        &self,
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.wire.drop_shard_space(NO_HANDLERS, database, name).await
    }

    pub async fn create_shard_space(
        &self,
        database: &str,
        shard_space: &ShardSpace,
    ) -> Result<ApiResponse, Error> {
        self.wire
            .create_shard_space(NO_HANDLERS, database, shard_space)
            .await
    }

    pub async fn alter_retention_policy(
        &self,
        policy: &str,
        database: &str,
        duration: &str,
        replication: i32,
    ) -> Result<ApiResponse, Error> {
        self.wire
            .alter_retention_policy(NO_HANDLERS, policy, database, duration, replication)
            .await
    }
}
