//! The 0.9+ dialect: a unified `/query` endpoint driven by InfluxQL
//! statements, and `/write` for line protocol bodies.

use async_trait::async_trait;
use reqwest::Method;

use crate::client::transport::{Body, Handler, HttpTransport};
use crate::client::wire::WireClient;
use crate::error::Error;
use crate::formatter::Formatter;
use crate::models::{ContinuousQuery, Database, DatabaseConfiguration, ShardSpace, User};
use crate::point::{Precision, WriteRequest};
use crate::response::{ApiResponse, QueryResult, Serie, WriteResponse};
use crate::version::Version;

/// InfluxQL statement builders, kept pure so they can be tested without a
/// server. Identifiers are double-quoted, passwords single-quoted.
pub(crate) mod statements {
    pub(crate) fn create_database(name: &str) -> String {
        format!(r#"CREATE DATABASE "{}""#, name)
    }

    pub(crate) fn drop_database(name: &str) -> String {
        format!(r#"DROP DATABASE "{}""#, name)
    }

    pub(crate) const SHOW_DATABASES: &str = "SHOW DATABASES";

    pub(crate) fn drop_series(name: &str) -> String {
        format!(r#"DROP SERIES FROM "{}""#, name)
    }

    pub(crate) const SHOW_CONTINUOUS_QUERIES: &str = "SHOW CONTINUOUS QUERIES";

    pub(crate) fn create_user(name: &str, password: &str, admin: bool) -> String {
        let mut statement = format!(r#"CREATE USER "{}" WITH PASSWORD '{}'"#, name, password);
        if admin {
            statement.push_str(" WITH ALL PRIVILEGES");
        }
        statement
    }

    pub(crate) fn drop_user(name: &str) -> String {
        format!(r#"DROP USER "{}""#, name)
    }

    pub(crate) const SHOW_USERS: &str = "SHOW USERS";

    pub(crate) fn alter_retention_policy(
        policy: &str,
        database: &str,
        duration: &str,
        replication: i32,
    ) -> String {
        format!(
            r#"ALTER RETENTION POLICY "{}" ON "{}" DURATION {} REPLICATION {}"#,
            policy, database, duration, replication
        )
    }
}

/// Wire client for every server from 0.9 on. The formatter varies with the
/// exact version; the endpoints do not.
pub(crate) struct QueryApiClient {
    transport: HttpTransport,
    version: Version,
    formatter: Box<dyn Formatter>,
}

impl QueryApiClient {
    pub(crate) fn new(transport: HttpTransport, version: Version) -> Self {
        QueryApiClient {
            transport,
            version,
            formatter: version.formatter(),
        }
    }

    /// A management statement against `/query`, without a `db` parameter.
    async fn run_statement(
        &self,
        handlers: &[&Handler],
        statement: &str,
    ) -> Result<ApiResponse, Error> {
        self.transport
            .request(
                Method::GET,
                "query",
                &[("q", statement)],
                Body::None,
                true,
                handlers,
            )
            .await
    }

    async fn run_query(
        &self,
        handlers: &[&Handler],
        database: &str,
        query: &str,
    ) -> Result<Vec<Serie>, Error> {
        let response = self
            .transport
            .request(
                Method::GET,
                "query",
                &[("db", database), ("q", query)],
                Body::None,
                true,
                handlers,
            )
            .await?;
        response.read_as::<QueryResult>()?.into_series()
    }

    fn not_supported(&self, operation: &'static str) -> Error {
        Error::NotSupportedError {
            version: self.version,
            operation,
        }
    }
}

/// Pulls the named column out of a serie row as a string, if present.
fn column_text(serie: &Serie, row: &[serde_json::Value], column: &str) -> Option<String> {
    let index = serie.columns.iter().position(|c| c == column)?;
    row.get(index)?.as_str().map(str::to_string)
}

fn column_bool(serie: &Serie, row: &[serde_json::Value], column: &str) -> bool {
    serie
        .columns
        .iter()
        .position(|c| c == column)
        .and_then(|index| row.get(index))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

/// Parses `SHOW USERS` output: one serie with `user` and `admin` columns.
fn series_to_users(series: Vec<Serie>) -> Vec<User> {
    series
        .iter()
        .flat_map(|serie| {
            serie.values.iter().filter_map(|row| {
                Some(User {
                    name: column_text(serie, row, "user")?,
                    is_admin: column_bool(serie, row, "admin"),
                    ..User::default()
                })
            })
        })
        .collect()
}

#[async_trait]
impl WireClient for QueryApiClient {
    fn version(&self) -> Version {
        self.version
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    async fn ping(&self, handlers: &[&Handler]) -> Result<ApiResponse, Error> {
        self.transport.ping(handlers).await
    }

    async fn create_database(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(handlers, &statements::create_database(name))
            .await
    }

    async fn create_database_from_config(
        &self,
        _handlers: &[&Handler],
        _config: &DatabaseConfiguration,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("create database from configuration"))
    }

    async fn drop_database(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(handlers, &statements::drop_database(name))
            .await
    }

    async fn show_databases(&self, handlers: &[&Handler]) -> Result<Vec<Database>, Error> {
        let response = self.run_statement(handlers, statements::SHOW_DATABASES).await?;
        let series = response.read_as::<QueryResult>()?.into_series()?;
        let databases = series
            .iter()
            .flat_map(|serie| {
                serie.values.iter().filter_map(|row| {
                    row.first().and_then(|v| v.as_str()).map(|name| Database {
                        name: name.to_string(),
                    })
                })
            })
            .collect();
        Ok(databases)
    }

    async fn write(
        &self,
        handlers: &[&Handler],
        request: &WriteRequest<'_>,
        precision: Precision,
    ) -> Result<WriteResponse, Error> {
        let lines = request.lines()?;
        let response = self
            .transport
            .request(
                Method::POST,
                "write",
                &[("db", request.database), ("precision", precision.query_param()?)],
                Body::Text(lines),
                true,
                handlers,
            )
            .await?;
        Ok(WriteResponse(response))
    }

    async fn query(
        &self,
        handlers: &[&Handler],
        database: &str,
        query: &str,
    ) -> Result<Vec<Serie>, Error> {
        self.run_query(handlers, database, query).await
    }

    async fn get_continuous_queries(
        &self,
        handlers: &[&Handler],
        database: &str,
    ) -> Result<Vec<ContinuousQuery>, Error> {
        let series = self
            .run_query(handlers, database, statements::SHOW_CONTINUOUS_QUERIES)
            .await?;
        let queries = series
            .iter()
            .flat_map(|serie| {
                serie.values.iter().filter_map(|row| {
                    Some(ContinuousQuery {
                        id: 0,
                        name: column_text(serie, row, "name"),
                        query: column_text(serie, row, "query")?,
                    })
                })
            })
            .collect();
        Ok(queries)
    }

    async fn delete_continuous_query(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _id: i64,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("delete continuous query by id"))
    }

    async fn drop_series(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.transport
            .request(
                Method::GET,
                "query",
                &[("db", database), ("q", &statements::drop_series(name))],
                Body::None,
                true,
                handlers,
            )
            .await
    }

    async fn create_cluster_admin(
        &self,
        handlers: &[&Handler],
        user: &User,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(
            handlers,
            &statements::create_user(&user.name, &user.password, true),
        )
        .await
    }

    async fn delete_cluster_admin(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(handlers, &statements::drop_user(name))
            .await
    }

    async fn describe_cluster_admins(&self, handlers: &[&Handler]) -> Result<Vec<User>, Error> {
        let response = self.run_statement(handlers, statements::SHOW_USERS).await?;
        let series = response.read_as::<QueryResult>()?.into_series()?;
        let admins = series_to_users(series)
            .into_iter()
            .filter(|user| user.is_admin)
            .collect();
        Ok(admins)
    }

    async fn update_cluster_admin(
        &self,
        _handlers: &[&Handler],
        _user: &User,
        _name: &str,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("update cluster admin"))
    }

    async fn create_database_user(
        &self,
        handlers: &[&Handler],
        _database: &str,
        user: &User,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(
            handlers,
            &statements::create_user(&user.name, &user.password, user.is_admin),
        )
        .await
    }

    async fn delete_database_user(
        &self,
        handlers: &[&Handler],
        _database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(handlers, &statements::drop_user(name))
            .await
    }

    async fn describe_database_users(
        &self,
        handlers: &[&Handler],
        _database: &str,
    ) -> Result<Vec<User>, Error> {
        let response = self.run_statement(handlers, statements::SHOW_USERS).await?;
        let series = response.read_as::<QueryResult>()?.into_series()?;
        Ok(series_to_users(series))
    }

    async fn update_database_user(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _user: &User,
        _name: &str,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("update database user"))
    }

    async fn authenticate_database_user(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _user: &str,
        _password: &str,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("authenticate database user"))
    }

    async fn get_shard_spaces(&self, _handlers: &[&Handler]) -> Result<Vec<ShardSpace>, Error> {
        Err(self.not_supported("get shard spaces"))
    }

    async fn drop_shard_space(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _name: &str,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("drop shard space"))
    }

    async fn create_shard_space(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _shard_space: &ShardSpace,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("create shard space"))
    }

    async fn alter_retention_policy(
        &self,
        handlers: &[&Handler],
        policy: &str,
        database: &str,
        duration: &str,
        replication: i32,
    ) -> Result<ApiResponse, Error> {
        self.run_statement(
            handlers,
            &statements::alter_retention_policy(policy, database, duration, replication),
        )
        .await
    }
}
