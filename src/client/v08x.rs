//! The pre-0.9 dialect: path-segment URLs with JSON bodies instead of a
//! statement endpoint.

use async_trait::async_trait;
use http::StatusCode;
use reqwest::Method;

use crate::client::transport::{Body, Handled, Handler, HttpTransport};
use crate::client::wire::WireClient;
use crate::error::Error;
use crate::formatter::Formatter;
use crate::models::{ContinuousQuery, Database, DatabaseConfiguration, ShardSpace, User};
use crate::point::{Precision, WriteRequest};
use crate::response::{ApiResponse, CreateResponse, DeleteResponse, Serie, WriteResponse};
use crate::version::Version;

/// Wire client for 0.8 and older servers. Management travels as JSON over
/// per-object paths; the line protocol endpoints do not exist yet.
pub(crate) struct SegmentApiClient {
    transport: HttpTransport,
    version: Version,
    formatter: Box<dyn Formatter>,
}

impl SegmentApiClient {
    pub(crate) fn new(transport: HttpTransport, version: Version) -> Self {
        SegmentApiClient {
            transport,
            version,
            formatter: version.formatter(),
        }
    }

    fn not_supported(&self, operation: &'static str) -> Error {
        Error::NotSupportedError {
            version: self.version,
            operation,
        }
    }

    async fn post_json(
        &self,
        handlers: &[&Handler],
        path: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, Error> {
        self.transport
            .request(Method::POST, path, &[], Body::Json(body), true, handlers)
            .await
    }

    async fn get(&self, handlers: &[&Handler], path: &str) -> Result<ApiResponse, Error> {
        self.transport
            .request(Method::GET, path, &[], Body::None, true, handlers)
            .await
    }

    /// A create call must answer 201; anything else in the success range is
    /// still a failed create. The check joins the handler chain last, so a
    /// caller handler that suppresses a status wins over it.
    async fn create(
        &self,
        handlers: &[&Handler],
        path: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, Error> {
        let mut chain: Vec<&Handler> = Vec::with_capacity(handlers.len() + 1);
        chain.extend_from_slice(handlers);
        chain.push(&require_created);
        self.post_json(&chain, path, body).await
    }

    /// A delete call must answer 204, with the same chain ordering as
    /// [`Self::create`].
    async fn delete(&self, handlers: &[&Handler], path: &str) -> Result<ApiResponse, Error> {
        let mut chain: Vec<&Handler> = Vec::with_capacity(handlers.len() + 1);
        chain.extend_from_slice(handlers);
        chain.push(&require_no_content);
        self.transport
            .request(Method::DELETE, path, &[], Body::None, true, &chain)
            .await
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, Error> {
        serde_json::to_value(value).map_err(|err| Error::DeserializationError {
            error: err.to_string(),
        })
    }
}

/// Rejects everything but 201. Appended after the caller's handlers, so it
/// never sees a status one of them suppressed.
fn require_created(status_code: StatusCode, body: &str) -> Result<Handled, Error> {
    let response = CreateResponse(ApiResponse::new(status_code, body.to_string()));
    if response.success() {
        Ok(Handled::Pass)
    } else {
        Err(Error::ApiError {
            status_code,
            body: response.0.body,
        })
    }
}

/// Rejects everything but 204, under the same chain ordering.
fn require_no_content(status_code: StatusCode, body: &str) -> Result<Handled, Error> {
    let response = DeleteResponse(ApiResponse::new(status_code, body.to_string()));
    if response.success() {
        Ok(Handled::Pass)
    } else {
        Err(Error::ApiError {
            status_code,
            body: response.0.body,
        })
    }
}

#[async_trait]
impl WireClient for SegmentApiClient {
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
        self.create(handlers, "db", serde_json::json!({ "name": name }))
            .await
    }

    async fn create_database_from_config(
        &self,
        handlers: &[&Handler],
        config: &DatabaseConfiguration,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(config)?;
        self.create(handlers, "db", body).await
    }

    async fn drop_database(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(handlers, &format!("db/{}", name)).await
    }

    async fn show_databases(&self, handlers: &[&Handler]) -> Result<Vec<Database>, Error> {
        self.get(handlers, "db").await?.read_as()
    }

    async fn write(
        &self,
        _handlers: &[&Handler],
        _request: &WriteRequest<'_>,
        _precision: Precision,
    ) -> Result<WriteResponse, Error> {
        Err(self.not_supported("line protocol write"))
    }

    async fn query(
        &self,
        _handlers: &[&Handler],
        _database: &str,
        _query: &str,
    ) -> Result<Vec<Serie>, Error> {
        Err(self.not_supported("query"))
    }

    async fn get_continuous_queries(
        &self,
        handlers: &[&Handler],
        database: &str,
    ) -> Result<Vec<ContinuousQuery>, Error> {
        self.get(handlers, &format!("db/{}/continuous_queries", database))
            .await?
            .read_as()
    }

    async fn delete_continuous_query(
        &self,
        handlers: &[&Handler],
        database: &str,
        id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(
            handlers,
            &format!("db/{}/continuous_queries/{}", database, id),
        )
        .await
    }

    async fn drop_series(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(handlers, &format!("db/{}/series/{}", database, name))
            .await
    }

    async fn create_cluster_admin(
        &self,
        handlers: &[&Handler],
        user: &User,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(user)?;
        self.create(handlers, "cluster_admins", body).await
    }

    async fn delete_cluster_admin(
        &self,
        handlers: &[&Handler],
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(handlers, &format!("cluster_admins/{}", name))
            .await
    }

    async fn describe_cluster_admins(&self, handlers: &[&Handler]) -> Result<Vec<User>, Error> {
        self.get(handlers, "cluster_admins").await?.read_as()
    }

    async fn update_cluster_admin(
        &self,
        handlers: &[&Handler],
        user: &User,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(user)?;
        self.post_json(handlers, &format!("cluster_admins/{}", name), body)
            .await
    }

    async fn create_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &User,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(user)?;
        self.create(handlers, &format!("db/{}/users", database), body)
            .await
    }

    async fn delete_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(handlers, &format!("db/{}/users/{}", database, name))
            .await
    }

    async fn describe_database_users(
        &self,
        handlers: &[&Handler],
        database: &str,
    ) -> Result<Vec<User>, Error> {
        self.get(handlers, &format!("db/{}/users", database))
            .await?
            .read_as()
    }

    async fn update_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &User,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(user)?;
        self.post_json(handlers, &format!("db/{}/users/{}", database, name), body)
            .await
    }

    async fn authenticate_database_user(
        &self,
        handlers: &[&Handler],
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<ApiResponse, Error> {
        self.transport
            .request(
                Method::GET,
                &format!("db/{}/authenticate", database),
                &[("u", user), ("p", password)],
                Body::None,
                false,
                handlers,
            )
            .await
    }

    async fn get_shard_spaces(&self, handlers: &[&Handler]) -> Result<Vec<ShardSpace>, Error> {
        self.get(handlers, "cluster/shard_spaces").await?.read_as()
    }

    async fn drop_shard_space(
        &self,
        handlers: &[&Handler],
        database: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(
            handlers,
            &format!("cluster/shard_spaces/{}/{}", database, name),
        )
        .await
    }

    async fn create_shard_space(
        &self,
        handlers: &[&Handler],
        database: &str,
        shard_space: &ShardSpace,
    ) -> Result<ApiResponse, Error> {
        let body = Self::to_json(shard_space)?;
        self.create(handlers, &format!("cluster/shard_spaces/{}", database), body)
            .await
    }

    async fn alter_retention_policy(
        &self,
        _handlers: &[&Handler],
        _policy: &str,
        _database: &str,
        _duration: &str,
        _replication: i32,
    ) -> Result<ApiResponse, Error> {
        Err(self.not_supported("alter retention policy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;

    fn transport() -> HttpTransport {
        let config = ClientConfig::new("http://localhost:8086", "root", "root");
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_create_accepts_only_201() {
        assert_eq!(
            require_created(StatusCode::CREATED, "").unwrap(),
            Handled::Pass
        );
        for status in [StatusCode::OK, StatusCode::NO_CONTENT, StatusCode::CONFLICT] {
            assert!(matches!(
                require_created(status, "db exists"),
                Err(Error::ApiError { .. })
            ));
        }
    }

    #[test]
    fn test_delete_accepts_only_204() {
        assert_eq!(
            require_no_content(StatusCode::NO_CONTENT, "").unwrap(),
            Handled::Pass
        );
        for status in [StatusCode::OK, StatusCode::CREATED, StatusCode::NOT_FOUND] {
            assert!(matches!(
                require_no_content(status, ""),
                Err(Error::ApiError { .. })
            ));
        }
    }

    #[test]
    fn test_suppressing_handler_beats_the_create_code_check() {
        let t = transport();
        let ignore_conflict = |status: StatusCode, _body: &str| -> Result<Handled, Error> {
            if status == StatusCode::CONFLICT {
                Ok(Handled::Suppress)
            } else {
                Ok(Handled::Pass)
            }
        };

        // The same chain a create call builds: caller handlers first, then
        // the strict code check.
        let chain: Vec<&Handler> = vec![&ignore_conflict, &require_created];
        let response = t
            .check_response(StatusCode::CONFLICT, "database exists".to_string(), &chain)
            .unwrap();
        assert_eq!(response.status_code, StatusCode::CONFLICT);

        // Without the suppression the strict check still raises.
        let strict: Vec<&Handler> = vec![&require_created];
        assert!(matches!(
            t.check_response(StatusCode::CONFLICT, String::new(), &strict),
            Err(Error::ApiError { .. })
        ));
    }
}
