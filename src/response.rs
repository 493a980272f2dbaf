//! API responses and the query result envelope.
//!
//! The response wrappers make the per-operation success codes explicit:
//! the generic response accepts 200 or 204, a create must answer 201, and
//! writes and deletes must answer 204. Mixing those up was a recurring
//! source of bugs in older clients, so each wrapper is its own type.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::Error;

/// A raw response: status code plus body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status_code: StatusCode, body: String) -> Self {
        ApiResponse { status_code, body }
    }

    /// Generic success: 200 or 204.
    pub fn success(&self) -> bool {
        self.status_code == StatusCode::OK || self.status_code == StatusCode::NO_CONTENT
    }

    /// Deserializes the body as JSON.
    pub fn read_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|err| Error::DeserializationError {
            error: format!("could not deserialize: {}", err),
        })
    }
}

/// A response to a create call; the server answers 201 on success.
#[derive(Debug, Clone)]
pub struct CreateResponse(pub ApiResponse);

impl CreateResponse {
    pub fn success(&self) -> bool {
        self.0.status_code == StatusCode::CREATED
    }
}

/// A response to a line protocol write; the server answers 204 on success.
#[derive(Debug, Clone)]
pub struct WriteResponse(pub ApiResponse);

impl WriteResponse {
    pub fn success(&self) -> bool {
        self.0.status_code == StatusCode::NO_CONTENT
    }
}

/// A response to a delete call; the server answers 204 on success.
#[derive(Debug, Clone)]
pub struct DeleteResponse(pub ApiResponse);

impl DeleteResponse {
    pub fn success(&self) -> bool {
        self.0.status_code == StatusCode::NO_CONTENT
    }
}

/// One named series from a query result: columns plus positionally aligned
/// value rows. The first column is conventionally `time`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Serie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// The result of a single statement inside a query response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub series: Vec<Serie>,
}

/// The JSON envelope of a query response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Vec<StatementResult>,
}

impl QueryResult {
    /// Flattens the envelope into the matched series.
    ///
    /// A 200 response can still carry an error inside the envelope
    /// (influxdb/influxdb#1813); such a result raises the same error type
    /// as a transport-level failure rather than returning an empty list.
    pub fn into_series(self) -> Result<Vec<Serie>, Error> {
        if let Some(error) = self.error {
            return Err(Error::ApiError {
                status_code: StatusCode::BAD_REQUEST,
                body: error,
            });
        }
        let mut series = Vec::new();
        for result in self.results {
            if let Some(error) = result.error {
                return Err(Error::ApiError {
                    status_code: StatusCode::BAD_REQUEST,
                    body: error,
                });
            }
            series.extend(result.series);
        }
        Ok(series)
    }
}
