//! Shared HTTP plumbing for the wire protocol variants.

use http::StatusCode;
use log::debug;
use reqwest::Method;

use crate::client::ClientConfig;
use crate::error::Error;
use crate::response::ApiResponse;

const USER_AGENT: &str = concat!("influxdb-compat/", env!("CARGO_PKG_VERSION"));

/// What an error handler decided about a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Not this handler's concern; keep going down the chain.
    Pass,
    /// The response is dealt with; skip the remaining handlers and the
    /// default status check.
    Suppress,
}

/// A per-call error handler, run in order against the status code and body
/// before the default status check.
pub type Handler = dyn Fn(StatusCode, &str) -> Result<Handled, Error> + Send + Sync;

/// An empty handler chain, for calls that want default error handling only.
pub const NO_HANDLERS: &[&Handler] = &[];

/// The body of an outgoing request.
pub(crate) enum Body {
    None,
    /// Line protocol text, sent as `text/plain`.
    Text(String),
    /// A JSON document, for the segment-path management API.
    Json(serde_json::Value),
}

/// One HTTP connection to a server: base URL, credentials and the reqwest
/// client carrying the configured timeout.
pub(crate) struct HttpTransport {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self, Error> {
        reqwest::Url::parse(&config.base_url).map_err(|err| Error::UrlConstructionError {
            error: format!("{}: {}", config.base_url, err),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| Error::ConnectionError {
            error: err.to_string(),
        })?;

        Ok(HttpTransport {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
        })
    }

    /// Sends one request and runs the error handler chain on the outcome.
    ///
    /// Credentials travel as `u`/`p` query parameters on every call except
    /// the auth-exempt ones (ping).
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Body,
        include_auth: bool,
        handlers: &[&Handler],
    ) -> Result<ApiResponse, Error> {
        let url = format!("{}/{}", self.base_url, path);

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        if include_auth {
            query.push(("u", &self.username));
            query.push(("p", &self.password));
        }
        query.extend_from_slice(params);

        debug!("-> {} {} {:?}", method, url, params);

        let mut builder = self
            .client
            .request(method, &url)
            .query(&query)
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(http::header::ACCEPT, "application/json");

        builder = match body {
            Body::None => builder,
            Body::Text(text) => builder
                .header(http::header::CONTENT_TYPE, "text/plain")
                .body(text),
            Body::Json(json) => builder.json(&json),
        };

        let response = builder.send().await.map_err(|err| Error::ConnectionError {
            error: err.to_string(),
        })?;

        let status_code = response.status();
        let body = response.text().await.map_err(|err| Error::ConnectionError {
            error: err.to_string(),
        })?;

        debug!("<- {} {}", status_code, body);

        self.check_response(status_code, body, handlers)
    }

    /// Pings the server. The interesting part of the answer is the
    /// `X-Influxdb-Version` header, which becomes the response body.
    pub(crate) async fn ping(&self, handlers: &[&Handler]) -> Result<ApiResponse, Error> {
        let url = format!("{}/ping", self.base_url);

        debug!("-> GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(http::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| Error::ConnectionError {
                error: err.to_string(),
            })?;

        let status_code = response.status();
        let version = response
            .headers()
            .get("X-Influxdb-Version")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        debug!("<- {} version {}", status_code, version);

        self.check_response(status_code, version, handlers)
    }

    /// Runs the caller's handler chain, then the default status check:
    /// any status outside `[200, 400)` becomes an `ApiError`.
    pub(crate) fn check_response(
        &self,
        status_code: StatusCode,
        body: String,
        handlers: &[&Handler],
    ) -> Result<ApiResponse, Error> {
        for handler in handlers {
            match handler(status_code, &body)? {
                Handled::Pass => continue,
                Handled::Suppress => return Ok(ApiResponse::new(status_code, body)),
            }
        }

        if status_code < StatusCode::OK || status_code >= StatusCode::BAD_REQUEST {
            return Err(Error::ApiError { status_code, body });
        }

        Ok(ApiResponse::new(status_code, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn transport() -> HttpTransport {
        let config = ClientConfig::new("http://localhost:8086", "root", "root")
            .version(Version::V0_9);
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_malformed_base_url_is_rejected() {
        let config = ClientConfig::new("not a url", "root", "root");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(Error::UrlConstructionError { .. })
        ));
    }

    #[test]
    fn test_default_handler_accepts_success_range() {
        let t = transport();
        for status in [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT] {
            let response = t.check_response(status, String::new(), NO_HANDLERS).unwrap();
            assert_eq!(response.status_code, status);
        }
    }

    #[test]
    fn test_default_handler_rejects_errors() {
        let t = transport();
        let result = t.check_response(
            StatusCode::NOT_FOUND,
            "database not found".to_string(),
            NO_HANDLERS,
        );
        match result {
            Err(Error::ApiError { status_code, body }) => {
                assert_eq!(status_code, StatusCode::NOT_FOUND);
                assert_eq!(body, "database not found");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_suppress_skips_default_handler() {
        let t = transport();
        let suppress_not_found = |status: StatusCode, _body: &str| -> Result<Handled, Error> {
            if status == StatusCode::NOT_FOUND {
                Ok(Handled::Suppress)
            } else {
                Ok(Handled::Pass)
            }
        };
        let response = t
            .check_response(
                StatusCode::NOT_FOUND,
                String::new(),
                &[&suppress_not_found],
            )
            .unwrap();
        assert_eq!(response.status_code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_pass_falls_through_to_default_handler() {
        let t = transport();
        let indifferent =
            |_status: StatusCode, _body: &str| -> Result<Handled, Error> { Ok(Handled::Pass) };
        assert!(t
            .check_response(StatusCode::BAD_REQUEST, String::new(), &[&indifferent])
            .is_err());
    }

    #[test]
    fn test_handler_error_stops_the_chain() {
        let t = transport();
        let failing = |_status: StatusCode, body: &str| -> Result<Handled, Error> {
            Err(Error::DeserializationError {
                error: body.to_string(),
            })
        };
        let never_reached =
            |_status: StatusCode, _body: &str| -> Result<Handled, Error> { Ok(Handled::Suppress) };
        assert!(matches!(
            t.check_response(StatusCode::OK, "x".to_string(), &[&failing, &never_reached]),
            Err(Error::DeserializationError { .. })
        ));
    }
}
