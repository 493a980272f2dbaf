//! Server-side administrative objects.
//!
//! These mirror the JSON bodies of the segment-path management API, which
//! serializes object keys in camelCase.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// A database known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
}

/// A database plus the shard spaces and continuous queries to provision it
/// with. Used by the richer create call of the segment-path API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfiguration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spaces: Vec<ShardSpace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continuous_queries: Vec<String>,
}

/// A database user or cluster admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_to: Option<String>,
}

impl User {
    /// Sets the read and write permission pair. Permissions always travel
    /// together; an empty slice leaves the user unchanged and anything but
    /// zero or two entries is rejected.
    pub fn set_permissions(&mut self, permissions: &[&str]) -> Result<(), Error> {
        match permissions {
            [] => Ok(()),
            [read_from, write_to] => {
                self.read_from = Some((*read_from).to_string());
                self.write_to = Some((*write_to).to_string());
                Ok(())
            }
            _ => Err(Error::InvalidArgumentError {
                error: "permissions must be a readFrom and writeTo pair".to_string(),
            }),
        }
    }
}

/// A registered continuous query. The segment-path API identifies these by
/// numeric id; the statement API reports a name instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousQuery {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub query: String,
}

/// A shard space definition of the segment-path API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardSpace {
    pub name: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub retention_policy: String,
    #[serde(default)]
    pub shard_duration: String,
    #[serde(default)]
    pub regex: String,
    #[serde(default)]
    pub replication_factor: i32,
    #[serde(default)]
    pub split: i32,
}

/// A member of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: i64,
    #[serde(default)]
    pub protobuf_connect_string: String,
}

/// The outcome of a ping: the advertised version string and how long the
/// round trip took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pong {
    pub version: String,
    pub response_time: Duration,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_permissions_pair() {
        let mut user = User {
            name: "paul".to_string(),
            ..User::default()
        };
        user.set_permissions(&["^$", "^$"]).unwrap();
        assert_eq!(user.read_from.as_deref(), Some("^$"));
        assert_eq!(user.write_to.as_deref(), Some("^$"));
    }

    #[test]
    fn test_user_permissions_empty_is_noop() {
        let mut user = User::default();
        user.set_permissions(&[]).unwrap();
        assert_eq!(user.read_from, None);
        assert_eq!(user.write_to, None);
    }

    #[test]
    fn test_user_permissions_odd_count_rejected() {
        let mut user = User::default();
        assert!(user.set_permissions(&["^$"]).is_err());
        assert!(user.set_permissions(&["a", "b", "c"]).is_err());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let mut user = User {
            name: "paul".to_string(),
            password: "pass".to_string(),
            is_admin: true,
            ..User::default()
        };
        user.set_permissions(&[".*", ".*"]).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["readFrom"], ".*");
        assert_eq!(json["writeTo"], ".*");
    }

    #[test]
    fn test_shard_space_round_trips_camel_case() {
        let body = r#"{
            "name": "default",
            "database": "mydb",
            "retentionPolicy": "30d",
            "shardDuration": "7d",
            "regex": "/.*/",
            "replicationFactor": 2,
            "split": 1
        }"#;
        let space: ShardSpace = serde_json::from_str(body).unwrap();
        assert_eq!(space.retention_policy, "30d");
        assert_eq!(space.replication_factor, 2);
        let json = serde_json::to_value(&space).unwrap();
        assert_eq!(json["shardDuration"], "7d");
    }

    #[test]
    fn test_server_list_parses() {
        let servers: Vec<Server> = serde_json::from_str(
            r#"[{"id":1,"protobufConnectString":"influx1:8099"}]"#,
        )
        .unwrap();
        assert_eq!(servers[0].id, 1);
        assert_eq!(servers[0].protobuf_connect_string, "influx1:8099");
    }

    #[test]
    fn test_database_list_parses() {
        let databases: Vec<Database> =
            serde_json::from_str(r#"[{"name":"one"},{"name":"two"}]"#).unwrap();
        assert_eq!(databases.len(), 2);
        assert_eq!(databases[1].name, "two");
    }
}
