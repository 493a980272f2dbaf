extern crate influxdb_compat;

use influxdb_compat::{
    Client, ClientConfig, Error, Formatter, FormatterV092, FormatterV09x, Point, Precision,
    Version, WriteRequest,
};

fn live_config() -> ClientConfig {
    ClientConfig::new("http://127.0.0.1:8086", "root", "root")
}

#[tokio::test]
async fn test_explicit_version_binding() {
    // Binding an explicit version must not touch the network.
    let config = ClientConfig::new("http://127.0.0.1:10086", "root", "root")
        .version(Version::V0_9);
    let client = Client::connect(config).await.unwrap();
    assert_eq!(client.version(), Version::V0_9);

    let point = Point::new("weather").field("temperature", 82);
    assert_eq!(
        client.formatter().point_to_line(&point).unwrap(),
        "weather temperature=82i"
    );
}

#[tokio::test]
async fn test_version_family_selects_formatter_dialect() {
    let point = Point::new("weather").field("temperature", 82);
    for (version, expected) in [
        (Version::V0_9_2, "weather temperature=82"),
        (Version::V0_9_6, "weather temperature=82"),
        (Version::V0_12, "weather temperature=82i"),
    ] {
        let config =
            ClientConfig::new("http://127.0.0.1:10086", "root", "root").version(version);
        let client = Client::connect(config).await.unwrap();
        assert_eq!(
            client.formatter().point_to_line(&point).unwrap(),
            expected,
            "dialect mismatch for {}",
            version
        );
    }
}

#[tokio::test]
async fn test_unreachable_server_fails_detection() {
    let config = ClientConfig::new("http://127.0.0.1:10086", "root", "root");
    match Client::connect(config).await {
        Err(Error::VersionDetectionError { .. }) => {}
        other => panic!(
            "should fail with VersionDetectionError, got {:?}",
            other.err()
        ),
    }
}

#[tokio::test]
async fn test_legacy_dialect_rejects_modern_operations() {
    let config = ClientConfig::new("http://127.0.0.1:10086", "root", "root")
        .version(Version::V0_8);
    let client = Client::connect(config).await.unwrap();

    let points = [Point::new("cpu").field("value", 0.64)];
    match client.write("mydb", &points).await {
        Err(Error::NotSupportedError { version, .. }) => assert_eq!(version, Version::V0_8),
        other => panic!("should be NotSupported, got {:?}", other.err()),
    }
    assert!(matches!(
        client.query("mydb", "SELECT * FROM cpu").await,
        Err(Error::NotSupportedError { .. })
    ));
}

#[tokio::test]
async fn test_invalid_point_fails_before_any_network_call() {
    // Port 10086 has no server; an invalid point must fail locally.
    let config = ClientConfig::new("http://127.0.0.1:10086", "root", "root")
        .version(Version::V0_9);
    let client = Client::connect(config).await.unwrap();

    let no_fields = [Point::new("weather").tag("season", "summer")];
    match client.write("mydb", &no_fields).await {
        Err(Error::InvalidPointError { .. }) => {}
        other => panic!("should be InvalidPointError, got {:?}", other.err()),
    }
}

#[test]
fn test_write_request_spans_formatter_dialects() {
    let points = vec![
        Point::new("cpu").field("value", 0.64),
        Point::new("mem").field("free", 1024),
    ];

    let modern = WriteRequest::new(&FormatterV09x, "metrics", "default", &points);
    assert_eq!(modern.lines().unwrap(), "cpu value=0.64\nmem free=1024i");

    let legacy = WriteRequest::new(&FormatterV092, "metrics", "default", &points);
    assert_eq!(legacy.lines().unwrap(), "cpu value=0.64\nmem free=1024");
}

#[test]
fn test_days_precision_has_no_wire_form() {
    assert!(Precision::Days.query_param().is_err());
}

/// INTEGRATION TEST
///
/// Requires a live InfluxDB server on 127.0.0.1:8086 with root/root
/// credentials. Run with `cargo test -- --ignored`.
#[tokio::test]
#[ignore]
async fn test_ping_live_server() {
    let client = Client::connect(live_config()).await.unwrap();
    let pong = client.ping().await.unwrap();
    assert!(pong.success);
    assert!(!pong.version.is_empty(), "version should not be empty");
    println!("version: {} in {:?}", pong.version, pong.response_time);
}

/// INTEGRATION TEST
///
/// Round trip against a live server: create a database, write a point,
/// read it back, drop the database.
#[tokio::test]
#[ignore]
async fn test_write_and_query_live_server() {
    const TEST_DB: &str = "influxdb_compat_test";

    let client = Client::connect(live_config()).await.unwrap();
    client.create_database(TEST_DB).await.unwrap();

    let point = Point::new("weather")
        .tag("location", "us-midwest")
        .field("temperature", 82)
        .timestamp(chrono::Utc::now());
    let response = client.write(TEST_DB, &[point]).await.unwrap();
    assert!(response.success());

    let series = client
        .query(TEST_DB, "SELECT * FROM weather")
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].name, "weather");

    client.drop_database(TEST_DB).await.unwrap();
}

/// INTEGRATION TEST
///
/// Querying a database that does not exist reports the embedded error even
/// though the server answers 200.
#[tokio::test]
#[ignore]
async fn test_query_missing_database_live_server() {
    let client = Client::connect(live_config()).await.unwrap();
    let result = client
        .query("no_such_database", "SELECT * FROM weather")
        .await;
    assert!(matches!(result, Err(Error::ApiError { .. })));
}
