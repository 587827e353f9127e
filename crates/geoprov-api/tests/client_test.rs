#![allow(clippy::unwrap_used)]
// Integration tests for `GeoServerClient` using wiremock.

use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{basic_auth, body_bytes, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use geoprov_api::{
    CancellationToken, Credentials, Ensured, Error, ErrorKind, ExecuteMode, ExecuteOutcome,
    GeoServerClient, Provisioner, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials::new("admin", SecretString::from("geoserver")).unwrap()
}

fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/geoserver", server.uri())).unwrap()
}

async fn setup() -> (MockServer, GeoServerClient) {
    let server = MockServer::start().await;
    let client =
        GeoServerClient::with_client(reqwest::Client::new(), base_url(&server), credentials())
            .unwrap();
    (server, client)
}

fn rest(suffix: &str) -> String {
    format!("/geoserver/rest/{suffix}")
}

fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in members {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Accept one connection, read the request head, write `response` verbatim,
/// then hold the socket open for `linger` before closing it.
async fn serve_raw(response: &'static [u8], linger: Duration) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            head.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(linger).await;
    });
    Url::parse(&format!("http://{addr}/geoserver")).unwrap()
}

/// A 200 whose body stops well short of the advertised length.
const SHORT_ARCHIVE_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: application/zip\r\n\
Content-Length: 4096\r\n\
\r\n\
PK\x03\x04partial";

async fn mount_get_feature(server: &MockServer, layer: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/geoserver/ows"))
        .and(query_param("service", "WFS"))
        .and(query_param("version", "1.0.0"))
        .and(query_param("request", "GetFeature"))
        .and(query_param("typeName", format!("geo:{layer}")))
        .and(query_param("outputFormat", "shape-zip"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

// ── Workspace tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_existing_workspace_is_not_recreated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo.json")))
        .and(basic_auth("admin", "geoserver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workspace": { "name": "geo" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.create_workspace("geo").await.unwrap();
    assert_eq!(result, Ensured::AlreadyExists);
}

#[tokio::test]
async fn test_missing_workspace_is_created_once() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo.json")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(rest("workspaces.json")))
        .and(basic_auth("admin", "geoserver"))
        .and(body_json(json!({ "workspace": { "name": "geo" } })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.create_workspace("geo").await.unwrap();
    assert_eq!(result, Ensured::Created);
}

#[tokio::test]
async fn test_workspace_check_error_skips_creation() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo.json")))
        .respond_with(ResponseTemplate::new(401).set_body_string("HTTP 401 Unauthorized"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.create_workspace("geo").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert!(err.is_auth_rejected());
}

#[tokio::test]
async fn test_workspace_creation_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo.json")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(rest("workspaces.json")))
        .respond_with(ResponseTemplate::new(409).set_body_string("Workspace 'geo' already exists"))
        .mount(&server)
        .await;

    match client.create_workspace("geo").await {
        Err(Error::Rejected { status, message, .. }) => {
            assert_eq!(status, 409);
            assert!(message.contains("already exists"), "got: {message}");
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_workspace_name_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.create_workspace("").await.unwrap_err();
    assert!(matches!(err, Error::EmptyIdentifier { field: "workspace" }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ── Data store tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_datastore_points_at_data_dir() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo/datastores/parcels.json")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(rest("workspaces/geo/datastores.json")))
        .and(body_json(json!({
            "dataStore": {
                "name": "parcels",
                "type": "Shapefile",
                "enabled": true,
                "connectionParameters": {
                    "url": "file:data_dir/workspaces/geo/parcels/parcels.shp",
                    "create spatial index": true
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .create_datastore("geo", "parcels", "parcels/parcels.shp")
        .await
        .unwrap();
    assert_eq!(result, Ensured::Created);
}

#[tokio::test]
async fn test_existing_datastore_is_not_recreated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo/datastores/parcels.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .create_datastore("geo", "parcels", "parcels/parcels.shp")
        .await
        .unwrap();
    assert_eq!(result, Ensured::AlreadyExists);
}

// ── Upload tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_uploads_each_main_file() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.shp"), b"shape-a").unwrap();
    std::fs::write(dir.path().join("a.dbf"), b"table-a").unwrap();
    std::fs::write(dir.path().join("b.shp"), b"shape-b").unwrap();

    for content in [&b"shape-a"[..], &b"shape-b"[..]] {
        Mock::given(method("PUT"))
            .and(path(rest("workspaces/geo/datastores/parcels/file.shp")))
            .and(query_param("update", "overwrite"))
            .and(basic_auth("admin", "geoserver"))
            .and(body_bytes(content))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
    }

    let uploaded = client
        .update_shapefile("geo", "parcels", dir.path())
        .await
        .unwrap();

    assert_eq!(
        uploaded,
        vec![dir.path().join("a.shp"), dir.path().join("b.shp")]
    );
}

#[tokio::test]
async fn test_update_stops_on_rejected_upload() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.shp"), b"shape-a").unwrap();
    std::fs::write(dir.path().join("b.shp"), b"shape-b").unwrap();

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .update_shapefile("geo", "parcels", dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_update_missing_directory_is_local_io() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .update_shapefile("geo", "parcels", Path::new("/nonexistent/geoprov/parcels"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocalIo);
}

// ── Retrieval tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_shapefile_writes_and_extracts_archive() {
    let (server, client) = setup().await;
    let members: [(&str, &[u8]); 3] = [
        ("parcels.shp", b"geometry"),
        ("parcels.dbf", b"attributes"),
        ("parcels.prj", b"GEOGCS[\"WGS 84\"]"),
    ];
    let archive = zip_bytes(&members);

    mount_get_feature(
        &server,
        "parcels",
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/zip")
            .set_body_bytes(archive.clone()),
    )
    .await;

    let scratch = tempfile::tempdir().unwrap();
    let destination = scratch.path().join("exports").join("parcels");

    let download = client
        .get_shapefile("geo", "parcels", "parcels", &destination)
        .await
        .unwrap();

    assert_eq!(download.archive_path, destination.join("parcels.zip"));
    assert_eq!(download.archive_size, archive.len());
    assert_eq!(std::fs::read(&download.archive_path).unwrap(), archive);

    for (name, data) in members {
        assert_eq!(std::fs::read(destination.join(name)).unwrap(), data);
    }
    assert_eq!(
        download.files,
        members
            .iter()
            .map(|(name, _)| destination.join(name))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_get_shapefile_not_found_writes_nothing() {
    let (server, client) = setup().await;

    mount_get_feature(
        &server,
        "parcels",
        ResponseTemplate::new(404).set_body_string("Feature type geo:parcels unknown"),
    )
    .await;

    let scratch = tempfile::tempdir().unwrap();
    let destination = scratch.path().join("parcels");

    let err = client
        .get_shapefile("geo", "parcels", "parcels", &destination)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_get_shapefile_bad_archive_is_local_io() {
    let (server, client) = setup().await;

    mount_get_feature(
        &server,
        "parcels",
        ResponseTemplate::new(200).set_body_string("<ServiceExceptionReport/>"),
    )
    .await;

    let scratch = tempfile::tempdir().unwrap();
    let err = client
        .get_shapefile("geo", "parcels", "parcels", scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Archive { .. }));
    assert_eq!(err.kind(), ErrorKind::LocalIo);
}

// ── Publish tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_publish_layer_fixes_srs_and_enables() {
    let (server, client) = setup().await;

    for layer in ["parcels", "Roads 2024"] {
        Mock::given(method("POST"))
            .and(path(rest("workspaces/geo/datastores/parcels/featuretypes")))
            .and(body_json(json!({
                "featureType": {
                    "name": layer,
                    "nativeName": layer,
                    "title": layer,
                    "srs": "EPSG:4326",
                    "enabled": true
                }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.publish_layer("geo", "parcels", "parcels").await.unwrap();
    client
        .publish_layer("geo", "parcels", "Roads 2024")
        .await
        .unwrap();
}

// ── Execute tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_provision_runs_full_pipeline() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("parcels.shp"), b"shape").unwrap();
    let shapefile_path = dir.path().to_str().unwrap().to_owned();

    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo.json")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest("workspaces/geo/datastores/parcels.json")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(rest("workspaces/geo/datastores.json")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(rest("workspaces/geo/datastores/parcels/file.shp")))
        .and(body_bytes(&b"shape"[..]))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(rest("workspaces/geo/datastores/parcels/featuretypes")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .execute("geo", "parcels", &shapefile_path, "parcels", ExecuteMode::Provision)
        .await
        .unwrap();

    match outcome {
        ExecuteOutcome::Provisioned(report) => {
            assert_eq!(report.workspace, Ensured::AlreadyExists);
            assert_eq!(report.datastore, Ensured::Created);
            assert_eq!(report.uploaded, vec![dir.path().join("parcels.shp")]);
        }
        other => panic!("expected provisioning report, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_retrieve_uses_suffixed_destination() {
    let (server, client) = setup().await;

    mount_get_feature(
        &server,
        "parcels",
        ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[("parcels.shp", b"geometry")])),
    )
    .await;

    let scratch = tempfile::tempdir().unwrap();
    let shapefile_path = format!("{}/parcels", scratch.path().display());

    let outcome = client
        .execute("geo", "parcels", &shapefile_path, "parcels", ExecuteMode::Retrieve)
        .await
        .unwrap();

    let destination = scratch.path().join("parcelstmp");
    match outcome {
        ExecuteOutcome::Retrieved(download) => {
            assert_eq!(download.archive_path, destination.join("parcels.zip"));
        }
        other => panic!("expected retrieval, got: {other:?}"),
    }
    assert!(destination.join("parcels.shp").is_file());
}

// ── Transport tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(200));
    let client = GeoServerClient::new(base_url(&server), credentials(), &transport).unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let err = client.create_workspace("geo").await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_cancelled_client_sends_nothing() {
    let server = MockServer::start().await;
    let token = CancellationToken::new();
    token.cancel();
    let client =
        GeoServerClient::with_client(reqwest::Client::new(), base_url(&server), credentials())
            .unwrap()
            .with_cancellation(token);

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.publish_layer("geo", "parcels", "parcels").await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_truncated_download_removes_partial_archive() {
    let base = serve_raw(SHORT_ARCHIVE_RESPONSE, Duration::ZERO).await;
    let client = GeoServerClient::with_client(reqwest::Client::new(), base, credentials()).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let destination = scratch.path().join("out");

    let err = client
        .get_shapefile("geo", "parcels", "parcels", &destination)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport, "got: {err:?}");
    assert!(destination.is_dir());
    assert!(!destination.join("parcels.zip").exists());
}

#[tokio::test]
async fn test_cancel_during_download_removes_partial_archive() {
    let base = serve_raw(SHORT_ARCHIVE_RESPONSE, Duration::from_secs(30)).await;
    let token = CancellationToken::new();
    let client = GeoServerClient::with_client(reqwest::Client::new(), base, credentials())
        .unwrap()
        .with_cancellation(token.clone());
    let scratch = tempfile::tempdir().unwrap();
    let destination = scratch.path().join("out");

    // The destination only appears once the response head has been accepted.
    let cancel_after_headers = async {
        while !destination.is_dir() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        token.cancel();
    };
    let (result, ()) = tokio::join!(
        client.get_shapefile("geo", "parcels", "parcels", &destination),
        cancel_after_headers
    );

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "got: {err:?}");
    assert!(!destination.join("parcels.zip").exists());
}
