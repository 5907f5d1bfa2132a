//! End-to-end tests for the Passdrop HTTP API
//!
//! Each test serves the real router on an ephemeral local port and talks to
//! it over HTTP.

use passdrop_cli::{AppState, ServerConfig, routes::create_router, serve};
use passdrop_core::DropConfig;
use passdrop_crypto::Deriver;
use passdrop_store::BucketLayout;
use reqwest::{StatusCode, multipart};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use tokio::net::TcpListener;

const SALT: &str = "integration-salt";
const NOT_FOUND_BODY: &str = "ERROR: No file found with that password, or it has expired.\n";

struct TestServer {
    base_url: String,
    root: TempDir,
    _words: NamedTempFile,
    client: reqwest::Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn payload_path(&self, passphrase: &str) -> PathBuf {
        let hash = Deriver::new(SALT).upload_hash(passphrase);
        BucketLayout::new(self.root.path()).payload_path(&hash)
    }

    async fn put(&self, name: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/{}", name)))
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Upload and return the minted passphrase
    async fn upload(&self, name: &str, body: &'static [u8]) -> String {
        let response = self.put(name, body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.headers()["passdrop-file-password"]
            .to_str()
            .unwrap()
            .to_string()
    }
}

async fn start_test_server(configure: impl FnOnce(&mut ServerConfig)) -> TestServer {
    let root = tempfile::tempdir().unwrap();
    let mut words = NamedTempFile::new().unwrap();
    writeln!(words, "amber\nbirch\ncedar\ndune\nember\nfjord\ngrove\nharbor").unwrap();

    let mut config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        base_path: String::new(),
        drop: DropConfig {
            hash_salt: SALT.to_string(),
            storage_root: root.path().to_path_buf(),
            word_list: words.path().to_path_buf(),
            ..Default::default()
        },
    };
    configure(&mut config);

    let state = Arc::new(AppState::new(config.clone()).unwrap());
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        serve(listener, app, std::future::pending()).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}{}", addr, config.normalized_base_path()),
        root,
        _words: words,
        client: reqwest::Client::new(),
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_dir() {
                count_files(&entry.path())
            } else {
                1
            }
        })
        .sum()
}

fn backdate(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(std::time::SystemTime::now() - Duration::from_secs(secs))
        .unwrap();
}

#[tokio::test]
async fn test_upload_and_download_named() {
    let server = start_test_server(|c| c.drop.pass_words_count = 3).await;

    let response = server.put("notes.txt", &b"0123456789"[..]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let headers = response.headers().clone();
    let passphrase = headers["passdrop-file-password"].to_str().unwrap().to_string();
    assert_eq!(passphrase.split('-').count(), 3);
    assert_eq!(headers["passdrop-upload-name"], "notes.txt");
    assert_eq!(
        headers["passdrop-file-path"].to_str().unwrap(),
        format!("/{}/notes.txt", passphrase)
    );
    let body = response.text().await.unwrap();
    assert_eq!(
        body,
        format!(
            "File uploaded successfully. The password for your file is:\n{}\n",
            passphrase
        )
    );

    let response = server
        .client
        .get(server.url(&format!("/{}/notes.txt", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=notes.txt"
    );
    assert_eq!(response.headers()["pragma"], "no-cache");
    assert!(response.headers().contains_key("passdrop-upload-expiration"));
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(&response.bytes().await.unwrap()[..], b"0123456789");
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = start_test_server(|_| {}).await;

    let form = multipart::Form::new()
        .text("comment", "ignored")
        .part(
            "data",
            multipart::Part::bytes(b"binary\x00payload".to_vec()).file_name("blob.bin"),
        );
    let response = server
        .client
        .post(server.url("/blob.bin"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let passphrase = response.headers()["passdrop-file-password"]
        .to_str()
        .unwrap()
        .to_string();

    // Stored name is used when none is given.
    let response = server
        .client
        .get(server.url(&format!("/{}", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=blob.bin"
    );
    assert_eq!(&response.bytes().await.unwrap()[..], b"binary\x00payload");
}

#[tokio::test]
async fn test_multipart_rejects_zero_or_many_files() {
    let server = start_test_server(|_| {}).await;

    let none = multipart::Form::new().text("comment", "no file here");
    let response = server
        .client
        .post(server.url("/x.txt"))
        .multipart(none)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "ERROR: No file has been provided.\n"
    );

    let two = multipart::Form::new()
        .part("a", multipart::Part::bytes(b"a".to_vec()).file_name("a"))
        .part("b", multipart::Part::bytes(b"b".to_vec()).file_name("b"));
    let response = server
        .client
        .post(server.url("/x.txt"))
        .multipart(two)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "ERROR: Only one file is allowed per call.\n"
    );

    assert_eq!(count_files(server.root.path()), 0);
}

#[tokio::test]
async fn test_oversized_upload_leaves_no_files() {
    let server = start_test_server(|c| c.drop.max_upload_size = 100).await;

    let response = server.put("big.bin", vec![b'x'; 101]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.text().await.unwrap(), "ERROR: File is too big!\n");
    assert_eq!(count_files(server.root.path()), 0);

    let response = server.put("fits.bin", vec![b'x'; 100]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_expired_upload_is_gone() {
    let server = start_test_server(|c| c.drop.ttl_secs = 1).await;
    let passphrase = server.upload("short.txt", b"short-lived").await;
    let payload = server.payload_path(&passphrase);
    assert!(payload.exists());

    tokio::time::sleep(Duration::from_secs(2)).await;

    let response = server
        .client
        .get(server.url(&format!("/{}", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!payload.exists());
}

#[tokio::test]
async fn test_not_found_responses_are_identical() {
    let server = start_test_server(|c| c.drop.ttl_secs = 3600).await;
    let expired = server.upload("old.txt", b"old").await;
    backdate(&server.payload_path(&expired), 3601);

    let mut seen = Vec::new();
    for passphrase in ["never-existed-here", "amber-birch-wrong", expired.as_str()] {
        let response = server
            .client
            .get(server.url(&format!("/{}", passphrase)))
            .send()
            .await
            .unwrap();
        let status = response.status();
        let content_type = response.headers()["content-type"].clone();
        seen.push((status, content_type, response.text().await.unwrap()));
    }

    assert_eq!(seen[0].0, StatusCode::NOT_FOUND);
    assert_eq!(seen[0].2, NOT_FOUND_BODY);
    assert!(seen.iter().all(|s| *s == seen[0]));
}

#[tokio::test]
async fn test_delete_twice() {
    let server = start_test_server(|_| {}).await;
    let passphrase = server.upload("gone.txt", b"bye").await;

    let response = server
        .client
        .delete(server.url(&format!("/{}", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        "OK, the file has been deleted.\n"
    );
    assert!(!server.payload_path(&passphrase).exists());

    for _ in 0..2 {
        let response = server
            .client
            .delete(server.url(&format!("/{}", passphrase)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text().await.unwrap(), NOT_FOUND_BODY);
    }
}

#[tokio::test]
async fn test_encrypted_roundtrip() {
    let server = start_test_server(|c| c.drop.encryption_enabled = true).await;
    let passphrase = server.upload("secret.txt", b"attack at dawn").await;

    let on_disk = std::fs::read(server.payload_path(&passphrase)).unwrap();
    assert!(!on_disk.windows(6).any(|w| w == b"attack"));

    let response = server
        .client
        .get(server.url(&format!("/{}", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-length"], "14");
    assert_eq!(&response.bytes().await.unwrap()[..], b"attack at dawn");
}

#[tokio::test]
async fn test_policy_headers() {
    let server = start_test_server(|c| {
        c.drop.ttl_secs = 600;
        c.drop.max_upload_size = 2048;
        c.drop.pass_words_count = 4;
    })
    .await;

    let response = server.client.head(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers["passdrop-expiration-time"], "600");
    assert_eq!(headers["passdrop-max-upload-size"], "2048");
    assert_eq!(headers["passdrop-pass-words-count"], "4");
    assert!(headers.contains_key("passdrop-version"));
}

#[tokio::test]
async fn test_index_and_missing_name() {
    let server = start_test_server(|_| {}).await;

    let body = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Maximum file size    : 1.00 MiB (1048576 bytes)"));
    assert!(body.contains("Maximum file lifetime: 1 day(s)"));

    let response = server.put("", &b"data"[..]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "ERROR: Please specify the name of your upload using the path. Ex: /myupload.gif\n"
    );

    let response = server
        .client
        .get(server.url("/favicon.ico"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_base_path() {
    let server = start_test_server(|c| c.base_path = "/drop/".to_string()).await;
    assert!(server.base_url.ends_with("/drop"));

    let passphrase = server.upload("a.txt", b"nested").await;
    let response = server
        .client
        .get(server.url(&format!("/{}", passphrase)))
        .send()
        .await
        .unwrap();
    assert_eq!(&response.bytes().await.unwrap()[..], b"nested");
}
