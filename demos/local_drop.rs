//! Upload, fetch and delete a file without the HTTP layer
//!
//! Run with `cargo run --example local_drop`.

use bytes::Bytes;
use passdrop_core::{DeleteOutcome, DropConfig, DropService, Lookup};
use passdrop_store::ClientInfo;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let mut words = tempfile::NamedTempFile::new()?;
    writeln!(words, "correct\nhorse\nbattery\nstaple")?;

    let service = DropService::open(DropConfig {
        hash_salt: "demo-salt".to_string(),
        storage_root: root.path().to_path_buf(),
        word_list: words.path().to_path_buf(),
        encryption_enabled: true,
        ..Default::default()
    })?;

    let receipt = service
        .upload(
            "hello.txt",
            vec![Bytes::from_static(b"Hello, Passdrop!\n")],
            ClientInfo::default(),
        )
        .await?;
    println!("Uploaded {} as {}", receipt.upload_name, receipt.passphrase);

    match service.fetch(&receipt.passphrase, None).await? {
        Lookup::Found(download) => {
            let content = download.payload.into_bytes().await?;
            println!(
                "Fetched {} ({}): {}",
                download.file_name,
                download.content_type,
                String::from_utf8_lossy(&content).trim_end()
            );
        }
        Lookup::NotFound => println!("Not found"),
    }

    if service.delete(&receipt.passphrase).await? == DeleteOutcome::Deleted {
        println!("Deleted");
    }
    Ok(())
}
