// download.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("download request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("download returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("could not write image to disk: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to fetch a remote artifact to a local path.
#[async_trait]
pub trait Downloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        HttpDownloader { client }
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_body(
    response: reqwest::Response,
    part: &Path,
) -> Result<(), DownloadError> {
    let mut file = fs::File::create(part).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        file.write_all(&bytes).await?;
    }

    file.flush().await?;
    Ok(())
}

#[async_trait]
impl Downloader for HttpDownloader {
    /// Streams the body to a `.part` sidecar and renames it into place once
    /// the stream completes, so an interrupted download never leaves a file
    /// at `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        debug!("Downloading {} to {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let part = part_path(dest);
        if let Err(e) = stream_body(response, &part).await {
            let _ = fs::remove_file(&part).await;
            return Err(e);
        }
        fs::rename(&part, dest).await?;

        info!("Successfully downloaded: {}", dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("out/p1.png")),
            PathBuf::from("out/p1.png.part")
        );
    }

    #[tokio::test]
    async fn aborted_connection_leaves_no_file() {
        // Accept the connection and hang up before sending a response.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/p1.png");
        let downloader = HttpDownloader::new(Client::new());

        let result = downloader
            .download(&format!("http://{}/image.png", addr), &dest)
            .await;
        handle.join().unwrap();

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn midstream_failure_leaves_no_file() {
        // Respond 200 with a Content-Length longer than the body, then
        // hang up while the client is still streaming.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartialbody")
                .unwrap();
            stream.flush().unwrap();
            drop(stream);
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("p1.png");
        let downloader = HttpDownloader::new(Client::new());

        let result = downloader
            .download(&format!("http://{}/image.png", addr), &dest)
            .await;
        handle.join().unwrap();

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }
}
