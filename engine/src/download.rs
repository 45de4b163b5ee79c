use std::{path::Path, pin::Pin};

use bytes::Bytes;
use color_eyre::{Result, eyre::WrapErr};
use log::debug;
use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt, pin};
use tokio_stream::{Stream, StreamExt};

use crate::ApiError;

/// Fetches a remote file to a local path, returning the number of bytes written.
pub trait Downloader {
    fn download<'a>(
        &'a self,
        url: &'a str,
        dest: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>>;
}

#[derive(Clone, Default)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Downloader for HttpDownloader {
    fn download<'a>(
        &'a self,
        url: &'a str,
        dest: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiError::from_response(status, body).into());
            }

            write_stream(resp.bytes_stream(), dest).await
        })
    }
}

/// Writes every chunk of `stream` to `dest`, replacing whatever was there.
///
/// The file is closed when this returns, whether the stream finished or
/// failed. A failed stream leaves the partial file behind.
pub async fn write_stream<S, E>(stream: S, dest: &Path) -> Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut file = File::create(dest)
        .await
        .wrap_err_with(|| format!("Couldn't create {}", dest.display()))?;

    pin!(stream);
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.wrap_err("Download stream failed")?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!("Wrote {written} bytes to {}", dest.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[tokio::test]
    async fn written_length_matches_stream() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Apple.png");
        let chunks = vec![
            Ok::<_, io::Error>(Bytes::from_static(b"\x89PNG\r\n")),
            Ok(Bytes::from(vec![7u8; 64 * 1024])),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"IEND")),
        ];
        let total = chunks
            .iter()
            .map(|c| c.as_ref().unwrap().len() as u64)
            .sum::<u64>();

        let written = write_stream(tokio_stream::iter(chunks), &dest)
            .await
            .unwrap();
        assert_eq!(written, total);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), total);
    }

    #[tokio::test]
    async fn existing_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Banana.png");
        std::fs::write(&dest, vec![0u8; 1000]).unwrap();

        let chunks = vec![Ok::<_, io::Error>(Bytes::from_static(b"new"))];
        write_stream(tokio_stream::iter(chunks), &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn stream_error_fails_and_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Cherry.png");
        let chunks = vec![
            Ok(Bytes::from_static(b"part")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"never")),
        ];

        let err = write_stream(tokio_stream::iter(chunks), &dest)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("reset"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"part");
    }

    #[tokio::test]
    async fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no/such/dir/x.png");
        let chunks = vec![Ok::<_, io::Error>(Bytes::from_static(b"x"))];
        assert!(write_stream(tokio_stream::iter(chunks), &dest).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_host() {
        let dir = tempfile::tempdir().unwrap();
        let result = HttpDownloader::new()
            .download("http://127.0.0.1:1/image.png", &dir.path().join("x.png"))
            .await;
        assert!(result.is_err());
    }
}
