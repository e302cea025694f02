//! Uploading and downloading dataset files.

use super::CrucibleClient;
use crate::errors::{check, FileIOError};
use crate::models::Thumbnail;
use crate::types::*;
use camino::Utf8Path;
use fs_err::tokio::File;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio_util::codec::{BytesCodec, FramedRead};
use tokio_util::io::StreamReader;

impl CrucibleClient {
    /// Upload files to a dataset, in one multipart request.
    pub async fn upload_dataset(
        &self,
        dsid: &DatasetIdRef,
        files: &[&Utf8Path],
    ) -> Result<Value, FileIOError> {
        let mut form = Form::new();
        for path in files {
            form = form.part("files", file_part(path).await?);
        }
        let req = self
            .post(&format!("datasets/{}/upload", dsid))
            .multipart(form);
        let res = req.send().await?;
        Ok(check(res).await?.json().await?)
    }

    /// Upload a thumbnail image for a dataset.
    pub async fn add_thumbnail(
        &self,
        dsid: &DatasetIdRef,
        file: &Utf8Path,
        caption: Option<&str>,
    ) -> Result<Thumbnail, FileIOError> {
        let form = Form::new().part("file", file_part(file).await?);
        let form = if let Some(caption) = caption {
            form.text("description", caption.to_string())
        } else {
            form
        };
        let req = self
            .post(&format!("datasets/{}/thumbnails", dsid))
            .multipart(form);
        let res = req.send().await?;
        Ok(check(res).await?.json().await?)
    }

    /// Download a file of a dataset to `output`, overwriting it if it exists.
    pub async fn download_dataset(
        &self,
        dsid: &DatasetIdRef,
        file_name: &str,
        output: &Utf8Path,
    ) -> Result<(), FileIOError> {
        let res = self
            .get(&format!("datasets/{}/download/{}", dsid, file_name))
            .send()
            .await?;
        let stream = check(res)
            .await?
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::ConnectionAborted, e));
        let mut file = File::create(output).await?;
        let mut reader = StreamReader::new(stream);
        tokio::io::copy(&mut reader, &mut file).await?;
        Ok(())
    }
}

/// Stream a local file as a multipart part named after its basename.
async fn file_part(path: &Utf8Path) -> Result<Part, FileIOError> {
    let filename = path
        .file_name()
        .ok_or_else(|| FileIOError::PathError(path.to_string()))?
        .to_string();
    let file = File::open(path).await?;
    let content_length = fs_err::tokio::metadata(path).await?.len();
    let stream = FramedRead::new(file, BytesCodec::new());
    Ok(Part::stream_with_length(Body::wrap_stream(stream), content_length).file_name(filename))
}

/// Compute the SHA-256 checksum of a file as lowercase hex, reading it in chunks.
pub async fn sha256_file(path: &Utf8Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::*;

    #[rstest]
    #[case(b"".as_slice(), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")]
    #[case(b"abc".as_slice(), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")]
    #[tokio::test]
    async fn test_sha256_file(#[case] content: &[u8], #[case] expected: &str) {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("data.bin")).unwrap();
        fs_err::write(&path, content).unwrap();
        assert_eq!(sha256_file(&path).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_sha256_missing_file() {
        let err = sha256_file(Utf8Path::new("/does/not/exist")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
