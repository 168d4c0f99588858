//! Response body decoding
//!
//! `gzip` and `deflate` are undone by reqwest before the body reaches us.
//! `br` is deliberately left alone by the HTTP stack and handled here: decode
//! locally when the `brotli` capability is on, otherwise (or when the body is
//! not valid Brotli) re-request the page without `br` in `Accept-Encoding`.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Which decoding route produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodePath {
    /// Identity, gzip or deflate, already decoded by the HTTP stack
    Native,
    /// Brotli body decompressed locally
    BrotliDecoded,
    /// Brotli could not be handled; body re-requested without `br`
    Renegotiated,
    /// Markup read from a rendered browser page
    Rendered,
}

#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub path: DecodePath,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Brotli body could not be decoded ({brotli}) and the renegotiated request failed ({refetch})")]
    Exhausted { brotli: String, refetch: String },
}

#[derive(Debug, Clone, Copy)]
pub struct ContentDecoder {
    brotli_enabled: bool,
}

impl ContentDecoder {
    pub fn new(brotli_enabled: bool) -> Self {
        Self { brotli_enabled }
    }

    pub fn brotli_enabled(&self) -> bool {
        self.brotli_enabled
    }

    /// True when the declared encoding needs this decoder's fallback handling
    pub fn needs_fallback(content_encoding: &str) -> bool {
        content_encoding.trim().eq_ignore_ascii_case("br")
    }

    /// Decode `body` sent with `content_encoding`.
    ///
    /// `refetch` re-issues the request with the fallback `Accept-Encoding`
    /// and yields the new body; it is only invoked on the Brotli path.
    pub async fn decode<F, Fut, E>(&self, content_encoding: &str, body: &[u8], refetch: F) -> Result<Decoded, DecodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
        E: Display,
    {
        if !Self::needs_fallback(content_encoding) {
            let label = content_encoding.trim();
            if !label.is_empty() && !["identity", "gzip", "deflate"].iter().any(|l| label.eq_ignore_ascii_case(l)) {
                warn!("Unexpected content encoding '{}', reading body as-is", label);
            }
            return Ok(Decoded {
                text: String::from_utf8_lossy(body).into_owned(),
                path: DecodePath::Native,
            });
        }

        let brotli_failure = match self.decode_brotli(body) {
            Ok(text) => {
                debug!("🗜️ Brotli body decoded locally ({} bytes)", body.len());
                return Ok(Decoded {
                    text,
                    path: DecodePath::BrotliDecoded,
                });
            }
            Err(reason) => reason,
        };

        debug!("🗜️ {}; re-requesting without br", brotli_failure);
        match refetch().await {
            Ok(bytes) => Ok(Decoded {
                text: String::from_utf8_lossy(&bytes).into_owned(),
                path: DecodePath::Renegotiated,
            }),
            Err(e) => Err(DecodeError::Exhausted {
                brotli: brotli_failure,
                refetch: e.to_string(),
            }),
        }
    }

    #[cfg(feature = "brotli")]
    fn decode_brotli(&self, body: &[u8]) -> Result<String, String> {
        if !self.brotli_enabled {
            return Err("Brotli decoding disabled".to_string());
        }
        let mut input = body;
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut input, &mut decompressed)
            .map_err(|e| format!("Brotli decompression failed: {e}"))?;
        Ok(String::from_utf8_lossy(&decompressed).into_owned())
    }

    #[cfg(not(feature = "brotli"))]
    fn decode_brotli(&self, _body: &[u8]) -> Result<String, String> {
        Err("Brotli decoding not compiled in".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn no_refetch() -> Result<Vec<u8>, String> {
        panic!("refetch must not be called")
    }

    #[tokio::test]
    async fn native_encodings_pass_through() {
        let decoder = ContentDecoder::new(true);
        for label in ["", "identity", "gzip", "DEFLATE"] {
            let decoded = decoder.decode(label, "小食堂".as_bytes(), no_refetch).await.unwrap();
            assert_eq!(decoded.text, "小食堂");
            assert_eq!(decoded.path, DecodePath::Native);
        }
    }

    #[cfg(feature = "brotli")]
    fn compress(text: &str) -> Vec<u8> {
        use std::io::Write;

        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(text.as_bytes()).unwrap();
        }
        compressed
    }

    #[cfg(feature = "brotli")]
    #[tokio::test]
    async fn brotli_body_is_decoded_locally() {
        let compressed = compress("<html>小食堂</html>");
        let decoded = ContentDecoder::new(true)
            .decode("br", &compressed, no_refetch)
            .await
            .unwrap();
        assert_eq!(decoded.text, "<html>小食堂</html>");
        assert_eq!(decoded.path, DecodePath::BrotliDecoded);
    }

    #[tokio::test]
    async fn disabled_brotli_renegotiates() {
        let calls = AtomicUsize::new(0);
        let decoded = ContentDecoder::new(false)
            .decode("br", b"\x0b\x02\x80garbage", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(b"<html>plain</html>".to_vec())
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(decoded.text, "<html>plain</html>");
        assert_eq!(decoded.path, DecodePath::Renegotiated);
    }

    #[cfg(feature = "brotli")]
    #[tokio::test]
    async fn truncated_brotli_renegotiates() {
        let compressed = compress(&"小食堂 Siu Sik Tong ".repeat(200));
        let truncated = &compressed[..compressed.len() / 2];
        let decoded = ContentDecoder::new(true)
            .decode("br", truncated, || async { Ok::<_, String>(b"ok".to_vec()) })
            .await
            .unwrap();
        assert_eq!(decoded.path, DecodePath::Renegotiated);
    }

    #[tokio::test]
    async fn both_paths_failing_is_a_decode_error() {
        let err = ContentDecoder::new(false)
            .decode("br", b"xx", || async { Err::<Vec<u8>, _>("connection reset") })
            .await
            .unwrap_err();
        let DecodeError::Exhausted { refetch, .. } = err;
        assert_eq!(refetch, "connection reset");
    }
}
