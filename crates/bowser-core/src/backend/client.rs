//! HTTP S3 client
//!
//! Implements [`ObjectStore`] directly over the S3 REST API with signed
//! requests. Only the three calls the upload protocol needs are covered:
//! ListObjectsV2 (paged), DeleteObject, and PutObject with tagging and a
//! content checksum.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;

use crate::config::AwsS3Config;
use crate::{Error, Result};

use super::sigv4::{payload_hash, Signer};
use super::store::ObjectStore;

pub struct S3Client {
    http: reqwest::Client,
    region: String,
    signer: Signer,
    key_pattern: Regex,
    token_pattern: Regex,
    truncated_pattern: Regex,
}

impl S3Client {
    pub fn new(config: &AwsS3Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| Error::store_error(format!("HTTP client setup failed: {err}")))?;
        let signer = Signer::new(
            &config.region,
            config.access_key_id.expose(),
            config.secret_access_key.expose(),
        );
        Ok(Self {
            http,
            region: config.region.clone(),
            signer,
            key_pattern: compile(r"<Key>([^<]*)</Key>")?,
            token_pattern: compile(r"<NextContinuationToken>([^<]*)</NextContinuationToken>")?,
            truncated_pattern: compile(r"<IsTruncated>true</IsTruncated>")?,
        })
    }

    fn host(&self, bucket: &str) -> String {
        format!("{bucket}.s3.{}.amazonaws.com", self.region)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        bucket: &str,
        canonical_uri: &str,
        canonical_query: &str,
        body: Vec<u8>,
        extra_headers: &[(String, String)],
    ) -> Result<String> {
        let host = self.host(bucket);
        let hash = payload_hash(&body);
        let headers = self.signer.sign(
            method.as_str(),
            &host,
            canonical_uri,
            canonical_query,
            &hash,
            extra_headers,
            Utc::now(),
        )?;

        let mut url = format!("https://{host}{canonical_uri}");
        if !canonical_query.is_empty() {
            url.push('?');
            url.push_str(canonical_query);
        }

        let mut request = self.http.request(method, &url).body(body);
        for (name, value) in &headers {
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::store_error(format!(
                "S3 request to {url} failed with {status}: {}",
                text.lines().next().unwrap_or("")
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            // Query parameters in canonical (sorted) order.
            let mut query = String::new();
            if let Some(token) = &continuation {
                query.push_str(&format!(
                    "continuation-token={}&",
                    urlencoding::encode(token)
                ));
            }
            query.push_str(&format!(
                "list-type=2&prefix={}",
                urlencoding::encode(prefix)
            ));

            let text = self
                .send(reqwest::Method::GET, bucket, "/", &query, Vec::new(), &[])
                .await?;

            keys.extend(
                self.key_pattern
                    .captures_iter(&text)
                    .map(|capture| xml_unescape(&capture[1])),
            );

            if !self.truncated_pattern.is_match(&text) {
                return Ok(keys);
            }
            continuation = self
                .token_pattern
                .captures(&text)
                .map(|capture| xml_unescape(&capture[1]));
            if continuation.is_none() {
                return Ok(keys);
            }
        }
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.send(
            reqwest::Method::DELETE,
            bucket,
            &encode_key(key),
            "",
            Vec::new(),
            &[],
        )
        .await?;
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        tags: &str,
        checksum_sha256: &str,
    ) -> Result<()> {
        let mut extra_headers = vec![(
            "x-amz-checksum-sha256".to_string(),
            checksum_sha256.to_string(),
        )];
        if !tags.is_empty() {
            extra_headers.push(("x-amz-tagging".to_string(), tags.to_string()));
        }
        self.send(
            reqwest::Method::PUT,
            bucket,
            &encode_key(key),
            "",
            body,
            &extra_headers,
        )
        .await?;
        Ok(())
    }
}

/// URI-encode an object key per path segment, keeping the `/` separators.
fn encode_key(key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

fn xml_unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::store_error(format!("bad pattern: {err}")))
}
