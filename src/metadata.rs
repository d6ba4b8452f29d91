//! Metadata fetch and payload parsing
//!
//! One GET against the host's info endpoint returns the opaque index payload.
//! Decoding it through the [`codec`](crate::codec) yields a JSON object whose
//! `gif_struct` field is itself a JSON document holding the ordered page
//! list. Required fields: `gif_host`, `name`, `gif_struct`.

use crate::codec;
use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentId, DocumentMetadata, PageDescriptor};
use serde::Deserialize;
use url::Url;

/// Wire shape of the decoded info payload
#[derive(Debug, Deserialize)]
struct RawDocumentInfo {
    gif_host: String,
    name: String,
    gif_struct: String,
}

/// Fetch the opaque index payload for one document
///
/// A single request with no retry; whether a metadata failure is worth
/// retrying is the caller's decision, and the pipeline treats it as fatal.
pub(crate) async fn fetch_payload(
    client: &reqwest::Client,
    endpoint: &EndpointConfig,
    id: &DocumentId,
) -> Result<String> {
    let url = format!(
        "{}/doc.php?act=info&p_code={}&key={}&v=1",
        endpoint.base_url.trim_end_matches('/'),
        id,
        endpoint.access_key,
    );

    tracing::debug!(id = %id, "requesting document info");
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            url,
        });
    }
    Ok(response.text().await?)
}

/// Decode and parse an opaque payload into [`DocumentMetadata`]
///
/// The payload is consumed exactly once; the returned metadata is read-only
/// from here on. The page order is taken as served and never re-sorted.
pub fn parse_payload(payload: &str) -> Result<DocumentMetadata> {
    let decoded = codec::decode(payload);
    if decoded.is_empty() {
        return Err(Error::MalformedPayload(
            "payload decoded to an empty document".into(),
        ));
    }

    let raw: RawDocumentInfo = serde_json::from_slice(&decoded)
        .map_err(|e| Error::MalformedPayload(format!("document info is not valid JSON: {e}")))?;

    Url::parse(&raw.gif_host).map_err(|e| {
        Error::MalformedPayload(format!(
            "asset host {:?} is not a valid URL: {e}",
            raw.gif_host
        ))
    })?;

    let pages: Vec<PageDescriptor> = serde_json::from_str(&raw.gif_struct)
        .map_err(|e| Error::MalformedPayload(format!("page list is not valid JSON: {e}")))?;

    Ok(DocumentMetadata {
        asset_host: raw.gif_host,
        name: sanitize_name(&raw.name),
        pages,
    })
}

/// Replace characters that would change the meaning of a filesystem path
///
/// The document name becomes both a directory name and the artifact filename,
/// so path separators must not survive.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}
