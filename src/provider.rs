use std::cell::OnceCell;

use log::debug;
use reqwest::{
    blocking::{Client, Response},
    header::{HeaderValue, ACCEPT, USER_AGENT},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    bbox::{BoundingBox, ImageSize},
    config::Credentials,
    error::FetchError,
};

const DATA_COLLECTION: &str = "sentinel-2-l1c";
const WGS84_CRS: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";
const TIME_FROM: &str = "2020-01-01T00:00:00Z";
const TIME_TO: &str = "2020-12-31T23:59:59Z";
const MIME_JPEG: &str = "image/jpeg";

/// True colour from the red, green and blue bands.
pub const TRUE_COLOR_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
    return {
        input: ["B04", "B03", "B02"],
        output: { bands: 3 }
    };
}
function evaluatePixel(sample) {
    return [sample.B04, sample.B03, sample.B02];
}
"#;

/// Fetches one encoded image for a bounding box.
pub trait ImageRequester {
    fn request_image(&self, bbox: &BoundingBox, size: ImageSize) -> Result<Vec<u8>, FetchError>;
}

impl<T: ImageRequester + ?Sized> ImageRequester for &T {
    fn request_image(&self, bbox: &BoundingBox, size: ImageSize) -> Result<Vec<u8>, FetchError> {
        (**self).request_image(bbox, size)
    }
}

/// Sentinel Hub Process API over blocking HTTP.
pub struct SentinelHubClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
    auth_url: String,
    token: OnceCell<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SentinelHubClient {
    pub fn new(credentials: Credentials, base_url: &str, auth_url: &str) -> SentinelHubClient {
        SentinelHubClient::with_client(Client::new(), credentials, base_url, auth_url)
    }

    pub fn with_client(
        client: Client,
        credentials: Credentials,
        base_url: &str,
        auth_url: &str,
    ) -> SentinelHubClient {
        SentinelHubClient {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.to_string(),
            token: OnceCell::new(),
        }
    }

    // One token per run, no refresh
    fn access_token(&self) -> Result<&str, FetchError> {
        if self.token.get().is_none() {
            debug!("Requesting access token from {}", self.auth_url);
            let params = [
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ];
            let res = check_status(self.client.post(&self.auth_url).form(&params).send()?)?;
            let token: TokenResponse = res.json()?;
            let _ = self.token.set(token.access_token);
        }
        Ok(self.token.get().map(String::as_str).unwrap_or_default())
    }
}

impl ImageRequester for SentinelHubClient {
    fn request_image(&self, bbox: &BoundingBox, size: ImageSize) -> Result<Vec<u8>, FetchError> {
        let token = self.access_token()?;
        let url = format!("{}/api/v1/process", self.base_url);

        let res = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(ACCEPT, HeaderValue::from_static(MIME_JPEG))
            .header(USER_AGENT, HeaderValue::from_static("propimg v0.1.0"))
            .json(&process_request(bbox, size))
            .send()?;
        let bytes = check_status(res)?.bytes()?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyImage);
        }
        Ok(bytes.to_vec())
    }
}

fn check_status(res: Response) -> Result<Response, FetchError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    Err(FetchError::from_status(status.as_u16(), error_message(&body)))
}

/// Pulls the human-readable part out of a provider error body.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v["error"]["message"]
            .as_str()
            .or_else(|| v["error_description"].as_str())
            .or_else(|| v["message"].as_str())
    });
    match message {
        Some(m) => m.to_string(),
        None => body.trim().to_string(),
    }
}

fn process_request(bbox: &BoundingBox, size: ImageSize) -> Value {
    json!({
        "input": {
            "bounds": {
                "bbox": bbox.to_array(),
                "properties": { "crs": WGS84_CRS }
            },
            "data": [{
                "type": DATA_COLLECTION,
                "dataFilter": {
                    "timeRange": { "from": TIME_FROM, "to": TIME_TO }
                }
            }]
        },
        "output": {
            "width": size.width,
            "height": size.height,
            "responses": [{
                "identifier": "default",
                "format": { "type": MIME_JPEG }
            }]
        },
        "evalscript": TRUE_COLOR_EVALSCRIPT
    })
}
