//! The map server the editor talks to: dimensions, validation/export and the example map.

use crate::{Dimensions, DimensionsPayload, MapPayload, SubmitResponse, TransportError};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Remote collaborator behind the editor.
///
/// Implementations block; the workflow calls them from a worker thread.
pub trait MapService: Send + Sync {
    /// Dimensions chosen for the current session
    fn fetch_dimensions(&self) -> Result<Dimensions, TransportError>;

    /// Store new session dimensions (the setup form)
    fn apply_dimensions(&self, dimensions: Dimensions) -> Result<(), TransportError>;

    /// Forget the session dimensions
    fn reset_dimensions(&self) -> Result<(), TransportError>;

    /// Validate a map and, on success, serialize it
    fn submit_map(&self, payload: &MapPayload) -> Result<SubmitResponse, TransportError>;

    /// The canonical example map
    fn fetch_example(&self) -> Result<MapPayload, TransportError>;
}

/// Parse a `{width, height}` body from the dimension source.
///
/// Zero-sized dimensions are rejected like any other malformed answer.
pub fn parse_dimensions(body: &str) -> Result<Dimensions, TransportError> {
    let payload: DimensionsPayload = serde_json::from_str(body)?;

    Dimensions::new(payload.width, payload.height)
        .map_err(|e| TransportError::Decode(e.to_string()))
}

/// HTTP client for the map server
pub struct HttpMapService {
    client: Client,
    base_url: String,
}

impl HttpMapService {
    /// Create a client for the server at `base_url`.
    ///
    /// The server keeps dimensions in a cookie session, so cookies are retained
    /// across requests.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}

impl MapService for HttpMapService {
    fn fetch_dimensions(&self) -> Result<Dimensions, TransportError> {
        debug!("Fetching dimensions from API");
        let response = Self::check(self.client.get(self.url("/api/get_dimensions")).send()?)?;
        parse_dimensions(&response.text()?)
    }

    fn apply_dimensions(&self, dimensions: Dimensions) -> Result<(), TransportError> {
        let form = [
            ("width", dimensions.width().to_string()),
            ("height", dimensions.height().to_string()),
        ];
        Self::check(self.client.post(self.url("/setup")).form(&form).send()?)?;
        Ok(())
    }

    fn reset_dimensions(&self) -> Result<(), TransportError> {
        Self::check(self.client.post(self.url("/api/reset_dimensions")).send()?)?;
        Ok(())
    }

    fn submit_map(&self, payload: &MapPayload) -> Result<SubmitResponse, TransportError> {
        let response = self
            .client
            .post(self.url("/api/save_map"))
            .json(payload)
            .send()?;
        Ok(Self::check(response)?.json()?)
    }

    fn fetch_example(&self) -> Result<MapPayload, TransportError> {
        let response = Self::check(self.client.get(self.url("/api/load_example")).send()?)?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let service = HttpMapService::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();

        assert_eq!(service.base_url(), "http://localhost:5000");
        assert_eq!(
            service.url("/api/save_map"),
            "http://localhost:5000/api/save_map"
        );
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(
            parse_dimensions(r#"{"width": 12, "height": 8}"#),
            Ok(Dimensions::new(12, 8).unwrap())
        );
        assert!(matches!(
            parse_dimensions(r#"{"width": 0, "height": 5}"#),
            Err(TransportError::Decode(_))
        ));
        assert!(matches!(
            parse_dimensions("<html>"),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        // Nothing listens on the discard port
        let service = HttpMapService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        assert!(service.fetch_example().is_err());
        assert!(service.reset_dimensions().is_err());
    }
}
