//! HTTP client for the account service (token status, speech generation, checkout).

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AccountService;
use super::error::{ApiError, extract_error_message};

/// Header carrying the device identifier.
const DEVICE_ID_HEADER: &str = "X-Device-Id";

/// Token balance reported for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatus {
    #[serde(default)]
    pub device_id: String,
    pub tokens_remaining: u32,
    pub is_premium: bool,
    #[serde(default)]
    pub daily_free_used: u32,
    #[serde(default)]
    pub daily_free_limit: u32,
}

/// Body of a speech generation request.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub speed: f32,
}

#[derive(Debug, Serialize)]
struct CheckoutRequest<'a> {
    product_id: &'a str,
    device_id: &'a str,
    success_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    checkout_url: String,
}

/// Client for the account service JSON API.
#[derive(Debug, Clone)]
pub struct AccountClient {
    http: Client,     // Shared connection pool
    base_url: String, // API root, e.g. http://localhost:8000/api/v1
}

impl AccountClient {
    /// Create a new client rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        info!("Using account service at {}", base_url);
        Self { http: Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the token balance for a device.
    ///
    /// # Errors
    /// `ApiError::Status` on any non-success response, `ApiError::Transport` if the service is
    /// unreachable and `ApiError::Decode` if the body is not a token status.
    pub async fn token_status(&self, device_id: &str) -> Result<TokenStatus, ApiError> {
        let response = self.http.get(self.url("/tokens/status")).header(DEVICE_ID_HEADER, device_id).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status { status: response.status().as_u16(), message: "Failed to get token status".to_string() });
        }

        let body = response.bytes().await?;
        let status: TokenStatus = serde_json::from_slice(&body)?;
        debug!(
            "Token status for {}: {} remaining, premium={}, daily free {}/{}",
            status.device_id, status.tokens_remaining, status.is_premium, status.daily_free_used, status.daily_free_limit
        );
        Ok(status)
    }

    /// Generate speech and return the encoded audio.
    ///
    /// # Errors
    /// On a non-success response the message is extracted from the body's `detail`.
    pub async fn generate_speech(&self, request: &SpeechRequest<'_>, device_id: &str) -> Result<Vec<u8>, ApiError> {
        debug!("Requesting speech: voice={}, speed={}, {} chars", request.voice, request.speed, request.text.chars().count());

        let response = self.http.post(self.url("/tts/generate")).header(DEVICE_ID_HEADER, device_id).json(request).send().await?;
        let response = check_status(response, "Generation failed").await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Create a checkout session and return the URL to send the user to.
    pub async fn create_checkout(&self, product_id: &str, device_id: &str, success_url: &str) -> Result<String, ApiError> {
        let body = CheckoutRequest { product_id, device_id, success_url };

        let response = self.http.post(self.url("/payment/checkout")).json(&body).send().await?;
        let response = check_status(response, "Checkout failed").await?;

        let body = response.bytes().await?;
        let checkout: CheckoutResponse = serde_json::from_slice(&body)?;
        Ok(checkout.checkout_url)
    }
}

#[async_trait]
impl AccountService for AccountClient {
    async fn token_status(&self, device_id: &str) -> Result<TokenStatus, ApiError> {
        AccountClient::token_status(self, device_id).await
    }
}

/// Pass successful responses through, turn failures into `ApiError::Status` with a readable message.
async fn check_status(response: Response, default_message: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await?;
    Err(ApiError::Status { status: status.as_u16(), message: extract_error_message(&body, default_message) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_token_status_sends_device_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tokens/status")
            .match_header("x-device-id", "device-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"device_id":"device-123","tokens_remaining":5,"is_premium":false,"daily_free_used":0,"daily_free_limit":5}"#)
            .create_async()
            .await;

        let client = AccountClient::new(&server.url());
        let status = client.token_status("device-123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            status,
            TokenStatus { device_id: "device-123".into(), tokens_remaining: 5, is_premium: false, daily_free_used: 0, daily_free_limit: 5 }
        );
    }

    #[tokio::test]
    async fn test_token_status_tolerates_missing_extra_fields() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tokens/status")
            .with_status(200)
            .with_body(r#"{"tokens_remaining":12,"is_premium":true}"#)
            .create_async()
            .await;

        let status = AccountClient::new(&server.url()).token_status("d").await.unwrap();
        assert_eq!(status.tokens_remaining, 12);
        assert!(status.is_premium);
    }

    #[tokio::test]
    async fn test_token_status_failure() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tokens/status")
            .with_status(500)
            .create_async()
            .await;

        let err = AccountClient::new(&server.url()).token_status("device-123").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get token status");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_token_status_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tokens/status")
            .with_status(200)
            .with_body(r#"{"tokens_remaining":"many"}"#)
            .create_async()
            .await;

        let err = AccountClient::new(&server.url()).token_status("device-123").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_speech_returns_audio() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tts/generate")
            .match_header("x-device-id", "device-123")
            .match_body(Matcher::Json(json!({"text": "Hello", "voice": "emily", "speed": 1.0})))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(b"ID3audio")
            .create_async()
            .await;

        let client = AccountClient::new(&server.url());
        let request = SpeechRequest { text: "Hello", voice: "emily", speed: 1.0 };
        let audio = client.generate_speech(&request, "device-123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(audio, b"ID3audio");
    }

    #[tokio::test]
    async fn test_generate_speech_structured_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/tts/generate")
            .with_status(402)
            .with_body(r#"{"detail":{"error":"No tokens remaining","code":"payment_required"}}"#)
            .create_async()
            .await;

        let request = SpeechRequest { text: "Hello", voice: "emily", speed: 1.0 };
        let err = AccountClient::new(&server.url()).generate_speech(&request, "device-123").await.unwrap_err();

        assert_eq!(err.to_string(), "No tokens remaining");
        assert!(!err.to_string().contains("object Object"));
    }

    #[tokio::test]
    async fn test_create_checkout() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/payment/checkout")
            .match_body(Matcher::Json(json!({
                "product_id": "starter",
                "device_id": "device-123",
                "success_url": "https://example.com/success"
            })))
            .with_status(200)
            .with_body(r#"{"checkout_url":"https://checkout.example.com"}"#)
            .create_async()
            .await;

        let url = AccountClient::new(&server.url()).create_checkout("starter", "device-123", "https://example.com/success").await.unwrap();

        mock.assert_async().await;
        assert_eq!(url, "https://checkout.example.com");
    }

    #[tokio::test]
    async fn test_create_checkout_string_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/payment/checkout")
            .with_status(400)
            .with_body(r#"{"detail":"Product not found"}"#)
            .create_async()
            .await;

        let err = AccountClient::new(&server.url()).create_checkout("invalid", "device-123", "https://example.com/success").await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tokens/status")
            .with_status(200)
            .with_body(r#"{"tokens_remaining":1,"is_premium":false}"#)
            .create_async()
            .await;

        AccountClient::new(&format!("{}/", server.url())).token_status("d").await.unwrap();
        mock.assert_async().await;
    }
}
