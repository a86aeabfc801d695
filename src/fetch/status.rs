use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::transcode::{correct_double_encoding, decode_response_text};
use super::FetchError;

/// Public DATEM endpoint for timber shipment status lookups.
pub static DATEM_STATUS_URL: &str =
    "https://api-shiva.rhmg.agricultura.gov.br/api/publico/madeira/datem/status";

/// Every request blocks for at most this long, end to end.
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything the batch runner can pull per-row status payloads from.
pub trait StatusSource {
    fn status(&self, cod_conhecimento: &str, num_conhecimento: &str)
        -> Result<Value, FetchError>;
}

/// Blocking HTTP client for the status endpoint.
pub struct StatusClient {
    client: Client,
    endpoint: Url,
}

impl StatusClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, STATUS_TIMEOUT)
    }

    /// The production timeout is fixed; tests shorten it to keep the slow
    /// paths fast.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("parsing status endpoint {}", endpoint))?;
        Ok(Self { client, endpoint })
    }

    fn status_url(&self, cod_conhecimento: &str, num_conhecimento: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("codConhecimento", cod_conhecimento)
            .append_pair("numConhecimento", num_conhecimento);
        url
    }
}

impl StatusSource for StatusClient {
    fn status(
        &self,
        cod_conhecimento: &str,
        num_conhecimento: &str,
    ) -> Result<Value, FetchError> {
        let url = self.status_url(cod_conhecimento, num_conhecimento);
        debug!(%url, "GET status");

        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .bytes()?;

        let text = decode_response_text(&body);
        let payload: Value = serde_json::from_str(&text)?;
        Ok(correct_double_encoding(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The client is blocking, so every fetch runs under spawn_blocking while
    // the mock server lives on the test runtime.
    async fn fetch(uri: String, timeout: Duration, ce: &str, bl: &str) -> Result<Value, FetchError> {
        let ce = ce.to_string();
        let bl = bl.to_string();
        tokio::task::spawn_blocking(move || {
            let client = StatusClient::with_timeout(&uri, timeout).unwrap();
            client.status(&ce, &bl)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_and_parses_a_status_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("codConhecimento", "CE123"))
            .and(query_param("numConhecimento", "BL456"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"situacao": "OK"}})),
            )
            .mount(&server)
            .await;

        let payload = fetch(server.uri(), Duration::from_secs(2), "CE123", "BL456")
            .await
            .unwrap();
        assert_eq!(payload["data"]["situacao"], "OK");
    }

    #[tokio::test]
    async fn decodes_latin1_encoded_bodies() {
        let server = MockServer::start().await;
        let body: &[u8] = b"{\"data\":{\"situacao\":\"Libera\xe7\xe3o autorizada\"}}";
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let payload = fetch(server.uri(), Duration::from_secs(2), "CE1", "BL1")
            .await
            .unwrap();
        assert_eq!(payload["data"]["situacao"], "Liberação autorizada");
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), Duration::from_secs(2), "CE1", "BL1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got: {:?}", err);
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = fetch(server.uri(), Duration::from_millis(200), "CE1", "BL1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got: {:?}", err);
    }

    #[tokio::test]
    async fn unparseable_body_is_a_payload_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), Duration::from_secs(2), "CE1", "BL1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)), "got: {:?}", err);
    }
}
