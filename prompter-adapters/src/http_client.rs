use std::sync::{Arc, OnceLock};
use std::time::Duration;

use hyper::body::{Bytes, to_bytes};
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{ModelError, ModelResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

static SHARED_CLIENT: OnceLock<HyperClient> = OnceLock::new();

/// Returns a handle to the process-wide HTTPS client, building it on first use.
pub(crate) fn shared_https_client() -> HyperClient {
    SHARED_CLIENT.get_or_init(build_https_client).clone()
}

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// A JSON POST to a provider endpoint.
pub(crate) struct JsonPost<'a> {
    pub provider: &'static str,
    pub endpoint: &'a Uri,
    pub bearer: Option<&'a str>,
    pub timeout: Duration,
}

impl JsonPost<'_> {
    /// Sends `body` and returns the raw response bytes of a successful reply.
    pub(crate) async fn send(&self, client: &HyperClient, body: Vec<u8>) -> ModelResult<Bytes> {
        let provider = self.provider;
        let mut builder = Request::post(self.endpoint.clone()).header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body)).map_err(|err| {
            ModelError::transport(format!("failed to build {provider} request: {err}"))
        })?;

        let response = timeout(self.timeout, client.request(request))
            .await
            .map_err(|_| ModelError::transport(format!("{provider} request timed out")))?
            .map_err(|err| ModelError::transport(format!("{provider} request failed: {err}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ModelError::RateLimited { retry_after });
        }

        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            ModelError::transport(format!("failed to read {provider} response: {err}"))
        })?;

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes);
            return Err(ModelError::response(format!(
                "{provider} returned {status}: {reason}"
            )));
        }

        Ok(bytes)
    }
}

/// Normalises a provider base URL to `scheme://host[/path]/`.
pub(crate) fn sanitize_base_url(provider: &str, input: &str) -> ModelResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ModelError::configuration(format!(
            "{provider} base URL must start with http:// or https://"
        )));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>().map_err(|err| {
        ModelError::configuration(format!("invalid {provider} base URL: {err}"))
    })?;
    Ok(base)
}
