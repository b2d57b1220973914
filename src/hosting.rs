//! Decides where an invite's RSVP link points.
//!
//! Links normally point at this server. When a host asks for externally hosted
//! invites, a small redirect document is published through a [`DocumentHost`]
//! and its URL is used instead. Any failure of the document host, including a
//! timeout, falls back to the local link.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::models::invite::HostingMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct HostingError(pub String);

impl std::fmt::Display for HostingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// External document host that can publish content at a public URL.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    async fn is_ready(&self) -> bool;

    async fn publish(&self, content: &str) -> Result<String, HostingError>;
}

/// Document host reached over HTTP. `POST {endpoint}` with
/// `{"content", "content_type"}` must answer `{"url": "..."}`.
pub struct HttpDocumentHost {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct PublishResponse {
    url: String,
}

impl HttpDocumentHost {
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl DocumentHost for HttpDocumentHost {
    async fn is_ready(&self) -> bool {
        let req = self.client.get(format!("{}/health", self.endpoint));
        match self.authorize(req).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn publish(&self, content: &str) -> Result<String, HostingError> {
        let req = self.client.post(&self.endpoint).json(&serde_json::json!({
            "content": content,
            "content_type": "text/html",
        }));
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| HostingError(format!("publish request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(HostingError(format!(
                "document host returned {}",
                resp.status()
            )));
        }

        let body: PublishResponse = resp
            .json()
            .await
            .map_err(|e| HostingError(format!("invalid publish response: {e}")))?;
        if !(body.url.starts_with("https://") || body.url.starts_with("http://")) {
            return Err(HostingError(format!(
                "document host returned a non-http url: {}",
                body.url
            )));
        }
        Ok(body.url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub rsvp_url: String,
    pub hosting_method: HostingMethod,
}

pub type UrlBuilder = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct LinkResolver {
    local_url: UrlBuilder,
    host: Option<Arc<dyn DocumentHost>>,
    timeout: Duration,
}

impl LinkResolver {
    /// Resolver whose local links are `{base_url}/rsvp/{event_id}/{invite_id}`.
    pub fn new(base_url: &str, host: Option<Arc<dyn DocumentHost>>, timeout: Duration) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        let local_url: UrlBuilder =
            Arc::new(move |event_id, invite_id| format!("{base}/rsvp/{event_id}/{invite_id}"));
        Self::with_url_builder(local_url, host, timeout)
    }

    pub fn with_url_builder(
        local_url: UrlBuilder,
        host: Option<Arc<dyn DocumentHost>>,
        timeout: Duration,
    ) -> Self {
        Self {
            local_url,
            host,
            timeout,
        }
    }

    pub fn local_url(&self, event_id: &str, invite_id: &str) -> String {
        (self.local_url)(event_id, invite_id)
    }

    pub fn has_external_host(&self) -> bool {
        self.host.is_some()
    }

    pub async fn resolve(
        &self,
        event_id: &str,
        invite_id: &str,
        prefer_external_hosting: bool,
    ) -> ResolvedLink {
        let local = self.local_url(event_id, invite_id);
        let local_link = |rsvp_url: String| ResolvedLink {
            rsvp_url,
            hosting_method: HostingMethod::Local,
        };

        if !prefer_external_hosting {
            return local_link(local);
        }
        let Some(host) = self.host.as_ref() else {
            warn!("external hosting requested for invite {invite_id} but no document host is configured");
            return local_link(local);
        };

        match tokio::time::timeout(self.timeout, host.is_ready()).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("document host not ready, using local link for invite {invite_id}");
                return local_link(local);
            }
            Err(_) => {
                warn!("document host readiness check timed out for invite {invite_id}");
                return local_link(local);
            }
        }

        let document = redirect_document(&local);
        match tokio::time::timeout(self.timeout, host.publish(&document)).await {
            Ok(Ok(url)) => ResolvedLink {
                rsvp_url: url,
                hosting_method: HostingMethod::ExternallyHosted,
            },
            Ok(Err(e)) => {
                warn!("publishing invite {invite_id} failed, using local link: {e}");
                local_link(local)
            }
            Err(_) => {
                warn!("publishing invite {invite_id} timed out, using local link");
                local_link(local)
            }
        }
    }
}

fn redirect_document(target: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <meta http-equiv=\"refresh\" content=\"0; url={target}\"><title>RSVP</title></head>\
         <body><a href=\"{target}\">Open your invitation</a></body></html>"
    )
}
