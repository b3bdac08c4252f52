//! HTTP client for the Teraslice REST API.
//!
//! Wraps a pooled hyper client over rustls, so both `http` and `https`
//! masters work. Every GET is bounded by the configured timeout, must answer `200 OK` with a non-empty body, and is decoded into
//! a typed record.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, StatsError, StatsResult};

const USER_AGENT: &str = concat!("teraslice-exporter/", env!("CARGO_PKG_VERSION"));

/// A decoded response and the time it took to fetch.
#[derive(Debug)]
pub struct Fetched<T> {
    pub data: T,
    /// Milliseconds from request start to the end of the body.
    pub elapsed_ms: u64,
}

/// Client bound to one Teraslice base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url`, which must be `http` or `https`.
    pub fn new(base_url: Url, timeout: Duration) -> StatsResult<Self> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(StatsError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        let connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .build();
        let http = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self {
            base_url,
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path against the base URL.
    pub fn resolve(&self, path: &str) -> StatsResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| StatsError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    /// Build a URL from raw path segments, percent-encoding each one.
    pub fn resolve_segments(&self, segments: &[&str]) -> StatsResult<Url> {
        let mut url = self.resolve("/")?;
        url.path_segments_mut()
            .map_err(|()| StatsError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// GET `path` and decode the JSON body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> StatsResult<Fetched<T>> {
        self.get_json_url(self.resolve(path)?).await
    }

    /// GET an already resolved `url` and decode the JSON body as `T`.
    pub async fn get_json_url<T: DeserializeOwned>(&self, url: Url) -> StatsResult<Fetched<T>> {
        let fail = |source: FetchError| StatsError::Fetch {
            url: url.to_string(),
            source,
        };

        let started = Instant::now();
        let body = match tokio::time::timeout(self.timeout, self.fetch_body(&url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(fail(e)),
            Err(_) => return Err(fail(FetchError::Timeout(self.timeout))),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let data = serde_json::from_slice(&body).map_err(|e| fail(FetchError::Json(e)))?;
        debug!(%url, elapsed_ms, bytes = body.len(), "fetched teraslice resource");

        Ok(Fetched { data, elapsed_ms })
    }

    async fn fetch_body(&self, url: &Url) -> Result<Bytes, FetchError> {
        let uri: http::Uri = url.as_str().parse()?;
        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(uri)
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(http::header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())?;

        let resp = self.http.request(req).await?;
        let status = resp.status();
        if status != http::StatusCode::OK {
            debug!(%status, %url, "teraslice request returned non-200");
            return Err(FetchError::Status(status));
        }

        let body = resp.into_body().collect().await?.to_bytes();
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[test]
    fn accepts_https() {
        let c = client("https://teraslice.example.com");
        assert_eq!(
            c.resolve("/v1/cluster/state").unwrap().as_str(),
            "https://teraslice.example.com/v1/cluster/state"
        );
    }

    #[test]
    fn rejects_other_schemes() {
        let r = ApiClient::new(
            Url::parse("ftp://cluster.local").unwrap(),
            Duration::from_secs(1),
        );
        assert!(matches!(r, Err(StatsError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn segments_are_percent_encoded() {
        let c = client("http://cluster.local:5678/some/prefix?x=1");
        assert_eq!(
            c.resolve_segments(&["v1", "ex", "a/b?c#d"]).unwrap().as_str(),
            "http://cluster.local:5678/v1/ex/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            c.resolve_segments(&["v1", "ex", "plain-id"]).unwrap().as_str(),
            "http://cluster.local:5678/v1/ex/plain-id"
        );
    }

    #[test]
    fn resolves_absolute_paths_against_host() {
        let c = client("http://cluster.local:5678/some/prefix");
        assert_eq!(
            c.resolve("/v1/cluster/controllers").unwrap().as_str(),
            "http://cluster.local:5678/v1/cluster/controllers"
        );
        assert_eq!(c.resolve("/").unwrap().as_str(), "http://cluster.local:5678/");
        assert_eq!(
            c.resolve("/v1/jobs?size=200").unwrap().as_str(),
            "http://cluster.local:5678/v1/jobs?size=200"
        );
    }

    #[tokio::test]
    async fn connection_refused_is_a_fetch_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = client(&format!("http://{addr}"));
        let err = c.get_json::<serde_json::Value>("/").await.unwrap_err();
        match err {
            StatsError::Fetch { url, .. } => assert_eq!(url, format!("http://{addr}/")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_a_fetch_error() {
        let addr = serve(Router::new().route("/", get(|| async { (StatusCode::OK, "") }))).await;

        let err = client(&format!("http://{addr}"))
            .get_json::<serde_json::Value>("/")
            .await
            .unwrap_err();
        match err {
            StatsError::Fetch { url, source: FetchError::EmptyBody } => {
                assert_eq!(url, format!("http://{addr}/"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_200_is_a_fetch_error() {
        let addr = serve(Router::new().route(
            "/v1/jobs",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "{}") }),
        ))
        .await;

        let err = client(&format!("http://{addr}"))
            .get_json::<serde_json::Value>("/v1/jobs")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::Fetch { source: FetchError::Status(s), .. } if s == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let addr = serve(Router::new().route(
            "/v1/cluster/state",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "{}"
            }),
        ))
        .await;

        let timeout = Duration::from_millis(50);
        let c = ApiClient::new(Url::parse(&format!("http://{addr}")).unwrap(), timeout).unwrap();
        let err = c
            .get_json::<serde_json::Value>("/v1/cluster/state")
            .await
            .unwrap_err();
        match err {
            StatsError::Fetch { url, source: FetchError::Timeout(t) } => {
                assert_eq!(url, format!("http://{addr}/v1/cluster/state"));
                assert_eq!(t, timeout);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
