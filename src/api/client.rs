use moka::future::Cache;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

use super::errors::ApiError;
use super::token_store::TokenStore;
use crate::config::ApiConfig;
use crate::telemetry::{create_request_span, generate_correlation_id};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const FILE_TRANSFER_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Serve GETs from the response cache when possible
    pub cache: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Auth endpoints never carry a bearer token.
pub fn is_auth_endpoint(endpoint: &str) -> bool {
    endpoint.trim_start_matches('/').starts_with("auth/")
}

/// First path segment, used to group cache entries by resource.
fn resource_root(endpoint: &str) -> String {
    let trimmed = endpoint.trim_start_matches('/');
    let root = trimmed.split(['/', '?']).next().unwrap_or_default();
    format!("/{root}")
}

/// Generic REST client for the GeoTNB backend.
///
/// No call is retried: a failure is normalized into [`ApiError`] and
/// returned immediately.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    timeout: Duration,
    file_timeout: Duration,
    cache: Option<Cache<String, Value>>,
}

impl ApiClient {
    pub fn new(settings: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("geotnb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::network(&settings.base_url, e))?;

        let cache = (settings.cache_ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(settings.cache_capacity)
                .time_to_live(Duration::from_secs(settings.cache_ttl_seconds))
                .build()
        });

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            tokens,
            timeout: Duration::from_secs(settings.timeout_seconds),
            file_timeout: Duration::from_secs(settings.file_transfer_timeout_seconds),
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn cache_key(endpoint: &str, options: &RequestOptions) -> String {
        let mut key = endpoint.to_string();
        for (i, (k, v)) in options.query.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            key.push_str(k);
            key.push('=');
            key.push_str(v);
        }
        key
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request::<(), T>(Method::GET, endpoint, None, options).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, endpoint, Some(body), options).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, endpoint, Some(body), options).await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, endpoint, Some(body), options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request::<(), T>(Method::DELETE, endpoint, None, options).await
    }

    pub async fn request<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(body) => Payload::Json(
                serde_json::to_value(body).map_err(|e| ApiError::decode(0, endpoint, e))?,
            ),
            None => Payload::Empty,
        };

        let use_cache = method == Method::GET && options.cache;
        let key = Self::cache_key(endpoint, &options);
        if use_cache {
            if let Some(cache) = &self.cache {
                if let Some(cached) = cache.get(&key).await {
                    debug!("Cache hit for key: {}", key);
                    return serde_json::from_value(cached).map_err(|e| ApiError::decode(200, endpoint, e));
                }
            }
        }

        let is_write = method != Method::GET;
        let value = self.dispatch(method, endpoint, payload, &options).await?;

        if let Some(cache) = &self.cache {
            if use_cache {
                cache.insert(key, value.clone()).await;
            } else if is_write {
                self.invalidate_resource(endpoint).await;
            }
        }

        serde_json::from_value(value).map_err(|e| ApiError::decode(200, endpoint, e))
    }

    /// Multipart upload with the file-transfer timeout.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<T, ApiError> {
        let form = Form::new().part(field.to_string(), Part::bytes(bytes).file_name(file_name.to_string()));
        let options = RequestOptions::new().timeout(self.file_timeout);
        let value = self.dispatch(Method::POST, endpoint, Payload::Multipart(form), &options).await?;
        self.invalidate_resource(endpoint).await;
        serde_json::from_value(value).map_err(|e| ApiError::decode(200, endpoint, e))
    }

    /// Raw download with the file-transfer timeout.
    pub async fn download_file(&self, endpoint: &str, options: RequestOptions) -> Result<Vec<u8>, ApiError> {
        let options = RequestOptions {
            timeout: options.timeout.or(Some(self.file_timeout)),
            ..options
        };
        self.send(Method::GET, endpoint, Payload::Empty, &options).await
    }

    async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let bytes = self.send(method, endpoint, payload, options).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(200, endpoint, e))
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload,
        options: &RequestOptions,
    ) -> Result<Vec<u8>, ApiError> {
        let correlation_id = generate_correlation_id();
        let span = create_request_span(method.as_str(), endpoint, &correlation_id);
        let timeout = options.timeout.unwrap_or(self.timeout);

        async move {
            let mut builder = self
                .http
                .request(method, self.url(endpoint))
                .timeout(timeout)
                .header("X-Request-Id", correlation_id.as_str());

            if !options.query.is_empty() {
                builder = builder.query(&options.query);
            }
            if !is_auth_endpoint(endpoint) {
                if let Some(token) = self.tokens.access_token() {
                    builder = builder.bearer_auth(token);
                }
            }
            builder = match payload {
                Payload::Empty => builder,
                Payload::Json(body) => builder.json(&body),
                Payload::Multipart(form) => builder.multipart(form),
            };

            let response = builder.send().await.map_err(|e| {
                warn!(error = %e, "Request failed before a response");
                if e.is_timeout() {
                    ApiError::timeout(endpoint, timeout)
                } else {
                    ApiError::network(endpoint, e)
                }
            })?;

            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    ApiError::timeout(endpoint, timeout)
                } else {
                    ApiError::network(endpoint, e)
                }
            })?;

            if !status.is_success() {
                let err = ApiError::from_response(status.as_u16(), endpoint, &bytes);
                warn!(status = status.as_u16(), kind = ?err.kind, message = %err.message, "Request rejected");
                return Err(err);
            }

            debug!(status = status.as_u16(), bytes = bytes.len(), "Request succeeded");
            Ok(bytes.to_vec())
        }
        .instrument(span)
        .await
    }

    /// Drops cached GETs under the endpoint's resource, e.g. every
    /// `/parcelles...` entry after a write to `/parcelles/12`.
    pub async fn invalidate_resource(&self, endpoint: &str) {
        let Some(cache) = &self.cache else { return };
        let root = resource_root(endpoint);
        let keys: Vec<String> = cache
            .iter()
            .filter(|(key, _)| key.starts_with(&root))
            .map(|(key, _)| key.as_ref().clone())
            .collect();
        for key in &keys {
            cache.invalidate(key).await;
        }
        if !keys.is_empty() {
            debug!("Invalidated {} cache entries under {}", keys.len(), root);
        }
    }

    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            info!("API client cache cleared");
        }
    }
}
