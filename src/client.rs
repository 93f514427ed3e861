use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(base, reqwest::Client::new())
    }

    pub fn with_client(base: impl Into<String>, http: reqwest::Client) -> Self {
        ApiClient {
            base: base.into(),
            http,
        }
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.request(Method::GET, path, None, HeaderMap::new()).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Option<Value>> {
        let body = serde_json::to_string(body)?;
        self.request(Method::POST, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: HeaderMap,
    ) -> Result<Option<Value>> {
        let url = self.url(path);
        let mut all = HeaderMap::new();
        all.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        all.extend(headers);

        log::debug!("{} {}", method, url);
        let mut req = self.http.request(method, &url).headers(all);
        if let Some(body) = body {
            req = req.body(body);
        }
        let res = req.send().await.map_err(Error::Network)?;
        let status = res.status();
        let text = res.text().await.map_err(Error::Network)?;
        let data = if text.is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        if !status.is_success() {
            let message = data
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with {}", status.as_u16()));
            return Err(Error::Request {
                status: status.as_u16(),
                message,
                body: data,
            });
        }
        Ok(data)
    }
}
