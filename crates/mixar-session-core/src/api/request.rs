use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::Navigation;

/// Method, extra headers and JSON body for [`SessionClient::api_request`].
///
/// [`SessionClient::api_request`]: super::SessionClient::api_request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Add a header. Caller headers override the default `Content-Type`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Response of an authenticated request plus the navigation the caller
/// must perform (login redirect after a failed refresh).
#[derive(Debug)]
pub struct ApiResponse {
    response: Response,
    navigation: Navigation,
}

impl ApiResponse {
    pub(crate) fn new(response: Response) -> Self {
        Self::with_navigation(response, Navigation::None)
    }

    pub(crate) fn with_navigation(response: Response, navigation: Navigation) -> Self {
        Self {
            response,
            navigation,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn is_success(&self) -> bool {
        self.response.status().is_success()
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    pub async fn text(self) -> Result<String> {
        self.response
            .text()
            .await
            .context("Failed to read response body")
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.response
            .json()
            .await
            .context("Failed to parse JSON response")
    }
}
