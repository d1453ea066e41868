//! Session-aware API client for the Mixar backend.
//!
//! `SessionClient` owns the [`Session`] and a pooled `reqwest::Client`. All
//! authenticated traffic goes through [`SessionClient::api_request`], which
//! performs at most two attempts: the original request and, after a 401
//! answered by a successful token refresh, one retry with the new token.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::{KeyValueStore, Navigation, Session};
use crate::config::Config;
use crate::models::{TokenPair, UserProfile};

use super::{ApiResponse, RequestOptions, SessionError};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_ENDPOINT: &str = "/auth/login/json";
const SEND_OTP_ENDPOINT: &str = "/auth/signup/send-otp";
const VERIFY_OTP_ENDPOINT: &str = "/auth/signup/verify-otp";
const REFRESH_ENDPOINT: &str = "/auth/refresh";
const CURRENT_USER_ENDPOINT: &str = "/auth/me";
const LOGOUT_ENDPOINT: &str = "/auth/logout";
const GOOGLE_LOGIN_ENDPOINT: &str = "/auth/login/google";
const GOOGLE_CALLBACK_ENDPOINT: &str = "/auth/google";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpRequest<'a> {
    email: &'a str,
    otp_code: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct GoogleCallbackRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct GoogleLoginResponse {
    url: Option<String>,
}

pub struct SessionClient {
    client: Client,
    config: Config,
    session: Session,
}

impl SessionClient {
    /// Restore the session from `store` and build an HTTP client with the
    /// configured timeout.
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config, store))
    }

    /// Build on an existing `reqwest::Client`, sharing its connection pool.
    pub fn with_client(client: Client, config: Config, store: Box<dyn KeyValueStore>) -> Self {
        let session = Session::restore(store, config.storage.clone());
        Self {
            client,
            config,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ===== State =====

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.access_token()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.session.refresh_token()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    pub fn is_superuser(&self) -> bool {
        self.session.is_superuser()
    }

    pub fn set_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        self.session.set_tokens(access_token, refresh_token);
    }

    pub fn set_user(&mut self, user: UserProfile) {
        self.session.set_user(user);
    }

    pub fn clear_auth(&mut self) {
        self.session.clear();
        info!("Session cleared");
    }

    // ===== Guards =====

    /// `Navigation::Login` when there is no access token.
    pub fn require_auth(&self) -> Navigation {
        if self.is_authenticated() {
            Navigation::None
        } else {
            Navigation::Login
        }
    }

    /// Authenticated superusers only; other signed-in users go to the dashboard.
    pub fn require_superuser(&self) -> Navigation {
        match self.require_auth() {
            Navigation::None if !self.is_superuser() => Navigation::Dashboard,
            navigation => navigation,
        }
    }

    /// Bounce signed-in users away from the login and signup pages.
    pub fn redirect_if_authenticated(&self) -> Navigation {
        if self.is_authenticated() {
            Navigation::Dashboard
        } else {
            Navigation::None
        }
    }

    // ===== Authenticated requests =====

    /// Send `options` to `endpoint` with the session's bearer token.
    ///
    /// A 401 with a refresh token present triggers one refresh. On success the
    /// request is re-issued once and that response returned as is. On failure
    /// the session is cleared and the original 401 is returned carrying
    /// `Navigation::Login`. Transport errors propagate.
    pub async fn api_request(&mut self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse> {
        let url = self.config.endpoint_url(endpoint);

        let response = self.dispatch(&url, &options).await?;
        if response.status() != StatusCode::UNAUTHORIZED || self.session.refresh_token().is_none() {
            return Ok(ApiResponse::new(response));
        }

        debug!(url = %url, "Access token rejected, refreshing");
        if self.refresh_access_token().await {
            let retried = self.dispatch(&url, &options).await?;
            Ok(ApiResponse::new(retried))
        } else {
            warn!(url = %url, "Token refresh failed, ending session");
            self.clear_auth();
            Ok(ApiResponse::with_navigation(response, Navigation::Login))
        }
    }

    /// Exchange the refresh token for new credentials.
    ///
    /// Returns false without touching the session on any failure.
    pub async fn refresh_access_token(&mut self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            return false;
        };
        let url = self.config.endpoint_url(REFRESH_ENDPOINT);

        let result = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&RefreshRequest { refresh_token })
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "Refresh rejected");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                return false;
            }
        };

        match response.json::<TokenPair>().await {
            Ok(pair) => {
                self.session.set_tokens(pair.access_token, pair.refresh_token);
                info!("Access token refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse refresh response");
                false
            }
        }
    }

    /// Fetch `/auth/me` and cache it. A non-success answer leaves the cached
    /// user alone and yields `None`.
    pub async fn fetch_user(&mut self) -> Result<Option<UserProfile>> {
        let response = self.api_request(CURRENT_USER_ENDPOINT, RequestOptions::get()).await?;
        if !response.is_success() {
            debug!(status = %response.status(), "Current user unavailable");
            return Ok(None);
        }

        match response.json::<UserProfile>().await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse current user");
                Ok(None)
            }
        }
    }

    // ===== Login and signup =====

    pub async fn login(&mut self, email: &str, password: &str) -> Result<TokenPair> {
        let body = self
            .post_public(LOGIN_ENDPOINT, &LoginRequest { email, password }, SessionError::rejected, "Login failed")
            .await?;
        self.establish(body).await
    }

    /// Ask the backend to email a signup code. Does not touch the session.
    pub async fn send_signup_otp(&self, email: &str, password: &str, name: &str) -> Result<Value> {
        self.post_public(
            SEND_OTP_ENDPOINT,
            &SignupRequest { email, password, name },
            SessionError::rejected_with_message,
            "Failed to send OTP",
        )
        .await
    }

    pub async fn verify_signup_otp(
        &mut self,
        email: &str,
        otp_code: &str,
        password: &str,
        name: &str,
    ) -> Result<TokenPair> {
        let request = VerifyOtpRequest {
            email,
            otp_code,
            password,
            name,
        };
        let body = self
            .post_public(VERIFY_OTP_ENDPOINT, &request, SessionError::rejected, "OTP verification failed")
            .await?;
        self.establish(body).await
    }

    // ===== Google OAuth =====

    /// URL of the Google consent page the caller should navigate to.
    pub async fn login_with_google(&self) -> Result<String> {
        let url = self.config.endpoint_url(GOOGLE_LOGIN_ENDPOINT);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SessionError::Network)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let text = response.text().await.map_err(SessionError::Network)?;
        let parsed: GoogleLoginResponse = serde_json::from_str(&text)
            .map_err(|_| SessionError::InvalidResponse(SessionError::truncate_body(&text)))?;

        match parsed.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(SessionError::MissingOAuthUrl.into()),
        }
    }

    pub async fn handle_google_callback(&mut self, code: &str) -> Result<TokenPair> {
        let body = self
            .post_public(
                GOOGLE_CALLBACK_ENDPOINT,
                &GoogleCallbackRequest { code },
                SessionError::rejected,
                "Google authentication failed",
            )
            .await?;
        self.establish(body).await
    }

    // ===== Logout =====

    /// End the session. The backend call is best effort; local state is
    /// always cleared and the caller always sent to the login page.
    pub async fn logout(&mut self) -> Navigation {
        match self.api_request(LOGOUT_ENDPOINT, RequestOptions::post()).await {
            Ok(response) => debug!(status = %response.status(), "Logout acknowledged"),
            Err(e) => warn!(error = %e, "Logout request failed"),
        }
        self.clear_auth();
        Navigation::Login
    }

    // ===== Internals =====

    fn request_headers(&self, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers.clone());

        if let Some(token) = self.session.access_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SessionError::InvalidHeader(e.to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// One attempt with the current token; transport errors are logged here.
    async fn dispatch(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        let headers = self.request_headers(options)?;
        let mut request = self
            .client
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(ref body) = options.body {
            request = request.body(body.to_string());
        }

        debug!(method = %options.method, url = url, "Sending request");
        request.send().await.map_err(|e| {
            error!(method = %options.method, url = url, error = %e, "API request failed");
            anyhow::Error::from(SessionError::Network(e))
                .context(format!("Failed to send {} request to {}", options.method, url))
        })
    }

    /// Unauthenticated JSON POST for the auth endpoints. Non-success answers
    /// become `SessionError::Authentication` via `reject`.
    async fn post_public<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        reject: fn(&str, &str) -> SessionError,
        fallback: &str,
    ) -> Result<Value> {
        let url = self.config.endpoint_url(endpoint);
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(SessionError::Network)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let status = response.status();
        let text = response.text().await.map_err(SessionError::Network)?;
        if !status.is_success() {
            debug!(status = %status, endpoint = endpoint, "Authentication rejected");
            return Err(reject(&text, fallback).into());
        }

        serde_json::from_str(&text)
            .map_err(|_| SessionError::InvalidResponse(SessionError::truncate_body(&text)).into())
    }

    /// Commit the token pair from a successful auth response and load the user.
    async fn establish(&mut self, body: Value) -> Result<TokenPair> {
        let pair: TokenPair = serde_json::from_value(body)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        self.session
            .set_tokens(pair.access_token.clone(), pair.refresh_token.clone());
        info!("Signed in");
        self.fetch_user().await?;
        Ok(pair)
    }
}
