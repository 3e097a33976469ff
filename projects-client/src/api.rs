use crate::error::ClientError;
use crate::session::TokenProvider;
use log::{debug, warn};
use projects_model::{Milestone, MilestoneStatus, PermissionGrant, Project, UserProfile};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Navigation side effect for authorization failures.
///
/// 401 (no/invalid token) and 403 (insufficient permission) are routed here
/// identically; the intended implementation steers the UI to its
/// unauthorized view. There is deliberately no retry or silent
/// re-authorization behind this hook.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self, status: StatusCode);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn(StatusCode) + Send + Sync,
{
    fn on_unauthorized(&self, status: StatusCode) {
        self(status)
    }
}

struct IgnoreUnauthorized;

impl UnauthorizedHandler for IgnoreUnauthorized {
    fn on_unauthorized(&self, _status: StatusCode) {}
}

/// HTTP client for the Projects API with automatic bearer attachment.
///
/// Requests whose URL is prefixed by the API root get an
/// `Authorization: Bearer` header from the token provider; anything else
/// passes through untouched, so the credential never leaks to foreign hosts.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_root: Url,
    tokens: Arc<dyn TokenProvider>,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    pub fn new(mut api_root: Url, tokens: Arc<dyn TokenProvider>) -> Self {
        // normalized so Url::join keeps the root's last path segment
        if !api_root.path().ends_with('/') {
            api_root.set_path(&format!("{}/", api_root.path()));
        }
        Self {
            http: Client::new(),
            api_root,
            tokens,
            on_unauthorized: Arc::new(IgnoreUnauthorized),
        }
    }

    /// Install the unauthorized-redirect hook
    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = handler;
        self
    }

    /// Use a pre-configured reqwest client (timeouts, proxies, ...)
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Dispatch a request through the token-attachment pipeline.
    ///
    /// Token retrieval completes (or is definitively absent) before the
    /// request goes out; an absent token sends the request without an
    /// Authorization header rather than blocking locally, since the server
    /// is the authority on validity.
    pub async fn send(&self, mut request: Request) -> Result<Response, ClientError> {
        if request.url().as_str().starts_with(self.api_root.as_str()) {
            match self.tokens.access_token().await {
                Some(token) => match HeaderValue::from_str(&format!("Bearer {token}")) {
                    Ok(value) => {
                        request.headers_mut().insert(AUTHORIZATION, value);
                    }
                    Err(e) => warn!("Session token is not a valid header value: {e}"),
                },
                None => debug!("No session token available, sending request without credential"),
            }
        }

        let response = self.http.execute(request).await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            warn!("API rejected the call with {}", response.status());
            self.on_unauthorized.on_unauthorized(response.status());
            return Err(ClientError::Unauthorized(response.status()));
        }

        Ok(response)
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.api_root.join(path)?)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn fetch_unit(&self, request: Request) -> Result<(), ClientError> {
        let response = self.send(request).await?;
        response.error_for_status()?;
        Ok(())
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>, ClientError> {
        let request = self.http.get(self.url("Projects")?).build()?;
        self.fetch_json(request).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ClientError> {
        let request = self.http.get(self.url(&format!("Projects/{id}"))?).build()?;
        self.fetch_json(request).await
    }

    pub async fn get_project_users(&self, id: i64) -> Result<Vec<UserProfile>, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("Projects/{id}/Users"))?)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn add_project(&self, project: &Project) -> Result<Project, ClientError> {
        let request = self.http.post(self.url("Projects")?).json(project).build()?;
        self.fetch_json(request).await
    }

    pub async fn update_project(&self, project: &Project) -> Result<(), ClientError> {
        let request = self
            .http
            .put(self.url(&format!("Projects/{}", project.id))?)
            .json(project)
            .build()?;
        self.fetch_unit(request).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<Project, ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("Projects/{id}"))?)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn add_milestone(&self, milestone: &Milestone) -> Result<Milestone, ClientError> {
        let request = self
            .http
            .post(self.url("Projects/Milestones")?)
            .json(milestone)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn update_milestone(&self, milestone: &Milestone) -> Result<Milestone, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("Projects/Milestones/{}", milestone.id))?)
            .json(milestone)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn delete_milestone(&self, id: i64) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("Projects/Milestones/{id}"))?)
            .build()?;
        self.fetch_unit(request).await
    }

    pub async fn get_milestone_statuses(&self) -> Result<Vec<MilestoneStatus>, ClientError> {
        let request = self
            .http
            .get(self.url("Projects/MilestoneStatuses")?)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn add_user_permission(
        &self,
        grant: &PermissionGrant,
    ) -> Result<PermissionGrant, ClientError> {
        let request = self
            .http
            .post(self.url("UserPermissions")?)
            .json(grant)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn update_user_permission(
        &self,
        grant: &PermissionGrant,
    ) -> Result<PermissionGrant, ClientError> {
        let request = self
            .http
            .put(self.url("UserPermissions")?)
            .json(grant)
            .build()?;
        self.fetch_json(request).await
    }

    pub async fn remove_user_permission(
        &self,
        user_id: &str,
        project_id: i64,
    ) -> Result<(), ClientError> {
        let mut url = self.url("UserPermissions")?;
        url.query_pairs_mut()
            .append_pair("userId", user_id)
            .append_pair("projectId", &project_id.to_string());
        let request = self.http.delete(url).build()?;
        self.fetch_unit(request).await
    }
}
