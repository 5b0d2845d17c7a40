//! GitLab project API client.

use super::models::{CreatedIssue, NewIssueRequest, UploadedFile};
use super::DestinationTracker;
use crate::compose::IssueDraft;
use crate::http::{self, Service, UpstreamError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};
use url::Url;

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Results per page for the duplicate title search.
const RESULTS_PER_PAGE: u8 = 100;

/// Authenticated client for a single GitLab project.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    project_url: Url,
    token: String,
}

impl GitLabClient {
    /// Creates a client for the project API URL
    /// (e.g. `https://gitlab.example.com/api/v4/projects/42`).
    #[must_use]
    pub fn new(http: Client, project_url: Url, token: String) -> Self {
        Self {
            http,
            project_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        http::endpoint(self.project_url.as_str(), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(TOKEN_HEADER, &self.token)
    }
}

#[async_trait]
impl DestinationTracker for GitLabClient {
    async fn upload_file(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<UploadedFile, UpstreamError> {
        let size = content.len();
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name.to_string()));
        let request = self.authorized(self.http.post(self.url("uploads"))).multipart(form);

        let response = http::send(Service::GitLab, request).await?;
        let uploaded: UploadedFile = http::decode_json(Service::GitLab, response).await?;
        debug!(file_name, bytes = size, url = %uploaded.url, "Uploaded file");
        Ok(uploaded)
    }

    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue, UpstreamError> {
        let body = NewIssueRequest {
            title: &draft.title,
            description: &draft.description,
            confidential: draft.confidential,
        };
        let request = self.authorized(self.http.post(self.url("issues"))).json(&body);

        let response = http::send(Service::GitLab, request).await?;
        let issue: CreatedIssue = http::decode_json(Service::GitLab, response).await?;
        info!(iid = issue.iid, url = %issue.web_url, "Created issue");
        Ok(issue)
    }

    async fn find_open_issue(&self, title: &str) -> Result<Option<CreatedIssue>, UpstreamError> {
        let per_page = RESULTS_PER_PAGE.to_string();
        let request = self.authorized(self.http.get(self.url("issues"))).query(&[
            ("search", title),
            ("in", "title"),
            ("state", "opened"),
            ("per_page", per_page.as_str()),
        ]);

        let response = http::send(Service::GitLab, request).await?;
        let issues: Vec<CreatedIssue> = http::decode_json(Service::GitLab, response).await?;

        // The search is fuzzy, only an exact title counts
        Ok(issues.into_iter().find(|issue| issue.title == title))
    }
}
