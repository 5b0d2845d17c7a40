//! Conduit HTTP client.

use super::form::ConduitParams;
use super::models::{
    ConduitResponse, CursorToken, EditResult, FileInfo, Project, SearchPage, Task, Transaction,
    User,
};
use super::SourceTracker;
use crate::http::{self, Service, UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Authenticated Conduit client.
#[derive(Debug, Clone)]
pub struct PhabricatorClient {
    http: Client,
    api_url: Url,
    token: String,
}

impl PhabricatorClient {
    /// Creates a client for the Conduit endpoint at `api_url`
    /// (e.g. `https://phabricator.example.com/api`).
    #[must_use]
    pub fn new(http: Client, api_url: Url, token: String) -> Self {
        Self {
            http,
            api_url,
            token,
        }
    }

    /// Calls a Conduit method and unwraps its result envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &ConduitParams,
    ) -> Result<T, UpstreamError> {
        let request = self
            .http
            .post(http::endpoint(self.api_url.as_str(), method))
            .form(&params.with_token(&self.token));

        let response = http::send(Service::Phabricator, request).await?;
        let envelope: ConduitResponse<T> = http::decode_json(Service::Phabricator, response).await?;
        envelope.into_result()
    }

    /// Calls a `*.search` method and follows the cursor until the last page.
    async fn search_all<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &ConduitParams,
    ) -> Result<Vec<T>, UpstreamError> {
        let span = info_span!("conduit_search", method);

        collect_pages(|after| {
            let page_params = params.clone().after(after.as_ref());
            async move { self.call(method, &page_params).await }
        })
        .instrument(span)
        .await
    }

    /// Calls a `*.search` method expected to match a single record.
    async fn search_one<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &ConduitParams,
    ) -> Result<Option<T>, UpstreamError> {
        let page: SearchPage<T> = self.call(method, params).await?;
        Ok(page.data.into_iter().next())
    }
}

/// Requests pages until the cursor is exhausted and returns all records in
/// page order.
///
/// `fetch_page` receives the cursor of the previous page (`None` first).
/// Paging stops when a page has no `after` cursor or repeats the cursor it
/// was requested with.
async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, UpstreamError>
where
    F: FnMut(Option<CursorToken>) -> Fut,
    Fut: Future<Output = Result<SearchPage<T>, UpstreamError>>,
{
    let mut records = Vec::new();
    let mut after: Option<CursorToken> = None;

    loop {
        let page = fetch_page(after.clone()).await?;
        debug!(count = page.data.len(), "Fetched page");
        records.extend(page.data);

        match page.cursor.after {
            Some(next) if Some(&next) != after.as_ref() => after = Some(next),
            _ => break,
        }
    }

    Ok(records)
}

#[async_trait]
impl SourceTracker for PhabricatorClient {
    async fn search_issues(&self, status: &str) -> Result<Vec<Task>, UpstreamError> {
        let params = ConduitParams::new()
            .constraint("statuses", &[status])
            .attachment("projects");
        self.search_all("maniphest.search", &params).await
    }

    async fn search_transactions(
        &self,
        issue_phid: &str,
    ) -> Result<Vec<Transaction>, UpstreamError> {
        let params = ConduitParams::new().param("objectIdentifier", issue_phid);
        self.search_all("transaction.search", &params).await
    }

    async fn user(&self, phid: &str) -> Result<User, UpstreamError> {
        let params = ConduitParams::new().constraint("phids", &[phid]);
        self.search_one("user.search", &params)
            .await?
            .ok_or_else(|| UpstreamError::NotFound {
                what: format!("user {phid}"),
            })
    }

    async fn project(&self, phid: &str) -> Result<Project, UpstreamError> {
        let params = ConduitParams::new().constraint("phids", &[phid]);
        self.search_one("project.search", &params)
            .await?
            .ok_or_else(|| UpstreamError::NotFound {
                what: format!("project {phid}"),
            })
    }

    async fn file_info(&self, id: u64) -> Result<Option<FileInfo>, UpstreamError> {
        let params = ConduitParams::new().constraint("ids", &[id]);
        self.search_one("file.search", &params).await
    }

    async fn file_content(&self, uri: &str) -> Result<Vec<u8>, UpstreamError> {
        let response = http::send(Service::Phabricator, self.http.get(uri)).await?;
        http::read_bytes(Service::Phabricator, response).await
    }

    async fn post_comment(&self, issue_phid: &str, text: &str) -> Result<(), UpstreamError> {
        let params = ConduitParams::new()
            .transaction("comment", text)
            .param("objectIdentifier", issue_phid);
        let _: EditResult = self.call("maniphest.edit", &params).await?;
        Ok(())
    }
}
