//! In-memory trackers and record builders for unit tests.

use crate::compose::IssueDraft;
use crate::gitlab::{CreatedIssue, DestinationTracker, UploadedFile};
use crate::http::{Service, UpstreamError};
use crate::phabricator::{
    CommentRevision, FileFields, FileInfo, Policy, Project, ProjectFields, ProjectsAttachment,
    RawText, SourceTracker, Task, TaskAttachments, TaskFields, Transaction, User, UserFields,
};
use async_trait::async_trait;
use serde_json::Map;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn task(id: u64, title: &str, description: &str, author: &str, view: &str) -> Task {
    Task {
        id,
        phid: format!("PHID-TASK-{id}"),
        fields: TaskFields {
            name: title.to_string(),
            description: RawText {
                raw: description.to_string(),
            },
            author_phid: author.to_string(),
            policy: Policy {
                view: view.to_string(),
                edit: None,
            },
            extra: Map::new(),
        },
        attachments: TaskAttachments::default(),
    }
}

pub(crate) fn with_project(mut task: Task, project_phid: &str) -> Task {
    task.attachments.projects = Some(ProjectsAttachment {
        project_phids: vec![project_phid.to_string()],
    });
    task
}

pub(crate) fn revision(id: u64, author: &str, text: &str, removed: bool) -> CommentRevision {
    CommentRevision {
        id,
        phid: format!("PHID-XCMT-{id}"),
        author_phid: author.to_string(),
        removed,
        content: RawText {
            raw: text.to_string(),
        },
    }
}

pub(crate) fn comment(
    id: u64,
    created: i64,
    modified: i64,
    revisions: Vec<CommentRevision>,
) -> Transaction {
    let mut transaction = event(id, Some("comment"));
    transaction.date_created = created;
    transaction.date_modified = modified;
    transaction.comments = revisions;
    transaction
}

pub(crate) fn event(id: u64, kind: Option<&str>) -> Transaction {
    Transaction {
        id,
        phid: format!("PHID-XACT-{id}"),
        kind: kind.map(str::to_string),
        author_phid: None,
        date_created: 0,
        date_modified: 0,
        comments: Vec::new(),
        extra: Map::new(),
    }
}

/// Source tracker backed by maps.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    tasks: Vec<Task>,
    transactions: HashMap<String, Vec<Transaction>>,
    users: HashMap<String, User>,
    projects: HashMap<String, Project>,
    files: HashMap<u64, FileInfo>,
    contents: HashMap<String, Vec<u8>>,
    broken_downloads: HashSet<u64>,
    failing_transactions: bool,
    failing_comments: bool,
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<(String, String)>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub(crate) fn with_transactions(mut self, issue_phid: &str, list: Vec<Transaction>) -> Self {
        self.transactions.insert(issue_phid.to_string(), list);
        self
    }

    pub(crate) fn with_user(mut self, phid: &str, username: &str) -> Self {
        self.users.insert(
            phid.to_string(),
            User {
                id: self.users.len() as u64 + 1,
                phid: phid.to_string(),
                fields: UserFields {
                    username: username.to_string(),
                    real_name: String::new(),
                },
            },
        );
        self
    }

    pub(crate) fn with_project(mut self, phid: &str, name: &str) -> Self {
        self.projects.insert(
            phid.to_string(),
            Project {
                id: self.projects.len() as u64 + 1,
                phid: phid.to_string(),
                fields: ProjectFields {
                    name: name.to_string(),
                    slug: None,
                },
            },
        );
        self
    }

    pub(crate) fn with_file(mut self, id: u64, name: &str, content: &[u8]) -> Self {
        let uri = format!("https://phab.example.com/file/data/{id}/{name}");
        self.files.insert(
            id,
            FileInfo {
                id,
                phid: format!("PHID-FILE-{id}"),
                fields: FileFields {
                    name: name.to_string(),
                    data_uri: uri.clone(),
                    size: Some(content.len() as u64),
                },
            },
        );
        self.contents.insert(uri, content.to_vec());
        self
    }

    pub(crate) fn with_broken_download(mut self, id: u64) -> Self {
        self.broken_downloads.insert(id);
        self
    }

    pub(crate) fn failing_transactions(mut self) -> Self {
        self.failing_transactions = true;
        self
    }

    pub(crate) fn failing_comments(mut self) -> Self {
        self.failing_comments = true;
        self
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == method)
            .count()
    }

    pub(crate) fn downloads(&self) -> usize {
        self.calls("file.download")
    }

    pub(crate) fn posted_comments(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }
}

fn server_error(service: Service) -> UpstreamError {
    UpstreamError::Status {
        service,
        status: 500,
        body: "internal error".to_string(),
    }
}

#[async_trait]
impl SourceTracker for FakeSource {
    async fn search_issues(&self, _status: &str) -> Result<Vec<Task>, UpstreamError> {
        self.record("maniphest.search");
        Ok(self.tasks.clone())
    }

    async fn search_transactions(
        &self,
        issue_phid: &str,
    ) -> Result<Vec<Transaction>, UpstreamError> {
        self.record("transaction.search");
        if self.failing_transactions {
            return Err(server_error(Service::Phabricator));
        }
        Ok(self
            .transactions
            .get(issue_phid)
            .cloned()
            .unwrap_or_default())
    }

    async fn user(&self, phid: &str) -> Result<User, UpstreamError> {
        self.record("user.search");
        self.users
            .get(phid)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound {
                what: format!("user {phid}"),
            })
    }

    async fn project(&self, phid: &str) -> Result<Project, UpstreamError> {
        self.record("project.search");
        self.projects
            .get(phid)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound {
                what: format!("project {phid}"),
            })
    }

    async fn file_info(&self, id: u64) -> Result<Option<FileInfo>, UpstreamError> {
        self.record("file.search");
        Ok(self.files.get(&id).cloned())
    }

    async fn file_content(&self, uri: &str) -> Result<Vec<u8>, UpstreamError> {
        self.record("file.download");
        let broken = self
            .files
            .values()
            .any(|file| file.fields.data_uri == uri && self.broken_downloads.contains(&file.id));
        if broken {
            return Err(server_error(Service::Phabricator));
        }
        self.contents
            .get(uri)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound {
                what: format!("file content {uri}"),
            })
    }

    async fn post_comment(&self, issue_phid: &str, text: &str) -> Result<(), UpstreamError> {
        self.record("maniphest.edit");
        if self.failing_comments {
            return Err(server_error(Service::Phabricator));
        }
        self.posted
            .lock()
            .unwrap()
            .push((issue_phid.to_string(), text.to_string()));
        Ok(())
    }
}

/// Destination tracker that records uploads and created issues.
#[derive(Debug, Default)]
pub(crate) struct FakeDestination {
    failing_uploads: bool,
    failing_titles: HashSet<String>,
    failing_search: bool,
    existing: Vec<CreatedIssue>,
    uploads: Mutex<Vec<String>>,
    created: Mutex<Vec<IssueDraft>>,
}

impl FakeDestination {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_uploads(mut self) -> Self {
        self.failing_uploads = true;
        self
    }

    pub(crate) fn failing_create_for(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    pub(crate) fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub(crate) fn with_existing(mut self, title: &str) -> Self {
        let iid = self.existing.len() as u64 + 100;
        self.existing.push(CreatedIssue {
            iid,
            title: title.to_string(),
            web_url: issue_url(iid),
        });
        self
    }

    pub(crate) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub(crate) fn created(&self) -> Vec<IssueDraft> {
        self.created.lock().unwrap().clone()
    }
}

pub(crate) fn issue_url(iid: u64) -> String {
    format!("https://gitlab.example.com/group/project/-/issues/{iid}")
}

pub(crate) fn upload_markdown(index: usize, name: &str) -> String {
    format!("![{name}](/uploads/{index:032x}/{name})")
}

#[async_trait]
impl DestinationTracker for FakeDestination {
    async fn upload_file(
        &self,
        file_name: &str,
        _content: Vec<u8>,
    ) -> Result<UploadedFile, UpstreamError> {
        if self.failing_uploads {
            return Err(server_error(Service::GitLab));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(file_name.to_string());
        let index = uploads.len();
        Ok(UploadedFile {
            alt: file_name.to_string(),
            url: format!("/uploads/{index:032x}/{file_name}"),
            full_path: None,
            markdown: upload_markdown(index, file_name),
        })
    }

    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue, UpstreamError> {
        if self.failing_titles.contains(&draft.title) {
            return Err(server_error(Service::GitLab));
        }
        let mut created = self.created.lock().unwrap();
        created.push(draft.clone());
        let iid = created.len() as u64;
        Ok(CreatedIssue {
            iid,
            title: draft.title.clone(),
            web_url: issue_url(iid),
        })
    }

    async fn find_open_issue(&self, title: &str) -> Result<Option<CreatedIssue>, UpstreamError> {
        if self.failing_search {
            return Err(server_error(Service::GitLab));
        }
        Ok(self
            .existing
            .iter()
            .find(|issue| issue.title == title)
            .cloned())
    }
}
