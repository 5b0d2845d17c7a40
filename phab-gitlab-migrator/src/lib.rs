#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod attachments;
pub mod cache;
pub mod comments;
pub mod compose;
pub mod config;
pub mod dump;
pub mod gitlab;
pub mod http;
pub mod migration;
pub mod phabricator;
pub mod runner;
pub mod summary;

#[cfg(test)]
mod test_support;

pub use attachments::{scan_file_refs, FileRef, RelocationError, Relocator, DELETED_PLACEHOLDER};
pub use cache::ReferenceCache;
pub use comments::{assemble_comments, render_comments, RenderedComment};
pub use compose::{
    compose_issue, issue_title, source_issue_url, ComposeError, DescriptionContext,
    DescriptionRenderer, IssueDraft,
};
pub use config::{load_config, ConfigError, ConfigFile, MigratorConfig};
pub use dump::{write_issue_dump, DumpError};
pub use gitlab::{CreatedIssue, DestinationTracker, GitLabClient, UploadedFile};
pub use http::{build_client, Service, UpstreamError};
pub use migration::{
    build_record, migrate_issue, FailureStage, MigrationContext, MigrationOutcome,
    MigrationRecord, MigrationStage, MigrationStatus, WritebackStatus,
};
pub use phabricator::{moved_comment, PhabricatorClient, SourceTracker};
pub use runner::{run_migration, Runner, RunnerError};
pub use summary::{IssueReport, RunSummary};
