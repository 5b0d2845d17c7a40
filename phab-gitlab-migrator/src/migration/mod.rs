//! Migration of a single task.
//!
//! A task moves through fetching, comment assembly, attachment relocation,
//! composition, creation on GitLab and the forwarding comment. A failure
//! stops that task only; the caller decides what happens next.

mod record;
mod status;

pub use record::{build_record, MigrationRecord};
pub use status::{
    FailureStage, MigrationOutcome, MigrationStage, MigrationStatus, WritebackStatus,
};

use crate::attachments::Relocator;
use crate::comments::render_comments;
use crate::compose::{
    compose_issue, issue_title, source_issue_url, DescriptionContext, DescriptionRenderer,
    IssueDraft,
};
use crate::gitlab::DestinationTracker;
use crate::phabricator::{moved_comment, SourceTracker};
use std::path::Path;
use tracing::{debug, error, info, info_span, warn, Instrument};
use url::Url;

/// Collaborators shared by every task of a run.
pub struct MigrationContext<'a, S: ?Sized, D: ?Sized> {
    /// Phabricator access.
    pub source: &'a S,

    /// GitLab access.
    pub destination: &'a D,

    /// Description renderer.
    pub renderer: &'a DescriptionRenderer,

    /// Conduit API URL, used to rebuild task URLs.
    pub source_api_url: &'a Url,

    /// Directory downloaded files are staged in.
    pub staging_dir: &'a Path,

    /// Compose only, without writing to either tracker.
    pub dry_run: bool,
}

/// Migrates one task to GitLab.
///
/// This function:
/// 1. Skips the task if GitLab already has an open issue with its title
/// 2. Relocates files embedded in the description, then in the comments
/// 3. Composes and creates the GitLab issue
/// 4. Posts the forwarding comment on the task
///
/// In dry-run mode only the composition step runs, on the original text.
pub async fn migrate_issue<S, D>(
    ctx: &MigrationContext<'_, S, D>,
    record: &MigrationRecord,
) -> MigrationOutcome
where
    S: SourceTracker + ?Sized,
    D: DestinationTracker + ?Sized,
{
    let span = info_span!("migrate_issue", issue = %record.monogram);

    async {
        info!("Migrating issue");
        advance(MigrationStage::Fetched);

        let title = issue_title(&record.monogram, &record.issue.fields.name);
        let source_url = source_issue_url(ctx.source_api_url, &record.monogram);
        let comments = render_comments(&record.comments);
        advance(MigrationStage::CommentsAssembled);

        if ctx.dry_run {
            let context = DescriptionContext {
                author: record.author.username(),
                source_url: &source_url,
                description: &record.issue.fields.description.raw,
                comments: Some(comments.as_str()),
            };
            return match compose_issue(ctx.renderer, title, &context, record.confidential) {
                Ok(draft) => outcome(record, Some(draft), MigrationStatus::DryRun),
                Err(e) => failed(record, None, FailureStage::Compose, &e),
            };
        }

        match ctx.destination.find_open_issue(&title).await {
            Ok(Some(existing)) => {
                info!(url = %existing.web_url, "Issue already migrated, skipping");
                return outcome(
                    record,
                    None,
                    MigrationStatus::Skipped {
                        reason: format!("open issue #{} has the same title", existing.iid),
                        url: existing.web_url,
                    },
                );
            }
            Ok(None) => {}
            Err(e) => return failed(record, None, FailureStage::DuplicateCheck, &e),
        }

        let mut relocator = Relocator::new(ctx.source, ctx.destination, ctx.staging_dir);

        let description = match relocator.relocate(&record.issue.fields.description.raw).await {
            Ok(text) => text,
            Err(e) => return failed(record, None, FailureStage::Upload, &e),
        };
        advance(MigrationStage::DescriptionRelocated);

        let comments = if comments.is_empty() {
            None
        } else {
            match relocator.relocate(&comments).await {
                Ok(text) => Some(text),
                Err(e) => return failed(record, None, FailureStage::Upload, &e),
            }
        };
        advance(MigrationStage::CommentsRelocated);
        debug!(files = relocator.uploaded_count(), "Relocated attachments");

        let context = DescriptionContext {
            author: record.author.username(),
            source_url: &source_url,
            description: &description,
            comments: comments.as_deref(),
        };
        let draft = match compose_issue(ctx.renderer, title, &context, record.confidential) {
            Ok(draft) => draft,
            Err(e) => return failed(record, None, FailureStage::Compose, &e),
        };
        advance(MigrationStage::Composed);

        let created = match ctx.destination.create_issue(&draft).await {
            Ok(created) => created,
            Err(e) => return failed(record, Some(draft), FailureStage::Create, &e),
        };
        advance(MigrationStage::Created);

        let writeback = post_writeback(ctx.source, &record.issue.phid, &created.web_url).await;
        advance(MigrationStage::WritebackAttempted);

        advance(MigrationStage::Done);
        outcome(
            record,
            Some(draft),
            MigrationStatus::Created {
                url: created.web_url,
                writeback,
            },
        )
    }
    .instrument(span)
    .await
}

/// Leaves the forwarding comment; failures are logged and reported only.
async fn post_writeback<S: SourceTracker + ?Sized>(
    source: &S,
    issue_phid: &str,
    destination_url: &str,
) -> WritebackStatus {
    match source
        .post_comment(issue_phid, &moved_comment(destination_url))
        .await
    {
        Ok(()) => WritebackStatus::Posted,
        Err(e) => {
            warn!(error = %e, "Failed to post forwarding comment");
            WritebackStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn advance(stage: MigrationStage) {
    debug!(stage = ?stage, "Migration stage reached");
}

fn outcome(
    record: &MigrationRecord,
    draft: Option<IssueDraft>,
    status: MigrationStatus,
) -> MigrationOutcome {
    MigrationOutcome {
        monogram: record.monogram.clone(),
        draft,
        status,
    }
}

fn failed(
    record: &MigrationRecord,
    draft: Option<IssueDraft>,
    stage: FailureStage,
    error: &dyn std::error::Error,
) -> MigrationOutcome {
    error!(stage = %stage, error = %error, "Issue migration failed");
    outcome(
        record,
        draft,
        MigrationStatus::Failed {
            stage,
            error: error.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReferenceCache;
    use crate::test_support::{
        comment, issue_url, revision, task, upload_markdown, FakeDestination, FakeSource,
    };
    use tempfile::TempDir;

    const API_URL: &str = "https://phab.example.com/api/";

    fn t42_source() -> FakeSource {
        let issue = task(42, "Crash on start", "see {F7}", "PHID-USER-R", "public");
        FakeSource::new()
            .with_user("PHID-USER-R", "reporter")
            .with_user("PHID-USER-A", "alice")
            .with_file(7, "trace.txt", b"stack")
            .with_transactions(
                &issue.phid,
                vec![comment(
                    100,
                    1_600_000_000,
                    1_600_000_000,
                    vec![revision(1, "PHID-USER-A", "looks good", false)],
                )],
            )
            .with_task(issue)
    }

    async fn record_for(source: &FakeSource, id: u64) -> MigrationRecord {
        let mut cache = ReferenceCache::new();
        let issue = source
            .search_issues("open")
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.id == id)
            .unwrap();
        build_record(source, &mut cache, issue).await.unwrap()
    }

    async fn run(
        source: &FakeSource,
        destination: &FakeDestination,
        dry_run: bool,
    ) -> MigrationOutcome {
        let temp = TempDir::new().unwrap();
        let renderer = DescriptionRenderer::new().unwrap();
        let api_url = Url::parse(API_URL).unwrap();
        let ctx = MigrationContext {
            source,
            destination,
            renderer: &renderer,
            source_api_url: &api_url,
            staging_dir: temp.path(),
            dry_run,
        };
        let record = record_for(source, 42).await;
        migrate_issue(&ctx, &record).await
    }

    #[tokio::test]
    async fn migrates_public_issue_with_file_and_comment() {
        let source = t42_source();
        let destination = FakeDestination::new();

        let outcome = run(&source, &destination, false).await;

        let draft = outcome.draft.unwrap();
        assert_eq!(draft.title, "T42: Crash on start");
        assert!(!draft.confidential);
        assert_eq!(
            draft.description,
            format!(
                "### Description\n\n\
                 **Originally reported by reporter: https://phab.example.com/T42**\n\n\
                 see {}\n\n\
                 ### Comments:\n\n\
                 **alice commented on 2020-09-13 12:26:40 UTC:**\n\n\
                 looks good\n\n----\n\n\n",
                upload_markdown(1, "trace.txt")
            )
        );
        assert!(!draft.description.contains("(Edited)"));

        assert_eq!(
            outcome.status,
            MigrationStatus::Created {
                url: issue_url(1),
                writeback: WritebackStatus::Posted,
            }
        );
        assert_eq!(
            source.posted_comments(),
            vec![(
                "PHID-TASK-42".to_string(),
                format!("This issue was moved to gitlab: {}", issue_url(1))
            )]
        );
    }

    #[tokio::test]
    async fn create_failure_skips_writeback() {
        let source = t42_source();
        let destination = FakeDestination::new().failing_create_for("T42: Crash on start");

        let outcome = run(&source, &destination, false).await;

        assert!(matches!(
            outcome.status,
            MigrationStatus::Failed {
                stage: FailureStage::Create,
                ..
            }
        ));
        assert!(outcome.draft.is_some());
        assert_eq!(source.calls("maniphest.edit"), 0);
    }

    #[tokio::test]
    async fn upload_failure_stops_before_create() {
        let source = t42_source();
        let destination = FakeDestination::new().failing_uploads();

        let outcome = run(&source, &destination, false).await;

        assert!(matches!(
            outcome.status,
            MigrationStatus::Failed {
                stage: FailureStage::Upload,
                ..
            }
        ));
        assert!(destination.created().is_empty());
        assert!(source.posted_comments().is_empty());
    }

    #[tokio::test]
    async fn writeback_failure_keeps_created_issue() {
        let source = t42_source().failing_comments();
        let destination = FakeDestination::new();

        let outcome = run(&source, &destination, false).await;

        match outcome.status {
            MigrationStatus::Created { url, writeback } => {
                assert_eq!(url, issue_url(1));
                assert!(matches!(writeback, WritebackStatus::Failed { .. }));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test]
    async fn existing_issue_is_skipped() {
        let source = t42_source();
        let destination = FakeDestination::new().with_existing("T42: Crash on start");

        let outcome = run(&source, &destination, false).await;

        assert!(matches!(outcome.status, MigrationStatus::Skipped { .. }));
        assert!(destination.uploads().is_empty());
        assert!(destination.created().is_empty());
        assert_eq!(source.calls("maniphest.edit"), 0);
    }

    #[tokio::test]
    async fn duplicate_check_failure_fails_issue() {
        let source = t42_source();
        let destination = FakeDestination::new().failing_search();

        let outcome = run(&source, &destination, false).await;

        assert!(matches!(
            outcome.status,
            MigrationStatus::Failed {
                stage: FailureStage::DuplicateCheck,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dry_run_composes_without_writing() {
        let source = t42_source();
        let destination = FakeDestination::new();

        let outcome = run(&source, &destination, true).await;

        assert_eq!(outcome.status, MigrationStatus::DryRun);
        let draft = outcome.draft.unwrap();
        assert!(draft.description.contains("see {F7}"));
        assert!(destination.uploads().is_empty());
        assert!(destination.created().is_empty());
        assert!(source.posted_comments().is_empty());
    }

    #[tokio::test]
    async fn issue_without_comments_has_no_comment_section() {
        let issue = task(42, "Quiet", "nothing here", "PHID-USER-R", "users");
        let source = FakeSource::new()
            .with_user("PHID-USER-R", "reporter")
            .with_task(issue);
        let destination = FakeDestination::new();

        let outcome = run(&source, &destination, false).await;

        let draft = outcome.draft.unwrap();
        assert!(draft.confidential);
        assert!(!draft.description.contains("### Comments"));
        assert!(draft.description.ends_with("nothing here\n"));
    }
}
