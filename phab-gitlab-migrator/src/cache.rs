//! Run-scoped memoisation of users and projects.
//!
//! Identities cannot change during a run, so entries are never invalidated.
//! The cache is owned by the run loop and dropped with it.

use crate::http::UpstreamError;
use crate::phabricator::{Project, SourceTracker, User};
use std::collections::HashMap;
use tracing::debug;

/// Memoised user and project lookups for one run.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    users: HashMap<String, User>,
    projects: HashMap<String, Project>,
}

impl ReferenceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user with `phid`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the user has to be fetched and the lookup
    /// fails. Failures are not cached.
    pub async fn user<S: SourceTracker + ?Sized>(
        &mut self,
        source: &S,
        phid: &str,
    ) -> Result<User, UpstreamError> {
        if let Some(user) = self.users.get(phid) {
            debug!(phid, "Returning cached user");
            return Ok(user.clone());
        }

        let user = source.user(phid).await?;
        self.users.insert(phid.to_string(), user.clone());
        Ok(user)
    }

    /// Returns the project with `phid`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the project has to be fetched and the
    /// lookup fails.
    pub async fn project<S: SourceTracker + ?Sized>(
        &mut self,
        source: &S,
        phid: &str,
    ) -> Result<Project, UpstreamError> {
        if let Some(project) = self.projects.get(phid) {
            debug!(phid, "Returning cached project");
            return Ok(project.clone());
        }

        let project = source.project(phid).await?;
        self.projects.insert(phid.to_string(), project.clone());
        Ok(project)
    }

    /// Number of cached users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of cached projects.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
