//! Recording fake trackers for service tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::domain::errors::TrackerError;
use crate::domain::ports::{
    GithubApi, GithubIssueUpdate, NewGithubIssue, NewRedmineIssue, RedmineApi,
    RedmineIssueUpdate, TokenScopes,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubCall {
    Create { repo: String, issue: NewGithubIssue },
    Update { repo: String, number: i64, update: GithubIssueUpdate },
    Transfer { repo: String, number: i64, new_repo: String },
    TokenScopes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedmineCall {
    Create(NewRedmineIssue),
    Update { id: i64, update: RedmineIssueUpdate },
}

/// GitHub fake that records every call. Numbers start at 1.
#[derive(Debug, Default)]
pub struct FakeGithub {
    calls: Mutex<Vec<GithubCall>>,
    next_number: AtomicI64,
    fail_status: Mutex<Option<u16>>,
    transfer_status: Mutex<Option<u16>>,
}

impl FakeGithub {
    pub fn calls(&self) -> Vec<GithubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_next_number(&self, number: i64) {
        self.next_number.store(number - 1, Ordering::SeqCst);
    }

    /// Fail every issue call with this status.
    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    /// Fail only transfers with this status.
    pub fn fail_transfer_with(&self, status: u16) {
        *self.transfer_status.lock().unwrap() = Some(status);
    }

    fn record(&self, call: GithubCall) -> Result<(), TrackerError> {
        self.calls.lock().unwrap().push(call);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(TrackerError::from_status(status, "fake failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GithubApi for FakeGithub {
    async fn create_issue(&self, repo: &str, issue: &NewGithubIssue) -> Result<i64, TrackerError> {
        self.record(GithubCall::Create {
            repo: repo.to_string(),
            issue: issue.clone(),
        })?;
        Ok(self.next_number.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn update_issue(
        &self,
        repo: &str,
        number: i64,
        update: &GithubIssueUpdate,
    ) -> Result<(), TrackerError> {
        self.record(GithubCall::Update {
            repo: repo.to_string(),
            number,
            update: update.clone(),
        })
    }

    async fn transfer_issue(
        &self,
        repo: &str,
        number: i64,
        new_repo: &str,
    ) -> Result<(), TrackerError> {
        self.record(GithubCall::Transfer {
            repo: repo.to_string(),
            number,
            new_repo: new_repo.to_string(),
        })?;
        match *self.transfer_status.lock().unwrap() {
            Some(status) => Err(TrackerError::from_status(status, "transfer refused")),
            None => Ok(()),
        }
    }

    async fn token_scopes(&self) -> Result<TokenScopes, TrackerError> {
        self.calls.lock().unwrap().push(GithubCall::TokenScopes);
        Ok(TokenScopes {
            status: 200,
            scopes: Some("repo".to_string()),
        })
    }
}

/// Redmine fake that records every call. Ids start at 1.
#[derive(Debug, Default)]
pub struct FakeRedmine {
    calls: Mutex<Vec<RedmineCall>>,
    next_id: AtomicI64,
    fail_status: Mutex<Option<u16>>,
}

impl FakeRedmine {
    pub fn calls(&self) -> Vec<RedmineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_next_id(&self, id: i64) {
        self.next_id.store(id - 1, Ordering::SeqCst);
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    fn record(&self, call: RedmineCall) -> Result<(), TrackerError> {
        self.calls.lock().unwrap().push(call);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(TrackerError::from_status(status, "fake failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RedmineApi for FakeRedmine {
    async fn create_issue(&self, issue: &NewRedmineIssue) -> Result<i64, TrackerError> {
        self.record(RedmineCall::Create(issue.clone()))?;
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn update_issue(&self, id: i64, update: &RedmineIssueUpdate) -> Result<(), TrackerError> {
        self.record(RedmineCall::Update {
            id,
            update: update.clone(),
        })
    }
}
