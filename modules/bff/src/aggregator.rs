//! Session-details aggregation
//!
//! The session lookup is primary: without it there is nothing to show, so any
//! failure there ends the request. The coach profile is secondary: a missing
//! or unreachable profile degrades to a placeholder holding only the coach id.
//!
//! Each upstream call runs in its own task bounded by the per-call timeout.
//! Dropping the request future (client went away) aborts whatever call is
//! still in flight.

use failure_policy::{classify, CallRole, Disposition, Failure};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use crate::avatar::AvatarRewriter;
use crate::error::AggregateError;
use crate::models::{CoachProfileData, SessionDetailsResponse};
use crate::upstream::{ProfileSource, SessionSource};

pub struct SessionDetailsAggregator {
    sessions: Arc<dyn SessionSource>,
    profiles: Arc<dyn ProfileSource>,
    call_timeout: Duration,
    avatars: AvatarRewriter,
}

impl SessionDetailsAggregator {
    pub fn new(
        sessions: Arc<dyn SessionSource>,
        profiles: Arc<dyn ProfileSource>,
        call_timeout: Duration,
        avatars: AvatarRewriter,
    ) -> Self {
        Self {
            sessions,
            profiles,
            call_timeout,
            avatars,
        }
    }

    pub async fn get_composite_view(
        &self,
        session_id: &str,
    ) -> Result<SessionDetailsResponse, AggregateError> {
        let session_id = Uuid::parse_str(session_id).map_err(|_| AggregateError::InvalidId)?;

        let sessions = self.sessions.clone();
        let session = run_bounded(self.call_timeout, async move {
            sessions.get_session(session_id).await
        })
        .await
        .map_err(|failure| {
            if failure.is_not_found() {
                return AggregateError::NotFound;
            }
            tracing::error!(
                session_id = %session_id,
                error = %failure,
                "Session lookup failed"
            );
            AggregateError::ServiceUnavailable("session service unavailable".to_string())
        })?;

        let coach_id = session.coach_id;
        let profiles = self.profiles.clone();
        let profile = run_bounded(self.call_timeout, async move {
            profiles.get_profile(coach_id).await
        })
        .await;

        let mut coach = match profile {
            Ok(coach) => coach,
            Err(failure) => self.degrade_profile(coach_id, failure)?,
        };

        coach.avatar_url = coach.avatar_url.map(|url| self.avatars.rewrite(&url));

        Ok(SessionDetailsResponse::compose(session, coach))
    }

    fn degrade_profile(
        &self,
        coach_id: Uuid,
        failure: Failure,
    ) -> Result<CoachProfileData, AggregateError> {
        match classify(&failure, CallRole::Secondary) {
            Disposition::Degradable => {
                tracing::warn!(
                    coach_id = %coach_id,
                    error = %failure,
                    "Coach profile unavailable, using placeholder"
                );
                Ok(CoachProfileData::placeholder(coach_id))
            }
            Disposition::Fatal | Disposition::Retryable => {
                tracing::error!(
                    coach_id = %coach_id,
                    error = %failure,
                    "Coach profile lookup refused"
                );
                Err(AggregateError::ServiceUnavailable(
                    "user service unavailable".to_string(),
                ))
            }
        }
    }
}

/// Run one upstream call as its own task, bounded by `limit`
async fn run_bounded<T, F>(limit: Duration, call: F) -> Result<T, Failure>
where
    F: Future<Output = Result<T, Failure>> + Send + 'static,
    T: Send + 'static,
{
    let task = AbortOnDrop(tokio::spawn(call));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(Failure::Downstream(format!(
            "upstream task failed: {}",
            join_err
        ))),
        Err(_) => Err(Failure::Timeout(limit)),
    }
}

/// Join handle that aborts its task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
