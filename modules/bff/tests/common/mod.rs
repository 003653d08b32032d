//! Scripted upstream sources shared by the gateway tests

#![allow(dead_code)]

use async_trait::async_trait;
use bff_rs::avatar::AvatarRewriter;
use bff_rs::models::{CoachProfileData, SessionData};
use bff_rs::upstream::{ProfileSource, SessionSource};
use bff_rs::SessionDetailsAggregator;
use chrono::{TimeZone, Utc};
use failure_policy::Failure;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// One scripted upstream answer
pub struct Script<T> {
    pub result: Result<T, Failure>,
    pub delay: Option<Duration>,
    pub calls: AtomicU32,
    /// Set when an in-flight call is dropped before it finished
    pub cancelled: Arc<AtomicBool>,
}

impl<T: Clone> Script<T> {
    pub fn ok(value: T) -> Arc<Self> {
        Self::with(Ok(value), None)
    }

    pub fn failing(failure: Failure) -> Arc<Self> {
        Self::with(Err(failure), None)
    }

    pub fn slow(value: T, delay: Duration) -> Arc<Self> {
        Self::with(Ok(value), Some(delay))
    }

    fn with(result: Result<T, Failure>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            result,
            delay,
            calls: AtomicU32::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn answer(&self) -> Result<T, Failure> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            let mut guard = CancelGuard {
                flag: self.cancelled.clone(),
                armed: true,
            };
            tokio::time::sleep(delay).await;
            guard.armed = false;
        }

        self.result.clone()
    }
}

struct CancelGuard {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

pub struct ScriptedSessions(pub Arc<Script<SessionData>>);

#[async_trait]
impl SessionSource for ScriptedSessions {
    async fn get_session(&self, _session_id: Uuid) -> Result<SessionData, Failure> {
        self.0.answer().await
    }
}

pub struct ScriptedProfiles(pub Arc<Script<CoachProfileData>>);

#[async_trait]
impl ProfileSource for ScriptedProfiles {
    async fn get_profile(&self, _user_id: Uuid) -> Result<CoachProfileData, Failure> {
        self.0.answer().await
    }
}

pub fn session(id: Uuid, coach_id: Uuid) -> SessionData {
    SessionData {
        id,
        coach_id,
        title: "Morning mobility".to_string(),
        description: "Hips and shoulders".to_string(),
        start_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap(),
        end_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),
        capacity: 12,
        created_at: Utc.with_ymd_and_hms(2026, 2, 20, 10, 0, 0).unwrap(),
    }
}

pub fn coach(id: Uuid) -> CoachProfileData {
    CoachProfileData {
        id,
        name: Some("Ayu Lestari".to_string()),
        avatar_url: Some("http://minio:9000/avatars/ayu.png".to_string()),
    }
}

pub fn aggregator(
    sessions: &Arc<Script<SessionData>>,
    profiles: &Arc<Script<CoachProfileData>>,
) -> SessionDetailsAggregator {
    SessionDetailsAggregator::new(
        Arc::new(ScriptedSessions(sessions.clone())),
        Arc::new(ScriptedProfiles(profiles.clone())),
        CALL_TIMEOUT,
        AvatarRewriter::new("http://minio:9000/", "https://api.example.com"),
    )
}
