//! Preview pipeline: cancellable, time-bounded background rendering with a result slot
//! that only the newest generation may write.
//!
//! Every `generate` call bumps the generation counter and cancels the previous token.
//! The job, its timeout and the commit run in a spawned task, so the slot always leaves
//! `Generating` even if the caller stops waiting. A caller that goes away cancels its
//! token and the slot falls back to `Idle`. A finished job commits only if its generation
//! is still current; anything else is reported as `Superseded` and leaves the slot
//! untouched. A timeout commits `TimedOut`, which is distinct from `Failed`. Nothing retries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::layout::{CancelToken, TemplateId};
use crate::render::{render_pdf, RenderError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("preview generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("preview generation failed: {0}")]
    Failed(String),

    #[error("preview generation was superseded")]
    Superseded,
}

#[derive(Debug, Clone)]
pub enum PreviewState {
    Idle,
    Generating { generation: u64 },
    Ready { generation: u64, pdf: Bytes },
    Failed { generation: u64, message: String },
    TimedOut { generation: u64 },
}

/// JSON view of a `PreviewState`, without the PDF bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewStatus {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl PreviewState {
    pub fn status(&self) -> PreviewStatus {
        let (state, generation, error, size) = match self {
            PreviewState::Idle => ("idle", None, None, None),
            PreviewState::Generating { generation } => ("generating", Some(*generation), None, None),
            PreviewState::Ready { generation, pdf } => ("ready", Some(*generation), None, Some(pdf.len())),
            PreviewState::Failed { generation, message } => {
                ("failed", Some(*generation), Some(message.clone()), None)
            }
            PreviewState::TimedOut { generation } => ("timed_out", Some(*generation), None, None),
        };
        PreviewStatus {
            state,
            generation,
            error,
            size,
        }
    }
}

struct Slot {
    generation: u64,
    in_flight: Option<CancelToken>,
    state: PreviewState,
}

/// Cancels a generation's token when the awaiting caller is dropped before it finishes.
struct CancelOnDrop(Option<CancelToken>);

impl CancelOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.0.take() {
            token.cancel();
        }
    }
}

pub struct PreviewPipeline {
    slot: Arc<Mutex<Slot>>,
    timeout: Duration,
}

impl PreviewPipeline {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                in_flight: None,
                state: PreviewState::Idle,
            })),
            timeout,
        }
    }

    pub async fn state(&self) -> PreviewState {
        self.slot.lock().await.state.clone()
    }

    /// Renders `text` with `template` and commits the PDF if still current.
    pub async fn generate(&self, text: String, template: TemplateId) -> Result<Bytes, PreviewError> {
        self.generate_with(move |cancel| render_pdf(&text, template, cancel)).await
    }

    /// Runs an arbitrary blocking job under the pipeline's generation and timeout rules.
    pub async fn generate_with<F>(&self, job: F) -> Result<Bytes, PreviewError>
    where
        F: FnOnce(&CancelToken) -> Result<Vec<u8>, RenderError> + Send + 'static,
    {
        let (generation, token) = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            if let Some(previous) = slot.in_flight.take() {
                previous.cancel();
            }
            let token = CancelToken::new();
            slot.in_flight = Some(token.clone());
            slot.state = PreviewState::Generating {
                generation: slot.generation,
            };
            (slot.generation, token)
        };
        debug!("Preview generation {generation} started");

        let guard = CancelOnDrop(Some(token.clone()));
        let slot = Arc::clone(&self.slot);
        let limit = self.timeout;
        let task = tokio::spawn(async move {
            let worker = token.clone();
            let handle = tokio::task::spawn_blocking(move || job(&worker));
            let outcome = match tokio::time::timeout(limit, handle).await {
                Err(_) => {
                    token.cancel();
                    warn!("Preview generation {generation} timed out after {limit:?}");
                    Err(PreviewError::TimedOut(limit))
                }
                Ok(Err(join_err)) => Err(PreviewError::Failed(join_err.to_string())),
                Ok(Ok(Err(RenderError::Cancelled))) => Err(PreviewError::Superseded),
                Ok(Ok(Err(err))) => Err(PreviewError::Failed(err.to_string())),
                Ok(Ok(Ok(bytes))) => Ok(Bytes::from(bytes)),
            };
            commit(&slot, generation, &token, outcome).await
        });

        let result = task
            .await
            .unwrap_or_else(|join_err| Err(PreviewError::Failed(join_err.to_string())));
        guard.disarm();
        result
    }

    /// Cancels the in-flight job, invalidates its generation and drops any held PDF.
    pub async fn abort(&self) {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        if let Some(token) = slot.in_flight.take() {
            token.cancel();
        }
        slot.state = PreviewState::Idle;
    }
}

async fn commit(
    slot: &Mutex<Slot>,
    generation: u64,
    token: &CancelToken,
    outcome: Result<Bytes, PreviewError>,
) -> Result<Bytes, PreviewError> {
    let mut slot = slot.lock().await;
    if slot.generation != generation {
        debug!("Preview generation {generation} superseded by {}", slot.generation);
        return Err(PreviewError::Superseded);
    }

    slot.in_flight = None;
    let timed_out = matches!(outcome, Err(PreviewError::TimedOut(_)));
    if !timed_out && (token.is_cancelled() || outcome == Err(PreviewError::Superseded)) {
        // Still current but cancelled: the caller went away.
        debug!("Preview generation {generation} abandoned");
        slot.state = PreviewState::Idle;
        return Err(PreviewError::Superseded);
    }

    slot.state = match &outcome {
        Ok(pdf) => PreviewState::Ready {
            generation,
            pdf: pdf.clone(),
        },
        Err(PreviewError::TimedOut(_)) => PreviewState::TimedOut { generation },
        Err(err) => PreviewState::Failed {
            generation,
            message: err.to_string(),
        },
    };
    if let Ok(pdf) = &outcome {
        info!("Preview generation {generation} ready ({} bytes)", pdf.len());
    }
    outcome
}

struct Session {
    pipeline: Arc<PreviewPipeline>,
    last_used: Instant,
}

/// Preview pipelines keyed by a client-chosen session id.
///
/// Sessions idle longer than the TTL are swept by `cleanup_expired`; creating a session
/// past `max_sessions` evicts the least recently used one.
#[derive(Clone)]
pub struct PreviewRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    timeout: Duration,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl PreviewRegistry {
    pub fn from_config(config: &Config) -> Self {
        Self::with_limits(
            config.preview_timeout,
            config.preview_idle_ttl,
            config.preview_max_sessions,
        )
    }

    /// `max_sessions` of 0 disables the cap.
    pub fn with_limits(timeout: Duration, idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout,
            idle_ttl,
            max_sessions,
        }
    }

    /// Returns the session's pipeline, creating it on first use.
    pub async fn session(&self, id: Uuid) -> Arc<PreviewPipeline> {
        let (pipeline, evicted) = {
            let mut sessions = self.sessions.write().await;
            let now = Instant::now();
            if let Some(session) = sessions.get_mut(&id) {
                session.last_used = now;
                return session.pipeline.clone();
            }

            let evicted = if self.max_sessions > 0 && sessions.len() >= self.max_sessions {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, session)| session.last_used)
                    .map(|(oldest, _)| *oldest);
                oldest.and_then(|oldest| sessions.remove(&oldest).map(|s| (oldest, s.pipeline)))
            } else {
                None
            };

            let pipeline = Arc::new(PreviewPipeline::new(self.timeout));
            sessions.insert(
                id,
                Session {
                    pipeline: pipeline.clone(),
                    last_used: now,
                },
            );
            (pipeline, evicted)
        };

        if let Some((oldest, stale)) = evicted {
            info!(session_id = %oldest, "Evicted least recently used preview session");
            stale.abort().await;
        }
        pipeline
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<PreviewPipeline>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_used = Instant::now();
        Some(session.pipeline.clone())
    }

    /// Aborts and forgets a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.pipeline.abort().await;
                true
            }
            None => false,
        }
    }

    /// Drops sessions idle longer than the TTL.
    ///
    /// Returns the number of sessions cleaned up
    pub async fn cleanup_expired(&self) -> usize {
        let expired: Vec<(Uuid, Arc<PreviewPipeline>)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| session.last_used.elapsed() > self.idle_ttl)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|s| (id, s.pipeline)))
                .collect()
        };

        for (id, pipeline) in &expired {
            pipeline.abort().await;
            debug!(session_id = %id, "Cleaned up idle preview session");
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Cleaned up idle preview sessions");
        }
        expired.len()
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn slow_cooperative(cancel: &CancelToken) -> Result<Vec<u8>, RenderError> {
        for _ in 0..400 {
            if cancel.is_cancelled() {
                return Err(RenderError::Cancelled);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(b"slow".to_vec())
    }

    #[tokio::test]
    async fn test_generate_commits_ready_pdf() {
        let pipeline = PreviewPipeline::new(Duration::from_secs(10));
        let pdf = pipeline
            .generate("Jane Doe\nEXPERIENCE".to_string(), TemplateId::Modern)
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        match pipeline.state().await {
            PreviewState::Ready { generation, pdf: held } => {
                assert_eq!(generation, 1);
                assert_eq!(held, pdf);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_from_failure() {
        let pipeline = PreviewPipeline::new(Duration::from_millis(100));
        let result = pipeline.generate_with(slow_cooperative).await;
        assert_eq!(result, Err(PreviewError::TimedOut(Duration::from_millis(100))));
        assert!(matches!(pipeline.state().await, PreviewState::TimedOut { generation: 1 }));
        assert_eq!(pipeline.state().await.status().state, "timed_out");
    }

    #[tokio::test]
    async fn test_failure_state_keeps_message() {
        let pipeline = PreviewPipeline::new(Duration::from_secs(5));
        let result = pipeline
            .generate_with(|_| Err(RenderError::Task("boom".into())))
            .await;
        assert!(matches!(result, Err(PreviewError::Failed(_))));
        let status = pipeline.state().await.status();
        assert_eq!(status.state, "failed");
        assert!(status.error.unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_stale_result_never_overwrites_newer_one() {
        let pipeline = Arc::new(PreviewPipeline::new(Duration::from_secs(5)));

        // Job A ignores its token and finishes late.
        let p = pipeline.clone();
        let a = tokio::spawn(async move {
            p.generate_with(|_| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(b"A".to_vec())
            })
            .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        pipeline.abort().await;

        let b = pipeline.generate_with(|_| Ok(b"B".to_vec())).await.unwrap();
        assert_eq!(&b[..], b"B");

        assert_eq!(a.await.unwrap(), Err(PreviewError::Superseded));
        match pipeline.state().await {
            PreviewState::Ready { pdf, .. } => assert_eq!(&pdf[..], b"B"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_generation_cancels_previous() {
        let pipeline = Arc::new(PreviewPipeline::new(Duration::from_secs(5)));
        let p = pipeline.clone();
        let first = tokio::spawn(async move { p.generate_with(slow_cooperative).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = pipeline.generate_with(|_| Ok(b"second".to_vec())).await;
        assert!(second.is_ok());
        assert_eq!(first.await.unwrap(), Err(PreviewError::Superseded));
        assert!(matches!(pipeline.state().await, PreviewState::Ready { generation: 2, .. }));
    }

    #[tokio::test]
    async fn test_abort_releases_result() {
        let pipeline = PreviewPipeline::new(Duration::from_secs(5));
        pipeline.generate_with(|_| Ok(b"x".to_vec())).await.unwrap();
        pipeline.abort().await;
        assert!(matches!(pipeline.state().await, PreviewState::Idle));
    }

    async fn wait_for_state(pipeline: &PreviewPipeline, want: &str) -> PreviewStatus {
        for _ in 0..100 {
            let status = pipeline.state().await.status();
            if status.state == want {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        pipeline.state().await.status()
    }

    #[tokio::test]
    async fn test_dropped_caller_cancels_job_and_releases_slot() {
        let pipeline = PreviewPipeline::new(Duration::from_secs(5));
        let observed = Arc::new(AtomicBool::new(false));
        let seen = observed.clone();
        let waiting = pipeline.generate_with(move |cancel| {
            let result = slow_cooperative(cancel);
            seen.store(cancel.is_cancelled(), Ordering::SeqCst);
            result
        });
        assert!(tokio::time::timeout(Duration::from_millis(20), waiting).await.is_err());

        let status = wait_for_state(&pipeline, "idle").await;
        assert_eq!(status.state, "idle");
        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropped_caller_with_stubborn_job_still_times_out() {
        let pipeline = PreviewPipeline::new(Duration::from_millis(100));
        let waiting = pipeline.generate_with(|_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(b"late".to_vec())
        });
        assert!(tokio::time::timeout(Duration::from_millis(20), waiting).await.is_err());

        let status = wait_for_state(&pipeline, "timed_out").await;
        assert_eq!(status.state, "timed_out");
        assert_eq!(status.generation, Some(1));
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let registry = PreviewRegistry::with_limits(Duration::from_secs(5), Duration::from_millis(50), 0);
        let (a, b, kept) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for id in [a, b, kept] {
            let pipeline = registry.session(id).await;
            pipeline.generate_with(|_| Ok(vec![0; 1024])).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
        registry.session(kept).await;

        assert_eq!(registry.cleanup_expired().await, 2);
        assert!(registry.get(a).await.is_none());
        assert!(registry.get(b).await.is_none());
        assert!(registry.get(kept).await.is_some());
    }

    #[tokio::test]
    async fn test_session_cap_evicts_least_recently_used() {
        let registry = PreviewRegistry::with_limits(Duration::from_secs(5), Duration::from_secs(3600), 2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let first = registry.session(a).await;
        first.generate_with(|_| Ok(b"a".to_vec())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.session(b).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.get(a).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.session(c).await;

        assert!(registry.get(a).await.is_some());
        assert!(registry.get(b).await.is_none());
        assert!(registry.get(c).await.is_some());
    }

    #[tokio::test]
    async fn test_cleanup_task_sweeps_in_background() {
        let registry = PreviewRegistry::with_limits(Duration::from_secs(5), Duration::from_millis(30), 0);
        let id = Uuid::new_v4();
        let pipeline = registry.session(id).await;
        pipeline.generate_with(|_| Ok(vec![1; 1024])).await.unwrap();

        let task = registry.clone().start_cleanup_task(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        task.abort();

        assert!(registry.get(id).await.is_none());
        assert!(matches!(pipeline.state().await, PreviewState::Idle));
    }

    #[tokio::test]
    async fn test_registry_reuses_and_removes_sessions() {
        let registry = PreviewRegistry::from_config(&Config::for_tests());
        let id = Uuid::new_v4();
        assert!(registry.get(id).await.is_none());
        let a = registry.session(id).await;
        let b = registry.session(id).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
    }
}
