use std::sync::Arc;

use humor_core::caption::{CaptionItem, CaptionRepository};
use humor_core::config::DEFAULT_SAMPLE_SIZE;
use humor_core::error::Result;
use humor_core::session::{AuthCallback, Session, SessionChange, SessionProvider, SignInFlow};
use humor_core::vote::{VoteRecord, VoteRepository, VoteTally, VoteValue};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, watch};

use super::listener::SessionListener;
use super::sampler::sample_without_replacement;
use super::state::{IgnoredReason, VoteOutcome, VotingState};

/// Drives one user's voting session.
///
/// `VotingController` is responsible for:
/// - Gating content behind an authenticated session
/// - Loading and sampling the working set once per session
/// - Recording each vote exactly once and advancing the cursor
/// - Reacting to session-change notifications (notification wins)
///
/// Every session change bumps an internal epoch. Loads, session checks and
/// vote writes remember the epoch they started in and their results are
/// dropped if it moved while they were awaiting.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct VotingController {
    sessions: Arc<dyn SessionProvider>,
    captions: Arc<dyn CaptionRepository>,
    votes: Arc<dyn VoteRepository>,
    sample_size: usize,
    inner: Arc<Mutex<ControllerInner>>,
    state_tx: Arc<watch::Sender<VotingState>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Unauthenticated,
    Loading,
    Error(String),
    Voting,
    Complete,
}

struct WorkingSet {
    items: Vec<CaptionItem>,
    cursor: usize,
    tally: VoteTally,
}

impl WorkingSet {
    fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }
}

struct ControllerInner {
    phase: Phase,
    session: Option<Session>,
    working_set: Option<WorkingSet>,
    epoch: u64,
    /// Epoch of the caption load currently awaiting the store.
    load_in_flight: Option<u64>,
    vote_in_flight: bool,
    rng: StdRng,
}

impl ControllerInner {
    fn new(rng: StdRng) -> Self {
        Self {
            phase: Phase::Unauthenticated,
            session: None,
            working_set: None,
            epoch: 0,
            load_in_flight: None,
            vote_in_flight: false,
            rng,
        }
    }

    /// Drops the session and everything derived from it.
    fn reset(&mut self, phase: Phase) {
        self.epoch += 1;
        self.phase = phase;
        self.session = None;
        self.working_set = None;
        self.load_in_flight = None;
        self.vote_in_flight = false;
    }

    /// Enters `Loading` for `session` and returns the epoch the load belongs to.
    fn begin_load(&mut self, session: Session) -> u64 {
        self.epoch += 1;
        self.phase = Phase::Loading;
        self.session = Some(session);
        self.working_set = None;
        self.vote_in_flight = false;
        self.load_in_flight = Some(self.epoch);
        self.epoch
    }

    fn snapshot(&self) -> VotingState {
        let user = match (&self.phase, &self.session) {
            (Phase::Unauthenticated, _) => return VotingState::Unauthenticated,
            (Phase::Error(message), _) => {
                return VotingState::Error {
                    message: message.clone(),
                };
            }
            (_, Some(user)) => user.clone(),
            // A working set never outlives its session.
            (_, None) => return VotingState::Unauthenticated,
        };

        match (&self.phase, &self.working_set) {
            (Phase::Voting, Some(set)) if !set.is_exhausted() => VotingState::Voting {
                user,
                current: set.items[set.cursor].clone(),
                position: set.cursor,
                total: set.items.len(),
                tally: set.tally,
                vote_pending: self.vote_in_flight,
            },
            (Phase::Voting | Phase::Complete, Some(set)) => VotingState::Complete {
                user,
                total: set.items.len(),
                tally: set.tally,
            },
            _ => VotingState::Loading { user },
        }
    }
}

impl VotingController {
    /// Creates a controller over the given collaborators.
    ///
    /// The controller starts `Unauthenticated`; call [`start`](Self::start)
    /// to run the initial session check and [`attach`](Self::attach) to follow
    /// session changes.
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        captions: Arc<dyn CaptionRepository>,
        votes: Arc<dyn VoteRepository>,
    ) -> Self {
        let (state_tx, _) = watch::channel(VotingState::Unauthenticated);
        Self {
            sessions,
            captions,
            votes,
            sample_size: DEFAULT_SAMPLE_SIZE,
            inner: Arc::new(Mutex::new(ControllerInner::new(StdRng::from_entropy()))),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Overrides the working set size (at least 1).
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Uses a deterministic random source for sampling.
    ///
    /// Must be called before the controller is cloned or started.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.inner = Arc::new(Mutex::new(ControllerInner::new(StdRng::seed_from_u64(seed))));
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> VotingState {
        self.inner.lock().await.snapshot()
    }

    /// Returns a receiver that observes every state transition.
    pub fn watch(&self) -> watch::Receiver<VotingState> {
        self.state_tx.subscribe()
    }

    /// Subscribes to the provider's session changes for as long as the
    /// returned listener lives.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach(&self) -> SessionListener {
        SessionListener::spawn(self.clone(), self.sessions.subscribe())
    }

    /// Runs the initial session check and, when a session exists, loads the
    /// working set.
    ///
    /// Suppressed while a load for the current session is still in flight,
    /// and while a working set is held (voting or complete): only a
    /// session-change notification replaces it.
    pub async fn start(&self) -> VotingState {
        let epoch = {
            let mut inner = self.inner.lock().await;
            if inner.load_in_flight == Some(inner.epoch) {
                tracing::debug!(epoch = inner.epoch, "Session check suppressed: load in flight");
                return inner.snapshot();
            }
            if inner.session.is_some() && matches!(inner.phase, Phase::Voting | Phase::Complete) {
                tracing::debug!(epoch = inner.epoch, "Session check skipped: working set active");
                return inner.snapshot();
            }
            inner.epoch += 1;
            inner.epoch
        };

        let lookup = self.sessions.current_session().await;

        let load_epoch = {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                tracing::debug!(epoch, "Discarding session check superseded by a session change");
                return inner.snapshot();
            }

            match lookup {
                Err(e) => {
                    tracing::error!(error = %e, "Session check failed");
                    inner.reset(Phase::Error(e.message().to_string()));
                    self.publish(&inner);
                    return inner.snapshot();
                }
                Ok(None) => {
                    tracing::info!("No active session");
                    inner.reset(Phase::Unauthenticated);
                    self.publish(&inner);
                    return inner.snapshot();
                }
                Ok(Some(session)) => {
                    tracing::info!(user_id = %session.user_id, "Session found, loading captions");
                    let load_epoch = inner.begin_load(session);
                    self.publish(&inner);
                    load_epoch
                }
            }
        };

        self.load_working_set(load_epoch).await;
        self.state().await
    }

    /// Re-enters the machine from scratch after an error.
    pub async fn retry(&self) -> VotingState {
        tracing::info!("Retrying session check");
        self.start().await
    }

    /// Applies a session-change notification and, when it establishes a new
    /// session, waits for the working set to load.
    pub async fn handle_session_change(&self, change: SessionChange) -> VotingState {
        if let Some(epoch) = self.apply_session_change(change).await {
            self.load_working_set(epoch).await;
        }
        self.state().await
    }

    /// Applies a notification's transition without awaiting any I/O.
    ///
    /// Returns the epoch of a load the caller must run, if the notification
    /// established a session that needs a fresh working set.
    pub(crate) async fn apply_session_change(&self, change: SessionChange) -> Option<u64> {
        let mut inner = self.inner.lock().await;

        let Some(session) = change.session else {
            tracing::info!(event = %change.event, "Session ended");
            inner.reset(Phase::Unauthenticated);
            self.publish(&inner);
            return None;
        };

        let same_user = inner
            .session
            .as_ref()
            .is_some_and(|current| current.same_user(&session));

        if same_user {
            match inner.phase {
                Phase::Voting | Phase::Complete => {
                    tracing::debug!(event = %change.event, "Session unchanged, keeping working set");
                    inner.session = Some(session);
                    self.publish(&inner);
                    return None;
                }
                Phase::Loading if inner.load_in_flight == Some(inner.epoch) => {
                    tracing::debug!(event = %change.event, "Load already in flight for this session");
                    inner.session = Some(session);
                    return None;
                }
                _ => {}
            }
        }

        tracing::info!(event = %change.event, user_id = %session.user_id, "Session established");
        let epoch = inner.begin_load(session);
        self.publish(&inner);
        Some(epoch)
    }

    /// Fetches public captions and fixes the sampled working set for `epoch`.
    pub(crate) async fn load_working_set(&self, epoch: u64) {
        let result = self.captions.list_public_captions().await;

        let mut inner = self.inner.lock().await;
        if inner.load_in_flight == Some(epoch) {
            inner.load_in_flight = None;
        }
        if inner.epoch != epoch {
            tracing::debug!(epoch, current = inner.epoch, "Discarding stale caption load");
            return;
        }

        match result {
            Ok(pool) => {
                let pool_size = pool.len();
                let items = sample_without_replacement(pool, self.sample_size, &mut inner.rng);
                tracing::info!(pool_size, sampled = items.len(), "Working set loaded");
                let set = WorkingSet {
                    items,
                    cursor: 0,
                    tally: VoteTally::default(),
                };
                inner.phase = if set.is_exhausted() {
                    Phase::Complete
                } else {
                    Phase::Voting
                };
                inner.working_set = Some(set);
            }
            Err(e) => {
                tracing::error!(error = %e, "Caption load failed");
                inner.phase = Phase::Error(e.message().to_string());
                inner.working_set = None;
            }
        }
        self.publish(&inner);
    }

    /// Votes on the caption under the cursor.
    ///
    /// # Returns
    ///
    /// - `Ok(VoteOutcome::Recorded)`: one record inserted, cursor advanced
    /// - `Ok(VoteOutcome::Ignored)`: no session, nothing to vote on, or a
    ///   previous vote is still being written
    /// - `Ok(VoteOutcome::Discarded)`: the session changed during the write
    ///
    /// # Errors
    ///
    /// Returns the store error if the insert fails. The cursor does not move
    /// and the same caption stays current.
    pub async fn cast_vote(&self, value: VoteValue) -> Result<VoteOutcome> {
        let (epoch, record, position) = {
            let mut inner = self.inner.lock().await;

            let Some(profile_id) = inner.session.as_ref().map(|s| s.user_id.clone()) else {
                return Ok(ignored(IgnoredReason::NoSession));
            };
            match inner.phase {
                Phase::Voting => {}
                Phase::Complete => return Ok(ignored(IgnoredReason::Complete)),
                _ => return Ok(ignored(IgnoredReason::NotVoting)),
            }
            if inner.vote_in_flight {
                tracing::debug!("Vote ignored: previous vote still in flight");
                return Ok(ignored(IgnoredReason::VoteInFlight));
            }
            let Some(set) = inner.working_set.as_ref() else {
                return Ok(ignored(IgnoredReason::NotVoting));
            };
            if set.is_exhausted() {
                return Ok(ignored(IgnoredReason::Complete));
            }

            let position = set.cursor;
            let record = VoteRecord::new(value, profile_id, set.items[position].id.clone());
            inner.vote_in_flight = true;
            self.publish(&inner);
            (inner.epoch, record, position)
        };

        let result = self.votes.insert_vote(&record).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            tracing::debug!(caption_id = %record.caption_id, "Discarding vote result for superseded session");
            return Ok(VoteOutcome::Discarded);
        }
        inner.vote_in_flight = false;

        if let Err(e) = result {
            tracing::warn!(
                caption_id = %record.caption_id,
                cursor = position,
                error = %e,
                "Vote write failed"
            );
            self.publish(&inner);
            return Err(e);
        }

        let completed = match inner.working_set.as_mut() {
            Some(set) => {
                set.cursor += 1;
                set.tally.record(value);
                set.is_exhausted()
            }
            None => false,
        };
        if completed {
            inner.phase = Phase::Complete;
        }
        tracing::info!(
            caption_id = %record.caption_id,
            vote = %value,
            cursor = position + 1,
            completed,
            "Vote recorded"
        );
        self.publish(&inner);

        Ok(VoteOutcome::Recorded {
            caption_id: record.caption_id,
            position,
            completed,
        })
    }

    /// Starts a sign-in through the provider.
    ///
    /// A redirect flow leaves the state untouched; the session arrives later
    /// as a notification. A provider that signs in immediately moves the
    /// controller to `Loading` right away.
    pub async fn sign_in(&self) -> Result<SignInFlow> {
        let flow = self.sessions.sign_in().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Sign-in failed");
        })?;
        if let SignInFlow::Completed { session } = &flow {
            self.handle_session_change(SessionChange::signed_in(session.clone()))
                .await;
        }
        Ok(flow)
    }

    /// Completes an external sign-in and loads the new session's working set.
    pub async fn complete_sign_in(&self, callback: AuthCallback) -> Result<VotingState> {
        let session = self.sessions.complete_sign_in(callback).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Auth callback rejected");
        })?;
        Ok(self.handle_session_change(SessionChange::signed_in(session)).await)
    }

    /// Signs out and clears the working set.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the state is left unchanged in that case.
    pub async fn sign_out(&self) -> Result<()> {
        self.sessions.sign_out().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Sign-out failed");
        })?;
        self.handle_session_change(SessionChange::signed_out()).await;
        Ok(())
    }

    fn publish(&self, inner: &ControllerInner) {
        self.state_tx.send_replace(inner.snapshot());
    }
}

fn ignored(reason: IgnoredReason) -> VoteOutcome {
    VoteOutcome::Ignored { reason }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
