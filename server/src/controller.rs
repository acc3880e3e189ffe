//! Session orchestration: the shared session handle and the round loop
//!
//! Three kinds of task touch a game: the datagram receiver, the admin console and
//! the controller loop. They only meet in [`SessionHandle`], which keeps the whole
//! session behind one lock and exposes two signals:
//!
//! - `started`, fired once when the lobby closes (full lobby or manual start)
//! - `sealed`, fired whenever a submission completes the active round
//!
//! Waiters register for a signal before checking their condition under the lock,
//! so a signal fired between the check and the wait is never lost. Every wake-up
//! re-checks the condition.

use crate::broadcast::Broadcaster;
use crate::dictionary::WordValidator;
use crate::network::Outbox;
use crate::registry::{Joined, PeerId};
use crate::round::SubmitOutcome;
use crate::session::{GameSummary, Phase, Session, SessionError};
use log::info;
use shared::{RejectReason, ServerMessage};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock, RwLockReadGuard};

pub struct SessionHandle {
    session: RwLock<Session>,
    started: Notify,
    sealed: Notify,
}

impl SessionHandle {
    pub fn new(session: Session) -> Arc<Self> {
        Arc::new(Self {
            session: RwLock::new(session),
            started: Notify::new(),
            sealed: Notify::new(),
        })
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().await
    }

    /// Handles a join request and queues the reply before the lock is released,
    /// so the last joiner hears `JOIN_OK` ahead of the first round announcement.
    pub async fn join(
        &self,
        peer: PeerId,
        name: &str,
        outbox: &Outbox,
    ) -> Result<Joined, RejectReason> {
        let (result, started) = {
            let mut session = self.session.write().await;
            let was_lobby = !session.has_started();
            let result = session.try_join(peer, name);

            match &result {
                Ok(_) => outbox.send(
                    peer,
                    &ServerMessage::JoinOk {
                        name: name.to_string(),
                    },
                ),
                Err(reason) => outbox.send(peer, &ServerMessage::JoinReject { reason: *reason }),
            }

            let started = was_lobby && session.has_started();
            if started {
                Broadcaster::new(outbox.clone()).announce_active_round(&session);
            }
            (result, started)
        };

        if started {
            self.started.notify_waiters();
        }
        result
    }

    /// Records a word for the active round and acknowledges it.
    pub async fn submit(&self, peer: PeerId, word: &str, outbox: &Outbox) -> SubmitOutcome {
        let outcome = {
            let mut session = self.session.write().await;
            let outcome = session.try_submit(peer, word);
            if let SubmitOutcome::Accepted { round, .. } = outcome {
                outbox.send(peer, &ServerMessage::Received { round });
            }
            outcome
        };

        if let SubmitOutcome::Accepted { round, sealed: true } = outcome {
            info!("All submissions in for round {}", round);
            self.sealed.notify_waiters();
        }
        outcome
    }

    /// Starts the game from the lobby. Returns false if nothing changed.
    pub async fn manual_start(&self, outbox: &Outbox) -> bool {
        let started = {
            let mut session = self.session.write().await;
            let started = session.manual_start();
            if started {
                Broadcaster::new(outbox.clone()).announce_active_round(&session);
            }
            started
        };
        if started {
            self.started.notify_waiters();
        }
        started
    }

    pub async fn has_started(&self) -> bool {
        self.session.read().await.has_started()
    }

    /// Resolves once the session has left the lobby.
    pub async fn wait_for_start(&self) {
        loop {
            let notified = self.started.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.session.read().await.has_started() {
                return;
            }
            notified.await;
        }
    }

    /// Resolves once `round` has a submission from every player counted at its start.
    pub async fn wait_for_seal(&self, round: u32) {
        loop {
            let notified = self.sealed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let sealed = self
                .session
                .read()
                .await
                .round(round)
                .is_some_and(|r| r.is_sealed());
            if sealed {
                return;
            }
            notified.await;
        }
    }
}

/// Drives a session from the lobby to the final result.
pub struct SessionController {
    handle: Arc<SessionHandle>,
    broadcaster: Broadcaster,
    validator: WordValidator,
}

impl SessionController {
    pub fn new(
        handle: Arc<SessionHandle>,
        broadcaster: Broadcaster,
        validator: WordValidator,
    ) -> Self {
        Self {
            handle,
            broadcaster,
            validator,
        }
    }

    pub async fn run(self) -> Result<GameSummary, SessionError> {
        info!("Waiting for players to join");
        self.handle.wait_for_start().await;
        let mut round = self.handle.read().await.current_round();

        loop {
            self.handle.wait_for_seal(round).await;

            // Opening the next round and queueing its announcement share one lock
            let phase = {
                let mut session = self.handle.session.write().await;
                let standings = session.score_active_round(&self.validator)?;
                self.broadcaster
                    .round_over(session.registry(), round, standings);
                let phase = session.advance()?;
                self.broadcaster.announce_active_round(&session);
                phase
            };

            match phase {
                Phase::RoundActive(next) => round = next,
                _ => break,
            }
        }

        let session = self.handle.read().await;
        let result = session.final_result();
        info!("Game finished: {}", result.to_message());
        self.broadcaster.final_result(session.registry(), &result);

        Ok(session.summary())
    }
}
