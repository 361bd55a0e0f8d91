//! The chain-sync session state machine.
//!
//! The session never touches the network. Its owner feeds it connection
//! events and inbound frames and sends whatever frames it hands back:
//!
//! ```text
//! Idle -> Connecting -> AwaitingIntersection -> RollingForward -> Done
//! ```
//!
//! Any failure moves straight to `Done`. The outcome is written once, on the
//! first transition into `Done`, and later frames are ignored.

use oracle_types::ChainPoint;
use tracing::{debug, trace};

use crate::protocol::{self, Reply};
use crate::VrfError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    AwaitingIntersection,
    /// Waiting for the answer to the `nextBlock` request tagged `outstanding`.
    RollingForward { outstanding: u64 },
    Done,
}

/// What the owner must do after feeding the session an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Write this frame to the connection.
    Send(String),
    /// The session reached `Done`; close the connection and collect the outcome.
    Finished,
    /// Nothing to do (frame arrived after `Done`).
    Ignored,
}

pub struct ChainSyncSession {
    anchor: ChainPoint,
    target: ChainPoint,
    step_budget: u64,
    phase: Phase,
    outcome: Option<Result<String, VrfError>>,
    next_block_requests: u64,
}

impl ChainSyncSession {
    /// A session that intersects at `anchor` and rolls forward until `target`.
    ///
    /// `step_budget` bounds the roll-forward: the first `nextBlock` carries it
    /// as its id and every further request decrements it. Reaching zero
    /// without seeing the target ends the session.
    pub fn new(anchor: ChainPoint, target: ChainPoint, step_budget: u64) -> Self {
        Self {
            anchor,
            target,
            step_budget,
            phase: Phase::Idle,
            outcome: None,
            next_block_requests: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn target(&self) -> &ChainPoint {
        &self.target
    }

    /// Number of `nextBlock` requests handed out so far.
    pub fn next_block_requests(&self) -> u64 {
        self.next_block_requests
    }

    /// Idle -> Connecting.
    pub fn begin_connect(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Connecting;
        }
    }

    /// The connection is open: Connecting -> AwaitingIntersection.
    pub fn on_open(&mut self) -> Step {
        match self.phase {
            Phase::Connecting => {
                self.phase = Phase::AwaitingIntersection;
                debug!(anchor = %self.anchor, "requesting intersection");
                Step::Send(protocol::find_intersection(std::slice::from_ref(&self.anchor)))
            }
            Phase::Done => Step::Ignored,
            _ => self.fail(VrfError::Protocol(format!(
                "connection opened in phase {:?}",
                self.phase
            ))),
        }
    }

    /// Feed one inbound text frame.
    pub fn on_frame(&mut self, text: &str) -> Step {
        if self.is_done() {
            trace!("frame after session end ignored");
            return Step::Ignored;
        }
        match protocol::parse_reply(text) {
            Ok(reply) => self.on_reply(reply),
            Err(e) => self.fail(e),
        }
    }

    /// The transport failed or closed underneath the session.
    pub fn on_transport_error(&mut self, err: VrfError) -> Step {
        if self.is_done() {
            return Step::Ignored;
        }
        self.fail(err)
    }

    /// Collect the outcome. Returns `None` before `Done` and on every call
    /// after the first.
    pub fn take_outcome(&mut self) -> Option<Result<String, VrfError>> {
        self.outcome.take()
    }

    fn on_reply(&mut self, reply: Reply) -> Step {
        match (self.phase.clone(), reply) {
            (Phase::AwaitingIntersection, Reply::Intersection { found: false }) => {
                self.fail(VrfError::PointNotFound(self.anchor.clone()))
            }
            (Phase::AwaitingIntersection, Reply::Intersection { found: true }) => {
                self.request_next(self.step_budget)
            }
            (Phase::RollingForward { outstanding }, Reply::NextBlock { id, envelope }) => {
                if id != outstanding {
                    return self.fail(VrfError::Protocol(format!(
                        "nextBlock reply tagged {id}, expected {outstanding}"
                    )));
                }
                if let Some(block) = envelope.forward_onto(&self.target) {
                    return match block.vrf_output() {
                        Some(output) => {
                            let output = output.to_string();
                            self.resolve(Ok(output))
                        }
                        None => self.fail(VrfError::Protocol(format!(
                            "block {} carries no VRF output",
                            self.target
                        ))),
                    };
                }
                trace!(id, direction = ?envelope.direction, "intermediate step");
                if id > 0 {
                    self.request_next(id - 1)
                } else {
                    self.fail(VrfError::StepBudgetExceeded {
                        target: self.target.clone(),
                        budget: self.step_budget,
                    })
                }
            }
            (phase, reply) => {
                let msg = format!("unexpected reply {reply:?} in phase {phase:?}");
                self.fail(VrfError::Protocol(msg))
            }
        }
    }

    fn request_next(&mut self, id: u64) -> Step {
        self.phase = Phase::RollingForward { outstanding: id };
        self.next_block_requests += 1;
        Step::Send(protocol::next_block(id))
    }

    fn fail(&mut self, err: VrfError) -> Step {
        debug!(error = %err, "chain-sync session failed");
        self.resolve(Err(err))
    }

    fn resolve(&mut self, outcome: Result<String, VrfError>) -> Step {
        if self.is_done() {
            return Step::Ignored;
        }
        self.phase = Phase::Done;
        self.outcome = Some(outcome);
        Step::Finished
    }
}
