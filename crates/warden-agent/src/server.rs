//! The agent server actor (C7).
//!
//! One [`AgentServer`] owns one cooperative tokio task that drains a single
//! mpsc mailbox in order -- every client request is processed to completion
//! before the next one is dequeued, which gives FIFO delivery and rules out
//! two activations running concurrently against the same agent. Long-running
//! work (an executor `run` call) is delegated to its own spawned task so the
//! actor loop stays free to receive messages while it is in flight --
//! notably, a `human_input` request surfacing from the sandbox worker, and
//! the `respond` that answers it.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_ast::{EvalError, HumanInput, Value};
use warden_core::{AgentDescriptor, Config, LlmTransport, ToolCatalog};
use warden_executor::{CancelReason, OutcomeValue, TerminalResult};

use crate::error::{AgentError, Result};
use crate::vault::Vault;

/// What a `start` call settles to.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    /// The activation ran to completion.
    Completed(OutcomeValue),
    /// The activation hit a cancellation boundary; this is terminal, not a
    /// suspension -- the client observes it directly and the context is
    /// discarded.
    Cancel(CancelReason),
}

/// A point-in-time snapshot of server state, for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Idle,
    /// A worker is running and is currently blocked on a `human_input` call.
    AwaitingInput,
    /// A worker is running, not currently blocked on human input.
    Running,
    Cancelled,
}

/// One `human_input(question, kind)` call blocked on a sandbox worker
/// thread, waiting for the actor to deliver an answer.
struct HumanInputRequest {
    question: String,
    kind: String,
    reply: std::sync::mpsc::Sender<Value>,
}

/// The [`HumanInput`] bridge handed to the executor for one activation.
///
/// `request` runs synchronously on the sandbox's dedicated blocking worker
/// thread (see `warden-sandbox::sandbox::eval_sandboxed`); it hands the
/// question to the owning actor over an async channel with `blocking_send`
/// (safe here: the calling thread is a blocking-pool thread, never a tokio
/// reactor worker), then blocks on a plain `std::sync::mpsc` channel until
/// the actor's `respond` handler delivers the human's value.
struct ServerHumanInput {
    events: mpsc::Sender<HumanInputRequest>,
}

impl HumanInput for ServerHumanInput {
    fn request(&self, question: &str, kind: &str) -> std::result::Result<Value, EvalError> {
        let (reply, recv) = std::sync::mpsc::channel();
        let req = HumanInputRequest { question: question.to_owned(), kind: kind.to_owned(), reply };
        self.events.blocking_send(req).map_err(|_| EvalError::Exit("agent server is no longer running".into()))?;
        recv.recv().map_err(|_| EvalError::Exit("agent server dropped the pending human-input request".into()))
    }
}

enum ClientMessage {
    Start { task: String, reply: oneshot::Sender<Result<ActivationOutcome>> },
    Respond { value: String, reply: oneshot::Sender<Result<()>> },
    Cancel { reply: oneshot::Sender<()> },
    Status { reply: oneshot::Sender<ServerStatus> },
}

/// A handle to a running agent server actor. Cloning shares the same
/// underlying mailbox; dropping every clone lets the actor task exit.
#[derive(Clone)]
pub struct AgentServer {
    id: Uuid,
    tx: mpsc::Sender<ClientMessage>,
}

impl AgentServer {
    /// Spawn the actor task and return a handle to it.
    pub fn spawn(
        agent: AgentDescriptor,
        config: Config,
        transport: Arc<dyn LlmTransport>,
        catalog: Arc<dyn ToolCatalog>,
    ) -> Self {
        let id = Uuid::now_v7();
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(run_actor(id, Arc::new(agent), Arc::new(config), transport, catalog, rx));
        Self { id, tx }
    }

    /// The identifier this server logs under, for correlating activity
    /// across `start`/`respond`/`cancel` calls in the trace output.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start a fresh activation with `task` as the user's request. Blocks
    /// until the activation reaches a terminal state -- `Completed` or
    /// `Cancel` -- which may involve one or more `human_input` round trips
    /// answered via [`respond`](Self::respond) while this call is pending.
    pub async fn start(&self, task: impl Into<String>) -> Result<ActivationOutcome> {
        let (reply, recv) = oneshot::channel();
        self.tx.send(ClientMessage::Start { task: task.into(), reply }).await.map_err(|_| AgentError::ServerGone)?;
        recv.await.map_err(|_| AgentError::ServerGone)?
    }

    /// Answer the one outstanding `human_input` call, if any, resuming the
    /// blocked sandbox worker with `value`. Rejected with
    /// [`AgentError::NoPendingRequest`] when nothing is waiting.
    pub async fn respond(&self, value: impl Into<String>) -> Result<()> {
        let (reply, recv) = oneshot::channel();
        self.tx.send(ClientMessage::Respond { value: value.into(), reply }).await.map_err(|_| AgentError::ServerGone)?;
        recv.await.map_err(|_| AgentError::ServerGone)?
    }

    /// Cast: give up on any in-flight activation and refuse further
    /// `start`/`respond` calls. Does not wait for the worker to unwind; it
    /// takes effect once the mailbox reaches it.
    pub async fn cancel(&self) {
        let (reply, recv) = oneshot::channel();
        if self.tx.send(ClientMessage::Cancel { reply }).await.is_ok() {
            let _ = recv.await;
        }
    }

    /// Call: read the current server status.
    pub async fn status(&self) -> Result<ServerStatus> {
        let (reply, recv) = oneshot::channel();
        self.tx.send(ClientMessage::Status { reply }).await.map_err(|_| AgentError::ServerGone)?;
        recv.await.map_err(|_| AgentError::ServerGone)
    }
}

type RunOutcome = std::result::Result<TerminalResult, warden_executor::ExecutorError>;

/// Resolves once the spawned worker's `warden_executor::run` call returns,
/// or never, if no worker is currently running -- lets `select!` treat a
/// missing worker the same as a pending-forever branch.
async fn await_worker(worker: &mut Option<oneshot::Receiver<RunOutcome>>) -> RunOutcome {
    match worker {
        Some(recv) => match recv.await {
            Ok(outcome) => outcome,
            Err(_) => Err(warden_executor::ExecutorError::Transport(warden_core::TransportError::Failed("activation worker panicked".into()))),
        },
        None => std::future::pending().await,
    }
}

async fn run_actor(
    id: Uuid,
    agent: Arc<AgentDescriptor>,
    config: Arc<Config>,
    transport: Arc<dyn LlmTransport>,
    catalog: Arc<dyn ToolCatalog>,
    mut rx: mpsc::Receiver<ClientMessage>,
) {
    let vault = Arc::new(Vault::new());
    let mut cancelled = false;
    let mut pending_reply: Option<oneshot::Sender<Result<ActivationOutcome>>> = None;
    let mut worker: Option<oneshot::Receiver<RunOutcome>> = None;
    let mut human_input_waiter: Option<std::sync::mpsc::Sender<Value>> = None;
    let (events_tx, mut events_rx) = mpsc::channel::<HumanInputRequest>(1);

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                match msg {
                    ClientMessage::Start { task, reply } => {
                        if cancelled {
                            let _ = reply.send(Err(AgentError::Cancelled));
                        } else if pending_reply.is_some() {
                            let _ = reply.send(Err(AgentError::ActivationInProgress));
                        } else {
                            info!(agent_id = %id, "starting activation");
                            let human_input: Arc<dyn HumanInput> = Arc::new(ServerHumanInput { events: events_tx.clone() });
                            let (done_tx, done_rx) = oneshot::channel();
                            let agent = agent.clone();
                            let config = config.clone();
                            let transport = transport.clone();
                            let catalog = catalog.clone();
                            let vault = vault.clone();
                            tokio::spawn(async move {
                                let system_prompt = warden_prompt::build_prompt(&agent, catalog.as_ref());
                                let outcome = warden_executor::run(&agent, system_prompt, task, &config, transport.as_ref(), vault.as_ref(), catalog.as_ref(), human_input)
                                    .await
                                    .map(|(result, _context)| result);
                                let _ = done_tx.send(outcome);
                            });
                            pending_reply = Some(reply);
                            worker = Some(done_rx);
                        }
                    }
                    ClientMessage::Respond { value, reply } => {
                        let outcome = if let Some(waiter) = human_input_waiter.take() {
                            debug!(agent_id = %id, "delivering human-input response");
                            match waiter.send(Value::Str(value)) {
                                Ok(()) => Ok(()),
                                Err(_) => Err(AgentError::NoPendingRequest),
                            }
                        } else {
                            Err(AgentError::NoPendingRequest)
                        };
                        let _ = reply.send(outcome);
                    }
                    ClientMessage::Cancel { reply } => {
                        debug!(agent_id = %id, "agent server cancelled");
                        cancelled = true;
                        human_input_waiter = None;
                        if let Some(pending_reply) = pending_reply.take() {
                            let _ = pending_reply.send(Err(AgentError::Cancelled));
                        }
                        worker = None;
                        let _ = reply.send(());
                    }
                    ClientMessage::Status { reply } => {
                        let status = if cancelled {
                            ServerStatus::Cancelled
                        } else if human_input_waiter.is_some() {
                            ServerStatus::AwaitingInput
                        } else if pending_reply.is_some() {
                            ServerStatus::Running
                        } else {
                            ServerStatus::Idle
                        };
                        let _ = reply.send(status);
                    }
                }
            }

            Some(req) = events_rx.recv() => {
                if cancelled {
                    // Drop `req.reply`: the stranded worker's `recv()` errors
                    // out immediately instead of blocking forever.
                    continue;
                }
                debug!(agent_id = %id, question = %req.question, kind = %req.kind, "waiter registered for pending human-input request");
                human_input_waiter = Some(req.reply);
            }

            outcome = await_worker(&mut worker), if worker.is_some() => {
                worker = None;
                human_input_waiter = None;
                if let Some(reply) = pending_reply.take() {
                    let result = outcome.map(settle).map_err(AgentError::Executor);
                    let _ = reply.send(result);
                }
            }
        }
    }

    warn!(agent_id = %id, "agent server mailbox closed, actor exiting");
}

/// Translate a [`TerminalResult`] into an [`ActivationOutcome`]. A
/// cancellation is terminal -- it is handed straight to the client, never
/// reinterpreted as a suspension.
fn settle(result: TerminalResult) -> ActivationOutcome {
    match result {
        TerminalResult::Ok(value) => ActivationOutcome::Completed(value),
        TerminalResult::Cancel(reason) => ActivationOutcome::Cancel(reason),
    }
}
