//! Single-turn execution: the conversation state machine.
//!
//! One turn walks `AwaitingModel -> (ExecutingTool)* -> Responding`. All
//! messages produced by the turn accumulate in a draft transcript that the
//! orchestrator commits only after the turn finishes, so a cancelled or
//! failed turn leaves the conversation untouched.

use crate::conversation::{Conversation, Message};
use crate::error::CoreError;
use alfred_engine::{
    EngineError, GenerateRequest, PromptMessage, ReasoningEngine, Role, ToolCallRequest,
};
use alfred_memory::{MemoryError, MemoryStore, ScoredRecord};
use alfred_tools::ToolRegistry;
use log::{debug, error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Result of one completed turn.
pub(crate) struct TurnOutcome {
    /// Final reply text for the caller.
    pub(crate) reply: String,
    /// Messages to commit to the conversation, in order.
    pub(crate) transcript: Vec<Message>,
}

/// Conversation states driven by the executor.
enum TurnState {
    /// Waiting on the reasoning engine.
    AwaitingModel,
    /// Running tool calls requested by the engine, in request order.
    ExecutingTool(Vec<ToolCallRequest>),
    /// Emitting the final reply.
    Responding { text: String, forced: bool },
}

/// Executes turns against the engine, memory store, and tool registry.
pub(crate) struct TurnExecutor {
    engine: ReasoningEngine,
    memory: Arc<MemoryStore>,
    tools: ToolRegistry,
    max_tool_rounds: usize,
    window_messages: usize,
    recall_k: usize,
}

impl TurnExecutor {
    pub(crate) fn new(
        engine: ReasoningEngine,
        memory: Arc<MemoryStore>,
        tools: ToolRegistry,
        max_tool_rounds: usize,
        window_messages: usize,
        recall_k: usize,
    ) -> Self {
        Self {
            engine,
            memory,
            tools,
            max_tool_rounds,
            window_messages: window_messages.max(2),
            recall_k,
        }
    }

    /// Name of the reasoning backend behind the engine.
    pub(crate) fn backend_name(&self) -> &str {
        self.engine.backend_name()
    }

    /// Run one cycle of the state machine for an utterance.
    ///
    /// `conversation` is a snapshot as of the start of the turn; this method
    /// never mutates shared state. Turn messages go into both the snapshot
    /// (for prompt windowing) and the draft transcript (for commit).
    pub(crate) async fn run_turn(
        &self,
        conversation: Conversation,
        utterance: &str,
    ) -> Result<TurnOutcome, CoreError> {
        let session_id = conversation.id;
        let mut live = conversation;
        let mut draft = Vec::new();
        stage(&mut draft, &mut live, Message::user(utterance));
        let context = self.recall_context(session_id, utterance).await?;
        info!(
            "turn started (session_id={}, utterance_len={}, context_records={})",
            session_id,
            utterance.len(),
            context.len()
        );

        let mut state = TurnState::AwaitingModel;
        let mut rounds = 0usize;
        let mut window = self.window_messages;
        let mut trimmed = false;
        let mut partial: Option<String> = None;

        let (reply, remember) = loop {
            state = match state {
                TurnState::AwaitingModel => {
                    let request = self.build_request(&context, &live, window);
                    match self.engine.generate(&request).await {
                        Ok(result) => {
                            if !result.tool_calls.is_empty() {
                                partial = result.text.or(partial);
                                if rounds >= self.max_tool_rounds {
                                    warn!(
                                        "tool loop exceeded, forcing response (session_id={}, rounds={})",
                                        session_id, rounds
                                    );
                                    TurnState::Responding {
                                        text: partial.take().unwrap_or_else(|| {
                                            "I stopped before finishing: the tool-call round \
                                             limit was reached without a final answer."
                                                .to_string()
                                        }),
                                        forced: true,
                                    }
                                } else {
                                    rounds += 1;
                                    TurnState::ExecutingTool(result.tool_calls)
                                }
                            } else if let Some(text) = result.text {
                                TurnState::Responding {
                                    text,
                                    forced: false,
                                }
                            } else {
                                error!("backend returned an empty result (session_id={session_id})");
                                TurnState::Responding {
                                    text: degraded_reply(),
                                    forced: true,
                                }
                            }
                        }
                        Err(EngineError::ContextOverflow(reason)) if !trimmed => {
                            trimmed = true;
                            window = (window / 2).max(2);
                            debug!(
                                "context overflow, retrying with trimmed window (session_id={}, window={}, reason={})",
                                session_id, window, reason
                            );
                            TurnState::AwaitingModel
                        }
                        Err(EngineError::ContextOverflow(reason)) => {
                            error!(
                                "context overflow persisted after trimming (session_id={}, reason={})",
                                session_id, reason
                            );
                            TurnState::Responding {
                                text: degraded_reply(),
                                forced: true,
                            }
                        }
                        Err(EngineError::Protocol(reason)) => {
                            // Surface a degraded reply and keep the session
                            // usable rather than aborting the turn.
                            error!(
                                "backend protocol error (session_id={}, reason={})",
                                session_id, reason
                            );
                            TurnState::Responding {
                                text: degraded_reply(),
                                forced: true,
                            }
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                TurnState::ExecutingTool(calls) => {
                    // Sequential on purpose: later calls may depend on
                    // earlier results.
                    for call in calls {
                        let output = match self.tools.invoke(&call.name, call.arguments.clone()).await
                        {
                            Ok(output) => output,
                            Err(err) => {
                                // The failure goes back to the model as a
                                // tool result so it can decide how to
                                // proceed.
                                warn!(
                                    "tool invocation failed (session_id={}, tool={}, error={})",
                                    session_id, call.name, err
                                );
                                format!("error: {err}")
                            }
                        };
                        debug!(
                            "tool executed (session_id={}, tool={}, output_len={})",
                            session_id,
                            call.name,
                            output.len()
                        );
                        stage(&mut draft, &mut live, Message::tool(call, output));
                    }
                    TurnState::AwaitingModel
                }
                TurnState::Responding { text, forced } => {
                    stage(&mut draft, &mut live, Message::assistant(&text));
                    break (text, !forced);
                }
            };
        };

        if remember {
            self.remember_exchange(session_id, utterance, &reply).await;
        }
        info!(
            "turn finished (session_id={}, rounds={}, reply_len={})",
            session_id,
            rounds,
            reply.len()
        );
        Ok(TurnOutcome {
            reply,
            transcript: draft,
        })
    }

    /// Recall memory context for the utterance. Embedding failures degrade
    /// to an empty context; a dimension mismatch is a configuration error
    /// and fails the turn.
    async fn recall_context(
        &self,
        session_id: Uuid,
        utterance: &str,
    ) -> Result<Vec<PromptMessage>, CoreError> {
        match self.memory.recall(session_id, utterance, self.recall_k).await {
            Ok(records) => Ok(format_memory_context(&records)),
            Err(err @ MemoryError::DimensionMismatch { .. }) => {
                Err(CoreError::Configuration(err.to_string()))
            }
            Err(err) => {
                warn!(
                    "memory recall failed, continuing without context (session_id={}, error={})",
                    session_id, err
                );
                Ok(Vec::new())
            }
        }
    }

    /// Persist the completed exchange. Failures are logged and skipped;
    /// the reply has already been produced.
    async fn remember_exchange(&self, session_id: Uuid, utterance: &str, reply: &str) {
        let record = format!("user: {utterance}\nassistant: {reply}");
        if let Err(err) = self.memory.remember(session_id, record, Vec::new()).await {
            warn!(
                "failed to remember exchange (session_id={}, error={})",
                session_id, err
            );
        }
    }

    /// Assemble the request: recall context ahead of the live window.
    fn build_request(
        &self,
        context: &[PromptMessage],
        live: &Conversation,
        window: usize,
    ) -> GenerateRequest {
        let mut messages = context.to_vec();
        messages.extend(live.window(window).iter().map(Message::to_prompt));
        GenerateRequest {
            messages,
            tools: self.tools.specs(),
        }
    }
}

/// Record a turn message in both the draft transcript and the live view.
fn stage(draft: &mut Vec<Message>, live: &mut Conversation, message: Message) {
    live.append(message.clone());
    draft.push(message);
}

/// Render recalled records as memory-tagged context messages.
fn format_memory_context(records: &[ScoredRecord]) -> Vec<PromptMessage> {
    records
        .iter()
        .map(|scored| {
            PromptMessage::new(
                Role::Memory,
                format!("[memory] {}", scored.record.text),
            )
        })
        .collect()
}

/// Canned reply for turns that end in an unrecoverable backend response.
fn degraded_reply() -> String {
    "I ran into a problem with my reasoning backend and couldn't finish that \
     thought. The conversation is still intact; please try again."
        .to_string()
}
