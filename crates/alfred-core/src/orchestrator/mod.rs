//! Orchestrator facade: one session, one conversation, serialized turns.

mod turn;

use crate::conversation::Conversation;
use crate::error::CoreError;
use alfred_config::AlfredConfig;
use alfred_engine::{
    EngineError, ReasoningBackend, ReasoningEngine, build_embedding_backend,
    build_reasoning_backend,
};
use alfred_memory::MemoryStore;
use alfred_tools::{ToolRegistry, builtin_tool_registry};
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use turn::TurnExecutor;

/// Session-scoped conversation driver.
///
/// Owns the conversation transcript and wires the reasoning engine, memory
/// store, and tool registry together. `process` calls are serialized per
/// instance; a second call while one is in flight fails with
/// [`CoreError::Busy`].
pub struct Orchestrator {
    conversation: RwLock<Conversation>,
    executor: TurnExecutor,
    memory: Arc<MemoryStore>,
    tools: ToolRegistry,
    turn_gate: Mutex<()>,
    shutdown: CancellationToken,
    started: AtomicBool,
}

impl Orchestrator {
    /// Assemble an orchestrator from pre-built components.
    pub fn new(
        config: &AlfredConfig,
        backend: Arc<dyn ReasoningBackend>,
        memory: Arc<MemoryStore>,
        tools: ToolRegistry,
    ) -> Self {
        let engine = ReasoningEngine::new(backend, &config.reasoning);
        let executor = TurnExecutor::new(
            engine,
            Arc::clone(&memory),
            tools.clone(),
            config.orchestrator.max_tool_rounds,
            config.orchestrator.window_messages,
            config.memory.recall_k,
        );
        Self {
            conversation: RwLock::new(Conversation::new()),
            executor,
            memory,
            tools,
            turn_gate: Mutex::new(()),
            shutdown: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Build an orchestrator entirely from configuration: backends from the
    /// reasoning and embedding sections, memory from the memory section,
    /// and the builtin tool registry.
    pub fn from_config(config: &AlfredConfig) -> Result<Self, CoreError> {
        let backend = build_reasoning_backend(&config.reasoning).map_err(configuration)?;
        let embedder = build_embedding_backend(&config.embedding).map_err(configuration)?;
        let memory = match &config.memory.path {
            Some(path) => MemoryStore::open(embedder, config.memory.capacity, path)
                .map_err(|err| CoreError::Configuration(err.to_string()))?,
            None => MemoryStore::new(embedder, config.memory.capacity),
        };
        let tools = builtin_tool_registry(&config.tools.enabled);
        Ok(Self::new(config, backend, Arc::new(memory), tools))
    }

    /// Identifier for this session's conversation.
    pub fn session_id(&self) -> Uuid {
        self.conversation.read().id
    }

    /// Snapshot of the committed conversation.
    pub fn conversation(&self) -> Conversation {
        self.conversation.read().clone()
    }

    /// Validate wiring and mark the session ready for `process` calls.
    pub fn start(&self) -> Result<(), CoreError> {
        if self.shutdown.is_cancelled() {
            return Err(CoreError::Configuration(
                "orchestrator already stopped".to_string(),
            ));
        }
        let tools = self.tools.list();
        info!(
            "orchestrator started (session_id={}, backend={}, memory_dimension={}, tools=[{}])",
            self.session_id(),
            self.executor.backend_name(),
            self.memory.dimension(),
            tools.join(", ")
        );
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Run one utterance through the turn state machine and return the
    /// reply. The conversation gains the user message, any tool results,
    /// and the assistant reply only if the turn completes; cancellation or
    /// failure mid-turn leaves the transcript unchanged.
    pub async fn process(&self, utterance: &str) -> Result<String, CoreError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(CoreError::NotStarted);
        }
        let _turn = self.turn_gate.try_lock().map_err(|_| CoreError::Busy)?;

        let snapshot = self.conversation.read().clone();
        let session_id = snapshot.id;
        let outcome = tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!("turn cancelled (session_id={session_id})");
                return Err(CoreError::Cancelled);
            }
            outcome = self.executor.run_turn(snapshot, utterance) => outcome?,
        };

        self.conversation.write().extend(outcome.transcript);
        Ok(outcome.reply)
    }

    /// Stop the session: cancel any in-flight turn and flush memory.
    pub fn stop(&self) -> Result<(), CoreError> {
        self.shutdown.cancel();
        self.started.store(false, Ordering::SeqCst);
        if let Err(err) = self.memory.flush() {
            warn!("memory flush failed on stop (error={err})");
            return Err(CoreError::Memory(err.to_string()));
        }
        info!("orchestrator stopped (session_id={})", self.session_id());
        Ok(())
    }
}

fn configuration(err: EngineError) -> CoreError {
    CoreError::Configuration(err.to_string())
}
