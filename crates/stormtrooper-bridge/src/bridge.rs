// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stormtrooper_agent::Agent;
use stormtrooper_common_core::{
	truncate_chars, ActivityEvent, ActivitySink, PermissionHandler, TokenSink,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::error::BridgeError;
use crate::event::{
	BridgeEvent, PermissionRequest, PermissionResponder, ToolOutcome, TOOL_ARGS_DISPLAY_CHARS,
	TOOL_RESULT_DISPLAY_CHARS,
};

/// Events buffered before producers wait on the front end.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Owns the event channel and the busy flag for one conversation.
pub struct Bridge {
	tx: mpsc::Sender<BridgeEvent>,
	rx: Mutex<Option<mpsc::Receiver<BridgeEvent>>>,
	busy: Arc<AtomicBool>,
	next_permission_id: Arc<AtomicU64>,
}

impl Bridge {
	pub fn new() -> Self {
		Self::with_capacity(DEFAULT_EVENT_CAPACITY)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		Self {
			tx,
			rx: Mutex::new(Some(rx)),
			busy: Arc::new(AtomicBool::new(false)),
			next_permission_id: Arc::new(AtomicU64::new(1)),
		}
	}

	/// Hands out the only reader of the event stream.
	///
	/// Every later call fails with [`BridgeError::ReceiverTaken`].
	pub fn take_events(&self) -> Result<EventReceiver, BridgeError> {
		let mut slot = match self.rx.lock() {
			Ok(slot) => slot,
			Err(poisoned) => poisoned.into_inner(),
		};
		slot.take()
			.map(|rx| EventReceiver { rx })
			.ok_or(BridgeError::ReceiverTaken)
	}

	/// Token and activity sink writing onto the event stream.
	pub fn sink(&self) -> Arc<BridgeSink> {
		Arc::new(BridgeSink {
			tx: self.tx.clone(),
		})
	}

	/// Permission handler that asks the front end through the event stream.
	pub fn permission_handler(&self) -> Arc<BridgePermission> {
		Arc::new(BridgePermission {
			tx: self.tx.clone(),
			next_id: self.next_permission_id.clone(),
		})
	}

	pub fn is_busy(&self) -> bool {
		self.busy.load(Ordering::SeqCst)
	}

	/// Runs one turn of `agent` in its own task.
	///
	/// Emits [`BridgeEvent::TurnStarted`] first and [`BridgeEvent::TurnFinished`]
	/// last, even if the turn panics. Fails if a turn is still outstanding.
	#[instrument(skip(self, agent, text, cancel))]
	pub fn start_turn(
		&self,
		agent: Arc<tokio::sync::Mutex<Agent>>,
		text: String,
		cancel: CancellationToken,
	) -> Result<JoinHandle<()>, BridgeError> {
		if self.busy.swap(true, Ordering::SeqCst) {
			return Err(BridgeError::TurnInProgress);
		}
		info!("starting turn");

		let tx = self.tx.clone();
		let busy = self.busy.clone();
		Ok(tokio::spawn(async move {
			if tx.send(BridgeEvent::TurnStarted).await.is_err() {
				debug!("event receiver dropped before turn started");
			}

			let turn = tokio::spawn(async move {
				let mut agent = agent.lock().await;
				agent.send(&cancel, &text).await
			});
			let error = match turn.await {
				Ok(Ok(())) => None,
				Ok(Err(e)) => Some(e.to_string()),
				Err(e) => {
					error!(error = %e, "turn task failed");
					Some(format!("turn aborted: {e}"))
				}
			};

			busy.store(false, Ordering::SeqCst);
			if tx.send(BridgeEvent::TurnFinished { error }).await.is_err() {
				debug!("event receiver dropped before turn finished");
			}
		}))
	}
}

impl Default for Bridge {
	fn default() -> Self {
		Self::new()
	}
}

/// The single reader of a bridge's event stream.
///
/// Not cloneable; `next` borrows mutably, so only one wait can be pending.
#[derive(Debug)]
pub struct EventReceiver {
	rx: mpsc::Receiver<BridgeEvent>,
}

impl EventReceiver {
	/// Waits for the next event. Cancel safe.
	pub async fn next(&mut self) -> Option<BridgeEvent> {
		self.rx.recv().await
	}
}

pub struct BridgeSink {
	tx: mpsc::Sender<BridgeEvent>,
}

impl BridgeSink {
	async fn emit(&self, event: BridgeEvent) {
		if self.tx.send(event).await.is_err() {
			debug!("event receiver dropped");
		}
	}
}

#[async_trait]
impl TokenSink for BridgeSink {
	async fn token(&self, text: &str) {
		self.emit(BridgeEvent::Token(text.to_string())).await;
	}
}

#[async_trait]
impl ActivitySink for BridgeSink {
	async fn record(&self, event: ActivityEvent) {
		let event = match event {
			ActivityEvent::ToolStarted { id, name, args } => BridgeEvent::ToolStarted {
				id,
				name,
				args: truncate_chars(&args, TOOL_ARGS_DISPLAY_CHARS),
			},
			ActivityEvent::ToolCompleted { id, name, result } => BridgeEvent::ToolFinished {
				id,
				name,
				outcome: ToolOutcome::Completed(truncate_chars(&result, TOOL_RESULT_DISPLAY_CHARS)),
			},
			ActivityEvent::ToolFailed { id, name, error } => BridgeEvent::ToolFinished {
				id,
				name,
				outcome: ToolOutcome::Failed(truncate_chars(&error, TOOL_RESULT_DISPLAY_CHARS)),
			},
			ActivityEvent::ToolDenied { id, name } => BridgeEvent::ToolFinished {
				id,
				name,
				outcome: ToolOutcome::Denied,
			},
			ActivityEvent::UnknownTool { id, name } => BridgeEvent::ToolFinished {
				id,
				name,
				outcome: ToolOutcome::Unknown,
			},
			ActivityEvent::SubAgentSpawned { task } => BridgeEvent::SubAgentSpawned { task },
			ActivityEvent::SubAgentFinished => BridgeEvent::SubAgentFinished,
		};
		self.emit(event).await;
	}
}

/// Posts a permission request and waits for its one-shot answer.
///
/// Each request carries its own responder, so requests from nested
/// sub-agents never share an answer. A dropped responder or a closed event
/// stream denies.
pub struct BridgePermission {
	tx: mpsc::Sender<BridgeEvent>,
	next_id: Arc<AtomicU64>,
}

#[async_trait]
impl PermissionHandler for BridgePermission {
	async fn check(&self, tool_name: &str, preview: &str) -> bool {
		let id = format!("perm-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
		let (ack_tx, ack_rx) = oneshot::channel();

		let request = PermissionRequest {
			id: id.clone(),
			tool_name: tool_name.to_string(),
			preview: preview.to_string(),
			responder: PermissionResponder::new(ack_tx),
		};
		if self
			.tx
			.send(BridgeEvent::PermissionRequested(request))
			.await
			.is_err()
		{
			debug!(request_id = %id, "event receiver dropped; denying");
			return false;
		}

		let allowed = ack_rx.await.unwrap_or(false);
		debug!(request_id = %id, tool_name, allowed, "permission decided");
		allowed
	}
}
