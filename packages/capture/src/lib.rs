//! Browser-Side Capture Core
//!
//! The capture half of a social-post triage pipeline: discover the viewer's
//! own posts in a live timeline, stream them to a relay hub for human
//! review, and execute the resulting delete decisions against the page.
//!
//! # Design Philosophy
//!
//! - Extraction is pure: DOM snapshot in, records out, no I/O
//! - Every field degrades to a documented default, never an error
//! - The live page and the transport sit behind trait seams
//! - Action execution is fire-and-forget: outcomes are logged, not thrown
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use capture::{CaptureAgent, CaptureLoop, DeleteExecutor, RelayLink};
//!
//! let (link, mut events) = RelayLink::new("ws://192.168.1.20:3000/ws")?;
//! let agent = CaptureAgent::new(
//!     CaptureLoop::new(page.clone(), link),
//!     DeleteExecutor::new(page),
//! );
//!
//! agent.handle_command(capture::ControlCommand::Start).await;
//! while let Some(event) = events.recv().await {
//!     agent.handle_link_event(event).await;
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`] - PostRecord and friends
//! - [`protocol`] - wire shapes for the capture<->hub<->review channel
//! - [`extract`] - the extraction engine
//! - [`capture_loop`] - the recurring scrape-forward-advance driver
//! - [`action`] - delete execution against the live page
//! - [`link`] - WebSocket client to the relay hub
//! - [`traits`] - seams to the host (page, transport)
//! - [`testing`] - scripted fakes for the seams

pub mod action;
pub mod agent;
pub mod capture_loop;
pub mod error;
pub mod extract;
pub mod link;
pub mod protocol;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ForwardError, LinkError};
pub use protocol::{ClientMessage, ControlCommand, Role, ServerMessage};
pub use traits::{BatchSink, PostSurface, SnapshotSource};
pub use types::{
    LinkCard, PageSnapshot, PostMetrics, PostRecord, PostStatus, MEDIA_ONLY_PLACEHOLDER,
};

// Re-export the pipeline pieces
pub use action::{ActionConfig, DeleteExecutor, ExecutionOutcome, DELETE_LABELS, UNDO_REPOST_LABELS};
pub use agent::CaptureAgent;
pub use capture_loop::{CaptureLoop, CaptureLoopConfig};
pub use extract::{normalize_handle, scrape_snapshot};
pub use link::{LinkEvent, RelayLink};
