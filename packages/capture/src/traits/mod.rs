//! Trait seams between the capture core and its host.
//!
//! The live page and the transport are external collaborators. The core
//! talks to them through these traits so the pipeline logic stays testable
//! without a browser or a network:
//! - [`SnapshotSource`]: serializes the page and nudges it forward
//! - [`BatchSink`]: carries scraped batches toward the relay hub
//! - [`PostSurface`]: the interactive page the action executor drives

mod sink;
mod source;
mod surface;

pub use sink::BatchSink;
pub use source::SnapshotSource;
pub use surface::PostSurface;
