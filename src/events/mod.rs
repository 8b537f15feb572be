//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The pipeline publishes events through a channel; the CLI status line (or a
//! test) subscribes on another thread. Sends never block and never fail, so a
//! slow or missing listener cannot affect deduplication or deletion.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Pipeline(PipelineEvent::Status(s)) = event {
//!             println!("keep: {} / trash: {}", s.kept, s.trashed);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
