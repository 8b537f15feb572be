//! # Pipeline Module
//!
//! Orchestrates a duplicate removal run.
//!
//! ## Run States
//! 1. **Scanning** - Enumerate files, dispatch each one to the worker pool,
//!    and react to completions as soon as they are available
//! 2. **Draining** - Enumeration is over; wait for the remaining fingerprints
//! 3. **Done** - Every computation and every delete has settled
//!
//! A failure to enumerate moves the run to **Aborted** instead: workers are
//! stopped, deletes already issued are allowed to finish, and the error is
//! returned.
//!
//! ## Threads
//! The calling thread owns the registry and the routing list. Fingerprints
//! are computed on the pool's threads and deletes run on the dispatcher's
//! thread.

mod cancel;
mod context;
mod executor;

pub use cancel::CancellationToken;
pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
