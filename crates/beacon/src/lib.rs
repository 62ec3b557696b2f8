//! Producer side of the Pixel pipeline.
//!
//! A [`Beacon`] owns one page load's event queue and session id. Events are
//! queued by [`Beacon::track`] and delivered in batches by [`Beacon::flush`],
//! which runs on a timer once [`Beacon::start`] is called and one last time
//! on [`BeaconHandle::unload`]. Delivery is best effort: a failed batch is
//! logged and dropped.

pub mod config;
pub mod error;
pub mod queue;
pub mod session;
pub mod tracker;
pub mod transport;

pub use config::BeaconConfig;
pub use error::{BeaconError, Result};
pub use queue::EventQueue;
pub use session::{PageContext, SessionId};
pub use tracker::{Beacon, BeaconHandle, ClickTarget, FlushOutcome};
pub use transport::{HttpTransport, Transport};
