//! # gpioswitch-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Actuator`: drive a switch output high or low
//!   - `StatePublisher`: announce switch states to observers
//! - Provide the **switch timeout controller**, the single owner of switch
//!   state and deadlines
//! - Provide the **ticker**, the periodic task that expires deadlines and
//!   forwards announcements
//!
//! ## Dependency rule
//! Depends on `gpioswitch-domain` only (plus `tokio` for timers and
//! `tokio-util` for cancellation). Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod controller;
pub mod ports;
pub mod ticker;
