//! # gpioswitch-adapter-virtual
//!
//! Virtual integration that stands in for real hardware and a real broker.
//!
//! ## Provided adapters
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualActuator`] | `Actuator` | Keeps output levels in memory, can be told to fail per switch |
//! | [`VirtualPublisher`] | `StatePublisher` | Records announcements in memory |
//!
//! Used by the daemon's `virtual` GPIO backend (dry runs on a machine
//! without GPIO) and by end-to-end tests.
//!
//! ## Dependency rule
//!
//! Depends on `gpioswitch-app` (port traits) and `gpioswitch-domain` only.

mod actuator;
mod publisher;

pub use actuator::VirtualActuator;
pub use publisher::VirtualPublisher;
