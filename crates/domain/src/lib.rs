//! # gpioswitch-domain
//!
//! Pure domain model for the gpioswitch daemon.
//!
//! ## Responsibilities
//! - Foundational types: typed switch identifiers, error conventions, timestamps
//! - Define **Switches** (binary outputs with an optional auto-off deadline)
//! - Define **Commands** (`on` / `off` requests addressed to a switch)
//! - Define **Announcements** (state published after an automatic turn-off)
//! - Contain all deadline bookkeeping and invariant enforcement
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod announcement;
pub mod command;
pub mod switch;
