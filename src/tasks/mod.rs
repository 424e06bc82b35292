//! Background Tasks Module
//!
//! One-shot TTL expiry timers, armed per put.

mod expiry;

pub(crate) use expiry::spawn_expiry_timer;
