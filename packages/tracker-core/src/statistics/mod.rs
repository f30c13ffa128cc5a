//! Structs to collect and keep tracker metrics.
//!
//! The tracker collects metrics such as:
//!
//! - Number of connections accepted and closed.
//! - Number of requests handled, per request kind.
//! - Number of requests with an unknown kind.
//! - Number of connections closed because of a malformed message.
//!
//! This module contains:
//!
//! - A [`Sender`](crate::statistics::event::sender::Sender) to send statistics
//!   events.
//! - A [`Keeper`](crate::statistics::keeper::Keeper) to receive the events and
//!   update the metrics.
//! - A [`Repository`](crate::statistics::repository::Repository) to keep the
//!   metrics.
//!
//! The server sends an event for every connection and request it handles. The
//! events go through a channel to the keeper task, so collecting statistics
//! never slows down request handling.
pub mod event;
pub mod keeper;
pub mod metrics;
pub mod repository;
pub mod setup;
