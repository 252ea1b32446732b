//! # vox-core
//!
//! Foundation types for the Vox dictation relay coordinator.
//!
//! This crate provides the shared vocabulary that all other Vox crates depend on:
//!
//! - **Branded IDs**: [`ids::AgentId`], [`ids::ObserverId`] as newtypes
//! - **Presence**: [`presence::AgentRecord`] liveness metadata and
//!   [`presence::PresenceSnapshot`] derived views
//! - **Activity**: [`activity::ActivityRecord`] rolling-log entries
//! - **Wire messages**: [`wire::AgentMessage`], [`wire::AgentReply`],
//!   [`wire::ObserverEvent`] tagged JSON frames
//! - **Errors**: [`errors::VoxError`] hierarchy via `thiserror`
//! - **Time**: [`time::epoch_ms`] wall-clock epoch milliseconds
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other vox crates.

#![deny(unsafe_code)]

pub mod activity;
pub mod errors;
pub mod ids;
pub mod presence;
pub mod time;
pub mod wire;
