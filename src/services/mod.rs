//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and fan-out so route handlers can
//! stay focused on protocol translation and connection plumbing.

pub mod drawing;
pub mod game;
pub mod rooms;
