//! Client-side mapping layer for the Fineract platform API: builds and
//! encodes outbound entities and commands, decodes responses (including
//! lifecycle timelines) and classifies transport failures.

pub mod classify;
pub mod client;
pub mod command;
pub mod config;
pub mod date;
pub mod error;
pub mod group;
pub mod json;
pub mod office;
pub mod resource;
pub mod service;
pub mod staff;
pub mod timeline;
pub mod transport;

pub use error::{Error, ErrorCode, Result};
