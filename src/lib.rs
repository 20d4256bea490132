//! Library exports for the post page service
//!
//! This module exposes internal components for testing and potential library usage.

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod model;
pub mod resolver;
pub mod route;
pub mod sanitize;
pub mod state;
pub mod template;
