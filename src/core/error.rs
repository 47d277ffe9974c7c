/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Unified error handling module.
//!
//! Provides a centralized error type that can represent every failure the
//! engine surfaces, from config loading to pipeline execution and the cache
//! backend.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type.
///
/// Everything except [`crate::plugin::ExecStep::Skip`] travels through this
/// enum; skip is a control signal, never an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Sequence configuration tree malformed; surfaced at load time
    #[error("invalid sequence config: {0}")]
    Syntax(String),

    /// Pipeline references a plugin tag that is not registered
    #[error("plugin not registered: {0}")]
    UnknownTag(String),

    /// Plugin tag used in a slot whose capability it lacks
    #[error("plugin '{tag}' has no {expected} capability")]
    CapabilityMismatch { tag: String, expected: &'static str },

    /// Registration refused because the tag is already taken
    #[error("plugin already registered: {0}")]
    DuplicateTag(String),

    /// Plugin reported a failure
    #[error("plugin error: {0}")]
    Plugin(String),

    /// Context deadline elapsed or cancel signal tripped
    #[error("query aborted: {0}")]
    Cancelled(&'static str),

    /// Transport or protocol failure against the key-value backend
    #[error("cache backend error: {0}")]
    CacheBackend(#[from] redis::RedisError),

    /// Stored cache value shorter than its header or undecodable
    #[error("corrupt cache record: {0}")]
    CorruptRecord(String),

    /// DNS wire encoding failed
    #[error("DNS wire error: {0}")]
    Proto(#[from] hickory_proto::ProtoError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Configuration validation error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a sequence syntax error
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax(msg.into())
    }

    /// Create a plugin error
    pub fn plugin<S: Into<String>>(msg: S) -> Self {
        Error::Plugin(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Convenient type alias for Results using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
