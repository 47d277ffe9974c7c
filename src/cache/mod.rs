/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Persistent response cache over a remote key-value backend.
//!
//! Responses are stored under opaque string keys together with their
//! stored/expiration timestamps (see [`codec`]). Misses and expired
//! records surface as `Ok(None)` so callers stay on a single fast path;
//! `allow_expired` keeps expired records visible for
//! stale-while-revalidate logic.

pub mod codec;

use crate::core::error::Result;
use async_trait::async_trait;
use hickory_proto::op::Message;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::fmt;
use std::fmt::Debug;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Remote key-value store contract. A missing key is `None`, never an
/// error; the backend owns expiry of stored values via the `ttl` it is
/// given.
#[async_trait]
pub trait KvBackend: Debug + Send + Sync + 'static {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn store(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Redis implementation of [`KvBackend`].
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connects to a `redis://` URL. Invalid URLs fail here, before any
    /// command is issued.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn store(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects 0; sub-second TTLs round up to keep the value alive.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // The connection manager has no explicit shutdown; dropping the
        // cache severs the connection.
        Ok(())
    }
}

impl Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend").finish_non_exhaustive()
    }
}

/// A decoded cache record.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub msg: Message,
    pub stored_at: SystemTime,
    pub expires_at: SystemTime,
}

impl CachedResponse {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

/// DNS response cache over a [`KvBackend`].
#[derive(Debug)]
pub struct ResponseCache {
    backend: Box<dyn KvBackend>,
}

impl ResponseCache {
    pub fn new(backend: impl KvBackend) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Convenience constructor for the Redis backend.
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(RedisBackend::connect(url).await?))
    }

    /// Looks up `key`. A backend miss and, unless `allow_expired` is set,
    /// an expired record both come back as `Ok(None)`.
    pub async fn get(&self, key: &str, allow_expired: bool) -> Result<Option<CachedResponse>> {
        let Some(raw) = self.backend.fetch(key).await? else {
            return Ok(None);
        };

        let (stored_at, expires_at, msg) = codec::unpack(&raw)?;
        let record = CachedResponse {
            msg,
            stored_at,
            expires_at,
        };
        if !allow_expired && record.is_expired(SystemTime::now()) {
            debug!("suppressing expired record for {key}");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Persists `msg` until `expires_at`. Records that already expired are
    /// not sent to the backend; that is a successful no-op.
    pub async fn store(
        &self,
        key: &str,
        msg: &Message,
        stored_at: SystemTime,
        expires_at: SystemTime,
    ) -> Result<()> {
        let ttl = match expires_at.duration_since(SystemTime::now()) {
            Ok(ttl) if !ttl.is_zero() => ttl,
            _ => return Ok(()),
        };

        let data = codec::pack(stored_at, expires_at, msg)?;
        // The pooled buffer is released when `data` drops, success or not.
        self.backend.store(key, &data, ttl).await
    }

    /// Releases backend resources.
    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }
}
