//! Typed cache-aside helper over a [`CacheService`].
//!
//! [`EntityCache`] owns the key scheme (`{prefix}:{id}`), the TTL applied on every
//! write and the JSON snapshot encoding. Each cache step returns its own
//! [`CacheResult`]; [`EntityCache::settle`] then applies the configured
//! [`CacheFailurePolicy`] so a cache failure never replaces a store result
//! unless the policy says so.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService};

pub const METRIC_CACHE_HITS: &str = "cache_hits_total";
pub const METRIC_CACHE_MISSES: &str = "cache_misses_total";
pub const METRIC_CACHE_FAILURES: &str = "cache_failures_total";

/// What to do when a cache step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheFailurePolicy {
    /// Log and continue with the store result. Reads fall back to the store.
    #[default]
    Tolerate,
    /// Fail the operation. Committed store writes are left in place.
    Propagate,
}

impl FromStr for CacheFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tolerate" => Ok(Self::Tolerate),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!(
                "unknown cache failure policy '{}', expected 'tolerate' or 'propagate'",
                other
            )),
        }
    }
}

impl fmt::Display for CacheFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tolerate => f.write_str("tolerate"),
            Self::Propagate => f.write_str("propagate"),
        }
    }
}

/// Cache sub-step of an operation, used for logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStep {
    Read,
    Write,
    Evict,
}

impl CacheStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Evict => "evict",
        }
    }
}

/// Typed snapshot cache for one entity kind.
pub struct EntityCache<T> {
    backend: Arc<dyn CacheService>,
    prefix: String,
    ttl_seconds: u64,
    policy: CacheFailurePolicy,
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntityCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(
        backend: Arc<dyn CacheService>,
        prefix: impl Into<String>,
        ttl_seconds: u64,
        policy: CacheFailurePolicy,
    ) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            ttl_seconds,
            policy,
            _entity: PhantomData,
        }
    }

    /// Cache key for an entity id.
    pub fn key(&self, id: i64) -> String {
        format!("{}:{}", self.prefix, id)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Looks up a snapshot.
    ///
    /// A payload that does not decode is reported as a miss; backend errors
    /// are returned as-is.
    pub async fn fetch(&self, id: i64) -> CacheResult<Option<T>> {
        let key = self.key(id);

        let Some(raw) = self.backend.get(&key).await? else {
            counter!(METRIC_CACHE_MISSES, "entity" => self.prefix.clone()).increment(1);
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(entity) => {
                counter!(METRIC_CACHE_HITS, "entity" => self.prefix.clone()).increment(1);
                Ok(Some(entity))
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                counter!(METRIC_CACHE_MISSES, "entity" => self.prefix.clone()).increment(1);
                Ok(None)
            }
        }
    }

    /// Writes a snapshot with the standard TTL, replacing any previous entry.
    pub async fn store(&self, id: i64, entity: &T) -> CacheResult<()> {
        let payload = serde_json::to_string(entity)?;
        self.backend
            .set(&self.key(id), &payload, Some(self.ttl_seconds))
            .await
    }

    /// Removes a snapshot.
    pub async fn evict(&self, id: i64) -> CacheResult<()> {
        self.backend.delete(&self.key(id)).await
    }

    /// Applies the failure policy to the outcome of one cache step.
    ///
    /// Returns `Ok(Some(v))` on success, `Ok(None)` for a tolerated failure and
    /// `Err` only under [`CacheFailurePolicy::Propagate`].
    pub fn settle<V>(
        &self,
        step: CacheStep,
        id: i64,
        result: CacheResult<V>,
    ) -> Result<Option<V>, AppError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                counter!(
                    METRIC_CACHE_FAILURES,
                    "entity" => self.prefix.clone(),
                    "step" => step.as_str()
                )
                .increment(1);

                match self.policy {
                    CacheFailurePolicy::Tolerate => {
                        tracing::warn!(
                            key = %self.key(id),
                            step = step.as_str(),
                            error = %e,
                            "Cache step failed, continuing with store result"
                        );
                        Ok(None)
                    }
                    CacheFailurePolicy::Propagate => {
                        tracing::error!(
                            key = %self.key(id),
                            step = step.as_str(),
                            error = %e,
                            "Cache step failed"
                        );
                        Err(e.into())
                    }
                }
            }
        }
    }
}
