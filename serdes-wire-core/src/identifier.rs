//! ID generation utilities.
//!
//! Group ids and synthesized tool-call ids come from an [`IdGenerator`]
//! carried in the [`CodecOptions`](crate::CodecOptions) of each call, so
//! callers decide whether ids are random or deterministic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Generate a short ID suitable for group ids.
///
/// Returns the first 8 characters of a UUID. Not guaranteed collision-free.
///
/// # Example
///
/// ```rust
/// use serdes_wire_core::identifier::generate_short_id;
///
/// let id = generate_short_id();
/// assert_eq!(id.len(), 8);
/// ```
#[must_use]
pub fn generate_short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A cloneable id factory.
#[derive(Clone)]
pub struct IdGenerator {
    inner: Arc<dyn Fn() -> String + Send + Sync>,
}

impl IdGenerator {
    /// Pseudo-random short ids (see [`generate_short_id`]).
    #[must_use]
    pub fn random() -> Self {
        Self::from_fn(generate_short_id)
    }

    /// Deterministic ids: `{prefix}1`, `{prefix}2`, ...
    ///
    /// Clones share the same counter.
    ///
    /// ```rust
    /// use serdes_wire_core::IdGenerator;
    ///
    /// let ids = IdGenerator::sequential("g");
    /// assert_eq!(ids.next_id(), "g1");
    /// assert_eq!(ids.clone().next_id(), "g2");
    /// ```
    #[must_use]
    pub fn sequential(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let counter = Arc::new(AtomicU64::new(0));
        Self::from_fn(move || {
            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
            format!("{}{}", prefix, n)
        })
    }

    /// Wrap an arbitrary closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Produce the next id.
    #[must_use]
    pub fn next_id(&self) -> String {
        (self.inner)()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
