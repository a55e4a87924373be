//! Payload statistics.
//!
//! Byte and object counters attach to the same component-entry/exit
//! lifecycle as spans but are independent of the span tree: counters are
//! keyed by component location path and survive across executions. Counting
//! happens where the payload is actually consumed, so a stream read to
//! completion is counted exactly once however many spans observed it.

use crate::types::ComponentLocation;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Whether a payload flows into or out of the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDirection {
    /// Payload consumed by the component.
    Input,
    /// Payload produced by the component.
    Output,
}

/// Cumulative payload counters for one component location.
///
/// All counters are atomic; recording is safe from concurrently executing
/// paths. When statistics are disabled every recording call is a no-op and
/// the counters stay at zero.
#[derive(Debug)]
pub struct PayloadStatistics {
    location: String,
    component: String,
    enabled: bool,
    invocations: AtomicU64,
    input_bytes: AtomicU64,
    output_bytes: AtomicU64,
    input_objects: AtomicU64,
    output_objects: AtomicU64,
}

impl PayloadStatistics {
    fn new(location: impl Into<String>, component: impl Into<String>, enabled: bool) -> Self {
        Self {
            location: location.into(),
            component: component.into(),
            enabled,
            invocations: AtomicU64::new(0),
            input_bytes: AtomicU64::new(0),
            output_bytes: AtomicU64::new(0),
            input_objects: AtomicU64::new(0),
            output_objects: AtomicU64::new(0),
        }
    }

    /// Returns the component location path these counters belong to.
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the component identifier (e.g. `"file:read"`).
    #[inline]
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Whether recording is enabled for these counters.
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Records one invocation of the component.
    pub fn add_invocation(&self) {
        if self.enabled {
            self.invocations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records payload bytes in the given direction.
    pub fn add_bytes(&self, direction: PayloadDirection, count: u64) {
        if !self.enabled {
            return;
        }
        match direction {
            PayloadDirection::Input => self.input_bytes.fetch_add(count, Ordering::Relaxed),
            PayloadDirection::Output => self.output_bytes.fetch_add(count, Ordering::Relaxed),
        };
    }

    /// Records payload objects in the given direction.
    pub fn add_objects(&self, direction: PayloadDirection, count: u64) {
        if !self.enabled {
            return;
        }
        match direction {
            PayloadDirection::Input => self.input_objects.fetch_add(count, Ordering::Relaxed),
            PayloadDirection::Output => self.output_objects.fetch_add(count, Ordering::Relaxed),
        };
    }

    /// Returns the invocation count.
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Returns the input byte count.
    #[must_use]
    pub fn input_bytes(&self) -> u64 {
        self.input_bytes.load(Ordering::Relaxed)
    }

    /// Returns the output byte count.
    #[must_use]
    pub fn output_bytes(&self) -> u64 {
        self.output_bytes.load(Ordering::Relaxed)
    }

    /// Returns the input object count.
    #[must_use]
    pub fn input_objects(&self) -> u64 {
        self.input_objects.load(Ordering::Relaxed)
    }

    /// Returns the output object count.
    #[must_use]
    pub fn output_objects(&self) -> u64 {
        self.output_objects.load(Ordering::Relaxed)
    }
}

/// Registry of payload statistics, keyed by component location path.
///
/// Cheap to share; one registry serves an artifact. The enabled flag is
/// fixed at construction (the runtime decides it once, at startup) and is
/// inherited by every counter set the registry hands out.
#[derive(Debug)]
pub struct StatisticsRegistry {
    enabled: bool,
    by_location: RwLock<HashMap<String, Arc<PayloadStatistics>>>,
}

impl StatisticsRegistry {
    /// Creates a registry with recording enabled or disabled.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            by_location: RwLock::new(HashMap::new()),
        }
    }

    /// Whether counters from this registry record anything.
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the counters for a location, creating them on first use.
    ///
    /// The component identifier is recorded on first creation; later calls
    /// for the same location return the existing counters unchanged.
    #[must_use]
    pub fn for_location(
        &self,
        location: &ComponentLocation,
        component: impl Into<String>,
    ) -> Arc<PayloadStatistics> {
        if let Some(stats) = self.by_location.read().get(location.path()) {
            return Arc::clone(stats);
        }
        let mut map = self.by_location.write();
        let stats = map
            .entry(location.path().to_owned())
            .or_insert_with(|| {
                Arc::new(PayloadStatistics::new(
                    location.path(),
                    component,
                    self.enabled,
                ))
            });
        Arc::clone(stats)
    }

    /// Returns the counters for a location path, if they exist.
    #[must_use]
    pub fn get(&self, location_path: &str) -> Option<Arc<PayloadStatistics>> {
        self.by_location.read().get(location_path).map(Arc::clone)
    }

    /// Returns all counter sets, sorted by location path.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<PayloadStatistics>> {
        let mut all: Vec<Arc<PayloadStatistics>> =
            self.by_location.read().values().map(Arc::clone).collect();
        all.sort_by(|a, b| a.location().cmp(b.location()));
        all
    }
}

/// A reader decorator that counts bytes as the wrapped reader is consumed.
///
/// Counting happens per underlying read, so wrapping must occur exactly once
/// per payload stream.
#[derive(Debug)]
pub struct CountingRead<R> {
    inner: R,
    stats: Arc<PayloadStatistics>,
    direction: PayloadDirection,
}

impl<R: Read> CountingRead<R> {
    /// Wraps a reader, attributing its bytes to `stats` in `direction`.
    pub fn new(inner: R, stats: Arc<PayloadStatistics>, direction: PayloadDirection) -> Self {
        Self {
            inner,
            stats,
            direction,
        }
    }

    /// Consumes the decorator, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let count = self.inner.read(buf)?;
        self.stats.add_bytes(self.direction, count as u64);
        Ok(count)
    }
}

/// An iterator decorator that counts objects as the wrapped iterator is
/// consumed.
#[derive(Debug)]
pub struct CountingIter<I> {
    inner: I,
    stats: Arc<PayloadStatistics>,
    direction: PayloadDirection,
}

impl<I: Iterator> CountingIter<I> {
    /// Wraps an iterator, attributing its items to `stats` in `direction`.
    pub fn new(inner: I, stats: Arc<PayloadStatistics>, direction: PayloadDirection) -> Self {
        Self {
            inner,
            stats,
            direction,
        }
    }
}

impl<I: Iterator> Iterator for CountingIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next();
        if item.is_some() {
            self.stats.add_objects(self.direction, 1);
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
