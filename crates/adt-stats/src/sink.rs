//! The `StatsSink` trait and in-process sink implementations.
//!
//! The sink is an external collaborator: the toolkit defines what it sends
//! (name, value, aggregation hint) but not how the sink stores or exports
//! it.  The demo binary ships a CSV-backed sink; tests use [`MemorySink`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use adt_core::BoxError;

/// How the downstream consumer should combine repeated observations of the
/// same name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aggregation {
    Sum,
    Average,
    MostRecent,
    /// Keep every observation (min/max/mean are derived downstream).
    Histogram,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Aggregation::Sum        => "sum",
            Aggregation::Average    => "average",
            Aggregation::MostRecent => "most_recent",
            Aggregation::Histogram  => "histogram",
        };
        f.write_str(s)
    }
}

/// Destination for flushed statistics.
pub trait StatsSink {
    /// Accept one observation.
    fn record(&mut self, name: &str, value: f64, aggregation: Aggregation) -> Result<(), BoxError>;
}

impl<S: StatsSink + ?Sized> StatsSink for Box<S> {
    fn record(&mut self, name: &str, value: f64, aggregation: Aggregation) -> Result<(), BoxError> {
        (**self).record(name, value, aggregation)
    }
}

// ── NoopSink ──────────────────────────────────────────────────────────────────

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StatsSink for NoopSink {
    fn record(&mut self, _name: &str, _value: f64, _aggregation: Aggregation) -> Result<(), BoxError> {
        Ok(())
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// One observation as received by a [`MemorySink`].
#[derive(Clone, Debug, PartialEq)]
pub struct StatRecord {
    pub name:        String,
    pub value:       f64,
    pub aggregation: Aggregation,
}

/// Keeps every observation in arrival order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<StatRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All values recorded under `name`, oldest first.
    pub fn values(&self, name: &str) -> Vec<f64> {
        self.records.iter().filter(|r| r.name == name).map(|r| r.value).collect()
    }

    /// The most recent observation under `name`.
    pub fn last(&self, name: &str) -> Option<&StatRecord> {
        self.records.iter().rev().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl StatsSink for MemorySink {
    fn record(&mut self, name: &str, value: f64, aggregation: Aggregation) -> Result<(), BoxError> {
        self.records.push(StatRecord { name: name.to_owned(), value, aggregation });
        Ok(())
    }
}

// ── SharedSink ────────────────────────────────────────────────────────────────

/// A sink shared by several aggregators (one per agent, plus the
/// process-wide one).  Clones write to the same underlying sink.
pub struct SharedSink<S>(Rc<RefCell<S>>);

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self(Rc::new(RefCell::new(sink)))
    }

    /// Borrow the underlying sink, e.g. to inspect a `MemorySink`.
    pub fn borrow(&self) -> std::cell::Ref<'_, S> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, S> {
        self.0.borrow_mut()
    }
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S: StatsSink> StatsSink for SharedSink<S> {
    fn record(&mut self, name: &str, value: f64, aggregation: Aggregation) -> Result<(), BoxError> {
        let mut sink = self
            .0
            .try_borrow_mut()
            .map_err(|_| BoxError::from("shared stats sink is already borrowed"))?;
        sink.record(name, value, aggregation)
    }
}
