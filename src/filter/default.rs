//! # Default Filter
//!
//! The [`StreamFilter`] trait every filter implements, with a pass-through
//! `filter` body so concrete filters only override the transformation step.

use crate::types::buckets::BucketBrigade;
use crate::types::filters::{FilterState, FilterStatus, StreamHandle};
use serde_json::Value;

/// A filter invoked by a chain whenever bytes pass through the attached
/// stream.
///
/// Implementors expose their [`FilterState`] and usually override
/// [`filter`](Self::filter) only. Everything else has a working default.
pub trait StreamFilter: Send {
    /// Shared filter state
    fn state(&self) -> &FilterState;

    /// Mutable shared filter state
    fn state_mut(&mut self) -> &mut FilterState;

    /// Filter data.
    ///
    /// Called whenever data is read from or written to the attached stream.
    /// Buckets are taken from `input`, transformed, and appended to
    /// `output`. `consumed` must be incremented by the number of input bytes
    /// read. `closing` is set on the last pass before the stream closes.
    ///
    /// The default copies every bucket through unchanged and returns
    /// [`FilterStatus::PassOn`].
    fn filter(
        &mut self,
        input: &mut BucketBrigade,
        output: &mut BucketBrigade,
        consumed: &mut usize,
        _closing: bool,
    ) -> FilterStatus {
        pass_through(input, output, consumed)
    }

    /// Called once when the filter is attached. Returning `false` aborts
    /// the attach.
    fn on_create(&mut self) -> bool {
        true
    }

    /// Called once at teardown, after the closing pass.
    fn on_close(&mut self) {}

    /// Set the filter name, returning the previous one
    fn set_name(&mut self, name: String) -> String {
        self.state_mut().set_name(name)
    }

    /// Get the filter name
    fn name(&self) -> &str {
        self.state().name()
    }

    /// Set the filter parameters, returning the previous value
    fn set_parameters(&mut self, parameters: Value) -> Value {
        self.state_mut().set_parameters(parameters)
    }

    /// Get the filter parameters
    fn parameters(&self) -> &Value {
        self.state().parameters()
    }

    /// Get the stream being filtered.
    ///
    /// Only available during a `filter` call with `closing = false`.
    fn stream(&self) -> Option<&StreamHandle> {
        self.state().stream()
    }
}

/// Move every bucket of `input` to `output`, counting the bytes in
/// `consumed`.
pub fn pass_through(
    input: &mut BucketBrigade,
    output: &mut BucketBrigade,
    consumed: &mut usize,
) -> FilterStatus {
    while let Some(bucket) = input.make_writeable() {
        *consumed += bucket.len();
        output.append(bucket);
    }

    FilterStatus::PassOn
}

/// Identity filter relying entirely on the trait defaults
#[derive(Debug, Default)]
pub struct PassThroughFilter {
    state: FilterState,
}

impl PassThroughFilter {
    /// Create a new pass-through filter
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamFilter for PassThroughFilter {
    fn state(&self) -> &FilterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }
}
