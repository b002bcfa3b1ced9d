//! # Stock Filters
//!
//! Ready-made filters registered by [`FilterRegistry::with_builtins`].
//!
//! [`FilterRegistry::with_builtins`]: crate::filter::registry::FilterRegistry::with_builtins

use crate::filter::default::StreamFilter;
use crate::types::buckets::BucketBrigade;
use crate::types::filters::{FilterState, FilterStatus};

/// Apply `f` to every byte of every input bucket, in place
fn map_bytes(
    input: &mut BucketBrigade,
    output: &mut BucketBrigade,
    consumed: &mut usize,
    f: impl Fn(u8) -> u8,
) -> FilterStatus {
    while let Some(mut bucket) = input.make_writeable() {
        *consumed += bucket.len();
        for byte in bucket.data_mut().iter_mut() {
            *byte = f(*byte);
        }
        output.append(bucket);
    }

    FilterStatus::PassOn
}

fn rot13(byte: u8) -> u8 {
    match byte {
        b'a'..=b'z' => (byte - b'a' + 13) % 26 + b'a',
        b'A'..=b'Z' => (byte - b'A' + 13) % 26 + b'A',
        _ => byte,
    }
}

macro_rules! byte_filter {
    ($(#[$doc:meta])* $name:ident, $f:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            state: FilterState,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl StreamFilter for $name {
            fn state(&self) -> &FilterState {
                &self.state
            }

            fn state_mut(&mut self) -> &mut FilterState {
                &mut self.state
            }

            fn filter(
                &mut self,
                input: &mut BucketBrigade,
                output: &mut BucketBrigade,
                consumed: &mut usize,
                _closing: bool,
            ) -> FilterStatus {
                map_bytes(input, output, consumed, $f)
            }
        }
    };
}

byte_filter!(
    /// `string.toupper`: ASCII upper-casing
    ToUpperFilter,
    |b: u8| b.to_ascii_uppercase()
);

byte_filter!(
    /// `string.tolower`: ASCII lower-casing
    ToLowerFilter,
    |b: u8| b.to_ascii_lowercase()
);

byte_filter!(
    /// `string.rot13`: rotates ASCII letters by 13 places
    Rot13Filter,
    rot13
);

/// `buffer.accumulate`: holds everything back until the closing pass, then
/// emits it as a single bucket.
#[derive(Debug, Default)]
pub struct AccumulateFilter {
    state: FilterState,
    pending: Vec<u8>,
}

impl AccumulateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back so far
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl StreamFilter for AccumulateFilter {
    fn state(&self) -> &FilterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn filter(
        &mut self,
        input: &mut BucketBrigade,
        output: &mut BucketBrigade,
        consumed: &mut usize,
        closing: bool,
    ) -> FilterStatus {
        while let Some(bucket) = input.make_writeable() {
            *consumed += bucket.len();
            self.pending.extend_from_slice(bucket.data());
        }

        if !closing {
            return FilterStatus::FeedMe;
        }

        if !self.pending.is_empty() {
            output.append(std::mem::take(&mut self.pending).into());
        }
        FilterStatus::PassOn
    }
}
