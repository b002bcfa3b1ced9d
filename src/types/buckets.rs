//! # Bucket Type Definitions
//!
//! This module defines buckets and bucket brigades, the units of data moved
//! through a filter chain.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A contiguous chunk of bytes moving through a filter chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket data
    data: Vec<u8>,
}

impl Bucket {
    /// Create a new bucket holding `data`
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the bucket data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable reference to the data
    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Replace the bucket data, returning the old data
    pub fn set_data(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.data, data)
    }

    /// Get the bucket length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the bucket is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the bucket, returning its bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for Bucket {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Bucket {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl From<&str> for Bucket {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes().to_vec())
    }
}

/// An ordered sequence of buckets available to one filter invocation.
///
/// Buckets leave a brigade through [`make_writeable`](Self::make_writeable)
/// and enter one through [`append`](Self::append) or
/// [`prepend`](Self::prepend). Once drained, a brigade stays at end of
/// brigade until something is appended again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketBrigade {
    buckets: VecDeque<Bucket>,
}

impl BucketBrigade {
    /// Create an empty brigade
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a brigade holding a single bucket with `data`.
    ///
    /// Empty input yields an empty brigade rather than one empty bucket.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let mut brigade = Self::new();
        if !data.is_empty() {
            brigade.append(Bucket::new(data));
        }
        brigade
    }

    /// Append a bucket at the tail
    pub fn append(&mut self, bucket: Bucket) {
        self.buckets.push_back(bucket);
    }

    /// Insert a bucket at the head
    pub fn prepend(&mut self, bucket: Bucket) {
        self.buckets.push_front(bucket);
    }

    /// Take the next bucket out of the brigade.
    ///
    /// Returns `None` at end of brigade, and keeps returning `None` on
    /// further calls.
    pub fn make_writeable(&mut self) -> Option<Bucket> {
        self.buckets.pop_front()
    }

    /// End of brigade: no bucket left to take
    pub fn eob(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the brigade holds no bucket
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of bytes across all buckets
    pub fn total_len(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Iterate over the buckets in order
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Move every bucket of `other` to the tail of this brigade
    pub fn append_brigade(&mut self, other: &mut BucketBrigade) {
        self.buckets.append(&mut other.buckets);
    }

    /// Drop every bucket
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Concatenate all buckets into one byte vector
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for bucket in self.buckets {
            out.extend_from_slice(bucket.data());
        }
        out
    }
}

impl FromIterator<Bucket> for BucketBrigade {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        Self {
            buckets: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BucketBrigade {
    type Item = Bucket;
    type IntoIter = std::collections::vec_deque::IntoIter<Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}
