//! # Filter Chain
//!
//! This module drives an ordered list of filters attached to one stream.
//! Each pass hands a bucket brigade to the head filter and feeds every
//! filter's output to the next one. The chain also enforces the filter
//! lifecycle: `on_create` on attach, `on_close` exactly once at teardown.

use crate::error::{ChainError, ChainResult, FilterResult};
use crate::filter::default::StreamFilter;
use crate::filter::registry::FilterRegistry;
use crate::types::buckets::BucketBrigade;
use crate::types::chains::{ChainConfig, FilterLifecycle, PassResult};
use crate::types::filters::{FilterConfig, FilterStatus, FlushMode, StreamHandle};
use std::fmt;
use tracing::{debug, trace, warn};

/// A filter attached to a chain, with its lifecycle
struct ChainNode {
    filter: Box<dyn StreamFilter>,
    lifecycle: FilterLifecycle,
}

impl ChainNode {
    fn invoke(
        &mut self,
        stream: &StreamHandle,
        input: &mut BucketBrigade,
        output: &mut BucketBrigade,
        consumed: &mut usize,
        closing: bool,
    ) -> FilterStatus {
        if !closing {
            self.filter.state_mut().set_stream(Some(stream.clone()));
        }
        let status = self.filter.filter(input, output, consumed, closing);
        self.filter.state_mut().set_stream(None);

        self.lifecycle = if closing {
            FilterLifecycle::Flushing
        } else {
            FilterLifecycle::Filtering
        };
        status
    }

    fn close(&mut self) {
        if self.lifecycle != FilterLifecycle::Closed {
            self.filter.on_close();
            self.lifecycle = FilterLifecycle::Closed;
        }
    }
}

/// Ordered filters attached to a single stream
pub struct FilterChain {
    config: ChainConfig,
    stream: StreamHandle,
    nodes: Vec<ChainNode>,
    closed: bool,
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("config", &self.config)
            .field("stream", &self.stream)
            .field("filters", &self.names())
            .field("closed", &self.closed)
            .finish()
    }
}

impl FilterChain {
    /// Create an empty chain attached to `stream`
    pub fn new(config: ChainConfig, stream: StreamHandle) -> ChainResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            stream,
            nodes: Vec::new(),
            closed: false,
        })
    }

    /// Chain configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The stream this chain filters
    pub fn stream(&self) -> &StreamHandle {
        &self.stream
    }

    /// Number of attached filters
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no filter is attached
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether [`close`](Self::close) already ran
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Names of the attached filters, head first
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.filter.name()).collect()
    }

    /// Lifecycle of the first filter named `name`
    pub fn lifecycle(&self, name: &str) -> Option<FilterLifecycle> {
        self.position(name).map(|i| self.nodes[i].lifecycle)
    }

    /// Attach a filter at the tail
    pub fn append(&mut self, filter: Box<dyn StreamFilter>) -> ChainResult<()> {
        let index = self.nodes.len();
        self.attach(index, filter)
    }

    /// Attach a filter at the head
    pub fn prepend(&mut self, filter: Box<dyn StreamFilter>) -> ChainResult<()> {
        self.attach(0, filter)
    }

    /// Build a filter from `registry` and attach it at the tail
    pub fn append_by_name(&mut self, registry: &FilterRegistry, config: &FilterConfig) -> FilterResult<()> {
        let filter = registry.create(&config.name, config.parameters.clone())?;
        self.append(filter)?;
        Ok(())
    }

    /// Build a filter from `registry` and attach it at the head
    pub fn prepend_by_name(&mut self, registry: &FilterRegistry, config: &FilterConfig) -> FilterResult<()> {
        let filter = registry.create(&config.name, config.parameters.clone())?;
        self.prepend(filter)?;
        Ok(())
    }

    fn attach(&mut self, index: usize, mut filter: Box<dyn StreamFilter>) -> ChainResult<()> {
        if self.closed {
            return Err(ChainError::Closed {
                chain: self.config.name.clone(),
            });
        }
        if self.nodes.len() >= self.config.max_filters {
            return Err(ChainError::TooManyFilters {
                count: self.nodes.len() + 1,
                max: self.config.max_filters,
            });
        }
        if !filter.on_create() {
            return Err(ChainError::CreateFailed {
                filter: filter.name().to_string(),
            });
        }

        debug!(
            chain = %self.config.name,
            filter = filter.name(),
            position = index,
            "attached filter"
        );
        self.nodes.insert(
            index,
            ChainNode {
                filter,
                lifecycle: FilterLifecycle::Attached,
            },
        );
        Ok(())
    }

    /// Detach the first filter named `name`.
    ///
    /// The filter gets a closing pass of its own; whatever it flushes is run
    /// through the filters downstream of it and returned. `on_close` runs
    /// before this returns, even when the flush fails.
    pub fn remove(&mut self, name: &str) -> ChainResult<Vec<u8>> {
        if self.closed {
            return Err(ChainError::Closed {
                chain: self.config.name.clone(),
            });
        }
        let index = self.position(name).ok_or_else(|| ChainError::NotAttached {
            filter: name.to_string(),
        })?;

        let mut node = self.nodes.remove(index);
        let mut input = BucketBrigade::new();
        let mut output = BucketBrigade::new();
        let mut consumed = 0;
        let status = node.invoke(&self.stream, &mut input, &mut output, &mut consumed, true);
        node.close();
        debug!(chain = %self.config.name, filter = name, "removed filter");

        match status {
            FilterStatus::PassOn => Ok(self.drive(index, output, FlushMode::Normal)?.into_bytes()),
            FilterStatus::FeedMe => Ok(Vec::new()),
            FilterStatus::FatalError => Err(ChainError::Fatal {
                filter: name.to_string(),
            }),
        }
    }

    /// Run one pass over the whole chain.
    ///
    /// Filters see `closing = true` only for [`FlushMode::FlushClose`].
    pub fn run(&mut self, input: BucketBrigade, mode: FlushMode) -> ChainResult<PassResult> {
        if self.closed {
            return Err(ChainError::Closed {
                chain: self.config.name.clone(),
            });
        }
        self.drive(0, input, mode)
    }

    /// Run the closing pass, then `on_close` on every filter.
    ///
    /// Returns the bytes flushed by the closing pass. Calling `close` again
    /// returns nothing.
    pub fn close(&mut self) -> ChainResult<Vec<u8>> {
        if self.closed {
            return Ok(Vec::new());
        }

        let result = self.drive(0, BucketBrigade::new(), FlushMode::FlushClose);
        for node in &mut self.nodes {
            node.close();
        }
        self.closed = true;
        debug!(chain = %self.config.name, "closed chain");

        Ok(result?.into_bytes())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.filter.name() == name)
    }

    fn drive(&mut self, start: usize, input: BucketBrigade, mode: FlushMode) -> ChainResult<PassResult> {
        let closing = mode.is_closing();
        let mut brigade = input;
        let mut head_consumed = brigade.total_len();

        for (offset, node) in self.nodes[start..].iter_mut().enumerate() {
            let available = brigade.total_len();
            let mut output = BucketBrigade::new();
            let mut consumed = 0;
            let status = node.invoke(&self.stream, &mut brigade, &mut output, &mut consumed, closing);

            if self.config.verify_consumed && consumed > available {
                return Err(ChainError::ConsumedOverflow {
                    filter: node.filter.name().to_string(),
                    consumed,
                    available,
                });
            }
            if offset == 0 {
                head_consumed = consumed;
            }

            match status {
                FilterStatus::PassOn => brigade = output,
                FilterStatus::FeedMe => {
                    trace!(
                        chain = %self.config.name,
                        filter = node.filter.name(),
                        "filter needs more input"
                    );
                    return Ok(PassResult {
                        status,
                        consumed: head_consumed,
                        output: BucketBrigade::new(),
                    });
                }
                FilterStatus::FatalError => {
                    warn!(
                        chain = %self.config.name,
                        filter = node.filter.name(),
                        "filter failed"
                    );
                    return Err(ChainError::Fatal {
                        filter: node.filter.name().to_string(),
                    });
                }
            }
        }

        trace!(
            chain = %self.config.name,
            mode = ?mode,
            consumed = head_consumed,
            produced = brigade.total_len(),
            "pass complete"
        );
        Ok(PassResult {
            status: FilterStatus::PassOn,
            consumed: head_consumed,
            output: brigade,
        })
    }
}

impl Drop for FilterChain {
    fn drop(&mut self) {
        // Teardown without close() skips the closing pass but not on_close
        for node in &mut self.nodes {
            node.close();
        }
    }
}
