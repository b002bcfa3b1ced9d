//! # Filtered Streams
//!
//! Adapters attaching a [`FilterChain`] to `std::io` readers and writers.
//! They decide when a pass is a regular one, an incremental flush or the
//! closing pass.

use crate::filter::chain::FilterChain;
use crate::types::buckets::BucketBrigade;
use crate::types::filters::FlushMode;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

/// A reader whose bytes pass through a filter chain.
///
/// The source is read `chunk_size` bytes at a time. Reaching end of input
/// runs the closing pass once, so filters holding data back get to release
/// it.
#[derive(Debug)]
pub struct FilteredReader<R> {
    inner: R,
    chain: FilterChain,
    pending: Vec<u8>,
    position: usize,
    eof: bool,
}

impl<R: Read> FilteredReader<R> {
    /// Wrap `inner`, filtering through `chain`
    pub fn new(inner: R, chain: FilterChain) -> Self {
        Self {
            inner,
            chain,
            pending: Vec::new(),
            position: 0,
            eof: false,
        }
    }

    /// The attached chain
    pub fn get_chain(&self) -> &FilterChain {
        &self.chain
    }

    /// The attached chain, for adding or removing filters mid-stream
    pub fn get_chain_mut(&mut self) -> &mut FilterChain {
        &mut self.chain
    }

    /// Get a reference to the source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the source. Filtered bytes not yet read are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut chunk = vec![0u8; self.chain.config().chunk_size];

        while !self.eof {
            let read = match self.inner.read(&mut chunk) {
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let bytes = if read == 0 {
                self.eof = true;
                debug!(chain = %self.chain.config().name, "source exhausted, closing chain");
                self.chain.close()?
            } else {
                let input = BucketBrigade::from_bytes(chunk[..read].to_vec());
                self.chain.run(input, FlushMode::Normal)?.into_bytes()
            };

            if !bytes.is_empty() {
                self.pending = bytes;
                self.position = 0;
                break;
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for FilteredReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.position >= self.pending.len() {
            self.pending.clear();
            self.position = 0;
            self.fill()?;
        }

        let available = &self.pending[self.position..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.position += n;
        Ok(n)
    }
}

/// A writer whose bytes pass through a filter chain before reaching the sink.
///
/// Call [`finish`](Self::finish) to run the closing pass and get the sink
/// back. Dropping an unfinished writer closes the chain on a best-effort
/// basis.
#[derive(Debug)]
pub struct FilteredWriter<W: Write> {
    inner: Option<W>,
    chain: FilterChain,
}

impl<W: Write> FilteredWriter<W> {
    /// Wrap `inner`, filtering through `chain`
    pub fn new(inner: W, chain: FilterChain) -> Self {
        Self {
            inner: Some(inner),
            chain,
        }
    }

    /// The attached chain
    pub fn get_chain(&self) -> &FilterChain {
        &self.chain
    }

    /// The attached chain, for adding filters mid-stream
    pub fn get_chain_mut(&mut self) -> &mut FilterChain {
        &mut self.chain
    }

    /// Get a reference to the sink
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Detach a filter, writing whatever it flushes on the way out
    pub fn remove_filter(&mut self, name: &str) -> io::Result<()> {
        let bytes = self.chain.remove(name)?;
        self.write_to_sink(&bytes)
    }

    /// Run the closing pass, flush the sink and return it
    pub fn finish(mut self) -> io::Result<W> {
        let bytes = self.chain.close()?;
        self.write_to_sink(&bytes)?;

        let mut inner = self.take_sink()?;
        inner.flush()?;
        Ok(inner)
    }

    fn take_sink(&mut self) -> io::Result<W> {
        self.inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sink already taken"))
    }

    fn write_to_sink(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        match self.inner.as_mut() {
            Some(inner) => inner.write_all(bytes),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink already taken")),
        }
    }
}

impl<W: Write> Write for FilteredWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let result = self
            .chain
            .run(BucketBrigade::from_bytes(buf.to_vec()), FlushMode::Normal)?;
        self.write_to_sink(&result.into_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.chain.run(BucketBrigade::new(), FlushMode::FlushInc)?;
        self.write_to_sink(&result.into_bytes())?;

        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for FilteredWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_none() || self.chain.is_closed() {
            return;
        }

        let result = self
            .chain
            .close()
            .map_err(io::Error::from)
            .and_then(|bytes| self.write_to_sink(&bytes));
        if let Err(e) = result {
            warn!(chain = %self.chain.config().name, error = %e, "failed to close filtered writer");
        }
    }
}
