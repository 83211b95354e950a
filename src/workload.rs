//! Key scheme and chunk planning for the bulk benchmarks.
//!
//! Keys are namespaced by a per-run prefix so repeated runs never collide:
//! `key:<prefix>_<index>` maps to `value:<index>`.

use crate::error::{Error, Result};
use std::ops::Range;

/// Key written or read for operation `i` of the run identified by `prefix`.
#[inline]
pub fn key(prefix: &str, i: usize) -> String {
    format!("key:{}_{}", prefix, i)
}

/// Value stored for operation `i`.
#[inline]
pub fn value(i: usize) -> String {
    format!("value:{}", i)
}

// ---------------------------------------------------------------------------
// Chunk planning
// ---------------------------------------------------------------------------

/// Partition of `total` operations into chunks of at most `max_batch`.
///
/// The scripting engine caps the number of parameters per invocation, so a
/// scripted batch is split into `ceil(total / max_batch)` evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: usize,
    max_batch: usize,
}

impl ChunkPlan {
    pub fn new(total: usize, max_batch: usize) -> Result<Self> {
        if max_batch == 0 {
            return Err(Error::InvalidBatchSize(max_batch));
        }
        Ok(Self { total, max_batch })
    }

    /// Number of script evaluations needed.
    pub fn chunks(&self) -> usize {
        self.total.div_ceil(self.max_batch)
    }

    /// Operation index range covered by chunk `chunk`.
    pub fn range(&self, chunk: usize) -> Range<usize> {
        let start = chunk * self.max_batch;
        let end = (start + self.max_batch).min(self.total);
        start..end
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.chunks()).map(move |c| self.range(c))
    }
}

/// Positional arguments for one scripted-batch evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArgs {
    pub keys: Vec<String>,
    /// `args[0]` is the chunk length; the rest line up with `keys`.
    pub args: Vec<String>,
}

impl ScriptArgs {
    /// Arguments for the batch SET script over `range`.
    pub fn for_set(prefix: &str, range: Range<usize>) -> Self {
        let len = range.len();
        let mut keys = Vec::with_capacity(len);
        let mut args = Vec::with_capacity(len + 1);
        args.push(len.to_string());
        for i in range {
            keys.push(key(prefix, i));
            args.push(value(i));
        }
        Self { keys, args }
    }

    /// Arguments for the batch GET script over `range`. Value slots carry
    /// empty placeholders.
    pub fn for_get(prefix: &str, range: Range<usize>) -> Self {
        let len = range.len();
        let mut keys = Vec::with_capacity(len);
        let mut args = Vec::with_capacity(len + 1);
        args.push(len.to_string());
        for i in range {
            keys.push(key(prefix, i));
            args.push(String::new());
        }
        Self { keys, args }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Reads the chunk length carried in `args[0]`.
pub fn declared_len(args: &[String]) -> Result<usize> {
    let first = args
        .first()
        .ok_or_else(|| Error::ScriptReply("missing chunk length argument".into()))?;
    first
        .parse()
        .map_err(|_| Error::ScriptReply(format!("chunk length is not a number: {:?}", first)))
}
