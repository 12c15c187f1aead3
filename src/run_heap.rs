use std::cmp::Ordering;
use std::io::Read;

use crate::comparator::Comparator;
use crate::record::Record;
use crate::run_stream::RunStream;

/// Binary min-heap of run streams keyed by the buffered record of each stream.
///
/// Streams are never removed. An exhausted stream orders after every live one (see
/// [RunStream::cmp_head]), so when the root is exhausted all streams are.
pub(crate) struct RunHeap<R: Read> {
    streams: Vec<RunStream<R>>,
    column: usize,
    comparator: Comparator,
}

impl<R: Read> RunHeap<R> {
    pub(crate) fn new(streams: Vec<RunStream<R>>, column: usize, comparator: Comparator) -> RunHeap<R> {
        let mut heap = RunHeap {
            streams,
            column,
            comparator,
        };
        for i in (0..heap.streams.len() / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub(crate) fn len(&self) -> usize {
        self.streams.len()
    }

    /// Take the smallest buffered record across all streams.
    pub(crate) fn pop(&mut self) -> Result<Option<Record>, anyhow::Error> {
        let Some(root) = self.streams.first_mut() else {
            return Ok(None);
        };
        if root.is_exhausted() {
            return Ok(None);
        }
        let record = root.pop()?;
        self.sift_down(0);
        Ok(record)
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.streams[i].cmp_head(&self.streams[j], self.column, self.comparator) == Ordering::Less
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.streams.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut j = left;
            if right < len && self.less(right, left) {
                j = right;
            }
            if !self.less(j, i) {
                break;
            }
            self.streams.swap(i, j);
            i = j;
        }
    }
}
