use petgraph::stable_graph::NodeIndex;
use std::collections::BTreeMap;
use std::collections::VecDeque;

/// BFS frontier bucketed by tree depth: pops come from the shallowest
/// non-empty bucket, FIFO within it.
#[derive(Debug, Default)]
pub struct Frontier {
    buckets: BTreeMap<u64, VecDeque<NodeIndex>>,
    len: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, depth: u64, index: NodeIndex) {
        self.buckets.entry(depth).or_default().push_back(index);
        self.len += 1;
    }

    pub fn front(&self) -> Option<NodeIndex> {
        self.buckets
            .values()
            .next()
            .and_then(|bucket| bucket.front())
            .copied()
    }

    pub fn pop_front(&mut self) -> Option<NodeIndex> {
        let (&depth, bucket) = self.buckets.iter_mut().next()?;
        let index = bucket.pop_front().expect("buckets are never left empty");
        if bucket.is_empty() {
            self.buckets.remove(&depth);
        }
        self.len -= 1;
        Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}
