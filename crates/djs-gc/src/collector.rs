//! Tracing mark-sweep over a [`Heap`].

use std::collections::VecDeque;

use crate::heap::Heap;
use crate::object::{GcObject, ObjectId};

#[cfg(feature = "gc_logging")]
use tracing::debug;

/// Configuration for when the collector should run.
#[derive(Debug, Clone, Copy)]
pub struct GcConfig {
    /// Trigger a collection once `Heap::overhead()` reaches this many
    /// approximate bytes.
    pub overhead_threshold: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            overhead_threshold: 1024 * 1024,
        }
    }
}

/// Outcome of one collection cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcStats {
    /// Objects that survived (marked reachable).
    pub marked: usize,
    /// Objects reclaimed (were white and above the tenured watermark).
    pub swept: usize,
}

/// Whether `heap`'s overhead has crossed the configured threshold. The VM
/// checks this at return points, per §4.3.
pub fn should_collect<T: GcObject>(heap: &Heap<T>, config: &GcConfig) -> bool {
    heap.overhead() >= config.overhead_threshold
}

/// Run one full mark-sweep cycle.
///
/// `roots` is the caller-supplied root set: every `Value` cell live on the
/// operand stack, plus the `capture-env` of every active call frame (§4.3).
/// Marking is breadth-first over each object's `trace` edges; sweeping
/// reclaims every white slot whose id is strictly above the tenured
/// watermark, returning those slots to the freelist.
pub fn collect<T: GcObject>(heap: &mut Heap<T>, roots: &[ObjectId]) -> GcStats {
    heap.bump_mark_version();

    let mut worklist: VecDeque<ObjectId> = VecDeque::new();
    for &root in roots {
        if !heap.is_marked(root) {
            heap.set_marked(root);
            worklist.push_back(root);
        }
    }

    let mut marked = 0usize;
    while let Some(id) = worklist.pop_front() {
        marked += 1;
        let mut children = Vec::new();
        heap.trace_of(id, &mut |child| children.push(child));
        for child in children {
            if !heap.is_marked(child) {
                heap.set_marked(child);
                worklist.push_back(child);
            }
        }
    }

    let watermark = heap.tenured_watermark();
    let dead: Vec<ObjectId> = heap
        .live_ids()
        .filter(|id| id.index() >= watermark && !heap.is_marked(*id))
        .collect();
    let swept = dead.len();
    for id in dead {
        heap.remove(id);
    }

    #[cfg(feature = "gc_logging")]
    debug!(marked, swept, "gc cycle complete");

    GcStats { marked, swept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GcObject;

    struct Node {
        children: Vec<ObjectId>,
    }
    impl GcObject for Node {
        fn trace(&self, mark: &mut dyn FnMut(ObjectId)) {
            for &c in &self.children {
                mark(c);
            }
        }
        fn approx_size(&self) -> usize {
            16
        }
    }

    #[test]
    fn unreachable_objects_are_swept() {
        let mut heap: Heap<Node> = Heap::new(8);
        let leaf = heap.add(Node { children: vec![] }).unwrap();
        let root = heap
            .add(Node {
                children: vec![leaf],
            })
            .unwrap();
        let orphan = heap.add(Node { children: vec![] }).unwrap();

        let stats = collect(&mut heap, &[root]);
        assert_eq!(stats.marked, 2); // root + leaf
        assert_eq!(stats.swept, 1); // orphan
        assert!(heap.get(orphan).is_none());
        assert!(heap.get(root).is_some());
        assert!(heap.get(leaf).is_some());
    }

    #[test]
    fn tenured_objects_survive_without_roots() {
        let mut heap: Heap<Node> = Heap::new(8);
        let native = heap.add(Node { children: vec![] }).unwrap();
        heap.tenure_up_to(native);

        let stats = collect(&mut heap, &[]);
        assert_eq!(stats.swept, 0);
        assert!(heap.get(native).is_some());
    }

    #[test]
    fn cycles_are_collected() {
        let mut heap: Heap<Node> = Heap::new(8);
        let a = heap.add(Node { children: vec![] }).unwrap();
        let b = heap
            .add(Node { children: vec![a] })
            .unwrap();
        heap.get_mut(a).unwrap().children.push(b); // a <-> b cycle, unreachable from roots

        let stats = collect(&mut heap, &[]);
        assert_eq!(stats.swept, 2);
        assert!(heap.get(a).is_none());
        assert!(heap.get(b).is_none());
    }

    #[test]
    fn threshold_trips_as_expected() {
        let mut heap: Heap<Node> = Heap::new(8);
        heap.add(Node { children: vec![] }).unwrap();
        let config = GcConfig {
            overhead_threshold: 8,
        };
        assert!(should_collect(&heap, &config));
        let config = GcConfig {
            overhead_threshold: 1_000_000,
        };
        assert!(!should_collect(&heap, &config));
    }
}
