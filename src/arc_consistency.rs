//! AC-3 over directed arcs between crossing slots.

use std::collections::VecDeque;

use bit_set::BitSet;
use log::trace;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};

/// A directed constraint between two crossing slots, meaning "remove options from `x` that have
/// no support in `y`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arc {
    pub x: SlotId,
    pub y: SlotId,
}

impl Arc {
    pub fn new(x: SlotId, y: SlotId) -> Arc {
        Arc { x, y }
    }
}

/// Every arc in the grid, ordered by `x` and then `y`.
pub fn all_arcs(config: &GridConfig) -> Vec<Arc> {
    config.slot_configs.iter().flat_map(|slot_config| {
        slot_config.neighbors.iter().map(move |&y| Arc::new(slot_config.id, y))
    }).collect()
}

/// FIFO of arcs waiting to be revised. An arc that's already waiting isn't added a second time,
/// since revising it once will account for every change made before it's popped.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<Arc>,
    queued: BitSet,
    slot_count: usize,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(slot_count: usize, items: Items) -> ConsistencyQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ConsistencyQueue {
            queue: VecDeque::new(),
            queued: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn key(&self, arc: Arc) -> usize {
        arc.x * self.slot_count + arc.y
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.queued.remove(key);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        let key = self.key(arc);
        if self.queued.insert(key) {
            self.queue.push_back(arc);
        }
    }
}

/// Results from a call to `establish_arc_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised, whether or not they removed anything.
    pub revisions: usize,
    pub eliminations: usize,
}

/// Propagation left a slot with no options, so no fill is consistent with the domains we started
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub emptied_slot_id: SlotId,
    pub revisions: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every option for `arc.x` whose letter at the crossing doesn't appear at the crossing in
/// any option for `arc.y`, returning how many were removed. We collect `y`'s letters first so
/// this is linear in the size of the two domains rather than their product.
pub fn eliminate_unsupported(config: &GridConfig, domains: &mut Domains, arc: Arc) -> usize {
    let Some((x_cell, y_cell)) = config.overlap(arc.x, arc.y) else {
        return 0;
    };

    let word_list = &config.word_list;
    let supported_glyphs = domains.glyphs_at(word_list, arc.y, y_cell);

    domains.get_mut(arc.x).retain(word_list, |word| supported_glyphs.contains(word.glyphs[x_cell]))
}

/// Make `arc.x` arc-consistent with `arc.y`. Returns true if `arc.x`'s domain changed.
pub fn revise(config: &GridConfig, domains: &mut Domains, arc: Arc) -> bool {
    eliminate_unsupported(config, domains, arc) > 0
}

/// Run AC-3 until no arc can remove anything. If `initial_arcs` is None we start from every arc
/// in the grid; otherwise only from the ones given, although propagation can still reach any
/// slot. Stops as soon as any domain is emptied.
pub fn establish_arc_consistency(
    config: &GridConfig,
    domains: &mut Domains,
    initial_arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let initial_arcs = initial_arcs.unwrap_or_else(|| all_arcs(config));
    let mut queue = ConsistencyQueue::with_initial_queue(config.slot_count(), initial_arcs);
    let mut revisions = 0;
    let mut eliminations = 0;

    while let Some(arc) = queue.pop_front() {
        revisions += 1;

        let eliminated = eliminate_unsupported(config, domains, arc);
        if eliminated == 0 {
            continue;
        }
        eliminations += eliminated;

        if domains.is_empty(arc.x) {
            trace!("arc consistency emptied slot {}", config.slot(arc.x));
            return Err(ArcConsistencyFailure { emptied_slot_id: arc.x, revisions });
        }

        // `x` shrank, so every other slot crossing it needs to be rechecked against it.
        for &z in config.neighbors(arc.x) {
            if z != arc.y {
                queue.enqueue(Arc::new(z, arc.x));
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions, eliminations })
}
