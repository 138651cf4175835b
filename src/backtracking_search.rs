//! Grid filling as chronological backtracking search. Variables are chosen with the
//! minimum-remaining-values heuristic (ties broken by degree), values are tried
//! least-constraining first, and every tentative choice is followed by forward checking. Domains
//! are snapshotted by value before each choice and restored wholesale when it fails, so no pruning
//! done under one branch is ever visible to a sibling branch.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

use instant::{Duration, Instant};
use log::{debug, trace};

use crate::arc_consistency::{establish_arc_consistency, eliminate_unsupported, Arc};
use crate::assignment::{is_consistent_extension, Assignment, Choice};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::WordId;

/// How many states should we visit between checks of the deadline and abort flag?
pub const INTERRUPT_FREQUENCY: usize = 10;

/// What to do after tentatively choosing a word for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Revise each unfilled crossing slot against the chosen slot once.
    #[default]
    ForwardChecking,

    /// Run full AC-3 starting from the arcs into the chosen slot.
    MaintainArcConsistency,
}

/// Knobs for a single fill attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions<'a> {
    /// Give up with `FillFailure::Timeout` once this much time has passed.
    pub timeout: Option<Duration>,
    pub propagation: Propagation,

    /// Give up with `FillFailure::Abort` once this is set.
    pub abort: Option<&'a AtomicBool>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub revisions: usize,
    pub initial_arc_consistency_time: Duration,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// Every possibility was ruled out; the grid can't be filled from these domains.
    HardFailure(Statistics),
    Timeout,
    Abort,

    /// The domains passed in weren't built for this grid config.
    InvalidDomains,
}

/// Choose the unfilled slot with the fewest remaining options, preferring slots that cross more
/// other slots when there's a tie (and then the lowest id).
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..config.slot_count())
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(config.neighbors(slot_id).len())))
}

/// Return the options for a slot ordered by how many options they'd rule out for the unfilled
/// slots crossing it, fewest first. Ties keep word list order.
pub fn order_values(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let word_list = &config.word_list;
    let bucket = word_list.words_of_length(config.slot(slot_id).length);

    // For each unfilled crossing, count how many of its options have each glyph at the shared
    // cell; a candidate then eliminates everything that doesn't have its glyph there.
    let crossing_counts: Vec<(usize, usize, Vec<usize>)> = config.neighbors(slot_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
        .filter_map(|&neighbor_id| {
            config.overlap(slot_id, neighbor_id).map(|(cell_idx, neighbor_cell_idx)| {
                (
                    cell_idx,
                    domains.len(neighbor_id),
                    domains.glyph_counts_at(word_list, neighbor_id, neighbor_cell_idx),
                )
            })
        })
        .collect();

    let mut values: Vec<WordId> = domains.iter(slot_id).collect();
    values.sort_by_cached_key(|&word_id| {
        let word = &bucket[word_id];
        crossing_counts.iter().map(|(cell_idx, total, glyph_counts)| {
            total - glyph_counts[word.glyphs[*cell_idx]]
        }).sum::<usize>()
    });
    values
}

/// Prune the domains of unfilled slots to account for `choice`, which must already be recorded in
/// `assignment` and `domains`. Returns false if any slot is left with no options. `revisions` is
/// incremented once per arc examined.
pub fn forward_check(
    config: &GridConfig,
    domains: &mut Domains,
    assignment: &Assignment,
    choice: Choice,
    propagation: Propagation,
    revisions: &mut usize,
) -> bool {
    // A word can only be used once, so it's no longer an option for any other slot of the same
    // length.
    let length = config.slot(choice.slot_id).length;
    for other_slot_id in 0..config.slot_count() {
        if other_slot_id == choice.slot_id
            || assignment.contains(other_slot_id)
            || config.slot(other_slot_id).length != length
        {
            continue;
        }
        if domains.remove(other_slot_id, choice.word_id) && domains.is_empty(other_slot_id) {
            trace!("{} ran out of options after duplicate pruning", config.slot(other_slot_id));
            return false;
        }
    }

    let arcs: Vec<Arc> = config.neighbors(choice.slot_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
        .map(|&neighbor_id| Arc::new(neighbor_id, choice.slot_id))
        .collect();

    match propagation {
        Propagation::ForwardChecking => {
            for arc in arcs {
                *revisions += 1;
                if eliminate_unsupported(config, domains, arc) > 0 && domains.is_empty(arc.x) {
                    trace!("{} ran out of options after forward checking", config.slot(arc.x));
                    return false;
                }
            }
            true
        }
        Propagation::MaintainArcConsistency => {
            match establish_arc_consistency(config, domains, Some(arcs)) {
                Ok(success) => {
                    *revisions += success.revisions;
                    true
                }
                Err(failure) => {
                    *revisions += failure.revisions;
                    false
                }
            }
        }
    }
}

/// The live state of a single fill attempt.
struct Search<'a> {
    config: &'a GridConfig,
    options: &'a FillOptions<'a>,
    deadline: Option<Instant>,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    fn check_interrupt(&self) -> Result<(), FillFailure> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout);
            }
        }
        if let Some(abort) = self.options.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(FillFailure::Abort);
            }
        }
        Ok(())
    }

    /// Try to extend `assignment` to a complete fill. Returns Ok(true) with `assignment` complete
    /// on success, and Ok(false) with `assignment` and the domains exactly as they were on entry
    /// if no extension exists.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        if assignment.is_complete() {
            return Ok(true);
        }

        self.statistics.states += 1;
        if self.statistics.states % INTERRUPT_FREQUENCY == 0 {
            self.check_interrupt()?;
        }

        let Some(slot_id) = select_unassigned_slot(self.config, &self.domains, assignment) else {
            return Ok(false);
        };
        let values = order_values(self.config, &self.domains, assignment, slot_id);

        trace!(
            "state {}: filling {} ({} options, {} of {} slots filled)",
            self.statistics.states,
            self.config.slot(slot_id),
            values.len(),
            assignment.len(),
            assignment.slot_count(),
        );

        for word_id in values {
            let choice = Choice { slot_id, word_id };
            if !is_consistent_extension(self.config, assignment, choice) {
                continue;
            }

            let snapshot = self.domains.clone();
            assignment.insert(slot_id, word_id);
            self.domains.restrict_to(slot_id, word_id);

            if forward_check(
                self.config,
                &mut self.domains,
                assignment,
                choice,
                self.options.propagation,
                &mut self.statistics.revisions,
            ) && self.backtrack(assignment)? {
                return Ok(true);
            }

            assignment.remove(slot_id);
            self.domains = snapshot;
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }
}

/// Search for a valid fill for the given grid, starting every slot with all words of the right
/// length.
pub fn find_fill(config: &GridConfig, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
    find_fill_with_domains(config, Domains::new(config), options)
}

/// Search for a valid fill for the given grid, choosing words only from the given domains. The
/// domains must have been built from `config` (see `Domains::fits`).
pub fn find_fill_with_domains(
    config: &GridConfig,
    mut domains: Domains,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    if !domains.fits(config) {
        debug!("domains don't match the {} slots in this grid", config.slot_count());
        return Err(FillFailure::InvalidDomains);
    }

    if let Some(slot_id) = domains.first_empty() {
        debug!("no candidate words for {}", config.slot(slot_id));
        statistics.duration = start.elapsed();
        return Err(FillFailure::HardFailure(statistics));
    }

    // Make the whole grid arc-consistent before choosing anything. If we can't even do that,
    // we're obviously not going to be able to find a fill.
    let arc_consistency_start = Instant::now();
    let arc_consistency_result = establish_arc_consistency(config, &mut domains, None);
    statistics.initial_arc_consistency_time = arc_consistency_start.elapsed();

    match arc_consistency_result {
        Ok(success) => {
            statistics.revisions += success.revisions;
            debug!(
                "initial arc consistency removed {} options in {:?}, {} remain",
                success.eliminations,
                statistics.initial_arc_consistency_time,
                domains.total_options(),
            );
        }
        Err(failure) => {
            statistics.revisions += failure.revisions;
            statistics.duration = start.elapsed();
            debug!(
                "initial arc consistency left {} with no options",
                config.slot(failure.emptied_slot_id),
            );
            return Err(FillFailure::HardFailure(statistics));
        }
    }

    let mut search = Search {
        config,
        options,
        deadline: options.timeout.map(|timeout| start + timeout),
        domains,
        statistics,
    };
    search.check_interrupt()?;

    let mut assignment = Assignment::new(config.slot_count());
    let found = search.backtrack(&mut assignment);
    let mut statistics = search.statistics;
    statistics.duration = start.elapsed();

    match found {
        Ok(true) => {
            debug!("found a fill: {:?}", statistics);
            Ok(FillSuccess { statistics, assignment })
        }
        Ok(false) => {
            debug!("search exhausted: {:?}", statistics);
            Err(FillFailure::HardFailure(statistics))
        }
        Err(failure) => {
            debug!("search interrupted ({:?}): {:?}", failure, statistics);
            Err(failure)
        }
    }
}
