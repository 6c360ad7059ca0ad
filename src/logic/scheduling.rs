//! Court scheduling: assign round-robin matches to (time slot, court) cells.
//!
//! Greedy, slot by slot. Within a slot, matches whose players have the fewest
//! matches placed so far go first, and no player is placed twice in one slot.
//! Matches left over after the configured grid spill into hourly slots past
//! the last one; after [`MAX_EXTRA_SLOTS`] of those the remainder is placed
//! without the conflict check and reported in [`Schedule::conflicts`].

use crate::models::{GameMatch, PlayerId, TimeSlot};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Hourly slots synthesized past the grid before giving up on conflict-free placement.
pub const MAX_EXTRA_SLOTS: u32 = 6;
/// Spacing of synthesized slots.
pub const EXTRA_SLOT_STEP_MINUTES: u32 = 60;
/// Upper bound (exclusive) of the random tie-break added to a priority.
const JITTER: f64 = 0.1;
/// Where synthesized slots start when the grid is empty.
const FALLBACK_FIRST_SLOT: TimeSlot = TimeSlot::from_hm(8, 0);

/// A player booked twice in one slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConflict {
    pub time_slot: TimeSlot,
    pub player_id: PlayerId,
}

/// Result of a scheduling run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    /// Every input match, with slot and court set, in placement order.
    pub matches: Vec<GameMatch>,
    /// Synthesized slots that received matches, in order.
    pub extra_slots: Vec<TimeSlot>,
    /// Double bookings introduced by the forced placement; empty on a normal run.
    pub conflicts: Vec<SlotConflict>,
}

impl Schedule {
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of distinct slots holding at least one match.
    pub fn slots_used(&self) -> usize {
        self.matches
            .iter()
            .filter_map(|m| m.time_slot)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Greedy court scheduler over a fixed court count and slot grid.
#[derive(Clone, Debug)]
pub struct Scheduler<'a> {
    courts: u8,
    slots: &'a [TimeSlot],
}

impl<'a> Scheduler<'a> {
    /// `courts` is validated by the settings; zero is treated as one court.
    pub fn new(courts: u8, slots: &'a [TimeSlot]) -> Self {
        Self {
            courts: courts.max(1),
            slots,
        }
    }

    /// Assign every match a slot and a court. `rng` only breaks priority ties.
    pub fn schedule<R: Rng + ?Sized>(&self, matches: Vec<GameMatch>, rng: &mut R) -> Schedule {
        if matches.is_empty() {
            return Schedule::default();
        }

        let mut placement = Placement::new(matches);
        for &slot in self.slots {
            if placement.is_done() {
                break;
            }
            placement.fill_slot(slot, self.courts, rng);
        }

        let first_extra = self
            .slots
            .iter()
            .max()
            .map(|last| last.later_by(EXTRA_SLOT_STEP_MINUTES))
            .unwrap_or(FALLBACK_FIRST_SLOT);
        let mut extra_slots = Vec::new();
        for step in 0..MAX_EXTRA_SLOTS {
            if placement.is_done() {
                break;
            }
            let slot = first_extra.later_by(step * EXTRA_SLOT_STEP_MINUTES);
            if placement.fill_slot(slot, self.courts, rng) > 0 {
                extra_slots.push(slot);
            }
        }

        let mut conflicts = Vec::new();
        if !placement.is_done() {
            let forced_from = first_extra.later_by(MAX_EXTRA_SLOTS * EXTRA_SLOT_STEP_MINUTES);
            log::warn!(
                "Scheduling exhausted {} extra slots; forcing {} remaining match(es) from {}",
                MAX_EXTRA_SLOTS,
                placement.remaining.len(),
                forced_from
            );
            let forced = placement.force_remaining(forced_from, self.courts);
            conflicts = find_conflicts(&forced);
            for m in &forced {
                if let Some(slot) = m.time_slot {
                    if extra_slots.last() != Some(&slot) {
                        extra_slots.push(slot);
                    }
                }
            }
            placement.placed.extend(forced);
        }

        log::debug!(
            "Scheduled {} match(es) on {} court(s), {} extra slot(s)",
            placement.placed.len(),
            self.courts,
            extra_slots.len()
        );
        Schedule {
            matches: placement.placed,
            extra_slots,
            conflicts,
        }
    }
}

/// Running state of one scheduling pass.
struct Placement {
    total: usize,
    remaining: Vec<GameMatch>,
    placed: Vec<GameMatch>,
    scheduled_count: HashMap<PlayerId, usize>,
}

impl Placement {
    fn new(matches: Vec<GameMatch>) -> Self {
        Self {
            total: matches.len(),
            placed: Vec::with_capacity(matches.len()),
            remaining: matches,
            scheduled_count: HashMap::new(),
        }
    }

    fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    fn count(&self, player: PlayerId) -> usize {
        self.scheduled_count.get(&player).copied().unwrap_or(0)
    }

    /// `(M - placed(p1)) + (M - placed(p2)) + jitter`, jitter in `[0, 0.1)`.
    fn priority<R: Rng + ?Sized>(&self, m: &GameMatch, rng: &mut R) -> f64 {
        let headroom = |player| self.total.saturating_sub(self.count(player)) as f64;
        headroom(m.player1_id) + headroom(m.player2_id) + rng.gen::<f64>() * JITTER
    }

    /// Place up to `courts` matches in `slot`. Returns how many were placed.
    fn fill_slot<R: Rng + ?Sized>(&mut self, slot: TimeSlot, courts: u8, rng: &mut R) -> usize {
        let mut busy: HashSet<PlayerId> = HashSet::new();
        let mut court: u8 = 0;
        while court < courts && !self.remaining.is_empty() {
            let mut ranked: Vec<(f64, usize)> = self
                .remaining
                .iter()
                .enumerate()
                .map(|(idx, m)| (self.priority(m, rng), idx))
                .collect();
            ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

            let pick = ranked.into_iter().map(|(_, idx)| idx).find(|&idx| {
                let m = &self.remaining[idx];
                !busy.contains(&m.player1_id) && !busy.contains(&m.player2_id)
            });
            let Some(idx) = pick else {
                break;
            };

            let mut m = self.remaining.remove(idx);
            court += 1;
            m.time_slot = Some(slot);
            m.court_number = Some(court);
            busy.insert(m.player1_id);
            busy.insert(m.player2_id);
            *self.scheduled_count.entry(m.player1_id).or_default() += 1;
            *self.scheduled_count.entry(m.player2_id).or_default() += 1;
            self.placed.push(m);
        }
        usize::from(court)
    }

    /// Round-robin the rest across courts in hourly slots from `first`, unchecked.
    fn force_remaining(&mut self, first: TimeSlot, courts: u8) -> Vec<GameMatch> {
        let courts = usize::from(courts);
        self.remaining
            .drain(..)
            .enumerate()
            .map(|(idx, mut m)| {
                let step = u32::try_from(idx / courts).unwrap_or(u32::MAX);
                m.time_slot = Some(first.later_by(step.saturating_mul(EXTRA_SLOT_STEP_MINUTES)));
                m.court_number = Some(u8::try_from(idx % courts + 1).unwrap_or(u8::MAX));
                m
            })
            .collect()
    }
}

/// Every player that appears in more than one match of the same slot.
///
/// Unscheduled matches are ignored. Reported in match order.
pub fn find_conflicts(matches: &[GameMatch]) -> Vec<SlotConflict> {
    let mut seen: HashMap<TimeSlot, HashSet<PlayerId>> = HashMap::new();
    let mut conflicts = Vec::new();
    for m in matches {
        let Some(slot) = m.time_slot else {
            continue;
        };
        let players = seen.entry(slot).or_default();
        for player_id in [m.player1_id, m.player2_id] {
            if !players.insert(player_id) {
                conflicts.push(SlotConflict {
                    time_slot: slot,
                    player_id,
                });
            }
        }
    }
    conflicts
}

/// Matches grouped by slot (unscheduled under `None`, first), each group sorted by court.
pub fn schedule_by_slot(matches: &[GameMatch]) -> BTreeMap<Option<TimeSlot>, Vec<&GameMatch>> {
    let mut groups: BTreeMap<Option<TimeSlot>, Vec<&GameMatch>> = BTreeMap::new();
    for m in matches {
        groups.entry(m.time_slot).or_default().push(m);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|m| m.court_number.unwrap_or(0));
    }
    groups
}
