//! Depth-first backtracking with forward checking.
//!
//! Pinned sessions (single-valued domains) are bound before branching. Every
//! assignment prunes the live domains of unassigned neighbours in the
//! constraint network; pruned values go on a trail and are restored on
//! backtrack. After pruning, each affected teacher and group is checked for
//! enough free (day, slot) cells to host its pending sessions.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::domain::{Domain, Value};
use crate::expand::SessionId;
use crate::network::ConstraintNetwork;

#[derive(Clone, Copy, Debug)]
pub struct Calendar {
    pub days: usize,
    pub slots_per_day: u32,
}

impl Calendar {
    fn cells(&self) -> usize {
        self.days * self.slots_per_day as usize
    }

    fn cell(&self, day: usize, slot: u32) -> usize {
        day * self.slots_per_day as usize + slot as usize
    }
}

/// Wall-clock and node budget. Either limit may be absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
}

impl Budget {
    pub fn new(time_limit: Option<Duration>, max_nodes: Option<u64>) -> Self {
        Self {
            deadline: time_limit.map(|t| Instant::now() + t),
            max_nodes,
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    fn exhausted(&self, nodes: u64) -> bool {
        self.max_nodes.is_some_and(|m| nodes > m)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// One value per session, indexed by `SessionId`.
    Solved(Vec<Value>),
    Infeasible,
    TimedOut,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub backtracks: u64,
}

enum Step {
    Found,
    Exhausted,
    OutOfBudget,
}

struct Search<'a> {
    network: &'a ConstraintNetwork,
    calendar: Calendar,
    live: Vec<Vec<Value>>,
    assigned: Vec<Option<Value>>,
    trail: Vec<(SessionId, Vec<Value>)>,
    pending_teacher: Vec<u32>,
    pending_group: Vec<u32>,
    rng: Option<ChaCha8Rng>,
    budget: Budget,
    stats: SearchStats,
    scratch: Vec<bool>,
}

/// Finds the first assignment that satisfies every domain and constraint.
pub fn search(
    domains: &[Domain],
    network: &ConstraintNetwork,
    calendar: Calendar,
    seed: Option<u64>,
    budget: Budget,
) -> (SearchOutcome, SearchStats) {
    let n = network.sessions();
    let mut s = Search {
        network,
        calendar,
        live: domains.iter().map(Domain::values).collect(),
        assigned: vec![None; n],
        trail: Vec::new(),
        pending_teacher: network
            .teacher_sessions()
            .iter()
            .map(|m| m.len() as u32)
            .collect(),
        pending_group: network
            .group_sessions()
            .iter()
            .map(|m| m.len() as u32)
            .collect(),
        rng: seed.map(ChaCha8Rng::seed_from_u64),
        budget,
        stats: SearchStats::default(),
        scratch: vec![false; calendar.cells()],
    };
    let outcome = s.run();
    debug!(
        nodes = s.stats.nodes,
        backtracks = s.stats.backtracks,
        "search finished"
    );
    (outcome, s.stats)
}

impl Search<'_> {
    fn run(&mut self) -> SearchOutcome {
        for var in 0..self.live.len() {
            if self.assigned[var].is_some() {
                continue;
            }
            match self.live[var].as_slice() {
                [] => return SearchOutcome::Infeasible,
                [v] => {
                    let v = *v;
                    if !self.assign(var, v) {
                        return SearchOutcome::Infeasible;
                    }
                }
                _ => {}
            }
        }

        let all_teachers = (0..self.pending_teacher.len()).all(|t| self.teacher_has_room(t));
        let all_groups = (0..self.pending_group.len()).all(|g| self.group_has_room(g));
        if !(all_teachers && all_groups) {
            return SearchOutcome::Infeasible;
        }

        match self.dfs() {
            Step::Found => {
                let values: Option<Vec<Value>> = self.assigned.iter().copied().collect();
                values.map_or(SearchOutcome::Infeasible, SearchOutcome::Solved)
            }
            Step::Exhausted => SearchOutcome::Infeasible,
            Step::OutOfBudget => SearchOutcome::TimedOut,
        }
    }

    fn dfs(&mut self) -> Step {
        let Some(var) = self.select() else {
            return Step::Found;
        };
        self.stats.nodes += 1;
        if self.budget.exhausted(self.stats.nodes) {
            return Step::OutOfBudget;
        }

        let mut candidates = self.live[var].clone();
        match &mut self.rng {
            Some(rng) => candidates.shuffle(rng),
            None => candidates.sort_unstable(),
        }

        for v in candidates {
            let mark = self.trail.len();
            if self.assign(var, v) {
                match self.dfs() {
                    Step::Exhausted => {}
                    done => return done,
                }
            }
            self.undo(var, mark);
            self.stats.backtracks += 1;
        }
        trace!(var, "domain exhausted");
        Step::Exhausted
    }

    /// Smallest live domain first, then the session whose teacher and group
    /// have the most sessions still waiting, then the lowest id.
    fn select(&self) -> Option<SessionId> {
        (0..self.live.len())
            .filter(|&s| self.assigned[s].is_none())
            .min_by_key(|&s| {
                let load = self.pending_teacher[self.network.teacher_of(s)]
                    + self.pending_group[self.network.group_of(s)];
                (self.live[s].len(), Reverse(load), s)
            })
    }

    /// Binds `var` and forward-checks. Returns false on a wipe-out or a
    /// failed capacity check; the caller undoes either way.
    fn assign(&mut self, var: SessionId, v: Value) -> bool {
        let net = self.network;
        self.assigned[var] = Some(v);
        self.pending_teacher[net.teacher_of(var)] -= 1;
        self.pending_group[net.group_of(var)] -= 1;

        let dv = net.duration(var);
        let mut touched = vec![var];
        for c in net.incident(var) {
            let other = c.other(var);
            if self.assigned[other].is_some() {
                continue;
            }
            let d_other = net.duration(other);
            let (kept, removed): (Vec<Value>, Vec<Value>) = self.live[other]
                .iter()
                .partition(|&&u| c.permits(v, dv, u, d_other));
            if removed.is_empty() {
                continue;
            }
            self.live[other] = kept;
            self.trail.push((other, removed));
            if self.live[other].is_empty() {
                return false;
            }
            touched.push(other);
        }

        let mut teachers: Vec<usize> = touched.iter().map(|&s| net.teacher_of(s)).collect();
        teachers.sort_unstable();
        teachers.dedup();
        let mut groups: Vec<usize> = touched.iter().map(|&s| net.group_of(s)).collect();
        groups.sort_unstable();
        groups.dedup();
        teachers.into_iter().all(|t| self.teacher_has_room(t))
            && groups.into_iter().all(|g| self.group_has_room(g))
    }

    fn undo(&mut self, var: SessionId, mark: usize) {
        while self.trail.len() > mark {
            if let Some((s, removed)) = self.trail.pop() {
                self.live[s].extend(removed);
            }
        }
        if self.assigned[var].take().is_some() {
            self.pending_teacher[self.network.teacher_of(var)] += 1;
            self.pending_group[self.network.group_of(var)] += 1;
        }
    }

    fn teacher_has_room(&mut self, t: usize) -> bool {
        if self.pending_teacher[t] == 0 {
            return true;
        }
        let net = self.network;
        self.has_room(&net.teacher_sessions()[t])
    }

    fn group_has_room(&mut self, g: usize) -> bool {
        if self.pending_group[g] == 0 {
            return true;
        }
        let net = self.network;
        self.has_room(&net.group_sessions()[g])
    }

    /// Sessions sharing a teacher (or group) occupy disjoint cells, so the
    /// cells their live values can cover must at least match their total
    /// duration.
    fn has_room(&mut self, members: &[SessionId]) -> bool {
        let pending: Vec<SessionId> = members
            .iter()
            .copied()
            .filter(|&s| self.assigned[s].is_none())
            .collect();
        let demand: usize = pending
            .iter()
            .map(|&s| self.network.duration(s) as usize)
            .sum();
        if demand == 0 {
            return true;
        }

        self.scratch.iter_mut().for_each(|c| *c = false);
        let mut covered = 0usize;
        for &s in &pending {
            let d = self.network.duration(s);
            for u in &self.live[s] {
                for slot in u.start..u.start + d {
                    let cell = self.calendar.cell(u.day, slot);
                    if !self.scratch[cell] {
                        self.scratch[cell] = true;
                        covered += 1;
                        if covered >= demand {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}
