//! The event-driven scheduler.
//!
//! A single-threaded cooperative kernel replays the external event
//! stream through the design. Signal writes fan out to dependent
//! statement blocks, blocks run to their next wait point within the
//! same timestep, and delay gates park their block on a min-heap keyed
//! by wake time.

use crate::error::ScoreError;
use crate::eval::{evaluate, EvalCx};
use crate::event::TraceEvent;
use crate::options::ScoreOptions;
use crate::race::{self, DisabledBlock};
use crate::time::SimTime;
use covra_common::{InternalError, Logic, LogicVec};
use covra_diagnostics::DiagnosticSink;
use covra_model::{collect_block, Design, ExprId, ExprOp, SignalId, StmtId, StmtState, VectorSlot};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

/// Outcome of a completed scoring run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Simulation time when the run finished.
    pub final_time: SimTime,
    /// Number of trace events applied.
    pub events_applied: u64,
    /// Blocks removed by race validation.
    pub disabled_blocks: Vec<DisabledBlock>,
}

/// Scores a design against an event stream.
///
/// Runs race validation, replays every event through the scheduler,
/// drains delayed statements if configured, and finally marks all
/// signals as scored. On any fatal error the queues are discarded and
/// nothing is marked scored.
pub fn score<E>(
    design: &mut Design,
    events: E,
    options: &ScoreOptions,
    sink: &DiagnosticSink,
) -> Result<ScoreSummary, ScoreError>
where
    E: IntoIterator<Item = TraceEvent>,
{
    let disabled_blocks = race::validate(design, options.race_severity, sink)?;
    let mut scheduler = Scheduler::new(design, options.clone());
    let mut events_applied = 0u64;
    for event in events {
        scheduler.apply(event)?;
        events_applied += 1;
    }
    scheduler.finish()?;
    let final_time = scheduler.now;

    for (_, signal) in design.signals.iter_mut() {
        signal.scored = true;
    }
    Ok(ScoreSummary {
        final_time,
        events_applied,
        disabled_blocks,
    })
}

/// A statement parked until its delay expires.
struct Waiting {
    wake: SimTime,
    seq: u64,
    stmt: StmtId,
}

impl PartialEq for Waiting {
    fn eq(&self, other: &Self) -> bool {
        self.wake == other.wake && self.seq == other.seq
    }
}

impl Eq for Waiting {}

impl Ord for Waiting {
    // reversed: BinaryHeap pops the earliest wake, FIFO on ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .wake
            .cmp(&self.wake)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Waiting {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Scheduler<'a> {
    design: &'a mut Design,
    options: ScoreOptions,
    active: VecDeque<StmtId>,
    delayed: BinaryHeap<Waiting>,
    /// Statement to owning block head.
    block_head: HashMap<StmtId, StmtId>,
    /// Block head to the block's current reactivation point.
    block_current: HashMap<StmtId, StmtId>,
    /// Seq of the live heap entry per parked statement. Re-parking or an
    /// early wake leaves stale entries on the heap; a popped entry whose
    /// seq no longer matches is dead and must be skipped.
    parked_seq: HashMap<StmtId, u64>,
    now: SimTime,
    last_event: Option<SimTime>,
    pass: u64,
    drain: bool,
    seq: u64,
}

impl<'a> Scheduler<'a> {
    fn new(design: &'a mut Design, options: ScoreOptions) -> Self {
        let mut block_head = HashMap::new();
        let mut block_current = HashMap::new();
        let heads: Vec<StmtId> = design
            .modules
            .values()
            .flat_map(|m| m.heads.iter().copied())
            .filter(|&h| !design.stmts[h].disabled)
            .collect();
        for head in heads {
            for stmt in collect_block(&design.stmts, head) {
                block_head.insert(stmt, head);
            }
            block_current.insert(head, head);
        }
        Self {
            design,
            options,
            active: VecDeque::new(),
            delayed: BinaryHeap::new(),
            block_head,
            block_current,
            parked_seq: HashMap::new(),
            now: SimTime::ZERO,
            last_event: None,
            pass: 0,
            drain: false,
            seq: 0,
        }
    }

    /// Applies one external event, then runs all work it triggers.
    fn apply(&mut self, event: TraceEvent) -> Result<(), ScoreError> {
        if let Some(prev) = self.last_event {
            if event.time < prev {
                return Err(ScoreError::OutOfOrderEvent {
                    prev,
                    event: event.time,
                });
            }
        }
        self.advance_to(event.time)?;
        self.now = event.time;
        self.last_event = Some(event.time);

        if event.signal.as_raw() as usize >= self.design.signals.len() {
            return Err(ScoreError::MalformedEvent {
                reason: format!("unknown signal id {}", event.signal.as_raw()),
            });
        }
        if event.value.width() == 0 {
            return Err(ScoreError::MalformedEvent {
                reason: "zero-width value".into(),
            });
        }

        let changed = self.design.signals[event.signal].write(&event.value);
        if changed {
            self.propagate(event.signal);
            self.run_queue()?;
        }
        Ok(())
    }

    /// Wakes every delayed statement due at or before `t`.
    fn advance_to(&mut self, t: SimTime) -> Result<(), ScoreError> {
        while let Some(top) = self.delayed.peek() {
            if top.wake > t {
                break;
            }
            let waiting = self.delayed.pop().unwrap();
            if self.parked_seq.get(&waiting.stmt) != Some(&waiting.seq) {
                continue;
            }
            self.parked_seq.remove(&waiting.stmt);
            if waiting.wake > self.now {
                self.now = waiting.wake;
            }
            self.design.stmts[waiting.stmt].state = StmtState::Pending;
            self.active.push_back(waiting.stmt);
            self.run_queue()?;
        }
        Ok(())
    }

    /// Wakes each block whose reactivation point listens to `signal`.
    ///
    /// Dependents are walked in binding order. Only a block parked at
    /// the dependent's owning statement is woken; a change to a signal
    /// read elsewhere in the block is picked up when control gets there.
    fn propagate(&mut self, signal: SignalId) {
        let dependents = self.design.signals[signal].dependents.clone();
        for dep in dependents {
            if self.design.exprs[dep].suppress_propagation {
                continue;
            }
            let Some(stmt) = self.design.owning_stmt(dep) else {
                continue;
            };
            if self.design.stmts[stmt].disabled {
                continue;
            }
            let head = self.block_head.get(&stmt).copied().unwrap_or(stmt);
            if self.block_current.get(&head).copied() != Some(stmt) {
                continue;
            }
            if self.design.stmts[stmt].state != StmtState::Suspended {
                continue;
            }
            // an early wake invalidates any heap entry for this statement
            self.parked_seq.remove(&stmt);
            self.design.stmts[stmt].state = StmtState::Pending;
            self.active.push_back(stmt);
        }
    }

    fn run_queue(&mut self) -> Result<(), ScoreError> {
        while let Some(stmt) = self.active.pop_front() {
            self.run_block_from(stmt)?;
        }
        Ok(())
    }

    /// Runs a block from `start` until it suspends or parks on a delay.
    fn run_block_from(&mut self, start: StmtId) -> Result<(), ScoreError> {
        let head = self.block_head.get(&start).copied().unwrap_or(start);
        let mut cur = start;
        let mut steps = 0u32;
        loop {
            steps += 1;
            if steps > self.options.max_steps_per_activation {
                return Err(ScoreError::ExecutionLimit {
                    stmt: cur,
                    max_steps: self.options.max_steps_per_activation,
                });
            }
            self.design.stmts[cur].state = StmtState::Active;
            self.pass += 1;
            let root = self.design.stmts[cur].root;
            let outcome = {
                let mut cx = EvalCx {
                    design: &mut *self.design,
                    now: self.now,
                    pass: self.pass,
                    drain: self.drain,
                };
                evaluate(&mut cx, root)?
            };
            let truth = outcome.value.truth();
            let root_op = self.design.exprs[root].op;

            // unexpired delay: park the whole block until the wake time
            if truth != Logic::One {
                if let Some(wake) = outcome.wake {
                    self.design.stmts[cur].state = StmtState::Suspended;
                    self.block_current.insert(head, cur);
                    self.seq += 1;
                    self.parked_seq.insert(cur, self.seq);
                    self.delayed.push(Waiting {
                        wake,
                        seq: self.seq,
                        stmt: cur,
                    });
                    return Ok(());
                }
            }

            if root_op.is_assignment() {
                if let Some(target) = self.design.exprs[root].left {
                    self.write_target(target, &outcome.value)?;
                }
            }

            // a wait that did not fire was not passed through
            let is_wait = root_op.is_edge() || root_op == ExprOp::Eor || root_op == ExprOp::Delay;
            if !(is_wait && truth != Logic::One) {
                self.design.stmts[cur].executed = true;
            }

            let next = if truth == Logic::One {
                self.design.stmts[cur].next_true
            } else {
                self.design.stmts[cur].next_false
            };
            match next {
                Some(n) => cur = n,
                None => {
                    self.design.stmts[cur].state = StmtState::Suspended;
                    self.block_current.insert(head, cur);
                    return Ok(());
                }
            }
        }
    }

    /// Writes an assignment result through the target's alias window
    /// and propagates the change within the same timestep.
    fn write_target(&mut self, target: ExprId, value: &LogicVec) -> Result<(), ScoreError> {
        let (signal, lsb, width) = match &self.design.exprs[target].slot {
            VectorSlot::Alias { signal, lsb, width } => (*signal, *lsb, *width),
            VectorSlot::Owned(_) => {
                return Err(InternalError::new("assignment target is not bound to a signal").into())
            }
        };
        let mut merged = self.design.signals[signal].value.clone();
        merged.splice(lsb, &value.resized(width));
        let changed = self.design.signals[signal].write(&merged);
        if changed {
            self.propagate(signal);
        }
        Ok(())
    }

    /// Force-fires everything still parked on the delayed queue.
    fn finish(&mut self) -> Result<(), ScoreError> {
        if !self.options.drain_on_finish {
            return Ok(());
        }
        self.drain = true;
        while let Some(waiting) = self.delayed.pop() {
            if self.parked_seq.get(&waiting.stmt) != Some(&waiting.seq) {
                continue;
            }
            self.parked_seq.remove(&waiting.stmt);
            if waiting.wake > self.now {
                self.now = waiting.wake;
            }
            self.design.stmts[waiting.stmt].state = StmtState::Pending;
            self.active.push_back(waiting.stmt);
            self.run_queue()?;
        }
        Ok(())
    }
}
