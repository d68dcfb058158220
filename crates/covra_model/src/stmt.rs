//! Statement nodes: the control-flow automaton over expression trees.
//!
//! Statements form a directed graph with true/false successor links.
//! `always` loops make the graph cyclic, so traversal uses a visited set
//! and terminates by identity comparison against the start node rather
//! than by following links to exhaustion.

use crate::arena::Arena;
use crate::ids::{ExprId, ModuleId, StmtId};
use covra_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Scheduling state of a statement.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum StmtState {
    /// Queued for execution.
    Pending,
    /// Currently executing.
    Active,
    /// Parked; the block's reactivation point when control stops here.
    #[default]
    Suspended,
}

/// A node in a module's control-flow graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stmt {
    /// Root of the expression tree evaluated when this statement runs.
    pub root: ExprId,
    /// Successor when the root reduces true.
    pub next_true: Option<StmtId>,
    /// Successor when the root reduces false.
    pub next_false: Option<StmtId>,
    /// Entry point of a statement block; the only node propagation
    /// ever wakes directly.
    pub head: bool,
    /// Control-flow paths rejoin here; external traversal must not
    /// re-enter through the second incoming branch.
    pub stop: bool,
    /// Scheduling state.
    pub state: StmtState,
    /// Line-coverage visited bit, set when control passes through.
    pub executed: bool,
    /// The whole block was disabled by race validation; excluded from
    /// both simulation and coverage reporting.
    pub disabled: bool,
    /// Owning module.
    pub module: ModuleId,
    /// Source lines of the statement.
    pub span: Span,
}

impl Stmt {
    /// Creates an unlinked statement over the given root expression.
    pub fn new(root: ExprId, module: ModuleId, span: Span) -> Self {
        Self {
            root,
            next_true: None,
            next_false: None,
            head: false,
            stop: false,
            state: StmtState::default(),
            executed: false,
            disabled: false,
            module,
            span,
        }
    }
}

/// Collects every statement reachable from `head`, in traversal order.
///
/// Both successor links are followed. A visited set makes the walk safe
/// on cyclic graphs, and a link back to `head` terminates the branch the
/// same way any revisit does. Each statement appears exactly once even
/// when branches rejoin at a stop-marked node.
pub fn collect_block(stmts: &Arena<StmtId, Stmt>, head: StmtId) -> Vec<StmtId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut work = vec![head];
    while let Some(id) = work.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        let stmt = stmts.get(id);
        // Push false first so the true branch is walked first.
        if let Some(next) = stmt.next_false {
            if next != head {
                work.push(next);
            }
        }
        if let Some(next) = stmt.next_true {
            if next != head {
                work.push(next);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ExprId;

    fn stmt() -> Stmt {
        Stmt::new(ExprId::from_raw(0), ModuleId::from_raw(0), Span::DUMMY)
    }

    fn arena_of(n: usize) -> Arena<StmtId, Stmt> {
        let mut arena = Arena::new();
        for _ in 0..n {
            arena.alloc(stmt());
        }
        arena
    }

    #[test]
    fn new_statement_is_suspended() {
        let s = stmt();
        assert_eq!(s.state, StmtState::Suspended);
        assert!(!s.executed);
        assert!(!s.disabled);
    }

    #[test]
    fn collect_linear_chain() {
        let mut arena = arena_of(3);
        let ids: Vec<StmtId> = (0..3).map(StmtId::from_raw).collect();
        arena[ids[0]].next_true = Some(ids[1]);
        arena[ids[0]].next_false = Some(ids[1]);
        arena[ids[1]].next_true = Some(ids[2]);
        arena[ids[1]].next_false = Some(ids[2]);
        let block = collect_block(&arena, ids[0]);
        assert_eq!(block, ids);
    }

    #[test]
    fn collect_terminates_on_cycle_back_to_head() {
        let mut arena = arena_of(2);
        let a = StmtId::from_raw(0);
        let b = StmtId::from_raw(1);
        arena[a].next_true = Some(b);
        arena[a].next_false = Some(b);
        // always-loop: tail wires back to the head.
        arena[b].next_true = Some(a);
        arena[b].next_false = Some(a);
        let block = collect_block(&arena, a);
        assert_eq!(block, vec![a, b]);
    }

    #[test]
    fn rejoined_branches_visit_stop_once() {
        // if/else diamond: 0 -> (1 | 2) -> 3
        let mut arena = arena_of(4);
        let ids: Vec<StmtId> = (0..4).map(StmtId::from_raw).collect();
        arena[ids[0]].next_true = Some(ids[1]);
        arena[ids[0]].next_false = Some(ids[2]);
        arena[ids[1]].next_true = Some(ids[3]);
        arena[ids[1]].next_false = Some(ids[3]);
        arena[ids[2]].next_true = Some(ids[3]);
        arena[ids[2]].next_false = Some(ids[3]);
        arena[ids[3]].stop = true;
        let block = collect_block(&arena, ids[0]);
        assert_eq!(block.len(), 4);
        assert_eq!(block.iter().filter(|&&s| s == ids[3]).count(), 1);
    }

    #[test]
    fn inner_cycle_terminates() {
        // 0 -> 1 -> 2 -> 1 (loop not through the head)
        let mut arena = arena_of(3);
        let ids: Vec<StmtId> = (0..3).map(StmtId::from_raw).collect();
        arena[ids[0]].next_true = Some(ids[1]);
        arena[ids[0]].next_false = Some(ids[1]);
        arena[ids[1]].next_true = Some(ids[2]);
        arena[ids[1]].next_false = Some(ids[2]);
        arena[ids[2]].next_true = Some(ids[1]);
        arena[ids[2]].next_false = Some(ids[1]);
        let block = collect_block(&arena, ids[0]);
        assert_eq!(block.len(), 3);
    }
}
