//! Depth-first expression evaluation.
//!
//! Evaluation runs post-order: children first, then the node. Operand
//! placement follows a fixed convention: unary operators, edge detectors,
//! and `Last` take their operand on the left; `Delay` takes its tick
//! count on the left; `Expand` takes count left and value right;
//! assignments take target left and value right; `Cond` takes its
//! condition left and its `CondSel` arm pair right.
//!
//! Unknown operands flow through silently as X-filled results; the only
//! evaluation-time errors are division by a known zero and an unknown
//! replication count.

use crate::error::ScoreError;
use crate::time::SimTime;
use covra_common::{Logic, LogicVec};
use covra_model::{Design, ExprId, ExprOp, VectorSlot};

/// Evaluation context for one statement activation.
pub struct EvalCx<'a> {
    /// The design being scored.
    pub design: &'a mut Design,
    /// Current simulation time.
    pub now: SimTime,
    /// Pass ID of this activation step; guards against double-counting
    /// nodes reachable through more than one parent.
    pub pass: u64,
    /// End-of-run drain: delay gates fire unconditionally.
    pub drain: bool,
}

/// Result of evaluating one subtree.
#[derive(Debug)]
pub struct EvalOutcome {
    /// The node's value after evaluation.
    pub value: LogicVec,
    /// Whether the node's value changed.
    pub changed: bool,
    /// Earliest wake time of an unexpired delay in the subtree.
    pub wake: Option<SimTime>,
}

fn min_wake(a: Option<SimTime>, b: Option<SimTime>) -> Option<SimTime> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Resizes both operands of a width-matched binary operator.
fn bin(lv: &LogicVec, rv: &LogicVec, width: u32) -> (LogicVec, LogicVec) {
    (lv.resized(width), rv.resized(width))
}

/// Evaluates the subtree rooted at `id` and updates its coverage state.
pub fn evaluate(cx: &mut EvalCx<'_>, id: ExprId) -> Result<EvalOutcome, ScoreError> {
    let (op, left, right, parent, span, last_pass) = {
        let node = &cx.design.exprs[id];
        (
            node.op,
            node.left,
            node.right,
            node.parent,
            node.span,
            node.cov.last_pass,
        )
    };
    // Re-entry through a second parent in the same pass is a no-op.
    if last_pass == cx.pass && cx.pass != 0 {
        return Ok(EvalOutcome {
            value: cx.design.value_of(id),
            changed: false,
            wake: None,
        });
    }

    let mut wake = None;
    let mut lv = None;
    let mut rv = None;
    if let Some(child) = left {
        let out = evaluate(cx, child)?;
        wake = min_wake(wake, out.wake);
        lv = Some(out.value);
    }
    if let Some(child) = right {
        let out = evaluate(cx, child)?;
        wake = min_wake(wake, out.wake);
        rv = Some(out.value);
    }

    let width = cx.design.exprs[id].width();
    let all_x = || LogicVec::all_x(width);

    // Deferred node-state updates, applied in one mutable pass below.
    let mut new_alias_lsb: Option<u32> = None;
    let mut edge_update: Option<(LogicVec, bool)> = None;
    let mut delay_start: Option<Option<u64>> = None;

    let value = match op {
        ExprOp::None | ExprOp::Static | ExprOp::Param | ExprOp::Signal | ExprOp::MbitSel => {
            cx.design.value_of(id)
        }
        ExprOp::SbitSel => match left {
            // dynamic index: recompute the alias window
            Some(_) => {
                let index = lv.as_ref().and_then(|v| v.to_u64());
                match (index, cx.design.exprs[id].bound) {
                    (Some(index), Some(signal)) => {
                        let sig = &cx.design.signals[signal];
                        if index >= sig.lsb as u64 && index <= sig.msb as u64 {
                            let offset = index as u32 - sig.lsb;
                            new_alias_lsb = Some(offset);
                            sig.value.slice(offset, 1)
                        } else {
                            all_x()
                        }
                    }
                    _ => all_x(),
                }
            }
            None => cx.design.value_of(id),
        },
        ExprOp::Add => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.add(&r)
        }
        ExprOp::Subtract => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.sub(&r)
        }
        ExprOp::Multiply => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.mul(&r).resized(width)
        }
        ExprOp::Divide => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.div(&r).ok_or(ScoreError::DivisionByZero { span })?
        }
        ExprOp::Mod => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.rem(&r).ok_or(ScoreError::DivisionByZero { span })?
        }
        ExprOp::Negate => LogicVec::new(width).sub(&lv.as_ref().unwrap().resized(width)),
        ExprOp::And => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            &l & &r
        }
        ExprOp::Or => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            &l | &r
        }
        ExprOp::Xor => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            &l ^ &r
        }
        ExprOp::Nand => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.nand(&r)
        }
        ExprOp::Nor => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.nor(&r)
        }
        ExprOp::Nxor => {
            let (l, r) = bin(lv.as_ref().unwrap(), rv.as_ref().unwrap(), width);
            l.xnor(&r)
        }
        ExprOp::Uinv => !&lv.as_ref().unwrap().resized(width),
        ExprOp::Uand => LogicVec::from_logic(lv.as_ref().unwrap().reduce_and()),
        ExprOp::Uor => LogicVec::from_logic(lv.as_ref().unwrap().reduce_or()),
        ExprOp::Uxor => LogicVec::from_logic(lv.as_ref().unwrap().reduce_xor()),
        ExprOp::Unand => LogicVec::from_logic(lv.as_ref().unwrap().reduce_nand()),
        ExprOp::Unor => LogicVec::from_logic(lv.as_ref().unwrap().reduce_nor()),
        ExprOp::Unxor => LogicVec::from_logic(lv.as_ref().unwrap().reduce_xnor()),
        ExprOp::Unot => LogicVec::from_logic(!lv.as_ref().unwrap().truth()),
        ExprOp::Land => {
            LogicVec::from_logic(lv.as_ref().unwrap().truth() & rv.as_ref().unwrap().truth())
        }
        ExprOp::Lor => {
            LogicVec::from_logic(lv.as_ref().unwrap().truth() | rv.as_ref().unwrap().truth())
        }
        ExprOp::Lt => LogicVec::from_logic(lv.as_ref().unwrap().cmp_lt(rv.as_ref().unwrap())),
        ExprOp::Gt => LogicVec::from_logic(lv.as_ref().unwrap().cmp_gt(rv.as_ref().unwrap())),
        ExprOp::Le => LogicVec::from_logic(lv.as_ref().unwrap().cmp_le(rv.as_ref().unwrap())),
        ExprOp::Ge => LogicVec::from_logic(lv.as_ref().unwrap().cmp_ge(rv.as_ref().unwrap())),
        ExprOp::Eq => LogicVec::from_logic(lv.as_ref().unwrap().cmp_eq(rv.as_ref().unwrap())),
        ExprOp::Ne => LogicVec::from_logic(lv.as_ref().unwrap().cmp_ne(rv.as_ref().unwrap())),
        ExprOp::Ceq => LogicVec::from_logic(lv.as_ref().unwrap().case_eq(rv.as_ref().unwrap())),
        ExprOp::Cne => LogicVec::from_logic(lv.as_ref().unwrap().case_ne(rv.as_ref().unwrap())),
        ExprOp::Casex => {
            LogicVec::from_logic(lv.as_ref().unwrap().case_eq_wild_xz(rv.as_ref().unwrap()))
        }
        ExprOp::Casez => {
            LogicVec::from_logic(lv.as_ref().unwrap().case_eq_wild_z(rv.as_ref().unwrap()))
        }
        ExprOp::Lshift => lv
            .as_ref()
            .unwrap()
            .resized(width)
            .shl(rv.as_ref().unwrap()),
        ExprOp::Rshift => lv
            .as_ref()
            .unwrap()
            .resized(width)
            .shr(rv.as_ref().unwrap()),
        ExprOp::Concat | ExprOp::List => {
            // last part lands at the LSB
            LogicVec::concat(&[lv.clone().unwrap(), rv.clone().unwrap()]).resized(width)
        }
        ExprOp::Expand => {
            let count = lv
                .as_ref()
                .unwrap()
                .to_u64()
                .ok_or(ScoreError::UnknownReplicationCount { span })?;
            rv.as_ref().unwrap().replicate(count as u32).resized(width)
        }
        ExprOp::Cond => rv.as_ref().unwrap().resized(width),
        ExprOp::CondSel => {
            // the condition is the enclosing Cond's left child
            let cond = parent
                .and_then(|p| cx.design.exprs[p].left)
                .map(|c| cx.design.value_of(c));
            match cond {
                Some(cond) if !cond.is_unknown() => {
                    if cond.truth() == Logic::One {
                        lv.as_ref().unwrap().resized(width)
                    } else {
                        rv.as_ref().unwrap().resized(width)
                    }
                }
                _ => all_x(),
            }
        }
        ExprOp::Pedge | ExprOp::Nedge | ExprOp::Aedge => {
            let operand = lv.as_ref().unwrap();
            let state = cx.design.exprs[id].edge.as_ref().unwrap();
            let shadow = if state.last.width() == operand.width() {
                state.last.clone()
            } else {
                LogicVec::all_x(operand.width())
            };
            let fire = state.armed
                && match op {
                    ExprOp::Pedge => {
                        operand.get(0) == Logic::One && shadow.get(0) != Logic::One
                    }
                    ExprOp::Nedge => {
                        operand.get(0) == Logic::Zero && shadow.get(0) != Logic::Zero
                    }
                    _ => *operand != shadow,
                };
            // a trigger disarms; any other evaluation re-arms
            edge_update = Some((operand.clone(), !fire));
            LogicVec::from_bool(fire)
        }
        ExprOp::Eor => {
            LogicVec::from_logic(lv.as_ref().unwrap().truth() | rv.as_ref().unwrap().truth())
        }
        ExprOp::Last => {
            let operand = lv.as_ref().unwrap();
            let state = cx.design.exprs[id].edge.as_ref().unwrap();
            let previous = state.last.resized(width);
            edge_update = Some((operand.clone(), true));
            previous
        }
        ExprOp::Delay => {
            let ticks = lv.as_ref().and_then(|v| v.to_u64()).unwrap_or(0);
            let state = cx.design.exprs[id].delay.unwrap();
            let start = state.start.unwrap_or(cx.now.ticks());
            let fired = cx.drain || cx.now.ticks() - start >= ticks;
            if fired {
                delay_start = Some(None);
            } else {
                delay_start = Some(Some(start));
                wake = min_wake(wake, Some(SimTime::new(start + ticks)));
            }
            LogicVec::from_bool(fired)
        }
        ExprOp::Assign | ExprOp::Bassign | ExprOp::Nbassign | ExprOp::Dassign => {
            let target_width = left.map(|t| cx.design.exprs[t].width()).unwrap_or(width);
            rv.as_ref().unwrap().resized(target_width)
        }
        ExprOp::If => LogicVec::from_logic(lv.as_ref().unwrap().truth()),
        ExprOp::Case => LogicVec::from_logic(lv.as_ref().unwrap().case_eq(rv.as_ref().unwrap())),
        ExprOp::Default => LogicVec::from_bool(true),
    };

    let truth = value.truth();
    let combo = if op.has_combo_children() && lv.is_some() && rv.is_some() {
        Some((
            lv.as_ref().unwrap().truth() == Logic::One,
            rv.as_ref().unwrap().truth() == Logic::One,
        ))
    } else {
        None
    };

    let node = &mut cx.design.exprs[id];
    let first_eval = node.cov.last_pass == 0;
    let changed = match &mut node.slot {
        VectorSlot::Owned(stored) => {
            let changed = *stored != value;
            if changed {
                *stored = value.clone();
            }
            changed
        }
        VectorSlot::Alias { lsb, .. } => {
            if let Some(new_lsb) = new_alias_lsb {
                *lsb = new_lsb;
            }
            // no backing storage of our own; track change at truth level
            first_eval
                || node.cov.last_true != (truth == Logic::One)
                || node.cov.last_false != (truth == Logic::Zero)
        }
    };
    node.cov.last_pass = cx.pass;
    node.cov.last_true = truth == Logic::One;
    node.cov.last_false = truth == Logic::Zero;
    if let Some((l, r)) = combo {
        node.cov.combos.record(l, r);
    }
    if let Some((shadow, armed)) = edge_update {
        let state = node.edge.as_mut().unwrap();
        state.last = shadow;
        state.armed = armed;
    }
    if let Some(start) = delay_start {
        node.delay.as_mut().unwrap().start = start;
    }

    Ok(EvalOutcome {
        value,
        changed,
        wake,
    })
}
