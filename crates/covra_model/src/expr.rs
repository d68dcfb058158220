//! Expression nodes: operators, value slots, and coverage state.
//!
//! Expressions form binary trees over the statement graph. Each node either
//! owns its result vector or aliases a window of a signal's storage; signal
//! and bit-select references never own backing storage. Combination coverage
//! is recorded directly on the node as it evaluates.

use crate::ids::{ExprId, SignalId, StmtId};
use covra_common::LogicVec;
use covra_source::Span;
use serde::{Deserialize, Serialize};

/// Operator kind of an expression node.
///
/// The set covers leaf references, arithmetic, bitwise and reduction logic,
/// comparisons, shifts and concatenation, conditionals, event detectors,
/// and the assignment/control operators that statements hang off of.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ExprOp {
    /// Placeholder with no behavior.
    None,
    /// Literal constant.
    Static,
    /// Elaborated parameter value, behaves like a constant.
    Param,
    /// Whole-signal reference.
    Signal,
    /// Single-bit select of a signal.
    SbitSel,
    /// Contiguous part-select of a signal.
    MbitSel,
    /// Addition.
    Add,
    /// Subtraction.
    Subtract,
    /// Multiplication.
    Multiply,
    /// Division.
    Divide,
    /// Modulus.
    Mod,
    /// Arithmetic negation.
    Negate,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NAND.
    Nand,
    /// Bitwise NOR.
    Nor,
    /// Bitwise XNOR.
    Nxor,
    /// Bitwise inversion (unary).
    Uinv,
    /// Reduction AND.
    Uand,
    /// Reduction OR.
    Uor,
    /// Reduction XOR.
    Uxor,
    /// Reduction NAND.
    Unand,
    /// Reduction NOR.
    Unor,
    /// Reduction XNOR.
    Unxor,
    /// Logical NOT.
    Unot,
    /// Logical AND.
    Land,
    /// Logical OR.
    Lor,
    /// Less-than.
    Lt,
    /// Greater-than.
    Gt,
    /// Less-than-or-equal.
    Le,
    /// Greater-than-or-equal.
    Ge,
    /// Logical equality.
    Eq,
    /// Logical inequality.
    Ne,
    /// Case (4-state exact) equality.
    Ceq,
    /// Case (4-state exact) inequality.
    Cne,
    /// Wildcard equality ignoring X and Z positions.
    Casex,
    /// Wildcard equality ignoring Z positions.
    Casez,
    /// Left shift.
    Lshift,
    /// Right shift.
    Rshift,
    /// Concatenation.
    Concat,
    /// Replication with a constant count.
    Expand,
    /// Expression list link (concat and event chains).
    List,
    /// Ternary conditional; right child is the [`ExprOp::CondSel`] arm pair.
    Cond,
    /// Arm pair of a ternary conditional, selected by the parent's condition.
    CondSel,
    /// Positive-edge detector.
    Pedge,
    /// Negative-edge detector.
    Nedge,
    /// Any-edge detector.
    Aedge,
    /// Event OR combining two detectors.
    Eor,
    /// Previous-cycle value of the operand.
    Last,
    /// Time delay gate.
    Delay,
    /// Continuous assignment.
    Assign,
    /// Blocking procedural assignment.
    Bassign,
    /// Non-blocking procedural assignment.
    Nbassign,
    /// Delayed procedural assignment.
    Dassign,
    /// If condition holder.
    If,
    /// Case-item comparison.
    Case,
    /// Case default arm, always true.
    Default,
}

impl ExprOp {
    /// Returns `true` for the edge-detector operators.
    pub fn is_edge(self) -> bool {
        matches!(self, ExprOp::Pedge | ExprOp::Nedge | ExprOp::Aedge)
    }

    /// Returns `true` for operators taking a single operand.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            ExprOp::Negate
                | ExprOp::Uinv
                | ExprOp::Uand
                | ExprOp::Uor
                | ExprOp::Uxor
                | ExprOp::Unand
                | ExprOp::Unor
                | ExprOp::Unxor
                | ExprOp::Unot
        )
    }

    /// Returns `true` for the assignment operators.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            ExprOp::Assign | ExprOp::Bassign | ExprOp::Nbassign | ExprOp::Dassign
        )
    }

    /// Returns `true` for blocking procedural assignment.
    pub fn is_blocking(self) -> bool {
        matches!(self, ExprOp::Bassign | ExprOp::Dassign)
    }

    /// Returns `true` for non-blocking procedural assignment.
    pub fn is_nonblocking(self) -> bool {
        self == ExprOp::Nbassign
    }

    /// Returns `true` for leaf operators that never have children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            ExprOp::None | ExprOp::Static | ExprOp::Param | ExprOp::Signal | ExprOp::Default
        )
    }

    /// Returns `true` for operators whose children participate in
    /// combination coverage.
    pub fn has_combo_children(self) -> bool {
        matches!(
            self,
            ExprOp::And
                | ExprOp::Or
                | ExprOp::Xor
                | ExprOp::Nand
                | ExprOp::Nor
                | ExprOp::Nxor
                | ExprOp::Land
                | ExprOp::Lor
        )
    }

    /// Returns `true` for leaf references resolved by the binder.
    pub fn is_signal_ref(self) -> bool {
        matches!(self, ExprOp::Signal | ExprOp::SbitSel | ExprOp::MbitSel)
    }
}

/// Where an expression's result vector lives.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum VectorSlot {
    /// The node owns its result storage.
    Owned(LogicVec),
    /// The node aliases a window of a signal's storage.
    Alias {
        /// The aliased signal.
        signal: SignalId,
        /// Storage offset of the window's LSB within the signal.
        lsb: u32,
        /// Window width in bits.
        width: u32,
    },
}

impl VectorSlot {
    /// Returns the width of the slot in bits.
    pub fn width(&self) -> u32 {
        match self {
            VectorSlot::Owned(vec) => vec.width(),
            VectorSlot::Alias { width, .. } => *width,
        }
    }
}

/// Monotonic set of observed child truth combinations.
///
/// Bits record which of the four `(left, right)` truth combinations have
/// been seen: 00, 01, 10, 11. The set only ever grows; replaying further
/// events can never lose coverage already earned.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ComboSet(u8);

impl ComboSet {
    /// Creates an empty combination set.
    pub fn new() -> Self {
        Self(0)
    }

    fn bit(left: bool, right: bool) -> u8 {
        1 << ((left as u8) << 1 | right as u8)
    }

    /// ORs in the combination for the given child truths.
    pub fn record(&mut self, left: bool, right: bool) {
        self.0 |= Self::bit(left, right);
    }

    /// Returns `true` if the given combination has been observed.
    pub fn has(self, left: bool, right: bool) -> bool {
        self.0 & Self::bit(left, right) != 0
    }

    /// Returns the number of distinct combinations observed.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` once all four combinations have been observed.
    pub fn is_full(self) -> bool {
        self.0 == 0b1111
    }
}

/// Per-node coverage and traversal state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExprCoverage {
    /// The node's last evaluation was true (reduced to `One`).
    pub last_true: bool,
    /// The node's last evaluation was false (reduced to `Zero`).
    pub last_false: bool,
    /// Observed child truth combinations; grows monotonically.
    pub combos: ComboSet,
    /// ID of the evaluation pass that last touched this node. Guards
    /// against double-counting when the node is reachable through more
    /// than one parent in a single pass.
    pub last_pass: u64,
    /// This node is the root of a statement's expression tree.
    pub is_root: bool,
    /// This node's statement is a block head.
    pub is_head: bool,
    /// This node's statement is a control-flow rejoin point.
    pub is_stop: bool,
}

/// Shadow register state for edge detectors and [`ExprOp::Last`].
///
/// The shadow holds the operand value sampled at the previous evaluation.
/// The armed bit enforces fire-once semantics: a triggering evaluation
/// clears it and any other evaluation re-arms it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeState {
    /// Operand value at the previous evaluation.
    pub last: LogicVec,
    /// Detector is armed and may fire.
    pub armed: bool,
}

impl EdgeState {
    /// Creates a fresh shadow: all-X previous value, armed.
    ///
    /// Starting armed with an all-X shadow lets an initial known
    /// transition (e.g. X to 1 at time zero) fire the detector.
    pub fn new(width: u32) -> Self {
        Self {
            last: LogicVec::all_x(width),
            armed: true,
        }
    }
}

/// Wall-clock state for a [`ExprOp::Delay`] gate.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DelayState {
    /// Simulation time at which the delay started counting, if armed.
    pub start: Option<u64>,
}

/// An expression tree node.
///
/// Children and the parent backlink are arena IDs; the tree itself is
/// acyclic even though the statement graph above it is not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    /// Operator kind.
    pub op: ExprOp,
    /// Left child.
    pub left: Option<ExprId>,
    /// Right child.
    pub right: Option<ExprId>,
    /// Parent backlink, `None` for root nodes.
    pub parent: Option<ExprId>,
    /// Result storage or signal alias.
    pub slot: VectorSlot,
    /// Signal this reference resolved to; set by the binder.
    pub bound: Option<SignalId>,
    /// Static select offset relative to the signal's declared LSB.
    /// `None` for dynamic selects (the left child computes the index)
    /// and for non-select operators.
    pub select_offset: Option<u32>,
    /// Value changes here do not wake dependent statements.
    pub suppress_propagation: bool,
    /// Statement owning this tree; set on root nodes only.
    pub owner: Option<StmtId>,
    /// Coverage and traversal state.
    pub cov: ExprCoverage,
    /// Edge-detector shadow, present on edge and `Last` nodes.
    pub edge: Option<EdgeState>,
    /// Delay-gate state, present on `Delay` nodes.
    pub delay: Option<DelayState>,
    /// Source location.
    pub span: Span,
}

impl Expr {
    /// Creates a node with an owned all-X result vector of the given width.
    ///
    /// Edge detectors and `Last` get a fresh [`EdgeState`]; `Delay` gets a
    /// fresh [`DelayState`]. Children are attached separately.
    pub fn new(op: ExprOp, width: u32, span: Span) -> Self {
        let edge = if op.is_edge() || op == ExprOp::Last {
            Some(EdgeState::new(width))
        } else {
            None
        };
        let delay = if op == ExprOp::Delay {
            Some(DelayState::default())
        } else {
            None
        };
        Self {
            op,
            left: None,
            right: None,
            parent: None,
            slot: VectorSlot::Owned(LogicVec::all_x(width)),
            bound: None,
            select_offset: None,
            suppress_propagation: false,
            owner: None,
            cov: ExprCoverage::default(),
            edge,
            delay,
            span,
        }
    }

    /// Creates a constant node holding the given value.
    pub fn literal(value: LogicVec, span: Span) -> Self {
        let mut expr = Self::new(ExprOp::Static, value.width(), span);
        expr.slot = VectorSlot::Owned(value);
        expr
    }

    /// Returns the width of the node's result in bits.
    pub fn width(&self) -> u32 {
        self.slot.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_set_is_monotonic() {
        let mut set = ComboSet::new();
        set.record(false, true);
        set.record(false, true);
        assert_eq!(set.count(), 1);
        assert!(set.has(false, true));
        assert!(!set.has(true, false));
        set.record(true, false);
        set.record(false, false);
        set.record(true, true);
        assert!(set.is_full());
    }

    #[test]
    fn op_classifiers() {
        assert!(ExprOp::Pedge.is_edge());
        assert!(ExprOp::Aedge.is_edge());
        assert!(!ExprOp::Eor.is_edge());
        assert!(ExprOp::Unot.is_unary());
        assert!(!ExprOp::Land.is_unary());
        assert!(ExprOp::Nbassign.is_assignment());
        assert!(ExprOp::Nbassign.is_nonblocking());
        assert!(!ExprOp::Nbassign.is_blocking());
        assert!(ExprOp::Bassign.is_blocking());
        assert!(ExprOp::Dassign.is_blocking());
        assert!(!ExprOp::Assign.is_blocking());
        assert!(ExprOp::Signal.is_signal_ref());
        assert!(ExprOp::Static.is_leaf());
        assert!(ExprOp::Land.has_combo_children());
        assert!(!ExprOp::Add.has_combo_children());
    }

    #[test]
    fn edge_ops_start_armed_with_x_shadow() {
        let expr = Expr::new(ExprOp::Pedge, 1, Span::DUMMY);
        let edge = expr.edge.as_ref().unwrap();
        assert!(edge.armed);
        assert!(edge.last.is_unknown());
    }

    #[test]
    fn delay_op_gets_state() {
        let expr = Expr::new(ExprOp::Delay, 1, Span::DUMMY);
        assert!(expr.delay.is_some());
        assert_eq!(expr.delay.unwrap().start, None);
    }

    #[test]
    fn plain_ops_have_no_detector_state() {
        let expr = Expr::new(ExprOp::Add, 8, Span::DUMMY);
        assert!(expr.edge.is_none());
        assert!(expr.delay.is_none());
        assert_eq!(expr.width(), 8);
        assert!(matches!(expr.slot, VectorSlot::Owned(_)));
    }

    #[test]
    fn literal_holds_value() {
        let expr = Expr::literal(LogicVec::from_u64(5, 4), Span::DUMMY);
        assert_eq!(expr.op, ExprOp::Static);
        match &expr.slot {
            VectorSlot::Owned(v) => assert_eq!(v.to_u64(), Some(5)),
            VectorSlot::Alias { .. } => panic!("literal must own its value"),
        }
    }
}
