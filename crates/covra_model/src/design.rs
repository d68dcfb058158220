//! The elaborated design: arenas, modules, and the instance scope tree.
//!
//! [`Design`] is the explicit context threaded through binding, race
//! validation, and scoring. All cross-references between entities are
//! arena IDs, so the cyclic statement graph needs no shared ownership.

use crate::arena::Arena;
use crate::expr::{Expr, ExprOp, VectorSlot};
use crate::ids::{ExprId, InstanceId, ModuleId, SignalId, StmtId};
use crate::signal::Signal;
use crate::stmt::{collect_block, Stmt};
use covra_common::{BitMask, Ident, LogicVec};
use covra_source::Span;
use serde::{Deserialize, Serialize};

/// A design module: a named container of signals and statements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Module {
    /// Module type name.
    pub name: Ident,
    /// Signals declared in this module.
    pub signals: Vec<SignalId>,
    /// All statements of this module, in allocation order.
    pub stmts: Vec<StmtId>,
    /// Block heads, in declaration order.
    pub heads: Vec<StmtId>,
    /// Declaration site.
    pub span: Span,
}

/// A node in the instance scope tree, mapping a hierarchical scope
/// path to the module instantiated there.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    /// Full hierarchical scope path (e.g. `top.u0`).
    pub scope: Ident,
    /// The instantiated module.
    pub module: ModuleId,
}

/// The elaborated design model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Design {
    /// All modules.
    pub modules: Arena<ModuleId, Module>,
    /// All signals.
    pub signals: Arena<SignalId, Signal>,
    /// All expression nodes.
    pub exprs: Arena<ExprId, Expr>,
    /// All statement nodes.
    pub stmts: Arena<StmtId, Stmt>,
    /// Instance scope tree, flattened.
    pub instances: Arena<InstanceId, Instance>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module.
    pub fn add_module(&mut self, name: Ident, span: Span) -> ModuleId {
        self.modules.alloc(Module {
            name,
            signals: Vec::new(),
            stmts: Vec::new(),
            heads: Vec::new(),
            span,
        })
    }

    /// Adds an instance of `module` at the given scope path.
    pub fn add_instance(&mut self, scope: Ident, module: ModuleId) -> InstanceId {
        self.instances.alloc(Instance { scope, module })
    }

    /// Returns the module instantiated at the given scope, if any.
    pub fn find_instance(&self, scope: Ident) -> Option<ModuleId> {
        self.instances
            .values()
            .find(|inst| inst.scope == scope)
            .map(|inst| inst.module)
    }

    /// Adds a signal to the given module.
    pub fn add_signal(&mut self, module: ModuleId, signal: Signal) -> SignalId {
        let id = self.signals.alloc(signal);
        self.modules[module].signals.push(id);
        id
    }

    /// Looks up a signal by local name within the module at `scope`.
    pub fn find_signal(&self, scope: Ident, name: Ident) -> Option<SignalId> {
        let module = self.find_instance(scope)?;
        self.modules[module]
            .signals
            .iter()
            .copied()
            .find(|&id| self.signals[id].name == name)
    }

    /// Adds an expression node.
    pub fn add_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Attaches children to `parent`, fixing up their parent backlinks.
    pub fn set_children(&mut self, parent: ExprId, left: Option<ExprId>, right: Option<ExprId>) {
        self.exprs[parent].left = left;
        self.exprs[parent].right = right;
        if let Some(child) = left {
            self.exprs[child].parent = Some(parent);
        }
        if let Some(child) = right {
            self.exprs[child].parent = Some(parent);
        }
    }

    /// Adds a statement over `root` to the given module.
    ///
    /// Marks `root` as a tree root and records the ownership backlink
    /// used by propagation to find the statement to wake.
    pub fn add_stmt(&mut self, module: ModuleId, root: ExprId, span: Span) -> StmtId {
        let id = self.stmts.alloc(Stmt::new(root, module, span));
        let root_expr = &mut self.exprs[root];
        root_expr.cov.is_root = true;
        root_expr.owner = Some(id);
        self.modules[module].stmts.push(id);
        id
    }

    /// Sets a statement's successor links.
    pub fn link_stmt(&mut self, stmt: StmtId, next_true: Option<StmtId>, next_false: Option<StmtId>) {
        self.stmts[stmt].next_true = next_true;
        self.stmts[stmt].next_false = next_false;
    }

    /// Marks a statement as a block head.
    pub fn mark_head(&mut self, stmt: StmtId) {
        self.stmts[stmt].head = true;
        let root = self.stmts[stmt].root;
        self.exprs[root].cov.is_head = true;
        let module = self.stmts[stmt].module;
        self.modules[module].heads.push(stmt);
    }

    /// Marks a statement as a control-flow rejoin point.
    pub fn mark_stop(&mut self, stmt: StmtId) {
        self.stmts[stmt].stop = true;
        let root = self.stmts[stmt].root;
        self.exprs[root].cov.is_stop = true;
    }

    /// Reads an expression's current value.
    ///
    /// Owned slots are cloned; alias slots read through the signal's
    /// storage window.
    pub fn value_of(&self, expr: ExprId) -> LogicVec {
        match &self.exprs[expr].slot {
            VectorSlot::Owned(vec) => vec.clone(),
            VectorSlot::Alias { signal, lsb, width } => {
                self.signals[*signal].value.slice(*lsb, *width)
            }
        }
    }

    /// Overwrites an owned expression slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is a signal alias; aliases have no storage of
    /// their own to write.
    pub fn set_owned_value(&mut self, expr: ExprId, value: LogicVec) {
        match &mut self.exprs[expr].slot {
            VectorSlot::Owned(vec) => *vec = value,
            VectorSlot::Alias { .. } => panic!("cannot write through a signal alias slot"),
        }
    }

    /// Walks parent backlinks from `expr` to the tree root and returns
    /// the owning statement, if the root belongs to one.
    pub fn owning_stmt(&self, expr: ExprId) -> Option<StmtId> {
        let mut cur = expr;
        while let Some(parent) = self.exprs[cur].parent {
            cur = parent;
        }
        self.exprs[cur].owner
    }

    /// Binds a signal reference expression to its resolved signal.
    ///
    /// Converts the node's slot to an alias window over the signal's
    /// storage and appends the node to the signal's dependent list.
    /// Whole-signal references cover the full range; selects use the
    /// node's static offset, with dynamic selects starting at zero
    /// until evaluation computes the index.
    pub fn bind_signal_ref(&mut self, expr: ExprId, signal: SignalId) {
        let sig_width = self.signals[signal].width();
        let node = &mut self.exprs[expr];
        node.bound = Some(signal);
        let (lsb, width) = match node.op {
            ExprOp::Signal => (0, sig_width),
            ExprOp::SbitSel => (node.select_offset.unwrap_or(0), 1),
            ExprOp::MbitSel => (node.select_offset.unwrap_or(0), node.width()),
            _ => (0, node.width()),
        };
        node.slot = VectorSlot::Alias { signal, lsb, width };
        self.signals[signal].dependents.push(expr);
    }

    /// Resizes a signal's declared range after late elaboration.
    ///
    /// The value and coverage masks are re-created at the new width and
    /// every dependent alias window is recomputed: whole-signal aliases
    /// take the full new range, select windows are clamped to it.
    pub fn resize_signal(&mut self, signal: SignalId, msb: u32, lsb: u32) {
        assert!(msb >= lsb, "signal range must have msb >= lsb");
        let width = msb - lsb + 1;
        let dependents = {
            let sig = &mut self.signals[signal];
            sig.msb = msb;
            sig.lsb = lsb;
            sig.value = LogicVec::all_x(width);
            sig.assigned = BitMask::new(width);
            sig.toggle01 = BitMask::new(width);
            sig.toggle10 = BitMask::new(width);
            sig.dependents.clone()
        };
        for dep in dependents {
            let node = &mut self.exprs[dep];
            if let VectorSlot::Alias {
                lsb: ref mut alias_lsb,
                width: ref mut alias_width,
                ..
            } = node.slot
            {
                match node.op {
                    ExprOp::Signal => {
                        *alias_lsb = 0;
                        *alias_width = width;
                    }
                    _ => {
                        if *alias_lsb >= width {
                            *alias_lsb = 0;
                        }
                        *alias_width = (*alias_width).min(width - *alias_lsb);
                    }
                }
            }
        }
    }

    /// Collects every expression in the tree rooted at `root`.
    pub fn expr_subtree(&self, root: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut work = vec![root];
        while let Some(id) = work.pop() {
            out.push(id);
            let node = &self.exprs[id];
            if let Some(left) = node.left {
                work.push(left);
            }
            if let Some(right) = node.right {
                work.push(right);
            }
        }
        out
    }

    /// Disables the block headed at `head` and detaches it from
    /// signal fanout so it neither simulates nor reports coverage.
    pub fn disable_block(&mut self, head: StmtId) {
        for stmt in collect_block(&self.stmts, head) {
            self.stmts[stmt].disabled = true;
            let root = self.stmts[stmt].root;
            for expr in self.expr_subtree(root) {
                if let Some(signal) = self.exprs[expr].bound {
                    self.signals[signal].dependents.retain(|&d| d != expr);
                }
            }
        }
    }
}
