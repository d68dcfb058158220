//! Elaborated design model for the Covra coverage kernel.
//!
//! The external parser produces signals, expression trees, and statement
//! graphs with unresolved name references; this crate owns that model. The
//! [`Design`] is the explicit simulation context holding the arenas for all
//! modules, signals, expressions, and statements, plus the instance scope
//! tree. The two-phase [`Binder`] resolves deferred `(scope, name)`
//! references into live signal bindings.

#![warn(missing_docs)]

pub mod arena;
pub mod bind;
pub mod design;
pub mod expr;
pub mod ids;
pub mod signal;
pub mod stmt;

pub use arena::{Arena, ArenaId};
pub use bind::{BindError, Binder, UNUSED_NAME_PREFIX};
pub use design::{Design, Instance, Module};
pub use expr::{ComboSet, DelayState, EdgeState, Expr, ExprCoverage, ExprOp, VectorSlot};
pub use ids::{ExprId, InstanceId, ModuleId, SignalId, StmtId};
pub use signal::{PortDirection, Signal};
pub use stmt::{collect_block, Stmt, StmtState};
