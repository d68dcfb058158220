//! Two-phase name binding.
//!
//! The parser cannot resolve signal names while modules are still being
//! read, so references are collected first and resolved in a second pass
//! once the whole design is elaborated. Resolution connects each signal
//! reference expression to its signal's storage and fanout list.

use crate::design::Design;
use crate::ids::ExprId;
use crate::signal::Signal;
use covra_common::{Ident, Interner};
use covra_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use covra_source::Span;
use thiserror::Error;

/// Names carrying this prefix are reserved and silently refuse to bind.
pub const UNUSED_NAME_PREFIX: &str = "_unused";

/// Errors produced during binder resolution.
#[derive(Error, Debug)]
pub enum BindError {
    /// A qualified or non-implicit reference named a signal that does
    /// not exist.
    #[error("reference to undefined signal '{name}' at {span}")]
    UndefinedSignal {
        /// The unresolved name as written.
        name: String,
        /// Location of the reference.
        span: Span,
    },
    /// An expression was bound twice; the model is corrupted.
    #[error("expression at {span} is already bound")]
    AlreadyBound {
        /// Location of the reference.
        span: Span,
    },
}

struct PendingRef {
    expr: ExprId,
    scope: Ident,
    name: Ident,
    implicit_ok: bool,
}

/// Deferred-reference collector and resolver.
///
/// Phase one records `(scope, name)` references as the parser emits
/// them; phase two resolves them against the completed design in
/// collection order, which fixes the binding order of every signal's
/// dependent list.
#[derive(Default)]
pub struct Binder {
    refs: Vec<PendingRef>,
}

impl Binder {
    /// Creates an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reference for later resolution.
    ///
    /// `scope` is the instance the reference occurs in; `name` may be a
    /// plain local name or a dot-qualified hierarchical path. Implicit
    /// creation of undeclared 1-bit signals is allowed only where the
    /// source language allows it, which the caller signals per
    /// reference.
    pub fn defer(&mut self, expr: ExprId, scope: Ident, name: Ident, implicit_ok: bool) {
        self.refs.push(PendingRef {
            expr,
            scope,
            name,
            implicit_ok,
        });
    }

    /// Returns the number of pending references.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns `true` if no references are pending.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Resolves all pending references against the design.
    ///
    /// Returns the number of references actually bound. Names with the
    /// reserved unused prefix are skipped silently; undeclared names in
    /// implicit-friendly positions create a 1-bit signal and warn with
    /// `B101`; anything else unresolved is a fatal error.
    pub fn resolve(
        self,
        design: &mut Design,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> Result<usize, BindError> {
        let mut bound = 0;
        for pending in self.refs {
            let raw = interner.resolve(pending.name);
            let (scope, local, qualified) = match raw.rfind('.') {
                Some(dot) => {
                    let scope = interner.get_or_intern(&raw[..dot]);
                    let local = interner.get_or_intern(&raw[dot + 1..]);
                    (scope, local, true)
                }
                None => (pending.scope, pending.name, false),
            };
            let local_str = interner.resolve(local);

            if let Some(signal) = design.find_signal(scope, local) {
                bind_one(design, pending.expr, signal)?;
                bound += 1;
                continue;
            }
            if local_str.starts_with(UNUSED_NAME_PREFIX) {
                continue;
            }
            if !qualified && pending.implicit_ok {
                if let Some(module) = design.find_instance(scope) {
                    let span = design.exprs[pending.expr].span;
                    let signal = design.add_signal(module, Signal::new(local, scope, 0, 0, span));
                    sink.emit(Diagnostic::warning(
                        DiagnosticCode::new(Category::Bind, 101),
                        format!(
                            "signal '{}' is not declared in scope '{}'; created as implicit 1-bit",
                            local_str,
                            interner.resolve(scope)
                        ),
                        span,
                    ));
                    bind_one(design, pending.expr, signal)?;
                    bound += 1;
                    continue;
                }
            }
            return Err(BindError::UndefinedSignal {
                name: raw.to_string(),
                span: design.exprs[pending.expr].span,
            });
        }
        Ok(bound)
    }
}

fn bind_one(
    design: &mut Design,
    expr: ExprId,
    signal: crate::ids::SignalId,
) -> Result<(), BindError> {
    let node = &design.exprs[expr];
    debug_assert!(node.bound.is_none(), "expression bound twice");
    if node.bound.is_some() {
        return Err(BindError::AlreadyBound { span: node.span });
    }
    design.bind_signal_ref(expr, signal);
    Ok(())
}
