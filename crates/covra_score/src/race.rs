//! Race-condition validation.
//!
//! The kernel applies non-blocking assignments through the same immediate
//! path as blocking ones instead of modeling full event-region semantics.
//! That simplification is only sound for blocks whose results cannot
//! depend on intra-timestep ordering, so every statement block is vetted
//! here, once, after binding and before any event is applied. Blocks that
//! fail are disabled outright: simulated coverage for them would be a
//! guess, and a guess is worse than an honest gap.

use crate::error::ScoreError;
use covra_common::BitMask;
use covra_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use covra_model::{collect_block, Design, ExprId, ExprOp, ModuleId, SignalId, StmtId};
use covra_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How race findings are reported.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum RaceSeverity {
    /// Warning diagnostics; offending blocks are disabled.
    #[default]
    Normal,
    /// Note diagnostics; offending blocks are disabled.
    Warn,
    /// Error diagnostics; the run aborts.
    Fatal,
}

/// Why a block failed validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RaceReason {
    /// A sequential (edge-clocked) block uses a blocking assignment.
    BlockingInSequential,
    /// A combinational block uses a non-blocking assignment.
    NonblockingInCombinational,
    /// A mixed sequential/combinational block uses a blocking assignment.
    BlockingInMixed,
    /// A block mixes blocking and non-blocking assignments.
    MixedAssignments,
    /// A signal range is assigned from more than one block.
    MultiBlockAssignment,
    /// An input port is assigned inside a block.
    InputPortAssignment,
}

impl RaceReason {
    /// The R-series code number for this reason.
    pub fn code(self) -> DiagnosticCode {
        let number = match self {
            RaceReason::BlockingInSequential => 101,
            RaceReason::NonblockingInCombinational => 102,
            RaceReason::BlockingInMixed => 103,
            RaceReason::MixedAssignments => 104,
            RaceReason::MultiBlockAssignment => 105,
            RaceReason::InputPortAssignment => 106,
        };
        DiagnosticCode::new(Category::Race, number)
    }

    /// Human-readable finding text.
    pub fn message(self) -> &'static str {
        match self {
            RaceReason::BlockingInSequential => {
                "sequential logic block contains a blocking assignment"
            }
            RaceReason::NonblockingInCombinational => {
                "combinational logic block contains a non-blocking assignment"
            }
            RaceReason::BlockingInMixed => {
                "mixed sequential/combinational block contains a blocking assignment"
            }
            RaceReason::MixedAssignments => {
                "statement block mixes blocking and non-blocking assignments"
            }
            RaceReason::MultiBlockAssignment => {
                "signal is assigned in two different statement blocks"
            }
            RaceReason::InputPortAssignment => "input port is assigned inside a statement block",
        }
    }
}

/// A block removed from simulation and coverage by validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisabledBlock {
    /// The block's head statement.
    pub head: StmtId,
    /// The module the block belongs to.
    pub module: ModuleId,
    /// Source lines of the head statement.
    pub span: Span,
    /// Why the block was disabled.
    pub reason: RaceReason,
}

/// One assignment found inside a block.
struct FoundAssignment {
    op: ExprOp,
    target: Option<SignalId>,
    /// Storage bit range written, inclusive. `None` means the whole
    /// signal (dynamic selects mark the whole range, a deliberate
    /// over-approximation).
    range: Option<(u32, u32)>,
}

fn find_assignments(design: &Design, root: ExprId, out: &mut Vec<FoundAssignment>) {
    for id in design.expr_subtree(root) {
        let node = &design.exprs[id];
        if !node.op.is_assignment() {
            continue;
        }
        let Some(target) = node.left else {
            continue;
        };
        let target_node = &design.exprs[target];
        let range = match target_node.op {
            ExprOp::SbitSel | ExprOp::MbitSel => {
                if target_node.left.is_some() {
                    None // dynamic index
                } else {
                    target_node
                        .select_offset
                        .map(|lsb| (lsb, lsb + target_node.width() - 1))
                }
            }
            _ => None,
        };
        out.push(FoundAssignment {
            op: node.op,
            target: target_node.bound,
            range,
        });
    }
}

/// Validates every statement block in the design.
///
/// Offending blocks are disabled (detached from fanout, excluded from
/// coverage) unless severity is [`RaceSeverity::Fatal`], in which case
/// findings are reported and the run aborts with
/// [`ScoreError::RaceAbort`]. Returns the disabled blocks for external
/// reporting.
pub fn validate(
    design: &mut Design,
    severity: RaceSeverity,
    sink: &DiagnosticSink,
) -> Result<Vec<DisabledBlock>, ScoreError> {
    let heads: Vec<(ModuleId, StmtId)> = design
        .modules
        .iter()
        .flat_map(|(module, m)| m.heads.iter().map(move |&h| (module, h)))
        .collect();

    let mut findings = Vec::new();
    for (module, head) in heads {
        let block = collect_block(&design.stmts, head);

        let mut sequential = false;
        let mut combinational = false;
        let mut assignments = Vec::new();
        for &stmt in &block {
            let root = design.stmts[stmt].root;
            for id in design.expr_subtree(root) {
                match design.exprs[id].op {
                    ExprOp::Pedge | ExprOp::Nedge => sequential = true,
                    ExprOp::Aedge => combinational = true,
                    _ => {}
                }
            }
            find_assignments(design, root, &mut assignments);
        }

        let has_blocking = assignments.iter().any(|a| a.op.is_blocking());
        let has_nonblocking = assignments.iter().any(|a| a.op.is_nonblocking());

        let mut reason = if sequential && !combinational && has_blocking {
            Some(RaceReason::BlockingInSequential)
        } else if combinational && !sequential && has_nonblocking {
            Some(RaceReason::NonblockingInCombinational)
        } else if sequential && combinational && has_blocking {
            Some(RaceReason::BlockingInMixed)
        } else if has_blocking && has_nonblocking {
            Some(RaceReason::MixedAssignments)
        } else {
            None
        };

        // Per-bit multi-block bookkeeping. The block's writes are pooled
        // locally first: only bits already claimed by an *earlier* block
        // conflict, never repeated assignments within this one.
        let mut block_writes: HashMap<SignalId, BitMask> = HashMap::new();
        for assignment in &assignments {
            let Some(signal) = assignment.target else {
                continue;
            };
            let width = design.signals[signal].width();
            let (lsb, msb) = assignment.range.unwrap_or((0, width - 1));
            block_writes
                .entry(signal)
                .or_insert_with(|| BitMask::new(width))
                .set_range(lsb, msb);
            if design.signals[signal].port.is_driven_externally() {
                reason.get_or_insert(RaceReason::InputPortAssignment);
            }
        }
        for (signal, writes) in &block_writes {
            let sig = &mut design.signals[*signal];
            if sig.assigned.intersects(writes) {
                reason.get_or_insert(RaceReason::MultiBlockAssignment);
            }
            sig.assigned.union(writes);
        }

        if let Some(reason) = reason {
            findings.push(DisabledBlock {
                head,
                module,
                span: design.stmts[head].span,
                reason,
            });
        }
    }

    for finding in &findings {
        let diag_severity = match severity {
            RaceSeverity::Normal => Severity::Warning,
            RaceSeverity::Warn => Severity::Note,
            RaceSeverity::Fatal => Severity::Error,
        };
        let mut diag = Diagnostic::new(
            diag_severity,
            finding.reason.code(),
            finding.reason.message(),
            finding.span,
        );
        if severity != RaceSeverity::Fatal {
            diag = diag.with_note("block excluded from simulation and coverage");
        }
        sink.emit(diag);
    }

    if severity == RaceSeverity::Fatal {
        if !findings.is_empty() {
            return Err(ScoreError::RaceAbort {
                count: findings.len(),
            });
        }
    } else {
        for finding in &findings {
            design.disable_block(finding.head);
        }
    }
    Ok(findings)
}
