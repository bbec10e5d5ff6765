//! Return-path analysis.
//!
//! Each statement is classified by whether execution past it can have
//! returned: on no path, on some paths, or on every path. A non-void
//! function body must come out as [ReturnStatus::Always].

use crate::ast::{Block, Stmt, StmtKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReturnStatus {
    Never,
    Maybe,
    Always,
}

impl ReturnStatus {
    /// Combines two statements executed one after the other.
    fn then(self, next: ReturnStatus) -> ReturnStatus {
        self.max(next)
    }

    /// Combines the two arms of an if/else.
    fn either(self, other: ReturnStatus) -> ReturnStatus {
        match (self, other) {
            (ReturnStatus::Always, ReturnStatus::Always) => ReturnStatus::Always,
            (ReturnStatus::Never, ReturnStatus::Never) => ReturnStatus::Never,
            _ => ReturnStatus::Maybe,
        }
    }

    /// Caps the status of a body that might not execute at all: a loop
    /// body, or an `if` arm with no `else`.
    fn at_most_maybe(self) -> ReturnStatus {
        self.min(ReturnStatus::Maybe)
    }
}

pub(super) fn block_status(block: &Block) -> ReturnStatus {
    block
        .statements
        .iter()
        .map(statement_status)
        .fold(ReturnStatus::Never, ReturnStatus::then)
}

pub(super) fn statement_status(stmt: &Stmt) -> ReturnStatus {
    match &stmt.kind {
        StmtKind::Return(_) => ReturnStatus::Always,
        StmtKind::If { then, els, .. } => {
            let then_status = statement_status(then);
            match els {
                Some(els) => then_status.either(statement_status(els)),
                None => then_status.at_most_maybe(),
            }
        }
        StmtKind::While { body, .. } => statement_status(body).at_most_maybe(),
        StmtKind::Block(block) => block_status(block),
        StmtKind::VarDec { .. }
        | StmtKind::Assign { .. }
        | StmtKind::Break
        | StmtKind::Println(_)
        | StmtKind::Exp(_) => ReturnStatus::Never,
    }
}
