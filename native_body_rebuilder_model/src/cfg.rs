//! Control-flow graphs and method bodies.
//!
//! The body owns the local table; statements share `Rc` handles to the same
//! locals. Blocks and statements keep insertion order, which whole-program
//! passes rely on for deterministic iteration.

use crate::stmt::Stmt;
use crate::value::LocalRef;

/// An ordered statement list.
#[derive(Debug, Default)]
pub struct BasicBlock {
    pub stmts: Vec<Stmt>,
}

impl BasicBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }
}

/// A method's control-flow graph: blocks in order.
#[derive(Debug, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
}

impl Cfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a CFG from a single straight-line block.
    pub fn single_block(block: BasicBlock) -> Self {
        Self {
            blocks: vec![block],
        }
    }
}

/// A method body: the locals it owns plus its CFG.
#[derive(Debug)]
pub struct Body {
    pub locals: Vec<LocalRef>,
    pub cfg: Cfg,
}

impl Body {
    pub fn new(locals: Vec<LocalRef>, cfg: Cfg) -> Self {
        Self { locals, cfg }
    }

    /// Total statement count across all blocks.
    pub fn stmt_count(&self) -> usize {
        self.cfg.blocks.iter().map(|b| b.stmts.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Stmt;

    #[test]
    fn test_stmt_count_spans_blocks() {
        let mut a = BasicBlock::new();
        a.push(Stmt::Return(None));
        let mut b = BasicBlock::new();
        b.push(Stmt::Return(None));
        b.push(Stmt::Return(None));
        let body = Body::new(Vec::new(), Cfg { blocks: vec![a, b] });
        assert_eq!(body.stmt_count(), 3);
    }
}
