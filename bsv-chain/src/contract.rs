//! Declarative locking/unlocking scripts: a contract is a small program that
//! appends opcodes and pushdata to a [`Script`] it is building, given its own
//! parameters and (once the surrounding transaction exists) a `(tx, vin)`
//! context.
//!
//! There is no precedent for this layer in the data model this crate is
//! otherwise patterned on; its shape (a `Render` trait implemented by a
//! closed `Template` enum, per the redesign notes on "contract rendering")
//! is this crate's own, built directly from the behavioral description
//! rather than adapted from an existing module.

pub mod helpers;
pub mod push_tx;
pub mod templates;

pub use templates::Template;

use crate::script::Script;
use crate::transaction::Tx;

/// The `(tx, vin)` a contract renders against once the surrounding
/// transaction has been assembled. Absent during the first signing pass.
#[derive(Debug, Clone)]
pub struct TxContext {
    pub tx: Tx,
    pub vin: usize,
}

/// The script under construction, plus the optional context a contract
/// consults to bind signatures to the final transaction.
#[derive(Debug, Clone)]
pub struct RenderCtx {
    script: Script,
    pub tx_ctx: Option<TxContext>,
}

impl RenderCtx {
    pub fn new(tx_ctx: Option<TxContext>) -> Self {
        RenderCtx {
            script: Script::empty(),
            tx_ctx,
        }
    }

    pub fn into_script(self) -> Script {
        self.script
    }

    pub fn chunks(&self) -> &[crate::script::Chunk] {
        self.script.chunks()
    }

    pub fn op(mut self, opcode: crate::script::Opcode) -> Self {
        self.script.push_op(opcode);
        self
    }

    pub fn push(mut self, bytes: Vec<u8>) -> Self {
        self.script.push_data(bytes);
        self
    }

    /// Pushes `n` as a `ScriptNum`-encoded data chunk (the idiomatic way to
    /// push a small integer literal onto the stack).
    pub fn push_int(mut self, n: i64) -> Self {
        self.script.push_int(n);
        self
    }

    /// Runs `f` and returns its result, threading `self` through unchanged
    /// in structure (a convenience for combinators that need to inspect
    /// `self` before deciding how to continue it).
    pub fn then(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self)
    }
}

/// A contract that knows how to render itself as a locking script and, given
/// whatever unlocking parameters it was constructed with, an unlocking
/// script.
pub trait Render {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx;
    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx;
}

pub fn render_locking_script(template: &Template, tx_ctx: Option<TxContext>) -> Script {
    template.locking_script(RenderCtx::new(tx_ctx)).into_script()
}

pub fn render_unlocking_script(template: &Template, tx_ctx: Option<TxContext>) -> Script {
    template.unlocking_script(RenderCtx::new(tx_ctx)).into_script()
}
