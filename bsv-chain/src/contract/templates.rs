//! The closed set of contract shapes: pay-to-pubkey-hash, pay-to-pubkey, bare
//! multisig, data carriers, literal scripts, and an escape hatch for anything
//! else. [`Template`] is the sum type the redesign notes ask for in place of
//! a generator-function-plus-parameter-map contract struct.

use super::push_tx::ZERO_SIG_LEN;
use super::{Render, RenderCtx, TxContext};
use crate::keys::{PrivKey, PubKey};
use crate::script::{Chunk, Opcode, Script};
use crate::sighash::{self, SigHashType};
use crate::transparent::TxOut;

/// What a single-key spend needs to sign: the key, the previous output it
/// spends (script and satoshis both feed the sighash), and the sighash type.
#[derive(Debug, Clone)]
pub struct Unlock {
    pub privkey: PrivKey,
    pub pubkey: PubKey,
    pub prev_txout: TxOut,
    pub sighash_type: SigHashType,
}

impl Unlock {
    fn sign(&self, tx_ctx: &Option<TxContext>) -> Vec<u8> {
        match tx_ctx {
            Some(ctx) => sighash::sign(
                &ctx.tx,
                ctx.vin,
                &self.prev_txout.script,
                self.prev_txout.satoshis,
                self.sighash_type,
                self.privkey.secret_key(),
            )
            .expect("signing a well-formed transaction cannot fail"),
            None => vec![0u8; ZERO_SIG_LEN],
        }
    }
}

/// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
#[derive(Debug, Clone)]
pub struct P2pkh {
    pub pubkey_hash: [u8; 20],
    pub unlock: Option<Unlock>,
}

impl Render for P2pkh {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        ctx.op(Opcode::Dup)
            .op(Opcode::Hash160)
            .push(self.pubkey_hash.to_vec())
            .op(Opcode::EqualVerify)
            .op(Opcode::CheckSig)
    }

    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        let tx_ctx = ctx.tx_ctx.clone();
        match &self.unlock {
            Some(unlock) => {
                let sig = unlock.sign(&tx_ctx);
                ctx.push(sig).push(unlock.pubkey.to_bytes())
            }
            None => ctx.push(vec![0u8; ZERO_SIG_LEN]).push(vec![0u8; 33]),
        }
    }
}

/// `<pubkey> OP_CHECKSIG`.
#[derive(Debug, Clone)]
pub struct P2pk {
    pub pubkey: PubKey,
    pub unlock: Option<Unlock>,
}

impl Render for P2pk {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        ctx.push(self.pubkey.to_bytes()).op(Opcode::CheckSig)
    }

    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        let tx_ctx = ctx.tx_ctx.clone();
        match &self.unlock {
            Some(unlock) => ctx.push(unlock.sign(&tx_ctx)),
            None => ctx.push(vec![0u8; ZERO_SIG_LEN]),
        }
    }
}

/// Bare `threshold`-of-`pubkeys.len()` multisig:
/// `OP_<m> <pubkey>... OP_<n> OP_CHECKMULTISIG`. `threshold`/the pubkey count
/// are pushed as ordinary `ScriptNum` data rather than the small-int opcodes
/// real miners expect for standardness — this VM decodes both forms
/// identically, and this layer doesn't enforce standardness rules elsewhere.
#[derive(Debug, Clone)]
pub struct P2ms {
    pub threshold: usize,
    pub pubkeys: Vec<PubKey>,
    /// Signers, in the same relative order their pubkeys appear in
    /// `pubkeys` — `OP_CHECKMULTISIG` matches a subset greedily but never
    /// backtracks, so out-of-order signers fail to verify.
    pub unlock: Option<Vec<Unlock>>,
}

impl Render for P2ms {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        let ctx = ctx.push_int(self.threshold as i64);
        let pubkeys: Vec<Vec<u8>> = self.pubkeys.iter().map(|pk| pk.to_bytes()).collect();
        let ctx = super::helpers::push_all(ctx, &pubkeys);
        ctx.push_int(self.pubkeys.len() as i64).op(Opcode::CheckMultisig)
    }

    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        let tx_ctx = ctx.tx_ctx.clone();
        // OP_CHECKMULTISIG pops one extra item due to Bitcoin's off-by-one.
        let ctx = ctx.op(Opcode::False);
        match &self.unlock {
            Some(signers) => signers.iter().fold(ctx, |ctx, unlock| ctx.push(unlock.sign(&tx_ctx))),
            None => (0..self.threshold).fold(ctx, |ctx, _| ctx.push(vec![0u8; ZERO_SIG_LEN])),
        }
    }
}

/// `OP_FALSE OP_RETURN <data>...`: an unspendable data carrier.
#[derive(Debug, Clone)]
pub struct OpReturn {
    pub data: Vec<Vec<u8>>,
}

impl Render for OpReturn {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        let ctx = ctx.op(Opcode::False).op(Opcode::Return);
        super::helpers::push_all(ctx, &self.data)
    }

    /// Data-carrier outputs are provably unspendable; there is nothing to
    /// unlock.
    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        ctx
    }
}

/// A literal pair of locking/unlocking scripts, rendered verbatim. Useful for
/// tests and for wrapping a script assembled some other way in the `Render`
/// interface.
#[derive(Debug, Clone)]
pub struct Raw {
    pub locking: Script,
    pub unlocking: Script,
}

impl Render for Raw {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        append_chunks(ctx, &self.locking)
    }

    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        append_chunks(ctx, &self.unlocking)
    }
}

fn append_chunks(ctx: RenderCtx, script: &Script) -> RenderCtx {
    script.chunks().iter().cloned().fold(ctx, |ctx, chunk| match chunk {
        Chunk::Op(op) => ctx.op(op),
        Chunk::Push(bytes) => ctx.push(bytes),
    })
}

/// The closed set of contract shapes, plus `Custom` for anything this crate
/// doesn't model directly.
pub enum Template {
    P2pkh(P2pkh),
    P2pk(P2pk),
    P2ms(P2ms),
    OpReturn(OpReturn),
    Raw(Raw),
    Custom(Box<dyn Render>),
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Template::P2pkh(t) => f.debug_tuple("P2pkh").field(t).finish(),
            Template::P2pk(t) => f.debug_tuple("P2pk").field(t).finish(),
            Template::P2ms(t) => f.debug_tuple("P2ms").field(t).finish(),
            Template::OpReturn(t) => f.debug_tuple("OpReturn").field(t).finish(),
            Template::Raw(t) => f.debug_tuple("Raw").field(t).finish(),
            Template::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Render for Template {
    fn locking_script(&self, ctx: RenderCtx) -> RenderCtx {
        match self {
            Template::P2pkh(t) => t.locking_script(ctx),
            Template::P2pk(t) => t.locking_script(ctx),
            Template::P2ms(t) => t.locking_script(ctx),
            Template::OpReturn(t) => t.locking_script(ctx),
            Template::Raw(t) => t.locking_script(ctx),
            Template::Custom(t) => t.locking_script(ctx),
        }
    }

    fn unlocking_script(&self, ctx: RenderCtx) -> RenderCtx {
        match self {
            Template::P2pkh(t) => t.unlocking_script(ctx),
            Template::P2pk(t) => t.unlocking_script(ctx),
            Template::P2ms(t) => t.unlocking_script(ctx),
            Template::OpReturn(t) => t.unlocking_script(ctx),
            Template::Raw(t) => t.unlocking_script(ctx),
            Template::Custom(t) => t.unlocking_script(ctx),
        }
    }
}
