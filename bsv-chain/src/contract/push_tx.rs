//! `OP_PUSH_TX`: the introspection idiom where an unlocking script pushes
//! the spending transaction's own sighash pre-image, and the locking script
//! checks it is genuine (via a signature over it) before slicing individual
//! fields out of it with `OP_SPLIT` to constrain the transaction's shape.
//!
//! There's no teacher precedent for this; the field layout mirrors
//! [`crate::sighash`]'s forkid pre-image exactly, and the `OP_SPLIT` walk is
//! this crate's own.

use super::RenderCtx;
use crate::keys::PubKey;
use crate::script::Opcode;

/// The pre-image placeholder length during the first (no-context) signing
/// pass. Its content doesn't matter — it's never executed — only its byte
/// count, which must match the real pre-image's typical size so that fee
/// computation after pass one stays accurate.
pub const PUSH_TX_PREIMAGE_PLACEHOLDER_LEN: usize = 181;

/// The placeholder signature length (DER signature plus trailing sighash
/// type byte) used during the first signing pass, for the same reason.
pub const ZERO_SIG_LEN: usize = 71;

/// Pushes the pre-image bytes an unlocking script asserts as the real one,
/// or the zero placeholder when no `(tx, vin)` context exists yet.
pub fn push_tx(ctx: RenderCtx, preimage: Option<&[u8]>) -> RenderCtx {
    match preimage {
        Some(bytes) => ctx.push(bytes.to_vec()),
        None => ctx.push(vec![0u8; PUSH_TX_PREIMAGE_PLACEHOLDER_LEN]),
    }
}

/// Given `<preimage> <sig>` on top of the stack, checks `sig` against
/// `pubkey`, leaving `<preimage> <bool>`. A true result only holds if `sig`
/// really is a signature over (the hash of) the preimage bytes still
/// sitting underneath it — binding that copy to the transaction `OP_CHECKSIG`
/// itself verifies against.
pub fn check_tx(ctx: RenderCtx, pubkey: &PubKey) -> RenderCtx {
    ctx.push(pubkey.to_bytes()).op(Opcode::CheckSig)
}

/// Like [`check_tx`], but renders a shape-correct stand-in when the signing
/// key isn't known yet: consumes the placeholder signature and leaves a
/// truthy result in its place, so a script skeleton can still be measured
/// for size before the real contract parameters exist.
pub fn check_tx_opt(ctx: RenderCtx, pubkey: Option<&PubKey>) -> RenderCtx {
    match pubkey {
        Some(pk) => check_tx(ctx, pk),
        None => ctx.op(Opcode::Drop).op(Opcode::True),
    }
}

/// Byte offsets of each field within the forkid sighash pre-image, given the
/// length of its `subscript` (assumed to carry a single-byte `VarInt` tag,
/// i.e. under 253 bytes — true of every locking script this crate renders).
struct FieldOffsets {
    version: (usize, usize),
    hash_prevouts: (usize, usize),
    hash_sequence: (usize, usize),
    outpoint: (usize, usize),
    subscript: (usize, usize),
    value: (usize, usize),
    sequence: (usize, usize),
    hash_outputs: (usize, usize),
    locktime: (usize, usize),
}

fn field_offsets(subscript_len: usize) -> FieldOffsets {
    let mut offset = 0usize;
    let mut next = |len: usize| {
        let start = offset;
        offset += len;
        (start, len)
    };
    FieldOffsets {
        version: next(4),
        hash_prevouts: next(32),
        hash_sequence: next(32),
        outpoint: next(36),
        subscript: next(1 + subscript_len),
        value: next(8),
        sequence: next(4),
        hash_outputs: next(32),
        locktime: next(4),
    }
}

/// Duplicates the top-of-stack byte string and slices `[offset, offset+len)`
/// out of the copy via `OP_SPLIT`, leaving the original intact underneath.
fn get_field(ctx: RenderCtx, offset: usize, len: usize) -> RenderCtx {
    let mut ctx = ctx.op(Opcode::Dup);
    if offset > 0 {
        ctx = ctx.push_int(offset as i64).op(Opcode::Split).op(Opcode::Nip);
    }
    ctx.push_int(len as i64).op(Opcode::Split).op(Opcode::Drop)
}

pub fn get_version(ctx: RenderCtx) -> RenderCtx {
    let (o, l) = field_offsets(0).version;
    get_field(ctx, o, l)
}

pub fn get_hash_prevouts(ctx: RenderCtx) -> RenderCtx {
    let (o, l) = field_offsets(0).hash_prevouts;
    get_field(ctx, o, l)
}

pub fn get_hash_sequence(ctx: RenderCtx) -> RenderCtx {
    let (o, l) = field_offsets(0).hash_sequence;
    get_field(ctx, o, l)
}

pub fn get_outpoint(ctx: RenderCtx) -> RenderCtx {
    let (o, l) = field_offsets(0).outpoint;
    get_field(ctx, o, l)
}

pub fn get_subscript(ctx: RenderCtx, subscript_len: usize) -> RenderCtx {
    let (o, l) = field_offsets(subscript_len).subscript;
    get_field(ctx, o, l)
}

pub fn get_value(ctx: RenderCtx, subscript_len: usize) -> RenderCtx {
    let (o, l) = field_offsets(subscript_len).value;
    get_field(ctx, o, l)
}

pub fn get_sequence(ctx: RenderCtx, subscript_len: usize) -> RenderCtx {
    let (o, l) = field_offsets(subscript_len).sequence;
    get_field(ctx, o, l)
}

pub fn get_hash_outputs(ctx: RenderCtx, subscript_len: usize) -> RenderCtx {
    let (o, l) = field_offsets(subscript_len).hash_outputs;
    get_field(ctx, o, l)
}

pub fn get_locktime(ctx: RenderCtx, subscript_len: usize) -> RenderCtx {
    let (o, l) = field_offsets(subscript_len).locktime;
    get_field(ctx, o, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Ctx, Interpreter, Options};

    fn run(ctx: RenderCtx) -> Interpreter {
        let script = ctx.into_script();
        let mut interp = Interpreter::new(Options::default(), None::<Ctx>);
        interp.eval(script.chunks());
        interp
    }

    #[test]
    fn placeholder_preimage_has_the_documented_length() {
        let interp = run(push_tx(RenderCtx::new(None), None));
        assert_eq!(interp.stack(), &[vec![0u8; PUSH_TX_PREIMAGE_PLACEHOLDER_LEN]]);
    }

    #[test]
    fn get_version_extracts_the_leading_four_bytes() {
        let mut preimage = vec![0x01, 0x00, 0x00, 0x00];
        preimage.extend_from_slice(&[0xAA; 20]);
        let ctx = push_tx(RenderCtx::new(None), Some(&preimage));
        let interp = run(get_version(ctx));
        assert_eq!(interp.stack(), &[preimage, vec![0x01, 0x00, 0x00, 0x00]]);
    }

    #[test]
    fn get_locktime_extracts_the_trailing_four_bytes() {
        let subscript_len = 5;
        let total = field_offsets(subscript_len).locktime.0 + 4;
        let mut preimage = vec![0u8; total - 4];
        preimage.extend_from_slice(&[0x2A, 0x00, 0x00, 0x00]);
        let ctx = push_tx(RenderCtx::new(None), Some(&preimage));
        let interp = run(get_locktime(ctx, subscript_len));
        assert_eq!(
            interp.stack(),
            &[preimage, vec![0x2A, 0x00, 0x00, 0x00]]
        );
    }

    #[test]
    fn check_tx_opt_with_no_pubkey_leaves_a_truthy_placeholder() {
        let ctx = RenderCtx::new(None).push(vec![0xAA; 4]).push(vec![0u8; ZERO_SIG_LEN]);
        let interp = run(check_tx_opt(ctx, None));
        assert_eq!(interp.stack(), &[vec![0xAA; 4], vec![1]]);
    }
}
