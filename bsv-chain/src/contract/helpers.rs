//! Composition primitives for building locking/unlocking scripts: control
//! flow (`op_if`/`op_notif` and their two/three-branch forms, `each`,
//! `repeat`), data-push helpers, and a small VarInt-reading family used by
//! the push-tx accessors in [`super::push_tx`].

use super::RenderCtx;
use crate::script::Opcode;

/// Applies `f` to `ctx` once per item, in order.
pub fn each<T>(ctx: RenderCtx, items: &[T], f: impl Fn(RenderCtx, &T) -> RenderCtx) -> RenderCtx {
    items.iter().fold(ctx, |ctx, item| f(ctx, item))
}

/// Applies `f` to `ctx` `n` times in a row.
pub fn repeat(ctx: RenderCtx, n: usize, f: impl Fn(RenderCtx) -> RenderCtx) -> RenderCtx {
    (0..n).fold(ctx, |ctx, _| f(ctx))
}

fn cond(ctx: RenderCtx, opener: Opcode, then_branch: impl FnOnce(RenderCtx) -> RenderCtx) -> RenderCtx {
    then_branch(ctx.op(opener))
}

/// `OP_IF <then> OP_ENDIF`.
pub fn op_if(ctx: RenderCtx, then_branch: impl FnOnce(RenderCtx) -> RenderCtx) -> RenderCtx {
    cond(ctx, Opcode::If, then_branch).op(Opcode::EndIf)
}

/// `OP_IF <then> OP_ELSE <else> OP_ENDIF`.
pub fn op_if2(
    ctx: RenderCtx,
    then_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    else_branch: impl FnOnce(RenderCtx) -> RenderCtx,
) -> RenderCtx {
    let ctx = cond(ctx, Opcode::If, then_branch);
    else_branch(ctx.op(Opcode::Else)).op(Opcode::EndIf)
}

/// `OP_IF <then> OP_ELSE <elif_cond> OP_IF <elif> OP_ELSE <else> OP_ENDIF OP_ENDIF`
/// — an if/else-if/else chain built from nested nodes, since Script has no
/// native else-if.
pub fn op_if3(
    ctx: RenderCtx,
    then_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    elif_cond: impl FnOnce(RenderCtx) -> RenderCtx,
    elif_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    else_branch: impl FnOnce(RenderCtx) -> RenderCtx,
) -> RenderCtx {
    let ctx = cond(ctx, Opcode::If, then_branch);
    let ctx = elif_cond(ctx.op(Opcode::Else));
    let ctx = cond(ctx, Opcode::If, elif_branch);
    else_branch(ctx.op(Opcode::Else)).op(Opcode::EndIf).op(Opcode::EndIf)
}

/// `OP_NOTIF <then> OP_ENDIF`.
pub fn op_notif(ctx: RenderCtx, then_branch: impl FnOnce(RenderCtx) -> RenderCtx) -> RenderCtx {
    cond(ctx, Opcode::NotIf, then_branch).op(Opcode::EndIf)
}

/// `OP_NOTIF <then> OP_ELSE <else> OP_ENDIF`.
pub fn op_notif2(
    ctx: RenderCtx,
    then_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    else_branch: impl FnOnce(RenderCtx) -> RenderCtx,
) -> RenderCtx {
    let ctx = cond(ctx, Opcode::NotIf, then_branch);
    else_branch(ctx.op(Opcode::Else)).op(Opcode::EndIf)
}

/// Three-branch `OP_NOTIF` chain, mirroring [`op_if3`].
pub fn op_notif3(
    ctx: RenderCtx,
    then_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    elif_cond: impl FnOnce(RenderCtx) -> RenderCtx,
    elif_branch: impl FnOnce(RenderCtx) -> RenderCtx,
    else_branch: impl FnOnce(RenderCtx) -> RenderCtx,
) -> RenderCtx {
    let ctx = cond(ctx, Opcode::NotIf, then_branch);
    let ctx = elif_cond(ctx.op(Opcode::Else));
    let ctx = cond(ctx, Opcode::If, elif_branch);
    else_branch(ctx.op(Opcode::Else)).op(Opcode::EndIf).op(Opcode::EndIf)
}

/// Pushes each byte string in `items` as its own data chunk, in order.
pub fn push_all(ctx: RenderCtx, items: &[Vec<u8>]) -> RenderCtx {
    items.iter().fold(ctx, |ctx, item| ctx.push(item.clone()))
}

/// `bytes[start..start + len]`, copied out — a plain Rust-side helper for
/// precomputing a fixed sub-range of a constant byte string at contract
/// construction time (as opposed to [`super::push_tx`]'s accessors, which
/// emit `OP_SPLIT` to do the equivalent slicing on-chain).
pub fn slice(bytes: &[u8], start: usize, len: usize) -> Vec<u8> {
    bytes[start..start + len].to_vec()
}

/// `bytes` with `front` bytes removed from the start and `back` bytes
/// removed from the end.
pub fn trim(bytes: &[u8], front: usize, back: usize) -> Vec<u8> {
    bytes[front..bytes.len() - back].to_vec()
}

/// Given a byte string on top of the stack, leaves its first byte decoded as
/// a number on top, below which the original byte string is left intact.
///
/// Only the single-byte `VarInt` tag range (`< 0xFD`) is handled — every
/// length this crate's own contracts need to read (a compiled subscript's
/// size) falls well inside it. A general decoder would branch on the tag
/// byte to also cover the `0xFD`/`0xFE`/`0xFF` prefixes.
pub fn get_varint(ctx: RenderCtx) -> RenderCtx {
    ctx.op(Opcode::Dup)
        .push_int(1)
        .op(Opcode::Split)
        .op(Opcode::Drop)
        .op(Opcode::Bin2Num)
}

/// Consumes a byte string's leading `VarInt` tag byte, leaving the decoded
/// value on top and the remaining bytes beneath it. See [`get_varint`] for
/// the single-byte-tag limitation.
pub fn read_varint(ctx: RenderCtx) -> RenderCtx {
    ctx.push_int(1).op(Opcode::Split).op(Opcode::Swap).op(Opcode::Bin2Num)
}

/// Strips a byte string's leading `VarInt` tag byte, keeping only the
/// remaining bytes. See [`get_varint`] for the single-byte-tag limitation.
pub fn trim_varint(ctx: RenderCtx) -> RenderCtx {
    read_varint(ctx).op(Opcode::Drop)
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
    fn if_else_picks_the_taken_branch() {
        let ctx = RenderCtx::new(None).push_int(1);
        let ctx = op_if2(ctx, |c| c.push_int(11), |c| c.push_int(22));
        let interp = run(ctx);
        assert_eq!(interp.stack(), &[vec![11]]);
    }

    #[test]
    fn if3_falls_through_to_the_else_branch() {
        let ctx = RenderCtx::new(None).push_int(0);
        let ctx = op_if3(
            ctx,
            |c| c.push_int(1),
            |c| c.push_int(0),
            |c| c.push_int(2),
            |c| c.push_int(3),
        );
        let interp = run(ctx);
        assert_eq!(interp.stack(), &[vec![3]]);
    }

    #[test]
    fn each_applies_in_order() {
        let ctx = each(RenderCtx::new(None), &[1i64, 2, 3], |ctx, n| ctx.push_int(*n));
        let interp = run(ctx);
        assert_eq!(interp.stack(), &[vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn get_varint_reads_a_single_byte_tag() {
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(&[0xAA; 5]);
        let ctx = get_varint(RenderCtx::new(None).push(bytes.clone()));
        let interp = run(ctx);
        assert_eq!(interp.stack(), &[bytes, vec![5]]);
    }

    #[test]
    fn trim_varint_strips_the_tag_byte() {
        let mut bytes = vec![3u8];
        bytes.extend_from_slice(&[0xBB; 3]);
        let ctx = trim_varint(RenderCtx::new(None).push(bytes));
        let interp = run(ctx);
        assert_eq!(interp.stack(), &[vec![0xBB; 3]]);
    }
}
