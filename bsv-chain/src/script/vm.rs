//! The Script evaluator: a stack machine that consumes a chunk sequence and
//! reports success/failure, with optional transaction context for the
//! signature-checking opcodes.

use num_bigint::BigInt;
use thiserror::Error;

use super::chunk::Chunk;
use super::num;
use super::opcode::Opcode;
use crate::transaction::Tx;
use crate::transparent::TxOut;

const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VmError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("alt stack underflow")]
    AltStackUnderflow,
    #[error("if-stack underflow (ELSE/ENDIF with no matching IF)")]
    IfStackUnderflow,
    #[error("duplicate OP_ELSE for the same OP_IF")]
    DuplicateElse,
    #[error("index out of range")]
    IndexOutOfRange,
    #[error("operand length mismatch")]
    LengthMismatch,
    #[error("push exceeds the maximum element size")]
    PushSizeExceeded,
    #[error("negative or invalid target length")]
    InvalidLength,
    #[error("disabled opcode")]
    DisabledOpcode,
    #[error("reserved opcode")]
    ReservedOpcode,
    #[error("OP_VERIFY failed")]
    VerifyFailed,
    #[error("signature check opcode requires transaction context")]
    MissingContext,
    #[error("malformed signature or public key")]
    MalformedKeyMaterial,
    #[error("divide by zero")]
    DivideByZero,
    #[error("unbalanced conditional at end of script")]
    UnbalancedConditional,
}

/// Evaluator configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Short-circuits `OP_EQUAL`, `OP_NUMEQUAL`, `OP_CHECKSIG`, and
    /// `OP_CHECKMULTISIG` to push a truthy value regardless of inputs. Used
    /// to validate script shape without real signatures.
    pub simulate: bool,
}

/// The `(tx, vin, prev_txout)` a signature-checking opcode verifies against.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub tx: Tx,
    pub vin: usize,
    pub prev_txout: TxOut,
}

struct IfFrame {
    active: bool,
    else_seen: bool,
}

/// The Script stack machine.
pub struct Interpreter {
    stack: Vec<Vec<u8>>,
    alt_stack: Vec<Vec<u8>>,
    if_stack: Vec<IfFrame>,
    op_return: Option<Vec<u8>>,
    ctx: Option<Ctx>,
    opts: Options,
    error: Option<VmError>,
}

impl Interpreter {
    pub fn new(opts: Options, ctx: Option<Ctx>) -> Self {
        Interpreter {
            stack: Vec::new(),
            alt_stack: Vec::new(),
            if_stack: Vec::new(),
            op_return: None,
            ctx,
            opts,
            error: None,
        }
    }

    pub fn stack(&self) -> &[Vec<u8>] {
        &self.stack
    }

    pub fn alt_stack(&self) -> &[Vec<u8>] {
        &self.alt_stack
    }

    pub fn op_return(&self) -> Option<&[u8]> {
        self.op_return.as_deref()
    }

    pub fn error(&self) -> Option<&VmError> {
        self.error.as_ref()
    }

    /// Pushes an initial value directly, bypassing chunk evaluation. Used to
    /// seed the stack with an unlocking script's outputs before evaluating a
    /// locking script against it.
    pub fn push(&mut self, value: Vec<u8>) {
        self.stack.push(value);
    }

    /// `if_stack` is empty and the top of stack is truthy.
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.if_stack.is_empty() && self.stack.last().map_or(false, |top| num::is_truthy(top))
    }

    pub fn eval(&mut self, chunks: &[Chunk]) {
        for (i, chunk) in chunks.iter().enumerate() {
            if self.error.is_some() || self.op_return.is_some() {
                break;
            }
            if let Err(e) = self.step(chunk) {
                self.error = Some(e);
                break;
            }
            if self.op_return.is_some() {
                self.op_return = Some(super::chunk::serialize_all(&chunks[i + 1..]));
            }
        }
        if self.error.is_none() && self.op_return.is_none() && !self.if_stack.is_empty() {
            self.error = Some(VmError::UnbalancedConditional);
        }
    }

    fn is_executing(&self) -> bool {
        self.if_stack.iter().all(|f| f.active)
    }

    fn step(&mut self, chunk: &Chunk) -> Result<(), VmError> {
        match chunk {
            Chunk::Op(Opcode::If) | Chunk::Op(Opcode::NotIf) => {
                let executing = self.is_executing();
                let mut cond = if executing { self.pop_bool()? } else { false };
                if *chunk == Chunk::Op(Opcode::NotIf) {
                    cond = !cond;
                }
                self.if_stack.push(IfFrame {
                    active: cond,
                    else_seen: false,
                });
                return Ok(());
            }
            Chunk::Op(Opcode::Else) => {
                let frame = self.if_stack.last_mut().ok_or(VmError::IfStackUnderflow)?;
                if frame.else_seen {
                    return Err(VmError::DuplicateElse);
                }
                frame.active = !frame.active;
                frame.else_seen = true;
                return Ok(());
            }
            Chunk::Op(Opcode::EndIf) => {
                self.if_stack.pop().ok_or(VmError::IfStackUnderflow)?;
                return Ok(());
            }
            _ => {}
        }

        if !self.is_executing() {
            return Ok(());
        }

        match chunk {
            Chunk::Push(bytes) => {
                if bytes.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(VmError::PushSizeExceeded);
                }
                self.stack.push(bytes.clone());
            }
            Chunk::Op(opcode) => self.exec(*opcode)?,
        }
        Ok(())
    }

    fn exec(&mut self, opcode: Opcode) -> Result<(), VmError> {
        use Opcode::*;

        if opcode.is_disabled() {
            return Err(VmError::DisabledOpcode);
        }
        match opcode {
            Ver | VerIf | VerNotIf | Reserved | Reserved1 | Reserved2 => {
                return Err(VmError::ReservedOpcode)
            }
            _ => {}
        }

        match opcode {
            False => self.stack.push(Vec::new()),
            OneNegate => self.push_num(BigInt::from(-1)),
            True => self.push_num(BigInt::from(1)),
            Two | Three | Four | Five | Six | Seven | Eight | Nine | Ten | Eleven | Twelve
            | Thirteen | Fourteen | Fifteen | Sixteen => {
                let n = opcode.as_byte() as i64 - (Opcode::True.as_byte() as i64) + 1;
                self.push_num(BigInt::from(n));
            }

            Nop | Nop1 | Nop2 | Nop3 | Nop4 | Nop5 | Nop6 | Nop7 | Nop8 | Nop9 | Nop10 => {}

            Verify => {
                if !self.pop_bool()? {
                    return Err(VmError::VerifyFailed);
                }
            }
            Return => {
                // `eval` fills in the actual captured bytes once this chunk's
                // step has returned; this only marks that OP_RETURN fired.
                self.op_return = Some(Vec::new());
            }

            ToAltStack => {
                let v = self.pop()?;
                self.alt_stack.push(v);
            }
            FromAltStack => {
                let v = self.alt_stack.pop().ok_or(VmError::AltStackUnderflow)?;
                self.stack.push(v);
            }
            TwoDrop => {
                self.pop()?;
                self.pop()?;
            }
            TwoDup => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(VmError::StackUnderflow);
                }
                let (a, b) = (self.stack[len - 2].clone(), self.stack[len - 1].clone());
                self.stack.push(a);
                self.stack.push(b);
            }
            ThreeDup => {
                let len = self.stack.len();
                if len < 3 {
                    return Err(VmError::StackUnderflow);
                }
                for i in 0..3 {
                    self.stack.push(self.stack[len - 3 + i].clone());
                }
            }
            TwoOver => {
                let len = self.stack.len();
                if len < 4 {
                    return Err(VmError::StackUnderflow);
                }
                self.stack.push(self.stack[len - 4].clone());
                self.stack.push(self.stack[len - 3].clone());
            }
            TwoRot => {
                let len = self.stack.len();
                if len < 6 {
                    return Err(VmError::StackUnderflow);
                }
                let removed: Vec<Vec<u8>> = self.stack.drain(len - 6..len - 4).collect();
                self.stack.extend(removed);
            }
            TwoSwap => {
                let len = self.stack.len();
                if len < 4 {
                    return Err(VmError::StackUnderflow);
                }
                self.stack.swap(len - 4, len - 2);
                self.stack.swap(len - 3, len - 1);
            }
            IfDup => {
                let top = self.stack.last().ok_or(VmError::StackUnderflow)?.clone();
                if num::is_truthy(&top) {
                    self.stack.push(top);
                }
            }
            Depth => {
                let depth = self.stack.len() as i64;
                self.push_num(BigInt::from(depth));
            }
            Drop => {
                self.pop()?;
            }
            Dup => {
                let top = self.stack.last().ok_or(VmError::StackUnderflow)?.clone();
                self.stack.push(top);
            }
            Nip => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(VmError::StackUnderflow);
                }
                self.stack.remove(len - 2);
            }
            Over => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(VmError::StackUnderflow);
                }
                self.stack.push(self.stack[len - 2].clone());
            }
            Pick | Roll => {
                let n = self.pop_num()?;
                let n: usize = n
                    .to_string()
                    .parse()
                    .map_err(|_| VmError::IndexOutOfRange)?;
                let len = self.stack.len();
                if n >= len {
                    return Err(VmError::IndexOutOfRange);
                }
                let idx = len - 1 - n;
                let value = if opcode == Pick {
                    self.stack[idx].clone()
                } else {
                    self.stack.remove(idx)
                };
                self.stack.push(value);
            }
            Rot => {
                let len = self.stack.len();
                if len < 3 {
                    return Err(VmError::StackUnderflow);
                }
                let v = self.stack.remove(len - 3);
                self.stack.push(v);
            }
            Swap => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(VmError::StackUnderflow);
                }
                self.stack.swap(len - 2, len - 1);
            }
            Tuck => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(VmError::StackUnderflow);
                }
                let top = self.stack[len - 1].clone();
                self.stack.insert(len - 2, top);
            }

            Cat => {
                let b = self.pop()?;
                let mut a = self.pop()?;
                a.extend_from_slice(&b);
                if a.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(VmError::PushSizeExceeded);
                }
                self.stack.push(a);
            }
            Split => {
                let n = self.pop_usize()?;
                let a = self.pop()?;
                if n > a.len() {
                    return Err(VmError::IndexOutOfRange);
                }
                let (left, right) = a.split_at(n);
                self.stack.push(left.to_vec());
                self.stack.push(right.to_vec());
            }
            Num2Bin => {
                let target_len = self.pop_num()?;
                let target_len: i64 = target_len
                    .to_string()
                    .parse()
                    .map_err(|_| VmError::InvalidLength)?;
                if target_len < 0 {
                    return Err(VmError::InvalidLength);
                }
                let target_len = target_len as usize;
                let value = self.pop()?;
                self.stack.push(num2bin(&value, target_len)?);
            }
            Bin2Num => {
                let value = self.pop()?;
                let n = num::decode(&value);
                self.push_num(n);
            }
            Size => {
                let top = self.stack.last().ok_or(VmError::StackUnderflow)?;
                let len = top.len() as i64;
                self.push_num(BigInt::from(len));
            }

            Invert => {
                let mut a = self.pop()?;
                for byte in a.iter_mut() {
                    *byte = !*byte;
                }
                self.stack.push(a);
            }
            And | Or | Xor => {
                let b = self.pop()?;
                let a = self.pop()?;
                if a.len() != b.len() {
                    return Err(VmError::LengthMismatch);
                }
                let result: Vec<u8> = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| match opcode {
                        And => x & y,
                        Or => x | y,
                        Xor => x ^ y,
                        _ => unreachable!(),
                    })
                    .collect();
                self.stack.push(result);
            }
            Equal => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push_bool(self.opts.simulate || a == b);
            }
            EqualVerify => {
                let b = self.pop()?;
                let a = self.pop()?;
                if !(self.opts.simulate || a == b) {
                    return Err(VmError::VerifyFailed);
                }
            }

            OneAdd => {
                let n = self.pop_num()?;
                self.push_num(n + 1);
            }
            OneSub => {
                let n = self.pop_num()?;
                self.push_num(n - 1);
            }
            Negate => {
                let n = self.pop_num()?;
                self.push_num(-n);
            }
            Abs => {
                let n = self.pop_num()?;
                self.push_num(n.magnitude().clone().into());
            }
            Not => {
                let n = self.pop_num()?;
                self.push_bool(n == BigInt::from(0));
            }
            ZeroNotEqual => {
                let n = self.pop_num()?;
                self.push_bool(n != BigInt::from(0));
            }
            Add => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_num(a + b);
            }
            Sub => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_num(a - b);
            }
            Mul => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_num(a * b);
            }
            Div => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                if b == BigInt::from(0) {
                    return Err(VmError::DivideByZero);
                }
                self.push_num(a / b);
            }
            Mod => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                if b == BigInt::from(0) {
                    return Err(VmError::DivideByZero);
                }
                self.push_num(a % b);
            }
            LShift => {
                let n = self.pop_usize()?;
                let a = self.pop()?;
                self.stack.push(shift_bytes(&a, n as i64));
            }
            RShift => {
                let n = self.pop_usize()?;
                let a = self.pop()?;
                self.stack.push(shift_bytes(&a, -(n as i64)));
            }
            BoolAnd => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a != BigInt::from(0) && b != BigInt::from(0));
            }
            BoolOr => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a != BigInt::from(0) || b != BigInt::from(0));
            }
            NumEqual => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(self.opts.simulate || a == b);
            }
            NumEqualVerify => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                if !(self.opts.simulate || a == b) {
                    return Err(VmError::VerifyFailed);
                }
            }
            NumNotEqual => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a != b);
            }
            LessThan => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a < b);
            }
            GreaterThan => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a > b);
            }
            LessThanOrEqual => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a <= b);
            }
            GreaterThanOrEqual => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_bool(a >= b);
            }
            Min => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_num(std::cmp::min(a, b));
            }
            Max => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                self.push_num(std::cmp::max(a, b));
            }
            Within => {
                let max = self.pop_num()?;
                let min = self.pop_num()?;
                let x = self.pop_num()?;
                self.push_bool(x >= min && x < max);
            }

            Ripemd160 => {
                use ripemd160::{Digest, Ripemd160};
                let a = self.pop()?;
                self.stack.push(Ripemd160::digest(&a).to_vec());
            }
            Sha1 => {
                use sha1::{Digest, Sha1};
                let a = self.pop()?;
                self.stack.push(Sha1::digest(&a).to_vec());
            }
            Sha256 => {
                use sha2::{Digest, Sha256};
                let a = self.pop()?;
                self.stack.push(Sha256::digest(&a).to_vec());
            }
            Hash160 => {
                use ripemd160::{Digest, Ripemd160};
                use sha2::Sha256;
                let a = self.pop()?;
                let sha = Sha256::digest(&a);
                self.stack.push(Ripemd160::digest(&sha).to_vec());
            }
            Hash256 => {
                let a = self.pop()?;
                self.stack.push(crate::serialization::sha256d::hash(&a).as_bytes().to_vec());
            }
            CodeSeparator => {}

            CheckSig | CheckSigVerify => {
                let ok = self.check_sig()?;
                if opcode == CheckSigVerify && !ok {
                    return Err(VmError::VerifyFailed);
                }
                if opcode == CheckSig {
                    self.push_bool(ok);
                }
            }
            CheckMultisig | CheckMultisigVerify => {
                let ok = self.check_multisig()?;
                if opcode == CheckMultisigVerify && !ok {
                    return Err(VmError::VerifyFailed);
                }
                if opcode == CheckMultisig {
                    self.push_bool(ok);
                }
            }

            If | NotIf | Else | EndIf | Ver | VerIf | VerNotIf | Reserved | Reserved1
            | Reserved2 | TwoMul | TwoDiv => unreachable!("handled earlier"),
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Vec<u8>, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    fn pop_bool(&mut self) -> Result<bool, VmError> {
        Ok(num::is_truthy(&self.pop()?))
    }

    fn pop_num(&mut self) -> Result<BigInt, VmError> {
        Ok(num::decode(&self.pop()?))
    }

    fn pop_usize(&mut self) -> Result<usize, VmError> {
        let n = self.pop_num()?;
        if n < BigInt::from(0) {
            return Err(VmError::IndexOutOfRange);
        }
        n.to_string().parse().map_err(|_| VmError::IndexOutOfRange)
    }

    fn push_num(&mut self, n: BigInt) {
        self.stack.push(num::encode(&n));
    }

    fn push_bool(&mut self, b: bool) {
        self.stack.push(if b { vec![1] } else { Vec::new() });
    }

    fn check_sig(&mut self) -> Result<bool, VmError> {
        let pubkey_bytes = self.pop()?;
        let sig_bytes = self.pop()?;

        if self.opts.simulate {
            return Ok(true);
        }

        let ctx = self.ctx.as_ref().ok_or(VmError::MissingContext)?;
        let pubkey =
            crate::keys::PubKey::from_bytes(&pubkey_bytes).map_err(|_| VmError::MalformedKeyMaterial)?;
        Ok(crate::sighash::verify(
            &ctx.tx,
            ctx.vin,
            &ctx.prev_txout.script,
            ctx.prev_txout.satoshis,
            &sig_bytes,
            &pubkey,
        )
        .unwrap_or(false))
    }

    fn check_multisig(&mut self) -> Result<bool, VmError> {
        let pubkey_count = self.pop_usize()?;
        let mut pubkeys = Vec::with_capacity(pubkey_count);
        for _ in 0..pubkey_count {
            pubkeys.push(self.pop()?);
        }
        let sig_count = self.pop_usize()?;
        let mut sigs = Vec::with_capacity(sig_count);
        for _ in 0..sig_count {
            sigs.push(self.pop()?);
        }
        // Bitcoin's off-by-one: one extra item is always popped and ignored.
        self.pop()?;

        if self.opts.simulate {
            return Ok(true);
        }

        let ctx = self.ctx.as_ref().ok_or(VmError::MissingContext)?;

        // Popped top-first, so reverse to restore the order the locking
        // script originally pushed them in: sigs and pubkeys must match in
        // that relative order, with no backtracking.
        pubkeys.reverse();
        sigs.reverse();

        let mut remaining = pubkeys;
        for sig in &sigs {
            let mut matched = false;
            while let Some(candidate) = remaining.first().cloned() {
                remaining.remove(0);
                let pubkey = match crate::keys::PubKey::from_bytes(&candidate) {
                    Ok(p) => p,
                    Err(_) => continue,
                };
                if crate::sighash::verify(
                    &ctx.tx,
                    ctx.vin,
                    &ctx.prev_txout.script,
                    ctx.prev_txout.satoshis,
                    sig,
                    &pubkey,
                )
                .unwrap_or(false)
                {
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// `OP_NUM2BIN`: expands `value` (little-endian, sign bit in the top bit of
/// the last byte) to exactly `target_len` bytes, preserving sign and value.
fn num2bin(value: &[u8], target_len: usize) -> Result<Vec<u8>, VmError> {
    if value.is_empty() {
        return Ok(vec![0u8; target_len]);
    }

    let mut magnitude = value.to_vec();
    let last = magnitude.len() - 1;
    let sign_bit = magnitude[last] & 0x80;
    magnitude[last] &= 0x7f;

    if magnitude.len() > target_len {
        return Err(VmError::InvalidLength);
    }

    let mut out = vec![0u8; target_len];
    out[..magnitude.len()].copy_from_slice(&magnitude);
    if target_len > 0 {
        out[target_len - 1] |= sign_bit;
    }
    Ok(out)
}

/// Bitwise shift of a fixed-length byte string, preserving its length.
/// `n > 0` shifts left (toward the most significant bit); `n < 0` shifts
/// right.
fn shift_bytes(bytes: &[u8], n: i64) -> Vec<u8> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let bit_len = bytes.len() * 8;
    let mut bits: Vec<bool> = Vec::with_capacity(bit_len);
    for byte in bytes {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }

    let mut shifted = vec![false; bit_len];
    for (i, bit) in bits.iter().enumerate() {
        // `bits` is MSB-first, so moving a bit toward the most significant
        // bit (a left shift, n > 0) means moving it to a *lower* index.
        let dest = i as i64 - n;
        if dest >= 0 && (dest as usize) < bit_len {
            shifted[dest as usize] = *bit;
        }
    }

    let mut out = vec![0u8; bytes.len()];
    for (i, chunk) in shifted.chunks(8).enumerate() {
        let mut byte = 0u8;
        for bit in chunk {
            byte = (byte << 1) | (*bit as u8);
        }
        out[i] = byte;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;

    fn run(asm: &str) -> Interpreter {
        let script = Script::from_asm(asm).unwrap();
        let mut vm = Interpreter::new(Options::default(), None);
        vm.eval(script.chunks());
        vm
    }

    #[test]
    fn simple_arithmetic() {
        let vm = run("OP_2 OP_3 OP_ADD OP_5 OP_EQUAL");
        assert!(vm.error().is_none());
        assert!(vm.is_valid());
    }

    #[test]
    fn p2pkh_style_equalverify_dup() {
        let vm = run("OP_DUP OP_DUP OP_EQUALVERIFY OP_EQUAL");
        assert!(vm.is_valid());
    }

    #[test]
    fn op_if_else_endif() {
        let vm = run("OP_1 OP_IF OP_2 OP_ELSE OP_3 OP_ENDIF");
        assert_eq!(vm.stack().last(), Some(&num::encode(&BigInt::from(2))));

        let vm = run("OP_0 OP_IF OP_2 OP_ELSE OP_3 OP_ENDIF");
        assert_eq!(vm.stack().last(), Some(&num::encode(&BigInt::from(3))));
    }

    #[test]
    fn unbalanced_if_is_an_error() {
        let vm = run("OP_1 OP_IF OP_2");
        assert_eq!(vm.error(), Some(&VmError::UnbalancedConditional));
    }

    #[test]
    fn verify_failure_is_reported() {
        let vm = run("OP_0 OP_VERIFY");
        assert_eq!(vm.error(), Some(&VmError::VerifyFailed));
    }

    #[test]
    fn disabled_opcode_errors() {
        let vm = run("OP_1 OP_1 OP_2MUL");
        assert_eq!(vm.error(), Some(&VmError::DisabledOpcode));
    }

    #[test]
    fn op_return_halts_successfully() {
        let script = Script::new(vec![
            Chunk::Op(Opcode::False),
            Chunk::Op(Opcode::Return),
            Chunk::Push(vec![1, 2, 3]),
        ]);
        let mut vm = Interpreter::new(Options::default(), None);
        vm.eval(script.chunks());
        assert!(vm.error().is_none());
        assert!(vm.op_return().is_some());
    }

    #[test]
    fn checksig_without_context_errors() {
        let vm = run(&format!("{} {} OP_CHECKSIG", hex::encode([0u8; 71]), hex::encode([0u8; 33])));
        assert_eq!(vm.error(), Some(&VmError::MissingContext));
    }

    #[test]
    fn simulate_mode_short_circuits_checksig() {
        let script = Script::from_asm(&format!(
            "{} {} OP_CHECKSIG",
            hex::encode([0u8; 71]),
            hex::encode([0u8; 33])
        ))
        .unwrap();
        let mut vm = Interpreter::new(Options { simulate: true }, None);
        vm.eval(script.chunks());
        assert!(vm.error().is_none());
        assert!(vm.is_valid());
    }

    #[test]
    fn num2bin_rejects_shrinking() {
        assert!(num2bin(&[0x01, 0x02], 1).is_err());
    }

    #[test]
    fn num2bin_preserves_sign_bit_when_expanding() {
        let expanded = num2bin(&[0x81], 4).unwrap();
        assert_eq!(expanded, vec![0x01, 0x00, 0x00, 0x80]);
    }

    #[test]
    fn split_and_cat_are_inverses() {
        let vm = run(&format!(
            "{} OP_2 OP_SPLIT OP_CAT {}",
            hex::encode([1, 2, 3, 4]),
            hex::encode([1, 2, 3, 4])
        ));
        assert!(vm.is_valid());
    }

    #[test]
    fn lshift_moves_bits_toward_the_most_significant_bit() {
        let vm = run("01 OP_1 OP_LSHIFT");
        assert_eq!(vm.stack().last(), Some(&vec![0x02]));
    }

    #[test]
    fn rshift_moves_bits_toward_the_least_significant_bit() {
        let vm = run("02 OP_1 OP_RSHIFT");
        assert_eq!(vm.stack().last(), Some(&vec![0x01]));
    }

    #[test]
    fn checkmultisig_missing_junk_byte_fails_to_underflow() {
        // Only two items on the stack when three are required (sig count,
        // the junk byte, and the pubkey count already consumed) surfaces as
        // a stack underflow rather than a semantic multisig failure.
        let script = Script::new(vec![
            Chunk::Op(Opcode::False),
            Chunk::Op(Opcode::False),
            Chunk::Op(Opcode::CheckMultisig),
        ]);
        let mut vm = Interpreter::new(Options::default(), None);
        vm.eval(script.chunks());
        assert_eq!(vm.error(), Some(&VmError::StackUnderflow));
    }
}
