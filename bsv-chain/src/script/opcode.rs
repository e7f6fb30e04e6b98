//! The closed set of Script opcodes. Pushdata-length markers
//! (`OP_PUSHDATA1/2/4`) and direct-push lengths are handled by
//! [`super::chunk`] directly; they never appear as an `Opcode`.

use crate::serialization::SerializationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    False = 0x00,
    OneNegate = 0x4f,
    Reserved = 0x50,
    True = 0x51,
    Two = 0x52,
    Three = 0x53,
    Four = 0x54,
    Five = 0x55,
    Six = 0x56,
    Seven = 0x57,
    Eight = 0x58,
    Nine = 0x59,
    Ten = 0x5a,
    Eleven = 0x5b,
    Twelve = 0x5c,
    Thirteen = 0x5d,
    Fourteen = 0x5e,
    Fifteen = 0x5f,
    Sixteen = 0x60,

    Nop = 0x61,
    Ver = 0x62,
    If = 0x63,
    NotIf = 0x64,
    VerIf = 0x65,
    VerNotIf = 0x66,
    Else = 0x67,
    EndIf = 0x68,
    Verify = 0x69,
    Return = 0x6a,

    ToAltStack = 0x6b,
    FromAltStack = 0x6c,
    TwoDrop = 0x6d,
    TwoDup = 0x6e,
    ThreeDup = 0x6f,
    TwoOver = 0x70,
    TwoRot = 0x71,
    TwoSwap = 0x72,
    IfDup = 0x73,
    Depth = 0x74,
    Drop = 0x75,
    Dup = 0x76,
    Nip = 0x77,
    Over = 0x78,
    Pick = 0x79,
    Roll = 0x7a,
    Rot = 0x7b,
    Swap = 0x7c,
    Tuck = 0x7d,

    Cat = 0x7e,
    Split = 0x7f,
    Num2Bin = 0x80,
    Bin2Num = 0x81,
    Size = 0x82,

    Invert = 0x83,
    And = 0x84,
    Or = 0x85,
    Xor = 0x86,
    Equal = 0x87,
    EqualVerify = 0x88,

    Reserved1 = 0x89,
    Reserved2 = 0x8a,

    OneAdd = 0x8b,
    OneSub = 0x8c,
    TwoMul = 0x8d,
    TwoDiv = 0x8e,
    Negate = 0x8f,
    Abs = 0x90,
    Not = 0x91,
    ZeroNotEqual = 0x92,
    Add = 0x93,
    Sub = 0x94,
    Mul = 0x95,
    Div = 0x96,
    Mod = 0x97,
    LShift = 0x98,
    RShift = 0x99,
    BoolAnd = 0x9a,
    BoolOr = 0x9b,
    NumEqual = 0x9c,
    NumEqualVerify = 0x9d,
    NumNotEqual = 0x9e,
    LessThan = 0x9f,
    GreaterThan = 0xa0,
    LessThanOrEqual = 0xa1,
    GreaterThanOrEqual = 0xa2,
    Min = 0xa3,
    Max = 0xa4,
    Within = 0xa5,

    Ripemd160 = 0xa6,
    Sha1 = 0xa7,
    Sha256 = 0xa8,
    Hash160 = 0xa9,
    Hash256 = 0xaa,
    CodeSeparator = 0xab,
    CheckSig = 0xac,
    CheckSigVerify = 0xad,
    CheckMultisig = 0xae,
    CheckMultisigVerify = 0xaf,

    Nop1 = 0xb0,
    Nop2 = 0xb1,
    Nop3 = 0xb2,
    Nop4 = 0xb3,
    Nop5 = 0xb4,
    Nop6 = 0xb5,
    Nop7 = 0xb6,
    Nop8 = 0xb7,
    Nop9 = 0xb8,
    Nop10 = 0xb9,
}

impl Opcode {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// `OP_2MUL`/`OP_2DIV` are members of the closed opcode set but are
    /// always disabled at evaluation time.
    pub fn is_disabled(self) -> bool {
        matches!(self, Opcode::TwoMul | Opcode::TwoDiv)
    }

    /// The canonical `OP_*` name used in ASM rendering.
    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            False => "OP_0",
            OneNegate => "OP_1NEGATE",
            Reserved => "OP_RESERVED",
            True => "OP_1",
            Two => "OP_2",
            Three => "OP_3",
            Four => "OP_4",
            Five => "OP_5",
            Six => "OP_6",
            Seven => "OP_7",
            Eight => "OP_8",
            Nine => "OP_9",
            Ten => "OP_10",
            Eleven => "OP_11",
            Twelve => "OP_12",
            Thirteen => "OP_13",
            Fourteen => "OP_14",
            Fifteen => "OP_15",
            Sixteen => "OP_16",
            Nop => "OP_NOP",
            Ver => "OP_VER",
            If => "OP_IF",
            NotIf => "OP_NOTIF",
            VerIf => "OP_VERIF",
            VerNotIf => "OP_VERNOTIF",
            Else => "OP_ELSE",
            EndIf => "OP_ENDIF",
            Verify => "OP_VERIFY",
            Return => "OP_RETURN",
            ToAltStack => "OP_TOALTSTACK",
            FromAltStack => "OP_FROMALTSTACK",
            TwoDrop => "OP_2DROP",
            TwoDup => "OP_2DUP",
            ThreeDup => "OP_3DUP",
            TwoOver => "OP_2OVER",
            TwoRot => "OP_2ROT",
            TwoSwap => "OP_2SWAP",
            IfDup => "OP_IFDUP",
            Depth => "OP_DEPTH",
            Drop => "OP_DROP",
            Dup => "OP_DUP",
            Nip => "OP_NIP",
            Over => "OP_OVER",
            Pick => "OP_PICK",
            Roll => "OP_ROLL",
            Rot => "OP_ROT",
            Swap => "OP_SWAP",
            Tuck => "OP_TUCK",
            Cat => "OP_CAT",
            Split => "OP_SPLIT",
            Num2Bin => "OP_NUM2BIN",
            Bin2Num => "OP_BIN2NUM",
            Size => "OP_SIZE",
            Invert => "OP_INVERT",
            And => "OP_AND",
            Or => "OP_OR",
            Xor => "OP_XOR",
            Equal => "OP_EQUAL",
            EqualVerify => "OP_EQUALVERIFY",
            Reserved1 => "OP_RESERVED1",
            Reserved2 => "OP_RESERVED2",
            OneAdd => "OP_1ADD",
            OneSub => "OP_1SUB",
            TwoMul => "OP_2MUL",
            TwoDiv => "OP_2DIV",
            Negate => "OP_NEGATE",
            Abs => "OP_ABS",
            Not => "OP_NOT",
            ZeroNotEqual => "OP_0NOTEQUAL",
            Add => "OP_ADD",
            Sub => "OP_SUB",
            Mul => "OP_MUL",
            Div => "OP_DIV",
            Mod => "OP_MOD",
            LShift => "OP_LSHIFT",
            RShift => "OP_RSHIFT",
            BoolAnd => "OP_BOOLAND",
            BoolOr => "OP_BOOLOR",
            NumEqual => "OP_NUMEQUAL",
            NumEqualVerify => "OP_NUMEQUALVERIFY",
            NumNotEqual => "OP_NUMNOTEQUAL",
            LessThan => "OP_LESSTHAN",
            GreaterThan => "OP_GREATERTHAN",
            LessThanOrEqual => "OP_LESSTHANOREQUAL",
            GreaterThanOrEqual => "OP_GREATERTHANOREQUAL",
            Min => "OP_MIN",
            Max => "OP_MAX",
            Within => "OP_WITHIN",
            Ripemd160 => "OP_RIPEMD160",
            Sha1 => "OP_SHA1",
            Sha256 => "OP_SHA256",
            Hash160 => "OP_HASH160",
            Hash256 => "OP_HASH256",
            CodeSeparator => "OP_CODESEPARATOR",
            CheckSig => "OP_CHECKSIG",
            CheckSigVerify => "OP_CHECKSIGVERIFY",
            CheckMultisig => "OP_CHECKMULTISIG",
            CheckMultisigVerify => "OP_CHECKMULTISIGVERIFY",
            Nop1 => "OP_NOP1",
            Nop2 => "OP_NOP2",
            Nop3 => "OP_NOP3",
            Nop4 => "OP_NOP4",
            Nop5 => "OP_NOP5",
            Nop6 => "OP_NOP6",
            Nop7 => "OP_NOP7",
            Nop8 => "OP_NOP8",
            Nop9 => "OP_NOP9",
            Nop10 => "OP_NOP10",
        }
    }

    /// Inverse of [`Opcode::name`]. Does not accept `OP_0`/`OP_1NEGATE`,
    /// which the ASM format renders as bare `0`/`-1` instead.
    pub fn from_name(name: &str) -> Option<Self> {
        use Opcode::*;
        Some(match name {
            "OP_RESERVED" => Reserved,
            "OP_1" | "OP_TRUE" => True,
            "OP_2" => Two,
            "OP_3" => Three,
            "OP_4" => Four,
            "OP_5" => Five,
            "OP_6" => Six,
            "OP_7" => Seven,
            "OP_8" => Eight,
            "OP_9" => Nine,
            "OP_10" => Ten,
            "OP_11" => Eleven,
            "OP_12" => Twelve,
            "OP_13" => Thirteen,
            "OP_14" => Fourteen,
            "OP_15" => Fifteen,
            "OP_16" => Sixteen,
            "OP_NOP" => Nop,
            "OP_VER" => Ver,
            "OP_IF" => If,
            "OP_NOTIF" => NotIf,
            "OP_VERIF" => VerIf,
            "OP_VERNOTIF" => VerNotIf,
            "OP_ELSE" => Else,
            "OP_ENDIF" => EndIf,
            "OP_VERIFY" => Verify,
            "OP_RETURN" => Return,
            "OP_TOALTSTACK" => ToAltStack,
            "OP_FROMALTSTACK" => FromAltStack,
            "OP_2DROP" => TwoDrop,
            "OP_2DUP" => TwoDup,
            "OP_3DUP" => ThreeDup,
            "OP_2OVER" => TwoOver,
            "OP_2ROT" => TwoRot,
            "OP_2SWAP" => TwoSwap,
            "OP_IFDUP" => IfDup,
            "OP_DEPTH" => Depth,
            "OP_DROP" => Drop,
            "OP_DUP" => Dup,
            "OP_NIP" => Nip,
            "OP_OVER" => Over,
            "OP_PICK" => Pick,
            "OP_ROLL" => Roll,
            "OP_ROT" => Rot,
            "OP_SWAP" => Swap,
            "OP_TUCK" => Tuck,
            "OP_CAT" => Cat,
            "OP_SPLIT" => Split,
            "OP_NUM2BIN" => Num2Bin,
            "OP_BIN2NUM" => Bin2Num,
            "OP_SIZE" => Size,
            "OP_INVERT" => Invert,
            "OP_AND" => And,
            "OP_OR" => Or,
            "OP_XOR" => Xor,
            "OP_EQUAL" => Equal,
            "OP_EQUALVERIFY" => EqualVerify,
            "OP_RESERVED1" => Reserved1,
            "OP_RESERVED2" => Reserved2,
            "OP_1ADD" => OneAdd,
            "OP_1SUB" => OneSub,
            "OP_2MUL" => TwoMul,
            "OP_2DIV" => TwoDiv,
            "OP_NEGATE" => Negate,
            "OP_ABS" => Abs,
            "OP_NOT" => Not,
            "OP_0NOTEQUAL" => ZeroNotEqual,
            "OP_ADD" => Add,
            "OP_SUB" => Sub,
            "OP_MUL" => Mul,
            "OP_DIV" => Div,
            "OP_MOD" => Mod,
            "OP_LSHIFT" => LShift,
            "OP_RSHIFT" => RShift,
            "OP_BOOLAND" => BoolAnd,
            "OP_BOOLOR" => BoolOr,
            "OP_NUMEQUAL" => NumEqual,
            "OP_NUMEQUALVERIFY" => NumEqualVerify,
            "OP_NUMNOTEQUAL" => NumNotEqual,
            "OP_LESSTHAN" => LessThan,
            "OP_GREATERTHAN" => GreaterThan,
            "OP_LESSTHANOREQUAL" => LessThanOrEqual,
            "OP_GREATERTHANOREQUAL" => GreaterThanOrEqual,
            "OP_MIN" => Min,
            "OP_MAX" => Max,
            "OP_WITHIN" => Within,
            "OP_RIPEMD160" => Ripemd160,
            "OP_SHA1" => Sha1,
            "OP_SHA256" => Sha256,
            "OP_HASH160" => Hash160,
            "OP_HASH256" => Hash256,
            "OP_CODESEPARATOR" => CodeSeparator,
            "OP_CHECKSIG" => CheckSig,
            "OP_CHECKSIGVERIFY" => CheckSigVerify,
            "OP_CHECKMULTISIG" => CheckMultisig,
            "OP_CHECKMULTISIGVERIFY" => CheckMultisigVerify,
            "OP_NOP1" => Nop1,
            "OP_NOP2" => Nop2,
            "OP_NOP3" => Nop3,
            "OP_NOP4" => Nop4,
            "OP_NOP5" => Nop5,
            "OP_NOP6" => Nop6,
            "OP_NOP7" => Nop7,
            "OP_NOP8" => Nop8,
            "OP_NOP9" => Nop9,
            "OP_NOP10" => Nop10,
            _ => return None,
        })
    }
}

impl std::convert::TryFrom<u8> for Opcode {
    type Error = SerializationError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        use Opcode::*;
        Ok(match byte {
            0x00 => False,
            0x4f => OneNegate,
            0x50 => Reserved,
            0x51 => True,
            0x52 => Two,
            0x53 => Three,
            0x54 => Four,
            0x55 => Five,
            0x56 => Six,
            0x57 => Seven,
            0x58 => Eight,
            0x59 => Nine,
            0x5a => Ten,
            0x5b => Eleven,
            0x5c => Twelve,
            0x5d => Thirteen,
            0x5e => Fourteen,
            0x5f => Fifteen,
            0x60 => Sixteen,
            0x61 => Nop,
            0x62 => Ver,
            0x63 => If,
            0x64 => NotIf,
            0x65 => VerIf,
            0x66 => VerNotIf,
            0x67 => Else,
            0x68 => EndIf,
            0x69 => Verify,
            0x6a => Return,
            0x6b => ToAltStack,
            0x6c => FromAltStack,
            0x6d => TwoDrop,
            0x6e => TwoDup,
            0x6f => ThreeDup,
            0x70 => TwoOver,
            0x71 => TwoRot,
            0x72 => TwoSwap,
            0x73 => IfDup,
            0x74 => Depth,
            0x75 => Drop,
            0x76 => Dup,
            0x77 => Nip,
            0x78 => Over,
            0x79 => Pick,
            0x7a => Roll,
            0x7b => Rot,
            0x7c => Swap,
            0x7d => Tuck,
            0x7e => Cat,
            0x7f => Split,
            0x80 => Num2Bin,
            0x81 => Bin2Num,
            0x82 => Size,
            0x83 => Invert,
            0x84 => And,
            0x85 => Or,
            0x86 => Xor,
            0x87 => Equal,
            0x88 => EqualVerify,
            0x89 => Reserved1,
            0x8a => Reserved2,
            0x8b => OneAdd,
            0x8c => OneSub,
            0x8d => TwoMul,
            0x8e => TwoDiv,
            0x8f => Negate,
            0x90 => Abs,
            0x91 => Not,
            0x92 => ZeroNotEqual,
            0x93 => Add,
            0x94 => Sub,
            0x95 => Mul,
            0x96 => Div,
            0x97 => Mod,
            0x98 => LShift,
            0x99 => RShift,
            0x9a => BoolAnd,
            0x9b => BoolOr,
            0x9c => NumEqual,
            0x9d => NumEqualVerify,
            0x9e => NumNotEqual,
            0x9f => LessThan,
            0xa0 => GreaterThan,
            0xa1 => LessThanOrEqual,
            0xa2 => GreaterThanOrEqual,
            0xa3 => Min,
            0xa4 => Max,
            0xa5 => Within,
            0xa6 => Ripemd160,
            0xa7 => Sha1,
            0xa8 => Sha256,
            0xa9 => Hash160,
            0xaa => Hash256,
            0xab => CodeSeparator,
            0xac => CheckSig,
            0xad => CheckSigVerify,
            0xae => CheckMultisig,
            0xaf => CheckMultisigVerify,
            0xb0 => Nop1,
            0xb1 => Nop2,
            0xb2 => Nop3,
            0xb3 => Nop4,
            0xb4 => Nop5,
            0xb5 => Nop6,
            0xb6 => Nop7,
            0xb7 => Nop8,
            0xb8 => Nop9,
            0xb9 => Nop10,
            other => return Err(SerializationError::InvalidOpcode(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn byte_round_trips() {
        for byte in 0u8..=255 {
            if let Ok(opcode) = Opcode::try_from(byte) {
                assert_eq!(opcode.as_byte(), byte);
            }
        }
    }

    #[test]
    fn pushdata_range_is_not_an_opcode() {
        for byte in 0x01u8..=0x4e {
            assert!(Opcode::try_from(byte).is_err());
        }
    }

    #[test]
    fn disabled_opcodes_are_flagged() {
        assert!(Opcode::TwoMul.is_disabled());
        assert!(Opcode::TwoDiv.is_disabled());
        assert!(!Opcode::Add.is_disabled());
    }

    #[test]
    fn name_round_trips_for_every_opcode_but_false() {
        for byte in 0u8..=255 {
            if let Ok(opcode) = Opcode::try_from(byte) {
                if opcode == Opcode::False || opcode == Opcode::OneNegate {
                    continue;
                }
                assert_eq!(Opcode::from_name(opcode.name()), Some(opcode));
            }
        }
    }
}
