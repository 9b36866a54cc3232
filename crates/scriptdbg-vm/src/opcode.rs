//! Script opcode table

use std::fmt;

/// A script opcode.
///
/// Every byte value is representable; codes without an entry in the
/// mnemonic table render as `OP_UNKNOWN_0x..` and fail when executed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(u8);

#[allow(missing_docs)]
impl Opcode {
    // Push value
    pub const OP_0: Opcode = Opcode(0x00);
    pub const OP_PUSHDATA1: Opcode = Opcode(0x4c);
    pub const OP_PUSHDATA2: Opcode = Opcode(0x4d);
    pub const OP_PUSHDATA4: Opcode = Opcode(0x4e);
    pub const OP_1NEGATE: Opcode = Opcode(0x4f);
    pub const OP_RESERVED: Opcode = Opcode(0x50);
    pub const OP_1: Opcode = Opcode(0x51);
    pub const OP_2: Opcode = Opcode(0x52);
    pub const OP_3: Opcode = Opcode(0x53);
    pub const OP_4: Opcode = Opcode(0x54);
    pub const OP_5: Opcode = Opcode(0x55);
    pub const OP_6: Opcode = Opcode(0x56);
    pub const OP_7: Opcode = Opcode(0x57);
    pub const OP_8: Opcode = Opcode(0x58);
    pub const OP_9: Opcode = Opcode(0x59);
    pub const OP_10: Opcode = Opcode(0x5a);
    pub const OP_11: Opcode = Opcode(0x5b);
    pub const OP_12: Opcode = Opcode(0x5c);
    pub const OP_13: Opcode = Opcode(0x5d);
    pub const OP_14: Opcode = Opcode(0x5e);
    pub const OP_15: Opcode = Opcode(0x5f);
    pub const OP_16: Opcode = Opcode(0x60);

    // Flow control
    pub const OP_NOP: Opcode = Opcode(0x61);
    pub const OP_VER: Opcode = Opcode(0x62);
    pub const OP_IF: Opcode = Opcode(0x63);
    pub const OP_NOTIF: Opcode = Opcode(0x64);
    pub const OP_VERIF: Opcode = Opcode(0x65);
    pub const OP_VERNOTIF: Opcode = Opcode(0x66);
    pub const OP_ELSE: Opcode = Opcode(0x67);
    pub const OP_ENDIF: Opcode = Opcode(0x68);
    pub const OP_VERIFY: Opcode = Opcode(0x69);
    pub const OP_RETURN: Opcode = Opcode(0x6a);

    // Stack
    pub const OP_TOALTSTACK: Opcode = Opcode(0x6b);
    pub const OP_FROMALTSTACK: Opcode = Opcode(0x6c);
    pub const OP_2DROP: Opcode = Opcode(0x6d);
    pub const OP_2DUP: Opcode = Opcode(0x6e);
    pub const OP_3DUP: Opcode = Opcode(0x6f);
    pub const OP_2OVER: Opcode = Opcode(0x70);
    pub const OP_2ROT: Opcode = Opcode(0x71);
    pub const OP_2SWAP: Opcode = Opcode(0x72);
    pub const OP_IFDUP: Opcode = Opcode(0x73);
    pub const OP_DEPTH: Opcode = Opcode(0x74);
    pub const OP_DROP: Opcode = Opcode(0x75);
    pub const OP_DUP: Opcode = Opcode(0x76);
    pub const OP_NIP: Opcode = Opcode(0x77);
    pub const OP_OVER: Opcode = Opcode(0x78);
    pub const OP_PICK: Opcode = Opcode(0x79);
    pub const OP_ROLL: Opcode = Opcode(0x7a);
    pub const OP_ROT: Opcode = Opcode(0x7b);
    pub const OP_SWAP: Opcode = Opcode(0x7c);
    pub const OP_TUCK: Opcode = Opcode(0x7d);

    // Splice
    pub const OP_CAT: Opcode = Opcode(0x7e);
    pub const OP_SUBSTR: Opcode = Opcode(0x7f);
    pub const OP_LEFT: Opcode = Opcode(0x80);
    pub const OP_RIGHT: Opcode = Opcode(0x81);
    pub const OP_SIZE: Opcode = Opcode(0x82);

    // Bitwise logic
    pub const OP_INVERT: Opcode = Opcode(0x83);
    pub const OP_AND: Opcode = Opcode(0x84);
    pub const OP_OR: Opcode = Opcode(0x85);
    pub const OP_XOR: Opcode = Opcode(0x86);
    pub const OP_EQUAL: Opcode = Opcode(0x87);
    pub const OP_EQUALVERIFY: Opcode = Opcode(0x88);
    pub const OP_RESERVED1: Opcode = Opcode(0x89);
    pub const OP_RESERVED2: Opcode = Opcode(0x8a);

    // Arithmetic
    pub const OP_1ADD: Opcode = Opcode(0x8b);
    pub const OP_1SUB: Opcode = Opcode(0x8c);
    pub const OP_2MUL: Opcode = Opcode(0x8d);
    pub const OP_2DIV: Opcode = Opcode(0x8e);
    pub const OP_NEGATE: Opcode = Opcode(0x8f);
    pub const OP_ABS: Opcode = Opcode(0x90);
    pub const OP_NOT: Opcode = Opcode(0x91);
    pub const OP_0NOTEQUAL: Opcode = Opcode(0x92);
    pub const OP_ADD: Opcode = Opcode(0x93);
    pub const OP_SUB: Opcode = Opcode(0x94);
    pub const OP_MUL: Opcode = Opcode(0x95);
    pub const OP_DIV: Opcode = Opcode(0x96);
    pub const OP_MOD: Opcode = Opcode(0x97);
    pub const OP_LSHIFT: Opcode = Opcode(0x98);
    pub const OP_RSHIFT: Opcode = Opcode(0x99);
    pub const OP_BOOLAND: Opcode = Opcode(0x9a);
    pub const OP_BOOLOR: Opcode = Opcode(0x9b);
    pub const OP_NUMEQUAL: Opcode = Opcode(0x9c);
    pub const OP_NUMEQUALVERIFY: Opcode = Opcode(0x9d);
    pub const OP_NUMNOTEQUAL: Opcode = Opcode(0x9e);
    pub const OP_LESSTHAN: Opcode = Opcode(0x9f);
    pub const OP_GREATERTHAN: Opcode = Opcode(0xa0);
    pub const OP_LESSTHANOREQUAL: Opcode = Opcode(0xa1);
    pub const OP_GREATERTHANOREQUAL: Opcode = Opcode(0xa2);
    pub const OP_MIN: Opcode = Opcode(0xa3);
    pub const OP_MAX: Opcode = Opcode(0xa4);
    pub const OP_WITHIN: Opcode = Opcode(0xa5);

    // Crypto
    pub const OP_RIPEMD160: Opcode = Opcode(0xa6);
    pub const OP_SHA1: Opcode = Opcode(0xa7);
    pub const OP_SHA256: Opcode = Opcode(0xa8);
    pub const OP_HASH160: Opcode = Opcode(0xa9);
    pub const OP_HASH256: Opcode = Opcode(0xaa);
    pub const OP_CODESEPARATOR: Opcode = Opcode(0xab);
    pub const OP_CHECKSIG: Opcode = Opcode(0xac);
    pub const OP_CHECKSIGVERIFY: Opcode = Opcode(0xad);
    pub const OP_CHECKMULTISIG: Opcode = Opcode(0xae);
    pub const OP_CHECKMULTISIGVERIFY: Opcode = Opcode(0xaf);

    // Expansion
    pub const OP_NOP1: Opcode = Opcode(0xb0);
    pub const OP_CHECKLOCKTIMEVERIFY: Opcode = Opcode(0xb1);
    pub const OP_CHECKSEQUENCEVERIFY: Opcode = Opcode(0xb2);
    pub const OP_NOP4: Opcode = Opcode(0xb3);
    pub const OP_NOP10: Opcode = Opcode(0xb9);
}

/// Inline breakpoint marker. Executes as a no-op; stepping pauses before it.
pub const BREAKPOINT_MARKER: Opcode = Opcode::OP_NOP10;

/// Largest payload a direct `OP_PUSHBYTES_n` opcode can carry
pub const MAX_DIRECT_PUSH: usize = 75;

/// Mnemonic table for every named opcode. `OP_PUSHBYTES_n` (1..=75) is
/// derived from the code instead of being listed.
const MNEMONICS: &[(&str, u8)] = &[
    ("OP_0", 0x00),
    ("OP_PUSHDATA1", 0x4c),
    ("OP_PUSHDATA2", 0x4d),
    ("OP_PUSHDATA4", 0x4e),
    ("OP_1NEGATE", 0x4f),
    ("OP_RESERVED", 0x50),
    ("OP_1", 0x51),
    ("OP_2", 0x52),
    ("OP_3", 0x53),
    ("OP_4", 0x54),
    ("OP_5", 0x55),
    ("OP_6", 0x56),
    ("OP_7", 0x57),
    ("OP_8", 0x58),
    ("OP_9", 0x59),
    ("OP_10", 0x5a),
    ("OP_11", 0x5b),
    ("OP_12", 0x5c),
    ("OP_13", 0x5d),
    ("OP_14", 0x5e),
    ("OP_15", 0x5f),
    ("OP_16", 0x60),
    ("OP_NOP", 0x61),
    ("OP_VER", 0x62),
    ("OP_IF", 0x63),
    ("OP_NOTIF", 0x64),
    ("OP_VERIF", 0x65),
    ("OP_VERNOTIF", 0x66),
    ("OP_ELSE", 0x67),
    ("OP_ENDIF", 0x68),
    ("OP_VERIFY", 0x69),
    ("OP_RETURN", 0x6a),
    ("OP_TOALTSTACK", 0x6b),
    ("OP_FROMALTSTACK", 0x6c),
    ("OP_2DROP", 0x6d),
    ("OP_2DUP", 0x6e),
    ("OP_3DUP", 0x6f),
    ("OP_2OVER", 0x70),
    ("OP_2ROT", 0x71),
    ("OP_2SWAP", 0x72),
    ("OP_IFDUP", 0x73),
    ("OP_DEPTH", 0x74),
    ("OP_DROP", 0x75),
    ("OP_DUP", 0x76),
    ("OP_NIP", 0x77),
    ("OP_OVER", 0x78),
    ("OP_PICK", 0x79),
    ("OP_ROLL", 0x7a),
    ("OP_ROT", 0x7b),
    ("OP_SWAP", 0x7c),
    ("OP_TUCK", 0x7d),
    ("OP_CAT", 0x7e),
    ("OP_SUBSTR", 0x7f),
    ("OP_LEFT", 0x80),
    ("OP_RIGHT", 0x81),
    ("OP_SIZE", 0x82),
    ("OP_INVERT", 0x83),
    ("OP_AND", 0x84),
    ("OP_OR", 0x85),
    ("OP_XOR", 0x86),
    ("OP_EQUAL", 0x87),
    ("OP_EQUALVERIFY", 0x88),
    ("OP_RESERVED1", 0x89),
    ("OP_RESERVED2", 0x8a),
    ("OP_1ADD", 0x8b),
    ("OP_1SUB", 0x8c),
    ("OP_2MUL", 0x8d),
    ("OP_2DIV", 0x8e),
    ("OP_NEGATE", 0x8f),
    ("OP_ABS", 0x90),
    ("OP_NOT", 0x91),
    ("OP_0NOTEQUAL", 0x92),
    ("OP_ADD", 0x93),
    ("OP_SUB", 0x94),
    ("OP_MUL", 0x95),
    ("OP_DIV", 0x96),
    ("OP_MOD", 0x97),
    ("OP_LSHIFT", 0x98),
    ("OP_RSHIFT", 0x99),
    ("OP_BOOLAND", 0x9a),
    ("OP_BOOLOR", 0x9b),
    ("OP_NUMEQUAL", 0x9c),
    ("OP_NUMEQUALVERIFY", 0x9d),
    ("OP_NUMNOTEQUAL", 0x9e),
    ("OP_LESSTHAN", 0x9f),
    ("OP_GREATERTHAN", 0xa0),
    ("OP_LESSTHANOREQUAL", 0xa1),
    ("OP_GREATERTHANOREQUAL", 0xa2),
    ("OP_MIN", 0xa3),
    ("OP_MAX", 0xa4),
    ("OP_WITHIN", 0xa5),
    ("OP_RIPEMD160", 0xa6),
    ("OP_SHA1", 0xa7),
    ("OP_SHA256", 0xa8),
    ("OP_HASH160", 0xa9),
    ("OP_HASH256", 0xaa),
    ("OP_CODESEPARATOR", 0xab),
    ("OP_CHECKSIG", 0xac),
    ("OP_CHECKSIGVERIFY", 0xad),
    ("OP_CHECKMULTISIG", 0xae),
    ("OP_CHECKMULTISIGVERIFY", 0xaf),
    ("OP_NOP1", 0xb0),
    ("OP_CHECKLOCKTIMEVERIFY", 0xb1),
    ("OP_CHECKSEQUENCEVERIFY", 0xb2),
    ("OP_NOP4", 0xb3),
    ("OP_NOP5", 0xb4),
    ("OP_NOP6", 0xb5),
    ("OP_NOP7", 0xb6),
    ("OP_NOP8", 0xb7),
    ("OP_NOP9", 0xb8),
    ("OP_NOP10", 0xb9),
];

/// Alternative spellings accepted by `from_name`, never produced by `name`
const ALIASES: &[(&str, u8)] = &[
    ("OP_FALSE", 0x00),
    ("OP_TRUE", 0x51),
    ("OP_NOP2", 0xb1),
    ("OP_NOP3", 0xb2),
    ("OP_BREAKPOINT", 0xb9),
];

impl Opcode {
    /// Convert from byte. Total: unknown codes are kept and fail at execution.
    pub const fn from_byte(byte: u8) -> Self {
        Opcode(byte)
    }

    /// Numeric code
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Mnemonic from the table, `None` for pushbytes and unassigned codes
    pub fn mnemonic(self) -> Option<&'static str> {
        MNEMONICS
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(name, _)| *name)
    }

    /// Canonical name, e.g. `OP_ADD`, `OP_PUSHBYTES_20`, `OP_UNKNOWN_0xba`
    pub fn name(self) -> String {
        self.to_string()
    }

    /// Look up an opcode by mnemonic.
    ///
    /// Case-insensitive, the `OP_` prefix is optional and aliases such as
    /// `TRUE` or `BREAKPOINT` are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let bare = upper.strip_prefix("OP_").unwrap_or(&upper);
        if bare.is_empty() {
            return None;
        }

        if let Some(len) = bare.strip_prefix("PUSHBYTES_") {
            return len
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=MAX_DIRECT_PUSH as u8).contains(n))
                .map(Opcode);
        }

        MNEMONICS
            .iter()
            .chain(ALIASES.iter())
            .find(|(mnemonic, _)| &mnemonic[3..] == bare)
            .map(|(_, code)| Opcode(*code))
    }

    /// Pick the smallest push opcode able to carry `len` bytes
    pub fn push_for_len(len: usize) -> Self {
        if len <= MAX_DIRECT_PUSH {
            Opcode(len as u8)
        } else if len <= u8::MAX as usize {
            Self::OP_PUSHDATA1
        } else if len <= u16::MAX as usize {
            Self::OP_PUSHDATA2
        } else {
            Self::OP_PUSHDATA4
        }
    }

    /// Largest payload this push opcode can carry, `None` for non-data opcodes
    pub fn push_capacity(self) -> Option<usize> {
        match self.0 {
            n @ 0x01..=0x4b => Some(n as usize),
            0x4c => Some(u8::MAX as usize),
            0x4d => Some(u16::MAX as usize),
            0x4e => Some(u32::MAX as usize),
            _ => None,
        }
    }

    /// Check if this opcode carries inline data (pushbytes or pushdata)
    pub fn carries_data(self) -> bool {
        (0x01..=0x4e).contains(&self.0)
    }

    /// Value pushed by `OP_0`, `OP_1NEGATE` and `OP_1`..`OP_16`
    pub fn small_int(self) -> Option<i64> {
        match self.0 {
            0x00 => Some(0),
            0x4f => Some(-1),
            0x51..=0x60 => Some((self.0 - 0x50) as i64),
            _ => None,
        }
    }

    /// Dedicated opcode for -1..=16, if any
    pub fn from_small_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::OP_0),
            -1 => Some(Self::OP_1NEGATE),
            1..=16 => Some(Opcode(0x50 + value as u8)),
            _ => None,
        }
    }

    /// Flow-control opcodes that are interpreted even inside a skipped branch
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::OP_IF | Self::OP_NOTIF | Self::OP_ELSE | Self::OP_ENDIF
        )
    }

    /// Opcodes disabled by the consensus rules this machine follows
    pub fn is_disabled(self) -> bool {
        matches!(
            self,
            Self::OP_CAT
                | Self::OP_SUBSTR
                | Self::OP_LEFT
                | Self::OP_RIGHT
                | Self::OP_INVERT
                | Self::OP_AND
                | Self::OP_OR
                | Self::OP_XOR
                | Self::OP_2MUL
                | Self::OP_2DIV
                | Self::OP_MUL
                | Self::OP_DIV
                | Self::OP_MOD
                | Self::OP_LSHIFT
                | Self::OP_RSHIFT
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None if (0x01..=0x4b).contains(&self.0) => write!(f, "OP_PUSHBYTES_{}", self.0),
            None => write!(f, "OP_UNKNOWN_0x{:02x}", self.0),
        }
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02x})", self, self.0)
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.0
    }
}
