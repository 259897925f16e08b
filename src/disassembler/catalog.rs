//! The opcode catalog: static metadata for every possible opcode byte.
//!
//! [`OPCODES`] is a 256-entry table indexed by the opcode byte. It is total: every byte value has
//! an entry, so [`lookup`] can never fail. Opcodes that the class-file format leaves unassigned
//! (`0xCB..=0xFD`) resolve to a one-byte `reserved` placeholder, while the three opcodes reserved
//! for implementations (`breakpoint`, `impdep1`, `impdep2`) keep their names.
//!
//! Each entry records the mnemonic, the [`OperandShape`] that tells the codec how to read the
//! operands, the minimum number of operand bytes, and the [`FlowType`] of the instruction.
//!
//! # Examples
//!
//! ```rust
//! use classscope::disassembler::{lookup, FlowType, OperandShape};
//!
//! let info = lookup(0x11);
//! assert_eq!(info.mnemonic, "sipush");
//! assert_eq!(info.shape, OperandShape::Short);
//! assert_eq!(info.operand_len, 2);
//!
//! assert_eq!(lookup(0xA7).flow, FlowType::UnconditionalBranch);
//! assert_eq!(lookup(0xE0).mnemonic, "reserved");
//! ```

use strum::{Display, EnumCount, EnumIter};

/// How the operands following an opcode byte are encoded.
///
/// The shape selects the operand codec strategy used by the decoder and the encoder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display, EnumIter, EnumCount)]
pub enum OperandShape {
    /// No operand bytes
    None,
    /// One signed byte (`bipush`)
    Byte,
    /// One signed half word (`sipush`)
    Short,
    /// One unsigned byte naming a local variable slot
    LocalIndex,
    /// One unsigned byte indexing the constant pool (`ldc`)
    ConstantIndexByte,
    /// One unsigned half word indexing the constant pool
    ConstantIndex,
    /// Local variable slot (u1) and signed increment (i1)
    Iinc,
    /// Signed 16-bit branch offset
    Branch,
    /// Signed 32-bit branch offset (`goto_w`, `jsr_w`)
    BranchWide,
    /// Primitive array type code (`newarray`)
    ArrayType,
    /// Constant-pool index (u2), count (u1) and a zero byte
    InvokeInterface,
    /// Constant-pool index (u2) and two zero bytes
    InvokeDynamic,
    /// Constant-pool index (u2) and dimension count (u1)
    MultiANewArray,
    /// Padding, then default/low/high and a jump table
    TableSwitch,
    /// Padding, then default/npairs and match/offset pairs
    LookupSwitch,
    /// Modified opcode followed by a widened operand
    Wide,
}

impl OperandShape {
    /// The number of operand bytes for fixed-width shapes, or the minimum for variable shapes.
    ///
    /// Switch minimums exclude alignment padding; a `tableswitch` always holds at least one
    /// jump offset.
    #[must_use]
    pub const fn min_len(self) -> u8 {
        match self {
            OperandShape::None => 0,
            OperandShape::Byte
            | OperandShape::LocalIndex
            | OperandShape::ConstantIndexByte
            | OperandShape::ArrayType => 1,
            OperandShape::Short
            | OperandShape::ConstantIndex
            | OperandShape::Iinc
            | OperandShape::Branch => 2,
            OperandShape::MultiANewArray | OperandShape::Wide => 3,
            OperandShape::BranchWide
            | OperandShape::InvokeInterface
            | OperandShape::InvokeDynamic => 4,
            OperandShape::LookupSwitch => 8,
            OperandShape::TableSwitch => 16,
        }
    }

    /// Returns `true` if the instruction length does not depend on the operand values.
    #[must_use]
    pub const fn is_fixed_width(self) -> bool {
        !matches!(
            self,
            OperandShape::TableSwitch | OperandShape::LookupSwitch | OperandShape::Wide
        )
    }

    /// Returns `true` if the operand holds a constant-pool index.
    #[must_use]
    pub const fn references_constant_pool(self) -> bool {
        matches!(
            self,
            OperandShape::ConstantIndexByte
                | OperandShape::ConstantIndex
                | OperandShape::InvokeInterface
                | OperandShape::InvokeDynamic
                | OperandShape::MultiANewArray
        )
    }
}

/// How an instruction affects control flow.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display, EnumIter, EnumCount)]
pub enum FlowType {
    /// Execution continues with the next instruction
    Sequential,
    /// Branches if a condition holds, otherwise falls through
    ConditionalBranch,
    /// Always branches (`goto`, `goto_w`)
    UnconditionalBranch,
    /// Multi-way branch (`tableswitch`, `lookupswitch`)
    Switch,
    /// Method invocation
    Call,
    /// Returns from the current method
    Return,
    /// Throws an exception (`athrow`)
    Throw,
    /// Jumps to a subroutine (`jsr`, `jsr_w`)
    Subroutine,
    /// Returns from a subroutine (`ret`)
    SubroutineReturn,
    /// Reserved or unassigned opcode
    Reserved,
}

impl FlowType {
    /// Returns `true` if execution can continue with the following instruction.
    #[must_use]
    pub const fn falls_through(self) -> bool {
        matches!(
            self,
            FlowType::Sequential
                | FlowType::ConditionalBranch
                | FlowType::Call
                | FlowType::Subroutine
                | FlowType::Reserved
        )
    }
}

/// Static information about a single opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OpcodeInfo {
    /// The opcode byte
    pub opcode: u8,
    /// Lower-case mnemonic as printed by disassemblers
    pub mnemonic: &'static str,
    /// Operand encoding
    pub shape: OperandShape,
    /// Operand bytes for fixed-width shapes, minimum operand bytes otherwise
    pub operand_len: u8,
    /// Control-flow classification
    pub flow: FlowType,
}

impl OpcodeInfo {
    const fn new(opcode: u8, mnemonic: &'static str, shape: OperandShape, flow: FlowType) -> Self {
        OpcodeInfo {
            opcode,
            mnemonic,
            shape,
            operand_len: shape.min_len(),
            flow,
        }
    }

    /// Returns `true` for unassigned opcodes and the implementation-reserved ones.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.flow == FlowType::Reserved
    }
}

/// `iinc`
pub const IINC: u8 = 0x84;
/// `ret`
pub const RET: u8 = 0xA9;
/// `tableswitch`
pub const TABLESWITCH: u8 = 0xAA;
/// `lookupswitch`
pub const LOOKUPSWITCH: u8 = 0xAB;
/// `wide`
pub const WIDE: u8 = 0xC4;
/// `breakpoint`
pub const BREAKPOINT: u8 = 0xCA;
/// `impdep1`
pub const IMPDEP1: u8 = 0xFE;
/// `impdep2`
pub const IMPDEP2: u8 = 0xFF;

/// Opcodes that may follow a `wide` prefix.
pub const WIDENABLE: [u8; 12] = [
    0x15, 0x16, 0x17, 0x18, 0x19, // iload, lload, fload, dload, aload
    0x36, 0x37, 0x38, 0x39, 0x3A, // istore, lstore, fstore, dstore, astore
    RET, IINC,
];

/// Returns `true` if `opcode` may be modified by `wide`.
#[must_use]
pub fn is_widenable(opcode: u8) -> bool {
    WIDENABLE.contains(&opcode)
}

/// Looks up the catalog entry for an opcode byte.
///
/// Total over all 256 values.
#[must_use]
pub fn lookup(opcode: u8) -> &'static OpcodeInfo {
    &OPCODES[usize::from(opcode)]
}

/// Finds the catalog entry with the given mnemonic.
///
/// The shared `reserved` placeholder mnemonic resolves to opcode `0xCB`.
#[must_use]
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static OpcodeInfo> {
    OPCODES.iter().find(|info| info.mnemonic == mnemonic)
}

/// The 256-entry opcode table, indexed by opcode byte.
pub static OPCODES: [OpcodeInfo; 256] = build_catalog();

const fn build_catalog() -> [OpcodeInfo; 256] {
    use FlowType::{
        Call, ConditionalBranch, Reserved, Return, Sequential, Subroutine, SubroutineReturn,
        Switch, Throw, UnconditionalBranch,
    };
    use OperandShape as S;

    let mut table = [OpcodeInfo::new(0, "reserved", S::None, Reserved); 256];

    let mut i = 0;
    while i < 256 {
        table[i].opcode = i as u8;
        i += 1;
    }

    macro_rules! op {
        ($code:expr, $name:expr, $shape:expr, $flow:expr) => {
            table[$code] = OpcodeInfo::new($code as u8, $name, $shape, $flow);
        };
        ($code:expr, $name:expr, $shape:expr) => {
            op!($code, $name, $shape, Sequential)
        };
        ($code:expr, $name:expr) => {
            op!($code, $name, S::None, Sequential)
        };
    }

    // Constants
    op!(0x00, "nop");
    op!(0x01, "aconst_null");
    op!(0x02, "iconst_m1");
    op!(0x03, "iconst_0");
    op!(0x04, "iconst_1");
    op!(0x05, "iconst_2");
    op!(0x06, "iconst_3");
    op!(0x07, "iconst_4");
    op!(0x08, "iconst_5");
    op!(0x09, "lconst_0");
    op!(0x0A, "lconst_1");
    op!(0x0B, "fconst_0");
    op!(0x0C, "fconst_1");
    op!(0x0D, "fconst_2");
    op!(0x0E, "dconst_0");
    op!(0x0F, "dconst_1");
    op!(0x10, "bipush", S::Byte);
    op!(0x11, "sipush", S::Short);
    op!(0x12, "ldc", S::ConstantIndexByte);
    op!(0x13, "ldc_w", S::ConstantIndex);
    op!(0x14, "ldc2_w", S::ConstantIndex);

    // Loads
    op!(0x15, "iload", S::LocalIndex);
    op!(0x16, "lload", S::LocalIndex);
    op!(0x17, "fload", S::LocalIndex);
    op!(0x18, "dload", S::LocalIndex);
    op!(0x19, "aload", S::LocalIndex);
    op!(0x1A, "iload_0");
    op!(0x1B, "iload_1");
    op!(0x1C, "iload_2");
    op!(0x1D, "iload_3");
    op!(0x1E, "lload_0");
    op!(0x1F, "lload_1");
    op!(0x20, "lload_2");
    op!(0x21, "lload_3");
    op!(0x22, "fload_0");
    op!(0x23, "fload_1");
    op!(0x24, "fload_2");
    op!(0x25, "fload_3");
    op!(0x26, "dload_0");
    op!(0x27, "dload_1");
    op!(0x28, "dload_2");
    op!(0x29, "dload_3");
    op!(0x2A, "aload_0");
    op!(0x2B, "aload_1");
    op!(0x2C, "aload_2");
    op!(0x2D, "aload_3");
    op!(0x2E, "iaload");
    op!(0x2F, "laload");
    op!(0x30, "faload");
    op!(0x31, "daload");
    op!(0x32, "aaload");
    op!(0x33, "baload");
    op!(0x34, "caload");
    op!(0x35, "saload");

    // Stores
    op!(0x36, "istore", S::LocalIndex);
    op!(0x37, "lstore", S::LocalIndex);
    op!(0x38, "fstore", S::LocalIndex);
    op!(0x39, "dstore", S::LocalIndex);
    op!(0x3A, "astore", S::LocalIndex);
    op!(0x3B, "istore_0");
    op!(0x3C, "istore_1");
    op!(0x3D, "istore_2");
    op!(0x3E, "istore_3");
    op!(0x3F, "lstore_0");
    op!(0x40, "lstore_1");
    op!(0x41, "lstore_2");
    op!(0x42, "lstore_3");
    op!(0x43, "fstore_0");
    op!(0x44, "fstore_1");
    op!(0x45, "fstore_2");
    op!(0x46, "fstore_3");
    op!(0x47, "dstore_0");
    op!(0x48, "dstore_1");
    op!(0x49, "dstore_2");
    op!(0x4A, "dstore_3");
    op!(0x4B, "astore_0");
    op!(0x4C, "astore_1");
    op!(0x4D, "astore_2");
    op!(0x4E, "astore_3");
    op!(0x4F, "iastore");
    op!(0x50, "lastore");
    op!(0x51, "fastore");
    op!(0x52, "dastore");
    op!(0x53, "aastore");
    op!(0x54, "bastore");
    op!(0x55, "castore");
    op!(0x56, "sastore");

    // Stack
    op!(0x57, "pop");
    op!(0x58, "pop2");
    op!(0x59, "dup");
    op!(0x5A, "dup_x1");
    op!(0x5B, "dup_x2");
    op!(0x5C, "dup2");
    op!(0x5D, "dup2_x1");
    op!(0x5E, "dup2_x2");
    op!(0x5F, "swap");

    // Math
    op!(0x60, "iadd");
    op!(0x61, "ladd");
    op!(0x62, "fadd");
    op!(0x63, "dadd");
    op!(0x64, "isub");
    op!(0x65, "lsub");
    op!(0x66, "fsub");
    op!(0x67, "dsub");
    op!(0x68, "imul");
    op!(0x69, "lmul");
    op!(0x6A, "fmul");
    op!(0x6B, "dmul");
    op!(0x6C, "idiv");
    op!(0x6D, "ldiv");
    op!(0x6E, "fdiv");
    op!(0x6F, "ddiv");
    op!(0x70, "irem");
    op!(0x71, "lrem");
    op!(0x72, "frem");
    op!(0x73, "drem");
    op!(0x74, "ineg");
    op!(0x75, "lneg");
    op!(0x76, "fneg");
    op!(0x77, "dneg");
    op!(0x78, "ishl");
    op!(0x79, "lshl");
    op!(0x7A, "ishr");
    op!(0x7B, "lshr");
    op!(0x7C, "iushr");
    op!(0x7D, "lushr");
    op!(0x7E, "iand");
    op!(0x7F, "land");
    op!(0x80, "ior");
    op!(0x81, "lor");
    op!(0x82, "ixor");
    op!(0x83, "lxor");
    op!(0x84, "iinc", S::Iinc);

    // Conversions
    op!(0x85, "i2l");
    op!(0x86, "i2f");
    op!(0x87, "i2d");
    op!(0x88, "l2i");
    op!(0x89, "l2f");
    op!(0x8A, "l2d");
    op!(0x8B, "f2i");
    op!(0x8C, "f2l");
    op!(0x8D, "f2d");
    op!(0x8E, "d2i");
    op!(0x8F, "d2l");
    op!(0x90, "d2f");
    op!(0x91, "i2b");
    op!(0x92, "i2c");
    op!(0x93, "i2s");

    // Comparisons
    op!(0x94, "lcmp");
    op!(0x95, "fcmpl");
    op!(0x96, "fcmpg");
    op!(0x97, "dcmpl");
    op!(0x98, "dcmpg");
    op!(0x99, "ifeq", S::Branch, ConditionalBranch);
    op!(0x9A, "ifne", S::Branch, ConditionalBranch);
    op!(0x9B, "iflt", S::Branch, ConditionalBranch);
    op!(0x9C, "ifge", S::Branch, ConditionalBranch);
    op!(0x9D, "ifgt", S::Branch, ConditionalBranch);
    op!(0x9E, "ifle", S::Branch, ConditionalBranch);
    op!(0x9F, "if_icmpeq", S::Branch, ConditionalBranch);
    op!(0xA0, "if_icmpne", S::Branch, ConditionalBranch);
    op!(0xA1, "if_icmplt", S::Branch, ConditionalBranch);
    op!(0xA2, "if_icmpge", S::Branch, ConditionalBranch);
    op!(0xA3, "if_icmpgt", S::Branch, ConditionalBranch);
    op!(0xA4, "if_icmple", S::Branch, ConditionalBranch);
    op!(0xA5, "if_acmpeq", S::Branch, ConditionalBranch);
    op!(0xA6, "if_acmpne", S::Branch, ConditionalBranch);

    // Control
    op!(0xA7, "goto", S::Branch, UnconditionalBranch);
    op!(0xA8, "jsr", S::Branch, Subroutine);
    op!(0xA9, "ret", S::LocalIndex, SubroutineReturn);
    op!(0xAA, "tableswitch", S::TableSwitch, Switch);
    op!(0xAB, "lookupswitch", S::LookupSwitch, Switch);
    op!(0xAC, "ireturn", S::None, Return);
    op!(0xAD, "lreturn", S::None, Return);
    op!(0xAE, "freturn", S::None, Return);
    op!(0xAF, "dreturn", S::None, Return);
    op!(0xB0, "areturn", S::None, Return);
    op!(0xB1, "return", S::None, Return);

    // References
    op!(0xB2, "getstatic", S::ConstantIndex);
    op!(0xB3, "putstatic", S::ConstantIndex);
    op!(0xB4, "getfield", S::ConstantIndex);
    op!(0xB5, "putfield", S::ConstantIndex);
    op!(0xB6, "invokevirtual", S::ConstantIndex, Call);
    op!(0xB7, "invokespecial", S::ConstantIndex, Call);
    op!(0xB8, "invokestatic", S::ConstantIndex, Call);
    op!(0xB9, "invokeinterface", S::InvokeInterface, Call);
    op!(0xBA, "invokedynamic", S::InvokeDynamic, Call);
    op!(0xBB, "new", S::ConstantIndex);
    op!(0xBC, "newarray", S::ArrayType);
    op!(0xBD, "anewarray", S::ConstantIndex);
    op!(0xBE, "arraylength");
    op!(0xBF, "athrow", S::None, Throw);
    op!(0xC0, "checkcast", S::ConstantIndex);
    op!(0xC1, "instanceof", S::ConstantIndex);
    op!(0xC2, "monitorenter");
    op!(0xC3, "monitorexit");

    // Extended
    op!(0xC4, "wide", S::Wide);
    op!(0xC5, "multianewarray", S::MultiANewArray);
    op!(0xC6, "ifnull", S::Branch, ConditionalBranch);
    op!(0xC7, "ifnonnull", S::Branch, ConditionalBranch);
    op!(0xC8, "goto_w", S::BranchWide, UnconditionalBranch);
    op!(0xC9, "jsr_w", S::BranchWide, Subroutine);

    // Reserved
    op!(0xCA, "breakpoint", S::None, Reserved);
    op!(0xFE, "impdep1", S::None, Reserved);
    op!(0xFF, "impdep2", S::None, Reserved);

    table
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn catalog_is_total() {
        for (index, info) in OPCODES.iter().enumerate() {
            assert_eq!(usize::from(info.opcode), index);
            assert!(!info.mnemonic.is_empty());
            assert_eq!(info.operand_len, info.shape.min_len());
        }
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut seen = HashSet::new();
        for info in OPCODES.iter().filter(|info| info.mnemonic != "reserved") {
            assert!(seen.insert(info.mnemonic), "duplicate {}", info.mnemonic);
        }
        // 0x00..=0xC9 plus breakpoint, impdep1, impdep2
        assert_eq!(seen.len(), 0xCA + 3);
    }

    #[test]
    fn reserved_range() {
        for opcode in 0xCB..=0xFD_u8 {
            let info = lookup(opcode);
            assert_eq!(info.mnemonic, "reserved");
            assert_eq!(info.shape, OperandShape::None);
            assert!(info.is_reserved());
        }

        assert_eq!(lookup(BREAKPOINT).mnemonic, "breakpoint");
        assert_eq!(lookup(IMPDEP1).mnemonic, "impdep1");
        assert_eq!(lookup(IMPDEP2).mnemonic, "impdep2");
        assert!(lookup(IMPDEP2).is_reserved());
        assert!(!lookup(0x00).is_reserved());
    }

    #[test]
    fn selected_entries() {
        let cases = [
            (0x10, "bipush", OperandShape::Byte, 1, FlowType::Sequential),
            (0x12, "ldc", OperandShape::ConstantIndexByte, 1, FlowType::Sequential),
            (0x84, "iinc", OperandShape::Iinc, 2, FlowType::Sequential),
            (0xA8, "jsr", OperandShape::Branch, 2, FlowType::Subroutine),
            (0xA9, "ret", OperandShape::LocalIndex, 1, FlowType::SubroutineReturn),
            (0xB9, "invokeinterface", OperandShape::InvokeInterface, 4, FlowType::Call),
            (0xBF, "athrow", OperandShape::None, 0, FlowType::Throw),
            (0xC5, "multianewarray", OperandShape::MultiANewArray, 3, FlowType::Sequential),
            (0xC8, "goto_w", OperandShape::BranchWide, 4, FlowType::UnconditionalBranch),
        ];

        for (opcode, mnemonic, shape, len, flow) in cases {
            let info = lookup(opcode);
            assert_eq!(info.mnemonic, mnemonic);
            assert_eq!(info.shape, shape);
            assert_eq!(info.operand_len, len);
            assert_eq!(info.flow, flow);
        }
    }

    #[test]
    fn widenable_set() {
        assert!(is_widenable(IINC));
        assert!(is_widenable(RET));
        assert!(is_widenable(0x19));
        assert!(!is_widenable(0x1A));
        assert!(!is_widenable(WIDE));

        for opcode in WIDENABLE {
            let shape = lookup(opcode).shape;
            assert!(matches!(shape, OperandShape::LocalIndex | OperandShape::Iinc));
        }
    }

    #[test]
    fn mnemonic_lookup() {
        assert_eq!(lookup_mnemonic("tableswitch").unwrap().opcode, TABLESWITCH);
        assert_eq!(lookup_mnemonic("reserved").unwrap().opcode, 0xCB);
        assert!(lookup_mnemonic("ldc.i4").is_none());
    }

    #[test]
    fn shapes_and_flows() {
        assert_eq!(OperandShape::COUNT, OperandShape::iter().count());
        assert_eq!(FlowType::COUNT, 10);
        assert_eq!(OperandShape::TableSwitch.to_string(), "TableSwitch");

        let variable: Vec<_> = OperandShape::iter()
            .filter(|shape| !shape.is_fixed_width())
            .collect();
        assert_eq!(
            variable,
            [
                OperandShape::TableSwitch,
                OperandShape::LookupSwitch,
                OperandShape::Wide
            ]
        );

        assert!(FlowType::ConditionalBranch.falls_through());
        assert!(!FlowType::Return.falls_through());
        assert!(!FlowType::Switch.falls_through());
    }
}
