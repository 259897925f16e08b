//! Decoded instruction types.
//!
//! An [`Instruction`] is one decoded opcode together with its typed [`Operand`], its byte offset
//! within the method's code array, and its total encoded size. Operand variants mirror the
//! [`OperandShape`] of the opcode; the three irregular encodings (`tableswitch`, `lookupswitch` and
//! `wide`) carry their own structured payloads.
//!
//! Branch operands are kept exactly as encoded: signed deltas relative to the offset of the
//! branching instruction. [`Instruction::branch_targets`] performs the addition for callers that
//! want absolute offsets.

use std::fmt;

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::disassembler::catalog::{lookup, FlowType, OpcodeInfo, OperandShape, IINC};

/// Primitive element types accepted by `newarray`.
///
/// The discriminant is the `atype` code stored in the bytecode.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum ArrayType {
    /// `T_BOOLEAN`
    Boolean = 4,
    /// `T_CHAR`
    Char = 5,
    /// `T_FLOAT`
    Float = 6,
    /// `T_DOUBLE`
    Double = 7,
    /// `T_BYTE`
    Byte = 8,
    /// `T_SHORT`
    Short = 9,
    /// `T_INT`
    Int = 10,
    /// `T_LONG`
    Long = 11,
}

impl ArrayType {
    /// Maps an `atype` code to its primitive type, if it names one.
    #[must_use]
    pub fn from_code(code: u8) -> Option<ArrayType> {
        ArrayType::iter().find(|ty| *ty as u8 == code)
    }

    /// The `atype` code of this primitive type.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// The payload of a `tableswitch` instruction.
///
/// `offsets[i]` is the jump for the key `low + i`; there are exactly `high - low + 1` of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSwitch {
    /// Branch offset taken when the key is outside `low..=high`
    pub default: i32,
    /// Lowest key covered by the table
    pub low: i32,
    /// Highest key covered by the table
    pub high: i32,
    /// Branch offsets for keys `low..=high`, in order
    pub offsets: Vec<i32>,
}

impl TableSwitch {
    /// Returns the branch offset selected by `key`, falling back to `default`.
    #[must_use]
    pub fn target(&self, key: i32) -> i32 {
        if key < self.low || key > self.high {
            return self.default;
        }

        let index = (i64::from(key) - i64::from(self.low)) as usize;
        self.offsets.get(index).copied().unwrap_or(self.default)
    }

    /// Iterates over `(key, offset)` pairs for every entry of the table.
    pub fn entries(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.low..=self.high).zip(self.offsets.iter().copied())
    }

    /// The number of entries `high - low + 1` declared by the bounds.
    #[must_use]
    pub fn declared_len(&self) -> i64 {
        i64::from(self.high) - i64::from(self.low) + 1
    }
}

/// The payload of a `lookupswitch` instruction.
///
/// Pairs keep the order in which they appear in the bytecode. Match values are unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupSwitch {
    /// Branch offset taken when no match value equals the key
    pub default: i32,
    /// `(match, offset)` pairs in stream order
    pub pairs: Vec<(i32, i32)>,
}

impl LookupSwitch {
    /// Returns the branch offset for `key`, if one of the pairs matches it.
    #[must_use]
    pub fn get(&self, key: i32) -> Option<i32> {
        self.pairs
            .iter()
            .find(|(value, _)| *value == key)
            .map(|(_, offset)| *offset)
    }

    /// Returns the branch offset selected by `key`, falling back to `default`.
    #[must_use]
    pub fn target(&self, key: i32) -> i32 {
        self.get(key).unwrap_or(self.default)
    }

    /// The number of match/offset pairs.
    #[must_use]
    pub fn npairs(&self) -> usize {
        self.pairs.len()
    }
}

/// The payload of a `wide` instruction.
///
/// The increment exists only for a widened `iinc`; every other widenable opcode takes a single
/// 16-bit local variable index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wide {
    /// A widened load, store or `ret` (4 bytes in total)
    Local {
        /// The modified opcode
        opcode: u8,
        /// Local variable slot
        index: u16,
    },
    /// A widened `iinc` (6 bytes in total)
    Iinc {
        /// Local variable slot
        index: u16,
        /// Signed increment
        increment: i16,
    },
}

impl Wide {
    /// The opcode being modified.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        match self {
            Wide::Local { opcode, .. } => *opcode,
            Wide::Iinc { .. } => IINC,
        }
    }

    /// The mnemonic of the modified opcode.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        lookup(self.opcode()).mnemonic
    }

    /// The widened local variable slot.
    #[must_use]
    pub fn index(&self) -> u16 {
        match self {
            Wide::Local { index, .. } | Wide::Iinc { index, .. } => *index,
        }
    }

    /// Total size in bytes, including the `wide` byte itself.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Wide::Local { .. } => 4,
            Wide::Iinc { .. } => 6,
        }
    }
}

/// The decoded operand of an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// Signed byte immediate (`bipush`)
    Byte(i8),
    /// Signed half-word immediate (`sipush`)
    Short(i16),
    /// Local variable slot
    Local(u8),
    /// Constant-pool index; one byte wide for `ldc`, two bytes otherwise
    ConstantPool(u16),
    /// `iinc` slot and increment
    Iinc {
        /// Local variable slot
        index: u8,
        /// Signed increment
        increment: i8,
    },
    /// Branch offset relative to the instruction; 16 or 32 bits wide depending on the opcode
    Branch(i32),
    /// `newarray` element type code
    NewArray(u8),
    /// `invokeinterface` method reference and argument count
    InvokeInterface {
        /// Constant-pool index of the `InterfaceMethodref`
        index: u16,
        /// Argument slot count, never zero
        count: u8,
    },
    /// `invokedynamic` call-site specifier
    InvokeDynamic(u16),
    /// `multianewarray` class reference and dimension count
    MultiANewArray {
        /// Constant-pool index of the array class
        index: u16,
        /// Number of dimensions to create, never zero
        dimensions: u8,
    },
    /// `tableswitch` payload
    TableSwitch(TableSwitch),
    /// `lookupswitch` payload
    LookupSwitch(LookupSwitch),
    /// `wide` payload
    Wide(Wide),
}

impl Operand {
    /// The constant-pool index referenced by this operand, if any.
    #[must_use]
    pub fn constant_pool_index(&self) -> Option<u16> {
        match self {
            Operand::ConstantPool(index)
            | Operand::InvokeDynamic(index)
            | Operand::InvokeInterface { index, .. }
            | Operand::MultiANewArray { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Returns `true` if this operand can be carried by an opcode of the given shape.
    #[must_use]
    pub fn matches_shape(&self, shape: OperandShape) -> bool {
        matches!(
            (self, shape),
            (Operand::None, OperandShape::None)
                | (Operand::Byte(_), OperandShape::Byte)
                | (Operand::Short(_), OperandShape::Short)
                | (Operand::Local(_), OperandShape::LocalIndex)
                | (
                    Operand::ConstantPool(_),
                    OperandShape::ConstantIndexByte | OperandShape::ConstantIndex
                )
                | (Operand::Iinc { .. }, OperandShape::Iinc)
                | (
                    Operand::Branch(_),
                    OperandShape::Branch | OperandShape::BranchWide
                )
                | (Operand::NewArray(_), OperandShape::ArrayType)
                | (Operand::InvokeInterface { .. }, OperandShape::InvokeInterface)
                | (Operand::InvokeDynamic(_), OperandShape::InvokeDynamic)
                | (Operand::MultiANewArray { .. }, OperandShape::MultiANewArray)
                | (Operand::TableSwitch(_), OperandShape::TableSwitch)
                | (Operand::LookupSwitch(_), OperandShape::LookupSwitch)
                | (Operand::Wide(_), OperandShape::Wide)
        )
    }
}

/// A single decoded instruction.
///
/// Constructed once by the decoder and never mutated afterwards. `size` always equals the number
/// of bytes consumed from the code array, so `offset + size` is the offset of the next
/// instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of the opcode within the method's code array
    pub offset: usize,
    /// Total encoded size, opcode byte and padding included
    pub size: usize,
    /// The opcode byte
    pub opcode: u8,
    /// The opcode's mnemonic
    pub mnemonic: &'static str,
    /// Control-flow classification
    pub flow_type: FlowType,
    /// The decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction from its parts, taking mnemonic and flow from the catalog.
    ///
    /// A widened `ret` is classified as [`FlowType::SubroutineReturn`].
    #[must_use]
    pub fn new(offset: usize, size: usize, opcode: u8, operand: Operand) -> Self {
        let info = lookup(opcode);
        let flow_type = match &operand {
            Operand::Wide(wide) => lookup(wide.opcode()).flow,
            _ => info.flow,
        };

        Instruction {
            offset,
            size,
            opcode,
            mnemonic: info.mnemonic,
            flow_type,
            operand,
        }
    }

    /// The catalog entry of this instruction's opcode.
    #[must_use]
    pub fn info(&self) -> &'static OpcodeInfo {
        lookup(self.opcode)
    }

    /// The offset of the byte following this instruction.
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.offset + self.size
    }

    /// Returns `true` for branches, subroutine jumps and switches.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(
            self.flow_type,
            FlowType::ConditionalBranch
                | FlowType::UnconditionalBranch
                | FlowType::Subroutine
                | FlowType::Switch
        )
    }

    /// Relative branch offsets carried by this instruction.
    ///
    /// For switches the default offset comes first, followed by the table entries in order.
    #[must_use]
    pub fn branch_offsets(&self) -> Vec<i32> {
        match &self.operand {
            Operand::Branch(delta) => vec![*delta],
            Operand::TableSwitch(table) => std::iter::once(table.default)
                .chain(table.offsets.iter().copied())
                .collect(),
            Operand::LookupSwitch(lookup) => std::iter::once(lookup.default)
                .chain(lookup.pairs.iter().map(|(_, offset)| *offset))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Absolute branch targets, computed as `offset + delta` for every branch offset.
    ///
    /// Targets that would fall before the start of the code array are omitted.
    #[must_use]
    pub fn branch_targets(&self) -> Vec<usize> {
        self.branch_offsets()
            .into_iter()
            .filter_map(|delta| {
                let target = self.offset as i64 + i64::from(delta);
                usize::try_from(target).ok()
            })
            .collect()
    }
}

impl fmt::Display for Instruction {
    /// Renders the instruction as `mnemonic operands`, without constant-pool annotations.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::disassembler::formatter::render_plain(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_type_codes() {
        assert_eq!(ArrayType::from_code(4), Some(ArrayType::Boolean));
        assert_eq!(ArrayType::from_code(10), Some(ArrayType::Int));
        assert_eq!(ArrayType::from_code(3), None);
        assert_eq!(ArrayType::from_code(12), None);
        assert_eq!(ArrayType::Long.code(), 11);
        assert_eq!(ArrayType::Char.to_string(), "char");
    }

    #[test]
    fn table_switch_lookup() {
        let table = TableSwitch {
            default: 99,
            low: 0,
            high: 2,
            offsets: vec![10, 20, 30],
        };

        assert_eq!(table.declared_len(), 3);
        assert_eq!(table.target(1), 20);
        assert_eq!(table.target(-1), 99);
        assert_eq!(table.target(3), 99);
        assert_eq!(
            table.entries().collect::<Vec<_>>(),
            [(0, 10), (1, 20), (2, 30)]
        );
    }

    #[test]
    fn lookup_switch_lookup() {
        let switch = LookupSwitch {
            default: -1,
            pairs: vec![(5, 100), (9, 200)],
        };

        assert_eq!(switch.npairs(), 2);
        assert_eq!(switch.get(9), Some(200));
        assert_eq!(switch.get(6), None);
        assert_eq!(switch.target(6), -1);
    }

    #[test]
    fn wide_shapes() {
        let iinc = Wide::Iinc {
            index: 4,
            increment: -7,
        };
        assert_eq!(iinc.opcode(), IINC);
        assert_eq!(iinc.mnemonic(), "iinc");
        assert_eq!(iinc.size(), 6);

        let iload = Wide::Local {
            opcode: 0x15,
            index: 300,
        };
        assert_eq!(iload.mnemonic(), "iload");
        assert_eq!(iload.index(), 300);
        assert_eq!(iload.size(), 4);
    }

    #[test]
    fn instruction_flow_from_catalog() {
        let goto = Instruction::new(10, 3, 0xA7, Operand::Branch(-10));
        assert_eq!(goto.mnemonic, "goto");
        assert_eq!(goto.flow_type, FlowType::UnconditionalBranch);
        assert!(goto.is_branch());
        assert_eq!(goto.branch_targets(), [0]);
        assert_eq!(goto.next_offset(), 13);

        let wide_ret = Instruction::new(
            0,
            4,
            0xC4,
            Operand::Wide(Wide::Local {
                opcode: 0xA9,
                index: 256,
            }),
        );
        assert_eq!(wide_ret.mnemonic, "wide");
        assert_eq!(wide_ret.flow_type, FlowType::SubroutineReturn);
        assert!(!wide_ret.is_branch());
    }

    #[test]
    fn switch_branch_offsets() {
        let switch = Instruction::new(
            4,
            28,
            0xAB,
            Operand::LookupSwitch(LookupSwitch {
                default: 40,
                pairs: vec![(1, 20), (2, -8)],
            }),
        );
        assert_eq!(switch.branch_offsets(), [40, 20, -8]);
        assert_eq!(switch.branch_targets(), [44, 24]);
    }

    #[test]
    fn operand_shapes() {
        let ldc = Operand::ConstantPool(1);
        assert!(ldc.matches_shape(OperandShape::ConstantIndexByte));
        assert!(Operand::Branch(1).matches_shape(OperandShape::BranchWide));
        let local = Operand::Local(1);
        assert!(!local.matches_shape(OperandShape::ConstantIndex));
        assert!(!Operand::None.matches_shape(OperandShape::Byte));

        assert_eq!(Operand::InvokeDynamic(7).constant_pool_index(), Some(7));
        assert_eq!(
            Operand::MultiANewArray {
                index: 3,
                dimensions: 2
            }
            .constant_pool_index(),
            Some(3)
        );
        assert_eq!(Operand::Local(3).constant_pool_index(), None);
    }
}
