//! JVM bytecode decoding, encoding and disassembly.
//!
//! This module turns the `code` array of a method into typed [`Instruction`]s and back. It
//! consists of the static opcode catalog, the operand codec strategies, the decode loop, the
//! inverse encoder and a text formatter.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction with offset, size and typed [`Operand`]
//! - [`OpcodeInfo`] - The catalog entry of one opcode value
//! - [`InstructionSequence`] - All instructions of one code array, indexed by offset
//! - [`Formatter`] - Renders instructions as `<mnemonic> <operands>` text
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode every instruction until the end of the data
//! - [`decode_code`] - Decode a code array into an [`InstructionSequence`]
//! - [`encode_stream`] - Encode instructions back into a code array
//!
//! # Example
//! ```rust
//! use classscope::disassembler::decode_instruction;
//! use classscope::Parser;
//! let bytecode = &[0x00, 0xB1]; // nop, return
//! let mut parser = Parser::new(bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! println!("Mnemonic: {}", instruction.mnemonic);
//! # Ok::<(), classscope::Error>(())
//! ```

mod catalog;
mod codec;
mod decoder;
mod encoder;
mod formatter;
mod instruction;
mod sequence;

pub use catalog::{
    is_widenable, lookup, lookup_mnemonic, FlowType, OpcodeInfo, OperandShape, BREAKPOINT, IINC,
    IMPDEP1, IMPDEP2, LOOKUPSWITCH, OPCODES, RET, TABLESWITCH, WIDE, WIDENABLE,
};
pub use codec::{decode_operand, switch_padding};
pub use decoder::{decode_code, decode_instruction, decode_stream, Instructions};
pub use encoder::{encode_instruction, encode_stream};
pub use formatter::{ConstantLookup, FormatOptions, Formatter};
pub use instruction::{ArrayType, Instruction, LookupSwitch, Operand, TableSwitch, Wide};
pub use sequence::InstructionSequence;
