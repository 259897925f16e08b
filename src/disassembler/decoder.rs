//! Bytecode instruction decoding.
//!
//! This module drives the decode loop over a method's code array: read one opcode byte, look it
//! up in the catalog, let the matching operand codec read the operands, emit the instruction and
//! continue at the following byte.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use classscope::{Parser, disassembler::{decode_instruction, Operand}};
//!
//! let code = [0x11, 0x01, 0x2C]; // sipush 300
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser)?;
//! assert_eq!(instr.mnemonic, "sipush");
//! assert_eq!(instr.operand, Operand::Short(300));
//! assert_eq!(instr.size, 3);
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! # Example: Decoding a Whole Code Array
//!
//! ```rust
//! use classscope::disassembler::decode_code;
//!
//! let code = [0x2A, 0xB7, 0x00, 0x01, 0xB1]; // aload_0, invokespecial #1, return
//! let sequence = decode_code(&code)?;
//! assert_eq!(sequence.len(), 3);
//! assert_eq!(sequence.byte_len(), code.len());
//! # Ok::<(), classscope::Error>(())
//! ```

use log::trace;

use crate::{
    disassembler::{
        catalog::lookup, codec::decode_operand, instruction::Instruction,
        sequence::InstructionSequence,
    },
    file::parser::Parser,
    Result,
};

/// Decodes a single instruction at the current parser position.
///
/// The parser's data must start at the first byte of the method's code array: the position is
/// recorded as the instruction's offset and drives the alignment of `tableswitch` and
/// `lookupswitch`. On success the parser is advanced past the instruction; the returned
/// instruction's `size` equals the number of bytes consumed.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the parser is already exhausted, and any decode error
/// raised by the operand codec (see [`crate::Error`]) otherwise.
///
/// # Examples
///
/// ```rust
/// use classscope::{Parser, disassembler::{decode_instruction, FlowType}};
///
/// let code = [0xA7, 0xFF, 0xFD]; // goto -3
/// let mut parser = Parser::new(&code);
///
/// let instruction = decode_instruction(&mut parser)?;
/// assert_eq!(instruction.mnemonic, "goto");
/// assert_eq!(instruction.flow_type, FlowType::UnconditionalBranch);
/// assert_eq!(instruction.branch_offsets(), [-3]);
/// # Ok::<(), classscope::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let offset = parser.pos();
    let opcode = parser.next_byte()?;
    let info = lookup(opcode);

    let operand = decode_operand(parser, info, offset)?;
    let size = parser.pos() - offset;

    let instruction = Instruction::new(offset, size, opcode, operand);
    trace!(
        "{:>5}: {} ({} bytes)",
        instruction.offset,
        instruction.mnemonic,
        instruction.size
    );

    Ok(instruction)
}

/// Decodes instructions from the current parser position until the end of the data.
///
/// # Errors
///
/// Returns the first decode error encountered; no partial result is produced.
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

/// Decodes a complete code array into an [`InstructionSequence`].
///
/// # Errors
///
/// Returns the first decode error encountered in `code`.
pub fn decode_code(code: &[u8]) -> Result<InstructionSequence> {
    let mut parser = Parser::new(code);
    let instructions = decode_stream(&mut parser)?;

    Ok(InstructionSequence::new(instructions))
}

/// Lazily decodes a code array, yielding one result per instruction.
///
/// Iteration stops after the first error, since the position of the next instruction is unknown
/// once an instruction failed to decode.
///
/// # Examples
///
/// ```rust
/// use classscope::disassembler::Instructions;
///
/// let code = [0x03, 0x11]; // iconst_0, truncated sipush
/// let results: Vec<_> = Instructions::new(&code).collect();
/// assert_eq!(results.len(), 2);
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
pub struct Instructions<'a> {
    parser: Parser<'a>,
    failed: bool,
}

impl<'a> Instructions<'a> {
    /// Creates an iterator over the instructions of `code`.
    #[must_use]
    pub fn new(code: &'a [u8]) -> Self {
        Instructions {
            parser: Parser::new(code),
            failed: false,
        }
    }
}

impl Iterator for Instructions<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.parser.has_more_data() {
            return None;
        }

        let result = decode_instruction(&mut self.parser);
        self.failed = result.is_err();
        Some(result)
    }
}
