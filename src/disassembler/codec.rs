//! Operand codec strategies.
//!
//! After the decoder has consumed an opcode byte, one of three strategies reads the operands:
//!
//! - **fixed-width** for every shape whose length is known from the opcode alone,
//! - **table** for `tableswitch` / `lookupswitch`, which skip alignment padding and then read a
//!   length-prefixed table,
//! - **prefixed** for `wide`, whose shape depends on the opcode it modifies.
//!
//! All strategies read from a [`Parser`] whose position 0 is the first byte of the method's code
//! array, so switch padding can be derived from the cursor position. Short reads surface as
//! [`Error::OutOfBounds`] and are turned into [`Error::Truncated`] by [`decode_operand`].

use std::collections::HashSet;

use crate::{
    disassembler::{
        catalog::{is_widenable, OpcodeInfo, OperandShape, IINC},
        instruction::{LookupSwitch, Operand, TableSwitch, Wide},
    },
    file::parser::Parser,
    Error, Result,
};

/// Padding bytes between a switch opcode at `offset` and its first table field.
#[must_use]
pub fn switch_padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

/// Reads the operand of the instruction whose opcode byte sits at `offset`.
///
/// The parser must be positioned directly after the opcode byte. On success it is left on the
/// first byte of the next instruction.
///
/// # Errors
///
/// Returns [`Error::Truncated`] if the operands run past the end of the code, or one of the
/// instruction-specific validation errors for malformed operands.
pub fn decode_operand(parser: &mut Parser, info: &OpcodeInfo, offset: usize) -> Result<Operand> {
    let result = match info.shape {
        OperandShape::TableSwitch => decode_table_switch(parser, offset),
        OperandShape::LookupSwitch => decode_lookup_switch(parser, offset),
        OperandShape::Wide => decode_wide(parser, offset),
        shape => decode_fixed(parser, shape, offset),
    };

    result.map_err(|error| match error {
        Error::OutOfBounds => Error::Truncated {
            opcode: info.opcode,
            offset,
        },
        other => other,
    })
}

/// Fixed-width strategy: operand layout is a direct function of the shape.
fn decode_fixed(parser: &mut Parser, shape: OperandShape, offset: usize) -> Result<Operand> {
    let operand = match shape {
        OperandShape::None => Operand::None,
        OperandShape::Byte => Operand::Byte(parser.read_be::<i8>()?),
        OperandShape::Short => Operand::Short(parser.read_be::<i16>()?),
        OperandShape::LocalIndex => Operand::Local(parser.next_byte()?),
        OperandShape::ConstantIndexByte => Operand::ConstantPool(u16::from(parser.next_byte()?)),
        OperandShape::ConstantIndex => Operand::ConstantPool(parser.next_half_word()?),
        OperandShape::Iinc => {
            let index = parser.next_byte()?;
            let increment = parser.read_be::<i8>()?;
            Operand::Iinc { index, increment }
        }
        OperandShape::Branch => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        OperandShape::BranchWide => Operand::Branch(parser.read_be::<i32>()?),
        OperandShape::ArrayType => Operand::NewArray(parser.next_byte()?),
        OperandShape::InvokeInterface => {
            let index = parser.next_half_word()?;
            let count = parser.next_byte()?;
            let reserved = parser.next_byte()?;
            if count == 0 || reserved != 0 {
                return Err(Error::InvalidInvokeInterface {
                    offset,
                    count,
                    reserved,
                });
            }
            Operand::InvokeInterface { index, count }
        }
        OperandShape::InvokeDynamic => {
            let index = parser.next_half_word()?;
            let reserved = parser.next_half_word()?;
            if reserved != 0 {
                return Err(Error::InvalidInvokeDynamic { offset, reserved });
            }
            Operand::InvokeDynamic(index)
        }
        OperandShape::MultiANewArray => {
            let index = parser.next_half_word()?;
            let dimensions = parser.next_byte()?;
            if dimensions == 0 {
                return Err(Error::InvalidMultiANewArray { offset, dimensions });
            }
            Operand::MultiANewArray { index, dimensions }
        }
        OperandShape::TableSwitch | OperandShape::LookupSwitch | OperandShape::Wide => {
            return Err(malformed_error!(
                "Operand shape {} at offset {} is not fixed-width",
                shape,
                offset
            ));
        }
    };

    Ok(operand)
}

/// Table strategy for `tableswitch`.
fn decode_table_switch(parser: &mut Parser, offset: usize) -> Result<Operand> {
    parser.align(4)?;

    let default = parser.read_be::<i32>()?;
    let low = parser.read_be::<i32>()?;
    let high = parser.read_be::<i32>()?;
    if low > high {
        return Err(Error::InvalidTableSwitch { offset, low, high });
    }

    let count = usize::try_from(i64::from(high) - i64::from(low) + 1)
        .map_err(|_| Error::OutOfBounds)?;
    parser.ensure_remaining(count.checked_mul(4).ok_or(Error::OutOfBounds)?)?;

    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(parser.read_be::<i32>()?);
    }

    Ok(Operand::TableSwitch(TableSwitch {
        default,
        low,
        high,
        offsets,
    }))
}

/// Table strategy for `lookupswitch`.
fn decode_lookup_switch(parser: &mut Parser, offset: usize) -> Result<Operand> {
    parser.align(4)?;

    let default = parser.read_be::<i32>()?;
    let npairs = parser.read_be::<i32>()?;
    let Ok(count) = usize::try_from(npairs) else {
        return Err(Error::InvalidLookupSwitch { offset, npairs });
    };
    parser.ensure_remaining(count.checked_mul(8).ok_or(Error::OutOfBounds)?)?;

    let mut seen = HashSet::with_capacity(count);
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let key = parser.read_be::<i32>()?;
        let jump = parser.read_be::<i32>()?;
        if !seen.insert(key) {
            return Err(Error::DuplicateLookupKey { offset, key });
        }
        pairs.push((key, jump));
    }

    Ok(Operand::LookupSwitch(LookupSwitch { default, pairs }))
}

/// Prefixed strategy for `wide`.
fn decode_wide(parser: &mut Parser, offset: usize) -> Result<Operand> {
    let opcode = parser.next_byte()?;
    if !is_widenable(opcode) {
        return Err(Error::UnknownWideOpcode { offset, opcode });
    }

    let index = parser.next_half_word()?;
    let wide = if opcode == IINC {
        Wide::Iinc {
            index,
            increment: parser.read_be::<i16>()?,
        }
    } else {
        Wide::Local { opcode, index }
    };

    Ok(Operand::Wide(wide))
}
