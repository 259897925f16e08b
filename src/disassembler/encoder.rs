//! Instruction encoding, the byte-exact inverse of the decoder.
//!
//! Encoding validates the same invariants the decoder enforces, so any instruction accepted here
//! decodes back to an identical operand. Switch padding is derived from the length of the output
//! buffer, which must therefore hold exactly the code preceding the instruction.
//!
//! # Examples
//!
//! ```rust
//! use classscope::disassembler::{decode_code, encode_stream, Instruction, Operand};
//!
//! let instructions = [
//!     Instruction::new(0, 2, 0x10, Operand::Byte(42)), // bipush 42
//!     Instruction::new(2, 1, 0xAC, Operand::None),     // ireturn
//! ];
//!
//! let code = encode_stream(&instructions)?;
//! assert_eq!(code, [0x10, 0x2A, 0xAC]);
//! assert_eq!(decode_code(&code)?.instructions(), &instructions);
//! # Ok::<(), classscope::Error>(())
//! ```

use std::collections::HashSet;

use crate::{
    disassembler::{
        catalog::{is_widenable, lookup, OperandShape, IINC},
        codec::switch_padding,
        instruction::{Instruction, LookupSwitch, Operand, TableSwitch, Wide},
    },
    file::io::push_be,
    Result,
};

/// Appends the encoding of `instruction` to `out`.
///
/// The instruction's own `offset` and `size` fields are not consulted; the opcode and operand
/// alone determine the bytes, and switch padding is computed from `out.len()`.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the operand does not fit the opcode's shape, a value is
/// out of range for its encoded width, or the operand violates an instruction invariant. `out`
/// is left unchanged in that case.
pub fn encode_instruction(instruction: &Instruction, out: &mut Vec<u8>) -> Result<()> {
    let info = lookup(instruction.opcode);
    if !instruction.operand.matches_shape(info.shape) {
        return Err(malformed_error!(
            "Operand {:?} does not match {} ({})",
            instruction.operand,
            info.mnemonic,
            info.shape
        ));
    }

    let start = out.len();
    let result = encode_operand(instruction, info.shape, out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

fn encode_operand(instruction: &Instruction, shape: OperandShape, out: &mut Vec<u8>) -> Result<()> {
    let offset = out.len();
    out.push(instruction.opcode);

    match (&instruction.operand, shape) {
        (Operand::None, _) => {}
        (Operand::Byte(value), _) => push_be(out, *value),
        (Operand::Short(value), _) => push_be(out, *value),
        (Operand::Local(index), _) => out.push(*index),
        (Operand::ConstantPool(index), OperandShape::ConstantIndexByte) => {
            let Ok(index) = u8::try_from(*index) else {
                return Err(malformed_error!(
                    "Constant pool index {} does not fit {}",
                    index,
                    instruction.mnemonic
                ));
            };
            out.push(index);
        }
        (Operand::ConstantPool(index), _) => push_be(out, *index),
        (Operand::Iinc { index, increment }, _) => {
            out.push(*index);
            push_be(out, *increment);
        }
        (Operand::Branch(delta), OperandShape::Branch) => {
            let Ok(delta) = i16::try_from(*delta) else {
                return Err(malformed_error!(
                    "Branch offset {} does not fit {}",
                    delta,
                    instruction.mnemonic
                ));
            };
            push_be(out, delta);
        }
        (Operand::Branch(delta), _) => push_be(out, *delta),
        (Operand::NewArray(atype), _) => out.push(*atype),
        (Operand::InvokeInterface { index, count }, _) => {
            if *count == 0 {
                return Err(malformed_error!("invokeinterface count must not be zero"));
            }
            push_be(out, *index);
            out.push(*count);
            out.push(0);
        }
        (Operand::InvokeDynamic(index), _) => {
            push_be(out, *index);
            push_be(out, 0_u16);
        }
        (Operand::MultiANewArray { index, dimensions }, _) => {
            if *dimensions == 0 {
                return Err(malformed_error!("multianewarray dimensions must not be zero"));
            }
            push_be(out, *index);
            out.push(*dimensions);
        }
        (Operand::TableSwitch(table), _) => encode_table_switch(table, offset, out)?,
        (Operand::LookupSwitch(switch), _) => encode_lookup_switch(switch, offset, out)?,
        (Operand::Wide(wide), _) => encode_wide(wide, out)?,
    }

    Ok(())
}

fn encode_table_switch(table: &TableSwitch, offset: usize, out: &mut Vec<u8>) -> Result<()> {
    if table.low > table.high {
        return Err(malformed_error!(
            "tableswitch low {} is greater than high {}",
            table.low,
            table.high
        ));
    }
    if table.declared_len() != table.offsets.len() as i64 {
        return Err(malformed_error!(
            "tableswitch declares {} entries but holds {}",
            table.declared_len(),
            table.offsets.len()
        ));
    }

    out.resize(out.len() + switch_padding(offset), 0);
    push_be(out, table.default);
    push_be(out, table.low);
    push_be(out, table.high);
    for jump in &table.offsets {
        push_be(out, *jump);
    }

    Ok(())
}

fn encode_lookup_switch(switch: &LookupSwitch, offset: usize, out: &mut Vec<u8>) -> Result<()> {
    let Ok(npairs) = i32::try_from(switch.pairs.len()) else {
        return Err(malformed_error!("lookupswitch holds too many pairs"));
    };

    let mut seen = HashSet::with_capacity(switch.pairs.len());
    if let Some((key, _)) = switch.pairs.iter().find(|(key, _)| !seen.insert(*key)) {
        return Err(malformed_error!("lookupswitch repeats match value {}", key));
    }

    out.resize(out.len() + switch_padding(offset), 0);
    push_be(out, switch.default);
    push_be(out, npairs);
    for (key, jump) in &switch.pairs {
        push_be(out, *key);
        push_be(out, *jump);
    }

    Ok(())
}

fn encode_wide(wide: &Wide, out: &mut Vec<u8>) -> Result<()> {
    match wide {
        Wide::Local { opcode, index } => {
            if *opcode == IINC || !is_widenable(*opcode) {
                return Err(malformed_error!(
                    "Opcode 0x{:02X} cannot be widened without an increment",
                    opcode
                ));
            }
            out.push(*opcode);
            push_be(out, *index);
        }
        Wide::Iinc { index, increment } => {
            out.push(IINC);
            push_be(out, *index);
            push_be(out, *increment);
        }
    }

    Ok(())
}

/// Encodes a list of instructions into a fresh code array.
///
/// # Errors
///
/// Returns the first encoding error, see [`encode_instruction`].
pub fn encode_stream(instructions: &[Instruction]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(instructions.iter().map(|i| i.size).sum());
    for instruction in instructions {
        encode_instruction(instruction, &mut out)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::{decode_code, decode_instruction},
        test::bytecode::table_switch,
        Error, Parser,
    };

    #[test]
    fn encode_fixed_width() {
        let cases = [
            (Instruction::new(0, 3, 0x11, Operand::Short(-300)), vec![0x11, 0xFE, 0xD4]),
            (Instruction::new(0, 2, 0x12, Operand::ConstantPool(7)), vec![0x12, 0x07]),
            (Instruction::new(0, 3, 0x13, Operand::ConstantPool(300)), vec![0x13, 0x01, 0x2C]),
            (Instruction::new(0, 3, 0xA7, Operand::Branch(-3)), vec![0xA7, 0xFF, 0xFD]),
            (Instruction::new(0, 2, 0xBC, Operand::NewArray(10)), vec![0xBC, 0x0A]),
            (
                Instruction::new(0, 5, 0xBA, Operand::InvokeDynamic(9)),
                vec![0xBA, 0x00, 0x09, 0x00, 0x00],
            ),
        ];

        for (instruction, expected) in cases {
            let mut out = Vec::new();
            encode_instruction(&instruction, &mut out).unwrap();
            assert_eq!(out, expected, "{}", instruction.mnemonic);

            let mut parser = Parser::new(&out);
            let decoded = decode_instruction(&mut parser).unwrap();
            assert_eq!(decoded.operand, instruction.operand);
            assert_eq!(decoded.size, out.len());
        }
    }

    #[test]
    fn encode_table_switch_padding() {
        let switch = Instruction::new(
            0,
            0,
            0xAA,
            Operand::TableSwitch(TableSwitch {
                default: 99,
                low: 0,
                high: 2,
                offsets: vec![10, 20, 30],
            }),
        );

        let out = encode_stream(std::slice::from_ref(&switch)).unwrap();
        assert_eq!(out, table_switch(0, 99, 0, &[10, 20, 30]));
        assert_eq!(out.len(), 28);

        let mut shifted = vec![0x00];
        encode_instruction(&switch, &mut shifted).unwrap();
        assert_eq!(shifted.len(), 1 + 1 + 2 + 24);
    }

    #[test]
    fn encode_rejects_mismatch() {
        let mut out = vec![0x00];
        let bad = Instruction::new(0, 2, 0x10, Operand::Short(1));
        assert!(matches!(
            encode_instruction(&bad, &mut out),
            Err(Error::Malformed { .. })
        ));
        assert_eq!(out, [0x00]);

        let too_far = Instruction::new(0, 3, 0xA7, Operand::Branch(40_000));
        assert!(encode_instruction(&too_far, &mut out).is_err());
        assert_eq!(out, [0x00]);

        let wide_ldc = Instruction::new(0, 2, 0x12, Operand::ConstantPool(256));
        assert!(encode_instruction(&wide_ldc, &mut out).is_err());
    }

    #[test]
    fn encode_rejects_invalid_payloads() {
        let cases = [
            Operand::TableSwitch(TableSwitch {
                default: 0,
                low: 0,
                high: 3,
                offsets: vec![1],
            }),
            Operand::LookupSwitch(LookupSwitch {
                default: 0,
                pairs: vec![(1, 2), (1, 3)],
            }),
        ];
        let opcodes = [0xAA, 0xAB];

        for (opcode, operand) in opcodes.into_iter().zip(cases) {
            let mut out = Vec::new();
            let instruction = Instruction::new(0, 0, opcode, operand);
            assert!(encode_instruction(&instruction, &mut out).is_err());
            assert!(out.is_empty());
        }

        let mut out = Vec::new();
        let wide = Instruction::new(
            0,
            4,
            0xC4,
            Operand::Wide(Wide::Local {
                opcode: IINC,
                index: 1,
            }),
        );
        assert!(encode_instruction(&wide, &mut out).is_err());

        let interface = Operand::InvokeInterface { index: 1, count: 0 };
        let interface = Instruction::new(0, 5, 0xB9, interface);
        assert!(encode_instruction(&interface, &mut out).is_err());
    }

    #[test]
    fn encode_round_trip_stream() {
        let code = [
            0x2A, 0xC4, 0x36, 0x01, 0x00, 0xC4, 0x84, 0x00, 0x04, 0xFF, 0xF9, 0xB9, 0x00, 0x03,
            0x02, 0x00, 0xC5, 0x00, 0x04, 0x03, 0xB1,
        ];
        let sequence = decode_code(&code).unwrap();
        assert_eq!(encode_stream(sequence.instructions()).unwrap(), code);
    }
}
