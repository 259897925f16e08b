//! Decoded instruction sequences.
//!
//! [`InstructionSequence`] holds the instructions decoded from one code array, in order. Offsets
//! increase strictly and every instruction starts where the previous one ended, so lookups by
//! byte offset are binary searches.

use std::ops::Index;

use crate::{
    disassembler::{encoder::encode_stream, instruction::Instruction},
    Result,
};

/// The ordered instructions of one method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
}

impl InstructionSequence {
    /// Wraps decoded instructions. They must be ordered by offset.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        InstructionSequence { instructions }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the code array was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Iterates over the instructions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// The decoded instructions as a slice.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Total number of bytes covered, the sum of all instruction sizes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.instructions
            .iter()
            .map(|instruction| instruction.size)
            .sum()
    }

    /// Position in the sequence of the instruction starting exactly at `offset`.
    #[must_use]
    pub fn index_of_offset(&self, offset: usize) -> Option<usize> {
        self.instructions
            .binary_search_by_key(&offset, |instruction| instruction.offset)
            .ok()
    }

    /// The instruction starting exactly at `offset`.
    #[must_use]
    pub fn instruction_at(&self, offset: usize) -> Option<&Instruction> {
        self.index_of_offset(offset)
            .map(|index| &self.instructions[index])
    }

    /// Resolves the relative branch offsets of the instruction at position `index` into absolute
    /// offsets.
    ///
    /// Switches yield the default target first, then the table entries. Instructions that do
    /// not branch yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the end of the sequence, and
    /// [`crate::Error::Malformed`] if a target does not land on the first byte of an instruction.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classscope::disassembler::decode_code;
    ///
    /// // 0: iconst_0  1: ifeq +4  4: nop  5: return
    /// let sequence = decode_code(&[0x03, 0x99, 0x00, 0x04, 0x00, 0xB1])?;
    /// assert_eq!(sequence.resolve_branch_targets(1)?, [5]);
    /// assert!(sequence.resolve_branch_targets(0)?.is_empty());
    /// # Ok::<(), classscope::Error>(())
    /// ```
    pub fn resolve_branch_targets(&self, index: usize) -> Result<Vec<usize>> {
        let Some(instruction) = self.instructions.get(index) else {
            return Err(out_of_bounds_error!());
        };

        instruction
            .branch_offsets()
            .into_iter()
            .map(|delta| {
                let target = instruction.offset as i64 + i64::from(delta);
                match usize::try_from(target) {
                    Ok(target) if self.index_of_offset(target).is_some() => Ok(target),
                    _ => Err(malformed_error!(
                        "Branch at offset {} targets {}, which is not an instruction boundary",
                        instruction.offset,
                        target
                    )),
                }
            })
            .collect()
    }

    /// Re-encodes the sequence into a code array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if an instruction cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_stream(&self.instructions)
    }

    /// Consumes the sequence and returns the instructions.
    #[must_use]
    pub fn into_inner(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl Index<usize> for InstructionSequence {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl IntoIterator for InstructionSequence {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}
