// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # classscope
//!
//! A fast, strongly-typed decoder and disassembler for JVM class-file bytecode. Built in pure
//! Rust, `classscope` turns the `code` array of a method into typed instructions, renders them as
//! text, and parses the class file around them to resolve constant-pool references.
//!
//! ## Features
//!
//! - **Total opcode catalog** - All 256 opcode values map to an entry; nothing panics on odd input
//! - **Typed operands** - One closed enum of operand shapes, including the variable-length
//!   `tableswitch`, `lookupswitch` and `wide` encodings
//! - **Precise errors** - Every decode failure carries the opcode and byte offset
//! - **Byte-exact encoder** - Decoded instructions encode back to the original bytes
//! - **Class-file container** - Constant pool, members and `Code` attributes, memory-mapped input
//! - **Parallel decoding** - All methods of a class decoded at once with `rayon`
//!
//! ## Quick Start
//!
//! ```rust
//! use classscope::prelude::*;
//!
//! // aload_0, invokespecial #1, return
//! let code = [0x2A, 0xB7, 0x00, 0x01, 0xB1];
//! let sequence = decode_code(&code)?;
//!
//! for instruction in &sequence {
//!     println!("{:>4}: {}", instruction.offset, instruction);
//! }
//! assert_eq!(sequence[1].to_string(), "invokespecial #1");
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! ### Disassembling a Class File
//!
//! ```rust,no_run
//! use classscope::{disassembler::Formatter, ClassFile};
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Hello.class"))?;
//! let formatter = Formatter::default();
//!
//! for method in &class.methods {
//!     println!("{}:", method.name(&class.constant_pool)?);
//!     if let Some(sequence) = method.decode(&class.constant_pool)? {
//!         for instruction in &sequence {
//!             println!("  {}", formatter.format(instruction, Some(&class.constant_pool)));
//!         }
//!     }
//! }
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`disassembler`] - Opcode catalog, operand codec, decoder, encoder and formatter
//! - [`classfile`] - Class-file parsing, constant pool and access flags
//! - [`file`] - Input backends and the bounds-checked byte [`Parser`]
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Decode errors are fatal for the method
//! being decoded, never for the process:
//!
//! ```rust
//! use classscope::{disassembler::decode_code, Error};
//!
//! match decode_code(&[0x11, 0x01]) {
//!     Err(Error::Truncated { opcode, offset }) => {
//!         assert_eq!((opcode, offset), (0x11, 0));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run decode_code --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Input handling: file and memory backends, big-endian I/O helpers and the byte [`Parser`].
pub mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use classscope::prelude::*;
///
/// let mut parser = Parser::new(&[0x10, 0x2A]);
/// let instruction = decode_instruction(&mut parser)?;
/// assert_eq!(instruction.operand, Operand::Byte(42));
/// # Ok::<(), classscope::Error>(())
/// ```
pub mod prelude;

/// JVM bytecode decoding, encoding and disassembly.
///
/// # Key Types
///
/// - [`disassembler::Instruction`] - A decoded instruction
/// - [`disassembler::Operand`] - Typed operands, one variant per operand shape
/// - [`disassembler::OpcodeInfo`] - Static per-opcode metadata
/// - [`disassembler::InstructionSequence`] - All instructions of one method
///
/// # Main Functions
///
/// - [`disassembler::decode_instruction`] - Decode a single instruction
/// - [`disassembler::decode_code`] - Decode a whole code array
/// - [`disassembler::encode_stream`] - Encode instructions back to bytes
pub mod disassembler;

/// Parsing of the class-file container: constant pool, fields, methods and attributes.
pub mod classfile;

/// `classscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `classscope` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the variants.
pub use error::Error;

/// Main entry point for working with class files.
///
/// # Example
///
/// ```rust,no_run
/// use classscope::ClassFile;
/// let class = ClassFile::from_file(std::path::Path::new("Hello.class"))?;
/// println!("Found {} methods", class.methods.len());
/// # Ok::<(), classscope::Error>(())
/// ```
pub use classfile::ClassFile;

/// Provides access to low-level file and memory parsing utilities.
///
/// # Example
///
/// ```rust
/// use classscope::{Parser, disassembler::decode_instruction};
/// let code = [0xB1]; // return
/// let mut parser = Parser::new(&code);
/// let instr = decode_instruction(&mut parser)?;
/// assert_eq!(instr.mnemonic, "return");
/// # Ok::<(), classscope::Error>(())
/// ```
pub use file::{parser::Parser, File};
