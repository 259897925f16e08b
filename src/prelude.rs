//! # classscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classscope library. Import this module to get quick access to the essential
//! types for decoding and disassembling JVM bytecode.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classscope operations
pub use crate::Error;

/// The result type used throughout classscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for class-file analysis
pub use crate::ClassFile;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Decoding entry points
pub use crate::disassembler::{decode_code, decode_instruction, decode_stream, Instructions};

/// Encoding back to bytecode
pub use crate::disassembler::{encode_instruction, encode_stream};

/// Instruction model
pub use crate::disassembler::{
    ArrayType, Instruction, InstructionSequence, LookupSwitch, Operand, TableSwitch, Wide,
};

/// Opcode catalog
pub use crate::disassembler::{lookup, lookup_mnemonic, FlowType, OpcodeInfo, OperandShape};

/// Text rendering
pub use crate::disassembler::{ConstantLookup, FormatOptions, Formatter};

// ================================================================================================
// Class-File Container
// ================================================================================================

/// Constant pool
pub use crate::classfile::{ConstantEntry, ConstantPool, ConstantTag, ReferenceKind};

/// Members and attributes
pub use crate::classfile::{Attribute, CodeAttribute, ExceptionTableEntry, FieldInfo, MethodInfo};

/// Access flags
pub use crate::classfile::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
