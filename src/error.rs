use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three groups: failures of the byte cursor and input handling, failures
/// while decoding a single method's code array, and failures while parsing the class-file
/// container around it.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted or invalid structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Decode Errors
///
/// Every decode error names the byte offset of the instruction that failed, relative to the start
/// of the method's code array. They are fatal for the method being decoded, never for the process:
/// a caller walking many methods can record the failure and continue with the next one.
///
/// - [`Error::Truncated`] - An operand needs more bytes than remain
/// - [`Error::InvalidTableSwitch`] - `tableswitch` with `low > high`
/// - [`Error::InvalidLookupSwitch`] - `lookupswitch` with a negative pair count
/// - [`Error::DuplicateLookupKey`] - `lookupswitch` with a repeated match value
/// - [`Error::InvalidInvokeInterface`] - zero count or non-zero reserved byte
/// - [`Error::InvalidInvokeDynamic`] - non-zero reserved bytes
/// - [`Error::InvalidMultiANewArray`] - zero dimensions
/// - [`Error::UnknownWideOpcode`] - `wide` applied to an opcode that cannot be widened
///
/// ## Class File Errors
/// - [`Error::InvalidMagic`] - The input does not start with `0xCAFEBABE`
/// - [`Error::InvalidConstantIndex`] - A constant-pool index is zero, out of range or unusable
/// - [`Error::UnexpectedConstant`] - A constant-pool entry has the wrong tag
/// - [`Error::InvalidMutf8`] - A `CONSTANT_Utf8` entry is not valid modified UTF-8
///
/// # Examples
///
/// ```rust
/// use classscope::{disassembler::decode_code, Error};
///
/// // sipush without its two operand bytes
/// match decode_code(&[0x11]) {
///     Err(Error::Truncated { opcode, offset }) => {
///         assert_eq!(opcode, 0x11);
///         assert_eq!(offset, 0);
///     }
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Input Errors
    /// The input is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    ///
    /// Raised by the [`crate::Parser`] whenever a read, skip or seek would move past the end of
    /// the underlying data. The decoder converts it into [`Error::Truncated`] so the failing
    /// instruction can be located.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping a class file.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    // Decode Errors
    /// An instruction's operands extend past the end of the code array.
    #[error("Truncated instruction - opcode 0x{opcode:02X} at offset {offset} runs past the end of the code")]
    Truncated {
        /// The opcode whose operands could not be read
        opcode: u8,
        /// Offset of the opcode byte within the code array
        offset: usize,
    },

    /// A `tableswitch` whose bounds do not describe a table (`low > high`).
    #[error("Invalid tableswitch at offset {offset} - low ({low}) is greater than high ({high})")]
    InvalidTableSwitch {
        /// Offset of the `tableswitch` opcode
        offset: usize,
        /// The decoded lower bound
        low: i32,
        /// The decoded upper bound
        high: i32,
    },

    /// A `lookupswitch` with a negative pair count.
    #[error("Invalid lookupswitch at offset {offset} - npairs ({npairs}) is negative")]
    InvalidLookupSwitch {
        /// Offset of the `lookupswitch` opcode
        offset: usize,
        /// The decoded pair count
        npairs: i32,
    },

    /// A `lookupswitch` that lists the same match value twice.
    #[error("Invalid lookupswitch at offset {offset} - duplicate match value {key}")]
    DuplicateLookupKey {
        /// Offset of the `lookupswitch` opcode
        offset: usize,
        /// The repeated match value
        key: i32,
    },

    /// An `invokeinterface` with a zero count or a non-zero reserved byte.
    #[error("Invalid invokeinterface at offset {offset} - count {count}, reserved byte {reserved}")]
    InvalidInvokeInterface {
        /// Offset of the `invokeinterface` opcode
        offset: usize,
        /// The decoded argument count (must not be zero)
        count: u8,
        /// The trailing byte (must be zero)
        reserved: u8,
    },

    /// An `invokedynamic` whose two trailing bytes are not zero.
    #[error("Invalid invokedynamic at offset {offset} - reserved bytes are 0x{reserved:04X}")]
    InvalidInvokeDynamic {
        /// Offset of the `invokedynamic` opcode
        offset: usize,
        /// Both trailing bytes, big-endian (must be zero)
        reserved: u16,
    },

    /// A `multianewarray` that creates zero dimensions.
    #[error("Invalid multianewarray at offset {offset} - dimensions must be at least 1, got {dimensions}")]
    InvalidMultiANewArray {
        /// Offset of the `multianewarray` opcode
        offset: usize,
        /// The decoded dimension count
        dimensions: u8,
    },

    /// A `wide` prefix applied to an opcode outside the widenable set.
    #[error("Invalid wide at offset {offset} - opcode 0x{opcode:02X} cannot be widened")]
    UnknownWideOpcode {
        /// Offset of the `wide` opcode
        offset: usize,
        /// The modified opcode that followed `wide`
        opcode: u8,
    },

    // Class File Errors
    /// The input does not start with the class-file magic number.
    #[error("Invalid magic number 0x{0:08X}, expected 0xCAFEBABE")]
    InvalidMagic(u32),

    /// A constant-pool index is zero, past the end of the pool, or points into the unusable slot
    /// following a `Long`/`Double` entry.
    #[error("Invalid constant pool index - {0}")]
    InvalidConstantIndex(u16),

    /// A constant-pool entry was found, but with a different tag than the reference requires.
    #[error("Constant pool entry {index} is {found}, expected {expected}")]
    UnexpectedConstant {
        /// The referenced index
        index: u16,
        /// The tag that was required
        expected: &'static str,
        /// The tag that was found
        found: &'static str,
    },

    /// Bytes of a `CONSTANT_Utf8` entry that are not valid modified UTF-8.
    #[error("Invalid modified UTF-8 sequence at byte {0}")]
    InvalidMutf8(usize),
}

impl Error {
    /// Returns `true` for the errors raised while decoding a single instruction.
    ///
    /// These are the failures that are scoped to one method's code array; see the
    /// "Decode Errors" section of [`Error`].
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. }
                | Error::InvalidTableSwitch { .. }
                | Error::InvalidLookupSwitch { .. }
                | Error::DuplicateLookupKey { .. }
                | Error::InvalidInvokeInterface { .. }
                | Error::InvalidInvokeDynamic { .. }
                | Error::InvalidMultiANewArray { .. }
                | Error::UnknownWideOpcode { .. }
        )
    }

    /// The offset of the failing instruction within its code array, for decode errors.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Truncated { offset, .. }
            | Error::InvalidTableSwitch { offset, .. }
            | Error::InvalidLookupSwitch { offset, .. }
            | Error::DuplicateLookupKey { offset, .. }
            | Error::InvalidInvokeInterface { offset, .. }
            | Error::InvalidInvokeDynamic { offset, .. }
            | Error::InvalidMultiANewArray { offset, .. }
            | Error::UnknownWideOpcode { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_carry_offset() {
        let err = Error::InvalidTableSwitch {
            offset: 12,
            low: 5,
            high: 1,
        };
        assert!(err.is_decode_error());
        assert_eq!(err.offset(), Some(12));
        assert_eq!(
            err.to_string(),
            "Invalid tableswitch at offset 12 - low (5) is greater than high (1)"
        );
    }

    #[test]
    fn input_errors_are_not_decode_errors() {
        assert!(!Error::OutOfBounds.is_decode_error());
        assert!(!Error::InvalidMagic(0xDEADBEEF).is_decode_error());
        assert_eq!(Error::Empty.offset(), None);
        assert_eq!(
            Error::InvalidMagic(0xDEADBEEF).to_string(),
            "Invalid magic number 0xDEADBEEF, expected 0xCAFEBABE"
        );
    }

    #[test]
    fn malformed_records_location() {
        let err = malformed_error!("bad {} entry", 3);
        match err {
            Error::Malformed { message, file, .. } => {
                assert_eq!(message, "bad 3 entry");
                assert!(file.ends_with("error.rs"));
            }
            _ => panic!("Expected Error::Malformed"),
        }
    }

    #[test]
    fn truncated_message() {
        let err = Error::Truncated {
            opcode: 0x11,
            offset: 7,
        };
        assert_eq!(
            err.to_string(),
            "Truncated instruction - opcode 0x11 at offset 7 runs past the end of the code"
        );
    }
}
