//! Cursor-based byte stream reader for class files and bytecode.
//!
//! This module provides [`crate::file::parser::Parser`], a bounds-checked cursor over a byte slice.
//! It is used both for the class-file container (constant pool, member tables, attributes) and
//! for walking a method's code array instruction by instruction.
//!
//! All multi-byte reads are big-endian, matching the class-file format. Every operation that
//! would move the cursor past the end of the data fails with [`crate::Error::OutOfBounds`] and
//! leaves the position unchanged.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to a specific position
//! - [`crate::file::parser::Parser::skip`] - Move forward by a number of bytes
//! - [`crate::file::parser::Parser::pos`] - Get the current position
//! - [`crate::file::parser::Parser::align`] - Skip padding up to a byte boundary
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read any [`crate::file::io::ClassIO`] type
//! - [`crate::file::parser::Parser::next_byte`] - Read a `u1`
//! - [`crate::file::parser::Parser::next_half_word`] - Read a `u2`
//! - [`crate::file::parser::Parser::next_word`] - Read a `u4`
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a slice of raw bytes
//!
//! # Examples
//!
//! ```rust
//! use classscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.next_word()?, 0xCAFE_BABE);
//! let minor = parser.next_half_word()?;
//! let major = parser.next_half_word()?;
//! assert_eq!((major, minor), (52, 0));
//! assert!(!parser.has_more_data());
//! # Ok::<(), classscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic binary data parser for reading class-file structures and bytecode.
///
/// `Parser` keeps a position within a borrowed byte slice and offers sequential, big-endian
/// reads. It never copies the underlying data: [`Parser::read_bytes`] hands out sub-slices with
/// the lifetime of the original buffer.
///
/// # Examples
///
/// ```rust
/// use classscope::Parser;
///
/// let data = [0x10, 0xFF, 0x11, 0x01, 0x2C];
/// let mut parser = Parser::new(&data);
///
/// // bipush -1
/// assert_eq!(parser.next_byte()?, 0x10);
/// assert_eq!(parser.read_be::<i8>()?, -1);
///
/// // sipush 300
/// assert_eq!(parser.next_byte()?, 0x11);
/// assert_eq!(parser.read_be::<i16>()?, 300);
/// # Ok::<(), classscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the number of bytes left between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to `len()` is allowed and leaves the parser exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is beyond the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.seek(2)?;
    /// assert_eq!(parser.next_byte()?, 0x03);
    /// assert!(parser.seek(5).is_err());
    /// # Ok::<(), classscope::Error>(())
    /// ```
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Skip `count` bytes without inspecting them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.position = self.end_of(count)?;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Align the position to a specific boundary, measured from the start of the data.
    ///
    /// The skipped padding bytes are not inspected.
    ///
    /// # Arguments
    /// * `alignment` - The boundary to align to
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the padding would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classscope::Parser;
    /// let data = [0xAA, 0x00, 0x00, 0x00, 0x12, 0x34, 0x56, 0x78];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.next_byte()?;
    /// parser.align(4)?;
    /// assert_eq!(parser.pos(), 4);
    /// assert_eq!(parser.next_word()?, 0x1234_5678);
    /// # Ok::<(), classscope::Error>(())
    /// ```
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        if alignment == 0 {
            return Ok(());
        }

        let padding = (alignment - (self.position % alignment)) % alignment;
        self.skip(padding)
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Read a single unsigned byte (`u1`).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the parser is exhausted.
    pub fn next_byte(&mut self) -> Result<u8> {
        self.read_be::<u8>()
    }

    /// Read an unsigned big-endian half word (`u2`).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than two bytes remain.
    pub fn next_half_word(&mut self) -> Result<u16> {
        self.read_be::<u16>()
    }

    /// Read an unsigned big-endian word (`u4`).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than four bytes remain.
    pub fn next_word(&mut self) -> Result<u32> {
        self.read_be::<u32>()
    }

    /// Ensures that at least `needed` bytes are available from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(out_of_bounds_error!());
        }
        Ok(())
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// # Arguments
    /// * `length` - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classscope::Parser;
    /// let data = [0x00, 0x03, b'f', b'o', b'o'];
    /// let mut parser = Parser::new(&data);
    ///
    /// let len = parser.next_half_word()? as usize;
    /// assert_eq!(parser.read_bytes(len)?, b"foo");
    /// # Ok::<(), classscope::Error>(())
    /// ```
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.end_of(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }


    fn end_of(&self, length: usize) -> Result<usize> {
        self.position
            .checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or(out_of_bounds_error!())
    }
}
