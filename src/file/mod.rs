//! Input abstraction and low-level byte access.
//!
//! This module owns the raw bytes of an input (a class file on disk or a buffer in memory) and
//! provides the bounds-checked cursor used to read them.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::File`] - A loaded input, independent of where its bytes came from
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Big-endian cursor over a byte slice
//! - [`crate::file::io`] - Primitive big-endian read/write helpers
//!
//! ## Backend Implementations
//! - `Physical` - Memory-mapped file backend (`memmap2`)
//! - `Memory` - Owned in-memory buffer backend
//!
//! # Examples
//!
//! ```rust
//! use classscope::File;
//!
//! let file = File::from_mem(vec![0xCA, 0xFE, 0xBA, 0xBE])?;
//! assert_eq!(file.len(), 4);
//!
//! let mut parser = file.parser();
//! assert_eq!(parser.next_word()?, 0xCAFE_BABE);
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`File`] is `Send + Sync`; any number of parsers may borrow it concurrently.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Parser, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of input bytes, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded, non-empty input buffer.
///
/// `File` hides whether the bytes are memory-mapped from disk or owned in memory. Higher-level
/// parsers such as [`crate::ClassFile`] hold a `File` and borrow its data through
/// [`File::parser`].
///
/// # Examples
///
/// ```rust,no_run
/// use classscope::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("Hello.class"))?;
/// println!("Loaded {} bytes", file.len());
/// # Ok::<(), classscope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl File {
    /// Loads an input file from the given path by memory-mapping it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened,
    /// [`crate::Error::Error`] if it cannot be mapped, and [`crate::Error::Empty`] if it is empty.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads an input from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] if the buffer is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// Returns the total size of the loaded input in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the input has a length of zero.
    ///
    /// Never true for a successfully loaded `File`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the complete input buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `offset + len` exceeds the input.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Creates a new [`Parser`] positioned at the start of the input.
    #[must_use]
    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self.data())
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("len", &self.len()).finish()
    }
}
