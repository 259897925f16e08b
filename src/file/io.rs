//! Big-endian, bounds-checked reading and writing of primitive values.
//!
//! Every multi-byte quantity in a class file and in the bytecode stream is stored big-endian
//! ("network order"). This module provides the primitive conversions that the
//! [`crate::Parser`] cursor and the instruction encoder are built on.
//!
//! # Key Components
//!
//! - [`crate::file::io::ClassIO`] - Trait tying a primitive type to its fixed-size byte array
//! - [`crate::file::io::read_be`] / [`crate::file::io::read_be_at`] - Read from a buffer
//! - [`crate::file::io::write_be`] / [`crate::file::io::write_be_at`] - Write into a fixed buffer
//! - [`crate::file::io::push_be`] - Append to a growable buffer
//!
//! All readers return [`crate::Error::OutOfBounds`] instead of panicking when the buffer is too
//! short, and leave the offset untouched on failure.
//!
//! # Examples
//!
//! ```rust
//! use classscope::file::io::{read_be_at, push_be};
//!
//! let mut out = Vec::new();
//! push_be(&mut out, 0x0102_u16);
//! push_be(&mut out, -1_i32);
//! assert_eq!(out, [0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF]);
//!
//! let mut offset = 0;
//! let first: u16 = read_be_at(&out, &mut offset)?;
//! let second: i32 = read_be_at(&out, &mut offset)?;
//! assert_eq!((first, second, offset), (0x0102, -1, 6));
//! # Ok::<(), classscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be read from and written to big-endian byte arrays.
///
/// Each implementation names the fixed-size array (`Bytes`) that holds its encoded form, which
/// lets the generic readers slice exactly `size_of::<T>()` bytes and convert them without
/// any intermediate allocation.
pub trait ClassIO: Sized + Copy {
    /// The fixed-size byte array holding the encoded value.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Decode a value from its big-endian representation.
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Encode a value into its big-endian representation.
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_class_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_class_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Reads a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` holds fewer than `size_of::<T>()` bytes.
///
/// # Examples
///
/// ```rust
/// use classscope::file::io::read_be;
///
/// let magic: u32 = read_be(&[0xCA, 0xFE, 0xBA, 0xBE])?;
/// assert_eq!(magic, 0xCAFE_BABE);
/// # Ok::<(), classscope::Error>(())
/// ```
pub fn read_be<T: ClassIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Reads a value of type `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain at `offset`.
/// The offset is not modified in that case.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let end = offset.checked_add(type_len).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_be_bytes(read))
}

/// Writes `value` to the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is too small to hold the value.
pub fn write_be<T: ClassIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_be_at(data, &mut offset, value)
}

/// Writes `value` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is too small to hold the value at `offset`.
pub fn write_be_at<T: ClassIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_be_bytes();
    let bytes = bytes.as_ref();
    let end = offset.checked_add(bytes.len()).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

/// Appends the big-endian encoding of `value` to `out`.
pub fn push_be<T: ClassIO>(out: &mut Vec<u8>, value: T) {
    out.extend_from_slice(value.to_be_bytes().as_ref());
}
