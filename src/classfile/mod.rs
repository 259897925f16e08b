//! The class-file container around the bytecode.
//!
//! [`ClassFile`] parses the complete `ClassFile` structure: header, constant pool, access flags,
//! class references, fields, methods and attributes. It owns everything it parses, so it can
//! outlive the input buffer. Method bodies are decoded on request, either one at a time via
//! [`MethodInfo::decode`] or all at once via [`ClassFile::decode_methods`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use classscope::ClassFile;
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Hello.class"))?;
//! println!("{} extends {:?}", class.this_class_name()?, class.super_class_name()?);
//!
//! for (method, result) in class.methods.iter().zip(class.decode_methods()) {
//!     let name = method.name(&class.constant_pool)?;
//!     match result {
//!         Ok(Some(code)) => println!("{name}: {} instructions", code.len()),
//!         Ok(None) => println!("{name}: no code"),
//!         Err(error) => println!("{name}: {error}"),
//!     }
//! }
//! # Ok::<(), classscope::Error>(())
//! ```

pub mod constant_pool;
pub mod flags;
pub mod member;
pub mod mutf8;

use std::path::Path;

use log::{debug, warn};
use rayon::prelude::*;

pub use constant_pool::{ConstantEntry, ConstantPool, ConstantTag, ReferenceKind};
pub use flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use member::{Attribute, CodeAttribute, ExceptionTableEntry, FieldInfo, MethodInfo};

use crate::{
    disassembler::InstructionSequence,
    file::{parser::Parser, File},
    Error, Result,
};

/// The class-file magic number.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// A parsed class file.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassFile {
    /// Minor version
    pub minor_version: u16,
    /// Major version, 52 for Java 8
    pub major_version: u16,
    /// The constant pool
    pub constant_pool: ConstantPool,
    /// Class access and property flags
    pub access_flags: ClassAccessFlags,
    /// `Class` index of this class
    pub this_class: u16,
    /// `Class` index of the superclass, 0 only for `java/lang/Object`
    pub super_class: u16,
    /// `Class` indices of the direct superinterfaces
    pub interfaces: Vec<u16>,
    /// Declared fields
    pub fields: Vec<FieldInfo>,
    /// Declared methods
    pub methods: Vec<MethodInfo>,
    /// Class-level attributes
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Loads and parses a class file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be opened, [`Error::Empty`] for an empty
    /// file and any error from [`ClassFile::parse`].
    pub fn from_file(path: &Path) -> Result<ClassFile> {
        let input = File::from_file(path)?;
        Self::load(&input)
    }

    /// Parses a class file from an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for an empty buffer and any error from [`ClassFile::parse`].
    pub fn from_mem(data: Vec<u8>) -> Result<ClassFile> {
        let input = File::from_mem(data)?;
        Self::load(&input)
    }

    fn load(input: &File) -> Result<ClassFile> {
        let class = Self::parse(input.data())?;
        debug!(
            "Loaded class {} (version {}.{}, {} constants, {} fields, {} methods)",
            class.this_class_name().unwrap_or("?"),
            class.major_version,
            class.minor_version,
            class.constant_pool.len(),
            class.fields.len(),
            class.methods.len()
        );

        Ok(class)
    }

    /// Parses a class file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMagic`] if the data does not start with `0xCAFEBABE`,
    /// [`Error::OutOfBounds`] if it ends early, and [`Error::Malformed`] if bytes are left over
    /// or the constant pool is corrupt.
    pub fn parse(data: &[u8]) -> Result<ClassFile> {
        let mut parser = Parser::new(data);

        let magic = parser.next_word()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = parser.next_half_word()?;
        let major_version = parser.next_half_word()?;
        let constant_pool = ConstantPool::read(&mut parser)?;
        let access_flags = ClassAccessFlags::from_bits_retain(parser.next_half_word()?);
        let this_class = parser.next_half_word()?;
        let super_class = parser.next_half_word()?;

        let interface_count = parser.next_half_word()?;
        let interfaces = (0..interface_count)
            .map(|_| parser.next_half_word())
            .collect::<Result<Vec<_>>>()?;

        let field_count = parser.next_half_word()?;
        let fields = (0..field_count)
            .map(|_| FieldInfo::read(&mut parser))
            .collect::<Result<Vec<_>>>()?;

        let method_count = parser.next_half_word()?;
        let methods = (0..method_count)
            .map(|_| MethodInfo::read(&mut parser))
            .collect::<Result<Vec<_>>>()?;

        let attributes = member::read_attributes(&mut parser)?;

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after the class file",
                parser.remaining()
            ));
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Internal name of this class, `com/example/Main` for example.
    ///
    /// # Errors
    ///
    /// Returns an error if `this_class` does not name a `Class` entry.
    pub fn this_class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Internal name of the superclass, or `None` for `java/lang/Object` and modules.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-zero `super_class` does not name a `Class` entry.
    pub fn super_class_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.constant_pool.class_name(self.super_class).map(Some)
    }

    /// Internal names of the direct superinterfaces, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if an interface index does not name a `Class` entry.
    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|index| self.constant_pool.class_name(*index))
            .collect()
    }

    /// The first method named `name`. Overloads share a name; use [`ClassFile::methods_named`]
    /// to see all of them.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| method.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    /// All methods named `name`, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> + 'a {
        self.methods
            .iter()
            .filter(move |method| method.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    /// The first field named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|field| field.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    /// The first class-level attribute named `name`, `SourceFile` for example.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    /// Decodes the body of every method in parallel.
    ///
    /// The result has one entry per method, in declaration order. A method that fails to decode
    /// yields its error without affecting the others; methods without code yield `Ok(None)`.
    #[must_use]
    pub fn decode_methods(&self) -> Vec<Result<Option<InstructionSequence>>> {
        self.methods
            .par_iter()
            .map(|method| {
                let result = method.decode(&self.constant_pool);
                if let Err(error) = &result {
                    warn!(
                        "Failed to decode {}{}: {}",
                        method.name(&self.constant_pool).unwrap_or("?"),
                        method.descriptor(&self.constant_pool).unwrap_or(""),
                        error
                    );
                }
                result
            })
            .collect()
    }
}
