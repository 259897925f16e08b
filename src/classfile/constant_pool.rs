//! The constant pool of a class file.
//!
//! The pool is a 1-based table of `constant_pool_count - 1` slots. Index 0 is never valid, and
//! `Long` and `Double` entries take up two slots, the second of which is unusable. Both kinds of
//! hole are kept as empty slots so that indices from the bytecode map directly into the table.
//!
//! Every entry can render itself as text via [`ConstantPool::render`], which follows references
//! through the pool:
//!
//! | Entry | Rendering |
//! |-------|-----------|
//! | `Class` | internal name, `java/lang/String` |
//! | `Fieldref`, `Methodref`, `InterfaceMethodref` | `Owner.name:descriptor` |
//! | `NameAndType` | `name:descriptor` |
//! | `String` | quoted, with escapes |
//! | `Integer`, `Float`, `Long`, `Double` | the literal value |
//! | `MethodHandle` | `kind Owner.name:descriptor` |
//! | `Dynamic`, `InvokeDynamic` | `#bootstrap:name:descriptor` |

use std::fmt::Write as _;

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{
    classfile::mutf8, disassembler::ConstantLookup, file::parser::Parser, Error, Result,
};

/// The tag byte of a constant-pool entry.
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, Display, EnumIter, EnumCount, IntoStaticStr,
)]
#[repr(u8)]
pub enum ConstantTag {
    /// `CONSTANT_Utf8`
    Utf8 = 1,
    /// `CONSTANT_Integer`
    Integer = 3,
    /// `CONSTANT_Float`
    Float = 4,
    /// `CONSTANT_Long`
    Long = 5,
    /// `CONSTANT_Double`
    Double = 6,
    /// `CONSTANT_Class`
    Class = 7,
    /// `CONSTANT_String`
    String = 8,
    /// `CONSTANT_Fieldref`
    Fieldref = 9,
    /// `CONSTANT_Methodref`
    Methodref = 10,
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethodref = 11,
    /// `CONSTANT_NameAndType`
    NameAndType = 12,
    /// `CONSTANT_MethodHandle`
    MethodHandle = 15,
    /// `CONSTANT_MethodType`
    MethodType = 16,
    /// `CONSTANT_Dynamic`
    Dynamic = 17,
    /// `CONSTANT_InvokeDynamic`
    InvokeDynamic = 18,
    /// `CONSTANT_Module`
    Module = 19,
    /// `CONSTANT_Package`
    Package = 20,
}

impl ConstantTag {
    /// Maps a tag byte to its tag, if it names one.
    #[must_use]
    pub fn from_u8(tag: u8) -> Option<ConstantTag> {
        ConstantTag::iter().find(|t| *t as u8 == tag)
    }

    /// Returns `true` for `Long` and `Double`, which occupy two pool slots.
    #[must_use]
    pub fn is_wide(self) -> bool {
        matches!(self, ConstantTag::Long | ConstantTag::Double)
    }
}

/// The kind byte of a `CONSTANT_MethodHandle`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "camelCase")]
#[repr(u8)]
pub enum ReferenceKind {
    /// `REF_getField`
    GetField = 1,
    /// `REF_getStatic`
    GetStatic = 2,
    /// `REF_putField`
    PutField = 3,
    /// `REF_putStatic`
    PutStatic = 4,
    /// `REF_invokeVirtual`
    InvokeVirtual = 5,
    /// `REF_invokeStatic`
    InvokeStatic = 6,
    /// `REF_invokeSpecial`
    InvokeSpecial = 7,
    /// `REF_newInvokeSpecial`
    NewInvokeSpecial = 8,
    /// `REF_invokeInterface`
    InvokeInterface = 9,
}

impl ReferenceKind {
    /// Maps a reference kind byte to its kind, if it names one.
    #[must_use]
    pub fn from_u8(kind: u8) -> Option<ReferenceKind> {
        ReferenceKind::iter().find(|k| *k as u8 == kind)
    }
}

/// A single constant-pool entry.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantEntry {
    /// Modified UTF-8 string
    Utf8(String),
    /// 32-bit integer literal
    Integer(i32),
    /// 32-bit float literal
    Float(f32),
    /// 64-bit integer literal
    Long(i64),
    /// 64-bit float literal
    Double(f64),
    /// Class or interface reference
    Class {
        /// Index of the `Utf8` internal name
        name_index: u16,
    },
    /// String literal
    String {
        /// Index of the `Utf8` value
        string_index: u16,
    },
    /// Field reference
    Fieldref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Class method reference
    Methodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Interface method reference
    InterfaceMethodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Index of the `Utf8` name
        name_index: u16,
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// Kind of reference, 1 to 9
        reference_kind: u8,
        /// Index of the referenced field or method
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Index of the `Utf8` method descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Module
    Module {
        /// Index of the `Utf8` module name
        name_index: u16,
    },
    /// Package
    Package {
        /// Index of the `Utf8` package name
        name_index: u16,
    },
}

impl ConstantEntry {
    /// Reads one entry, tag byte included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for an unknown tag, [`Error::InvalidMutf8`] for a bad `Utf8`
    /// payload and [`Error::OutOfBounds`] if the data ends early.
    pub fn read(parser: &mut Parser) -> Result<ConstantEntry> {
        let position = parser.pos();
        let tag_byte = parser.next_byte()?;
        let Some(tag) = ConstantTag::from_u8(tag_byte) else {
            return Err(malformed_error!(
                "Unknown constant pool tag {} at offset {}",
                tag_byte,
                position
            ));
        };

        let entry = match tag {
            ConstantTag::Utf8 => {
                let length = parser.next_half_word()?;
                let bytes = parser.read_bytes(usize::from(length))?;
                ConstantEntry::Utf8(mutf8::decode(bytes)?)
            }
            ConstantTag::Integer => ConstantEntry::Integer(parser.read_be::<i32>()?),
            ConstantTag::Float => ConstantEntry::Float(parser.read_be::<f32>()?),
            ConstantTag::Long => ConstantEntry::Long(parser.read_be::<i64>()?),
            ConstantTag::Double => ConstantEntry::Double(parser.read_be::<f64>()?),
            ConstantTag::Class => ConstantEntry::Class {
                name_index: parser.next_half_word()?,
            },
            ConstantTag::String => ConstantEntry::String {
                string_index: parser.next_half_word()?,
            },
            ConstantTag::Fieldref => ConstantEntry::Fieldref {
                class_index: parser.next_half_word()?,
                name_and_type_index: parser.next_half_word()?,
            },
            ConstantTag::Methodref => ConstantEntry::Methodref {
                class_index: parser.next_half_word()?,
                name_and_type_index: parser.next_half_word()?,
            },
            ConstantTag::InterfaceMethodref => ConstantEntry::InterfaceMethodref {
                class_index: parser.next_half_word()?,
                name_and_type_index: parser.next_half_word()?,
            },
            ConstantTag::NameAndType => ConstantEntry::NameAndType {
                name_index: parser.next_half_word()?,
                descriptor_index: parser.next_half_word()?,
            },
            ConstantTag::MethodHandle => ConstantEntry::MethodHandle {
                reference_kind: parser.next_byte()?,
                reference_index: parser.next_half_word()?,
            },
            ConstantTag::MethodType => ConstantEntry::MethodType {
                descriptor_index: parser.next_half_word()?,
            },
            ConstantTag::Dynamic => ConstantEntry::Dynamic {
                bootstrap_method_attr_index: parser.next_half_word()?,
                name_and_type_index: parser.next_half_word()?,
            },
            ConstantTag::InvokeDynamic => ConstantEntry::InvokeDynamic {
                bootstrap_method_attr_index: parser.next_half_word()?,
                name_and_type_index: parser.next_half_word()?,
            },
            ConstantTag::Module => ConstantEntry::Module {
                name_index: parser.next_half_word()?,
            },
            ConstantTag::Package => ConstantEntry::Package {
                name_index: parser.next_half_word()?,
            },
        };

        Ok(entry)
    }

    /// The tag of this entry.
    #[must_use]
    pub fn tag(&self) -> ConstantTag {
        match self {
            ConstantEntry::Utf8(_) => ConstantTag::Utf8,
            ConstantEntry::Integer(_) => ConstantTag::Integer,
            ConstantEntry::Float(_) => ConstantTag::Float,
            ConstantEntry::Long(_) => ConstantTag::Long,
            ConstantEntry::Double(_) => ConstantTag::Double,
            ConstantEntry::Class { .. } => ConstantTag::Class,
            ConstantEntry::String { .. } => ConstantTag::String,
            ConstantEntry::Fieldref { .. } => ConstantTag::Fieldref,
            ConstantEntry::Methodref { .. } => ConstantTag::Methodref,
            ConstantEntry::InterfaceMethodref { .. } => ConstantTag::InterfaceMethodref,
            ConstantEntry::NameAndType { .. } => ConstantTag::NameAndType,
            ConstantEntry::MethodHandle { .. } => ConstantTag::MethodHandle,
            ConstantEntry::MethodType { .. } => ConstantTag::MethodType,
            ConstantEntry::Dynamic { .. } => ConstantTag::Dynamic,
            ConstantEntry::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            ConstantEntry::Module { .. } => ConstantTag::Module,
            ConstantEntry::Package { .. } => ConstantTag::Package,
        }
    }
}

/// The parsed constant pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantPool {
    /// Slot 0 and the shadow slot after each `Long`/`Double` are `None`
    entries: Vec<Option<ConstantEntry>>,
}

impl ConstantPool {
    /// Reads `constant_pool_count` followed by the entries.
    ///
    /// # Errors
    ///
    /// Returns any error from [`ConstantEntry::read`], or [`Error::Malformed`] if the final entry
    /// is a `Long` or `Double` without room for its second slot.
    pub fn read(parser: &mut Parser) -> Result<ConstantPool> {
        let count = usize::from(parser.next_half_word()?);

        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(None);
        while entries.len() < count {
            let entry = ConstantEntry::read(parser)?;
            let wide = entry.tag().is_wide();
            entries.push(Some(entry));
            if wide {
                if entries.len() >= count {
                    return Err(malformed_error!(
                        "Eight-byte constant at index {} overflows the pool of {} slots",
                        entries.len() - 1,
                        count
                    ));
                }
                entries.push(None);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Builds a pool from explicit slots; slot 0 must be `None`.
    #[must_use]
    pub fn from_entries(entries: Vec<Option<ConstantEntry>>) -> ConstantPool {
        ConstantPool { entries }
    }

    /// `constant_pool_count`, one more than the highest usable index.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Number of actual entries, excluding the unusable slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Returns `true` if the pool holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(index, entry)` for every usable slot.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| Some((u16::try_from(index).ok()?, entry.as_ref()?)))
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] for index 0, an index past the end, or the shadow
    /// slot of an eight-byte constant.
    pub fn get(&self, index: u16) -> Result<&ConstantEntry> {
        self.entries
            .get(usize::from(index))
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidConstantIndex(index))
    }

    /// Returns the string stored in the `Utf8` entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] or [`Error::UnexpectedConstant`].
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantEntry::Utf8(value) => Ok(value),
            other => Err(unexpected(index, "Utf8", other)),
        }
    }

    /// Returns the internal name of the `Class` entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] or [`Error::UnexpectedConstant`].
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantEntry::Class { name_index } => self.utf8(*name_index),
            other => Err(unexpected(index, "Class", other)),
        }
    }

    /// Returns name and descriptor of the `NameAndType` entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] or [`Error::UnexpectedConstant`].
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            ConstantEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(unexpected(index, "NameAndType", other)),
        }
    }

    /// Renders the entry at `index` as text, resolving references through the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] or [`Error::UnexpectedConstant`] if the entry or
    /// anything it refers to is missing or of the wrong kind.
    pub fn render(&self, index: u16) -> Result<String> {
        let text = match self.get(index)? {
            ConstantEntry::Utf8(value) => value.clone(),
            ConstantEntry::Integer(value) => value.to_string(),
            ConstantEntry::Float(value) => format!("{value}f"),
            ConstantEntry::Long(value) => format!("{value}l"),
            ConstantEntry::Double(value) => format!("{value}d"),
            ConstantEntry::Class { name_index } => self.utf8(*name_index)?.to_string(),
            ConstantEntry::String { string_index } => quote(self.utf8(*string_index)?),
            ConstantEntry::Fieldref { .. }
            | ConstantEntry::Methodref { .. }
            | ConstantEntry::InterfaceMethodref { .. } => self.member_ref(index)?,
            ConstantEntry::NameAndType { .. } => {
                let (name, descriptor) = self.name_and_type(index)?;
                format!("{name}:{descriptor}")
            }
            ConstantEntry::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                let target = self.member_ref(*reference_index)?;
                match ReferenceKind::from_u8(*reference_kind) {
                    Some(kind) => format!("{kind} {target}"),
                    None => format!("{reference_kind} {target}"),
                }
            }
            ConstantEntry::MethodType { descriptor_index } => {
                self.utf8(*descriptor_index)?.to_string()
            }
            ConstantEntry::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
            | ConstantEntry::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                format!("#{bootstrap_method_attr_index}:{name}:{descriptor}")
            }
            ConstantEntry::Module { name_index } | ConstantEntry::Package { name_index } => {
                self.utf8(*name_index)?.to_string()
            }
        };

        Ok(text)
    }

    /// Renders a field or method reference as `owner.name:descriptor`.
    fn member_ref(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            ConstantEntry::Fieldref {
                class_index,
                name_and_type_index,
            }
            | ConstantEntry::Methodref {
                class_index,
                name_and_type_index,
            }
            | ConstantEntry::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok(format!("{owner}.{name}:{descriptor}"))
            }
            other => Err(unexpected(index, "Fieldref or Methodref", other)),
        }
    }
}

impl ConstantLookup for ConstantPool {
    fn resolve(&self, index: u16) -> Option<String> {
        self.render(index).ok()
    }
}

fn unexpected(index: u16, expected: &'static str, found: &ConstantEntry) -> Error {
    Error::UnexpectedConstant {
        index,
        expected,
        found: found.tag().into(),
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
