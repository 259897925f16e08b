//! Fields, methods and their attributes.
//!
//! Attributes are kept as raw `(name_index, data)` pairs. The `Code` attribute of a method is
//! parsed on demand by [`MethodInfo::code`], which is also where the bytecode decoder is
//! connected to the class-file container.

use log::debug;

use crate::{
    classfile::{
        constant_pool::ConstantPool,
        flags::{FieldAccessFlags, MethodAccessFlags},
    },
    disassembler::{decode_code, InstructionSequence},
    file::parser::Parser,
    Result,
};

/// A raw attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Index of the `Utf8` attribute name
    pub name_index: u16,
    /// Attribute payload, without the name and length header
    pub data: Vec<u8>,
}

impl Attribute {
    /// Reads one attribute.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the declared length runs past the data.
    pub fn read(parser: &mut Parser) -> Result<Attribute> {
        let name_index = parser.next_half_word()?;
        let length = parser.next_word()? as usize;
        let data = parser.read_bytes(length)?.to_vec();

        Ok(Attribute { name_index, data })
    }

    /// Resolves the attribute name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name_index` does not name a `Utf8` entry.
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.utf8(self.name_index)
    }
}

/// Reads `attributes_count` followed by that many attributes.
pub(crate) fn read_attributes(parser: &mut Parser) -> Result<Vec<Attribute>> {
    let count = parser.next_half_word()?;
    (0..count).map(|_| Attribute::read(parser)).collect()
}

/// One row of a `Code` attribute's exception table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    /// First covered code offset
    pub start_pc: u16,
    /// Code offset after the last covered instruction
    pub end_pc: u16,
    /// Offset of the handler
    pub handler_pc: u16,
    /// `Class` index of the caught type, 0 catches everything
    pub catch_type: u16,
}

/// A parsed `Code` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// The bytecode
    pub code: Vec<u8>,
    /// Exception handlers in declaration order
    pub exception_table: Vec<ExceptionTableEntry>,
    /// Nested attributes such as `LineNumberTable`
    pub attributes: Vec<Attribute>,
}

impl CodeAttribute {
    /// Parses the payload of a `Code` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the payload is short, and
    /// [`crate::Error::Malformed`] if bytes are left over.
    pub fn parse(data: &[u8]) -> Result<CodeAttribute> {
        let mut parser = Parser::new(data);

        let max_stack = parser.next_half_word()?;
        let max_locals = parser.next_half_word()?;
        let code_length = parser.next_word()? as usize;
        let code = parser.read_bytes(code_length)?.to_vec();

        let handlers = parser.next_half_word()?;
        let mut exception_table = Vec::with_capacity(usize::from(handlers));
        for _ in 0..handlers {
            exception_table.push(ExceptionTableEntry {
                start_pc: parser.next_half_word()?,
                end_pc: parser.next_half_word()?,
                handler_pc: parser.next_half_word()?,
                catch_type: parser.next_half_word()?,
            });
        }

        let attributes = read_attributes(&mut parser)?;
        if parser.has_more_data() {
            return Err(malformed_error!(
                "Code attribute has {} trailing bytes",
                parser.remaining()
            ));
        }

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    /// Decodes the bytecode into an instruction sequence.
    ///
    /// # Errors
    ///
    /// Returns the first decode error in the code array.
    pub fn decode(&self) -> Result<InstructionSequence> {
        decode_code(&self.code)
    }
}

/// A field of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    /// Access and property flags
    pub access_flags: FieldAccessFlags,
    /// Index of the `Utf8` field name
    pub name_index: u16,
    /// Index of the `Utf8` field descriptor
    pub descriptor_index: u16,
    /// Raw field attributes
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    /// Reads one `field_info` structure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the data ends early.
    pub fn read(parser: &mut Parser) -> Result<FieldInfo> {
        Ok(FieldInfo {
            access_flags: FieldAccessFlags::from_bits_retain(parser.next_half_word()?),
            name_index: parser.next_half_word()?,
            descriptor_index: parser.next_half_word()?,
            attributes: read_attributes(parser)?,
        })
    }

    /// The field name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name_index` does not name a `Utf8` entry.
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.utf8(self.name_index)
    }

    /// The field descriptor, `I` or `Ljava/lang/String;` for example.
    ///
    /// # Errors
    ///
    /// Returns an error if `descriptor_index` does not name a `Utf8` entry.
    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.utf8(self.descriptor_index)
    }
}

/// A method of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    /// Access and property flags
    pub access_flags: MethodAccessFlags,
    /// Index of the `Utf8` method name
    pub name_index: u16,
    /// Index of the `Utf8` method descriptor
    pub descriptor_index: u16,
    /// Raw method attributes, `Code` among them
    pub attributes: Vec<Attribute>,
}

impl MethodInfo {
    /// Reads one `method_info` structure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the data ends early.
    pub fn read(parser: &mut Parser) -> Result<MethodInfo> {
        Ok(MethodInfo {
            access_flags: MethodAccessFlags::from_bits_retain(parser.next_half_word()?),
            name_index: parser.next_half_word()?,
            descriptor_index: parser.next_half_word()?,
            attributes: read_attributes(parser)?,
        })
    }

    /// The method name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name_index` does not name a `Utf8` entry.
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.utf8(self.name_index)
    }

    /// The method descriptor, `(I)V` for example.
    ///
    /// # Errors
    ///
    /// Returns an error if `descriptor_index` does not name a `Utf8` entry.
    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.utf8(self.descriptor_index)
    }

    /// Finds and parses the `Code` attribute. Abstract and native methods have none.
    ///
    /// # Errors
    ///
    /// Returns an error if an attribute name cannot be resolved or the `Code` payload is
    /// malformed.
    pub fn code(&self, pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        for attribute in &self.attributes {
            if attribute.name(pool)? == "Code" {
                return CodeAttribute::parse(&attribute.data).map(Some);
            }
        }

        Ok(None)
    }

    /// Decodes the method body, or returns `None` if the method has no code.
    ///
    /// # Errors
    ///
    /// Returns any error from [`MethodInfo::code`] and the first decode error in the bytecode.
    pub fn decode(&self, pool: &ConstantPool) -> Result<Option<InstructionSequence>> {
        let Some(code) = self.code(pool)? else {
            return Ok(None);
        };

        let sequence = code.decode()?;
        debug!(
            "Decoded {}{}: {} instructions, {} bytes",
            self.name(pool).unwrap_or("?"),
            self.descriptor(pool).unwrap_or(""),
            sequence.len(),
            sequence.byte_len()
        );

        Ok(Some(sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::classfile::{code_attribute, PoolBuilder},
        Error,
    };

    #[test]
    fn parse_code_attribute() {
        let data = code_attribute(2, 1, &[0x03, 0xAC], &[(0, 1, 1, 0)]);
        let code = CodeAttribute::parse(&data).unwrap();

        assert_eq!(code.max_stack, 2);
        assert_eq!(code.max_locals, 1);
        assert_eq!(code.code, [0x03, 0xAC]);
        assert_eq!(
            code.exception_table,
            [ExceptionTableEntry {
                start_pc: 0,
                end_pc: 1,
                handler_pc: 1,
                catch_type: 0
            }]
        );
        assert!(code.attributes.is_empty());
        assert_eq!(code.decode().unwrap().len(), 2);
    }

    #[test]
    fn code_attribute_trailing_bytes() {
        let mut data = code_attribute(1, 1, &[0xB1], &[]);
        data.push(0x00);
        assert!(matches!(
            CodeAttribute::parse(&data),
            Err(Error::Malformed { .. })
        ));

        let data = code_attribute(1, 1, &[0xB1], &[]);
        assert!(matches!(
            CodeAttribute::parse(&data[..data.len() - 1]),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn attribute_names_resolve() {
        let mut pool = PoolBuilder::new();
        let name = pool.utf8("LineNumberTable");
        let class = pool.class("Foo");
        let pool = pool.build();

        let table = Attribute {
            name_index: name,
            data: vec![0x00, 0x00],
        };
        assert_eq!(table.name(&pool).unwrap(), "LineNumberTable");

        let misplaced = Attribute {
            name_index: class,
            data: Vec::new(),
        };
        assert!(misplaced.name(&pool).is_err());

        let mut bytes = vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xAB, 0xCD];
        let parsed = Attribute::read(&mut Parser::new(&bytes)).unwrap();
        assert_eq!(parsed.data, [0xAB, 0xCD]);
        bytes[5] = 0x03;
        assert!(matches!(
            Attribute::read(&mut Parser::new(&bytes)),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn method_code_lookup() {
        let mut pool = PoolBuilder::new();
        let name = pool.utf8("run");
        let descriptor = pool.utf8("()V");
        let code_name = pool.utf8("Code");
        let other = pool.utf8("Deprecated");
        let pool = pool.build();

        let method = MethodInfo {
            access_flags: MethodAccessFlags::PUBLIC,
            name_index: name,
            descriptor_index: descriptor,
            attributes: vec![
                Attribute {
                    name_index: other,
                    data: Vec::new(),
                },
                Attribute {
                    name_index: code_name,
                    data: code_attribute(0, 1, &[0xB1], &[]),
                },
            ],
        };

        assert_eq!(method.name(&pool).unwrap(), "run");
        assert_eq!(method.descriptor(&pool).unwrap(), "()V");
        let sequence = method.decode(&pool).unwrap().unwrap();
        assert_eq!(sequence[0].mnemonic, "return");

        let abstract_method = MethodInfo {
            access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
            attributes: Vec::new(),
            ..method
        };
        assert!(abstract_method.decode(&pool).unwrap().is_none());
    }

    #[test]
    fn method_decode_error_propagates() {
        let mut pool = PoolBuilder::new();
        let name = pool.utf8("broken");
        let code_name = pool.utf8("Code");
        let pool = pool.build();

        let method = MethodInfo {
            access_flags: MethodAccessFlags::STATIC,
            name_index: name,
            descriptor_index: name,
            attributes: vec![Attribute {
                name_index: code_name,
                data: code_attribute(1, 0, &[0x11, 0x00], &[]),
            }],
        };

        assert!(matches!(
            method.decode(&pool),
            Err(Error::Truncated {
                opcode: 0x11,
                offset: 0
            })
        ));
    }
}
