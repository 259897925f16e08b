//! Access flags of classes, fields and methods.
//!
//! `Display` prints the set flags as lower-case names separated by spaces, in the order Java
//! source modifiers are conventionally written (`public static final`, ...). Flags without a
//! source keyword (`super`, `synthetic`, `bridge`, ...) follow the keywords.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Class access and property flags
    pub struct ClassAccessFlags: u16 {
        /// Declared public; may be accessed from outside its package
        const PUBLIC = 0x0001;
        /// Declared final; no subclasses allowed
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by `invokespecial`
        const SUPER = 0x0020;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class
        const ENUM = 0x4000;
        /// Is a module, not a class or interface
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Field access and property flags
    pub struct FieldAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final; never directly assigned after construction
        const FINAL = 0x0010;
        /// Declared volatile; cannot be cached
        const VOLATILE = 0x0040;
        /// Declared transient; not written or read by a persistent object manager
        const TRANSIENT = 0x0080;
        /// Declared synthetic
        const SYNTHETIC = 0x1000;
        /// Declared as an element of an enum class
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Method access and property flags
    pub struct MethodAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final; must not be overridden
        const FINAL = 0x0010;
        /// Declared synchronized; invocation is wrapped by a monitor use
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler
        const BRIDGE = 0x0040;
        /// Declared with a variable number of arguments
        const VARARGS = 0x0080;
        /// Declared native
        const NATIVE = 0x0100;
        /// Declared abstract; no implementation is provided
        const ABSTRACT = 0x0400;
        /// Declared strictfp
        const STRICT = 0x0800;
        /// Declared synthetic
        const SYNTHETIC = 0x1000;
    }
}

const CLASS_NAMES: &[(u16, &str)] = &[
    (0x0001, "public"),
    (0x0400, "abstract"),
    (0x0010, "final"),
    (0x0200, "interface"),
    (0x0020, "super"),
    (0x1000, "synthetic"),
    (0x2000, "annotation"),
    (0x4000, "enum"),
    (0x8000, "module"),
];

const FIELD_NAMES: &[(u16, &str)] = &[
    (0x0001, "public"),
    (0x0004, "protected"),
    (0x0002, "private"),
    (0x0008, "static"),
    (0x0010, "final"),
    (0x0080, "transient"),
    (0x0040, "volatile"),
    (0x1000, "synthetic"),
    (0x4000, "enum"),
];

const METHOD_NAMES: &[(u16, &str)] = &[
    (0x0001, "public"),
    (0x0004, "protected"),
    (0x0002, "private"),
    (0x0400, "abstract"),
    (0x0008, "static"),
    (0x0010, "final"),
    (0x0020, "synchronized"),
    (0x0100, "native"),
    (0x0800, "strictfp"),
    (0x0040, "bridge"),
    (0x0080, "varargs"),
    (0x1000, "synthetic"),
];

fn names(bits: u16, table: &'static [(u16, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(flag, _)| bits & flag != 0)
        .map(|(_, name)| *name)
        .collect()
}

macro_rules! impl_flag_names {
    ($ty:ty, $table:expr) => {
        impl $ty {
            /// Names of the set flags in modifier order.
            #[must_use]
            pub fn names(&self) -> Vec<&'static str> {
                names(self.bits(), $table)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.names().join(" "))
            }
        }
    };
}

impl_flag_names!(ClassAccessFlags, CLASS_NAMES);
impl_flag_names!(FieldAccessFlags, FIELD_NAMES);
impl_flag_names!(MethodAccessFlags, METHOD_NAMES);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_flags_display() {
        let flags = ClassAccessFlags::from_bits_truncate(0x0421);
        assert_eq!(flags.to_string(), "public abstract super");

        let empty = ClassAccessFlags::empty();
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn method_flags_order() {
        let flags =
            MethodAccessFlags::STATIC | MethodAccessFlags::PUBLIC | MethodAccessFlags::FINAL;
        assert_eq!(flags.names(), ["public", "static", "final"]);

        let flags = MethodAccessFlags::from_bits_truncate(0x1041);
        assert_eq!(flags.to_string(), "public bridge synthetic");
    }

    #[test]
    fn field_flags_truncate_unknown() {
        let flags = FieldAccessFlags::from_bits_truncate(0x801A);
        assert_eq!(
            flags,
            FieldAccessFlags::PRIVATE | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL
        );
        assert_eq!(flags.to_string(), "private static final");
    }
}
