use std::path::Path;

use anyhow::Context;
use classscope::{
    classfile::{ConstantPool, MethodInfo},
    ClassFile,
};

/// Load and parse a class file from disk.
pub fn load_class(path: &Path) -> anyhow::Result<ClassFile> {
    ClassFile::from_file(path)
        .with_context(|| format!("failed to load class file: {}", path.display()))
}

/// `name descriptor` of a method, with `?` for names the pool cannot resolve.
pub fn method_signature(method: &MethodInfo, pool: &ConstantPool) -> String {
    format!(
        "{}{}",
        method.name(pool).unwrap_or("?"),
        method.descriptor(pool).unwrap_or("?")
    )
}

/// Render the major version as the Java release it belongs to, `52 (Java 8)` for example.
pub fn java_version(major: u16, minor: u16) -> String {
    match major {
        45 => format!("{major}.{minor} (Java 1.1)"),
        46..=48 => format!("{major}.{minor} (Java 1.{})", major - 44),
        49..=u16::MAX => format!("{major}.{minor} (Java {})", major - 44),
        _ => format!("{major}.{minor}"),
    }
}
