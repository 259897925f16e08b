use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::bail;
use classscope::{
    classfile::{ConstantPool, MethodInfo},
    disassembler::{FormatOptions, Formatter},
    ClassFile,
};
use log::warn;

use crate::commands::common::{load_class, method_signature};

/// Display options for bytecode listings.
pub struct DisasmOptions {
    pub bytes: bool,
    pub offsets: bool,
    pub raw: bool,
}

pub fn run(path: &Path, method_filter: Option<&str>, opts: DisasmOptions) -> anyhow::Result<()> {
    let class = load_class(path)?;

    let methods: Vec<&MethodInfo> = match method_filter {
        Some(name) => class.methods_named(name).collect(),
        None => class.methods.iter().collect(),
    };
    if let Some(name) = method_filter {
        if methods.is_empty() {
            bail!("no methods named '{name}' found");
        }
    }

    let formatter = Formatter::new(
        FormatOptions::default()
            .with_offsets(opts.offsets)
            .with_bytes(opts.bytes)
            .with_resolve(!opts.raw)
            .with_indent(6),
    );

    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());

    write_class_header(&mut w, &class)?;
    for method in methods {
        write_method(&mut w, &formatter, method, &class.constant_pool)?;
    }
    writeln!(w, "}}")?;

    w.flush()?;
    Ok(())
}

fn write_class_header(w: &mut dyn Write, class: &ClassFile) -> anyhow::Result<()> {
    let flags = class.access_flags.to_string();
    if flags.is_empty() {
        write!(w, "class {}", class.this_class_name()?)?;
    } else {
        write!(w, "{flags} class {}", class.this_class_name()?)?;
    }
    if let Some(super_class) = class.super_class_name()? {
        write!(w, " extends {super_class}")?;
    }
    let interfaces = class.interface_names()?;
    if !interfaces.is_empty() {
        write!(w, " implements {}", interfaces.join(", "))?;
    }
    writeln!(w, " {{")?;
    Ok(())
}

/// Writes one method. Problems inside the method body are reported inline so the listing of
/// the remaining methods can continue.
fn write_method(
    w: &mut dyn Write,
    formatter: &Formatter,
    method: &MethodInfo,
    pool: &ConstantPool,
) -> io::Result<()> {
    let signature = method_signature(method, pool);
    let flags = method.access_flags.to_string();
    if flags.is_empty() {
        writeln!(w, "  {signature};")?;
    } else {
        writeln!(w, "  {flags} {signature};")?;
    }

    let code = match method.code(pool) {
        Ok(Some(code)) => code,
        Ok(None) => {
            writeln!(w)?;
            return Ok(());
        }
        Err(error) => {
            warn!("{signature}: {error}");
            writeln!(w, "    error: {error}\n")?;
            return Ok(());
        }
    };

    writeln!(w, "    Code:")?;
    writeln!(
        w,
        "      stack={}, locals={}, code_length={}",
        code.max_stack,
        code.max_locals,
        code.code.len()
    )?;

    match code.decode() {
        Ok(sequence) => formatter.write_sequence(w, &sequence, &code.code, Some(pool))?,
        Err(error) => {
            warn!("{signature}: {error}");
            writeln!(w, "      error: {error}")?;
        }
    }

    if !code.exception_table.is_empty() {
        writeln!(w, "    Exception table:")?;
        writeln!(w, "       from    to  target type")?;
        for entry in &code.exception_table {
            let catch_type = if entry.catch_type == 0 {
                "any".to_string()
            } else {
                pool.class_name(entry.catch_type)
                    .map_or_else(|_| format!("#{}", entry.catch_type), str::to_string)
            };
            writeln!(
                w,
                "      {:>5} {:>5} {:>7}   {catch_type}",
                entry.start_pc, entry.end_pc, entry.handler_pc
            )?;
        }
    }

    writeln!(w)
}
