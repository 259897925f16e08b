//! Disassembly formatting.
//!
//! Renders decoded instructions as text lines of the form `<mnemonic> <operand...>`. Operands are
//! space-separated in the order they are encoded. Constant-pool indices print as `#index`; when a
//! [`ConstantLookup`] is supplied, the resolved symbol is appended as a trailing `// comment`.
//! Branch operands print as the relative delta stored in the bytecode.
//!
//! # Examples
//!
//! ```rust
//! use classscope::disassembler::{decode_code, ConstantLookup, FormatOptions, Formatter};
//!
//! struct Pool;
//! impl ConstantLookup for Pool {
//!     fn resolve(&self, index: u16) -> Option<String> {
//!         (index == 2).then(|| "java/lang/Object.\"<init>\":()V".to_string())
//!     }
//! }
//!
//! let code = [0x2A, 0xB7, 0x00, 0x02, 0xB1];
//! let sequence = decode_code(&code)?;
//! let formatter = Formatter::new(FormatOptions::default());
//!
//! assert_eq!(
//!     formatter.format(&sequence[1], Some(&Pool)),
//!     "invokespecial #2 // java/lang/Object.\"<init>\":()V"
//! );
//! # Ok::<(), classscope::Error>(())
//! ```

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use crate::disassembler::{
    instruction::{ArrayType, Instruction, Operand, Wide},
    sequence::InstructionSequence,
};

/// Read-only access to rendered constant-pool entries.
pub trait ConstantLookup {
    /// Resolves the entry at `index` to its symbolic text, or `None` if it does not exist.
    fn resolve(&self, index: u16) -> Option<String>;
}

/// Output options for [`Formatter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prefix each listing line with the instruction offset
    pub offsets: bool,
    /// Print the raw instruction bytes above each listing line
    pub bytes: bool,
    /// Annotate constant-pool operands with their resolved symbol
    pub resolve: bool,
    /// Number of spaces in front of every listing line
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            offsets: true,
            bytes: false,
            resolve: true,
            indent: 0,
        }
    }
}

impl FormatOptions {
    /// Sets whether listing lines carry the instruction offset.
    #[must_use]
    pub fn with_offsets(mut self, offsets: bool) -> Self {
        self.offsets = offsets;
        self
    }

    /// Sets whether raw instruction bytes are printed.
    #[must_use]
    pub fn with_bytes(mut self, bytes: bool) -> Self {
        self.bytes = bytes;
        self
    }

    /// Sets whether constant-pool operands are resolved.
    #[must_use]
    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    /// Sets the indentation of listing lines.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Renders instructions and instruction sequences as text.
///
/// Formatting never mutates the instruction or the constant pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct Formatter {
    opts: FormatOptions,
}

impl Formatter {
    /// Creates a formatter with the given options.
    #[must_use]
    pub fn new(opts: FormatOptions) -> Self {
        Formatter { opts }
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &FormatOptions {
        &self.opts
    }

    /// Renders one instruction as `<mnemonic> <operands>`, annotated with the resolved
    /// constant-pool entry when `pool` is given and resolution is enabled.
    #[must_use]
    pub fn format(&self, instruction: &Instruction, pool: Option<&dyn ConstantLookup>) -> String {
        let mut line = render_plain(instruction);

        if !self.opts.resolve {
            return line;
        }

        let symbol = pool.and_then(|pool| {
            instruction
                .operand
                .constant_pool_index()
                .and_then(|index| pool.resolve(index))
        });
        if let Some(symbol) = symbol {
            let _ = write!(line, " // {symbol}");
        }

        line
    }

    /// Writes one listing line for `instruction`.
    ///
    /// `code` is the method's code array; it is only consulted for the raw bytes and may be empty
    /// when [`FormatOptions::bytes`] is off.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer.
    pub fn write_instruction(
        &self,
        w: &mut dyn Write,
        instruction: &Instruction,
        code: &[u8],
        pool: Option<&dyn ConstantLookup>,
    ) -> io::Result<()> {
        let indent = " ".repeat(self.opts.indent);

        if self.opts.bytes {
            if let Some(bytes) = code.get(instruction.offset..instruction.next_offset()) {
                write!(w, "{indent}/* ")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    write!(w, "{byte:02X}")?;
                }
                writeln!(w, " */")?;
            }
        }

        if self.opts.offsets {
            write!(w, "{indent}{:>5}: ", instruction.offset)?;
        } else {
            write!(w, "{indent}")?;
        }

        writeln!(w, "{}", self.format(instruction, pool))
    }

    /// Writes a listing of every instruction in `sequence`, one line each.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer.
    pub fn write_sequence(
        &self,
        w: &mut dyn Write,
        sequence: &InstructionSequence,
        code: &[u8],
        pool: Option<&dyn ConstantLookup>,
    ) -> io::Result<()> {
        for instruction in sequence {
            self.write_instruction(w, instruction, code, pool)?;
        }
        Ok(())
    }
}

/// Renders an instruction without offsets or constant-pool annotations.
pub(crate) fn render_plain(instruction: &Instruction) -> String {
    let operands = render_operands(&instruction.operand);
    if operands.is_empty() {
        instruction.mnemonic.to_string()
    } else {
        format!("{} {}", instruction.mnemonic, operands)
    }
}

fn render_operands(operand: &Operand) -> String {
    match operand {
        Operand::None => String::new(),
        Operand::Byte(value) => value.to_string(),
        Operand::Short(value) => value.to_string(),
        Operand::Local(index) => index.to_string(),
        Operand::ConstantPool(index) | Operand::InvokeDynamic(index) => format!("#{index}"),
        Operand::Iinc { index, increment } => format!("{index} {increment}"),
        Operand::Branch(delta) => delta.to_string(),
        Operand::NewArray(code) => match ArrayType::from_code(*code) {
            Some(ty) => ty.to_string(),
            None => code.to_string(),
        },
        Operand::InvokeInterface { index, count } => format!("#{index} {count}"),
        Operand::MultiANewArray { index, dimensions } => format!("#{index} {dimensions}"),
        Operand::TableSwitch(table) => {
            let entries: Vec<String> = table
                .entries()
                .map(|(key, offset)| format!("{key}:{offset}"))
                .collect();
            format!(
                "default:{} low:{} high:{} {{{}}}",
                table.default,
                table.low,
                table.high,
                entries.join(", ")
            )
        }
        Operand::LookupSwitch(switch) => {
            let pairs: Vec<String> = switch
                .pairs
                .iter()
                .map(|(key, offset)| format!("{key}:{offset}"))
                .collect();
            format!(
                "default:{} npairs:{} {{{}}}",
                switch.default,
                switch.npairs(),
                pairs.join(", ")
            )
        }
        Operand::Wide(wide) => match wide {
            Wide::Local { index, .. } => format!("{} {index}", wide.mnemonic()),
            Wide::Iinc { index, increment } => format!("{} {index} {increment}", wide.mnemonic()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        disassembler::{decode_code, lookup, LookupSwitch, TableSwitch},
        test::bytecode::{lookup_switch, table_switch},
    };

    struct MapPool(HashMap<u16, &'static str>);

    impl ConstantLookup for MapPool {
        fn resolve(&self, index: u16) -> Option<String> {
            self.0.get(&index).map(|s| (*s).to_string())
        }
    }

    fn pool() -> MapPool {
        MapPool(HashMap::from([
            (3, "java/lang/String"),
            (7, "java/util/List.size:()I"),
            (9, "#0:run:()Ljava/lang/Runnable;"),
        ]))
    }

    #[test]
    fn plain_operands() {
        let render = |opcode: u8, operand: Operand| {
            let size = usize::from(lookup(opcode).operand_len) + 1;
            Instruction::new(0, size, opcode, operand).to_string()
        };

        assert_eq!(render(0x00, Operand::None), "nop");
        assert_eq!(render(0x10, Operand::Byte(-5)), "bipush -5");
        assert_eq!(render(0x11, Operand::Short(300)), "sipush 300");
        assert_eq!(render(0x15, Operand::Local(4)), "iload 4");
        assert_eq!(render(0x12, Operand::ConstantPool(3)), "ldc #3");
        let iinc = Operand::Iinc {
            index: 1,
            increment: -1,
        };
        assert_eq!(render(0x84, iinc), "iinc 1 -1");
        assert_eq!(render(0xA7, Operand::Branch(-3)), "goto -3");
        assert_eq!(render(0xBC, Operand::NewArray(10)), "newarray int");
        assert_eq!(render(0xBC, Operand::NewArray(42)), "newarray 42");
        let call = Operand::InvokeInterface { index: 7, count: 2 };
        assert_eq!(render(0xB9, call), "invokeinterface #7 2");
        assert_eq!(render(0xBA, Operand::InvokeDynamic(9)), "invokedynamic #9");
        let multi = Operand::MultiANewArray {
            index: 3,
            dimensions: 2,
        };
        assert_eq!(render(0xC5, multi), "multianewarray #3 2");
    }

    #[test]
    fn switch_tables() {
        let table = Instruction::new(
            0,
            28,
            0xAA,
            Operand::TableSwitch(TableSwitch {
                default: 99,
                low: 0,
                high: 2,
                offsets: vec![10, 20, 30],
            }),
        );
        assert_eq!(
            table.to_string(),
            "tableswitch default:99 low:0 high:2 {0:10, 1:20, 2:30}"
        );

        let lookup = Instruction::new(
            0,
            28,
            0xAB,
            Operand::LookupSwitch(LookupSwitch {
                default: -1,
                pairs: vec![(5, 100), (9, 200)],
            }),
        );
        assert_eq!(
            lookup.to_string(),
            "lookupswitch default:-1 npairs:2 {5:100, 9:200}"
        );
    }

    #[test]
    fn wide_forms() {
        let code = [0xC4, 0x84, 0x00, 0x04, 0xFF, 0xF9, 0xC4, 0x15, 0x01, 0x2C];
        let sequence = decode_code(&code).unwrap();
        assert_eq!(sequence[0].to_string(), "wide iinc 4 -7");
        assert_eq!(sequence[1].to_string(), "wide iload 300");
    }

    #[test]
    fn constant_pool_annotations() {
        let pool = pool();
        let formatter = Formatter::default();

        let ldc = Instruction::new(0, 2, 0x12, Operand::ConstantPool(3));
        assert_eq!(formatter.format(&ldc, Some(&pool)), "ldc #3 // java/lang/String");
        assert_eq!(formatter.format(&ldc, None), "ldc #3");

        let call = Instruction::new(0, 5, 0xB9, Operand::InvokeInterface { index: 7, count: 1 });
        assert_eq!(
            formatter.format(&call, Some(&pool)),
            "invokeinterface #7 1 // java/util/List.size:()I"
        );

        let indy = decode_code(&[0xBA, 0x00, 0x09, 0x00, 0x00]).unwrap();
        assert_eq!(
            formatter.format(&indy[0], Some(&pool)),
            "invokedynamic #9 // #0:run:()Ljava/lang/Runnable;"
        );

        let dimensions = Operand::MultiANewArray {
            index: 3,
            dimensions: 2,
        };
        let multi = Instruction::new(0, 4, 0xC5, dimensions);
        assert_eq!(
            formatter.format(&multi, Some(&pool)),
            "multianewarray #3 2 // java/lang/String"
        );

        let missing = Instruction::new(0, 3, 0xBB, Operand::ConstantPool(40));
        assert_eq!(formatter.format(&missing, Some(&pool)), "new #40");

        let raw = Formatter::new(FormatOptions::default().with_resolve(false));
        assert_eq!(raw.format(&ldc, Some(&pool)), "ldc #3");
    }

    #[test]
    fn listing_with_offsets_and_bytes() {
        let mut code = vec![0x1B];
        code.extend(table_switch(1, 16, 0, &[16]));
        code.extend(lookup_switch(code.len(), 8, &[]));
        code.push(0xB1);

        let sequence = decode_code(&code).unwrap();
        let formatter = Formatter::new(FormatOptions::default().with_indent(2));

        let mut out = Vec::new();
        formatter
            .write_sequence(&mut out, &sequence, &code, None)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "      0: iload_1");
        assert_eq!(lines[1], "      1: tableswitch default:16 low:0 high:0 {0:16}");
        assert!(lines[2].ends_with("lookupswitch default:8 npairs:0 {}"));
        assert!(lines[3].ends_with(": return"));

        let formatter = Formatter::new(
            FormatOptions::default()
                .with_offsets(false)
                .with_bytes(true),
        );
        let mut out = Vec::new();
        formatter
            .write_instruction(&mut out, &sequence[0], &code, None)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/* 1B */\niload_1\n");
    }
}
