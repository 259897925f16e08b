use std::path::Path;

use classscope::{
    classfile::{Attribute, ConstantPool},
    ClassFile,
};
use log::warn;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{load_class, method_signature},
    output::{emit, Column, Listing},
};

/// Payloads longer than this are cut short in the text listing; JSON always carries them whole.
const PREVIEW_BYTES: usize = 32;

#[derive(Debug, Serialize)]
struct AttrEntry {
    owner: String,
    name: String,
    length: usize,
    bytes: String,
}

#[derive(Debug, Serialize)]
struct AttrsOutput {
    attributes: Vec<AttrEntry>,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let class = load_class(path)?;
    let output = AttrsOutput {
        attributes: collect(&class),
    };

    emit(&output, opts, |out| {
        if out.attributes.is_empty() {
            println!("No attributes found.");
            return;
        }

        let mut start = 0;
        while start < out.attributes.len() {
            let owner = &out.attributes[start].owner;
            let end = out.attributes[start..]
                .iter()
                .position(|entry| &entry.owner != owner)
                .map_or(out.attributes.len(), |len| start + len);

            if start > 0 {
                println!();
            }
            println!("{owner}");
            let mut listing = Listing::new(&[
                Column::left("Attribute"),
                Column::right("Length"),
                Column::left("Bytes"),
            ])
            .nested("  ");
            for entry in &out.attributes[start..end] {
                listing.push_row([
                    entry.name.clone(),
                    entry.length.to_string(),
                    preview(&entry.bytes),
                ]);
            }
            listing.print();

            start = end;
        }
    })
}

/// Walks class, field, method and `Code` attributes in file order.
fn collect(class: &ClassFile) -> Vec<AttrEntry> {
    let pool = &class.constant_pool;
    let mut entries = Vec::new();

    let class_name = class.this_class_name().unwrap_or("?");
    push_all(&mut entries, &format!("class {class_name}"), &class.attributes, pool);

    for field in &class.fields {
        let owner = format!(
            "field {}:{}",
            field.name(pool).unwrap_or("?"),
            field.descriptor(pool).unwrap_or("?")
        );
        push_all(&mut entries, &owner, &field.attributes, pool);
    }

    for method in &class.methods {
        let signature = method_signature(method, pool);
        push_all(&mut entries, &format!("method {signature}"), &method.attributes, pool);

        match method.code(pool) {
            Ok(Some(code)) => {
                push_all(&mut entries, &format!("code {signature}"), &code.attributes, pool);
            }
            Ok(None) => {}
            Err(error) => warn!("{signature}: {error}"),
        }
    }

    entries
}

fn push_all(
    entries: &mut Vec<AttrEntry>,
    owner: &str,
    attributes: &[Attribute],
    pool: &ConstantPool,
) {
    entries.extend(attributes.iter().map(|attribute| AttrEntry {
        owner: owner.to_string(),
        name: attribute
            .name(pool)
            .map_or_else(|_| format!("#{}", attribute.name_index), str::to_string),
        length: attribute.data.len(),
        bytes: hex(&attribute.data),
    }));
}

fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn preview(bytes: &str) -> String {
    // Each byte is two digits plus a separating space.
    let cut = PREVIEW_BYTES * 3 - 1;
    if bytes.len() > cut {
        format!("{} ...", &bytes[..cut])
    } else {
        bytes.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `class Tagged` with one `SourceFile` attribute and a `run()V` method whose `Code` carries
    /// an unnamed (index 0) nested attribute.
    fn tagged_class() -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
        bytes.extend([0x00, 0x08]);
        bytes.extend([0x01, 0x00, 0x06]);
        bytes.extend(b"Tagged");
        bytes.extend([0x07, 0x00, 0x01]);
        bytes.extend([0x01, 0x00, 0x0A]);
        bytes.extend(b"SourceFile");
        bytes.extend([0x01, 0x00, 0x0B]);
        bytes.extend(b"Tagged.java");
        bytes.extend([0x01, 0x00, 0x03]);
        bytes.extend(b"run");
        bytes.extend([0x01, 0x00, 0x03]);
        bytes.extend(b"()V");
        bytes.extend([0x01, 0x00, 0x04]);
        bytes.extend(b"Code");
        // public super, this #2, no super, no interfaces, no fields
        bytes.extend([0x00, 0x21, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        // one method: run()V with a Code attribute holding `return`
        bytes.extend([0x00, 0x01, 0x00, 0x01, 0x00, 0x05, 0x00, 0x06, 0x00, 0x01]);
        bytes.extend([0x00, 0x07, 0x00, 0x00, 0x00, 0x15]);
        bytes.extend([0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xB1]);
        bytes.extend([0x00, 0x00]);
        bytes.extend([0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xBE, 0xEF]);
        // class attributes: SourceFile -> #4
        bytes.extend([0x00, 0x01, 0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x04]);
        bytes
    }

    #[test]
    fn collects_every_level() {
        let class = ClassFile::parse(&tagged_class()).unwrap();
        let entries = collect(&class);

        let summary: Vec<(&str, &str, usize, &str)> = entries
            .iter()
            .map(|e| (&e.owner[..], &e.name[..], e.length, &e.bytes[..]))
            .collect();
        assert_eq!(
            summary,
            [
                ("class Tagged", "SourceFile", 2, "00 04"),
                (
                    "method run()V",
                    "Code",
                    21,
                    "00 00 00 01 00 00 00 01 b1 00 00 00 01 00 00 00 00 00 02 be ef"
                ),
                ("code run()V", "#0", 2, "be ef"),
            ]
        );
    }

    #[test]
    fn long_payloads_are_cut() {
        let short = hex(&[0x01, 0x02]);
        assert_eq!(preview(&short), "01 02");

        let long = hex(&[0xAA; 40]);
        let shown = preview(&long);
        assert!(shown.ends_with(" ..."));
        assert_eq!(shown.matches("aa").count(), PREVIEW_BYTES);
    }
}
