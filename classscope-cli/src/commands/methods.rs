use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_class,
    output::{emit, Column, Listing},
};

#[derive(Debug, Serialize)]
struct MethodEntry {
    access: String,
    name: String,
    descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_stack: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_locals: Option<u16>,
}

#[derive(Debug, Serialize)]
struct MethodsOutput {
    methods: Vec<MethodEntry>,
    count: usize,
}

pub fn run(path: &Path, name_filter: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let class = load_class(path)?;
    let pool = &class.constant_pool;

    let mut methods = Vec::new();
    for method in &class.methods {
        let name = method.name(pool)?;
        if let Some(filter) = name_filter {
            if !name.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }

        let code = method.code(pool)?;
        methods.push(MethodEntry {
            access: method.access_flags.to_string(),
            name: name.to_string(),
            descriptor: method.descriptor(pool)?.to_string(),
            code_length: code.as_ref().map(|code| code.code.len()),
            max_stack: code.as_ref().map(|code| code.max_stack),
            max_locals: code.as_ref().map(|code| code.max_locals),
        });
    }

    let output = MethodsOutput {
        count: methods.len(),
        methods,
    };

    emit(&output, opts, |out| {
        let mut listing = Listing::new(&[
            Column::left("Access"),
            Column::left("Method"),
            Column::left("Descriptor"),
            Column::right("Code"),
            Column::right("Stack"),
            Column::right("Locals"),
        ]);
        let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        for entry in &out.methods {
            listing.push_row([
                entry.access.clone(),
                entry.name.clone(),
                entry.descriptor.clone(),
                or_dash(entry.code_length.map(|len| len.to_string())),
                or_dash(entry.max_stack.map(|n| n.to_string())),
                or_dash(entry.max_locals.map(|n| n.to_string())),
            ]);
        }
        listing.print();
        println!("\n{} method(s) listed.", out.count);
    })
}
