use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{java_version, load_class},
    output::{emit, Column, Listing},
};

#[derive(Debug, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub version: String,
    pub access_flags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    pub constant_count: usize,
    pub field_count: usize,
    pub method_count: usize,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub access: String,
    pub name: String,
    pub descriptor: String,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let class = load_class(path)?;
    let pool = &class.constant_pool;

    let fields = class
        .fields
        .iter()
        .map(|field| {
            Ok(FieldSummary {
                access: field.access_flags.to_string(),
                name: field.name(pool)?.to_string(),
                descriptor: field.descriptor(pool)?.to_string(),
            })
        })
        .collect::<classscope::Result<Vec<_>>>()?;

    let info = ClassInfo {
        name: class.this_class_name()?.to_string(),
        version: java_version(class.major_version, class.minor_version),
        access_flags: class.access_flags.to_string(),
        super_class: class.super_class_name()?.map(str::to_string),
        interfaces: class
            .interface_names()?
            .into_iter()
            .map(str::to_string)
            .collect(),
        constant_count: pool.len(),
        field_count: class.fields.len(),
        method_count: class.methods.len(),
        fields,
    };

    emit(&info, opts, |info| {
        println!("Class:       {}", info.name);
        println!("Version:     {}", info.version);
        println!("Flags:       {}", info.access_flags);
        if let Some(super_class) = &info.super_class {
            println!("Extends:     {super_class}");
        }
        if !info.interfaces.is_empty() {
            println!("Implements:  {}", info.interfaces.join(", "));
        }
        println!("Constants:   {}", info.constant_count);
        println!("Fields:      {}", info.field_count);
        println!("Methods:     {}", info.method_count);

        if !info.fields.is_empty() {
            println!("\nFields:");
            let mut listing = Listing::new(&[
                Column::left("Access"),
                Column::left("Name"),
                Column::left("Descriptor"),
            ])
            .nested("  ");
            for field in &info.fields {
                listing.push_row([&field.access, &field.name, &field.descriptor]);
            }
            listing.print();
        }
    })
}
