use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_class,
    output::{emit, Column, Listing},
};

#[derive(Debug, Serialize)]
struct PoolEntry {
    index: u16,
    tag: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct PoolOutput {
    entries: Vec<PoolEntry>,
    count: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let class = load_class(path)?;
    let pool = &class.constant_pool;

    let entries: Vec<PoolEntry> = pool
        .iter()
        .map(|(index, entry)| PoolEntry {
            index,
            tag: entry.tag().to_string(),
            value: pool
                .render(index)
                .unwrap_or_else(|error| format!("<{error}>")),
        })
        .collect();

    let output = PoolOutput {
        count: entries.len(),
        entries,
    };

    emit(&output, opts, |out| {
        let mut listing = Listing::new(&[
            Column::right("Index"),
            Column::left("Tag"),
            Column::left("Value"),
        ]);
        for entry in &out.entries {
            listing.push_row([
                format!("#{}", entry.index),
                entry.tag.clone(),
                entry.value.clone(),
            ]);
        }
        listing.print();
        println!("\n{} constant(s) listed.", out.count);
    })
}
