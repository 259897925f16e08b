use std::fmt::Display;

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Emits `report` as pretty JSON under `--json`, otherwise hands it to `render_text`.
pub fn emit<T: Serialize>(
    report: &T,
    opts: &GlobalOptions,
    render_text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        render_text(report);
    }
    Ok(())
}

/// A column of a [`Listing`]: header text plus alignment.
#[derive(Clone, Copy)]
pub struct Column {
    header: &'static str,
    alignment: CellAlignment,
}

impl Column {
    pub const fn left(header: &'static str) -> Self {
        Self {
            header,
            alignment: CellAlignment::Left,
        }
    }

    /// Numbers (indices, sizes, offsets) read better right-aligned.
    pub const fn right(header: &'static str) -> Self {
        Self {
            header,
            alignment: CellAlignment::Right,
        }
    }
}

/// Borderless table for pool dumps, member lists and similar listings.
///
/// Columns are separated by a single space and sized to their widest cell.
pub struct Listing {
    table: Table,
    prefix: &'static str,
}

impl Listing {
    pub fn new(columns: &[Column]) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(columns.iter().map(|c| c.header));

        let last = columns.len().saturating_sub(1);
        for (index, column) in columns.iter().enumerate() {
            if let Some(target) = table.column_mut(index) {
                target.set_cell_alignment(column.alignment);
                target.set_padding((0, u16::from(index < last)));
            }
        }

        Self { table, prefix: "" }
    }

    /// Prefixes every printed line with `prefix`.
    pub fn nested(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.table
            .add_row(cells.into_iter().map(|cell| cell.to_string()));
    }

    pub fn render(&self) -> String {
        self.table
            .lines()
            .map(|line| format!("{}{}\n", self.prefix, line.trim_end()))
            .collect()
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}
