//! Debug utilities for inspecting MPQ archive internals.
//!
//! Plain-text formatters for headers and tables. The default diagnostics
//! observer logs their output, and command-line tools can print it directly.

use crate::tables::{BlockEntry, HashEntry};

/// Format a single hex line for inline display
pub fn hex_string(data: &[u8], max_len: usize) -> String {
    let len = data.len().min(max_len);
    let hex: Vec<String> = data[..len].iter().map(|b| format!("{:02X}", b)).collect();

    if data.len() > max_len {
        format!("{} ... ({} bytes total)", hex.join(" "), data.len())
    } else {
        hex.join(" ")
    }
}

/// Table formatter for displaying structured data
#[derive(Debug)]
pub struct TableFormatter {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl TableFormatter {
    /// Create a new table formatter with headers
    pub fn new(headers: Vec<&str>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(String::from).collect();
        let column_widths = headers.iter().map(|h| h.len()).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.len());
        }
        self.rows.push(row);
    }

    /// Format the table as a string
    pub fn format(&self) -> String {
        let mut output = String::new();

        self.write_separator(&mut output);
        self.write_row(&mut output, &self.headers);
        self.write_separator(&mut output);

        for row in &self.rows {
            self.write_row(&mut output, row);
        }

        if !self.rows.is_empty() {
            self.write_separator(&mut output);
        }

        output
    }

    fn write_separator(&self, output: &mut String) {
        output.push('+');
        for width in &self.column_widths {
            output.push_str(&"-".repeat(width + 2));
            output.push('+');
        }
        output.push('\n');
    }

    fn write_row(&self, output: &mut String, row: &[String]) {
        output.push('|');
        for (cell, width) in row.iter().zip(&self.column_widths) {
            output.push_str(&format!(" {cell:<width$} |"));
        }
        output.push('\n');
    }
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format a bitflag value showing individual flags
pub fn format_flags(value: u32, flag_names: &[(u32, &str)]) -> String {
    let flags: Vec<&str> = flag_names
        .iter()
        .filter(|(flag, _)| value & flag != 0)
        .map(|(_, name)| *name)
        .collect();

    if flags.is_empty() {
        format!("0x{:08X} (none)", value)
    } else {
        format!("0x{:08X} ({})", value, flags.join(" | "))
    }
}

/// Human readable state of a hash entry
pub fn hash_entry_status(entry: &HashEntry) -> &'static str {
    if entry.is_empty() {
        "Empty"
    } else if entry.is_deleted() {
        "Deleted"
    } else {
        "Active"
    }
}

/// Format a hash table for display
pub fn format_hash_table(entries: &[HashEntry]) -> String {
    let mut table = TableFormatter::new(vec![
        "Index",
        "Name1",
        "Name2",
        "Locale",
        "Platform",
        "Block Index",
        "Status",
    ]);

    for (index, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            format!("0x{:08X}", entry.name_1),
            format!("0x{:08X}", entry.name_2),
            format!("0x{:04X}", entry.locale),
            entry.platform.to_string(),
            if entry.is_valid() {
                entry.block_index.to_string()
            } else {
                format!("{:08X}", entry.block_index)
            },
            hash_entry_status(entry).to_string(),
        ]);
    }

    table.format()
}

/// Format a block table for display
pub fn format_block_table(entries: &[BlockEntry]) -> String {
    let mut table = TableFormatter::new(vec![
        "Index",
        "File Pos",
        "Comp Size",
        "File Size",
        "Flags",
    ]);

    for (index, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            format!("0x{:08X}", entry.file_pos),
            entry.compressed_size.to_string(),
            entry.file_size.to_string(),
            format_flags(entry.flags, &BlockEntry::FLAG_NAMES),
        ]);
    }

    table.format()
}
