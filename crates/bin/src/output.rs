//! Output formatting helpers for human-readable and JSON output.

use clap::ValueEnum;
use vitrina::{OrderedItem, Payload};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Column width is the max of header and all row values
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Product { product_id } => format!("product {product_id}"),
        Payload::Slide {
            title,
            image_url,
            image_mobile_url,
        } => {
            let image = image_url
                .as_deref()
                .or(image_mobile_url.as_deref())
                .unwrap_or("-");
            format!("{} ({image})", title.as_deref().unwrap_or("untitled"))
        }
    }
}

/// Print items as a table, or as a JSON array.
pub fn print_items(items: &[OrderedItem], format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Human => {
            if items.is_empty() {
                println!("No items.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| {
                    vec![
                        item.order.to_string(),
                        item.id.to_string(),
                        if item.active { "yes" } else { "no" }.to_string(),
                        describe(&item.payload),
                    ]
                })
                .collect();
            print_table(&["ORDER", "ID", "ACTIVE", "CONTENT"], &rows);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(items)?),
    }
    Ok(())
}

/// Print a single item.
pub fn print_item(item: &OrderedItem, format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Human => {
            println!(
                "#{} at position {} ({}): {}",
                item.id,
                item.order,
                if item.active { "active" } else { "hidden" },
                describe(&item.payload)
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(item)?),
    }
    Ok(())
}
