use crate::domain::model::{StockResult, VariantGroup};
use crate::utils::error::InventoryError;

pub const NO_DATA: &str = "No data available";
const HEADERS: [&str; 5] = ["Location", "Quantity", "Last update", "Color", "Size"];

/// Plain-text tables, one per variant group.
pub fn render_stock(result: &StockResult) -> String {
    if result.is_empty() {
        return NO_DATA.to_string();
    }

    let mut blocks: Vec<String> = result.iter().map(render_group).collect();
    blocks.push(format!(
        "{} variant(s), total quantity {}",
        result.len(),
        format_quantity(result.total_quantity())
    ));
    blocks.join("\n")
}

pub fn render_error(err: &InventoryError) -> String {
    format!("{}\n  hint: {}", err.user_friendly_message(), err.recovery_suggestion())
}

pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{:.2}", quantity)
    }
}

fn render_group(group: &VariantGroup) -> String {
    let mut lines = vec![
        format!("Variant: {}", group.key),
        format!("Description: {}", group.description.as_deref().unwrap_or("-")),
    ];

    let rows: Vec<[String; 5]> = group
        .records
        .iter()
        .map(|record| {
            [
                record.resource_name.clone(),
                format_quantity(record.quantity),
                record.last_update.to_string(),
                group.parsed.color.clone(),
                group.parsed.size.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    lines.push(format_row(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row(row, &widths));
    }
    if rows.is_empty() {
        lines.push("(no locations)".to_string());
    } else {
        lines.push(format!("Total: {}", format_quantity(group.total_quantity())));
    }

    lines.join("\n") + "\n"
}

fn format_row(cells: &[String], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
