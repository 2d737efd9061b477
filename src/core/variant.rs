use crate::domain::model::ParsedVariant;

pub const KEY_SEPARATOR: char = '#';
pub const MISSING_ATTRIBUTE: &str = "N/A";

/// Splits a `<baseCode>#<color>#<size>` key. Total over all inputs: absent or
/// empty color/size fields become `"N/A"`, fields past the size are ignored.
pub fn parse(key: &str) -> ParsedVariant {
    let mut fields = key.split(KEY_SEPARATOR);
    let base_code = fields.next().unwrap_or_default().to_string();
    let color = attribute(fields.next());
    let size = attribute(fields.next());

    ParsedVariant {
        base_code,
        color,
        size,
    }
}

fn attribute(field: Option<&str>) -> String {
    match field {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => MISSING_ATTRIBUTE.to_string(),
    }
}
