use crate::core::variant;
use crate::domain::model::{
    LocationPayload, LocationRecord, RawStockResponse, StockResult, UpdateDate, VariantGroup,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Groups the raw `/stock` payload per variant key, in server order.
pub fn normalize(raw: RawStockResponse) -> StockResult {
    let groups: Vec<VariantGroup> = raw
        .into_entries()
        .into_iter()
        .map(|(key, payloads)| build_group(key, payloads))
        .collect();

    tracing::debug!("Normalized {} variant groups", groups.len());
    StockResult { groups }
}

fn build_group(key: String, payloads: Vec<LocationPayload>) -> VariantGroup {
    let parsed = variant::parse(&key);
    let description = payloads.first().and_then(|p| p.description.clone());

    if payloads.is_empty() {
        tracing::debug!("Variant '{}' arrived without location records", key);
    }

    let records = payloads.into_iter().map(into_record).collect();

    VariantGroup {
        key,
        parsed,
        description,
        records,
    }
}

fn into_record(payload: LocationPayload) -> LocationRecord {
    let (last_update, last_update_raw) = match payload.last_update_date {
        None => (UpdateDate::Unknown, None),
        Some(Value::String(raw)) => (parse_update_date(&raw), Some(raw)),
        Some(other) => (update_date_from_value(&other), Some(other.to_string())),
    };

    LocationRecord {
        resource_name: payload.resource_name,
        quantity: payload.quantity,
        last_update,
        last_update_raw,
        description: payload.description.unwrap_or_default(),
    }
}

/// Numbers are epoch milliseconds; every other non-string shape is unknown.
fn update_date_from_value(value: &Value) -> UpdateDate {
    let millis = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64));

    match millis.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(dt) => UpdateDate::Known(dt.date_naive()),
        None => {
            tracing::warn!("Unrecognized update timestamp {}", value);
            UpdateDate::Unknown
        }
    }
}

/// Never fails: anything unrecognized becomes `UpdateDate::Unknown`.
pub fn parse_update_date(raw: &str) -> UpdateDate {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return UpdateDate::Known(dt.date_naive());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return UpdateDate::Known(dt.date());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return UpdateDate::Known(date);
    }

    tracing::warn!("Unrecognized update timestamp '{}'", value);
    UpdateDate::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(location: &str, quantity: f64, date: &str, description: &str) -> LocationPayload {
        LocationPayload {
            resource_name: location.to_string(),
            quantity,
            last_update_date: Some(Value::String(date.to_string())),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn test_normalize_empty_response() {
        let result = normalize(RawStockResponse::new());
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_normalize_single_variant() {
        let mut raw = RawStockResponse::new();
        raw.push("X#RED#M", vec![payload("Store1", 5.0, "2024-01-01", "Shirt")]);

        let result = normalize(raw);

        assert_eq!(result.len(), 1);
        let group = &result.groups[0];
        assert_eq!(group.key, "X#RED#M");
        assert_eq!(group.parsed.color, "RED");
        assert_eq!(group.parsed.size, "M");
        assert_eq!(group.description.as_deref(), Some("Shirt"));
        assert_eq!(group.records.len(), 1);
        assert_eq!(group.records[0].quantity, 5.0);
        assert_eq!(
            group.records[0].last_update,
            UpdateDate::Known(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_normalize_preserves_record_count_and_order() {
        let mut raw = RawStockResponse::new();
        raw.push(
            "B#BLACK#L",
            vec![
                payload("Centro", 3.0, "2024-03-01", "Jacket"),
                payload("Norte", 0.0, "2024-03-02", "Jacket (old)"),
                payload("Sur", 7.0, "2024-03-03", "Jacket"),
            ],
        );
        raw.push("A#WHITE#S", vec![payload("Centro", 1.0, "2024-03-01", "Tee")]);

        let result = normalize(raw);

        let keys: Vec<&str> = result.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B#BLACK#L", "A#WHITE#S"]);

        let jacket = &result.groups[0];
        let locations: Vec<&str> = jacket.records.iter().map(|r| r.resource_name.as_str()).collect();
        assert_eq!(locations, vec!["Centro", "Norte", "Sur"]);
        assert_eq!(jacket.description.as_deref(), Some("Jacket"));
        assert_eq!(jacket.total_quantity(), 10.0);
        assert_eq!(result.total_quantity(), 11.0);
    }

    #[test]
    fn test_normalize_empty_group_has_no_description() {
        let mut raw = RawStockResponse::new();
        raw.push("ABC", Vec::new());

        let result = normalize(raw);

        let group = &result.groups[0];
        assert!(group.description.is_none());
        assert!(group.records.is_empty());
        assert_eq!(group.parsed.color, "N/A");
    }

    #[test]
    fn test_unparsable_date_degrades_to_unknown() {
        let mut raw = RawStockResponse::new();
        raw.push(
            "X#RED#M",
            vec![
                payload("Store1", 1.0, "yesterday", "Shirt"),
                LocationPayload {
                    resource_name: "Store2".to_string(),
                    quantity: 2.0,
                    last_update_date: None,
                    description: None,
                },
            ],
        );

        let result = normalize(raw);
        let records = &result.groups[0].records;

        assert_eq!(records[0].last_update, UpdateDate::Unknown);
        assert_eq!(records[0].last_update_raw.as_deref(), Some("yesterday"));
        assert_eq!(records[0].last_update.to_string(), "unknown date");
        assert_eq!(records[1].last_update, UpdateDate::Unknown);
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn test_non_string_timestamps_do_not_fail_the_response() {
        let body = r#"{"X#RED#M": [
            {"ResourceName": "Store1", "Quantity": 5, "LastUpdateDate": 1704067200000, "Description": "Shirt"},
            {"ResourceName": "Store2", "Quantity": 3, "LastUpdateDate": {}, "Description": "Shirt"},
            {"ResourceName": "Store3", "Quantity": 1, "LastUpdateDate": false, "Description": "Shirt"}
        ]}"#;
        let raw: RawStockResponse = serde_json::from_str(body).unwrap();

        let result = normalize(raw);

        let records = &result.groups[0].records;
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].last_update,
            UpdateDate::Known(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(records[0].last_update_raw.as_deref(), Some("1704067200000"));
        assert_eq!(records[1].last_update, UpdateDate::Unknown);
        assert_eq!(records[1].last_update_raw.as_deref(), Some("{}"));
        assert_eq!(records[2].last_update, UpdateDate::Unknown);
        assert_eq!(records[2].quantity, 1.0);
    }

    #[test]
    fn test_parse_update_date_formats() {
        let expected = UpdateDate::Known(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(parse_update_date("2024-05-17T10:30:00Z"), expected);
        assert_eq!(parse_update_date("2024-05-17T10:30:00-03:00"), expected);
        assert_eq!(parse_update_date("2024-05-17T10:30:00.123"), expected);
        assert_eq!(parse_update_date("2024-05-17 10:30:00"), expected);
        assert_eq!(parse_update_date("2024-05-17"), expected);
        assert_eq!(parse_update_date(""), UpdateDate::Unknown);
        assert_eq!(parse_update_date("17/05/2024"), UpdateDate::Unknown);
    }
}
