use crate::orm::{DataType, Field};

/// Longest `varchar` length the server accepts; anything larger becomes `text`.
const MAX_VARCHAR_SIZE: u32 = 10_485_760;

/// Column type for `field`.
#[must_use]
pub fn data_type_of(field: &Field) -> String {
    match &field.data_type {
        DataType::Bool => "boolean".to_string(),
        DataType::Int | DataType::Uint => {
            let size = effective_size(field.size, &field.data_type);
            if field.auto_increment {
                serial_type(size).to_string()
            } else {
                match size {
                    0..=16 => "smallint",
                    17..=32 => "integer",
                    _ => "bigint",
                }
                .to_string()
            }
        }
        DataType::Float => match (field.precision, field.scale) {
            (0, _) => "decimal".to_string(),
            (p, 0) => format!("numeric({p})"),
            (p, s) => format!("numeric({p}, {s})"),
        },
        DataType::String => {
            if field.size > 0 && field.size <= MAX_VARCHAR_SIZE {
                format!("varchar({})", field.size)
            } else {
                "text".to_string()
            }
        }
        DataType::Time => {
            if field.precision > 0 {
                format!("timestamptz({})", field.precision)
            } else {
                "timestamptz".to_string()
            }
        }
        DataType::Bytes => "bytea".to_string(),
        DataType::Custom(_) => custom_type_of(field),
    }
}

/// Custom types pass through, except that auto-increment promotes them to a serial type.
fn custom_type_of(field: &Field) -> String {
    let sql_type = field.data_type.as_str();
    if field.auto_increment && !sql_type.to_lowercase().contains("serial") {
        let size = effective_size(field.size, &field.gorm_data_type);
        return serial_type(size).to_string();
    }
    sql_type.to_string()
}

/// Unsigned values need one more bit than their declared size; there are no unsigned columns.
fn effective_size(size: u32, logical: &DataType) -> u32 {
    if *logical == DataType::Uint {
        size.saturating_add(1)
    } else {
        size
    }
}

fn serial_type(size: u32) -> &'static str {
    match size {
        0..=16 => "smallserial",
        17..=32 => "serial",
        _ => "bigserial",
    }
}

/// Storage type behind a serial pseudo-type.
#[must_use]
pub fn serial_storage_type(sql_type: &str) -> Option<&'static str> {
    match sql_type {
        "smallserial" => Some("smallint"),
        "serial" => Some("integer"),
        "bigserial" => Some("bigint"),
        _ => None,
    }
}

/// Like [`data_type_of`], but serial types resolve to their storage type, since a column
/// cannot be altered into a pseudo-type.
#[must_use]
pub fn alter_data_type_of(field: &Field) -> String {
    let sql_type = data_type_of(field);
    match serial_storage_type(&sql_type) {
        Some(storage) => storage.to_string(),
        None => sql_type,
    }
}
