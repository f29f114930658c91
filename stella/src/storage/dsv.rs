//! Reading and writing relations as delimiter-separated value files.
//!
//! The first record of every file holds the attribute names. Empty fields
//! are null; on export, null values are written as empty fields again.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::model::{AttributeType, Relation, Row, Value};

/// Parse a single field according to the declared attribute type.
fn parse_value(field: &str, attribute_type: AttributeType, attribute: &str) -> Result<Value, Error> {
    if field.is_empty() {
        return Ok(Value::Null);
    }

    let error = || Error::ValueParse {
        value: field.to_string(),
        type_name: attribute_type.to_string(),
        attribute: attribute.to_string(),
    };
    match attribute_type {
        AttributeType::Integer => field.parse().map(Value::Integer).map_err(|_| error()),
        AttributeType::Float => field.parse().map(Value::Float).map_err(|_| error()),
        AttributeType::Boolean => match field {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(error()),
        },
        AttributeType::Text => Ok(Value::Text(field.to_string())),
    }
}

/// Read the rows of `relation` from a delimiter-separated stream.
///
/// Columns not declared by the relation are skipped; declared attributes
/// missing from the file are simply absent from the rows and read as null.
pub fn read_rows<Reader: Read>(reader: Reader, relation: &Relation) -> Result<Vec<Row>, Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (attribute, field) in headers.iter().zip(record.iter()) {
            let Some(attribute_type) = relation.attributes.get(attribute) else {
                continue;
            };
            row.set(attribute, parse_value(field, *attribute_type, attribute)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Write rows as a delimiter-separated stream with a header record, one
/// field per attribute of `relation` in attribute order.
pub fn write_rows<Writer: Write>(
    writer: Writer,
    relation: &Relation,
    rows: &[Row],
) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(relation.attributes.keys())?;
    for row in rows {
        writer.write_record(
            relation
                .attributes
                .keys()
                .map(|attribute| row.value(attribute).to_string()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the rows of `relation` from the file at `path`; see [read_rows].
pub fn read_table(path: &Path, relation: &Relation) -> Result<Vec<Row>, Error> {
    let file = File::open(path).map_err(|error| Error::IoFile {
        error,
        filename: path.to_path_buf(),
    })?;
    read_rows(file, relation)
}

/// Write the rows of `relation` to the file at `path`; see [write_rows].
pub fn write_table(path: &Path, relation: &Relation, rows: &[Row]) -> Result<(), Error> {
    let file = File::create(path).map_err(|error| Error::IoFile {
        error,
        filename: path.to_path_buf(),
    })?;
    write_rows(file, relation, rows)
}
