use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, BooleanArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::dataset::Dataset;
use super::model::{CellValue, Column, ColumnType, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one record per row (recommended)
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat columns written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv_reader(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json_str(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.num_rows(),
        table.num_columns(),
        path.display()
    );
    Ok(Dataset::from_path(path, table))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one record.
/// Column types are inferred from the text of each column.
pub fn load_csv_reader<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields but found {}",
                headers.len(),
                record.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(Some(value.to_string()));
        }
    }

    let columns = headers
        .iter()
        .zip(raw.iter())
        .map(|(name, cells)| Column::infer(name.clone(), cells))
        .collect();
    Table::new(columns).context("assembling table from CSV")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "anxiety_level": 14, "gender": "female", "heart_rate": 72.5 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; a key missing from a record is a
/// missing value.
pub fn load_json_str(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .iter()
        .map(|name| {
            let cells: Vec<Option<String>> = records
                .iter()
                .map(|rec| rec.get(name).and_then(json_to_text))
                .collect();
            Column::infer(name.clone(), &cells)
        })
        .collect();
    Table::new(columns).context("assembling table from JSON")
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Nested or temporal columns are kept as
/// display text under [`ColumnType::Other`].
pub fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), arrow_column_type(f.data_type()), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(idx);
            let cells = extract_cells(array, &column.dtype)
                .with_context(|| format!("reading column '{}'", column.name))?;
            column.values.extend(cells);
        }
    }

    Table::new(columns).context("assembling table from parquet")
}

// -- Parquet / Arrow helpers --

fn arrow_column_type(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => ColumnType::Integer,
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            ColumnType::Float
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnType::Text,
        DataType::Boolean => ColumnType::Bool,
        other => ColumnType::Other(other.to_string()),
    }
}

/// Convert one Arrow column chunk into cells of the given column type.
fn extract_cells(col: &Arc<dyn Array>, dtype: &ColumnType) -> Result<Vec<CellValue>> {
    let n = col.len();
    let cells = match dtype {
        ColumnType::Integer => {
            let ints = cast(col, &DataType::Int64).context("casting to Int64")?;
            let ints = ints.as_primitive::<Int64Type>();
            (0..n)
                .map(|row| {
                    if ints.is_null(row) {
                        CellValue::Null
                    } else {
                        CellValue::Integer(ints.value(row))
                    }
                })
                .collect()
        }
        ColumnType::Float => {
            let floats = cast(col, &DataType::Float64).context("casting to Float64")?;
            let floats = floats.as_primitive::<Float64Type>();
            (0..n)
                .map(|row| {
                    let v = floats.value(row);
                    if floats.is_null(row) || v.is_nan() {
                        CellValue::Null
                    } else {
                        CellValue::Float(v)
                    }
                })
                .collect()
        }
        ColumnType::Text => {
            let text = cast(col, &DataType::Utf8).context("casting to Utf8")?;
            let text = text.as_string::<i32>();
            (0..n)
                .map(|row| {
                    if text.is_null(row) {
                        CellValue::Null
                    } else {
                        CellValue::Text(text.value(row).to_string())
                    }
                })
                .collect()
        }
        ColumnType::Bool => {
            let bools = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            (0..n)
                .map(|row| {
                    if bools.is_null(row) {
                        CellValue::Null
                    } else {
                        CellValue::Bool(bools.value(row))
                    }
                })
                .collect()
        }
        ColumnType::Other(_) => (0..n)
            .map(|row| {
                if col.is_null(row) {
                    Ok(CellValue::Null)
                } else {
                    Ok(CellValue::Text(array_value_to_string(col, row)?))
                }
            })
            .collect::<Result<Vec<_>, arrow::error::ArrowError>>()
            .context("formatting column values")?,
    };
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_columns_keep_header_order_and_types() {
        let input = "id,name,score\n1,ann,2.5\n2,bob,\n3,,4\n";
        let table = load_csv_reader(input.as_bytes()).unwrap();

        assert_eq!(table.column_names(), vec!["id", "name", "score"]);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.column("id").unwrap().dtype, ColumnType::Integer);
        assert_eq!(table.column("name").unwrap().dtype, ColumnType::Text);
        assert_eq!(table.column("score").unwrap().dtype, ColumnType::Float);
        assert_eq!(table.column("score").unwrap().missing_count(), 1);
        assert_eq!(table.column("name").unwrap().values[2], CellValue::Null);
    }

    #[test]
    fn csv_with_short_row_is_rejected() {
        let input = "a,b\n1,2\n3\n";
        assert!(load_csv_reader(input.as_bytes()).is_err());
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let text = r#"[{"a": 1, "b": "x"}, {"b": "y", "c": true}, {"a": 2.5}]"#;
        let table = load_json_str(text).unwrap();

        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, ColumnType::Float);
        assert_eq!(a.values, vec![CellValue::Float(1.0), CellValue::Null, CellValue::Float(2.5)]);
        assert_eq!(table.column("c").unwrap().dtype, ColumnType::Bool);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(load_json_str(r#"{"a": 1}"#).is_err());
        assert!(load_json_str("[1, 2]").is_err());
    }

    #[test]
    fn unsupported_extension_fails() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn parquet_flat_columns_are_loaded() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("level", DataType::Int32, false),
            Field::new("rate", DataType::Float64, true),
            Field::new("gender", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![Some(0.5), None])),
                Arc::new(StringArray::from(vec![Some("f"), Some("m")])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("rusty-dashboard-{}.parquet", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let dataset = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let table = &dataset.table;
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("level").unwrap().values, vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert_eq!(table.column("rate").unwrap().values[1], CellValue::Null);
        assert_eq!(table.column("gender").unwrap().dtype, ColumnType::Text);
        assert_eq!(dataset.groups.numeric, vec!["level", "rate"]);
    }
}
