use std::fmt::Display;

use csv::StringRecord;

use crate::error::DownloadError;

/// Cell contents treated as missing when reading a CSV file.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    /// Postgres column type used when the table is created.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Int => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_type())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Text(Option<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Int(v) => v.is_none(),
            Value::Float(v) => v.is_none(),
            Value::Bool(v) => v.is_none(),
            Value::Text(v) => v.is_none(),
        }
    }
}

/// A CSV file held fully in memory, with one inferred type per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Parse comma delimited text.  The first line holds the column names,
    /// blank lines are skipped and short rows are padded with nulls.
    pub fn from_csv(text: &str) -> Result<Table, DownloadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());
        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(DownloadError::Parse(
                "No columns to parse from file".to_string(),
            ));
        }
        let names = column_names(&headers);
        let width = names.len();

        let mut cells: Vec<Vec<Option<String>>> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(DownloadError::Parse(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }
            let mut row: Vec<Option<String>> = record.iter().map(missing_as_none).collect();
            row.resize(width, None);
            cells.push(row);
        }

        let columns: Vec<Column> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column {
                name,
                kind: infer_kind(cells.iter().map(|row| &row[i])),
            })
            .collect();
        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(columns.iter())
                    .map(|(cell, column)| to_value(cell, column.kind))
                    .collect()
            })
            .collect();

        Ok(Table { columns, rows })
    }

    /// Number of data rows, the header excluded.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Blank names become `Unnamed: i`, repeated names get a `.1`, `.2`, ... suffix.
fn column_names(headers: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut n = 0;
        while names.contains(&name) {
            n += 1;
            name = format!("{}.{}", base, n);
        }
        names.push(name);
    }
    names
}

fn missing_as_none(cell: &str) -> Option<String> {
    if NA_VALUES.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Optional sign followed by digits, whatever the magnitude.
fn is_int_literal(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a Option<String>>) -> ColumnType {
    let mut rows = 0;
    let mut missing = 0;
    let (mut all_int, mut all_float, mut all_bool) = (true, true, true);
    let mut overflow = false;
    for cell in cells {
        rows += 1;
        match cell {
            None => missing += 1,
            Some(s) => {
                let int = parse_int(s);
                overflow |= int.is_none() && is_int_literal(s);
                all_int &= int.is_some();
                all_float &= parse_float(s).is_some();
                all_bool &= parse_bool(s).is_some();
            }
        }
    }
    if rows == 0 {
        // header only, nothing to infer from
        return ColumnType::Text;
    }
    if missing == rows {
        return ColumnType::Float;
    }
    if overflow {
        // keep the digits exact rather than round through a double
        return ColumnType::Text;
    }
    match (all_int, all_float, all_bool) {
        (true, _, _) if missing == 0 => ColumnType::Int,
        (_, true, _) => ColumnType::Float,
        (_, _, true) if missing == 0 => ColumnType::Bool,
        _ => ColumnType::Text,
    }
}

fn to_value(cell: Option<String>, kind: ColumnType) -> Value {
    match kind {
        ColumnType::Int => Value::Int(cell.as_deref().and_then(parse_int)),
        ColumnType::Float => Value::Float(cell.as_deref().and_then(parse_float)),
        ColumnType::Bool => Value::Bool(cell.as_deref().and_then(parse_bool)),
        ColumnType::Text => Value::Text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(table: &Table) -> Vec<ColumnType> {
        table.columns.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn read_hosts_like_file() -> Result<(), DownloadError> {
        let text = "id,name,is_superhost,created_at,updated_at\n\
                    2164,Lulita,f,2013-03-31 18:01:50,2013-03-31 18:01:50\n\
                    2176,Tanya,t,2013-04-01 13:21:48,2022-03-08 06:39:44\n";
        let table = Table::from_csv(text)?;
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_names(),
            vec!["id", "name", "is_superhost", "created_at", "updated_at"]
        );
        assert_eq!(
            kinds(&table),
            vec![
                ColumnType::Int,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text
            ]
        );
        assert_eq!(table.rows[1][0], Value::Int(Some(2176)));
        assert_eq!(table.rows[0][1], Value::Text(Some("Lulita".to_string())));
        Ok(())
    }

    #[test]
    fn infer_types() -> Result<(), DownloadError> {
        let text = "a,b,c,d,e,f\n\
                    1,1.5,true,x,,1\n\
                    2,2,FALSE,3,,NA\n";
        let table = Table::from_csv(text)?;
        assert_eq!(
            kinds(&table),
            vec![
                ColumnType::Int,
                ColumnType::Float,
                ColumnType::Bool,
                ColumnType::Text,
                ColumnType::Float,
                ColumnType::Float,
            ]
        );
        assert_eq!(table.rows[1][2], Value::Bool(Some(false)));
        assert_eq!(table.rows[0][4], Value::Float(None));
        assert_eq!(table.rows[0][5], Value::Float(Some(1.0)));
        assert!(table.rows[1][5].is_null());
        Ok(())
    }

    #[test]
    fn int_overflow_is_text() -> Result<(), DownloadError> {
        let table = Table::from_csv("id,v,w\n1,9999999999999999999,-9223372036854775808\n2,5,1\n")?;
        assert_eq!(
            kinds(&table),
            vec![ColumnType::Int, ColumnType::Text, ColumnType::Int]
        );
        assert_eq!(
            table.rows[0][1],
            Value::Text(Some("9999999999999999999".to_string()))
        );
        assert_eq!(table.rows[0][2], Value::Int(Some(i64::MIN)));
        Ok(())
    }

    #[test]
    fn bool_with_gaps_is_text() -> Result<(), DownloadError> {
        let table = Table::from_csv("flag\ntrue\n\nfalse\nnull\n")?;
        assert_eq!(kinds(&table), vec![ColumnType::Text]);
        assert_eq!(table.len(), 3);
        Ok(())
    }

    #[test]
    fn quoted_fields() -> Result<(), DownloadError> {
        let text = "listing_id,comments\n1,\"Great place, \"\"really\"\"\nwould stay again\"\n";
        let table = Table::from_csv(text)?;
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0][1],
            Value::Text(Some(
                "Great place, \"really\"\nwould stay again".to_string()
            ))
        );
        Ok(())
    }

    #[test]
    fn header_names() -> Result<(), DownloadError> {
        let table = Table::from_csv("a,,a,a.1,a\n1,2,3,4,5\n")?;
        assert_eq!(
            table.column_names(),
            vec!["a", "Unnamed: 1", "a.1", "a.1.1", "a.2"]
        );
        Ok(())
    }

    #[test]
    fn short_rows_are_padded() -> Result<(), DownloadError> {
        let table = Table::from_csv("a,b,c\n1,2\n3,4,5\n")?;
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], Value::Float(None));
        assert_eq!(kinds(&table)[2], ColumnType::Float);
        Ok(())
    }

    #[test]
    fn long_rows_fail() {
        let res = Table::from_csv("a,b\n1,2\n1,2,3\n");
        match res {
            Err(DownloadError::Parse(msg)) => {
                assert_eq!(msg, "Expected 2 fields in line 3, saw 3")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            Table::from_csv(""),
            Err(DownloadError::Parse(_))
        ));
    }

    #[test]
    fn header_only() -> Result<(), DownloadError> {
        let table = Table::from_csv("id,name\n")?;
        assert!(table.is_empty());
        assert_eq!(kinds(&table), vec![ColumnType::Text, ColumnType::Text]);
        Ok(())
    }

    #[test]
    fn sql_types() {
        assert_eq!(ColumnType::Int.sql_type(), "BIGINT");
        assert_eq!(ColumnType::Float.to_string(), "DOUBLE PRECISION");
    }
}
