/// Schema holding the tables loaded straight from the source files.
pub const RAW_SCHEMA: &str = "raw";

/// A table in the `raw` schema and the CSV file it is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub table: String,
    pub url: String,
}

impl Dataset {
    pub fn new(table: &str, url: &str) -> Dataset {
        Dataset {
            table: table.to_string(),
            url: url.to_string(),
        }
    }

    /// Schema qualified name, e.g. `raw.hosts`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", RAW_SCHEMA, self.table)
    }
}
