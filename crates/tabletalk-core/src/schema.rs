//! Live table schema types
//!
//! The browser shell imports a table into the embedded database and reports
//! its schema here; the resolver uses the column names for role inference.

use serde::{Deserialize, Serialize};

/// A column in a live table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Engine-reported type name (e.g. "VARCHAR", "DOUBLE", "TIMESTAMP")
    pub data_type: String,
}

impl ColumnInfo {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Schema of a live table as reported by the query engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Ordered columns
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Create a new table schema
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// One-line rendering used in prompts, e.g. `orders (id, amount, order_time)`
    pub fn summary(&self) -> String {
        let cols: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        format!("{} ({})", self.name, cols.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_operations() {
        let schema = TableSchema::new(
            "orders",
            vec![
                ColumnInfo::new("id", "BIGINT"),
                ColumnInfo::new("amount", "DOUBLE"),
            ],
        );

        assert_eq!(schema.column_names(), vec!["id", "amount"]);
        assert!(schema.find_column("id").is_some());
        assert!(schema.find_column("nonexistent").is_none());
        assert_eq!(schema.summary(), "orders (id, amount)");
    }
}
