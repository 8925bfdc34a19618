use csv_async::StringRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Column name -> field position, shared by every row decoded from one header.
pub type HeaderIndex = Arc<HashMap<String, usize>>;

/// One decoded source row, addressed by column name.
#[derive(Debug, Clone)]
pub struct RawRow {
    index: HeaderIndex,
    values: StringRecord,
}

impl RawRow {
    pub fn new(index: HeaderIndex, values: StringRecord) -> Self {
        Self { index, values }
    }

    /// Builds the shared index for a header record. The first of duplicated names wins.
    pub fn index_headers(headers: &StringRecord) -> HeaderIndex {
        let mut index = HashMap::with_capacity(headers.len());
        for (position, name) in headers.iter().enumerate() {
            index.entry(name.to_string()).or_insert(position);
        }
        Arc::new(index)
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut headers = StringRecord::new();
        let mut values = StringRecord::new();
        for (name, value) in pairs {
            headers.push_field(&name.into());
            values.push_field(value.as_ref());
        }
        Self::new(Self::index_headers(&headers), values)
    }

    /// Value of a column, or None when the column is missing, the row is short, or the
    /// field is empty.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .and_then(|&position| self.values.get(position))
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_treats_empty_and_missing_alike() {
        let row = RawRow::from_pairs([("Owner Name", "Acme LLC"), ("Deeded Acres", "")]);
        assert_eq!(row.value("Owner Name"), Some("Acme LLC"));
        assert_eq!(row.value("Deeded Acres"), None);
        assert_eq!(row.value("Date Sold"), None);
    }

    #[test]
    fn test_short_row_has_no_trailing_values() {
        let headers = StringRecord::from(vec!["a", "b", "c"]);
        let row = RawRow::new(RawRow::index_headers(&headers), StringRecord::from(vec!["1"]));
        assert_eq!(row.value("a"), Some("1"));
        assert_eq!(row.value("b"), None);
        assert_eq!(row.value("c"), None);
    }
}
