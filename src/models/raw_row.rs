/// One parsed input line keyed by header name
///
/// Values are untyped strings; only the normalizer turns them into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    index: usize,
    fields: Vec<(String, String)>,
}

impl RawRow {
    /// Create a row from `(header, value)` pairs in column order
    ///
    /// `index` is the 1-based position of the row among data rows.
    pub fn new<K, V>(index: usize, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            index,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Value for a header; the first column wins when a header repeats
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, header: &str) -> bool {
        self.fields.iter().any(|(h, _)| h == header)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
