use csv::StringRecord;

/// A CSV record, an ordered sequence of text fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    fields: StringRecord,
}

impl Record {
    pub(crate) fn new(fields: StringRecord) -> Record {
        Record {
            fields,
        }
    }

    /// All fields of this record
    pub fn fields(&self) -> &StringRecord {
        &self.fields
    }

    /// Field at `index`, if present
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of the field lengths in bytes, without delimiters or quoting.
    pub fn byte_size(&self) -> usize {
        self.fields.as_slice().len()
    }

    /// The sort key. Records reach the sort only through
    /// [RecordReader](crate::record_reader::RecordReader), which rejects records without the
    /// sort column, so indexing here cannot go out of range.
    pub(crate) fn key(&self, column: usize) -> &str {
        &self.fields[column]
    }

    pub fn into_fields(self) -> StringRecord {
        self.fields
    }
}

impl From<StringRecord> for Record {
    fn from(fields: StringRecord) -> Self {
        Record::new(fields)
    }
}

impl From<Vec<&str>> for Record {
    fn from(fields: Vec<&str>) -> Self {
        Record::new(StringRecord::from(fields))
    }
}
