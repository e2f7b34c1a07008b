use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use focusgen_core::{Header, Record};

use crate::errors::PipelineError;
use crate::source::RecordSource;

/// CSV-backed record source. Every row must have the header's arity.
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    header: Header,
    row: csv::StringRecord,
}

impl CsvRecordSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|source| PipelineError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);
        let header = reader
            .headers()
            .map_err(PipelineError::SourceRead)?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        Ok(Self {
            reader,
            header: Header::new(header),
            row: csv::StringRecord::new(),
        })
    }
}

impl<R: Read + Send> RecordSource for CsvRecordSource<R> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next_record(&mut self) -> Result<Option<Record>, PipelineError> {
        let more = self
            .reader
            .read_record(&mut self.row)
            .map_err(PipelineError::SourceRead)?;
        if !more {
            return Ok(None);
        }
        Ok(Some(Record::new(
            self.row.iter().map(str::to_string).collect(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_then_rows() {
        let data = "Id,ProviderName\n1,AWS\n2,Oracle\n";
        let mut source = CsvRecordSource::from_reader(data.as_bytes()).expect("open");

        assert_eq!(source.header(), &Header::from(vec!["Id", "ProviderName"]));
        let first = source.next_record().expect("row").expect("some row");
        assert_eq!(first.get(1), Some("AWS"));
        assert!(source.next_record().expect("row").is_some());
        assert!(source.next_record().expect("eof").is_none());
    }

    #[test]
    fn ragged_row_is_a_read_error() {
        let data = "Id,ProviderName\n1,AWS\n2\n";
        let mut source = CsvRecordSource::from_reader(data.as_bytes()).expect("open");

        assert!(source.next_record().expect("row").is_some());
        assert!(matches!(
            source.next_record(),
            Err(PipelineError::SourceRead(_))
        ));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let path = std::env::temp_dir().join(format!(
            "focusgen_missing_{}.csv",
            uuid::Uuid::new_v4()
        ));
        assert!(matches!(
            CsvRecordSource::open(&path),
            Err(PipelineError::SourceOpen { .. })
        ));
    }
}
