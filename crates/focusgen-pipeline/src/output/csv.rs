use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use focusgen_core::{Header, Record};

use crate::errors::PipelineError;
use crate::output::RecordSink;

/// CSV sink writing one line per record.
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<CountingWriter<W>>,
}

impl CsvRecordSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, PipelineError> {
        let file = File::create(path).map_err(|source| PipelineError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn from_writer(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(CountingWriter::new(writer));
        Self { writer }
    }

    /// Flush and hand back the underlying stream.
    pub fn into_inner(self) -> Result<W, PipelineError> {
        let counting = self
            .writer
            .into_inner()
            .map_err(|err| PipelineError::SinkWrite(csv::Error::from(err.into_error())))?;
        Ok(counting.inner)
    }
}

impl<W: Write + Send> RecordSink for CsvRecordSink<W> {
    fn write_header(&mut self, header: &Header) -> Result<(), PipelineError> {
        self.writer
            .write_record(header.fields())
            .map_err(PipelineError::SinkWrite)?;
        self.flush()
    }

    fn write_batch(&mut self, batch: &[Record]) -> Result<(), PipelineError> {
        for record in batch {
            self.writer
                .write_record(record.fields())
                .map_err(PipelineError::SinkWrite)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer
            .flush()
            .map_err(|err| PipelineError::SinkWrite(csv::Error::from(err)))
    }

    fn bytes_written(&self) -> Option<u64> {
        Some(self.writer.get_ref().bytes_written())
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_batches() {
        let mut sink = CsvRecordSink::from_writer(Vec::new());
        sink.write_header(&Header::from(vec!["Id", "ChargeDescription"]))
            .expect("header");
        sink.write_batch(&[
            Record::from(vec!["1", "plain"]),
            Record::from(vec!["2", "with, comma"]),
        ])
        .expect("batch");
        sink.write_batch(&[]).expect("empty batch");
        sink.flush().expect("flush");

        let bytes = sink.bytes_written().expect("counted");
        let out = String::from_utf8(sink.into_inner().expect("inner")).expect("utf8");
        assert_eq!(out, "Id,ChargeDescription\n1,plain\n2,\"with, comma\"\n");
        assert_eq!(bytes, out.len() as u64);
    }
}
