use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::codec::{encode_header, encode_record};
use crate::error::Result;
use crate::record::Record;
use crate::types::Header;

#[derive(Debug, Clone)]
pub struct WriterOptions {
    line_terminator: String,
    alt_freq_precision: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            line_terminator: "\n".into(),
            alt_freq_precision: None,
        }
    }
}

impl WriterOptions {
    pub fn line_terminator(mut self, terminator: &str) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Write ALT_FREQ with a fixed number of decimals.
    pub fn alt_freq_precision(mut self, precision: usize) -> Self {
        self.alt_freq_precision = Some(precision);
        self
    }
}

/// Writes a header once on construction, then one record per call.
///
/// # Examples
///
/// ```
/// use aavf::{AavfWriter, Header, Record};
///
/// let header = Header::new(Header::default_column_headers());
/// let mut writer = AavfWriter::new(Vec::new(), &header).unwrap();
/// writer.write_record(&Record::new("hxb2_pol", "RT", 103, "K", &["N"])).unwrap();
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert!(text.ends_with("hxb2_pol\tRT\t103\tK\tN\t.\t0.0\t0\t.\n"));
/// ```
pub struct AavfWriter<W: Write> {
    inner: W,
    header: Header,
    options: WriterOptions,
}

impl AavfWriter<BufWriter<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P, header: &Header) -> Result<Self> {
        Self::with_options(BufWriter::new(File::create(path)?), header, WriterOptions::default())
    }
}

impl<W: Write> AavfWriter<W> {
    pub fn new(inner: W, header: &Header) -> Result<Self> {
        Self::with_options(inner, header, WriterOptions::default())
    }

    pub fn with_options(inner: W, header: &Header, options: WriterOptions) -> Result<Self> {
        let mut writer = AavfWriter {
            inner,
            header: header.clone(),
            options,
        };
        let lines = encode_header(&writer.header);
        log::debug!("writing AAVF header of {} lines", lines.len());
        for line in lines {
            writer.write_line(&line)?;
        }
        Ok(writer)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner
            .write_all(self.options.line_terminator.as_bytes())?;
        Ok(())
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let line = encode_record(record, &self.header, self.options.alt_freq_precision);
        self.write_line(&line)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}
