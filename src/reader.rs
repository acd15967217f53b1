use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use crate::codec::{decode_record, DecodeOptions};
use crate::error::{AavfError, Result};
use crate::parser::{self, split_fields, Separator};
use crate::record::Record;
use crate::types::{Header, Vocabulary, COLUMN_HEADERS};

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    separator: Separator,
    prepend_chr: bool,
    vocabulary: Vocabulary,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            separator: Separator::Lenient,
            prepend_chr: false,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl ReaderOptions {
    /// Split rows on tabs only, so that fields may contain spaces.
    pub fn strict_whitespace(mut self, strict: bool) -> Self {
        self.separator = if strict {
            Separator::Strict
        } else {
            Separator::Lenient
        };
        self
    }

    /// Prefix every CHROM with `chr`.
    pub fn prepend_chr(mut self, prepend_chr: bool) -> Self {
        self.prepend_chr = prepend_chr;
        self
    }

    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}

/// Next trimmed, non-blank line.
fn next_line<B: BufRead>(lines: &mut Lines<B>) -> Result<Option<String>> {
    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_owned()));
        }
    }
    Ok(None)
}

fn read_header<B: BufRead>(lines: &mut Lines<B>, options: &ReaderOptions) -> Result<Header> {
    let mut header = Header::default();
    let column_line = loop {
        let line = match next_line(lines)? {
            Some(line) => line,
            None => {
                return Err(AavfError::MissingHeaderRow {
                    reason: "input ended before a #CHROM line".into(),
                })
            }
        };
        if !line.starts_with("##") {
            break line;
        }
        header.push_header_line(&line);
        if line.starts_with("##INFO") {
            header.insert_info(parser::read_info(&line)?);
        } else if line.starts_with("##FILTER") {
            header.insert_filter(parser::read_filter(&line)?);
        } else {
            let (key, value) = parser::read_meta(&line);
            header.insert_meta(key, value, &options.vocabulary);
        }
    };

    let columns = match column_line.strip_prefix('#') {
        Some(columns) => split_fields(columns, options.separator),
        None => {
            return Err(AavfError::MissingHeaderRow {
                reason: format!("expected a #CHROM line, found {:?}", column_line),
            })
        }
    };
    if columns.len() < COLUMN_HEADERS.len() {
        return Err(AavfError::MissingHeaderRow {
            reason: format!(
                "column header line has {} of {} columns: {:?}",
                columns.len(),
                COLUMN_HEADERS.len(),
                column_line
            ),
        });
    }
    header.set_column_headers(
        columns
            .iter()
            .take(COLUMN_HEADERS.len())
            .map(|c| c.trim().to_owned())
            .collect(),
    );
    log::debug!(
        "parsed AAVF header: {} metadata keys, {} INFO and {} FILTER definitions",
        header.meta().len(),
        header.infos().len(),
        header.filters().len()
    );
    Ok(header)
}

/// Iterator over the records of an AAVF stream.
///
/// The header is parsed on construction; records are decoded lazily, one line
/// at a time. Reading the records again requires opening the source again.
pub struct AavfRecords<R: BufRead> {
    header: Header,
    options: ReaderOptions,
    lines: Lines<R>,
}

impl<R: BufRead> AavfRecords<R> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }
}

impl AavfRecords<BufReader<Box<dyn Read>>> {
    /// Opens a plain or gzip-compressed AAVF file.
    ///
    /// # Examples
    ///
    /// ```
    /// use aavf::AavfRecords;
    ///
    /// let records = AavfRecords::from_path("resources/sample.aavf").unwrap();
    /// assert_eq!(records.header().column_headers()[1], "GENE");
    /// assert_eq!(records.count(), 7);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_options(path, ReaderOptions::default())
    }

    pub fn from_path_with_options<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let (reader, _format) = niffler::from_path(path)?;
        Self::with_options(BufReader::new(reader), options)
    }
}

impl<R: BufRead> AavfRecords<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, ReaderOptions::default())
    }

    pub fn with_options(reader: R, options: ReaderOptions) -> Result<Self> {
        let mut lines = reader.lines();
        let header = read_header(&mut lines, &options)?;
        Ok(Self {
            header,
            options,
            lines,
        })
    }
}

impl<R: BufRead> Iterator for AavfRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match next_line(&mut self.lines) {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        let options = DecodeOptions {
            separator: self.options.separator,
            prepend_chr: self.options.prepend_chr,
            vocabulary: &self.options.vocabulary,
        };
        Some(decode_record(&line, &self.header, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeaderValue, InfoNumber, InfoType, MetaEntry};
    use pretty_assertions::assert_eq;

    const HEADER: &str = "##fileformat=AAVFv1.0
##fileDate=20180501
##source=HyDRA
##reference=hxb2.fas
##contig=<ID=hxb2_pol,length=3012>
##contig=<ID=hxb2_env,length=2571>
##comment
##INFO=<ID=RC,Number=1,Type=String,Description=\"Reference Codon\">
##INFO=<ID=AC,Number=.,Type=String,Description=\"Alternate Codon\">
##INFO=<ID=ACF,Number=.,Type=Float,Description=\"Alternate Codon Frequency, for each Alternate Codon, in the same order as listed.\">
##FILTER=<ID=af0.01,Description=\"Set if true: Alternate allele frequency < 0.01\">
#CHROM\tGENE\tPOS\tREF\tALT\tFILTER\tALT_FREQ\tCOVERAGE\tINFO
";

    fn read(input: &str) -> Result<AavfRecords<&[u8]>> {
        AavfRecords::new(input.as_bytes())
    }

    #[test]
    fn test_header() {
        let records = read(HEADER).unwrap();
        let header = records.header();
        assert_eq!(
            header.meta().get("fileformat"),
            Some(&MetaEntry::Single(HeaderValue::String("AAVFv1.0".into())))
        );
        assert_eq!(header.meta_values("source").len(), 1);
        assert_eq!(header.meta_values("contig").len(), 2);
        assert_eq!(
            header.meta_values("comment"),
            &[HeaderValue::String("none".into())]
        );
        assert_eq!(
            header.infos().keys().collect::<Vec<_>>(),
            vec!["RC", "AC", "ACF"]
        );
        assert_eq!(*header.infos()["RC"].number(), InfoNumber::Count(1));
        assert_eq!(*header.infos()["ACF"].kind(), InfoType::Float);
        assert_eq!(header.filters().len(), 1);
        assert_eq!(header.column_headers(), &Header::default_column_headers());
        assert_eq!(header.header_lines().len(), 11);
        assert_eq!(records.count(), 0);
    }

    #[test]
    fn test_records_skip_blank_lines() {
        let input = format!(
            "{}\nhxb2_pol\tRT\t41\tM\tL\tPASS\t0.5\t100\tRC=atg;AC=ctg;ACF=0.5\n\n   \nhxb2_pol  RT  42 K R . 0.1 10 .\n",
            HEADER
        );
        let records: Vec<_> = read(&input)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].pos(), 42);
        assert_eq!(records[1].reference(), "K");
    }

    #[test]
    fn test_strict_whitespace() {
        let input = format!("{}hxb2_pol  RT  42 K R . 0.1 10 .\n", HEADER);
        let mut records = AavfRecords::with_options(
            input.as_bytes(),
            ReaderOptions::default().strict_whitespace(true),
        )
        .unwrap();
        assert!(matches!(
            records.next(),
            Some(Err(AavfError::MalformedDataRow { .. }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_missing_header_row() {
        for input in &[
            "",
            "##fileformat=AAVFv1.0\n",
            "##fileformat=AAVFv1.0\nhxb2_pol\tRT\t41\tM\tL\tPASS\t0.5\t100\t.\n",
            "##fileformat=AAVFv1.0\n#CHROM\tGENE\tPOS\n",
        ] {
            assert!(matches!(
                read(input),
                Err(AavfError::MissingHeaderRow { .. })
            ));
        }
    }

    #[test]
    fn test_malformed_info_line_is_fatal() {
        let input = "##INFO=<ID=RC,Number=1,Type=Text,Description=\"x\">\n#CHROM\tGENE\tPOS\tREF\tALT\tFILTER\tALT_FREQ\tCOVERAGE\tINFO\n";
        match read(input) {
            Err(AavfError::MalformedHeaderLine { kind, .. }) => assert_eq!(kind, "INFO"),
            _ => panic!("expected malformed INFO line"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AavfRecords::from_path(dir.path().join("absent.aavf"));
        match result {
            Err(AavfError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            Err(e) => panic!("expected an I/O error, got {}", e),
            Ok(_) => panic!("expected an I/O error"),
        }
    }
}
