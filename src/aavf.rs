use std::io::BufRead;

use getset::Getters;

use crate::error::Result;
use crate::reader::AavfRecords;
use crate::record::Record;
use crate::types::Header;

/// A header together with its records, consumed front to back exactly once.
#[derive(Debug, Getters)]
pub struct Aavf {
    #[getset(get = "pub")]
    header: Header,
    records: std::vec::IntoIter<Record>,
}

impl Aavf {
    pub fn new(header: Header, records: Vec<Record>) -> Self {
        Aavf {
            header,
            records: records.into_iter(),
        }
    }

    /// Decodes every remaining record of `reader`, stopping at the first error.
    pub fn from_reader<R: BufRead>(reader: AavfRecords<R>) -> Result<Self> {
        let header = reader.header().clone();
        let records = reader.collect::<Result<Vec<_>>>()?;
        Ok(Aavf::new(header, records))
    }

    /// Records not yet iterated over.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl Iterator for Aavf {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}
