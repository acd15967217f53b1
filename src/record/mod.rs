mod info;

use std::cmp::Ordering;
use std::fmt;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::types::MISSING;
pub use info::{InfoValue, Value};

/// The FILTER column.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FilterStatus {
    /// `.`: filters were not applied.
    Missing,
    /// `PASS`
    Pass,
    /// Names of the filters this record failed.
    Failed(Vec<String>),
}

impl FilterStatus {
    pub fn is_filtered(&self) -> bool {
        matches!(self, FilterStatus::Failed(names) if !names.is_empty())
    }

    pub fn names(&self) -> &[String] {
        match self {
            FilterStatus::Failed(names) => names,
            _ => &[],
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStatus::Missing => f.write_str(MISSING),
            FilterStatus::Failed(names) if !names.is_empty() => f.write_str(&names.join(";")),
            _ => f.write_str("PASS"),
        }
    }
}

/// `(chrom, gene, pos)`, ordered lexicographically.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GenomicKey<'a> {
    pub chrom: &'a str,
    pub gene: &'a str,
    pub pos: u64,
}

/// One AAVF data row.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Record {
    #[getset(get = "pub")]
    chrom: String,
    #[getset(get = "pub")]
    gene: String,
    #[getset(get_copy = "pub")]
    pos: u64,
    #[getset(get = "pub")]
    reference: String,
    #[getset(get = "pub")]
    alt: Vec<String>,
    #[getset(get = "pub")]
    filter: FilterStatus,
    #[getset(get_copy = "pub")]
    alt_freq: f64,
    #[getset(get_copy = "pub")]
    coverage: i64,
    #[getset(get = "pub")]
    info: IndexMap<String, InfoValue>,
}

impl Record {
    /// A record with FILTER `.`, zero frequency and coverage and no INFO.
    /// An empty `alt` becomes the single missing allele `.`.
    pub fn new(chrom: &str, gene: &str, pos: u64, reference: &str, alt: &[&str]) -> Self {
        let alt = if alt.is_empty() {
            vec![MISSING.to_owned()]
        } else {
            alt.iter().map(|&a| a.to_owned()).collect()
        };
        Record {
            chrom: chrom.into(),
            gene: gene.into(),
            pos,
            reference: reference.into(),
            alt,
            filter: FilterStatus::Missing,
            alt_freq: 0.0,
            coverage: 0,
            info: IndexMap::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_fields(
        chrom: String,
        gene: String,
        pos: u64,
        reference: String,
        alt: Vec<String>,
        filter: FilterStatus,
        alt_freq: f64,
        coverage: i64,
        info: IndexMap<String, InfoValue>,
    ) -> Self {
        Record {
            chrom,
            gene,
            pos,
            reference,
            alt,
            filter,
            alt_freq,
            coverage,
            info,
        }
    }

    pub fn with_filter(mut self, filter: FilterStatus) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_alt_freq(mut self, alt_freq: f64) -> Self {
        self.alt_freq = alt_freq;
        self
    }

    pub fn with_coverage(mut self, coverage: i64) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn with_info<V: Into<InfoValue>>(mut self, id: &str, value: V) -> Self {
        self.add_info(id, value);
        self
    }

    pub fn key(&self) -> GenomicKey<'_> {
        GenomicKey {
            chrom: &self.chrom,
            gene: &self.gene,
            pos: self.pos,
        }
    }

    /// Records that `name` was triggered. A `.` or `PASS` status becomes a
    /// one-element failure list.
    pub fn add_filter(&mut self, name: &str) {
        match &mut self.filter {
            FilterStatus::Failed(names) => names.push(name.to_owned()),
            status => *status = FilterStatus::Failed(vec![name.to_owned()]),
        }
    }

    /// Inserts or replaces an INFO entry.
    pub fn add_info<V: Into<InfoValue>>(&mut self, id: &str, value: V) {
        self.info.insert(id.to_owned(), value.into());
    }

    pub fn add_flag(&mut self, id: &str) {
        self.add_info(id, true);
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_filtered()
    }
}

/// Two records are the same variant if CHROM, GENE, POS, REF and ALT agree.
/// When either carries an `AC` INFO entry, both must carry it with equal values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let same_ac = match (self.info.get("AC"), other.info.get("AC")) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        };
        same_ac
            && self.chrom == other.chrom
            && self.gene == other.gene
            && self.pos == other.pos
            && self.reference == other.reference
            && self.alt == other.alt
    }
}

/// Orders by [`GenomicKey`] only.
impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.key().cmp(&other.key()))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record(CHROM={}, GENE={}, POS={}, REF={}, ALT={}, FILTER={}, ALT_FREQ={}, COVERAGE={}, INFO={{{}}})",
            self.chrom,
            self.gene,
            self.pos,
            self.reference,
            self.alt.join(","),
            self.filter,
            self.alt_freq,
            self.coverage,
            self.info.iter().map(|(k, v)| format!("{}: {:?}", k, v)).join(", ")
        )
    }
}
