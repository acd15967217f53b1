use std::fmt;

use getset::Getters;
use indexmap::IndexMap;
use itertools::Itertools;
use strum::{Display, EnumString};

/// The nine columns of an AAVF data row, in file order.
pub const COLUMN_HEADERS: [&str; 9] = [
    "CHROM", "GENE", "POS", "REF", "ALT", "FILTER", "ALT_FREQ", "COVERAGE", "INFO",
];

/// Missing value marker used in FILTER and inside INFO value lists.
pub const MISSING: &str = ".";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumString, Display)]
pub enum InfoType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

/// Declared cardinality of an INFO field (`Number=`).
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum InfoNumber {
    Count(i32),
    /// `Number=.`, or no number given at all.
    Unknown,
}

impl InfoNumber {
    pub fn count(self) -> Option<i32> {
        match self {
            InfoNumber::Count(n) => Some(n),
            InfoNumber::Unknown => None,
        }
    }
}

impl fmt::Display for InfoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoNumber::Count(n) => write!(f, "{}", n),
            InfoNumber::Unknown => f.write_str(MISSING),
        }
    }
}

/// Value of a generic `##key=value` metadata line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HeaderValue {
    String(String),
    /// `##key=<k1=v1,k2="v,2">`; quoted values keep their quotes.
    Map(IndexMap<String, String>),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::String(s) => f.write_str(s),
            HeaderValue::Map(m) => write!(
                f,
                "<{}>",
                m.iter().map(|(k, v)| format!("{}={}", k, v)).join(",")
            ),
        }
    }
}

/// A metadata key holds either one value (singular keys such as `fileformat`)
/// or every value seen for it, in file order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MetaEntry {
    Single(HeaderValue),
    Repeated(Vec<HeaderValue>),
}

impl MetaEntry {
    pub fn values(&self) -> &[HeaderValue] {
        match self {
            MetaEntry::Single(value) => std::slice::from_ref(value),
            MetaEntry::Repeated(values) => values,
        }
    }
}

#[derive(Debug, Getters, Clone, Eq, PartialEq)]
#[getset(get = "pub")]
pub struct HeaderInfo {
    id: String,
    number: InfoNumber,
    kind: InfoType,
    description: String,
    source: Option<String>,
    version: Option<String>,
}

impl HeaderInfo {
    pub fn new(id: &str, number: InfoNumber, kind: InfoType, description: &str) -> Self {
        HeaderInfo {
            id: id.into(),
            number,
            kind,
            description: description.into(),
            source: None,
            version: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[derive(Debug, Getters, Clone, Eq, PartialEq)]
#[getset(get = "pub")]
pub struct HeaderFilter {
    id: String,
    description: String,
}

impl HeaderFilter {
    pub fn new(id: &str, description: &str) -> Self {
        HeaderFilter {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Parsed header state of an AAVF stream.
#[derive(Debug, Clone, Default, Getters, PartialEq)]
#[getset(get = "pub")]
pub struct Header {
    meta: IndexMap<String, MetaEntry>,
    infos: IndexMap<String, HeaderInfo>,
    filters: IndexMap<String, HeaderFilter>,
    column_headers: Vec<String>,
    /// Every `##` line as read, trimmed, in file order.
    header_lines: Vec<String>,
}

impl Header {
    pub fn new(column_headers: Vec<String>) -> Self {
        Header {
            column_headers,
            ..Default::default()
        }
    }

    pub fn default_column_headers() -> Vec<String> {
        COLUMN_HEADERS.iter().map(|&c| c.to_owned()).collect()
    }

    pub fn with_meta(mut self, key: &str, value: HeaderValue, vocabulary: &Vocabulary) -> Self {
        self.insert_meta(key.into(), value, vocabulary);
        self
    }

    pub fn with_info(mut self, info: HeaderInfo) -> Self {
        self.insert_info(info);
        self
    }

    pub fn with_filter(mut self, filter: HeaderFilter) -> Self {
        self.insert_filter(filter);
        self
    }

    /// Values recorded for a metadata key; empty if the key never occurred.
    pub fn meta_values(&self, key: &str) -> &[HeaderValue] {
        self.meta.get(key).map(MetaEntry::values).unwrap_or(&[])
    }

    pub fn info_type(&self, id: &str) -> Option<InfoType> {
        self.infos.get(id).map(|info| info.kind)
    }

    /// Position of `id` among the INFO definitions; undefined ids sort after all of them.
    pub fn info_order(&self, id: &str) -> usize {
        self.infos.get_index_of(id).unwrap_or_else(|| self.infos.len())
    }

    pub(crate) fn insert_meta(&mut self, key: String, value: HeaderValue, vocabulary: &Vocabulary) {
        if vocabulary.is_singular(&key) {
            self.meta.insert(key, MetaEntry::Single(value));
            return;
        }
        match self.meta.get_mut(&key) {
            Some(MetaEntry::Repeated(values)) => values.push(value),
            Some(entry) => *entry = MetaEntry::Repeated(vec![value]),
            None => {
                self.meta.insert(key, MetaEntry::Repeated(vec![value]));
            }
        }
    }

    pub(crate) fn insert_info(&mut self, info: HeaderInfo) {
        self.infos.insert(info.id.clone(), info);
    }

    pub(crate) fn insert_filter(&mut self, filter: HeaderFilter) {
        self.filters.insert(filter.id.clone(), filter);
    }

    pub(crate) fn push_header_line(&mut self, line: &str) {
        self.header_lines.push(line.to_owned());
    }

    pub(crate) fn set_column_headers(&mut self, column_headers: Vec<String>) {
        self.column_headers = column_headers;
    }
}

/// Fixed tables consulted while parsing and writing: INFO ids whose type is
/// known without a header definition, and metadata keys that hold one value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Vocabulary {
    reserved_info: IndexMap<String, InfoType>,
    singular_metadata: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let reserved_info = [
            ("RC", InfoType::String),
            ("AC", InfoType::String),
            ("ACC", InfoType::Float),
            ("ACF", InfoType::Float),
        ]
        .iter()
        .map(|&(id, kind)| (id.to_owned(), kind))
        .collect();
        let singular_metadata = ["fileformat", "fileDate", "source", "reference"]
            .iter()
            .map(|&k| k.to_owned())
            .collect();
        Vocabulary {
            reserved_info,
            singular_metadata,
        }
    }
}

impl Vocabulary {
    pub fn with_reserved(mut self, id: &str, kind: InfoType) -> Self {
        self.reserved_info.insert(id.into(), kind);
        self
    }

    pub fn with_singular(mut self, key: &str) -> Self {
        if !self.is_singular(key) {
            self.singular_metadata.push(key.into());
        }
        self
    }

    pub fn reserved_type(&self, id: &str) -> Option<InfoType> {
        self.reserved_info.get(id).copied()
    }

    pub fn is_singular(&self, key: &str) -> bool {
        self.singular_metadata.iter().any(|k| k == key)
    }
}
