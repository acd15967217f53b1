//! Type-directed conversion between AAVF text rows and [`Record`]s.

use std::convert::TryFrom;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error::{AavfError, Result};
use crate::parser::{split_fields, Separator};
use crate::record::{FilterStatus, InfoValue, Record, Value};
use crate::types::{Header, HeaderInfo, InfoType, Vocabulary, MISSING};

/// Type used to decode INFO entry `id`: the header definition wins, then the
/// reserved table, then String if there is a payload and Flag otherwise.
pub fn resolve_info_type(
    id: &str,
    raw: Option<&str>,
    header: &Header,
    vocabulary: &Vocabulary,
) -> InfoType {
    header
        .info_type(id)
        .or_else(|| vocabulary.reserved_type(id))
        .unwrap_or(if raw.is_some() {
            InfoType::String
        } else {
            InfoType::Flag
        })
}

fn parse_list<T: FromStr>(raw: &str) -> Option<Vec<Option<T>>> {
    raw.split(',')
        .map(|token| match token {
            "" | MISSING => Ok(None),
            token => token.parse().map(Some),
        })
        .collect::<std::result::Result<_, _>>()
        .ok()
}

fn wrap<T: Into<Value>>(values: Vec<Option<T>>) -> Vec<Option<Value>> {
    values.into_iter().map(|v| v.map(Into::into)).collect()
}

fn decode_filter(raw: &str) -> FilterStatus {
    match raw {
        MISSING => FilterStatus::Missing,
        "PASS" => FilterStatus::Pass,
        names => FilterStatus::Failed(names.split(';').map(str::to_owned).collect()),
    }
}

fn decode_info_value(
    id: &str,
    raw: Option<&str>,
    kind: InfoType,
    line: &str,
) -> Result<InfoValue> {
    let payload = || {
        raw.ok_or_else(|| {
            AavfError::data_row(line, format!("INFO field {} is declared {} but has no value", id, kind))
        })
    };
    let value = match kind {
        InfoType::Integer => {
            let raw = payload()?;
            // integers that do not parse are retried as floats
            parse_list::<i64>(raw)
                .map(wrap)
                .or_else(|| parse_list::<f64>(raw).map(wrap))
        }
        InfoType::Float => parse_list::<f64>(payload()?).map(wrap),
        InfoType::Flag => return Ok(InfoValue::Flag(true)),
        InfoType::Character | InfoType::String => match raw {
            Some(raw) => parse_list::<String>(raw).map(wrap),
            None => {
                log::trace!("INFO field {} has no value, reading it as a flag", id);
                return Ok(InfoValue::Flag(true));
            }
        },
    };
    value.map(InfoValue::List).ok_or_else(|| {
        AavfError::data_row(
            line,
            format!("INFO field {} value {:?} is not {}", id, raw.unwrap_or(""), kind),
        )
    })
}

fn decode_info(
    raw: &str,
    line: &str,
    header: &Header,
    vocabulary: &Vocabulary,
) -> Result<IndexMap<String, InfoValue>> {
    let mut info = IndexMap::new();
    if raw == MISSING {
        return Ok(info);
    }
    for entry in raw.split(';').filter(|e| !e.is_empty()) {
        let (id, payload) = match entry.split_once('=') {
            Some((id, payload)) => (id, Some(payload)),
            None => (entry, None),
        };
        let kind = resolve_info_type(id, payload, header, vocabulary);
        let mut value = decode_info_value(id, payload, kind, line)?;
        let declared_single = header
            .infos()
            .get(id)
            .map_or(false, |def: &HeaderInfo| def.number().count() == Some(1));
        if declared_single {
            if let InfoValue::List(values) = value {
                value = InfoValue::Single(values.into_iter().next().flatten());
            }
        }
        info.insert(id.to_owned(), value);
    }
    Ok(info)
}

/// Options that change how a data row is split and decoded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeOptions<'a> {
    pub separator: Separator,
    pub prepend_chr: bool,
    pub vocabulary: &'a Vocabulary,
}

fn parse_number<T: FromStr>(raw: &str, column: &str, line: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| AavfError::data_row(line, format!("{} {:?}: {}", column, raw, e)))
}

/// Decodes one (trimmed) data row.
pub(crate) fn decode_record(
    line: &str,
    header: &Header,
    options: DecodeOptions<'_>,
) -> Result<Record> {
    let fields = split_fields(line, options.separator);
    let n_fields = fields.len();
    let [chrom, gene, pos, reference, alt, filter, alt_freq, coverage, info] =
        <[&str; 9]>::try_from(fields).map_err(|_| {
            AavfError::data_row(line, format!("expected 9 columns, found {}", n_fields))
        })?;

    let chrom = if options.prepend_chr {
        format!("chr{}", chrom)
    } else {
        chrom.to_owned()
    };
    Ok(Record::from_fields(
        chrom,
        gene.to_owned(),
        parse_number(pos, "POS", line)?,
        reference.to_owned(),
        alt.split(',').map(str::to_owned).collect(),
        decode_filter(filter),
        parse_number(alt_freq, "ALT_FREQ", line)?,
        parse_number(coverage, "COVERAGE", line)?,
        decode_info(info, line, header, options.vocabulary)?,
    ))
}

fn encode_element(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map_or_else(|| MISSING.to_owned(), ToString::to_string)
}

fn encode_info_pair(id: &str, value: &InfoValue) -> String {
    match value {
        InfoValue::Flag(true) => id.to_owned(),
        InfoValue::Flag(false) => String::new(),
        InfoValue::Single(v) => format!("{}={}", id, encode_element(v)),
        InfoValue::List(values) => format!("{}={}", id, values.iter().map(encode_element).join(",")),
    }
}

/// INFO entries ordered by header definition first, then alphabetically.
/// A column with nothing to show is written as `.` so the row keeps nine fields.
fn encode_info(info: &IndexMap<String, InfoValue>, header: &Header) -> String {
    let pairs: Vec<String> = info
        .iter()
        .sorted_by_key(|&(id, _)| (header.info_order(id), id))
        .map(|(id, value)| encode_info_pair(id, value))
        .collect();
    if pairs.iter().all(String::is_empty) {
        return MISSING.to_owned();
    }
    pairs.join(";")
}

/// Encodes a record as one data row, without line terminator.
pub fn encode_record(record: &Record, header: &Header, alt_freq_precision: Option<usize>) -> String {
    let alt_freq = match alt_freq_precision {
        Some(precision) => format!("{:.*}", precision, record.alt_freq()),
        None => format!("{:?}", record.alt_freq()),
    };
    [
        record.chrom().clone(),
        record.gene().clone(),
        record.pos().to_string(),
        record.reference().clone(),
        record.alt().join(","),
        record.filter().to_string(),
        alt_freq,
        record.coverage().to_string(),
        encode_info(record.info(), header),
    ]
    .join("\t")
}

fn encode_info_definition(info: &HeaderInfo) -> String {
    let mut line = format!(
        "##INFO=<ID={},Number={},Type={},Description=\"{}\"",
        info.id(),
        info.number(),
        info.kind(),
        info.description()
    );
    if let Some(source) = info.source() {
        line.push_str(&format!(",Source=\"{}\"", source));
    }
    if let Some(version) = info.version() {
        line.push_str(&format!(",Version=\"{}\"", version));
    }
    line.push('>');
    line
}

/// Header lines in write order: metadata, INFO, FILTER, then the column row.
pub fn encode_header(header: &Header) -> Vec<String> {
    let meta = header
        .meta()
        .iter()
        .flat_map(|(key, entry)| entry.values().iter().map(move |v| format!("##{}={}", key, v)));
    let infos = header.infos().values().map(encode_info_definition);
    let filters = header.filters().values().map(|f| {
        format!("##FILTER=<ID={},Description=\"{}\">", f.id(), f.description())
    });
    let columns = std::iter::once(format!("#{}", header.column_headers().join("\t")));
    meta.chain(infos).chain(filters).chain(columns).collect()
}
