//! Header grammar and field splitting.

use indexmap::IndexMap;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_till1};
use nom::character::complete::{alpha1, char, digit1, space0};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::separated_list0;
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};
use nom::IResult;
use std::str::FromStr;

use crate::error::{AavfError, Result};
use crate::types::{HeaderFilter, HeaderInfo, HeaderValue, InfoNumber, InfoType};

/// How data and column header rows are split into fields.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Separator {
    /// Tabs only.
    Strict,
    /// A tab, or a run of spaces.
    Lenient,
}

pub(crate) fn split_fields(line: &str, separator: Separator) -> Vec<&str> {
    match separator {
        Separator::Strict => line.split('\t').collect(),
        Separator::Lenient => {
            let mut fields = Vec::new();
            let mut start = 0;
            let mut chars = line.char_indices().peekable();
            while let Some((i, c)) = chars.next() {
                match c {
                    '\t' => {
                        fields.push(&line[start..i]);
                        start = i + 1;
                    }
                    ' ' => {
                        fields.push(&line[start..i]);
                        let mut end = i + 1;
                        while let Some(&(j, ' ')) = chars.peek() {
                            end = j + 1;
                            chars.next();
                        }
                        start = end;
                    }
                    _ => {}
                }
            }
            fields.push(&line[start..]);
            fields
        }
    }
}

/// A `,` optionally followed by blanks, as between INFO/FILTER attributes.
fn attribute_separator(input: &str) -> IResult<&str, ()> {
    value((), pair(char(','), space0))(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"'))(input)
}

fn info_number(input: &str) -> IResult<&str, InfoNumber> {
    alt((
        value(InfoNumber::Unknown, tag(".")),
        map_res(recognize(pair(opt(char('-')), digit1)), |n: &str| {
            n.parse().map(InfoNumber::Count)
        }),
    ))(input)
}

fn info_type(input: &str) -> IResult<&str, InfoType> {
    map_res(alpha1, InfoType::from_str)(input)
}

fn info_version(input: &str) -> IResult<&str, &str> {
    delimited(
        opt(char('"')),
        take_till(|c| c == '"' || c == '>'),
        opt(char('"')),
    )(input)
}

fn info_line(input: &str) -> IResult<&str, HeaderInfo> {
    let (input, _) = tag("##INFO=<")(input)?;
    let (input, (id, number, kind, description)) = tuple((
        preceded(tag("ID="), is_not(",")),
        preceded(
            pair(attribute_separator, tag("Number=")),
            map(opt(info_number), |n| n.unwrap_or(InfoNumber::Unknown)),
        ),
        preceded(pair(attribute_separator, tag("Type=")), info_type),
        preceded(pair(attribute_separator, tag("Description=")), quoted),
    ))(input)?;
    let (input, source) = opt(preceded(
        pair(attribute_separator, tag("Source=")),
        quoted,
    ))(input)?;
    let (input, version) = opt(preceded(
        pair(attribute_separator, tag("Version=")),
        info_version,
    ))(input)?;
    let (input, _) = char('>')(input)?;

    let mut info = HeaderInfo::new(id, number, kind, description);
    if let Some(source) = source {
        info = info.with_source(source);
    }
    if let Some(version) = version {
        info = info.with_version(version);
    }
    Ok((input, info))
}

fn filter_line(input: &str) -> IResult<&str, HeaderFilter> {
    let (input, (id, description)) = delimited(
        tag("##FILTER=<"),
        separated_pair(
            preceded(tag("ID="), is_not(",")),
            attribute_separator,
            preceded(tag("Description="), quoted),
        ),
        char('>'),
    )(input)?;
    Ok((input, HeaderFilter::new(id, description)))
}

/// Parses a `##INFO=<...>` line.
pub(crate) fn read_info(line: &str) -> Result<HeaderInfo> {
    info_line(line)
        .map(|(_, info)| info)
        .map_err(|_| AavfError::MalformedHeaderLine {
            kind: "INFO",
            line: line.to_owned(),
        })
}

/// Parses a `##FILTER=<...>` line.
pub(crate) fn read_filter(line: &str) -> Result<HeaderFilter> {
    filter_line(line)
        .map(|(_, filter)| filter)
        .map_err(|_| AavfError::MalformedHeaderLine {
            kind: "FILTER",
            line: line.to_owned(),
        })
}

fn meta_value(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(recognize(delimited(
            char('"'),
            take_till(|c| c == '"'),
            opt(char('"')),
        ))),
        take_till(|c| c == ','),
    ))(input)
}

fn meta_pair(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        take_till1(|c| c == '='),
        map(opt(preceded(char('='), meta_value)), |v| v.unwrap_or("")),
    )(input)
}

fn meta_map(input: &str) -> IResult<&str, IndexMap<String, String>> {
    map(separated_list0(char(','), meta_pair), |pairs| {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    })(input)
}

/// Parses any other `##key=value` line. Lines that are not of that form are
/// kept as `(line, "none")` rather than rejected.
pub(crate) fn read_meta(line: &str) -> (String, HeaderValue) {
    let body = line.strip_prefix("##").unwrap_or(line);
    let is_map = body.find("=<").map_or(false, |i| i > 0);
    if is_map {
        if let Some((key, raw)) = body.split_once('=') {
            let raw = raw.trim_matches(|c| matches!(c, '[' | '<' | '>' | ']'));
            if let Ok(("", map)) = meta_map(raw) {
                return (key.trim_start_matches('#').to_owned(), HeaderValue::Map(map));
            }
        }
    }
    match body.get(1..).and_then(|rest| rest.find('=')).map(|i| i + 1) {
        Some(i) if i + 1 < body.len() => (
            body[..i].to_owned(),
            HeaderValue::String(body[i + 1..].to_owned()),
        ),
        _ => {
            log::trace!("keeping unstructured header line {:?} as key=none", line);
            (
                line.trim_start_matches('#').to_owned(),
                HeaderValue::String("none".into()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_info() {
        let info = read_info(
            r#"##INFO=<ID=ACF,Number=1,Type=Float,Description="Alternate allele frequency">"#,
        )
        .unwrap();
        assert_eq!(info.id(), "ACF");
        assert_eq!(*info.number(), InfoNumber::Count(1));
        assert_eq!(*info.kind(), InfoType::Float);
        assert_eq!(info.description(), "Alternate allele frequency");
        assert_eq!(*info.source(), None);
    }

    #[test]
    fn test_read_info_number_variants() {
        let unknown =
            read_info(r#"##INFO=<ID=AC,Number=.,Type=String,Description="Alt codon">"#).unwrap();
        assert_eq!(*unknown.number(), InfoNumber::Unknown);
        let missing =
            read_info(r#"##INFO=<ID=AC,Number=,Type=String,Description="Alt codon">"#).unwrap();
        assert_eq!(*missing.number(), InfoNumber::Unknown);
        let negative =
            read_info(r#"##INFO=<ID=X,Number=-1, Type=Integer, Description="neg">"#).unwrap();
        assert_eq!(*negative.number(), InfoNumber::Count(-1));
    }

    #[test]
    fn test_read_info_source_version() {
        let info = read_info(
            r#"##INFO=<ID=RC,Number=1,Type=String,Description="Ref codon, as read",Source="HyDRA",Version="0.3">"#,
        )
        .unwrap();
        assert_eq!(info.description(), "Ref codon, as read");
        assert_eq!(info.source().as_deref(), Some("HyDRA"));
        assert_eq!(info.version().as_deref(), Some("0.3"));

        let info =
            read_info(r#"##INFO=<ID=RC,Number=1,Type=String,Description="x",Version=2>"#).unwrap();
        assert_eq!(info.version().as_deref(), Some("2"));
    }

    #[test]
    fn test_read_info_malformed() {
        for line in &[
            r#"##INFO=<ID=RC,Number=1,Type=Str,Description="x">"#,
            r#"##INFO=<ID=RC,Type=String,Description="x">"#,
            r#"##INFO=<ID=RC,Number=1,Type=String,Description=x>"#,
            r#"##INFO=<ID=RC,Number=1,Type=String,Description="x""#,
        ] {
            match read_info(line) {
                Err(AavfError::MalformedHeaderLine { kind, line: l }) => {
                    assert_eq!(kind, "INFO");
                    assert_eq!(&l, line);
                }
                other => panic!("expected malformed INFO line, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_read_filter() {
        let filter =
            read_filter(r#"##FILTER=<ID=af0.01,Description="Set if allele frequency < 1%">"#)
                .unwrap();
        assert_eq!(filter.id(), "af0.01");
        assert_eq!(filter.description(), "Set if allele frequency < 1%");
        assert!(read_filter(r#"##FILTER=<ID=q10>"#).is_err());
    }

    #[test]
    fn test_read_meta_string() {
        assert_eq!(
            read_meta("##fileformat=AAVFv1.0"),
            ("fileformat".to_owned(), HeaderValue::String("AAVFv1.0".into()))
        );
        assert_eq!(
            read_meta("##reference=hxb2.fas"),
            ("reference".to_owned(), HeaderValue::String("hxb2.fas".into()))
        );
    }

    #[test]
    fn test_read_meta_map() {
        let (key, value) = read_meta(r#"##contig=<ID=hxb2_pol,length=9719,note="a,b>c">"#);
        assert_eq!(key, "contig");
        let mut expected = IndexMap::new();
        expected.insert("ID".to_owned(), "hxb2_pol".to_owned());
        expected.insert("length".to_owned(), "9719".to_owned());
        expected.insert("note".to_owned(), r#""a,b>c""#.to_owned());
        assert_eq!(value, HeaderValue::Map(expected));
        assert_eq!(
            value.to_string(),
            r#"<ID=hxb2_pol,length=9719,note="a,b>c">"#
        );
    }

    #[test]
    fn test_read_meta_liberal() {
        assert_eq!(
            read_meta("##just some words"),
            ("just some words".to_owned(), HeaderValue::String("none".into()))
        );
        assert_eq!(
            read_meta("##key="),
            ("key=".to_owned(), HeaderValue::String("none".into()))
        );
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(
            split_fields("a\tb  c\t\td", Separator::Strict),
            vec!["a", "b  c", "", "d"]
        );
        assert_eq!(
            split_fields("a\tb  c\t\td", Separator::Lenient),
            vec!["a", "b", "c", "", "d"]
        );
        assert_eq!(split_fields("a\t b", Separator::Lenient), vec!["a", "", "b"]);
    }
}
