//! Query string helpers: escaping, placeholder assembly and builders for
//! common Solr query syntax.
//!
//! ```
//! use solrium::query::helper;
//!
//! let fq = helper::assemble("cat:%T1% AND title:%P2%", &["a\"b", "big deal"]).unwrap();
//! assert_eq!(fq, r#"cat:a\"b AND title:"big deal""#);
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{Result, SolriumError};

static TERM_SPECIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\+|-|&&|\|\||!|\(|\)|\{|\}|\[|\]|\^|"|~|\*|\?|:|/|\\|\s)"#)
        .expect("term escape pattern is valid")
});

static PHRASE_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("|\\)"#).expect("phrase escape pattern is valid"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%(L|P|T|)([0-9]+)%").expect("placeholder pattern is valid")
});

static CONTROL_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("control character pattern is valid")
});

/// Escape a term so it is matched literally.
///
/// Every character with a meaning in the standard query parser, and
/// whitespace, is backslash-escaped.
pub fn escape_term(input: &str) -> String {
    TERM_SPECIAL.replace_all(input, r"\${1}").into_owned()
}

/// Quote a phrase, escaping embedded quotes and backslashes.
pub fn escape_phrase(input: &str) -> String {
    format!("\"{}\"", PHRASE_SPECIAL.replace_all(input, r"\${1}"))
}

/// Escape a value used inside local parameters (`{!key=value}`).
///
/// With a separator, occurrences of it are backslash-escaped first so the
/// value survives being joined into a separated list. Values containing
/// whitespace, quotes or `}` are then single-quoted with `'` and `\`
/// escaped.
pub fn escape_local_param_value(value: &str, separator: Option<&str>) -> String {
    let value = match separator {
        Some(separator) if !separator.is_empty() => {
            value.replace(separator, &format!("\\{separator}"))
        }
        _ => value.to_string(),
    };
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || c == '\'' || c == '"' || c == '}');
    if needs_quotes {
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        format!("'{escaped}'")
    } else {
        value
    }
}

/// Join list items for a local parameter, escaping the separator inside
/// items and quoting the result when needed.
pub fn join_local_param_values<I, S>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items
        .into_iter()
        .map(|item| item.as_ref().replace(separator, &format!("\\{separator}")))
        .collect::<Vec<_>>()
        .join(separator);
    escape_local_param_value(&joined, None)
}

/// Replace placeholders in a query template.
///
/// * `%1%` / `%L1%`: the part as-is
/// * `%P1%`: phrase-escaped
/// * `%T1%`: term-escaped
///
/// Placeholders are one based and case-insensitive.
pub fn assemble<S: AsRef<str>>(template: &str, parts: &[S]) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(mode), Some(number)) = (captures.get(0), captures.get(1), captures.get(2))
        else {
            continue;
        };
        let index: usize = number.as_str().parse().map_err(|_| {
            SolriumError::invalid_argument(format!("Invalid placeholder '{}'", whole.as_str()))
        })?;
        let part = index
            .checked_sub(1)
            .and_then(|i| parts.get(i))
            .ok_or_else(|| {
                SolriumError::invalid_argument(format!(
                    "No value supplied for part #{index} in query assembler"
                ))
            })?
            .as_ref();

        output.push_str(&template[last..whole.start()]);
        match mode.as_str().to_ascii_uppercase().as_str() {
            "P" => output.push_str(&escape_phrase(part)),
            "T" => output.push_str(&escape_term(part)),
            _ => output.push_str(part),
        }
        last = whole.end();
    }
    output.push_str(&template[last..]);
    Ok(output)
}

/// Format a date the way Solr expects it: `YYYY-MM-DDThh:mm:ssZ`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an RFC 3339 date (any offset) and format it for Solr.
pub fn format_date_str(input: &str) -> Result<String> {
    let date = DateTime::parse_from_rfc3339(input)
        .map_err(|e| SolriumError::invalid_argument(format!("Invalid date '{input}': {e}")))?;
    Ok(format_date(&date.with_timezone(&Utc)))
}

/// Range query on a field. `None` bounds are open (`*`); bounds are
/// term-escaped.
pub fn range_query(field: &str, from: Option<&str>, to: Option<&str>, inclusive: bool) -> String {
    let from = from.map(escape_term).unwrap_or_else(|| "*".to_string());
    let to = to.map(escape_term).unwrap_or_else(|| "*".to_string());
    if inclusive {
        format!("{field}:[{from} TO {to}]")
    } else {
        format!("{field}:{{{from} TO {to}}}")
    }
}

/// Local params prefix selecting a query parser: `{!name k=v ...}`.
pub fn qparser(name: &str, params: &[(&str, &str)]) -> String {
    let mut output = format!("{{!{name}");
    for (key, value) in params {
        output.push(' ');
        output.push_str(key);
        output.push('=');
        output.push_str(&escape_local_param_value(value, None));
    }
    output.push('}');
    output
}

/// Function call syntax: `name(p1,p2)`.
pub fn function_call<S: AsRef<str>>(name: &str, params: &[S]) -> String {
    let params = params.iter().map(|p| p.as_ref()).collect::<Vec<_>>().join(",");
    format!("{name}({params})")
}

/// Geo filter on documents within `distance` km of a point.
pub fn geofilt(field: &str, lat: f64, lon: f64, distance: f64) -> String {
    qparser(
        "geofilt",
        &[
            ("pt", &format!("{lat},{lon}")),
            ("sfield", field),
            ("d", &distance.to_string()),
        ],
    )
}

/// Bounding-box filter around a point.
pub fn bbox(field: &str, lat: f64, lon: f64, distance: f64) -> String {
    qparser(
        "bbox",
        &[
            ("pt", &format!("{lat},{lon}")),
            ("sfield", field),
            ("d", &distance.to_string()),
        ],
    )
}

/// `geodist(field,lat,lon)` function, usable for sorting and scoring.
pub fn geodist(field: &str, lat: f64, lon: f64) -> String {
    function_call("geodist", &[field.to_string(), lat.to_string(), lon.to_string()])
}

/// Join query parser prefix.
pub fn join(from: &str, to: &str) -> String {
    qparser("join", &[("from", from), ("to", to)])
}

/// Cache control prefix for filter queries: `{!cache=false cost=100}`.
pub fn cache_control(use_cache: bool, cost: Option<u32>) -> String {
    match cost {
        Some(cost) => format!("{{!cache={use_cache} cost={cost}}}"),
        None => format!("{{!cache={use_cache}}}"),
    }
}

/// Replace control characters that are invalid in XML with spaces.
pub fn filter_control_characters(input: &str) -> String {
    CONTROL_CHARACTERS.replace_all(input, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_term() {
        assert_eq!(escape_term("a+b"), r"a\+b");
        assert_eq!(escape_term("x:y (z)"), r"x\:y\ \(z\)");
        assert_eq!(escape_term("a&&b||c"), r"a\&&b\||c");
        assert_eq!(escape_term(r#"say "hi"\"#), r#"say\ \"hi\"\\"#);
        assert_eq!(escape_term("plain"), "plain");
    }

    #[test]
    fn test_escape_phrase() {
        assert_eq!(escape_phrase(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn test_escape_local_param_value() {
        assert_eq!(escape_local_param_value("simple", None), "simple");
        assert_eq!(escape_local_param_value("two words", None), "'two words'");
        assert_eq!(escape_local_param_value("it's", None), r"'it\'s'");
        assert_eq!(escape_local_param_value("a,b", Some(",")), r"a\,b");
        assert_eq!(join_local_param_values(["a", "b,c"], ","), r"a,b\,c");
        assert_eq!(join_local_param_values(["x y", "z"], ","), "'x y,z'");
    }

    #[test]
    fn test_assemble() {
        assert_eq!(
            assemble("id:%1% AND cat:%t2% AND name:%P3%", &["5", "a b", "x\"y"]).unwrap(),
            r#"id:5 AND cat:a\ b AND name:"x\"y""#
        );
        assert_eq!(assemble("%L1%-%l1%", &["v"]).unwrap(), "v-v");
        assert!(matches!(
            assemble("%2%", &["only one"]),
            Err(SolriumError::InvalidArgument(_))
        ));
        assert!(assemble("%0%", &["x"]).is_err());
    }

    #[test]
    fn test_dates() {
        let date = Utc.with_ymd_and_hms(2012, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(format_date(&date), "2012-03-04T05:06:07Z");
        assert_eq!(
            format_date_str("2012-03-04T07:06:07+02:00").unwrap(),
            "2012-03-04T05:06:07Z"
        );
        assert!(format_date_str("yesterday").is_err());
    }

    #[test]
    fn test_query_builders() {
        assert_eq!(range_query("price", Some("10"), None, true), "price:[10 TO *]");
        assert_eq!(range_query("price", Some("-1"), Some("5"), false), r"price:{\-1 TO 5}");
        assert_eq!(geofilt("store", 45.15, -93.85, 5.0), "{!geofilt pt=45.15,-93.85 sfield=store d=5}");
        assert_eq!(bbox("store", 1.0, 2.0, 3.5), "{!bbox pt=1,2 sfield=store d=3.5}");
        assert_eq!(geodist("store", 1.5, 2.0), "geodist(store,1.5,2)");
        assert_eq!(join("manu_id", "id"), "{!join from=manu_id to=id}");
        assert_eq!(cache_control(false, Some(100)), "{!cache=false cost=100}");
        assert_eq!(qparser("lucene", &[("df", "title text")]), "{!lucene df='title text'}");
    }

    #[test]
    fn test_filter_control_characters() {
        assert_eq!(filter_control_characters("a\u{1}b\tc\nd"), "a b\tc\nd");
    }
}
