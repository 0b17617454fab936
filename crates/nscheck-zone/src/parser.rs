//! Zone file parser.
//!
//! Parses RFC 1035 master files into a [`RecordStore`]. Supported syntax:
//!
//! - `$ORIGIN`, `$TTL` and `$INCLUDE` directives
//! - `@` as shorthand for the current origin, relative owner names
//! - a blank owner field (leading whitespace) repeating the previous owner
//! - TTL and class in either order, both optional
//! - parentheses for multi-line entries, `;` comments, quoted strings
//! - `TYPEnnn` type names and RFC 3597 `\# <len> <hex>` RDATA
//!
//! A, AAAA and PTR data is decoded; every other type is kept opaque.
//! Relative names are an error until an origin is known, either from
//! [`ZoneFileParser::origin`] or from a `$ORIGIN` directive.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use data_encoding::HEXLOWER_PERMISSIVE;
use nscheck_proto::rdata::{Opaque, A, AAAA, PTR};
use nscheck_proto::{Name, RData, RecordClass, RecordType, ResourceRecord, Type};
use tracing::debug;

use crate::store::RecordStore;
use crate::{Result, ZoneError};

/// TTL used when neither the record, a `$TTL` directive nor a previous
/// record supplies one.
const DEFAULT_TTL: u32 = 3600;

/// Parser state for one zone file.
#[derive(Debug)]
struct ParserState {
    /// Source label used in error messages.
    source: String,
    /// Directory that `$INCLUDE` paths are resolved against.
    base_dir: Option<PathBuf>,
    /// Current origin, if any.
    origin: Option<Name>,
    /// Value of the last `$TTL` directive.
    default_ttl: Option<u32>,
    /// TTL of the previous record.
    last_ttl: Option<u32>,
    /// Owner of the previous record (for blank owner fields).
    last_owner: Option<Name>,
    /// Line on which the current entry starts.
    line_number: usize,
    /// Include nesting depth of this file.
    include_depth: usize,
}

impl ParserState {
    fn new(source: String, base_dir: Option<PathBuf>, origin: Option<Name>) -> Self {
        Self {
            source,
            base_dir,
            origin,
            default_ttl: None,
            last_ttl: None,
            last_owner: None,
            line_number: 0,
            include_depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ZoneError {
        ZoneError::parse(self.source.clone(), self.line_number, message)
    }

    /// Resolves a name token against the current origin.
    fn resolve(&self, token: &str) -> Result<Name> {
        let origin = match &self.origin {
            _ if Name::is_fqdn(token) => Name::root(),
            Some(origin) => origin.clone(),
            None => {
                return Err(self.error(format!("relative name '{token}' without $ORIGIN")));
            }
        };
        Name::resolve(token, &origin)
            .map_err(|e| self.error(format!("invalid name '{token}': {e}")))
    }
}

/// Tracks parentheses and quotes across physical lines.
#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    in_quotes: bool,
}

impl Scanner {
    /// Appends the meaningful part of `line` to `out`, dropping comments and
    /// replacing grouping parentheses with spaces.
    fn scan(&mut self, line: &str, out: &mut String) -> std::result::Result<(), &'static str> {
        let mut escaped = false;
        for c in line.chars() {
            if escaped {
                out.push(c);
                escaped = false;
                continue;
            }
            match c {
                '\\' => {
                    out.push(c);
                    escaped = true;
                }
                '"' => {
                    out.push(c);
                    self.in_quotes = !self.in_quotes;
                }
                _ if self.in_quotes => out.push(c),
                ';' => break,
                '(' => {
                    self.depth += 1;
                    out.push(' ');
                }
                ')' => {
                    self.depth = self.depth.checked_sub(1).ok_or("unbalanced ')'")?;
                    out.push(' ');
                }
                _ => out.push(c),
            }
        }
        Ok(())
    }
}

/// Splits an entry into whitespace-separated tokens, keeping quoted strings
/// (quotes included) together.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                start.get_or_insert(i);
            }
            '"' => {
                in_quotes = !in_quotes;
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && !in_quotes => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

/// Parses a TTL value with optional unit suffixes (`1h30m`, `2d`, `300`).
fn parse_ttl_value(s: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut current: Option<u32> = None;

    for c in s.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = Some(current.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
            continue;
        }
        let unit: u32 = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return None,
        };
        total = total.checked_add(current.take()?.checked_mul(unit)?)?;
    }

    match current {
        Some(rest) => total.checked_add(rest),
        None if total > 0 || s.ends_with(['s', 'S']) => Some(total),
        None => None,
    }
}

/// Decodes RFC 3597 generic RDATA: `\# <length> [hex ...]`.
fn parse_generic(tokens: &[&str]) -> std::result::Result<Vec<u8>, String> {
    let length = tokens
        .get(1)
        .ok_or("generic rdata missing length")?
        .parse::<usize>()
        .map_err(|_| "invalid generic rdata length".to_string())?;
    let hex: String = tokens[2..].concat();
    let data = HEXLOWER_PERMISSIVE
        .decode(hex.as_bytes())
        .map_err(|e| format!("invalid generic rdata hex: {e}"))?;
    if data.len() != length {
        return Err(format!(
            "generic rdata length {length} does not match {} octets of data",
            data.len()
        ));
    }
    Ok(data)
}

/// Parser for RFC 1035 master file format zone files.
#[derive(Debug, Clone)]
pub struct ZoneFileParser {
    /// Maximum allowed include depth.
    max_include_depth: usize,
    /// Origin in effect before any `$ORIGIN` directive.
    origin: Option<Name>,
}

impl ZoneFileParser {
    /// Creates a new zone file parser with no preset origin.
    pub fn new() -> Self {
        Self {
            max_include_depth: 10,
            origin: None,
        }
    }

    /// Sets the maximum include depth.
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Sets the origin used until the file sets its own.
    pub fn origin(mut self, origin: Name) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Parses a zone file, appending its records to `store`.
    ///
    /// Returns the number of records added, including those from included
    /// files.
    pub fn parse_file(&self, path: impl AsRef<Path>, store: &mut RecordStore) -> Result<usize> {
        self.parse_file_nested(path.as_ref(), self.origin.clone(), None, 0, store)
    }

    /// Parses zone data from a reader. `source` labels error messages;
    /// `$INCLUDE` paths are resolved against the working directory.
    pub fn parse_reader<R: Read>(
        &self,
        reader: R,
        source: &str,
        store: &mut RecordStore,
    ) -> Result<usize> {
        let mut state = ParserState::new(source.to_string(), None, self.origin.clone());
        self.parse_lines(BufReader::new(reader), &mut state, store)
    }

    /// Parses zone data from a string.
    pub fn parse_str(&self, content: &str, store: &mut RecordStore) -> Result<usize> {
        self.parse_reader(content.as_bytes(), "<string>", store)
    }

    fn parse_file_nested(
        &self,
        path: &Path,
        origin: Option<Name>,
        default_ttl: Option<u32>,
        depth: usize,
        store: &mut RecordStore,
    ) -> Result<usize> {
        let file = File::open(path).map_err(|e| ZoneError::io(path, e))?;
        let mut state = ParserState::new(
            path.display().to_string(),
            path.parent().map(Path::to_path_buf),
            origin,
        );
        state.default_ttl = default_ttl;
        state.include_depth = depth;

        let added = self.parse_lines(BufReader::new(file), &mut state, store)?;
        debug!(file = %path.display(), records = added, "parsed zone file");
        Ok(added)
    }

    fn parse_lines<R: BufRead>(
        &self,
        reader: R,
        state: &mut ParserState,
        store: &mut RecordStore,
    ) -> Result<usize> {
        let mut scanner = Scanner::default();
        let mut entry = String::new();
        let mut entry_line = 0;
        let mut blank_owner = false;
        let mut added = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ZoneError::io(&state.source, e))?;
            let line_number = index + 1;

            if scanner.depth == 0 && entry.is_empty() {
                entry_line = line_number;
                blank_owner = line.starts_with([' ', '\t']);
            }

            state.line_number = line_number;
            scanner.scan(&line, &mut entry).map_err(|m| state.error(m))?;

            if scanner.depth > 0 {
                entry.push(' ');
                continue;
            }
            if scanner.in_quotes {
                return Err(state.error("unterminated quoted string"));
            }

            let text = std::mem::take(&mut entry);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            state.line_number = entry_line;
            added += self.parse_entry(text, blank_owner, state, store)?;
        }

        if scanner.depth > 0 {
            state.line_number = entry_line;
            return Err(state.error("unclosed '('"));
        }

        Ok(added)
    }

    /// Parses one logical entry: a directive or a resource record.
    fn parse_entry(
        &self,
        text: &str,
        blank_owner: bool,
        state: &mut ParserState,
        store: &mut RecordStore,
    ) -> Result<usize> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(0);
        }

        if !blank_owner && tokens[0].starts_with('$') {
            return self.parse_directive(&tokens, state, store);
        }

        let record = self.parse_record(&tokens, blank_owner, state)?;
        store.add(record);
        Ok(1)
    }

    /// Parses a directive line.
    fn parse_directive(
        &self,
        tokens: &[&str],
        state: &mut ParserState,
        store: &mut RecordStore,
    ) -> Result<usize> {
        match tokens[0].to_ascii_uppercase().as_str() {
            "$ORIGIN" => {
                let name = tokens
                    .get(1)
                    .ok_or_else(|| state.error("$ORIGIN requires a domain name"))?;
                if !Name::is_fqdn(name) && state.origin.is_none() {
                    return Err(state.error("first $ORIGIN must be absolute"));
                }
                state.origin = Some(state.resolve(name)?);
                Ok(0)
            }
            "$TTL" => {
                let value = tokens
                    .get(1)
                    .ok_or_else(|| state.error("$TTL requires a value"))?;
                let ttl = parse_ttl_value(value)
                    .ok_or_else(|| state.error(format!("invalid TTL: {value}")))?;
                state.default_ttl = Some(ttl);
                Ok(0)
            }
            "$INCLUDE" => {
                if state.include_depth >= self.max_include_depth {
                    return Err(ZoneError::IncludeDepth {
                        file: state.source.clone(),
                        line: state.line_number,
                        max: self.max_include_depth,
                    });
                }
                let file = tokens
                    .get(1)
                    .ok_or_else(|| state.error("$INCLUDE requires a file name"))?;
                let file = file.trim_matches('"');
                let path = match &state.base_dir {
                    Some(dir) => dir.join(file),
                    None => PathBuf::from(file),
                };
                let origin = match tokens.get(2) {
                    Some(name) => Some(state.resolve(name)?),
                    None => state.origin.clone(),
                };
                self.parse_file_nested(
                    &path,
                    origin,
                    state.default_ttl,
                    state.include_depth + 1,
                    store,
                )
            }
            other => Err(state.error(format!("unsupported directive: {other}"))),
        }
    }

    /// Parses a resource record entry.
    fn parse_record(
        &self,
        tokens: &[&str],
        blank_owner: bool,
        state: &mut ParserState,
    ) -> Result<ResourceRecord> {
        let (owner, mut rest) = if blank_owner {
            let owner = state
                .last_owner
                .clone()
                .ok_or_else(|| state.error("blank owner with no previous record"))?;
            (owner, tokens)
        } else {
            (state.resolve(tokens[0])?, &tokens[1..])
        };

        // TTL and class may appear in either order, each at most once.
        let mut ttl = None;
        let mut class = None;
        while let Some(token) = rest.first() {
            if ttl.is_none() && token.starts_with(|c: char| c.is_ascii_digit()) {
                ttl = Some(
                    parse_ttl_value(token)
                        .ok_or_else(|| state.error(format!("invalid TTL: {token}")))?,
                );
            } else if class.is_none() {
                match RecordClass::from_str(token) {
                    Ok(c) => class = Some(c),
                    Err(_) => break,
                }
            } else {
                break;
            }
            rest = &rest[1..];
        }

        let type_token = rest
            .first()
            .ok_or_else(|| state.error("missing record type"))?;
        let rtype = Type::from_str(type_token)
            .map_err(|_| state.error(format!("unknown record type: {type_token}")))?;
        let rdata = self.parse_rdata(rtype, &rest[1..], state)?;

        let ttl = ttl
            .or(state.default_ttl)
            .or(state.last_ttl)
            .unwrap_or(DEFAULT_TTL);

        state.last_owner = Some(owner.clone());
        state.last_ttl = Some(ttl);

        Ok(ResourceRecord::new(
            owner,
            rtype,
            class.unwrap_or_default(),
            ttl,
            rdata,
        ))
    }

    /// Parses the RDATA based on record type.
    fn parse_rdata(&self, rtype: Type, tokens: &[&str], state: &ParserState) -> Result<RData> {
        if tokens.is_empty() {
            return Err(state.error(format!("{rtype} record missing rdata")));
        }

        if tokens[0] == "\\#" {
            let data = parse_generic(tokens).map_err(|m| state.error(m))?;
            return match rtype.as_known() {
                Some(RecordType::A) => Ok(RData::A(A::from_octets(&data))),
                Some(RecordType::AAAA) => Ok(RData::AAAA(AAAA::from_octets(&data))),
                Some(RecordType::PTR) => {
                    Err(state.error("generic rdata is not supported for PTR records"))
                }
                _ => Ok(RData::Other(Opaque::new(tokens.join(" ")))),
            };
        }

        match rtype.as_known() {
            Some(RecordType::A) => {
                let addr = Ipv4Addr::from_str(tokens[0])
                    .map_err(|_| state.error(format!("invalid IPv4 address: {}", tokens[0])))?;
                Ok(RData::A(A::new(addr)))
            }
            Some(RecordType::AAAA) => {
                let addr = Ipv6Addr::from_str(tokens[0])
                    .map_err(|_| state.error(format!("invalid IPv6 address: {}", tokens[0])))?;
                Ok(RData::AAAA(AAAA::new(addr)))
            }
            Some(RecordType::PTR) => Ok(RData::PTR(PTR::new(state.resolve(tokens[0])?))),
            _ => Ok(RData::Other(Opaque::new(tokens.join(" ")))),
        }
    }
}

impl Default for ZoneFileParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn parse(content: &str) -> Result<RecordStore> {
        let mut store = RecordStore::new();
        ZoneFileParser::new().parse_str(content, &mut store)?;
        Ok(store)
    }

    const FORWARD_ZONE: &str = r#"
$ORIGIN zone.tld.
$TTL 1h
@   IN  SOA ns1 hostmaster (
            2024010101 ; serial
            3600       ; refresh
            600        ; retry
            604800     ; expire
            300 )      ; minimum
    IN  NS  ns1
ns1         A       10.0.0.53
host    300 IN A    10.0.0.1
        IN  AAAA    2001:db8::1
www         CNAME   host
txt         TXT     "v=spf1 -all; not a comment"
"#;

    #[test]
    fn test_forward_zone() {
        let store = parse(FORWARD_ZONE).unwrap();
        assert_eq!(store.len(), 7);
        assert_eq!(store.count_of_type(RecordType::SOA), 1);
        assert_eq!(store.count_of_type(RecordType::NS), 1);
        assert_eq!(store.count_of_type(RecordType::A), 2);
        assert_eq!(store.count_of_type(RecordType::AAAA), 1);
        assert_eq!(store.count_of_type(RecordType::CNAME), 1);
        assert_eq!(store.count_of_type(RecordType::TXT), 1);

        let records = store.list();
        assert_eq!(records[0].name(), &name("zone.tld."));
        assert_eq!(records[0].ttl(), 3600);
        // Blank owner repeats the previous owner.
        assert_eq!(records[1].name(), &name("zone.tld."));
        assert_eq!(records[1].rdata().to_string(), "ns1");

        let host = &records[3];
        assert_eq!(host.name(), &name("host.zone.tld."));
        assert_eq!(host.ttl(), 300);
        assert_eq!(host.rdata().to_string(), "10.0.0.1");

        let aaaa = &records[4];
        assert_eq!(aaaa.name(), &name("host.zone.tld."));
        assert_eq!(aaaa.record_type(), Some(RecordType::AAAA));
        assert_eq!(aaaa.ttl(), 3600);

        assert_eq!(
            records[6].rdata().to_string(),
            "\"v=spf1 -all; not a comment\""
        );
    }

    #[test]
    fn test_reverse_zone() {
        let store = parse(
            "$ORIGIN 0.0.10.in-addr.arpa.\n\
             1   PTR host.zone.tld.\n\
             2   PTR other\n",
        )
        .unwrap();
        let records = store.records_of_type(RecordType::PTR);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), &name("1.0.0.10.in-addr.arpa."));
        assert_eq!(records[0].rdata().ptr_target(), Some(&name("host.zone.tld.")));
        assert_eq!(
            records[1].rdata().ptr_target(),
            Some(&name("other.0.0.10.in-addr.arpa."))
        );
    }

    #[test]
    fn test_absolute_names_without_origin() {
        let store = parse("host.zone.tld. 60 IN A 10.0.0.1\n").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].ttl(), 60);
    }

    #[test]
    fn test_relative_name_requires_origin() {
        let err = parse("host IN A 10.0.0.1\n").unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("without $ORIGIN"));
    }

    #[test]
    fn test_preset_origin() {
        let mut store = RecordStore::new();
        ZoneFileParser::new()
            .origin(name("zone.tld."))
            .parse_str("host A 10.0.0.1\n", &mut store)
            .unwrap();
        assert_eq!(store.list()[0].name(), &name("host.zone.tld."));
    }

    #[test]
    fn test_escaped_owner_names() {
        let store = parse(
            "$ORIGIN zone.tld.\n\
             weird\\.host A 10.0.0.1\n\
             dotted\\. A 10.0.0.2\n",
        )
        .unwrap();
        let records = store.list();
        assert_eq!(records[0].name().as_str(), "weird\\.host.zone.tld.");
        assert_eq!(records[0].name().label_count(), 4);
        // An escaped trailing dot is not the root.
        assert_eq!(records[1].name().as_str(), "dotted\\..zone.tld.");
    }

    #[test]
    fn test_class_before_ttl() {
        let store = parse("host.zone.tld. IN 120 A 10.0.0.1\n").unwrap();
        let record = &store.list()[0];
        assert_eq!(record.ttl(), 120);
        assert_eq!(record.rclass(), RecordClass::IN);
    }

    #[test]
    fn test_generic_rdata() {
        let store = parse(
            "a.zone.tld. A \\# 4 0a000001\n\
             b.zone.tld. A \\# 1 61\n\
             c.zone.tld. TYPE65280 \\# 2 abcd\n",
        )
        .unwrap();
        let records = store.list();
        assert_eq!(records[0].rdata().to_string(), "10.0.0.1");
        // Short address data loads; the checker rejects it later.
        assert!(records[1].rdata().reverse_name().is_err());
        assert_eq!(records[2].rtype(), Type::Unknown(65280));
    }

    #[test]
    fn test_generic_rdata_length_mismatch() {
        let err = parse("a.zone.tld. A \\# 4 0a00\n").unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse("$ORIGIN zone.tld.\n\nhost A 10.0.0.300\n").unwrap_err();
        match err {
            ZoneError::ParseError { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("invalid IPv4 address"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse("host.zone.tld. BOGUS x\n").is_err());
        assert!(parse("host.zone.tld. A\n").is_err());
        assert!(parse("host.zone.tld. A ( 10.0.0.1\n").is_err());
        assert!(parse("host.zone.tld. A 10.0.0.1 )\n").is_err());
        assert!(parse("$GENERATE 1-10 host$ A 10.0.0.$\n").is_err());
        assert!(parse("  A 10.0.0.1\n").is_err());
    }

    #[test]
    fn test_ttl_values() {
        assert_eq!(parse_ttl_value("300"), Some(300));
        assert_eq!(parse_ttl_value("1h"), Some(3600));
        assert_eq!(parse_ttl_value("1h30m"), Some(5400));
        assert_eq!(parse_ttl_value("1W"), Some(604_800));
        assert_eq!(parse_ttl_value("0"), Some(0));
        assert_eq!(parse_ttl_value("h"), None);
        assert_eq!(parse_ttl_value("10x"), None);
        assert_eq!(parse_ttl_value(""), None);
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"txt TXT "a b" c"#),
            vec!["txt", "TXT", "\"a b\"", "c"]
        );
    }

    #[test]
    fn test_include_relative_to_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("inc")).unwrap();
        fs::write(
            dir.path().join("main.zone"),
            "$ORIGIN zone.tld.\n$TTL 120\n$INCLUDE inc/hosts.inc\nafter A 10.0.0.9\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("inc/hosts.inc"),
            "$ORIGIN sub.zone.tld.\nhost A 10.0.0.1\n",
        )
        .unwrap();

        let mut store = RecordStore::new();
        let added = ZoneFileParser::new()
            .parse_file(dir.path().join("main.zone"), &mut store)
            .unwrap();
        assert_eq!(added, 2);

        let records = store.list();
        assert_eq!(records[0].name(), &name("host.sub.zone.tld."));
        assert_eq!(records[0].ttl(), 120);
        // The included file's $ORIGIN does not leak back.
        assert_eq!(records[1].name(), &name("after.zone.tld."));
    }

    #[test]
    fn test_include_depth_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("loop.zone"), "$INCLUDE loop.zone\n").unwrap();

        let mut store = RecordStore::new();
        let err = ZoneFileParser::new()
            .max_include_depth(3)
            .parse_file(dir.path().join("loop.zone"), &mut store)
            .unwrap_err();
        assert!(matches!(err, ZoneError::IncludeDepth { max: 3, .. }));
    }

    #[test]
    fn test_missing_file() {
        let mut store = RecordStore::new();
        let err = ZoneFileParser::new()
            .parse_file("/nonexistent/zone/file", &mut store)
            .unwrap_err();
        assert!(matches!(err, ZoneError::Io { .. }));
    }
}
