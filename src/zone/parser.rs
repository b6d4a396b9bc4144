use super::{DnsRecord, RecordClass, Result, ZoneError, constants};
use crate::dns::enums::RecordType;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Lenient, line-oriented zone file parser.
///
/// Each physical line is either blank, a comment, a `$` directive or a
/// single-line resource record of the form `[name] [ttl] [class] type data`.
/// Anything else (parenthesized continuations, `$INCLUDE`d content, lines
/// without a recognizable type) is skipped without an error, so parsing
/// always yields a (possibly empty) record list.
#[derive(Debug, Clone)]
pub struct ZoneParser {
    /// Origin in effect before any `$ORIGIN` directive
    initial_origin: String,
    /// TTL in effect before any `$TTL` directive
    initial_ttl: u32,
}

/// Running state threaded through the fold over the lines of one file
#[derive(Debug)]
struct ParseState {
    current_origin: String,
    default_ttl: u32,
    records: Vec<DnsRecord>,
}

/// Fields of a record line before inheritance and defaults are applied
#[derive(Debug, PartialEq)]
struct RecordFields<'a> {
    name: Option<&'a str>,
    ttl: Option<u32>,
    class: Option<RecordClass>,
    rtype: &'a str,
    data: &'a str,
}

impl ZoneParser {
    /// Create a new zone parser with origin `@` and default TTL 3600
    pub fn new() -> Self {
        Self {
            initial_origin: constants::DEFAULT_ORIGIN.to_string(),
            initial_ttl: constants::DEFAULT_TTL,
        }
    }

    /// Use a different origin until the first `$ORIGIN` directive
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.initial_origin = origin.into();
        self
    }

    /// Use a different default TTL until the first `$TTL` directive
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.initial_ttl = ttl;
        self
    }

    /// Read and parse a zone file from disk
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DnsRecord>> {
        let path = path.as_ref();

        let size = fs::metadata(path)?.len();
        if size > constants::MAX_ZONE_FILE_SIZE {
            return Err(ZoneError::FileTooLarge {
                size,
                limit: constants::MAX_ZONE_FILE_SIZE,
            });
        }

        let contents = fs::read_to_string(path)?;
        let records = self.parse(&contents);
        debug!("Loaded {} records from {}", records.len(), path.display());

        Ok(records)
    }

    /// Parse zone file contents into records, in file order
    pub fn parse(&self, contents: &str) -> Vec<DnsRecord> {
        let initial = ParseState {
            current_origin: self.initial_origin.clone(),
            default_ttl: self.initial_ttl,
            records: Vec::new(),
        };

        let state = contents
            .lines()
            .enumerate()
            .fold(initial, |state, (idx, line)| state.step(idx + 1, line));

        debug!(
            "Parsed {} records (origin {}, default TTL {})",
            state.records.len(),
            state.current_origin,
            state.default_ttl
        );

        state.records
    }

    /// Parse a single record line with this parser's initial origin and TTL.
    ///
    /// Returns `None` for blank lines, comments, directives and anything
    /// that is not a record.
    pub fn parse_line(&self, line: &str) -> Option<DnsRecord> {
        let line = strip_comment(line).trim();
        if line.is_empty() || line.starts_with('$') {
            return None;
        }

        let fields = parse_record_fields(line)?;
        Some(DnsRecord::new(
            fields.name.unwrap_or(&self.initial_origin),
            Some(fields.ttl.unwrap_or(self.initial_ttl)),
            fields.class.unwrap_or_default(),
            fields.rtype,
            fields.data,
        ))
    }
}

impl Default for ZoneParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse zone file contents with the default parser settings
pub fn parse_zone(contents: &str) -> Vec<DnsRecord> {
    ZoneParser::new().parse(contents)
}

impl ParseState {
    fn step(mut self, line_number: usize, raw: &str) -> Self {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            return self;
        }

        if line.starts_with('$') {
            self.apply_directive(line_number, line);
            return self;
        }

        match parse_record_fields(line) {
            Some(fields) => {
                let name = match fields.name {
                    Some(name) => name.to_string(),
                    None => self
                        .records
                        .last()
                        .map(|prev| prev.name.clone())
                        .unwrap_or_else(|| self.current_origin.clone()),
                };
                let ttl = fields.ttl.unwrap_or(self.default_ttl);

                self.records.push(DnsRecord::new(
                    name,
                    Some(ttl),
                    fields.class.unwrap_or_default(),
                    fields.rtype,
                    fields.data,
                ));
            }
            None => trace!("Skipping unrecognized line {}: {}", line_number, line),
        }

        self
    }

    fn apply_directive(&mut self, line_number: usize, line: &str) {
        let mut parts = line.split_whitespace();
        let directive = parts.next().unwrap_or_default();
        let value = parts.next();

        match directive.to_ascii_uppercase().as_str() {
            "$ORIGIN" => {
                if let Some(origin) = value {
                    self.current_origin = origin.to_string();
                    debug!("Set origin to: {}", origin);
                }
            }
            "$TTL" => match value.and_then(parse_ttl) {
                Some(ttl) => {
                    self.default_ttl = ttl;
                    debug!("Set default TTL to: {}", ttl);
                }
                None => trace!("Ignoring invalid $TTL on line {}: {}", line_number, line),
            },
            _ => debug!("Unsupported directive on line {}: {}", line_number, directive),
        }
    }
}

/// Cut a line at the first `;` that is neither escaped with `\` nor inside
/// a double-quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;

    for (pos, ch) in line.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &line[..pos],
            _ => {}
        }
    }

    line
}

/// Split a line into whitespace separated tokens, keeping each token's byte
/// offset so the record data can be taken verbatim from the line
fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (pos, ch) in line.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, &line[s..pos]));
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
    }

    if let Some(s) = start {
        tokens.push((s, &line[s..]));
    }

    tokens
}

fn is_ttl_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_type_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Split a record line into its fields.
///
/// A leading all-digit token is the TTL and a leading class keyword is the
/// class, so such lines have no owner name. Otherwise the first token is
/// the name, unless the rest does not form a record and the first token is
/// a well-known type mnemonic (`MX 10 mail.example.com.`).
fn parse_record_fields(line: &str) -> Option<RecordFields<'_>> {
    let tokens = tokenize(line);
    let (_, first) = tokens.first()?;

    if is_ttl_token(first) || first.parse::<RecordClass>().is_ok() {
        return match_fields(line, &tokens, false);
    }

    match_fields(line, &tokens, true).or_else(|| {
        RecordType::from_mnemonic(first)
            .and_then(|_| match_fields(line, &tokens, false))
    })
}

fn match_fields<'a>(
    line: &'a str,
    tokens: &[(usize, &'a str)],
    with_name: bool,
) -> Option<RecordFields<'a>> {
    let mut idx = 0;

    let name = if with_name {
        idx += 1;
        Some(tokens.first()?.1)
    } else {
        None
    };

    let ttl = match tokens.get(idx) {
        Some((_, token)) if is_ttl_token(token) => match token.parse::<u32>() {
            Ok(ttl) => {
                idx += 1;
                Some(ttl)
            }
            Err(_) => return None,
        },
        _ => None,
    };

    let class = match tokens.get(idx).map(|(_, token)| token.parse::<RecordClass>()) {
        Some(Ok(class)) => {
            idx += 1;
            Some(class)
        }
        _ => None,
    };

    let rtype = match tokens.get(idx) {
        Some((_, token)) if is_type_token(token) => *token,
        _ => return None,
    };
    idx += 1;

    let (data_start, _) = tokens.get(idx)?;
    let data = line[*data_start..].trim();

    Some(RecordFields {
        name,
        ttl,
        class,
        rtype,
        data,
    })
}

/// Parse TTL value (supports suffixes like 1h, 30m, etc.)
fn parse_ttl(s: &str) -> Option<u32> {
    let s = s.to_ascii_lowercase();

    let (digits, multiplier) = match s.as_bytes().last()? {
        b's' => (&s[..s.len() - 1], 1),
        b'm' => (&s[..s.len() - 1], 60),
        b'h' => (&s[..s.len() - 1], 3600),
        b'd' => (&s[..s.len() - 1], 86400),
        b'w' => (&s[..s.len() - 1], 604800),
        _ => (s.as_str(), 1),
    };

    digits.parse::<u32>().ok()?.checked_mul(multiplier)
}
