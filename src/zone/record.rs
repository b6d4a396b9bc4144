use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record class as written in a zone file
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordClass {
    #[default]
    IN,
    CS,
    CH,
    HS,
}

impl RecordClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordClass::IN => "IN",
            RecordClass::CS => "CS",
            RecordClass::CH => "CH",
            RecordClass::HS => "HS",
        }
    }
}

impl FromStr for RecordClass {
    type Err = ();

    /// Class keywords are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(RecordClass::IN),
            "CS" => Ok(RecordClass::CS),
            "CH" => Ok(RecordClass::CH),
            "HS" => Ok(RecordClass::HS),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resource record, either parsed from a zone file or mapped from a
/// live DNS answer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Owner name (`@`, relative label or FQDN)
    pub name: String,
    /// Time to live in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Record class (usually IN)
    #[serde(default)]
    pub class: RecordClass,
    /// Record type mnemonic, always uppercase
    #[serde(rename = "type")]
    pub rtype: String,
    /// Record data in text format
    pub data: String,
}

impl DnsRecord {
    /// Create a new record. The type is uppercased and the data trimmed.
    pub fn new(
        name: impl Into<String>,
        ttl: Option<u32>,
        class: RecordClass,
        rtype: &str,
        data: &str,
    ) -> Self {
        Self {
            name: name.into(),
            ttl,
            class,
            rtype: rtype.to_ascii_uppercase(),
            data: data.trim().to_string(),
        }
    }

    /// Key used to correlate records across two record sets:
    /// lowercased name and uppercased type joined by `|`
    pub fn key(&self) -> String {
        format!(
            "{}|{}",
            self.name.to_lowercase(),
            self.rtype.to_ascii_uppercase()
        )
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ttl {
            Some(ttl) => write!(
                f,
                "{} {} {} {} {}",
                self.name, ttl, self.class, self.rtype, self.data
            ),
            None => write!(f, "{} {} {} {}", self.name, self.class, self.rtype, self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_type_and_data() {
        let record = DnsRecord::new("www", Some(300), RecordClass::IN, "cname", "  host.example.com. ");
        assert_eq!(record.rtype, "CNAME");
        assert_eq!(record.data, "host.example.com.");
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let a = DnsRecord::new("WWW.Example.com", None, RecordClass::IN, "a", "1.2.3.4");
        let b = DnsRecord::new("www.example.com", None, RecordClass::IN, "A", "1.2.3.4");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), "www.example.com|A");
    }

    #[test]
    fn test_class_from_str() {
        assert_eq!("in".parse::<RecordClass>(), Ok(RecordClass::IN));
        assert_eq!("Ch".parse::<RecordClass>(), Ok(RecordClass::CH));
        assert!("ANY".parse::<RecordClass>().is_err());
    }

    #[test]
    fn test_display() {
        let record = DnsRecord::new("@", Some(3600), RecordClass::IN, "MX", "10 mail.example.com.");
        assert_eq!(record.to_string(), "@ 3600 IN MX 10 mail.example.com.");
    }
}
