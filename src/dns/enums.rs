use std::fmt;

/// Resource record types with a well-known mnemonic.
///
/// Records themselves carry their type as a string so that any mnemonic
/// found in a zone file survives a comparison; this enum only backs the
/// numeric code mapping used for DNS-over-HTTPS answers and the parser's
/// detection of nameless record lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    HINFO,
    MX,
    TXT,
    AAAA,
    SRV,
    NAPTR,
    DS,
    SSHFP,
    DNSKEY,
    TLSA,
    SVCB,
    HTTPS,
    SPF,
    CAA,
}

impl RecordType {
    pub fn from_u16(value: u16) -> Option<Self> {
        let rtype = match value {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            12 => RecordType::PTR,
            13 => RecordType::HINFO,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            33 => RecordType::SRV,
            35 => RecordType::NAPTR,
            43 => RecordType::DS,
            44 => RecordType::SSHFP,
            48 => RecordType::DNSKEY,
            52 => RecordType::TLSA,
            64 => RecordType::SVCB,
            65 => RecordType::HTTPS,
            99 => RecordType::SPF,
            257 => RecordType::CAA,
            _ => return None,
        };
        Some(rtype)
    }

    pub fn to_u16(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::HINFO => 13,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::NAPTR => 35,
            RecordType::DS => 43,
            RecordType::SSHFP => 44,
            RecordType::DNSKEY => 48,
            RecordType::TLSA => 52,
            RecordType::SVCB => 64,
            RecordType::HTTPS => 65,
            RecordType::SPF => 99,
            RecordType::CAA => 257,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::PTR => "PTR",
            RecordType::HINFO => "HINFO",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::AAAA => "AAAA",
            RecordType::SRV => "SRV",
            RecordType::NAPTR => "NAPTR",
            RecordType::DS => "DS",
            RecordType::SSHFP => "SSHFP",
            RecordType::DNSKEY => "DNSKEY",
            RecordType::TLSA => "TLSA",
            RecordType::SVCB => "SVCB",
            RecordType::HTTPS => "HTTPS",
            RecordType::SPF => "SPF",
            RecordType::CAA => "CAA",
        }
    }

    /// Case-insensitive lookup by mnemonic
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let rtype = match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "NS" => RecordType::NS,
            "CNAME" => RecordType::CNAME,
            "SOA" => RecordType::SOA,
            "PTR" => RecordType::PTR,
            "HINFO" => RecordType::HINFO,
            "MX" => RecordType::MX,
            "TXT" => RecordType::TXT,
            "AAAA" => RecordType::AAAA,
            "SRV" => RecordType::SRV,
            "NAPTR" => RecordType::NAPTR,
            "DS" => RecordType::DS,
            "SSHFP" => RecordType::SSHFP,
            "DNSKEY" => RecordType::DNSKEY,
            "TLSA" => RecordType::TLSA,
            "SVCB" => RecordType::SVCB,
            "HTTPS" => RecordType::HTTPS,
            "SPF" => RecordType::SPF,
            "CAA" => RecordType::CAA,
            _ => return None,
        };
        Some(rtype)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Mnemonic for a numeric type code; unknown codes pass through as their
/// decimal string
pub fn type_name(code: u16) -> String {
    match RecordType::from_u16(code) {
        Some(rtype) => rtype.mnemonic().to_string(),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_known_codes() {
        assert_eq!(type_name(1), "A");
        assert_eq!(type_name(5), "CNAME");
        assert_eq!(type_name(15), "MX");
        assert_eq!(type_name(16), "TXT");
        assert_eq!(type_name(28), "AAAA");
        assert_eq!(type_name(257), "CAA");
    }

    #[test]
    fn test_type_name_unknown_code_passes_through() {
        assert_eq!(type_name(46), "46");
        assert_eq!(type_name(65535), "65535");
    }

    #[test]
    fn test_code_round_trip() {
        for code in [1u16, 2, 5, 6, 12, 13, 15, 16, 28, 33, 35, 43, 44, 48, 52, 64, 65, 99, 257] {
            let rtype = RecordType::from_u16(code).unwrap();
            assert_eq!(rtype.to_u16(), code);
            assert_eq!(RecordType::from_mnemonic(rtype.mnemonic()), Some(rtype));
        }
    }

    #[test]
    fn test_from_mnemonic_is_case_insensitive() {
        assert_eq!(RecordType::from_mnemonic("mx"), Some(RecordType::MX));
        assert_eq!(RecordType::from_mnemonic("www"), None);
    }
}
