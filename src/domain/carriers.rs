//! Static table of supported Korean parcel carriers.
//!
//! Codes follow the Sweet Tracker carrier codes. The table is immutable
//! process-wide data; lookups are linear scans over a handful of entries.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Carrier {
    pub code: &'static str,
    pub name: &'static str,
    pub name_en: &'static str,
    pub contact: &'static str,
    pub website: &'static str,
    pub tracking_url: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    #[serde(skip)]
    pub pattern: Option<TrackingPattern>,
}

/// Recognizable shape of a carrier's tracking numbers. Pattern matching is
/// not 100% reliable; when it fails the client falls back to trying the
/// major carriers in turn.
#[derive(Debug, Clone, Copy)]
pub struct TrackingPattern {
    pub lengths: &'static [usize],
    pub prefix: Option<&'static str>,
}

impl TrackingPattern {
    pub fn matches(&self, digits: &str) -> bool {
        self.lengths.contains(&digits.len())
            && self.prefix.map_or(true, |p| digits.starts_with(p))
    }
}

pub static CARRIERS: &[Carrier] = &[
    Carrier {
        code: "04",
        name: "CJ대한통운",
        name_en: "CJ Logistics",
        contact: "1588-1255",
        website: "https://www.cjlogistics.com",
        tracking_url: "https://www.cjlogistics.com/ko/tool/parcel/tracking",
        aliases: &["cj", "cj대한통운", "cj택배", "대한통운", "씨제이대한통운"],
        pattern: Some(TrackingPattern {
            lengths: &[12, 13],
            prefix: Some("6"),
        }),
    },
    Carrier {
        code: "01",
        name: "우체국택배",
        name_en: "Korea Post",
        contact: "1588-1300",
        website: "https://www.epost.go.kr",
        tracking_url: "https://service.epost.go.kr/trace.RetrieveDomRi498Trv.postal",
        aliases: &["우체국", "우체국택배", "우편"],
        pattern: Some(TrackingPattern {
            lengths: &[13],
            prefix: None,
        }),
    },
    Carrier {
        code: "06",
        name: "로젠택배",
        name_en: "Logen",
        contact: "1588-9988",
        website: "https://www.ilogen.com",
        tracking_url: "https://www.ilogen.com/web/delivery/tracking",
        aliases: &["로젠택배", "로젠"],
        pattern: Some(TrackingPattern {
            lengths: &[11],
            prefix: None,
        }),
    },
    Carrier {
        code: "08",
        name: "롯데택배",
        name_en: "Lotte Global Logistics",
        contact: "1588-2121",
        website: "https://www.lotteglogis.com",
        tracking_url: "https://www.lotteglogis.com/home/reservation/tracking/index",
        aliases: &["롯데택배", "롯데글로벌로지스", "롯데"],
        pattern: None,
    },
    Carrier {
        code: "05",
        name: "한진택배",
        name_en: "Hanjin Express",
        contact: "1588-0011",
        website: "https://www.hanjin.com",
        tracking_url: "https://www.hanjin.com/kor/CMS/DeliveryMgr/WaybillResult.do",
        aliases: &["한진택배", "한진"],
        pattern: None,
    },
    Carrier {
        code: "11",
        name: "일양로지스",
        name_en: "Ilyang Logis",
        contact: "1588-0002",
        website: "https://www.ilyanglogis.com",
        tracking_url: "https://www.ilyanglogis.com/functionality/tracking.asp",
        aliases: &["일양로지스", "일양"],
        pattern: None,
    },
    Carrier {
        code: "23",
        name: "경동택배",
        name_en: "Kyungdong Express",
        contact: "1899-5368",
        website: "https://kdexp.com",
        tracking_url: "https://kdexp.com/service/delivery",
        aliases: &["경동택배", "경동"],
        pattern: None,
    },
    Carrier {
        code: "46",
        name: "CU편의점택배",
        name_en: "CU CVS Delivery",
        contact: "1566-1025",
        website: "https://www.cupost.co.kr",
        tracking_url: "https://www.cupost.co.kr/tracking.cupost",
        aliases: &["cu택배", "cu편의점", "씨유택배"],
        pattern: None,
    },
    Carrier {
        code: "24",
        name: "대신택배",
        name_en: "Daesin",
        contact: "043-222-4582",
        website: "https://www.ds3211.com",
        tracking_url: "https://www.ds3211.com/freight/internalFreightSearch.ht",
        aliases: &["대신택배", "대신"],
        pattern: None,
    },
    Carrier {
        code: "22",
        name: "대한통운",
        name_en: "Korea Express",
        contact: "1588-1255",
        website: "https://www.cjlogistics.com",
        tracking_url: "https://www.cjlogistics.com/ko/tool/parcel/tracking",
        aliases: &[],
        pattern: None,
    },
];

/// Carriers worth trying blindly when pattern detection fails.
pub static MAJOR_CARRIER_CODES: &[&str] = &["04", "08", "05", "01", "06"];

pub fn by_code(code: &str) -> Option<&'static Carrier> {
    CARRIERS.iter().find(|c| c.code == code)
}

/// Look a carrier up by name or alias, ignoring case and spaces.
pub fn by_alias(name: &str) -> Option<&'static Carrier> {
    let needle = name.to_lowercase().replace(' ', "");
    if needle.is_empty() {
        return None;
    }
    CARRIERS
        .iter()
        .find(|c| c.aliases.contains(&needle.as_str()) || c.name.to_lowercase() == needle)
}

/// All carriers whose tracking-number pattern matches the digit run.
/// A 13-digit number starting with 6 matches both CJ and Korea Post, so the
/// caller gets both and decides downstream.
pub fn matching_patterns(digits: &str) -> Vec<&'static Carrier> {
    CARRIERS
        .iter()
        .filter(|c| c.pattern.map_or(false, |p| p.matches(digits)))
        .collect()
}

/// Best single guess from the tracking-number pattern (first match in table
/// order, most reliable patterns first).
pub fn detect(digits: &str) -> Option<&'static Carrier> {
    CARRIERS
        .iter()
        .find(|c| c.pattern.map_or(false, |p| p.matches(digits)))
}

/// Resolve a user-supplied carrier hint: a name, an alias, or a numeric
/// Sweet Tracker code (zero-padded to two digits).
pub fn resolve_hint(hint: &str) -> Option<&'static Carrier> {
    if let Some(carrier) = by_alias(hint) {
        return Some(carrier);
    }
    let trimmed = hint.trim();
    if trimmed.chars().all(|c| c.is_ascii_digit()) && (1..=3).contains(&trimmed.len()) {
        let code = format!("{:0>2}", trimmed);
        return by_code(&code);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_code() {
        assert_eq!(by_code("04").unwrap().name_en, "CJ Logistics");
        assert!(by_code("99").is_none());
    }

    #[test]
    fn test_by_alias_case_and_spacing() {
        assert_eq!(by_alias("CJ대한통운").unwrap().code, "04");
        assert_eq!(by_alias("롯데").unwrap().code, "08");
        assert_eq!(by_alias("cj 택배").unwrap().code, "04");
        assert!(by_alias("없는택배").is_none());
    }

    #[test]
    fn test_pattern_detection() {
        // 12 digits starting with 6 is a CJ number
        assert_eq!(detect("640123456789").unwrap().code, "04");
        // 13 digits not starting with 6 is Korea Post
        assert_eq!(detect("1234567890123").unwrap().code, "01");
        // 11 digits is Logen
        assert_eq!(detect("12345678901").unwrap().code, "06");
        // 12 digits without the CJ prefix is shared by several carriers
        assert!(detect("123456789012").is_none());
    }

    #[test]
    fn test_ambiguous_pattern_yields_multiple_matches() {
        // 13 digits starting with 6: both CJ and Korea Post qualify
        let matches = matching_patterns("6401234567890");
        let codes: Vec<&str> = matches.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["04", "01"]);
    }

    #[test]
    fn test_resolve_hint() {
        assert_eq!(resolve_hint("한진").unwrap().code, "05");
        assert_eq!(resolve_hint("4").unwrap().code, "04");
        assert_eq!(resolve_hint("08").unwrap().code, "08");
        assert!(resolve_hint("unknown").is_none());
    }
}
