use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Extraction category requested for a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Images,
    Meta,
    Brand,
    Seo,
    Performance,
    Security,
    Compliance,
    Infrastructure,
    Legal,
    Careers,
    References,
    Contact,
}

impl Mode {
    pub const ALL: [Mode; 12] = [
        Mode::Images,
        Mode::Meta,
        Mode::Brand,
        Mode::Seo,
        Mode::Performance,
        Mode::Security,
        Mode::Compliance,
        Mode::Infrastructure,
        Mode::Legal,
        Mode::Careers,
        Mode::References,
        Mode::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Images => "images",
            Mode::Meta => "meta",
            Mode::Brand => "brand",
            Mode::Seo => "seo",
            Mode::Performance => "performance",
            Mode::Security => "security",
            Mode::Compliance => "compliance",
            Mode::Infrastructure => "infrastructure",
            Mode::Legal => "legal",
            Mode::Careers => "careers",
            Mode::References => "references",
            Mode::Contact => "contact",
        }
    }

    /// List modes append per-page records; the rest merge into one object.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Mode::Images | Mode::Meta | Mode::Careers | Mode::References
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Images => "Image URLs with alt text, format and dimensions",
            Mode::Meta => "Page titles, descriptions, headings and Open Graph data",
            Mode::Brand => "Logo, company name, about pages and mission/vision statements",
            Mode::Seo => "Title/description quality, headings, structured data and social tags",
            Mode::Performance => "Load time, page size and resource hints",
            Mode::Security => "HTTPS usage and security response headers",
            Mode::Compliance => "Accessibility signals, cookie notices and ISO certifications",
            Mode::Infrastructure => "Server software and CDN detection",
            Mode::Legal => "Privacy policy, terms, KVKK/GDPR and copyright notices",
            Mode::Careers => "Career pages and structured job postings",
            Mode::References => "Client logos and testimonials",
            Mode::Contact => "Emails, phone numbers, social profiles and addresses",
        }
    }

    /// Parse a list of mode names, keeping first-seen order and dropping repeats.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Mode>, SessionError> {
        let mut modes = Vec::new();
        for name in names {
            let mode = name.as_ref().parse::<Mode>()?;
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        Ok(modes)
    }
}

impl FromStr for Mode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or_else(|| SessionError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_name() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SEO".parse::<Mode>().unwrap(), Mode::Seo);
        assert_eq!(" Images ".parse::<Mode>().unwrap(), Mode::Images);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = "colors".parse::<Mode>().unwrap_err();
        assert!(matches!(err, SessionError::UnknownMode(ref name) if name == "colors"));
    }

    #[test]
    fn test_parse_list_dedups() {
        let modes = Mode::parse_list(&["seo", "images", "seo"]).unwrap();
        assert_eq!(modes, vec![Mode::Seo, Mode::Images]);
    }

    #[test]
    fn test_list_modes() {
        let lists: Vec<Mode> = Mode::ALL.into_iter().filter(|m| m.is_list()).collect();
        assert_eq!(lists, vec![Mode::Images, Mode::Meta, Mode::Careers, Mode::References]);
    }
}
