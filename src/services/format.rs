//! Display helpers
//!
//! Indonesian date text and social share links for the site pages.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Formats timestamps in a fixed UTC offset using Indonesian month names
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl DateFormatter {
    /// Offset in whole hours; out-of-range values fall back to UTC
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or(Utc.fix());
        Self { offset }
    }

    /// "5 Januari 2025"
    pub fn date(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.offset);
        format!(
            "{} {} {}",
            local.day(),
            MONTHS[local.month0() as usize],
            local.year()
        )
    }

    /// "5 Januari 2025 pukul 14.30"
    pub fn date_time(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.offset);
        format!(
            "{} pukul {:02}.{:02}",
            self.date(at),
            local.hour(),
            local.minute()
        )
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(7)
    }
}

/// Social share URLs for an article page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub page_url: String,
    pub facebook: String,
    pub twitter: String,
}

impl ShareLinks {
    pub fn new(base_url: &str, slug: &str, title: &str) -> Self {
        let page_url = format!("{}/news/{}", base_url.trim_end_matches('/'), slug);
        let encoded_url = urlencoding::encode(&page_url);
        Self {
            facebook: format!(
                "https://www.facebook.com/sharer/sharer.php?u={}",
                encoded_url
            ),
            twitter: format!(
                "https://twitter.com/intent/tweet?url={}&text={}",
                encoded_url,
                urlencoding::encode(title)
            ),
            page_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_in_wib() {
        let fmt = DateFormatter::new(7);
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 7, 30, 0).unwrap();
        assert_eq!(fmt.date(at), "5 Januari 2025");
        assert_eq!(fmt.date_time(at), "5 Januari 2025 pukul 14.30");
    }

    #[test]
    fn test_offset_crosses_midnight() {
        let fmt = DateFormatter::new(7);
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 20, 5, 0).unwrap();
        assert_eq!(fmt.date_time(at), "1 Januari 2025 pukul 03.05");

        let utc = DateFormatter::new(0);
        assert_eq!(utc.date(at), "31 Desember 2024");
    }

    #[test]
    fn test_share_links_are_encoded() {
        let links = ShareLinks::new("https://mitramutiara.co.id/", "panen-raya", "Panen & Raya");
        assert_eq!(links.page_url, "https://mitramutiara.co.id/news/panen-raya");
        assert_eq!(
            links.facebook,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fmitramutiara.co.id%2Fnews%2Fpanen-raya"
        );
        assert!(links.twitter.ends_with("&text=Panen%20%26%20Raya"));
    }

    #[test]
    fn test_share_page_matches_site_route() {
        let links = ShareLinks::new("https://mitramutiara.co.id", "panen-raya", "Panen");
        assert_eq!(links.page_url, "https://mitramutiara.co.id/news/panen-raya");
        assert!(!links.page_url.contains("/berita/"));
    }
}
