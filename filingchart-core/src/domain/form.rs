//! Form categories: classification, priority ranking and display colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self(r, g, b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Display category of a filing event.
///
/// Variants are declared in ascending priority so the derived `Ord` matches
/// [`FormCategory::rank`]: when several events share a date, the maximum wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormCategory {
    /// Form 4 insider transactions.
    InsiderTransaction,
    /// Press releases, news items and every unrecognized form.
    News,
    /// 8-K current reports.
    CurrentReport,
    /// 10-Q quarterly reports.
    QuarterlyReport,
    /// 10-K annual reports.
    AnnualReport,
}

impl FormCategory {
    pub const ALL: [FormCategory; 5] = [
        FormCategory::AnnualReport,
        FormCategory::QuarterlyReport,
        FormCategory::CurrentReport,
        FormCategory::News,
        FormCategory::InsiderTransaction,
    ];

    /// Collision priority; higher wins.
    pub fn rank(self) -> u8 {
        match self {
            FormCategory::AnnualReport => 5,
            FormCategory::QuarterlyReport => 4,
            FormCategory::CurrentReport => 3,
            FormCategory::News => 2,
            FormCategory::InsiderTransaction => 1,
        }
    }

    /// Classify a raw SEC form label.
    ///
    /// Amendments (`10-K/A`, `8-K/A`, `4/A`) fall into the same category as
    /// the base form. Anything unrecognized is `News`.
    pub fn classify(form_type: &str) -> Self {
        let form = form_type.trim();
        if form.contains("10-K") {
            FormCategory::AnnualReport
        } else if form.contains("10-Q") {
            FormCategory::QuarterlyReport
        } else if form.contains("8-K") {
            FormCategory::CurrentReport
        } else if form == "4" || form == "4/A" {
            FormCategory::InsiderTransaction
        } else {
            FormCategory::News
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            FormCategory::AnnualReport | FormCategory::QuarterlyReport => Rgb(0x3b, 0x82, 0xf6),
            FormCategory::CurrentReport => Rgb(0xea, 0xb3, 0x08),
            FormCategory::InsiderTransaction => Rgb(0xa8, 0x55, 0xf7),
            FormCategory::News => Rgb(0x22, 0xc5, 0x5e),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormCategory::AnnualReport => "Annual report",
            FormCategory::QuarterlyReport => "Quarterly report",
            FormCategory::CurrentReport => "Current report",
            FormCategory::News => "News",
            FormCategory::InsiderTransaction => "Insider transaction",
        }
    }
}

/// Human-readable description of a form label, or the label itself.
pub fn form_description(form_type: &str) -> &str {
    match form_type.trim() {
        "10-K" => "Annual Report",
        "10-Q" => "Quarterly Report",
        "8-K" => "Current Report",
        "4" => "Insider Trading",
        "S-1" => "IPO Registration",
        "DEF 14A" => "Proxy Statement",
        "SC 13G" | "SC 13D" => "Ownership Report",
        _ => form_type,
    }
}

/// One swatch of the chart legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: Rgb,
}

/// Legend shown above the chart. Annual and quarterly reports share a swatch.
pub fn legend() -> [LegendEntry; 4] {
    [
        LegendEntry {
            label: "10-K/10-Q",
            color: FormCategory::AnnualReport.color(),
        },
        LegendEntry {
            label: "8-K",
            color: FormCategory::CurrentReport.color(),
        },
        LegendEntry {
            label: "Form 4",
            color: FormCategory::InsiderTransaction.color(),
        },
        LegendEntry {
            label: "Other",
            color: FormCategory::News.color(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_forms() {
        assert_eq!(FormCategory::classify("10-K"), FormCategory::AnnualReport);
        assert_eq!(FormCategory::classify("10-K/A"), FormCategory::AnnualReport);
        assert_eq!(FormCategory::classify("10-Q"), FormCategory::QuarterlyReport);
        assert_eq!(FormCategory::classify("8-K"), FormCategory::CurrentReport);
        assert_eq!(FormCategory::classify("4"), FormCategory::InsiderTransaction);
        assert_eq!(FormCategory::classify(" 4 "), FormCategory::InsiderTransaction);
    }

    #[test]
    fn unknown_forms_are_news() {
        assert_eq!(FormCategory::classify("DEF 14A"), FormCategory::News);
        assert_eq!(FormCategory::classify("S-1"), FormCategory::News);
        assert_eq!(FormCategory::classify("424B5"), FormCategory::News);
        assert_eq!(FormCategory::classify(""), FormCategory::News);
    }

    #[test]
    fn ord_matches_rank() {
        let mut sorted = FormCategory::ALL.to_vec();
        sorted.sort();
        let ranks: Vec<u8> = sorted.iter().map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn hex_roundtrip() {
        let c = FormCategory::CurrentReport.color();
        assert_eq!(c.to_hex(), "#eab308");
        assert_eq!(Rgb::from_hex("#eab308"), Some(c));
        assert_eq!(Rgb::from_hex("eab308"), Some(c));
        assert_eq!(Rgb::from_hex("#eab3"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn descriptions_fall_back_to_label() {
        assert_eq!(form_description("10-K"), "Annual Report");
        assert_eq!(form_description("SC 13D"), "Ownership Report");
        assert_eq!(form_description("424B5"), "424B5");
    }

    #[test]
    fn annual_and_quarterly_share_legend_color() {
        assert_eq!(
            FormCategory::AnnualReport.color(),
            FormCategory::QuarterlyReport.color()
        );
        assert_eq!(legend()[0].color, FormCategory::QuarterlyReport.color());
    }
}
