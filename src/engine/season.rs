use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Growing season used for regional planting decisions in Bangladesh
///
/// The year is split by calendar month alone:
/// - Kharif 1: March to June
/// - Kharif 2: July to October
/// - Rabi: November to February
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Kharif1,
    Kharif2,
    Rabi,
}

impl Season {
    /// Classify a 0-based month index (0 = January)
    pub fn from_month0(month0: u32) -> Self {
        match month0 {
            2..=5 => Season::Kharif1,
            6..=9 => Season::Kharif2,
            _ => Season::Rabi,
        }
    }

    /// Parse a season label as written in the crop catalog
    ///
    /// Case, whitespace, dashes and underscores are ignored, so
    /// "Kharif 1", "kharif-1" and "KHARIF1" all resolve to `Kharif1`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "kharif1" => Some(Season::Kharif1),
            "kharif2" => Some(Season::Kharif2),
            "rabi" => Some(Season::Rabi),
            _ => None,
        }
    }

    /// Label used by the crop catalog
    pub fn label(&self) -> &'static str {
        match self {
            Season::Kharif1 => "Kharif 1",
            Season::Kharif2 => "Kharif 2",
            Season::Rabi => "Rabi",
        }
    }

    /// Bengali label shown on the farmer dashboard
    pub fn bengali_label(&self) -> &'static str {
        match self {
            Season::Kharif1 => "খরিপ-১",
            Season::Kharif2 => "খরিপ-২",
            Season::Rabi => "রবি",
        }
    }
}

/// Season in effect at `now`
pub fn classify_season(now: DateTime<Utc>) -> Season {
    Season::from_month0(now.month0())
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Season {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Season {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Season::parse(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown season '{label}'")))
    }
}
