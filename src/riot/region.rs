use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Platform routing values for the Riot API (Summoner-v4, League-v4).
///
/// A community stores exactly one of these; roster entries copy it at insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    BR1,
    LA1,
    LA2,
    NA1,
    JP1,
    KR,
    EUN1,
    EUW1,
    ME1,
    RU,
    TR1,
    OC1,
    PH2,
    SG2,
    TH2,
    TW2,
    VN2,
}

impl Region {
    #[cfg(test)]
    pub const ALL: [Region; 17] = [
        Self::BR1,
        Self::LA1,
        Self::LA2,
        Self::NA1,
        Self::JP1,
        Self::KR,
        Self::EUN1,
        Self::EUW1,
        Self::ME1,
        Self::RU,
        Self::TR1,
        Self::OC1,
        Self::PH2,
        Self::SG2,
        Self::TH2,
        Self::TW2,
        Self::VN2,
    ];

    pub fn base_url(&self) -> String {
        format!("https://{}.api.riotgames.com", self.as_str())
    }

    /// Platform code, also the persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BR1 => "br1",
            Self::LA1 => "la1",
            Self::LA2 => "la2",
            Self::NA1 => "na1",
            Self::JP1 => "jp1",
            Self::KR => "kr",
            Self::EUN1 => "eun1",
            Self::EUW1 => "euw1",
            Self::ME1 => "me1",
            Self::RU => "ru",
            Self::TR1 => "tr1",
            Self::OC1 => "oc1",
            Self::PH2 => "ph2",
            Self::SG2 => "sg2",
            Self::TH2 => "th2",
            Self::TW2 => "tw2",
            Self::VN2 => "vn2",
        }
    }

    /// Short label players use, e.g. `EUNE`.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::BR1 => "BR",
            Self::LA1 => "LAN",
            Self::LA2 => "LAS",
            Self::NA1 => "NA",
            Self::JP1 => "JP",
            Self::KR => "KR",
            Self::EUN1 => "EUNE",
            Self::EUW1 => "EUW",
            Self::ME1 => "ME",
            Self::RU => "RU",
            Self::TR1 => "TR",
            Self::OC1 => "OCE",
            Self::PH2 => "PH",
            Self::SG2 => "SG",
            Self::TH2 => "TH",
            Self::TW2 => "TW",
            Self::VN2 => "VN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BR1 => "Brazil",
            Self::LA1 => "Latin America North",
            Self::LA2 => "Latin America South",
            Self::NA1 => "North America",
            Self::JP1 => "Japan",
            Self::KR => "Korea",
            Self::EUN1 => "Europe Nordic & East",
            Self::EUW1 => "Europe West",
            Self::ME1 => "Middle East",
            Self::RU => "Russia",
            Self::TR1 => "Turkey",
            Self::OC1 => "Oceania",
            Self::PH2 => "Philippines",
            Self::SG2 => "Singapore",
            Self::TH2 => "Thailand",
            Self::TW2 => "Taiwan",
            Self::VN2 => "Vietnam",
        }
    }
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BR" | "BR1" => Ok(Self::BR1),
            "LAN" | "LA1" => Ok(Self::LA1),
            "LAS" | "LA2" => Ok(Self::LA2),
            "NA" | "NA1" => Ok(Self::NA1),
            "JP" | "JP1" => Ok(Self::JP1),
            "KR" => Ok(Self::KR),
            "EUNE" | "EUN" | "EUN1" => Ok(Self::EUN1),
            "EUW" | "EUW1" => Ok(Self::EUW1),
            "ME" | "ME1" => Ok(Self::ME1),
            "RU" => Ok(Self::RU),
            "TR" | "TR1" => Ok(Self::TR1),
            "OCE" | "OC" | "OC1" => Ok(Self::OC1),
            "PH" | "PH2" => Ok(Self::PH2),
            "SG" | "SG2" => Ok(Self::SG2),
            "TH" | "TH2" => Ok(Self::TH2),
            "TW" | "TW2" => Ok(Self::TW2),
            "VN" | "VN2" => Ok(Self::VN2),
            _ => Err(AppError::InvalidRegion(s.to_string())),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
