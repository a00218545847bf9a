use std::fmt;

use serde::{Deserialize, Serialize};

/// Language used for weekday and month names on reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportLocale {
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl ReportLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportLocale::PtBr => "pt-BR",
            ReportLocale::EnUs => "en-US",
        }
    }
}

impl fmt::Display for ReportLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportLocale {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pt-BR" | "pt-br" | "pt_BR" => Ok(ReportLocale::PtBr),
            "en-US" | "en-us" | "en_US" => Ok(ReportLocale::EnUs),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClockSettings {
    /// IANA zone used to derive the local calendar day of a punch.
    pub timezone: String,
    pub locale: ReportLocale,
    pub updated_at: String,
}
