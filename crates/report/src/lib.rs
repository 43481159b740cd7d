pub mod html;
pub mod human;
pub mod json;

use std::fmt;
use std::str::FromStr;

use linkprobe_core::Report;

pub use html::HtmlReport;
pub use human::HumanReport;
pub use json::JsonReport;

/// Report formats the binary can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Human,
    Json,
    Html,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Human => "human",
            ReportKind::Json => "json",
            ReportKind::Html => "html",
        }
    }

    /// Default file name for this kind.
    pub fn default_output(&self) -> String {
        match self {
            ReportKind::Human => "report.txt".to_string(),
            ReportKind::Json => "report.json".to_string(),
            ReportKind::Html => "report.html".to_string(),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(ReportKind::Human),
            "json" => Ok(ReportKind::Json),
            "html" => Ok(ReportKind::Html),
            other => Err(format!(
                "unknown report kind '{other}' (expected human, json or html)"
            )),
        }
    }
}

/// Build the reporter for a kind.
pub fn create_report(kind: ReportKind) -> Box<dyn Report> {
    match kind {
        ReportKind::Human => Box::new(HumanReport),
        ReportKind::Json => Box::new(JsonReport),
        ReportKind::Html => Box::new(HtmlReport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("human".parse::<ReportKind>().unwrap(), ReportKind::Human);
        assert_eq!("json".parse::<ReportKind>().unwrap(), ReportKind::Json);
        assert_eq!("html".parse::<ReportKind>().unwrap(), ReportKind::Html);
        assert!("xml".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_default_outputs() {
        assert_eq!(ReportKind::Human.default_output(), "report.txt");
        assert_eq!(ReportKind::Json.default_output(), "report.json");
        assert_eq!(ReportKind::Html.default_output(), "report.html");
    }
}
