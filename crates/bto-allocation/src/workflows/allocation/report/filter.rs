use serde::Serialize;

use super::super::domain::{FlatType, MaritalStatus};
use super::views::ApplicationReportEntry;

/// Raised when a manager supplies a filter the report cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ReportFilterError {
    #[error("unknown report filter category '{0}'")]
    UnknownCategory(String),
    #[error("invalid value '{value}' for {category} filter")]
    InvalidValue {
        category: &'static str,
        value: String,
    },
}

/// At most one criterion applied to a manager report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "category", content = "value", rename_all = "snake_case")]
pub enum ReportFilter {
    #[default]
    None,
    MaritalStatus(MaritalStatus),
    FlatTypes(Vec<FlatType>),
    Neighbourhood(String),
    AgeRange {
        min: u8,
        max: u8,
    },
}

impl ReportFilter {
    /// Parse a category/value pair as typed at the manager prompt.
    pub fn parse(category: &str, value: &str) -> Result<Self, ReportFilterError> {
        let value = value.trim();
        match category.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "marital" | "marital_status" | "marital status" => value
                .parse::<MaritalStatus>()
                .map(Self::MaritalStatus)
                .map_err(|_| invalid("marital status", value)),
            "flat" | "flat_type" | "flat type" | "flattype" => parse_flat_types(value),
            "neighbourhood" | "neighborhood" => {
                if value.is_empty() {
                    Err(invalid("neighbourhood", value))
                } else {
                    Ok(Self::Neighbourhood(value.to_string()))
                }
            }
            "age" => parse_age_range(value),
            other => Err(ReportFilterError::UnknownCategory(other.to_string())),
        }
    }

    pub(crate) fn matches(&self, entry: &ApplicationReportEntry) -> bool {
        match self {
            Self::None => true,
            Self::MaritalStatus(status) => entry.marital_status == *status,
            Self::FlatTypes(types) => types.contains(&entry.flat_type),
            Self::Neighbourhood(name) => entry.neighbourhood.eq_ignore_ascii_case(name),
            Self::AgeRange { min, max } => (*min..=*max).contains(&entry.age),
        }
    }
}

fn invalid(category: &'static str, value: &str) -> ReportFilterError {
    ReportFilterError::InvalidValue {
        category,
        value: value.to_string(),
    }
}

fn parse_flat_types(value: &str) -> Result<ReportFilter, ReportFilterError> {
    let mut types = Vec::new();
    for token in value.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let flat_type = token
            .parse::<FlatType>()
            .map_err(|_| invalid("flat type", value))?;
        if !types.contains(&flat_type) {
            types.push(flat_type);
        }
    }
    if types.is_empty() {
        return Err(invalid("flat type", value));
    }
    Ok(ReportFilter::FlatTypes(types))
}

fn parse_age_range(value: &str) -> Result<ReportFilter, ReportFilterError> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| invalid("age", value))?;
    let min = min.trim().parse::<u8>().map_err(|_| invalid("age", value))?;
    let max = max.trim().parse::<u8>().map_err(|_| invalid("age", value))?;
    if min > max {
        return Err(invalid("age", value));
    }
    Ok(ReportFilter::AgeRange { min, max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inclusive_age_range() {
        assert_eq!(
            ReportFilter::parse("age", "30-40"),
            Ok(ReportFilter::AgeRange { min: 30, max: 40 })
        );
        assert_eq!(
            ReportFilter::parse("AGE", " 21 - 35 "),
            Ok(ReportFilter::AgeRange { min: 21, max: 35 })
        );
    }

    #[test]
    fn rejects_malformed_age_ranges() {
        for raw in ["abc", "40-30", "30-", "-5", "30-400"] {
            assert!(
                matches!(
                    ReportFilter::parse("age", raw),
                    Err(ReportFilterError::InvalidValue { category: "age", .. })
                ),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn parses_flat_type_membership_lists() {
        assert_eq!(
            ReportFilter::parse("flat_type", "2-room, 3-room, 2-Room"),
            Ok(ReportFilter::FlatTypes(vec![
                FlatType::TwoRoom,
                FlatType::ThreeRoom
            ]))
        );
        assert!(ReportFilter::parse("flat_type", "5-room").is_err());
    }

    #[test]
    fn unknown_category_is_reported() {
        assert_eq!(
            ReportFilter::parse("income", "5000"),
            Err(ReportFilterError::UnknownCategory("income".to_string()))
        );
        assert_eq!(ReportFilter::parse("none", "ignored"), Ok(ReportFilter::None));
    }
}
