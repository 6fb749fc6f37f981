use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Applicant, officer, and manager exports share one layout.
#[derive(Debug, Deserialize)]
pub(crate) struct UserRow {
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "NRIC")]
    pub(crate) nric: String,
    #[serde(rename = "Age")]
    pub(crate) age: String,
    #[serde(rename = "Marital Status")]
    pub(crate) marital_status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRow {
    #[serde(rename = "Project Name")]
    pub(crate) name: String,
    #[serde(rename = "Neighborhood", alias = "Neighbourhood")]
    pub(crate) neighbourhood: String,
    #[serde(rename = "Type 1")]
    pub(crate) type_1: String,
    #[serde(rename = "Number of units for Type 1")]
    pub(crate) units_1: String,
    #[serde(rename = "Selling price for Type 1")]
    pub(crate) price_1: String,
    #[serde(rename = "Type 2", default, deserialize_with = "empty_string_as_none")]
    pub(crate) type_2: Option<String>,
    #[serde(
        rename = "Number of units for Type 2",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) units_2: Option<String>,
    #[serde(
        rename = "Selling price for Type 2",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) price_2: Option<String>,
    #[serde(rename = "Application opening date")]
    pub(crate) opening: String,
    #[serde(rename = "Application closing date")]
    pub(crate) closing: String,
    #[serde(rename = "Manager")]
    pub(crate) manager: String,
    #[serde(rename = "Officer Slot")]
    pub(crate) officer_slots: String,
    #[serde(rename = "Officer", default, deserialize_with = "empty_string_as_none")]
    pub(crate) officers: Option<String>,
    #[serde(rename = "Visibility", default, deserialize_with = "empty_string_as_none")]
    pub(crate) visibility: Option<String>,
}

impl ProjectRow {
    pub(crate) fn officer_names(&self) -> Vec<String> {
        self.officers
            .as_deref()
            .map(|cell| {
                cell.split([',', ';'])
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Exports arrive either comma- or tab-separated; the header line decides.
pub(crate) fn detect_delimiter(raw: &str) -> u8 {
    let header = raw.lines().next().unwrap_or_default();
    if header.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

pub(crate) fn parse_rows<T>(raw: &str) -> Result<Vec<T>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(raw))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    reader.deserialize::<T>().collect()
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

pub(crate) fn parse_visibility(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "visible" | "1" => Some(true),
        "false" | "no" | "off" | "hidden" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_header_selects_tab_delimiter() {
        assert_eq!(detect_delimiter("Name\tNRIC\tAge\n"), b'\t');
        assert_eq!(detect_delimiter("Name,NRIC,Age\n"), b',');
    }

    #[test]
    fn parses_iso_and_day_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 15).expect("valid");
        assert_eq!(parse_date("2025-02-15"), Some(expected));
        assert_eq!(parse_date("15/2/2025"), Some(expected));
        assert_eq!(parse_date("2/15/2025"), None);
        assert_eq!(parse_date("  "), None);
    }

    #[test]
    fn officer_cell_splits_on_commas() {
        let rows: Vec<ProjectRow> = parse_rows(
            "Project Name,Neighborhood,Type 1,Number of units for Type 1,Selling price for Type 1,Type 2,Number of units for Type 2,Selling price for Type 2,Application opening date,Application closing date,Manager,Officer Slot,Officer\n\
             Acacia Breeze,Yishun,2-Room,2,350000,3-Room,3,450000,2025-02-15,2025-03-20,Jessica,3,\"Daniel, Emily\"\n",
        )
        .expect("rows parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].officer_names(), vec!["Daniel", "Emily"]);
        assert!(rows[0].visibility.is_none());
    }
}
