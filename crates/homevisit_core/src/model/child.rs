//! Child record read from the externally maintained child table.
//!
//! # Responsibility
//! - Project one child-table row into a typed record.
//! - Translate the `Assigned_Nurse` sentinel spellings to `Option<String>`.
//! - Render the plain-text profile handed to clipboard and PDF exporters.
//!
//! # Invariants
//! - `assigned_nurse` is `None` for blank cells and NA spellings (`None`, `N/A`,
//!   `NA`, `nan`, `NULL`, `#N/A`, ...) in any case.
//! - `date_of_birth` keeps the raw cell text; parsing is on demand.

use crate::model::columns::{
    ASSIGNED_NURSE, CHILD_DATE_OF_BIRTH, CITY, MOBILE, MOTHER_FIRST_NAME, MOTHER_LAST_NAME, PHONE,
    STATE, STREET, ZIP,
};
use crate::model::identity::ChildIdentity;
use crate::store::Table;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Nurse text shown for a child without an assignment.
pub const UNASSIGNED_SENTINEL: &str = "None";

// Lower-cased missing-value spellings written by spreadsheet and dataframe exports.
const UNASSIGNED_SPELLINGS: &[&str] = &[
    "", "none", "n/a", "na", "nan", "-nan", "null", "<na>", "#n/a", "#n/a n/a", "#na",
    "-1.#ind", "-1.#qnan", "1.#ind", "1.#qnan",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One row of the child table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub identity: ChildIdentity,
    pub mother_first_name: String,
    pub mother_last_name: String,
    /// Raw `Child_Date_of_Birth` cell.
    pub date_of_birth: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub mobile: String,
    pub assigned_nurse: Option<String>,
}

impl ChildRecord {
    pub fn from_row(table: &Table, row: &[String]) -> Self {
        Self {
            identity: ChildIdentity::from_row(table, row),
            mother_first_name: table.cell(row, MOTHER_FIRST_NAME).to_string(),
            mother_last_name: table.cell(row, MOTHER_LAST_NAME).to_string(),
            date_of_birth: table.cell(row, CHILD_DATE_OF_BIRTH).to_string(),
            street: table.cell(row, STREET).to_string(),
            city: table.cell(row, CITY).to_string(),
            state: table.cell(row, STATE).to_string(),
            zip: table.cell(row, ZIP).to_string(),
            phone: table.cell(row, PHONE).to_string(),
            mobile: table.cell(row, MOBILE).to_string(),
            assigned_nurse: parse_assigned_nurse(table.cell(row, ASSIGNED_NURSE)),
        }
    }

    /// Parses `date_of_birth`; `None` when the cell is not a recognized date.
    pub fn parsed_date_of_birth(&self) -> Option<NaiveDate> {
        parse_date(&self.date_of_birth)
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_nurse.is_some()
    }

    pub fn profile_title(&self) -> String {
        format!("{} Profile", self.identity.display_name())
    }

    /// Plain-text profile sections: mother, child, address (when a street is
    /// known) and assigned nurse.
    pub fn profile_text(&self) -> String {
        let mut text = format!(
            "Mother's Information\n\
             Mother ID: {}\n\
             First Name: {}\n\
             Last Name: {}\n\n\
             Child's Information\n\
             First Name: {}\n\
             Last Name: {}\n\
             Date of Birth: {}\n",
            self.identity.guardian_id,
            self.mother_first_name,
            self.mother_last_name,
            self.identity.first_name,
            self.identity.last_name,
            self.date_of_birth,
        );
        if !self.street.trim().is_empty() {
            text.push_str(&format!(
                "\nAddress & Contact Information\n\
                 Street: {}\n\
                 City: {}\n\
                 State: {}\n\
                 ZIP: {}\n\
                 Phone #: {}\n\
                 Mobile #: {}\n",
                self.street, self.city, self.state, self.zip, self.phone, self.mobile,
            ));
        }
        text.push_str(&format!(
            "\nAssigned Nurse\nName: {}\n",
            self.assigned_nurse.as_deref().unwrap_or(UNASSIGNED_SENTINEL)
        ));
        text
    }
}

/// Maps an `Assigned_Nurse` cell to an optional nurse name.
pub fn parse_assigned_nurse(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let folded = trimmed.to_lowercase();
    if UNASSIGNED_SPELLINGS.contains(&folded.as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a date-of-birth cell in one of the accepted spreadsheet spellings.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|value| value.date())
        })
}

#[cfg(test)]
mod tests {
    use super::{parse_assigned_nurse, parse_date, ChildRecord};
    use crate::model::columns::{ASSIGNED_NURSE, CHILD_FIRST_NAME, CHILD_LAST_NAME, MOTHER_ID};
    use crate::store::Table;
    use chrono::NaiveDate;

    #[test]
    fn sentinel_spellings_mean_unassigned() {
        for raw in [
            "", "  ", "None", "NONE", "n/a", "NaN", "NA", "NULL", "#N/A", "<NA>", "-nan",
        ] {
            assert_eq!(parse_assigned_nurse(raw), None, "{raw:?}");
        }
        assert_eq!(
            parse_assigned_nurse("  Nurse Joy "),
            Some("Nurse Joy".to_string())
        );
    }

    #[test]
    fn parse_date_accepts_common_spreadsheet_spellings() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 9);
        assert_eq!(parse_date("2021-03-09"), expected);
        assert_eq!(parse_date("2021/03/09"), expected);
        assert_eq!(parse_date("03/09/2021"), expected);
        assert_eq!(parse_date("2021-03-09 00:00:00"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn profile_text_skips_address_without_street() {
        let mut table = Table::with_columns([MOTHER_ID, CHILD_FIRST_NAME, CHILD_LAST_NAME]);
        table.push_named(&[
            (MOTHER_ID, "117"),
            (CHILD_FIRST_NAME, "Ana"),
            (CHILD_LAST_NAME, "Lee"),
            (ASSIGNED_NURSE, "nan"),
        ]);
        let record = ChildRecord::from_row(&table, &table.rows[0]);

        assert_eq!(record.profile_title(), "Ana Lee Profile");
        let text = record.profile_text();
        assert!(text.contains("Mother ID: 117"));
        assert!(!text.contains("Street:"));
        assert!(text.ends_with("Name: None\n"));
    }
}
