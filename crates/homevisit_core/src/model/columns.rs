//! Column names shared with the spreadsheet files.

pub const MOTHER_ID: &str = "Mother_ID";
pub const MOTHER_FIRST_NAME: &str = "Mother_First_Name";
pub const MOTHER_LAST_NAME: &str = "Mother_Last_Name";
pub const CHILD_FIRST_NAME: &str = "Child_First_Name";
pub const CHILD_LAST_NAME: &str = "Child_Last_Name";
pub const CHILD_DATE_OF_BIRTH: &str = "Child_Date_of_Birth";
pub const STREET: &str = "Street";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const ZIP: &str = "ZIP";
pub const PHONE: &str = "Phone_#";
pub const MOBILE: &str = "Mobile_#";
pub const ASSIGNED_NURSE: &str = "Assigned_Nurse";

pub const NURSE_NAME: &str = "Nurse_Name";
pub const VISIT_TIME: &str = "Visit_Time";
pub const NOTES: &str = "Notes";

/// Header written when the visit log file is created.
pub const VISIT_LOG_COLUMNS: &[&str] = &[
    MOTHER_ID,
    CHILD_FIRST_NAME,
    CHILD_LAST_NAME,
    NURSE_NAME,
    VISIT_TIME,
];

/// Header written when the notes file is created.
pub const NOTES_COLUMNS: &[&str] = &[MOTHER_ID, CHILD_FIRST_NAME, CHILD_LAST_NAME, NOTES];

/// Columns every child table must carry.
pub const CHILD_IDENTITY_COLUMNS: &[&str] = &[MOTHER_ID, CHILD_FIRST_NAME, CHILD_LAST_NAME];
