//! Fixed vocabularies the engine checks records against.

/// Accepted `subject.sex` values. Matching is exact and case-sensitive.
pub const SEX_ACRONYMS: [&str; 4] = ["M", "F", "U", "O"];

/// Suggested file name handed to the save collaborator.
pub const DEFAULT_FILE_NAME: &str = "metaData.yml";

/// Schema pattern for "non-empty, not all whitespace" strings.
pub const NON_BLANK_PATTERN: &str = r"^(.|\s)*\S(.|\s)*$";

/// Older schema revisions spell the non-blank rule this way.
pub const LEGACY_NON_BLANK_PATTERN: &str = "^.+$";

pub fn is_recognized_sex(value: &str) -> bool {
    SEX_ACRONYMS.contains(&value)
}
