//! Application constants for the BRFSS decoder
//!
//! This module holds the literal markers the codebook parser relies on,
//! together with default values used by the configuration layer.

// =============================================================================
// Codebook Markers
// =============================================================================

/// Revision of the marker table below. Bump when the codebook layout changes.
pub const CODEBOOK_FORMAT_VERSION: u32 = 1;

/// Literal text the codebook parser matches against.
///
/// The codebook has no formal grammar, so these strings are effectively its
/// wire format. Any change in the published report layout shows up here first.
pub mod markers {
    /// Column header line that opens a value/label listing
    pub const VALUE_TABLE_HEADER: &str = "Value Value Label";

    /// Metadata line that closes a field's listing
    pub const TYPE: &str = " Type: ";

    /// Field whose values are redacted from the public release
    pub const HIDDEN: &str = "HIDDEN Data not displayed";

    /// Line carrying the field's column location and variable name
    pub const COLUMN: &str = "Column:";

    /// Prefix of the character location text on a column line
    pub const COLUMN_PREFIX: &str = "Column: ";

    /// Suffix that ends the character location text
    pub const SAS_VARIABLE_SUFFIX: &str = " SAS Variable Name";

    /// Prefix of the variable name on a column line
    pub const SAS_VARIABLE_PREFIX: &str = "SAS Variable Name: ";

    /// Start of a (possibly multi-line) field description
    pub const DESCRIPTION: &str = "Description: ";

    /// Missing-answer row, always listed last
    pub const BLANK: &str = "BLANK";

    /// Skip-pattern instruction appended to labels
    pub const GO_TO: &str = "Go to";

    /// Described numeric sub-range rather than an enumerable code
    pub const NUMBER_OF: &str = "Number of";

    /// Start of a notes paragraph inside a listing
    pub const NOTES: &str = "Notes:";

    /// Explanatory sentence inside a listing
    pub const IS_CODED: &str = "is coded ";

    /// Column header fragments left on their own line by the PDF conversion
    pub const WEIGHTED: &str = "Weighted";
    pub const PERCENTAGE: &str = "Percentage";
}

/// Key stored for the missing-answer row (the record holds spaces)
pub const BLANK_KEY: &str = " ";

/// Label stored for the missing-answer row
pub const BLANK_LABEL: &str = "Not asked or Missing";

/// Trailing numeric columns on a value row: frequency, percentage, weighted percentage
pub const TRAILING_STAT_COLUMNS: usize = 3;

// =============================================================================
// Defaults
// =============================================================================

/// Running header printed at the top of every codebook page
pub const DEFAULT_PAGE_HEADER: &str = "BEHAVIORAL RISK FACTOR SURVEILLANCE SYSTEM";

/// Position table delimiter
pub const DEFAULT_TABLE_SEPARATOR: u8 = b'\t';

/// Position table column names
pub mod position_columns {
    pub const VARIABLE_NAME: &str = "Variable Name";
    pub const STARTING_COLUMN: &str = "Starting Column";
    pub const FIELD_LENGTH: &str = "Field Length";
}

/// Fields decoded when none are requested explicitly
///
/// Cancer screening, HPV, education, income and healthcare access questions,
/// plus the state code.
pub const DEFAULT_FIELDS_OF_INTEREST: &[&str] = &[
    "_STATE", // State FIPS code
    // Breast and cervical cancer screening
    "HADMAM", "HOWLONG", "PROFEXAM", "LENGEXAM", "HADPAP2", "LASTPAP2", "HADHYST2",
    // Prostate cancer screening
    "PCPSAAD2", "PCPSADI1", "PCPSARE1", "PSATEST1", "PSATIME", "PCPSARS1",
    // Colorectal cancer screening
    "BLDSTOOL", "LSTBLDS3", "HADSIGM3", "HADSGCO1", "LASTSIG3",
    // HPV testing and vaccination
    "HPVTEST", "HPLSTTST", "HPVADVC2", "HPVADSHT",
    // Education and income
    "EDUCA", "_IMPEDUC", "INCOME2", "_INCOMG",
    // Healthcare access
    "HLTHPLN1", "PERSDOC2", "MEDCOST", "CHECKUP1", "MEDICARE", "HLTHCVR1", "DELAYMED",
    "DLYOTHER", "NOCOV121", "LSTCOVRG", "DRVISITS", "MEDSCOST", "CARERCVD", "MEDBILL1",
];

/// Suffix appended to the records file stem for the default output path
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_decoded.csv";
