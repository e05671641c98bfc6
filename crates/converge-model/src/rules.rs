//! Rule identifiers and SDTM length limits.
//!
//! Rule ids follow the P21 id space. The set below is the closed set the
//! classifier and fixer tables are built for; external evaluators may emit
//! other ids, which classify as needs-human by default.

/// Value not found in a non-extensible codelist.
pub const CT_NON_EXTENSIBLE: &str = "CT2001";
/// Value not found in an extensible codelist.
pub const CT_EXTENSIBLE: &str = "CT2002";
/// DOMAIN column missing or disagreeing with the domain code.
pub const DOMAIN_IDENTIFIER: &str = "SD0063";
/// Required variable not present in the dataset.
pub const REQUIRED_PRESENCE: &str = "SD0056";
/// Variable name exceeds the 8-character transport limit.
pub const NAME_LENGTH: &str = "SD1076";
/// Variable label exceeds the 40-character transport limit.
pub const LABEL_LENGTH: &str = "SD1077";
/// Character value exceeds its defined maximum length.
pub const VALUE_LENGTH: &str = "SD1078";
/// --DTC value is not valid ISO 8601.
pub const DATETIME_FORMAT: &str = "SD0003";
/// Non-ASCII character in a character variable.
pub const NON_ASCII: &str = "SD1201";
/// Dataset file name differs from the lowercase domain code.
pub const FILE_NAMING: &str = "SD1121";
/// --STDTC is after --ENDTC on the same row.
pub const START_END_ORDER: &str = "SD1022";
/// USUBJID value not present in the DM domain.
pub const SUBJECT_REFERENCE: &str = "SD1084";

/// Maximum length for SAS V5 transport file character values.
pub const SAS_V5_MAX_LENGTH: usize = 200;
/// Maximum length for variable names in SAS V5 transport files.
pub const NAME_MAX_LENGTH: usize = 8;
/// Maximum length for variable labels in SAS V5 transport files.
pub const LABEL_MAX_LENGTH: usize = 40;
