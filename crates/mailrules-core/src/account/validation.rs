//! Validation errors shared by the account and rule models.

/// Minimum length of a raw account password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Allowed length range for a rule name, in characters.
pub const RULE_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// Maximum length of a rule description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Maximum number of criteria per rule.
pub const MAX_CRITERIA: usize = 10;

/// A single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Account name is empty.
    EmptyName,
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Password is empty.
    EmptyPassword,
    /// Password is shorter than [`MIN_PASSWORD_LEN`].
    PasswordTooShort,
    /// Server host is empty.
    EmptyHost,
    /// Server port is outside 1-65535.
    InvalidPort,
    /// Protocol is not one of smtp, imap, pop3.
    InvalidProtocol,
    /// Rule name is empty.
    EmptyRuleName,
    /// Rule name length is outside [`RULE_NAME_LEN`].
    RuleNameLength,
    /// Rule description is empty.
    EmptyDescription,
    /// Rule description is longer than [`MAX_DESCRIPTION_LEN`].
    DescriptionTooLong,
    /// Rule has no criteria.
    MissingCriteria,
    /// Rule has more than [`MAX_CRITERIA`] criteria.
    TooManyCriteria,
    /// A criterion value is empty.
    EmptyCriterionValue,
    /// Move rule source folder is empty.
    EmptySourceFolder,
    /// Move rule target folder is empty.
    EmptyTargetFolder,
    /// Folder configuration is missing for a MOVE rule.
    MissingMoveConfig,
    /// Folder configuration was given for a rule that is not a MOVE rule.
    UnexpectedMoveConfig,
    /// Requested action differs from the stored rule's action.
    ActionMismatch,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "Name is required",
            Self::EmptyEmail => "Email is required",
            Self::InvalidEmail => "Invalid email format",
            Self::EmptyPassword => "Password is required",
            Self::PasswordTooShort => "Password must be at least 8 characters long",
            Self::EmptyHost => "Host is required",
            Self::InvalidPort => "Port must be between 1 and 65535",
            Self::InvalidProtocol => "Protocol must be one of: smtp, imap, pop3",
            Self::EmptyRuleName => "Rule name is required",
            Self::RuleNameLength => "Rule name must be between 3 and 50 characters",
            Self::EmptyDescription => "Rule description is required",
            Self::DescriptionTooLong => "Rule description must not exceed 255 characters",
            Self::MissingCriteria => "At least one criteria is required",
            Self::TooManyCriteria => "Maximum of 10 criteria allowed",
            Self::EmptyCriterionValue => "Criteria value is required",
            Self::EmptySourceFolder => "Source folder is required",
            Self::EmptyTargetFolder => "Target folder is required",
            Self::MissingMoveConfig => "Move rule configuration is required for MOVE action",
            Self::UnexpectedMoveConfig => "Move rule configuration is only allowed for MOVE action",
            Self::ActionMismatch => "Rule action cannot be changed",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::EmptyRuleName | Self::RuleNameLength => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort => "password",
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::InvalidProtocol => "protocol",
            Self::EmptyDescription | Self::DescriptionTooLong => "description",
            Self::MissingCriteria | Self::TooManyCriteria => "criteria",
            Self::EmptyCriterionValue => "criteria.value",
            Self::EmptySourceFolder => "source_folder",
            Self::EmptyTargetFolder => "target_folder",
            Self::MissingMoveConfig | Self::UnexpectedMoveConfig => "move_rule",
            Self::ActionMismatch => "action",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Every validation failure found for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Returns `Ok(())` if no errors were collected.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if there is at least one.
    pub fn check(errors: Vec<ValidationError>) -> ValidationResult {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    /// Whether the given error was collected.
    #[must_use]
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    /// Iterate over the collected errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Number of collected errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no errors were collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field(), error.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Result of validating an input.
pub type ValidationResult = Result<(), ValidationErrors>;

/// Whether a string is empty or only whitespace.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Basic email validation.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    // Must contain exactly one @
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') || local.is_empty() {
        return false;
    }

    // Domain must contain at least one dot and no empty labels
    domain.contains('.') && domain.split('.').all(|part| !part.is_empty())
}
