use super::ValidationError;
use crate::identity::ProfileAttributes;

const MAX_NAME_CHARS: usize = 100;

/// Both names are required; length is counted in characters, not bytes.
pub fn validate_profile(profile: &ProfileAttributes) -> Result<(), ValidationError> {
    check_name("First name", &profile.first_name)?;
    check_name("Last name", &profile.last_name)
}

fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::NameEmpty { field })
    } else if value.chars().count() > MAX_NAME_CHARS {
        Err(ValidationError::NameTooLong {
            field,
            max: MAX_NAME_CHARS,
        })
    } else {
        Ok(())
    }
}
