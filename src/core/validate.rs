use thiserror::Error;

/// Why a proposed list name or task text was rejected. Local to the
/// client; never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required")]
    Required,
    #[error("already exists")]
    Duplicate,
}

/// Check a proposed name against the names already taken in its scope:
/// all list names for a new list, the containing list's task texts for a
/// new task.
///
/// Emptiness is decided on the trimmed value; duplicates compare the raw
/// string case-sensitively.
pub fn validate_name<'a, I>(proposed: &str, existing: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    if proposed.trim().is_empty() {
        return Err(ValidationError::Required);
    }
    if existing.into_iter().any(|name| name == proposed) {
        return Err(ValidationError::Duplicate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fresh_name() {
        assert_eq!(validate_name("Groceries", ["Primary"]), Ok(()));
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(validate_name("", []), Err(ValidationError::Required));
    }

    #[test]
    fn rejects_whitespace_only_name() {
        assert_eq!(validate_name("   \t", []), Err(ValidationError::Required));
    }

    #[test]
    fn rejects_exact_duplicate() {
        assert_eq!(
            validate_name("Primary", ["Primary", "Work"]),
            Err(ValidationError::Duplicate)
        );
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        assert_eq!(validate_name("primary", ["Primary"]), Ok(()));
    }

    #[test]
    fn required_wins_over_duplicate() {
        // An empty name never gets as far as the duplicate check.
        assert_eq!(validate_name("", [""]), Err(ValidationError::Required));
    }
}
