use std::collections::HashSet;

use ladle_types::api::IngredientLineRequest;

use crate::error::{ApiError, ApiResult};

/// Usernames that collide with routing ("/users/me") or account actions.
const RESERVED_USERNAMES: &[&str] = &["me", "set_password"];

/// Tag colors must be `#RRGGBB` with a mandatory leading `#`.
pub fn hex_color(value: &str) -> ApiResult<()> {
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| ApiError::Validation("color must be a #RRGGBB hex code".into()))?;

    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "color must be a #RRGGBB hex code".into(),
        ))
    }
}

pub fn username(value: &str) -> ApiResult<()> {
    if value.is_empty() || value.len() > 150 {
        return Err(ApiError::Validation(
            "username must be 1-150 characters".into(),
        ));
    }

    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if !allowed {
        return Err(ApiError::Validation(
            "username may only contain letters, digits and _.@+-".into(),
        ));
    }

    let lowered = value.to_lowercase();
    if RESERVED_USERNAMES.contains(&lowered.as_str()) {
        return Err(ApiError::Validation(format!(
            "username '{value}' is reserved"
        )));
    }

    Ok(())
}

pub fn password(value: &str) -> ApiResult<()> {
    if value.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

pub fn cooking_time(minutes: i64) -> ApiResult<()> {
    if minutes <= 0 {
        return Err(ApiError::Validation(
            "cooking_time must be positive".into(),
        ));
    }
    Ok(())
}

/// Shape rules for a submitted line set: non-empty, every amount positive,
/// no ingredient listed twice. Reference existence is checked by the storage
/// layer inside the write transaction.
pub fn ingredient_lines(lines: &[IngredientLineRequest]) -> ApiResult<()> {
    if lines.is_empty() {
        return Err(ApiError::Validation(
            "recipe needs at least one ingredient".into(),
        ));
    }

    let mut seen = HashSet::new();
    for line in lines {
        if line.amount <= 0 {
            return Err(ApiError::Validation("amount must be positive".into()));
        }
        if !seen.insert(line.id) {
            return Err(ApiError::Validation(format!(
                "duplicate ingredient in recipe: {}",
                line.id
            )));
        }
    }

    Ok(())
}

pub fn tag_set(tags: &[uuid::Uuid]) -> ApiResult<()> {
    if tags.is_empty() {
        return Err(ApiError::Validation("recipe needs at least one tag".into()));
    }

    let unique: HashSet<_> = tags.iter().collect();
    if unique.len() != tags.len() {
        return Err(ApiError::Validation("duplicate tag in recipe".into()));
    }

    Ok(())
}

pub fn recipe_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("recipe name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn line(id: Uuid, amount: i64) -> IngredientLineRequest {
        IngredientLineRequest { id, amount }
    }

    #[test]
    fn hex_color_requires_leading_hash() {
        assert!(hex_color("#49B64E").is_ok());
        assert!(hex_color("#ffffff").is_ok());
        assert!(hex_color("49B64E").is_err());
        assert!(hex_color("#49B64").is_err());
        assert!(hex_color("#49B64EF").is_err());
        assert!(hex_color("#49B64G").is_err());
        assert!(hex_color("").is_err());
    }

    #[test]
    fn reserved_usernames_rejected_case_insensitively() {
        assert!(username("me").is_err());
        assert!(username("ME").is_err());
        assert!(username("Me").is_err());
        assert!(username("set_password").is_err());
        assert!(username("SET_PASSWORD").is_err());
        assert!(username("melissa").is_ok());
    }

    #[test]
    fn username_charset_and_length() {
        assert!(username("alice.smith@example+1-2_3").is_ok());
        assert!(username("ab").is_ok());
        assert!(username("").is_err());
        assert!(username(&"x".repeat(151)).is_err());
        assert!(username("has space").is_err());
        assert!(username("caf\u{e9}").is_err());
    }

    #[test]
    fn lines_reject_duplicates_and_nonpositive_amounts() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(ingredient_lines(&[]).is_err());
        assert!(ingredient_lines(&[line(a, 0)]).is_err());
        assert!(ingredient_lines(&[line(a, -5)]).is_err());
        assert!(ingredient_lines(&[line(a, 200), line(a, 100)]).is_err());
        assert!(ingredient_lines(&[line(a, 200), line(b, 2)]).is_ok());
    }

    #[test]
    fn tag_set_rejects_empty_and_duplicates() {
        let t = Uuid::new_v4();
        assert!(tag_set(&[]).is_err());
        assert!(tag_set(&[t, t]).is_err());
        assert!(tag_set(&[t, Uuid::new_v4()]).is_ok());
    }

    #[test]
    fn cooking_time_must_be_positive() {
        assert!(cooking_time(1).is_ok());
        assert!(cooking_time(0).is_err());
        assert!(cooking_time(-10).is_err());
    }
}
