use sha2::{Digest, Sha256};

/// Characters allowed in a password besides ASCII letters and digits.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Hash a password into the opaque key stored on the account.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalize a full name: trim, collapse whitespace and title-case each word.
pub fn normalize_full_name(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Check a (normalized) full name: 4-255 characters, letters and spaces only.
pub fn validate_full_name(full_name: &str) -> Result<(), &'static str> {
    let len = full_name.chars().count();
    if !(4..=255).contains(&len) {
        return Err("Full name must be between 4 and 255 characters.");
    }
    if !full_name
        .chars()
        .all(|c| c == ' ' || c.is_alphabetic())
    {
        return Err("Full name must contain only letters and spaces.");
    }
    Ok(())
}

/// Check a username: 3-20 alphabetic characters.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) || !username.chars().all(char::is_alphabetic) {
        return Err("Username must be 3-20 characters and contain only letters.");
    }
    Ok(())
}

/// Check password complexity.
///
/// 8-33 characters from letters, digits and [`PASSWORD_SPECIALS`], with at
/// least one lowercase letter, one uppercase letter, one digit and one special.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password must not be empty.");
    }

    let is_special = |c: char| PASSWORD_SPECIALS.contains(c);
    let len = password.chars().count();
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_special(c));

    if !(8..=33).contains(&len)
        || !allowed
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_digit())
        || !password.chars().any(is_special)
    {
        return Err(
            "Password must be 8-33 characters long and contain at least one uppercase letter, \
             one lowercase letter, one number, and one special character (@$!%*?&).",
        );
    }
    Ok(())
}
