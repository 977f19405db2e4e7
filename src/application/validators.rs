use validator::ValidateEmail;

const MAX_SLUG_LEN: usize = 50;
const MAX_TX_REF_LEN: usize = 100;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Trims and lowercases a plan slug as received from clients.
pub fn normalize_plan_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Plan slugs: 1-50 chars of lowercase ASCII letters, digits and hyphens,
/// starting and ending with a letter or digit.
pub fn is_valid_plan_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }

    let edge_ok = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let starts_ok = slug.chars().next().is_some_and(edge_ok);
    let ends_ok = slug.chars().last().is_some_and(edge_ok);

    starts_ok
        && ends_ok
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Transaction references end up in provider URL paths, so only a safe
/// alphabet is accepted.
pub fn is_valid_tx_ref(tx_ref: &str) -> bool {
    !tx_ref.is_empty()
        && tx_ref.len() <= MAX_TX_REF_LEN
        && tx_ref
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
