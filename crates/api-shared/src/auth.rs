/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the header is missing, uses a different scheme, or
/// carries an empty token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
