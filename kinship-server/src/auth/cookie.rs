use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

/// Cookie carrying the bearer credential
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Scheme marker stored in front of the token
pub const BEARER_PREFIX: &str = "Bearer ";

/// `Set-Cookie` value that stores `token` for `max_age`
pub fn access_token_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{}=\"{}{}\"; HttpOnly; Max-Age={}; Path=/; SameSite=Lax",
        ACCESS_TOKEN_COOKIE,
        BEARER_PREFIX,
        token,
        max_age.num_seconds().max(0)
    )
}

/// `Set-Cookie` value that removes the access token
pub fn clear_access_token_cookie() -> String {
    format!(
        "{}=\"\"; HttpOnly; Max-Age=0; Path=/; SameSite=Lax",
        ACCESS_TOKEN_COOKIE
    )
}

/// Find a cookie by name across every `Cookie` header
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// The raw credential for this request: the `access_token` cookie, falling
/// back to the `Authorization` header.
pub fn request_credential(headers: &HeaderMap) -> Option<&str> {
    read_cookie(headers, ACCESS_TOKEN_COOKIE)
        .filter(|value| !value.is_empty() && *value != "\"\"")
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v: &HeaderValue| v.to_str().ok())
        })
}

/// Remove surrounding quotes and the `Bearer ` marker, leaving the bare token
pub fn strip_scheme(credential: &str) -> &str {
    let unquoted = credential
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or_else(|| credential.trim());
    unquoted.strip_prefix(BEARER_PREFIX).unwrap_or(unquoted).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_access_token_cookie_format() {
        let cookie = access_token_cookie("abc.def.ghi", Duration::minutes(30));
        assert_eq!(
            cookie,
            "access_token=\"Bearer abc.def.ghi\"; HttpOnly; Max-Age=1800; Path=/; SameSite=Lax"
        );
        assert!(clear_access_token_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie_among_others() {
        let map = headers(&[
            (header::COOKIE, "theme=dark"),
            (header::COOKIE, "foo=bar; access_token=\"Bearer xyz\""),
        ]);
        assert_eq!(read_cookie(&map, "theme"), Some("dark"));
        assert_eq!(read_cookie(&map, ACCESS_TOKEN_COOKIE), Some("\"Bearer xyz\""));
        assert_eq!(read_cookie(&map, "missing"), None);
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("\"Bearer abc\""), "abc");
        assert_eq!(strip_scheme("Bearer abc"), "abc");
        assert_eq!(strip_scheme("abc"), "abc");
        assert_eq!(strip_scheme("\"\""), "");
    }

    #[test]
    fn test_credential_prefers_cookie() {
        let map = headers(&[
            (header::COOKIE, "access_token=\"Bearer from-cookie\""),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(request_credential(&map), Some("\"Bearer from-cookie\""));

        let map = headers(&[(header::AUTHORIZATION, "Bearer from-header")]);
        assert_eq!(request_credential(&map), Some("Bearer from-header"));

        let map = headers(&[(header::COOKIE, "access_token=\"\"")]);
        assert_eq!(request_credential(&map), None);
    }
}
