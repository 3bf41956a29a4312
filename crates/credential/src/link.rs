//! Verification deep links of the form `<origin>/verify/<credential-id>`.

use skillpass_core::ObjectId;
use url::Url;

/// Path segment that precedes the credential id.
pub const VERIFY_SEGMENT: &str = "verify";

/// Shareable verification URL. Trailing slashes on `origin` are ignored.
pub fn verification_url(origin: &str, id: &ObjectId) -> String {
    format!("{}/{VERIFY_SEGMENT}/{id}", origin.trim_end_matches('/'))
}

/// Credential id of a verification link, if the path is exactly
/// `/verify/<id>`.
pub fn parse_verification_link(link: &str) -> Option<ObjectId> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next(), segments.next()) {
        (Some(VERIFY_SEGMENT), Some(id), None) if !id.is_empty() => Some(ObjectId::new(id)),
        _ => None,
    }
}
