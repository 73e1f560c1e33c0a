//! Vendor identification from input filenames.

use std::path::Path;

use crate::models::config::VendorProfile;

/// Match a filename against the vendor profiles.
///
/// Returns the matching profile, or `None` for unknown vendors. Matching is
/// plain substring search over the profile's tokens.
pub fn match_profile<'a>(
    filename: &str,
    profiles: &'a [VendorProfile],
) -> Option<&'a VendorProfile> {
    profiles
        .iter()
        .find(|profile| profile.match_tokens.iter().any(|t| filename.contains(t)))
}

/// Vendor name for a file: the matched profile's name, or the leading token
/// of the file stem (split on `_`, then `.`) for unknown vendors.
pub fn vendor_for_file(path: &Path, profiles: &[VendorProfile]) -> String {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if let Some(profile) = match_profile(filename, profiles) {
        return profile.name.clone();
    }

    filename
        .split('_')
        .next()
        .unwrap_or(filename)
        .split('.')
        .next()
        .unwrap_or(filename)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profiles() -> Vec<VendorProfile> {
        VendorProfile::defaults()
    }

    #[test]
    fn test_token_match() {
        let profiles = profiles();
        assert_eq!(
            vendor_for_file(Path::new("Haskins Inc 4421.pdf"), &profiles),
            "Rinker"
        );
        assert_eq!(
            vendor_for_file(Path::new("Rinker_invoice_09.pdf"), &profiles),
            "Rinker"
        );
        assert_eq!(
            vendor_for_file(Path::new("Foley-2024-11.pdf"), &profiles),
            "Foley"
        );
    }

    #[test]
    fn test_unknown_vendor_leading_token() {
        let profiles = profiles();
        assert_eq!(
            vendor_for_file(Path::new("Acme_invoice_17.pdf"), &profiles),
            "Acme"
        );
        assert_eq!(vendor_for_file(Path::new("Acme.pdf"), &profiles), "Acme");
    }

    #[test]
    fn test_matched_profile_carries_crop() {
        let profiles = profiles();
        let profile = match_profile("Rinker_invoice.pdf", &profiles).unwrap();
        assert!(profile.crop.is_some());
        assert!(match_profile("Acme_invoice.pdf", &profiles).is_none());
    }
}
