// SPDX-License-Identifier: MIT OR Apache-2.0
//! erpl-types
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Validated, immutable smart-constructor value types shared across the
//! ADT/BW client: [`PackageName`], [`RepoUrl`], [`BranchRef`], [`RepoKey`],
//! [`SapClient`], [`ObjectUri`], [`ObjectType`], [`TransportId`],
//! [`LockHandle`], [`SapLanguage`], and [`CheckVariant`].
//!
//! Every type is constructed through a validating `parse` function and is
//! otherwise deeply immutable; once built, a value is guaranteed to satisfy
//! its documented pattern for the lifetime of the process.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod http;
pub use http::{CiHeaders, HttpResponse};

/// Error returned when a raw string fails a typed value's validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    /// Name of the type that rejected the value (e.g. `"PackageName"`).
    pub type_name: &'static str,
    /// The rejected input, for diagnostics.
    pub input: String,
    /// Human-readable reason.
    pub reason: String,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: {:?} ({})",
            self.type_name, self.input, self.reason
        )
    }
}

impl std::error::Error for TypeError {}

fn err(type_name: &'static str, input: &str, reason: impl Into<String>) -> TypeError {
    TypeError {
        type_name,
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Declares a newtype string wrapper with a validating `parse` constructor,
/// value equality/hash, `Display`, and serde support that re-validates on
/// deserialize.
macro_rules! validated_string_type {
    ($name:ident, $doc:expr, $validate:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Validate and construct a new value.
            pub fn parse(input: &str) -> Result<Self, TypeError> {
                let f: fn(&str) -> Result<(), String> = $validate;
                match f(input) {
                    Ok(()) => Ok(Self(input.to_string())),
                    Err(reason) => Err(err(stringify!($name), input, reason)),
                }
            }

            /// Borrow the validated string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner `String`.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypeError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

fn validate_package_name(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".into());
    }
    if s.len() > 30 {
        return Err(format!("exceeds 30 characters ({})", s.len()));
    }
    let is_allowed_char = |c: char| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '/' || c == '$';
    if !s.chars().all(is_allowed_char) {
        return Err("must contain only uppercase A-Z, digits, underscore, slash, or a leading $".into());
    }
    if let Some(rest) = s.strip_prefix('/') {
        // Namespace form: /NS/NAME — exactly one inner slash after the namespace.
        let inner_slash_count = rest.matches('/').count();
        if inner_slash_count != 1 {
            return Err("namespace form must be /NS/NAME with exactly one inner slash".into());
        }
        let (ns, name) = rest.split_once('/').expect("checked above");
        if ns.is_empty() || name.is_empty() {
            return Err("namespace and name must both be non-empty".into());
        }
        return Ok(());
    }
    if s.starts_with('$') {
        return Ok(());
    }
    if !s.chars().next().unwrap().is_ascii_alphabetic() {
        return Err("non-namespace names must start with a letter (or be $-prefixed)".into());
    }
    Ok(())
}

validated_string_type!(
    PackageName,
    "ABAP package name: \u{2264}30 chars, uppercase A-Z/digits/underscore/slash, \
     `$`-prefixed (`$TMP`) allowed, `/NS/NAME` namespace form requires exactly one \
     inner slash, otherwise must start with a letter.",
    validate_package_name
);

validated_string_type!(
    RepoUrl,
    "abapGit repository URL: must begin `https://` with a non-empty host remainder.",
    |s: &str| {
        match s.strip_prefix("https://") {
            Some(rest) if !rest.is_empty() => Ok(()),
            Some(_) => Err("host remainder after https:// must not be empty".into()),
            None => Err("must begin with https://".into()),
        }
    }
);

validated_string_type!(
    BranchRef,
    "Git branch reference (default `refs/heads/main`); must be non-empty.",
    |s: &str| {
        if s.is_empty() {
            Err("must not be empty".into())
        } else {
            Ok(())
        }
    }
);

impl Default for BranchRef {
    fn default() -> Self {
        Self("refs/heads/main".to_string())
    }
}

validated_string_type!(
    RepoKey,
    "Opaque abapGit repository key returned by the SAP server; non-empty.",
    |s: &str| {
        if s.is_empty() {
            Err("must not be empty".into())
        } else {
            Ok(())
        }
    }
);

validated_string_type!(
    SapClient,
    "SAP client number: exactly 3 digits.",
    |s: &str| {
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err("must be exactly 3 digits".into())
        }
    }
);

validated_string_type!(
    ObjectUri,
    "ADT object URI: must begin `/sap/bc/adt/` with a non-empty remainder.",
    |s: &str| {
        match s.strip_prefix("/sap/bc/adt/") {
            Some(rest) if !rest.is_empty() => Ok(()),
            Some(_) => Err("remainder after /sap/bc/adt/ must not be empty".into()),
            None => Err("must begin with /sap/bc/adt/".into()),
        }
    }
);

validated_string_type!(
    ObjectType,
    "ADT object type: `CATEGORY/SUBCATEGORY`, both non-empty, uppercase/digits/underscore \
     only, exactly one slash.",
    |s: &str| {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err("must contain exactly one slash".into());
        }
        let valid_part = |p: &str| {
            !p.is_empty() && p.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        };
        if !valid_part(parts[0]) || !valid_part(parts[1]) {
            return Err("both category and subcategory must be non-empty uppercase/digit/underscore".into());
        }
        Ok(())
    }
);

validated_string_type!(
    TransportId,
    "SAP transport request number: exactly 4 uppercase letters followed by 6 digits.",
    |s: &str| {
        let bytes = s.as_bytes();
        if bytes.len() != 10 {
            return Err("must be exactly 10 characters (4 letters + 6 digits)".into());
        }
        let (letters, digits) = s.split_at(4);
        if !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return Err("first 4 characters must be uppercase letters".into());
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("last 6 characters must be digits".into());
        }
        Ok(())
    }
);

validated_string_type!(
    LockHandle,
    "Opaque lock handle returned by the ADT lock endpoint; non-empty.",
    |s: &str| {
        if s.is_empty() {
            Err("must not be empty".into())
        } else {
            Ok(())
        }
    }
);

validated_string_type!(
    SapLanguage,
    "SAP two-letter language key (e.g. `EN`).",
    |s: &str| {
        if s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(())
        } else {
            Err("must be exactly 2 uppercase letters".into())
        }
    }
);

/// ATC / quality-check variant name (e.g. `DEFAULT`, `Z_CUSTOM_VARIANT`).
///
/// The spec leaves the precise character set unbounded in practice (SAP
/// allows customer-defined variant names); only emptiness is rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckVariant(String);

impl CheckVariant {
    /// Validate and construct a new check variant name.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        if input.is_empty() {
            return Err(err("CheckVariant", input, "must not be empty"));
        }
        Ok(Self(input.to_string()))
    }

    /// Borrow the validated string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for CheckVariant {
    fn default() -> Self {
        Self("DEFAULT".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_boundary_lengths() {
        let thirty = "A".repeat(30);
        assert!(PackageName::parse(&thirty).is_ok());
        let thirty_one = "A".repeat(31);
        assert!(PackageName::parse(&thirty_one).is_err());
    }

    #[test]
    fn package_name_namespace_form() {
        assert!(PackageName::parse("/NS/FOO").is_ok());
        assert!(PackageName::parse("/NS/").is_err());
        assert!(PackageName::parse("/NS/FOO/BAR").is_err());
    }

    #[test]
    fn package_name_dollar_prefixed() {
        assert!(PackageName::parse("$TMP").is_ok());
    }

    #[test]
    fn package_name_must_start_with_letter() {
        assert!(PackageName::parse("1FOO").is_err());
        assert!(PackageName::parse("ZFOO").is_ok());
    }

    #[test]
    fn transport_id_boundary() {
        assert!(TransportId::parse("ABCD123456").is_ok());
        assert!(TransportId::parse("ABC1234567").is_err());
    }

    #[test]
    fn sap_client_exact_digits() {
        assert!(SapClient::parse("001").is_ok());
        assert!(SapClient::parse("01").is_err());
        assert!(SapClient::parse("0001").is_err());
        assert!(SapClient::parse("abc").is_err());
    }

    #[test]
    fn object_uri_prefix() {
        assert!(ObjectUri::parse("/sap/bc/adt/oo/classes/zcl_test").is_ok());
        assert!(ObjectUri::parse("/sap/bc/adt/").is_err());
        assert!(ObjectUri::parse("/other/path").is_err());
    }

    #[test]
    fn object_type_shape() {
        assert!(ObjectType::parse("CLAS/OC").is_ok());
        assert!(ObjectType::parse("CLAS").is_err());
        assert!(ObjectType::parse("clas/oc").is_err());
        assert!(ObjectType::parse("CLAS/OC/X").is_err());
    }

    #[test]
    fn repo_url_scheme() {
        assert!(RepoUrl::parse("https://github.com/org/repo.git").is_ok());
        assert!(RepoUrl::parse("http://github.com/org/repo.git").is_err());
        assert!(RepoUrl::parse("https://").is_err());
    }

    #[test]
    fn branch_ref_default() {
        assert_eq!(BranchRef::default().as_str(), "refs/heads/main");
    }

    #[test]
    fn sap_language_two_letters() {
        assert!(SapLanguage::parse("EN").is_ok());
        assert!(SapLanguage::parse("E").is_err());
        assert!(SapLanguage::parse("en").is_err());
    }

    #[test]
    fn serde_roundtrip_rejects_invalid() {
        let v: Result<PackageName, _> = serde_json::from_str("\"1BAD\"");
        assert!(v.is_err());
        let v: PackageName = serde_json::from_str("\"ZGOOD\"").unwrap();
        assert_eq!(v.as_str(), "ZGOOD");
    }

    proptest::proptest! {
        #[test]
        fn package_name_parse_roundtrips(s in "[A-Z][A-Z0-9_]{0,29}") {
            if let Ok(v) = PackageName::parse(&s) {
                prop_assert_eq!(v.as_str(), s.as_str());
            }
        }

        #[test]
        fn transport_id_parse_roundtrips(letters in "[A-Z]{4}", digits in "[0-9]{6}") {
            let s = format!("{letters}{digits}");
            let v = TransportId::parse(&s).unwrap();
            prop_assert_eq!(v.as_str(), s.as_str());
        }
    }
}
