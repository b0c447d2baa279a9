use crate::models::{BuildProfile, BuildTarget, Placeholder};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Replacement values for the placeholders of a path template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderValues {
    values: BTreeMap<Placeholder, String>,
}

impl PlaceholderValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.insert(placeholder, value);
        self
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: impl Into<String>) {
        self.values.insert(placeholder, value.into());
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    /// Values for a player build. Date and time come from the same clock reading.
    pub fn for_build(profile: &BuildProfile, target: &BuildTarget, now: NaiveDateTime) -> Self {
        Self::new()
            .with(Placeholder::Date, now.format("%Y%m%d").to_string())
            .with(Placeholder::Time, now.format("%H%M%S").to_string())
            .with(Placeholder::CompanyName, profile.company_name.as_str())
            .with(Placeholder::ProductName, profile.product_name.as_str())
            .with(Placeholder::BundleIdentifier, profile.bundle_identifier.as_str())
            .with(Placeholder::BundleVersion, profile.bundle_version.as_str())
            .with(Placeholder::BuildNumber, profile.build_number.to_string())
            .with(Placeholder::BuildTarget, target.name())
    }
}

/// Expand every known placeholder token in `template`.
///
/// Tokens without a value expand to the empty string. The template is scanned once,
/// left to right, and substituted text is never scanned again, so a value that
/// happens to look like a token is copied through literally.
pub fn resolve(template: &str, values: &PlaceholderValues) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('<') {
        resolved.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let placeholder = candidate
            .find('>')
            .and_then(|end| Placeholder::from_token(&candidate[..=end]));

        match placeholder {
            Some(placeholder) => {
                resolved.push_str(values.get(placeholder).unwrap_or_default());
                rest = &candidate[placeholder.token().len()..];
            }
            None => {
                resolved.push('<');
                rest = &candidate[1..];
            }
        }
    }

    resolved.push_str(rest);
    resolved
}

/// Whether the template still contains any placeholder token
pub fn contains_placeholders(template: &str) -> bool {
    Placeholder::ALL
        .iter()
        .any(|placeholder| template.contains(placeholder.token()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap()
    }

    #[test]
    fn test_resolve_product_and_build_number() {
        let values = PlaceholderValues::new()
            .with(Placeholder::ProductName, "App")
            .with(Placeholder::BuildNumber, "7");
        assert_eq!(resolve("<ProductName>-<BuildNumber>", &values), "App-7");
    }

    #[test]
    fn test_resolve_without_placeholders_is_identity() {
        let values = PlaceholderValues::new().with(Placeholder::ProductName, "App");
        assert_eq!(resolve("plain/path", &values), "plain/path");
        assert_eq!(resolve("", &values), "");
    }

    #[test]
    fn test_resolve_repeated_tokens() {
        let values = PlaceholderValues::new().with(Placeholder::BuildTarget, "Android");
        assert_eq!(
            resolve("<BuildTarget>/x/<BuildTarget>", &values),
            "Android/x/Android"
        );
    }

    #[test]
    fn test_missing_values_render_empty() {
        let values = PlaceholderValues::new().with(Placeholder::ProductName, "App");
        assert_eq!(resolve("<ProductName>_<BundleVersion>_", &values), "App__");
    }

    #[test]
    fn test_unknown_and_partial_tokens_are_preserved() {
        let values = PlaceholderValues::new().with(Placeholder::Date, "20240307");
        assert_eq!(
            resolve("a<b>c<<Date>><Dat", &values),
            "a<b>c<20240307><Dat"
        );
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let values = PlaceholderValues::new()
            .with(Placeholder::ProductName, "<CompanyName>")
            .with(Placeholder::CompanyName, "Acme");
        assert_eq!(
            resolve("<ProductName>/<CompanyName>", &values),
            "<CompanyName>/Acme"
        );
    }

    #[test]
    fn test_non_ascii_text_is_untouched() {
        let values = PlaceholderValues::new().with(Placeholder::ProductName, "Jeu");
        assert_eq!(resolve("Über/<ProductName>/ß", &values), "Über/Jeu/ß");
    }

    #[test]
    fn test_values_for_build() {
        let profile = BuildProfile {
            company_name: "Acme".to_string(),
            product_name: "Rocket".to_string(),
            bundle_identifier: "com.acme.rocket".to_string(),
            bundle_version: "1.2.0".to_string(),
            build_number: 42,
            ..BuildProfile::default()
        };
        let values = PlaceholderValues::for_build(&profile, &BuildTarget::Android, sample_time());

        let template = "<Date>_<Time>/<CompanyName>/<ProductName>/<BundleIdentifier>/<BundleVersion>/<BuildNumber>/<BuildTarget>";
        assert_eq!(
            resolve(template, &values),
            "20240307_090502/Acme/Rocket/com.acme.rocket/1.2.0/42/Android"
        );
    }

    #[test]
    fn test_default_template() {
        let profile = BuildProfile {
            product_name: "Rocket".to_string(),
            bundle_version: "0.9".to_string(),
            build_number: 3,
            ..BuildProfile::default()
        };
        let values =
            PlaceholderValues::for_build(&profile, &BuildTarget::StandaloneWindows64, sample_time());
        let resolved = resolve(&profile.location_path_name, &values);
        assert_eq!(resolved, "Builds/Rocket-StandaloneWindows64-3-0.9");
        assert!(!contains_placeholders(&resolved));
    }
}
