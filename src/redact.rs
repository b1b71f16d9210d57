//! Masking of sensitive form field values.

use crate::types::FormField;

/// Replacement token for redacted values.
pub const MASK: &str = "********";

/// Blacklist applied when no custom one is configured.
pub const DEFAULT_BLACKLIST: &[&str] = &["password"];

/// Returns a copy of `fields` with every sensitive value masked.
///
/// A field is sensitive when its name, compared case-insensitively,
/// *contains* any blacklist entry as a substring — `EndsWithPassword` and
/// `PasswordPrefix` are both caught by the default blacklist. Ordering and
/// duplicate names pass through untouched, and an empty input yields an
/// empty output.
///
/// The blacklist *replaces* the default rather than extending it: redacting
/// with a custom list lets `password` fields through unless the list covers
/// them.
///
/// # Examples
///
/// ```rust
/// use turnstile::{redact_fields, FormField, DEFAULT_BLACKLIST, MASK};
///
/// let fields = vec![
///     FormField::new("password", "hunter2"),
///     FormField::new("Other", "Value"),
/// ];
/// let redacted = redact_fields(fields, DEFAULT_BLACKLIST);
/// assert_eq!(redacted[0].value, MASK);
/// assert_eq!(redacted[1].value, "Value");
/// ```
pub fn redact_fields<S: AsRef<str>>(fields: Vec<FormField>, blacklist: &[S]) -> Vec<FormField> {
    let needles: Vec<String> = blacklist
        .iter()
        .map(|word| word.as_ref().to_lowercase())
        .collect();

    fields
        .into_iter()
        .map(|mut field| {
            let name = field.name.to_lowercase();
            if needles.iter().any(|needle| name.contains(needle.as_str())) {
                field.value = MASK.to_owned();
            }
            field
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_and_values(fields: &[FormField]) -> Vec<(&str, &str)> {
        fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect()
    }

    #[test]
    fn default_blacklist_masks_names_containing_password() {
        let fields = vec![
            FormField::new("password", "Foo"),
            FormField::new("PASSWORD", "Bar"),
            FormField::new("EndWithPassword", "Qux"),
            FormField::new("PasswordPrefix", "Baz"),
            FormField::new("Other", "Value"),
        ];

        let redacted = redact_fields(fields, DEFAULT_BLACKLIST);

        assert_eq!(
            names_and_values(&redacted),
            vec![
                ("password", MASK),
                ("PASSWORD", MASK),
                ("EndWithPassword", MASK),
                ("PasswordPrefix", MASK),
                ("Other", "Value"),
            ]
        );
    }

    #[test]
    fn custom_blacklist_replaces_the_default() {
        let fields = vec![
            FormField::new("password", "Foo"),
            FormField::new("badword", "Bar"),
            FormField::new("VeryBadWord", "Qux"),
            FormField::new("forbidden", "Baz"),
            FormField::new("ThisIsRestricted", "Value"),
        ];

        let redacted = redact_fields(fields, &["badword", "forbidden", "restricted"]);

        // `password` is no longer on the list once a custom one is supplied.
        assert_eq!(
            names_and_values(&redacted),
            vec![
                ("password", "Foo"),
                ("badword", MASK),
                ("VeryBadWord", MASK),
                ("forbidden", MASK),
                ("ThisIsRestricted", MASK),
            ]
        );
    }

    #[test]
    fn ordering_and_duplicate_names_are_preserved() {
        let fields = vec![
            FormField::new("Foo", "Bar"),
            FormField::new("Foo", "Qux"),
            FormField::new("secretword", "hidden"),
            FormField::new("Foo", "Again"),
        ];

        let redacted = redact_fields(fields, &["secret"]);

        assert_eq!(
            names_and_values(&redacted),
            vec![
                ("Foo", "Bar"),
                ("Foo", "Qux"),
                ("secretword", MASK),
                ("Foo", "Again"),
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(redact_fields(Vec::new(), DEFAULT_BLACKLIST).is_empty());
    }
}
