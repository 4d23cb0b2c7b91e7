//! Object keys for stored images and their result records

use chrono::{DateTime, Utc};
use icu_normalizer::DecomposingNormalizerBorrowed;
use uuid::Uuid;

const IMAGE_NAMESPACE: &str = "uploads";
const RESULT_NAMESPACE: &str = "results";
const RESULT_SUFFIX: &str = ".json";
const FALLBACK_BASE_NAME: &str = "upload";
const DISAMBIGUATOR_LEN: usize = 12;

/// Date prefix, sanitized base name and random disambiguator shared by the image key
/// and the result key of one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
    base_name: String,
    disambiguator: String,
}

impl StorageKeys {
    /// Keys for `filename` uploaded at `now`, with a fresh disambiguator
    #[must_use]
    pub fn generate(filename: &str, now: DateTime<Utc>) -> Self {
        let uid = Uuid::new_v4().simple().to_string();
        Self::with_disambiguator(filename, now, &uid[..DISAMBIGUATOR_LEN])
    }

    fn with_disambiguator(filename: &str, now: DateTime<Utc>, disambiguator: &str) -> Self {
        let base_name = secure_filename(file_stem(filename));

        Self {
            prefix: now.format("%Y/%m/%d").to_string(),
            base_name: if base_name.is_empty() {
                FALLBACK_BASE_NAME.to_string()
            } else {
                base_name
            },
            disambiguator: disambiguator.to_string(),
        }
    }

    /// `YYYY/MM/DD` of the upload
    #[cfg(test)]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Filesystem-safe stem of the original filename
    #[cfg(test)]
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Random component that keeps repeated uploads apart
    #[cfg(test)]
    #[must_use]
    pub fn disambiguator(&self) -> &str {
        &self.disambiguator
    }

    /// Key of the normalized image in the input bucket
    #[must_use]
    pub fn image_key(&self) -> String {
        format!(
            "{IMAGE_NAMESPACE}/{}/{}-{}.jpg",
            self.prefix, self.base_name, self.disambiguator
        )
    }

    /// Key of the result record in the output bucket
    #[must_use]
    pub fn result_key(&self) -> String {
        format!(
            "{RESULT_NAMESPACE}/{}/{}-{}{RESULT_SUFFIX}",
            self.prefix, self.base_name, self.disambiguator
        )
    }
}

/// Turns a bare or path-qualified result name into a full result key
///
/// `foo` and `/foo/` become `results/foo.json`; `2025/09/21/cat-abc.json` becomes
/// `results/2025/09/21/cat-abc.json`; names already in the namespace are kept.
#[must_use]
pub fn result_key_for(name: &str) -> String {
    let clean = name.trim_matches('/');

    let with_suffix = if clean.ends_with(RESULT_SUFFIX) {
        clean.to_string()
    } else {
        format!("{clean}{RESULT_SUFFIX}")
    };

    if with_suffix.starts_with(&format!("{RESULT_NAMESPACE}/")) {
        with_suffix
    } else {
        format!("{RESULT_NAMESPACE}/{with_suffix}")
    }
}

/// Filename without its final extension; a leading dot does not start an extension
fn file_stem(filename: &str) -> &str {
    let name_start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match filename[name_start..].rfind('.') {
        Some(dot) if !filename[name_start..name_start + dot].trim_start_matches('.').is_empty() => {
            &filename[..name_start + dot]
        }
        _ => filename,
    }
}

/// Reduces `name` to ASCII letters, digits, `_`, `.` and `-`
///
/// Characters are NFKD-decomposed first so accented letters keep their base letter.
/// Remaining non-ASCII characters are dropped, path separators count as whitespace,
/// whitespace runs collapse to a single `_`, and leading or trailing `.`/`_` are stripped.
#[must_use]
pub fn secure_filename(name: &str) -> String {
    let ascii: String = DecomposingNormalizerBorrowed::new_nfkd()
        .normalize(name)
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_ascii_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
