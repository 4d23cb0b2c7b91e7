//! HTML pages rendered with askama

use askama::Template;

use crate::{
    label_detection::Label,
    pipeline::{PipelineConfig, ResultLink, UploadOutcome},
};

/// Upload form, optionally carrying the outcome of the last upload
#[derive(Template, Debug, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    /// Value for the file input's `accept` attribute
    pub accept: String,
    /// Allow-list shown under the form
    pub allowed_extensions: String,
    /// Size ceiling shown under the form
    pub max_image_mb: usize,
    /// Error from the last upload
    pub error: Option<String>,
    /// Labels from the last upload
    pub labels: Vec<Label>,
    /// Retrieval link for the last result record
    pub presigned_url: Option<String>,
    /// Key of the last result record
    pub result_key: Option<String>,
    /// Expiry of the retrieval link, RFC 3339
    pub expires_at: Option<String>,
}

impl IndexPage {
    /// Empty form for `config`
    #[must_use]
    pub fn form(config: &PipelineConfig) -> Self {
        Self {
            accept: config
                .allowed_extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(","),
            allowed_extensions: config.allowed_extensions_display(),
            max_image_mb: config.max_image_mb(),
            ..Self::default()
        }
    }

    /// Form plus the labels and link of a successful upload
    #[must_use]
    pub fn with_outcome(mut self, outcome: UploadOutcome) -> Self {
        self.labels = outcome.labels;
        self.presigned_url = Some(outcome.link.url);
        self.result_key = Some(outcome.result_key);
        self.expires_at = Some(outcome.link.expires_at.to_rfc3339());
        self
    }

    /// Form plus an error message
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// Page linking to one stored result record
#[derive(Template, Debug)]
#[template(path = "view_results.html")]
pub struct ResultsPage {
    /// Retrieval link
    pub result_url: String,
    /// Fully qualified result key
    pub result_key: String,
    /// Expiry of the retrieval link, RFC 3339
    pub expires_at: String,
}

impl From<ResultLink> for ResultsPage {
    fn from(found: ResultLink) -> Self {
        Self {
            result_url: found.link.url,
            result_key: found.result_key,
            expires_at: found.link.expires_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::media_storage::PresignedUrl;

    fn config() -> PipelineConfig {
        PipelineConfig {
            input_bucket: "in".into(),
            output_bucket: "out".into(),
            region: "us-east-1".into(),
            max_labels: 10,
            min_confidence: 50.0,
            allowed_extensions: ["png", "jpg"].into_iter().map(String::from).collect(),
            max_image_bytes: 10 * 1024 * 1024,
            link_expiry: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_form_lists_constraints() {
        let html = IndexPage::form(&config()).render().unwrap();
        assert!(html.contains("name=\"image\""));
        assert!(html.contains("accept=\".jpg,.png\""));
        assert!(html.contains("Allowed: jpg, png. Max 10 MB."));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_outcome_renders_labels_and_link() {
        let page = IndexPage::form(&config()).with_outcome(UploadOutcome {
            labels: vec![Label::new("Red", 91.2), Label::new("Fire Truck", 55.0)],
            image_key: "uploads/2025/09/21/red-abc.jpg".into(),
            result_key: "results/2025/09/21/red-abc.json".into(),
            link: PresignedUrl {
                url: "https://out.example/red-abc.json?X-Amz-Expires=3600".into(),
                expires_at: Utc::now(),
            },
        });

        let html = page.render().unwrap();
        assert!(html.contains("<td>Red</td><td>91.20%</td>"));
        assert!(html.contains("<td>Fire Truck</td><td>55.00%</td>"));
        assert!(html.contains("X-Amz-Expires=3600"));
    }

    #[test]
    fn test_error_is_escaped() {
        let html = IndexPage::form(&config())
            .with_error("<script>alert(1)</script>")
            .render()
            .unwrap();
        assert!(html.contains("class=\"error\""));
        assert!(!html.contains("<script>"));
    }
}
