//! Result record written next to every classified image

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::label_detection::Label;

/// Content type of stored result records
pub const RECORD_CONTENT_TYPE: &str = "application/json";

/// Labels for one image plus the context they were produced in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Bucket holding the normalized image
    pub image_bucket: String,
    /// Key of the normalized image
    pub image_key: String,
    /// Labels in the order the service returned them
    pub labels: Vec<Label>,
    /// Label cap the detection ran with
    pub max_labels: i32,
    /// Confidence floor the detection ran with
    pub min_confidence: f32,
    /// Creation time, RFC 3339 UTC with a `Z` suffix
    pub timestamp: String,
}

impl ResultRecord {
    /// Builds a record stamped with `created_at`
    #[must_use]
    pub fn new(
        image_bucket: &str,
        image_key: &str,
        labels: Vec<Label>,
        max_labels: i32,
        min_confidence: f32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            image_bucket: image_bucket.to_string(),
            image_key: image_key.to_string(),
            labels,
            max_labels,
            min_confidence,
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// JSON body as stored in the output bucket
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which cannot happen for well-formed records
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_record_json_shape() {
        let created_at = Utc.with_ymd_and_hms(2025, 9, 21, 8, 30, 15).unwrap();
        let record = ResultRecord::new(
            "traywise-videos",
            "uploads/2025/09/21/red-0123456789ab.jpg",
            vec![Label::new("Red", 91.2), Label::new("Crimson", 60.456)],
            10,
            50.0,
            created_at,
        );

        let value: serde_json::Value =
            serde_json::from_slice(&record.to_json_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "image_bucket": "traywise-videos",
                "image_key": "uploads/2025/09/21/red-0123456789ab.jpg",
                "labels": [
                    {"name": "Red", "confidence": 91.2},
                    {"name": "Crimson", "confidence": 60.46}
                ],
                "max_labels": 10,
                "min_confidence": 50.0,
                "timestamp": "2025-09-21T08:30:15.000000Z"
            })
        );
    }
}
