use std::sync::Arc;

use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_s3::Client as S3Client;

use labeler::{
    label_detection::RekognitionLabelDetector, media_storage::MediaStorage,
    pipeline::UploadPipeline, server, types::Environment,
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(filter).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let rekognition_client = Arc::new(RekognitionClient::from_conf(
        environment.rekognition_client_config().await,
    ));

    let config = environment.pipeline_config();
    tracing::info!(
        region = %config.region,
        input_bucket = %config.input_bucket,
        output_bucket = %config.output_bucket,
        max_labels = config.max_labels,
        min_confidence = config.min_confidence,
        "pipeline configured"
    );

    let pipeline = Arc::new(UploadPipeline::new(
        Arc::new(MediaStorage::new(s3_client)),
        Arc::new(RekognitionLabelDetector::new(rekognition_client)),
        config,
    ));

    server::start(environment, pipeline).await
}
