pub mod config;
pub mod metrics;
pub mod routes;

pub use config::{AppConfig, OperationMode};
pub use metrics::{Metrics, MetricsSnapshot, TimedOperation};
pub use routes::{AppState, router};

use anyhow::Result;
use extract::build_generator;
use publish::{PublishingAdapter, QualtricsClient, SurveyPublisher};
use std::sync::Arc;
use survey::SurveyAssembler;

/// Install the global subscriber; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().init();
    } else {
        tracing_subscriber::fmt::init();
    }
}

/// Standalone assembler plus, when hosting is configured, a publishing one.
pub fn build_assemblers(
    config: &AppConfig,
) -> Result<(Arc<SurveyAssembler>, Option<Arc<SurveyAssembler>>)> {
    let generator = build_generator(&config.generator, &config.retry)?;

    let standalone = Arc::new(SurveyAssembler::new(
        generator.clone(),
        config.pipeline.clone(),
    ));

    let hosted = match &config.hosting {
        Some(hosting) => {
            let host = Arc::new(QualtricsClient::new(hosting)?);
            let publisher: Arc<dyn SurveyPublisher> = Arc::new(PublishingAdapter::new(host));
            Some(Arc::new(
                SurveyAssembler::new(generator, config.pipeline.clone()).with_publisher(publisher),
            ))
        }
        None => None,
    };

    Ok((standalone, hosted))
}
