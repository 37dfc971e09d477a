use anyhow::{Context, Result, bail};
use api::{AppConfig, build_assemblers, init_tracing};
use clap::Parser;
use std::path::PathBuf;

const SAMPLE_RESPONSES: &str = include_str!("../../../../demos/sample_responses.txt");

/// Generate a personalized activity preference survey from free-text responses.
#[derive(Parser, Debug)]
#[command(name = "generate_survey")]
struct Args {
    /// Responses file; the bundled sample is used when omitted.
    file: Option<PathBuf>,

    /// Target number of questions (0 for no limit).
    #[arg(short, long, default_value_t = 10)]
    questions: usize,

    /// Publish the survey to the configured Qualtrics account.
    #[arg(long)]
    publish: bool,

    /// Where the full result is written.
    #[arg(short, long, default_value = "survey_result.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    config.validate()?;

    let responses = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read responses from {}", path.display()))?,
        None => SAMPLE_RESPONSES.to_string(),
    };

    let (standalone, hosted) = build_assemblers(&config)?;
    let assembler = if args.publish {
        match hosted {
            Some(hosted) => hosted,
            None => bail!("--publish needs QUALTRICS_API_TOKEN to be set"),
        }
    } else {
        standalone
    };

    let run = assembler.run(&responses, Some(args.questions)).await?;
    let result = run.result;

    println!("### Personalized Survey ###\n");
    for (idx, question) in result.survey_questions.iter().enumerate() {
        println!("{}. {}\n", idx + 1, question);
    }
    if let Some(link) = &result.survey_link {
        println!("Survey link: {}", link);
    }

    let json = serde_json::to_string_pretty(&result)?;
    tokio::fs::write(&args.output, json)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        questions = result.survey_questions.len(),
        units_dropped = run.report.units_dropped,
        output = %args.output.display(),
        "Survey written"
    );

    Ok(())
}
