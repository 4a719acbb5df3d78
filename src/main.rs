use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use questionnaire_flow::adapters::content::{HttpContentProvider, StaticContentProvider};
use questionnaire_flow::adapters::source::{FileQuestionnaireSource, HttpQuestionnaireSource};
use questionnaire_flow::adapters::storage::FileKeyValueStore;
use questionnaire_flow::adapters::xml::{parse_graph, parse_questionnaire, write_questionnaire};
use questionnaire_flow::application::ConversationService;
use questionnaire_flow::config::{AppConfig, LoggingConfig};
use questionnaire_flow::domain::conversation::Conversation;
use questionnaire_flow::domain::foundation::{OptionId, QuestionId};
use questionnaire_flow::domain::graph::PersistedLayout;
use questionnaire_flow::domain::questionnaire::Document;
use questionnaire_flow::ports::{ContentProvider, KeyValueStore, QuestionnaireSource};

#[derive(Parser)]
#[command(
    name = "questionnaire-flow",
    version,
    about = "Questionnaire XML tooling: flow graphs, canonical XML and guided walks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Questionnaire XML file (defaults to the configured source)
    xml: Option<PathBuf>,
}

#[derive(Args)]
struct WalkArgs {
    #[command(flatten)]
    input: Input,

    /// Answer as QUESTION:OPTION, repeatable, applied in order
    #[arg(short, long = "answer", value_parser = parse_answer)]
    answers: Vec<(QuestionId, OptionId)>,

    /// Continue the stored session and persist the new answers
    #[arg(long)]
    resume: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the laid-out flow graph as JSON
    Graph(Input),
    /// Parse and re-serialize the questionnaire canonically
    Normalize(Input),
    /// Replay answers and print the walk so far
    Walk(WalkArgs),
    /// Replay answers and print the recommended documents
    Evaluate(WalkArgs),
}

fn parse_answer(raw: &str) -> Result<(QuestionId, OptionId), String> {
    let (question, option) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected QUESTION:OPTION, got '{}'", raw))?;
    let question = question.parse::<QuestionId>().map_err(|e| e.to_string())?;
    let option = option.parse::<OptionId>().map_err(|e| e.to_string())?;
    Ok((question, option))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn source_for(input: &Input, config: &AppConfig) -> anyhow::Result<Arc<dyn QuestionnaireSource>> {
    if let Some(path) = input.xml.as_ref().or(config.source.path.as_ref()) {
        return Ok(Arc::new(FileQuestionnaireSource::new(path)));
    }
    if let Some(url) = &config.source.url {
        let source = HttpQuestionnaireSource::new(url, config.content.timeout())?;
        return Ok(Arc::new(source));
    }
    bail!("no questionnaire given; pass a file or set QUESTIONNAIRE_FLOW__SOURCE__PATH")
}

fn content_for(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentProvider>> {
    Ok(match &config.content.base_url {
        Some(url) => Arc::new(HttpContentProvider::new(url, config.content.timeout())?),
        None => Arc::new(StaticContentProvider::empty()),
    })
}

async fn fetch_xml(input: &Input, config: &AppConfig) -> anyhow::Result<String> {
    let source = source_for(input, config)?;
    let xml = source
        .fetch()
        .await
        .with_context(|| format!("reading {}", source.describe()))?;
    Ok(xml)
}

/// Replays the command-line answers, either onto a fresh walk or onto the
/// stored session.
async fn run_walk(args: &WalkArgs, config: &AppConfig) -> anyhow::Result<serde_json::Value> {
    if args.resume {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::new(&config.storage.data_dir));
        let service = ConversationService::new(
            source_for(&args.input, config)?,
            content_for(config)?,
            store,
            config.storage.session_key.clone(),
        );
        let mut active = service.start().await?;
        for (question, option) in &args.answers {
            ensure_current(active.conversation(), question)?;
            service.answer(&mut active, option).await?;
        }
        let conversation = active.conversation();
        let documents = conversation.recommendations().map(|recommendation| {
            let describe = |docs: &[Document]| {
                docs.iter()
                    .map(|doc| json!({ "title": doc.title, "description": active.description_html(doc) }))
                    .collect::<Vec<_>>()
            };
            json!({
                "mandatory": describe(&recommendation.mandatory),
                "optional": describe(&recommendation.optional),
            })
        });
        let mut report = walk_report(conversation);
        report["session_id"] = json!(active.session_id.to_string());
        report["current_tooltip"] = json!(conversation
            .current_question()
            .and_then(|q| active.tooltip_html(&q.id)));
        report["documents"] = json!(documents);
        return Ok(report);
    }

    let xml = fetch_xml(&args.input, config).await?;
    let questionnaire = Arc::new(parse_questionnaire(&xml)?);
    let mut conversation = Conversation::start(questionnaire)?;
    for (question, option) in &args.answers {
        ensure_current(&conversation, question)?;
        conversation.answer(option)?;
    }
    let mut report = walk_report(&conversation);
    report["documents"] = json!(conversation.recommendations());
    Ok(report)
}

fn ensure_current(conversation: &Conversation, question: &QuestionId) -> anyhow::Result<()> {
    match conversation.current_question() {
        Some(current) if &current.id == question => Ok(()),
        Some(current) => bail!("question {} is not current (current is {})", question, current.id),
        None => bail!("walk already finished before question {}", question),
    }
}

fn walk_report(conversation: &Conversation) -> serde_json::Value {
    json!({
        "phase": conversation.phase(),
        "history": conversation.history(),
        "current_question": conversation.current_question().map(|q| json!({
            "id": q.id,
            "text": q.text,
        })),
        "end_node": conversation.end_node().map(|end| json!({
            "id": end.id,
            "label": end.label,
        })),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);
    config.validate().context("validating configuration")?;

    match &cli.command {
        Commands::Graph(input) => {
            let xml = fetch_xml(input, &config).await?;
            let graph = parse_graph(&xml, &config.layout.settings(), &PersistedLayout::default())?;
            info!(nodes = graph.nodes().len(), edges = graph.edges().len(), "Graph built");
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Commands::Normalize(input) => {
            let xml = fetch_xml(input, &config).await?;
            let questionnaire = parse_questionnaire(&xml)?;
            print!("{}", write_questionnaire(&questionnaire)?);
        }
        Commands::Walk(args) => {
            let report = run_walk(args, &config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Evaluate(args) => {
            let report = run_walk(args, &config).await?;
            if report["phase"] != json!("finished") {
                bail!("walk is not finished; answer the remaining questions first");
            }
            println!("{}", serde_json::to_string_pretty(&report["documents"])?);
        }
    }

    Ok(())
}
