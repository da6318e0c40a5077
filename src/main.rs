use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use eyre::{Result, bail};
use log::{debug, info};

use ytsum::comments::CommentFetcher;
use ytsum::config::Config;
use ytsum::session::{self, SessionStore};
use ytsum::summarize::{DEFAULT_MODEL, LlmSummarizer};
use ytsum::youtube::CaptionFetcher;
use ytsum::{Fetcher, Pipeline, Summarizer, Summary, Workflow, output, prompts};

mod cli;

use cli::{Cli, Command, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn env_status(name: &str, purpose: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => format!("  \x1b[32m✅\x1b[0m {name:<18} set"),
        _ => format!("  \x1b[31m❌\x1b[0m {name:<18} (not set — needed for {purpose})"),
    }
}

fn build_after_help() -> String {
    let keys = [
        env_status("OPENAI_API_KEY", "OpenAI models"),
        env_status("ANTHROPIC_API_KEY", "Claude models"),
        env_status("YOUTUBE_API_KEY", "comment summaries"),
    ]
    .join("\n");

    let log_path = log_dir().join("ytsum.log");
    let config_path = ytsum::config::config_path();

    format!(
        "\nAPI KEYS:\n{keys}\n\nConfig is read from: {}\nLogs are written to: {}",
        config_path.display(),
        log_path.display()
    )
}

/// Everything a run needs that outlives a single run
struct App {
    client: reqwest::Client,
    config: Config,
    summarizer: Arc<dyn Summarizer>,
    format: OutputFormat,
    verbose: bool,
}

impl App {
    fn pipeline(&self, workflow: Workflow) -> Result<Pipeline> {
        let fetcher: Arc<dyn Fetcher> = match workflow {
            Workflow::Script => Arc::new(CaptionFetcher::new(self.client.clone(), self.config.languages())),
            Workflow::Comments => {
                let Some(api_key) = self.config.youtube_api_key() else {
                    bail!("YOUTUBE_API_KEY environment variable not set (required for comment summaries)");
                };
                Arc::new(CommentFetcher::new(
                    self.client.clone(),
                    api_key,
                    self.config.limits().max_comments,
                ))
            }
        };
        Ok(Pipeline::new(
            workflow,
            fetcher,
            self.summarizer.clone(),
            self.config.limits(),
        ))
    }

    /// Run one workflow; failures come back as a printable message
    async fn run(&self, workflow: Workflow, url: &str) -> Result<std::result::Result<Summary, String>> {
        let pipeline = self.pipeline(workflow)?;
        if self.verbose {
            eprintln!("[{workflow}] {url}");
        }

        let state = pipeline.run(url).await;
        if self.verbose {
            match state.video_id() {
                Some(id) => eprintln!("[{workflow}] video {id}: {}", state.stage()),
                None => eprintln!("[{workflow}] {}", state.stage()),
            }
        }
        debug!("[{workflow}] finished at {}", state.stage());

        Ok(match state.into_result() {
            Ok(summary) => Ok(summary),
            Err(e) => Err(output::render_failure(workflow, &e)),
        })
    }

    fn render(&self, summary: &Summary) -> String {
        match self.format {
            OutputFormat::Json => output::render_json(summary),
            OutputFormat::Text => output::render_text(summary),
        }
    }
}

fn resolve_format(cli: Option<OutputFormat>, config: &Config) -> OutputFormat {
    cli.or_else(|| {
        config
            .format
            .as_deref()
            .and_then(|f| <OutputFormat as clap::ValueEnum>::from_str(f, true).ok())
    })
    .unwrap_or(OutputFormat::Json)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let model = cli
        .model
        .clone()
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    debug!("Using model {model}");

    let client = reqwest::Client::new();
    let app = App {
        summarizer: Arc::new(LlmSummarizer::new(client.clone(), model)),
        client,
        format: resolve_format(cli.format, &config),
        verbose: cli.verbose,
        config,
    };
    let sessions = SessionStore::default();

    let mut rendered = Vec::new();
    let mut failed = false;

    match cli.command {
        Command::Script { url, thread } => {
            let thread = thread.unwrap_or_else(session::new_thread_key);
            sessions.remember(&thread, &url)?;

            match app.run(Workflow::Script, &url).await? {
                Ok(summary) => {
                    rendered.push(app.render(&summary));
                    eprintln!("\n{}\n  ytsum comments --thread {thread} --reply 응", prompts::COMMENT_FOLLOW_UP);
                }
                Err(msg) => {
                    eprintln!("{msg}");
                    failed = true;
                }
            }
        }
        Command::Comments { url, thread, reply } => {
            let url = match (url, thread) {
                (Some(url), thread) => {
                    if let Some(thread) = thread {
                        sessions.remember(&thread, &url)?;
                    }
                    url
                }
                (None, Some(thread)) => match sessions.recall(&thread) {
                    Some(session) => session.source_url,
                    None => bail!("no earlier run recorded for thread {thread}"),
                },
                (None, None) => bail!("a URL or --thread is required\n\nUsage: ytsum comments <URL>\n       ytsum comments --thread <KEY>"),
            };
            if let Some(reply) = reply {
                debug!("Follow-up reply received ({} chars)", reply.chars().count());
            }

            match app.run(Workflow::Comments, &url).await? {
                Ok(summary) => rendered.push(app.render(&summary)),
                Err(msg) => {
                    eprintln!("{msg}");
                    failed = true;
                }
            }
        }
        Command::Ask { message } => {
            let Some(url) = ytsum::find_video_url(&message) else {
                eprintln!("ERROR: 메시지에서 유튜브 URL을 찾을 수 없습니다. (no YouTube URL in message)");
                return Ok(ExitCode::FAILURE);
            };

            for workflow in ytsum::workflows_for_message(&message) {
                match app.run(workflow, url).await? {
                    Ok(summary) => rendered.push(app.render(&summary)),
                    Err(msg) => {
                        eprintln!("{msg}");
                        failed = true;
                    }
                }
            }
        }
    }

    if !rendered.is_empty() {
        let body = rendered.join("\n\n");
        if let Some(ref path) = cli.output {
            std::fs::write(path, &body)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        } else {
            println!("{body}");
        }
    }

    debug!("Exiting (failed={failed})");
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
