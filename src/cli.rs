use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube script and comment summarizer",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format: json (default), text
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// LLM model for summarization
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Show pipeline progress on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize the video's script (captions)
    Script {
        /// YouTube video URL
        url: String,

        /// Thread key to remember this URL under (a new one is generated if omitted)
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Summarize the video's top comments
    Comments {
        /// YouTube video URL (optional when --thread points at an earlier run)
        url: Option<String>,

        /// Reuse the URL from an earlier run on this thread
        #[arg(short, long)]
        thread: Option<String>,

        /// Reply to the follow-up offer, e.g. "응" (only acts as a trigger)
        #[arg(short, long)]
        reply: Option<String>,
    },

    /// Route a chat-style message ("<URL> 댓글 요약해줘") to the matching workflows
    Ask {
        /// Free-text message containing a YouTube URL
        message: String,
    },
}
