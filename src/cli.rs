use crate::commands;
use crate::common::CommonParams;
use crate::log_debug;
use crate::logger::DEFAULT_LOG_FILE;
use crate::models::ModelId;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "AI Studio: a terminal chat studio with a mock AI responder",
    long_about = "AI Studio lets you chat with a simulated model, tune generation settings, keep notes and run keyword searches from the terminal.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Start an interactive chat session
    #[command(
        about = "Start an interactive chat session",
        long_about = "Chat with the selected model. Type /help inside the session for slash commands.",
        after_help = get_dynamic_help()
    )]
    Chat {
        #[command(flatten)]
        common: CommonParams,
    },

    /// Send a single prompt and print the reply
    #[command(about = "Send a single prompt and print the reply")]
    Ask {
        #[command(flatten)]
        common: CommonParams,

        /// Prompt to send
        prompt: String,

        /// Print only the reply text
        #[arg(short, long, help = "Print only the reply text")]
        print: bool,
    },

    /// List available models
    #[command(about = "List available models or show one model's capabilities")]
    Models {
        /// Model id to describe
        id: Option<String>,
    },

    /// Configure AI Studio settings
    #[command(about = "Configure AI Studio settings")]
    Config {
        #[command(flatten)]
        common: CommonParams,

        /// Artificial response delay in milliseconds
        #[arg(long, help = "Artificial response delay in milliseconds")]
        delay_ms: Option<u64>,

        /// Clear a previously configured seed
        #[arg(long, help = "Clear a previously configured seed")]
        clear_seed: bool,

        /// Keyword search endpoint
        #[arg(long, help = "Keyword search endpoint")]
        search_endpoint: Option<String>,

        /// Search engine id
        #[arg(long, help = "Search engine id (cx)")]
        search_engine: Option<String>,

        /// Search API key
        #[arg(long, help = "Search API key")]
        search_api_key: Option<String>,

        /// Identity notes are stored under
        #[arg(long, help = "Identity notes are stored under")]
        user_id: Option<String>,

        /// Include HTTP client logs when logging is enabled
        #[arg(long, help = "Include HTTP client logs when logging is enabled")]
        verbose_logging: Option<bool>,
    },

    /// Run a keyword search
    #[command(about = "Run a keyword web search")]
    Search {
        /// Search query
        query: String,
    },

    /// Manage notes
    #[command(about = "Manage your notes")]
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Manage stored files
    #[command(about = "Upload, list and remove your stored files")]
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },
}

/// File storage operations
#[derive(Subcommand)]
pub enum FilesAction {
    /// List your files
    #[command(about = "List your files")]
    List,

    /// Upload a file
    #[command(about = "Upload a file")]
    Upload {
        /// File to upload
        path: PathBuf,
    },

    /// Save a stored file locally
    #[command(about = "Save a stored file locally")]
    Get {
        /// Stored file name
        name: String,

        #[arg(short, long, help = "Destination path (defaults to the stored name)")]
        output: Option<PathBuf>,
    },

    /// Delete a file
    #[command(about = "Delete a file")]
    Rm {
        /// Stored file name
        name: String,
    },

    /// Print a link to a file
    #[command(about = "Print a link to a file")]
    Url {
        /// Stored file name
        name: String,
    },
}

/// Notes operations
#[derive(Subcommand)]
pub enum NotesAction {
    /// List your notes
    #[command(about = "List your notes")]
    List {
        /// Show at most this many notes
        #[arg(long, help = "Show at most this many notes")]
        limit: Option<usize>,

        /// Most recent notes first
        #[arg(long, help = "Show the most recent notes first")]
        newest_first: bool,
    },

    /// Create a note
    #[command(about = "Create a note")]
    Add {
        #[arg(long, help = "Note title")]
        title: String,

        #[arg(long, help = "Note content")]
        content: String,
    },

    /// Edit a note
    #[command(about = "Edit a note")]
    Edit {
        /// Note id
        id: i64,

        #[arg(long, help = "New title")]
        title: Option<String>,

        #[arg(long, help = "New content")]
        content: Option<String>,
    },

    /// Delete a note
    #[command(about = "Delete a note")]
    Rm {
        /// Note id
        id: i64,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Generate dynamic help listing the model catalog
fn get_dynamic_help() -> String {
    let models_list = ModelId::all_ids()
        .iter()
        .map(|m| format!("{}", m.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable models: {models_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE);
        crate::logger::set_log_file(log_file)?;

        if let Ok(config) = crate::config::Config::load() {
            crate::logger::set_verbose_logging(config.performance.verbose_logging);
            if config.performance.verbose_logging {
                log_debug!("Verbose logging enabled - will show HTTP client logs");
            } else {
                log_debug!("Verbose logging disabled - hiding noisy external library logs");
            }
        }
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        crate::ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        let _ = Cli::parse_from(["ai-studio", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Chat { common } => {
            log_debug!("Handling 'chat' command with common: {:?}", common);
            ui::print_version(crate_version!());
            ui::print_newline();
            commands::handle_chat_command(&common).await
        }
        Commands::Ask {
            common,
            prompt,
            print,
        } => {
            log_debug!(
                "Handling 'ask' command with common: {:?}, print: {}",
                common,
                print
            );
            commands::handle_ask_command(&common, &prompt, print).await
        }
        Commands::Models { id } => commands::handle_models_command(id.as_deref()),
        Commands::Config {
            common,
            delay_ms,
            clear_seed,
            search_endpoint,
            search_engine,
            search_api_key,
            user_id,
            verbose_logging,
        } => commands::handle_config_command(
            &common,
            commands::ConfigChanges {
                delay_ms,
                clear_seed,
                search_endpoint,
                search_engine,
                search_api_key,
                user_id,
                verbose_logging,
            },
        ),
        Commands::Search { query } => commands::handle_search_command(&query).await,
        Commands::Notes { action } => commands::handle_notes_command(action).await,
        Commands::Files { action } => commands::handle_files_command(action).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_overrides() {
        let cli = Cli::parse_from([
            "ai-studio",
            "ask",
            "tell me about tides",
            "--model",
            "gemini-ultra",
            "--max-tokens",
            "900",
            "--instant",
        ]);
        let Some(Commands::Ask { common, prompt, print }) = cli.command else {
            panic!("expected ask command");
        };
        assert_eq!(prompt, "tell me about tides");
        assert_eq!(common.model.as_deref(), Some("gemini-ultra"));
        assert_eq!(common.max_tokens, Some(900));
        assert!(common.instant);
        assert!(!print);
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        assert!(Cli::try_parse_from(["ai-studio", "chat", "--model", "llama"]).is_err());
    }

    #[test]
    fn test_parse_notes_edit() {
        let cli = Cli::parse_from(["ai-studio", "notes", "edit", "3", "--title", "New"]);
        let Some(Commands::Notes {
            action: NotesAction::Edit { id, title, content },
        }) = cli.command
        else {
            panic!("expected notes edit");
        };
        assert_eq!(id, 3);
        assert_eq!(title.as_deref(), Some("New"));
        assert!(content.is_none());
    }

    #[test]
    fn test_parse_notes_list_options() {
        let cli = Cli::parse_from(["ai-studio", "notes", "list", "--limit", "5", "--newest-first"]);
        let Some(Commands::Notes {
            action: NotesAction::List { limit, newest_first },
        }) = cli.command
        else {
            panic!("expected notes list");
        };
        assert_eq!(limit, Some(5));
        assert!(newest_first);
    }

    #[test]
    fn test_parse_files_commands() {
        let cli = Cli::parse_from(["ai-studio", "files", "upload", "report.pdf"]);
        let Some(Commands::Files {
            action: FilesAction::Upload { path },
        }) = cli.command
        else {
            panic!("expected files upload");
        };
        assert_eq!(path, PathBuf::from("report.pdf"));

        let cli = Cli::parse_from(["ai-studio", "files", "get", "1_a.txt", "-o", "out.txt"]);
        let Some(Commands::Files {
            action: FilesAction::Get { name, output },
        }) = cli.command
        else {
            panic!("expected files get");
        };
        assert_eq!(name, "1_a.txt");
        assert_eq!(output, Some(PathBuf::from("out.txt")));

        assert!(Cli::try_parse_from(["ai-studio", "files", "rm"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["ai-studio", "models", "-q", "--log"]);
        assert!(cli.quiet);
        assert!(cli.log);
    }
}
