use crate::chat::{ChatSession, ResponseBackend, SendOutcome};
use crate::cli::{FilesAction, NotesAction};
use crate::common::CommonParams;
use crate::config::{
    Config, GenerationSettings, MAX_TOKENS_RANGE, SettingsUpdate, TEMPERATURE_RANGE, TOP_P_RANGE,
};
use crate::files::{self, FileAction, FilesService, LocalFileStore};
use crate::messages;
use crate::models::ModelId;
use crate::notes::{
    FetchOptions, JsonNoteStore, NoteAction, NoteColumn, NoteUpdate, NotesService, notification,
};
use crate::search::{SearchClient, SearchError};
use crate::ui::{self, rgb};
use crate::{log_debug, log_info, log_warn, trace_warn};

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Settings only the `config` command can change
#[derive(Debug, Default, Clone)]
pub struct ConfigChanges {
    pub delay_ms: Option<u64>,
    pub clear_seed: bool,
    pub search_endpoint: Option<String>,
    pub search_engine: Option<String>,
    pub search_api_key: Option<String>,
    pub user_id: Option<String>,
    pub verbose_logging: Option<bool>,
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

/// Apply common and config-only changes to a config object.
/// Returns true if any changes were made.
pub fn apply_config_changes(
    config: &mut Config,
    common: &CommonParams,
    changes: ConfigChanges,
) -> Result<bool> {
    let mut changes_made = common.apply_to_config(config)?;

    changes_made |= set_if_changed(&mut config.performance.response_delay_ms, changes.delay_ms);
    changes_made |= set_if_changed(
        &mut config.performance.verbose_logging,
        changes.verbose_logging,
    );
    if changes.clear_seed && config.performance.seed.is_some() {
        config.performance.seed = None;
        changes_made = true;
    }

    if let Some(endpoint) = &changes.search_endpoint {
        url::Url::parse(endpoint).with_context(|| format!("Invalid search endpoint: {endpoint}"))?;
    }
    changes_made |= set_if_changed(&mut config.search.endpoint, changes.search_endpoint);
    changes_made |= set_if_changed(&mut config.search.engine_id, changes.search_engine);
    changes_made |= set_if_changed(&mut config.search.api_key, changes.search_api_key);

    if let Some(user_id) = &changes.user_id
        && user_id.trim().is_empty()
    {
        anyhow::bail!("User id cannot be empty");
    }
    changes_made |= set_if_changed(&mut config.notes.user_id, changes.user_id);

    Ok(changes_made)
}

/// Handle the 'config' command
pub fn handle_config_command(common: &CommonParams, changes: ConfigChanges) -> Result<()> {
    log_debug!(
        "Starting 'config' command with common: {:?}, changes: {:?}",
        common,
        ConfigChanges {
            search_api_key: changes.search_api_key.as_ref().map(|_| "***".to_string()),
            ..changes.clone()
        }
    );

    let mut config = Config::load()?;

    if apply_config_changes(&mut config, common, changes)? {
        config.save()?;
        log_info!("Configuration updated");
        ui::print_success("Configuration updated successfully.");
        ui::print_newline();
    }

    print_configuration(&config);

    Ok(())
}

/// Display the configuration
fn print_configuration(config: &Config) {
    let purple = rgb::ELECTRIC_PURPLE;
    let cyan = rgb::NEON_CYAN;
    let coral = rgb::CORAL;
    let yellow = rgb::ELECTRIC_YELLOW;
    let dim = rgb::DIM_WHITE;

    println!();
    println!(
        "{}  {}  {}",
        "━━━".truecolor(purple.0, purple.1, purple.2),
        "STUDIO CONFIGURATION".truecolor(cyan.0, cyan.1, cyan.2).bold(),
        "━━━".truecolor(purple.0, purple.1, purple.2)
    );
    println!();

    print_section_header("MODEL");
    print_config_row("Model", config.model.id(), cyan, true);
    print_settings_rows(&config.generation);

    println!();
    print_section_header("RESPONSES");
    print_config_row(
        "Delay",
        &format!("{} ms", config.performance.response_delay_ms),
        coral,
        false,
    );
    print_config_row("Seed", &seed_label(config.performance.seed), coral, false);

    println!();
    print_section_header("SEARCH");
    print_config_row("Endpoint", &config.search.endpoint, cyan, false);
    let engine = if config.search.engine_id.is_empty() {
        "(not set)"
    } else {
        config.search.engine_id.as_str()
    };
    print_config_row("Engine", engine, dim, false);
    let key = if config.search.effective_api_key().is_empty() {
        "(not set)"
    } else {
        "configured"
    };
    print_config_row("API Key", key, yellow, false);

    println!();
    print_section_header("NOTES");
    print_config_row("User", &config.notes.user_id, cyan, false);
    if let Ok(path) = config.notes.store_path() {
        print_config_row("File", &path.display().to_string(), dim, false);
    }

    println!();
    print_section_header("FILES");
    if let Ok(dir) = config.files.store_dir() {
        print_config_row("Folder", &dir.display().to_string(), dim, false);
    }

    println!();
    println!("{}", "─".repeat(40).truecolor(dim.0, dim.1, dim.2));
    println!();
}

fn seed_label(seed: Option<u64>) -> String {
    seed.map_or_else(|| "(random)".to_string(), |s| s.to_string())
}

fn print_settings_rows(settings: &GenerationSettings) {
    let yellow = rgb::ELECTRIC_YELLOW;
    print_config_row(
        "Temperature",
        &format!("{:.1}", settings.temperature),
        yellow,
        false,
    );
    print_config_row(
        "Max Tokens",
        &settings.max_tokens.to_string(),
        yellow,
        false,
    );
    print_config_row("Top P", &format!("{:.2}", settings.top_p), yellow, false);
}

/// Print a section header
fn print_section_header(name: &str) {
    let purple = rgb::ELECTRIC_PURPLE;
    let dim = rgb::DIM_WHITE;
    println!(
        "{} {} {}",
        "─".truecolor(purple.0, purple.1, purple.2),
        name.truecolor(purple.0, purple.1, purple.2).bold(),
        "─"
            .repeat(30 - name.len().min(28))
            .truecolor(dim.0, dim.1, dim.2)
    );
}

/// Print a config row with label and value
fn print_config_row(label: &str, value: &str, value_color: (u8, u8, u8), highlight: bool) {
    let dim = rgb::DIM_WHITE;
    let label_styled = format!("{label:>12}").truecolor(dim.0, dim.1, dim.2);

    let value_styled = if highlight {
        value
            .truecolor(value_color.0, value_color.1, value_color.2)
            .bold()
    } else {
        value.truecolor(value_color.0, value_color.1, value_color.2)
    };

    println!("{label_styled}  {value_styled}");
}

// ═══════════════════════════════════════════════════════════════════════════════
// Models
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle the 'models' command
pub fn handle_models_command(id: Option<&str>) -> Result<()> {
    let selected = Config::load().unwrap_or_default().model;

    match id {
        Some(id) => {
            let model: ModelId = id.parse()?;
            print_model_details(model);
        }
        None => print_model_list(selected),
    }
    Ok(())
}

fn print_model_list(selected: ModelId) {
    let cyan = rgb::NEON_CYAN;
    let dim = rgb::DIM_WHITE;
    println!("{}", "\nAvailable Models\n".bright_magenta().bold());
    for model in ModelId::ALL {
        let marker = if *model == selected { " ✦" } else { "" };
        println!(
            "  {}{}  {}",
            format!("{:<14}", model.id()).truecolor(cyan.0, cyan.1, cyan.2).bold(),
            marker,
            model.name()
        );
        println!("  {:<14}  {}", "", model.description().truecolor(dim.0, dim.1, dim.2));
    }
    println!();
}

fn print_model_details(model: ModelId) {
    let green = rgb::SUCCESS_GREEN;
    println!();
    print_section_header(&model.name().to_uppercase());
    println!("  {}", model.description());
    println!();
    for capability in model.capabilities() {
        println!("  {} {}", "•".truecolor(green.0, green.1, green.2), capability);
    }
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Ask / Chat
// ═══════════════════════════════════════════════════════════════════════════════

fn load_with_overrides(common: &CommonParams) -> Result<Config> {
    let mut config = Config::load()?;
    common.apply_to_config(&mut config)?;
    Ok(config)
}

/// Handle the 'ask' command
pub async fn handle_ask_command(common: &CommonParams, prompt: &str, print: bool) -> Result<()> {
    let config = load_with_overrides(common)?;
    let synth = config.build_synthesizer();
    let params = config.generation_params();

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let spinner = if print {
        indicatif::ProgressBar::hidden()
    } else {
        ui::create_spinner(messages::get_waiting_message().text)
    };
    let reply = synth.synthesize_cancellable(prompt, &params, &token).await;
    spinner.finish_and_clear();
    watcher.abort();

    match reply {
        Some(reply) if print => println!("{reply}"),
        Some(reply) => ui::print_reply(config.model.name(), &reply),
        None => ui::print_warning("Cancelled."),
    }
    Ok(())
}

/// A line typed in the chat prompt that starts with `/`
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Clear,
    Model(ModelId),
    Settings(SettingsUpdate),
    ShowSettings,
    Models,
    Help,
    Exit,
}

/// Parse a slash command. Returns `None` for ordinary chat input.
pub fn parse_slash_command(line: &str) -> Option<Result<SlashCommand, String>> {
    let rest = line.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    fn value<T: std::str::FromStr>(name: &str, arg: Option<&str>) -> Result<T, String> {
        let arg = arg.ok_or_else(|| format!("/{name} needs a value"))?;
        arg.parse()
            .map_err(|_| format!("'{arg}' is not a valid value for /{name}"))
    }

    let command = match name {
        "clear" => Ok(SlashCommand::Clear),
        "model" => match arg {
            Some(id) => id
                .parse()
                .map(SlashCommand::Model)
                .map_err(|e: crate::models::ModelError| e.to_string()),
            None => Err("/model needs a model id".to_string()),
        },
        "temperature" | "temp" => value(name, arg).map(|t| {
            SlashCommand::Settings(SettingsUpdate {
                temperature: Some(t),
                ..Default::default()
            })
        }),
        "max-tokens" => value(name, arg).map(|m| {
            SlashCommand::Settings(SettingsUpdate {
                max_tokens: Some(m),
                ..Default::default()
            })
        }),
        "top-p" => value(name, arg).map(|p| {
            SlashCommand::Settings(SettingsUpdate {
                top_p: Some(p),
                ..Default::default()
            })
        }),
        "settings" => Ok(SlashCommand::ShowSettings),
        "models" => Ok(SlashCommand::Models),
        "help" | "?" => Ok(SlashCommand::Help),
        "exit" | "quit" => Ok(SlashCommand::Exit),
        other => Err(format!("Unknown command /{other}. Type /help for a list.")),
    };
    Some(command)
}

fn print_chat_help() {
    let cyan = rgb::NEON_CYAN;
    let rows = [
        ("/clear", "Clear the conversation"),
        ("/model <id>", "Switch model"),
        ("/temperature <v>", "Set temperature (0.0 - 2.0)"),
        ("/max-tokens <n>", "Set max output length (50 - 1000, steps of 50)"),
        ("/top-p <v>", "Set top-p (0.0 - 1.0)"),
        ("/settings", "Show current settings"),
        ("/models", "List models"),
        ("/exit", "Leave the chat"),
    ];
    for (command, help) in rows {
        println!("  {}  {}", format!("{command:<18}").truecolor(cyan.0, cyan.1, cyan.2), help);
    }
}

fn print_session_settings<B: ResponseBackend>(session: &ChatSession<B>) {
    print_section_header("SETTINGS");
    print_config_row("Model", session.model().id(), rgb::NEON_CYAN, true);
    print_settings_rows(session.settings());
    ui::print_message(&format!(
        "  {}",
        format!(
            "ranges: temperature {}-{}, max tokens {}-{}, top-p {}-{}",
            TEMPERATURE_RANGE.0,
            TEMPERATURE_RANGE.1,
            MAX_TOKENS_RANGE.0,
            MAX_TOKENS_RANGE.1,
            TOP_P_RANGE.0,
            TOP_P_RANGE.1
        )
        .dimmed()
    ));
}

/// What the REPL should do after a slash command
enum Flow {
    Continue,
    Exit,
}

fn run_slash_command<B: ResponseBackend>(
    session: &mut ChatSession<B>,
    command: SlashCommand,
) -> Flow {
    match command {
        SlashCommand::Clear => {
            session.clear();
            ui::print_success("Conversation cleared.");
        }
        SlashCommand::Model(model) => {
            session.set_model(model);
            ui::print_success(&format!("Switched to {}.", model.name()));
        }
        SlashCommand::Settings(update) => match session.update_settings(update) {
            Ok(true) => ui::print_success("Settings updated."),
            Ok(false) => ui::print_info("Settings unchanged."),
            Err(e) => ui::print_error(&e.to_string()),
        },
        SlashCommand::ShowSettings => print_session_settings(session),
        SlashCommand::Models => print_model_list(session.model()),
        SlashCommand::Help => print_chat_help(),
        SlashCommand::Exit => return Flow::Exit,
    }
    Flow::Continue
}

/// Handle the 'chat' command
pub async fn handle_chat_command(common: &CommonParams) -> Result<()> {
    let config = load_with_overrides(common)?;
    let mut session = ChatSession::new(config.build_synthesizer(), config.model, config.generation);

    ui::print_info(&format!(
        "Chatting with {}. Type /help for commands, /exit to leave.",
        session.model().name()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "›".bright_magenta().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_slash_command(&line) {
            Some(Ok(command)) => {
                if let Flow::Exit = run_slash_command(&mut session, command) {
                    break;
                }
                continue;
            }
            Some(Err(message)) => {
                log_warn!("Rejected chat command: {}", line.trim());
                ui::print_warning(&message);
                continue;
            }
            None => {}
        }

        if line.trim().is_empty() {
            continue;
        }

        let waiting = messages::get_waiting_message();
        let (r, g, b) = waiting.color;
        let spinner = ui::create_spinner(&waiting.text.truecolor(r, g, b).to_string());
        let outcome = session.send(&line).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(SendOutcome::Replied(message)) => {
                ui::print_reply(session.model().name(), &message.content);
                ui::print_newline();
            }
            Ok(SendOutcome::Failed(notice)) => ui::print_notification(&notice),
            Err(e) => ui::print_warning(&e.to_string()),
        }
    }

    log_debug!(
        "Chat session ended with {} messages",
        session.state().messages().len()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Search
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle the 'search' command
pub async fn handle_search_command(query: &str) -> Result<()> {
    let config = Config::load()?;

    let outcome = match SearchClient::from_config(&config.search) {
        Ok(client) => {
            let waiting = messages::get_search_waiting_message();
            let spinner = ui::create_spinner(waiting.text);
            let result = client.search(query).await;
            spinner.finish_and_clear();
            result
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(results) => {
            ui::print_notification(&results.notification());
            let cyan = rgb::NEON_CYAN;
            let dim = rgb::DIM_WHITE;
            for item in &results.items {
                println!();
                println!("{}", item.title.truecolor(cyan.0, cyan.1, cyan.2).bold());
                println!("{}", item.display_link.green());
                println!("{}", textwrap::fill(&item.snippet, 88).truecolor(dim.0, dim.1, dim.2));
            }
            Ok(())
        }
        Err(e) => {
            if matches!(e, SearchError::MissingApiKey) {
                trace_warn!("search attempted without an API key");
                ui::print_info("Set one with 'ai-studio config --search-api-key <KEY>'.");
            }
            ui::print_notification(&e.notification());
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════════════

fn list_options(limit: Option<usize>, newest_first: bool) -> FetchOptions {
    let mut options = FetchOptions::new().order_by(NoteColumn::CreatedAt, !newest_first);
    options.limit = limit;
    options
}

/// Handle the 'notes' command
pub async fn handle_notes_command(action: NotesAction) -> Result<()> {
    let config = Config::load()?;
    let store = JsonNoteStore::open(config.notes.store_path()?)
        .context("Failed to open notes store")?;
    let service = NotesService::new(store, config.notes.user_id.clone());

    match action {
        NotesAction::List {
            limit,
            newest_first,
        } => {
            let result = service.list_with(list_options(limit, newest_first)).await;
            match &result {
                Ok(notes) if notes.is_empty() => {
                    ui::print_info(&format!("No notes yet for {}.", service.user_id()));
                }
                Ok(notes) => {
                    let purple = rgb::ELECTRIC_PURPLE;
                    let dim = rgb::DIM_WHITE;
                    for note in notes {
                        println!(
                            "{} {}  {}",
                            format!("#{}", note.id).truecolor(dim.0, dim.1, dim.2),
                            note.title.truecolor(purple.0, purple.1, purple.2).bold(),
                            note.created_at
                                .format("%Y-%m-%d %H:%M")
                                .to_string()
                                .truecolor(dim.0, dim.1, dim.2)
                        );
                        println!("{}\n", textwrap::indent(&note.content, "    "));
                    }
                }
                Err(_) => ui::print_notification(&notification(NoteAction::Load, &result)),
            }
        }
        NotesAction::Add { title, content } => {
            let result = service.create(&title, &content).await;
            ui::print_notification(&notification(NoteAction::Create, &result));
        }
        NotesAction::Edit { id, title, content } => {
            let result = service.edit(id, NoteUpdate { title, content }).await;
            ui::print_notification(&notification(NoteAction::Update, &result));
        }
        NotesAction::Rm { id } => {
            let result = service.delete(id).await;
            ui::print_notification(&notification(NoteAction::Delete, &result));
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle the 'files' command
pub async fn handle_files_command(action: FilesAction) -> Result<()> {
    let config = Config::load()?;
    let store = LocalFileStore::new(config.files.store_dir()?);
    let service = FilesService::new(store, config.notes.user_id.clone());

    match action {
        FilesAction::List => {
            let result = service.list().await;
            match &result {
                Ok(list) if list.is_empty() => ui::print_info("You don't have any files yet."),
                Ok(list) => print_file_table(list),
                Err(_) => ui::print_notification(&files::notification(FileAction::Load, &result)),
            }
        }
        FilesAction::Upload { path } => {
            let result = service.upload(&path).await;
            ui::print_notification(&files::notification(FileAction::Upload, &result));
            if let Ok(file) = &result {
                ui::print_message(&format!("  stored as {}", file.name));
            }
        }
        FilesAction::Get { name, output } => {
            let dest = output.unwrap_or_else(|| name.clone().into());
            let result = service.download(&name, &dest).await;
            ui::print_notification(&files::notification(FileAction::Download, &result));
            if result.is_ok() {
                ui::print_message(&format!("  saved to {}", dest.display()));
            }
        }
        FilesAction::Rm { name } => {
            let result = service.delete(&name).await;
            ui::print_notification(&files::notification(FileAction::Delete, &result));
        }
        FilesAction::Url { name } => match service.public_url(&name) {
            Ok(url) => println!("{url}"),
            Err(e) => {
                let result: Result<(), _> = Err(e);
                ui::print_notification(&files::notification(FileAction::Link, &result));
            }
        },
    }
    Ok(())
}

fn print_file_table(list: &[files::StoredFile]) {
    let cyan = rgb::NEON_CYAN;
    let dim = rgb::DIM_WHITE;
    println!(
        "{}",
        format!("{:<40} {:>8}  {}", "File Name", "Size", "Updated").truecolor(dim.0, dim.1, dim.2)
    );
    for file in list {
        let updated = file
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{} {:>8}  {}",
            format!("{:<40}", file.name).truecolor(cyan.0, cyan.1, cyan.2),
            format!("{} KB", file.size_kb()),
            updated.truecolor(dim.0, dim.1, dim.2)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(parse_slash_command("hello"), None);
        assert_eq!(parse_slash_command("/clear"), Some(Ok(SlashCommand::Clear)));
        assert_eq!(
            parse_slash_command("/model gemini-ultra"),
            Some(Ok(SlashCommand::Model(ModelId::GeminiUltra)))
        );
        assert_eq!(
            parse_slash_command(" /max-tokens 900 "),
            Some(Ok(SlashCommand::Settings(SettingsUpdate {
                max_tokens: Some(900),
                ..Default::default()
            })))
        );
        assert_eq!(parse_slash_command("/exit"), Some(Ok(SlashCommand::Exit)));
    }

    #[test]
    fn test_parse_slash_command_errors() {
        assert!(matches!(parse_slash_command("/temperature"), Some(Err(_))));
        assert!(matches!(parse_slash_command("/temperature warm"), Some(Err(_))));
        assert!(matches!(parse_slash_command("/model llama"), Some(Err(_))));
        assert!(matches!(parse_slash_command("/dance"), Some(Err(_))));
    }

    #[test]
    fn test_list_options() {
        let options = list_options(Some(3), true);
        assert_eq!(options.limit, Some(3));
        assert_eq!(
            options.order,
            Some(crate::notes::NoteOrder {
                column: NoteColumn::CreatedAt,
                ascending: false,
            })
        );
        assert!(list_options(None, false).order.is_some_and(|o| o.ascending));
    }

    #[test]
    fn test_seed_label() {
        assert_eq!(seed_label(None), "(random)");
        assert_eq!(seed_label(Some(42)), "42");
    }

    #[test]
    fn test_apply_config_changes() {
        let mut config = Config::default();
        let changes = ConfigChanges {
            delay_ms: Some(0),
            user_id: Some("alice".to_string()),
            search_engine: Some("engine".to_string()),
            ..Default::default()
        };
        assert!(
            apply_config_changes(&mut config, &CommonParams::default(), changes.clone())
                .expect("valid changes")
        );
        assert_eq!(config.performance.response_delay_ms, 0);
        assert_eq!(config.notes.user_id, "alice");
        assert_eq!(config.search.engine_id, "engine");
        assert!(
            !apply_config_changes(&mut config, &CommonParams::default(), changes)
                .expect("valid changes")
        );
    }

    #[test]
    fn test_apply_config_changes_rejects_bad_values() {
        let mut config = Config::default();
        let bad_endpoint = ConfigChanges {
            search_endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(apply_config_changes(&mut config, &CommonParams::default(), bad_endpoint).is_err());

        let blank_user = ConfigChanges {
            user_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(apply_config_changes(&mut config, &CommonParams::default(), blank_user).is_err());
        assert_eq!(config, Config::default());
    }
}
