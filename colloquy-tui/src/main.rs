//! Colloquy TUI entry point.

use colloquy_client::{ApiClient, ClientEvent};
use colloquy_tui::config::TuiConfig;
use colloquy_tui::error::TuiError;
use colloquy_tui::events::TuiEvent;
use colloquy_tui::keys::{map_key, Action};
use colloquy_tui::nav::View;
use colloquy_tui::notifications::NotificationLevel;
use colloquy_tui::persistence::{self, PersistedState};
use colloquy_tui::state::{App, InputMode};
use colloquy_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = TuiConfig::load()?;
    init_tracing(&config)?;
    run(config).await?;
    Ok(())
}

async fn run(config: TuiConfig) -> Result<(), TuiError> {
    let api = Arc::new(ApiClient::new(&config.client)?);
    let mut app = App::new(config, api);

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let (client_tx, mut client_rx) = mpsc::channel::<ClientEvent>(256);

    match app.api.list_conversations().await {
        Ok(edges) => {
            app.conversations_view.edges = edges;
            app.conversations_view.reconcile();
        }
        Err(err) => app.notify(
            NotificationLevel::Error,
            format!("Conversation list failed: {err}"),
        ),
    }

    if let Ok(Some(state)) = persistence::load(&app.config.persistence_path) {
        app.active_view = state.active_view;
        if let Some(conversation_id) = state.selected_conversation_id {
            if let Some(edge) = app
                .conversations_view
                .edges
                .iter()
                .find(|e| e.id == conversation_id)
            {
                let name = edge.name.clone();
                app.open_conversation(conversation_id, name, client_tx.clone());
            }
        }
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx.clone());

    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event, &event_tx, &client_tx) {
                    break;
                }
            }
            Some(event) = client_rx.recv() => {
                handle_client_event(&mut app, event);
            }
        }
    }

    let persisted = PersistedState {
        active_view: app.active_view,
        selected_conversation_id: app.chat_view.conversation_id,
    };
    let _ = persistence::save(&app.config.persistence_path, &persisted);

    Ok(())
}

fn init_tracing(config: &TuiConfig) -> io::Result<()> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                match evt {
                    CrosstermEvent::Key(key) => {
                        let _ = sender.blocking_send(TuiEvent::Input(key));
                    }
                    CrosstermEvent::Resize(width, height) => {
                        let _ = sender.blocking_send(TuiEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
        }
    });
}

fn handle_event(
    app: &mut App,
    event: TuiEvent,
    event_tx: &mpsc::Sender<TuiEvent>,
    client_tx: &mpsc::Sender<ClientEvent>,
) -> bool {
    match event {
        TuiEvent::Input(key) => return handle_key(app, key, event_tx, client_tx),
        TuiEvent::SendFinished { result, .. } => {
            app.finish_send(result);
        }
        TuiEvent::ConversationCreated { conversation_id } => {
            app.open_conversation(
                conversation_id,
                "New conversation".to_string(),
                client_tx.clone(),
            );
            refresh_conversations(app, event_tx);
        }
        TuiEvent::ConversationsRefreshed { edges } => {
            app.conversations_view.edges = edges;
            app.conversations_view.reconcile();
        }
        TuiEvent::ApiError(message) => {
            app.notify(NotificationLevel::Error, message);
        }
        TuiEvent::Resize { .. } => {}
    }
    false
}

fn handle_client_event(app: &mut App, event: ClientEvent) {
    match event {
        ClientEvent::Snapshot {
            conversation_id,
            conversation,
        } => app.apply_snapshot(conversation_id, *conversation),
        ClientEvent::PollFailed {
            conversation_id,
            error,
        } => {
            tracing::warn!(%conversation_id, %error, "poll failed");
            app.notify(NotificationLevel::Warning, format!("Refresh failed: {error}"));
        }
    }
}

fn handle_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    event_tx: &mpsc::Sender<TuiEvent>,
    client_tx: &mpsc::Sender<ClientEvent>,
) -> bool {
    match app.input_mode {
        InputMode::Compose => {
            handle_compose_key(app, key, event_tx);
            false
        }
        InputMode::Rename => {
            handle_rename_key(app, key, event_tx);
            false
        }
        InputMode::Normal => {
            let Some(action) = map_key(key) else {
                return false;
            };
            handle_action(app, action, event_tx, client_tx)
        }
    }
}

fn handle_compose_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    event_tx: &mpsc::Sender<TuiEvent>,
) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.compose.insert_newline();
        }
        KeyCode::Enter => start_send(app, event_tx),
        _ => {
            app.compose.input(key);
        }
    }
}

fn handle_rename_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    event_tx: &mpsc::Sender<TuiEvent>,
) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => {
            let new_name = app.rename_input.trim().to_string();
            let target = app.conversations_view.selected;
            app.cancel_input();
            if new_name.is_empty() {
                return;
            }
            if let Some(conversation_id) = target {
                let api = Arc::clone(&app.api);
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = api.rename_conversation(conversation_id, &new_name).await;
                    match result {
                        Ok(()) => send_refreshed_list(&api, &event_tx).await,
                        Err(err) => {
                            let _ = event_tx
                                .send(TuiEvent::ApiError(format!("Rename failed: {err}")))
                                .await;
                        }
                    }
                });
            }
        }
        KeyCode::Backspace => {
            app.rename_input.pop();
        }
        KeyCode::Char(c) => app.rename_input.push(c),
        _ => {}
    }
}

fn handle_action(
    app: &mut App,
    action: Action,
    event_tx: &mpsc::Sender<TuiEvent>,
    client_tx: &mpsc::Sender<ClientEvent>,
) -> bool {
    match action {
        Action::Quit => return true,
        Action::NextView => app.active_view = app.active_view.next(),
        Action::PrevView => app.active_view = app.active_view.previous(),
        Action::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                app.active_view = view;
            }
        }
        Action::MoveUp => app.select_previous(),
        Action::MoveDown => app.select_next(),
        Action::Open => {
            if app.active_view == View::Conversations {
                if let Some(edge) = app.conversations_view.selected_edge() {
                    let (id, name) = (edge.id, edge.name.clone());
                    app.open_conversation(id, name, client_tx.clone());
                }
            }
        }
        Action::ToggleExpand => app.toggle_expand(),
        Action::Compose => {
            if app.active_view == View::Chat {
                app.begin_compose();
            }
        }
        Action::NewConversation => {
            let api = Arc::clone(&app.api);
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                match api.create_conversation("New conversation", None).await {
                    Ok(conversation_id) => {
                        let _ = event_tx
                            .send(TuiEvent::ConversationCreated { conversation_id })
                            .await;
                    }
                    Err(err) => {
                        let _ = event_tx
                            .send(TuiEvent::ApiError(format!("Create failed: {err}")))
                            .await;
                    }
                }
            });
        }
        Action::RenameConversation => {
            if app.active_view == View::Conversations {
                app.begin_rename();
            }
        }
        Action::DeleteConversation => {
            if app.active_view == View::Conversations {
                if let Some(conversation_id) = app.conversations_view.selected {
                    if app.chat_view.conversation_id == Some(conversation_id) {
                        app.close_conversation();
                    }
                    let api = Arc::clone(&app.api);
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        match api.delete_conversation(conversation_id).await {
                            Ok(()) => send_refreshed_list(&api, &event_tx).await,
                            Err(err) => {
                                let _ = event_tx
                                    .send(TuiEvent::ApiError(format!("Delete failed: {err}")))
                                    .await;
                            }
                        }
                    });
                }
            }
        }
        Action::ExportConversation => {
            if app.active_view == View::Chat {
                app.export_conversation();
            }
        }
        Action::Refresh => refresh_conversations(app, event_tx),
        Action::Cancel => {}
    }
    false
}

/// Kick off an async send. The busy flag set here also parks the poll
/// manager; both are reset when the send resolves, success or not.
fn start_send(app: &mut App, event_tx: &mpsc::Sender<TuiEvent>) {
    if app.sending {
        return;
    }
    let Some(conversation_id) = app.chat_view.conversation_id else {
        return;
    };
    let Some(text) = app.take_compose_text() else {
        return;
    };
    app.cancel_input();
    app.mark_sending();

    let api = Arc::clone(&app.api);
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        let attachments: BTreeMap<String, String> = BTreeMap::new();
        let result = api
            .send_chat(conversation_id, &text, &attachments)
            .await
            .map(|_| ())
            .map_err(|err| err.to_string());
        let _ = event_tx
            .send(TuiEvent::SendFinished {
                conversation_id,
                result,
            })
            .await;
    });
}

fn refresh_conversations(app: &App, event_tx: &mpsc::Sender<TuiEvent>) {
    let api = Arc::clone(&app.api);
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        send_refreshed_list(&api, &event_tx).await;
    });
}

async fn send_refreshed_list(api: &ApiClient, event_tx: &mpsc::Sender<TuiEvent>) {
    match api.list_conversations().await {
        Ok(edges) => {
            let _ = event_tx.send(TuiEvent::ConversationsRefreshed { edges }).await;
        }
        Err(err) => {
            let _ = event_tx
                .send(TuiEvent::ApiError(format!("Conversation list failed: {err}")))
                .await;
        }
    }
}
