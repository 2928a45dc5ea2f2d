mod client;
mod conversation_logger;

use anyhow::Result;
use client::{BackendClient, ConnectionStatus, RelayReply};
use conversation_logger::ConversationLogger;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use sarathi_shared::{
    language_tag, next_language, ChatMessage, ChatRequest, MessageRole, DEFAULT_LANGUAGE,
    DEFAULT_MODEL,
};
use std::io;
use tokio::sync::mpsc;
use tracing::error;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

struct Settings {
    server_url: String,
    language: String,
    model: String,
}

impl Settings {
    fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            server_url: var("SARATHI_SERVER_URL", DEFAULT_SERVER_URL),
            language: var("SARATHI_LANGUAGE", DEFAULT_LANGUAGE),
            model: var("SARATHI_MODEL", DEFAULT_MODEL),
        }
    }
}

struct App {
    messages: Vec<ChatMessage>,
    input: String,
    scroll: u16,
    connection_status: ConnectionStatus,
    waiting: bool,
    language: String,
    model: String,
    server_url: String,
    logger: ConversationLogger,
}

impl App {
    fn new(settings: Settings, logger: ConversationLogger) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: MessageRole::System,
                content: "Welcome to Sarathi! Ask about any government form. Tab switches language."
                    .to_string(),
            }],
            input: String::new(),
            scroll: 0,
            connection_status: ConnectionStatus::Idle,
            waiting: false,
            language: settings.language,
            model: settings.model,
            server_url: settings.server_url,
            logger,
        }
    }

    fn push(&mut self, role: MessageRole, content: String) {
        let message = ChatMessage { role, content };
        if let Err(e) = self.logger.log_message(&self.language, &message) {
            error!("Failed to log message: {}", e);
        }
        self.messages.push(message);
    }

    fn add_system_note(&mut self, content: String) {
        self.push(MessageRole::System, content);
    }

    /// Transcript for the relay; system notes exist only in the UI.
    fn build_request(&self) -> ChatRequest {
        ChatRequest {
            messages: self
                .messages
                .iter()
                .filter(|msg| msg.role != MessageRole::System)
                .cloned()
                .collect(),
            language: self.language.clone(),
            model: self.model.clone(),
        }
    }

    fn cycle_language(&mut self) {
        self.language = next_language(&self.language).to_string();
    }

    /// Rendered transcript, oldest line first.
    fn transcript(&self) -> Vec<Line<'static>> {
        let pending = self.waiting.then(|| ChatMessage {
            role: MessageRole::Assistant,
            content: "●●●".to_string(),
        });

        let mut lines = Vec::new();
        for msg in self.messages.iter().chain(pending.as_ref()) {
            let (prefix, color) = match msg.role {
                MessageRole::System => ("System", Color::Yellow),
                MessageRole::User => ("You", Color::Cyan),
                MessageRole::Assistant => ("Sarathi", Color::Green),
            };
            lines.push(Line::from(Span::styled(
                format!("{}:", prefix),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(Line::from(Span::raw(line.to_string())));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    fn scroll_up(&mut self) {
        let total = self.transcript().len() as u16;
        if self.scroll < total {
            self.scroll += 1;
        }
    }

    fn handle_reply(&mut self, reply: RelayReply) {
        self.waiting = false;
        match reply {
            RelayReply::Completion(content) => self.push(MessageRole::Assistant, content),
            RelayReply::Error(e) => self.add_system_note(format!("Error: {}", e)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Log to a file so the TUI is not corrupted
    let log_file = std::fs::File::create("sarathi-cli.log").ok();
    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .init();
    }

    let settings = Settings::from_env();
    let (client, mut reply_rx) = BackendClient::new(&settings.server_url);
    let mut app = App::new(settings, ConversationLogger::default());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        while let Ok(event) = event::read() {
            if ui_tx.send(event).is_err() {
                break;
            }
        }
    });

    let res = run_app(&mut terminal, &mut app, client, &mut reply_rx, &mut ui_rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    if let Some(path) = app.logger.get_current_log_path() {
        println!("Conversation saved to {}", path.display());
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: BackendClient,
    reply_rx: &mut mpsc::UnboundedReceiver<RelayReply>,
    ui_rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    loop {
        app.connection_status = client.get_status().await;
        terminal.draw(|f| ui(f, app))?;

        tokio::select! {
            Some(event) = ui_rx.recv() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                                return Ok(())
                            }
                            KeyCode::Char(c) => {
                                app.input.push(c);
                            }
                            KeyCode::Backspace => {
                                app.input.pop();
                            }
                            KeyCode::Tab => {
                                app.cycle_language();
                            }
                            KeyCode::Enter => {
                                // One request in flight at a time
                                if !app.input.is_empty() && !app.waiting {
                                    let content = std::mem::take(&mut app.input);
                                    app.push(MessageRole::User, content);

                                    if let Err(e) = client.send_message(app.build_request()).await {
                                        app.add_system_note(format!("Failed to send message: {}", e));
                                    } else {
                                        app.waiting = true;
                                    }
                                }
                            }
                            KeyCode::Up => {
                                app.scroll_up();
                            }
                            KeyCode::Down => {
                                app.scroll = app.scroll.saturating_sub(1);
                            }
                            _ => {}
                        }
                    }
                }
            }
            Some(reply) = reply_rx.recv() => {
                app.handle_reply(reply);
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let status_color = match &app.connection_status {
        ConnectionStatus::Idle => Color::Green,
        ConnectionStatus::Waiting => Color::Yellow,
        ConnectionStatus::Error(_) => Color::Red,
    };

    let state = match &app.connection_status {
        ConnectionStatus::Idle => "ready".to_string(),
        ConnectionStatus::Waiting => "waiting for reply...".to_string(),
        ConnectionStatus::Error(e) => format!("error: {}", e),
    };
    let status_text = format!(
        "● {} | {} ({}) | {}",
        app.server_url,
        app.language,
        language_tag(&app.language),
        state
    );

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .block(Block::default());
    f.render_widget(status, chunks[0]);

    let lines = app.transcript();
    let height = chunks[1].height.saturating_sub(2) as usize;
    let offset = transcript_offset(lines.len(), height, app.scroll);

    let transcript = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Chat"))
        .scroll((offset, 0));

    f.render_widget(transcript, chunks[1]);

    let input = Paragraph::new(app.input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Input (Tab: language, Ctrl-Q: quit)"),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(input, chunks[2]);
}

/// First visible line when the view sits `scroll` lines above the newest one.
fn transcript_offset(total: usize, height: usize, scroll: u16) -> u16 {
    let bottom = total.saturating_sub(height);
    bottom.saturating_sub(scroll as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    /// Per-test log directory, removed on drop.
    struct LogDir(PathBuf);

    impl Drop for LogDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    fn app(name: &str) -> (App, LogDir) {
        let settings = Settings {
            server_url: DEFAULT_SERVER_URL.to_string(),
            language: "en".to_string(),
            model: "indic-llm".to_string(),
        };
        let dir = std::env::temp_dir().join(format!(
            "sarathi-app-{}-{}",
            name,
            std::process::id()
        ));
        let logger = ConversationLogger::in_dir(&dir).unwrap();
        (App::new(settings, logger), LogDir(dir))
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn long_conversation(app: &mut App) {
        for i in 0..20 {
            app.push(MessageRole::User, format!("question {i}"));
            app.push(MessageRole::Assistant, format!("answer {i}"));
        }
    }

    #[test]
    fn request_excludes_system_notes() {
        let (mut app, _dir) = app("request");
        app.push(MessageRole::User, "A".to_string());
        app.add_system_note("Error: boom".to_string());
        app.push(MessageRole::Assistant, "B".to_string());

        let request = app.build_request();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, "A");
        assert_eq!(request.messages[1].content, "B");
        assert_eq!(request.language, "en");
        assert_eq!(request.model, "indic-llm");
    }

    #[test]
    fn tab_cycles_through_languages() {
        let (mut app, _dir) = app("language");
        app.cycle_language();
        assert_eq!(app.language, "hi");
        for _ in 0..9 {
            app.cycle_language();
        }
        assert_eq!(app.language, "en");
    }

    #[test]
    fn replies_clear_waiting() {
        let (mut app, _dir) = app("replies");
        app.waiting = true;
        app.handle_reply(RelayReply::Completion("hello".to_string()));
        assert!(!app.waiting);
        assert_eq!(app.messages.last().unwrap().content, "hello");

        app.waiting = true;
        app.handle_reply(RelayReply::Error("boom".to_string()));
        assert!(!app.waiting);
        let last = app.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::System);
        assert_eq!(last.content, "Error: boom");
    }

    #[test]
    fn long_transcript_shows_newest_reply() {
        let (mut app, _dir) = app("newest");
        long_conversation(&mut app);

        let screen = render(&app, 60, 20);
        assert!(screen.contains("answer 19"));
        assert!(!screen.contains("answer 0"));
    }

    #[test]
    fn scrolling_up_reveals_older_messages() {
        let (mut app, _dir) = app("scroll");
        long_conversation(&mut app);

        app.scroll_up();
        app.scroll_up();
        app.scroll_up();
        let screen = render(&app, 60, 20);
        assert!(!screen.contains("answer 19"));
        assert!(screen.contains("answer 18"));

        for _ in 0..500 {
            app.scroll_up();
        }
        let screen = render(&app, 60, 20);
        assert!(screen.contains("Welcome to Sarathi"));
        assert!(screen.contains("answer 0"));
        assert!(!screen.contains("answer 19"));
    }

    #[test]
    fn offset_is_anchored_to_bottom() {
        assert_eq!(transcript_offset(10, 14, 0), 0);
        assert_eq!(transcript_offset(123, 14, 0), 109);
        assert_eq!(transcript_offset(123, 14, 5), 104);
        assert_eq!(transcript_offset(123, 14, 500), 0);
    }
}
