//! Application state and key handling.

use codebug_editor::{
    AnalysisController, AnalysisOutcome, AnalysisService, CodeEditor, CursorCommand, EditCommand,
    HighlightingEngine, SubmitError, UiState, Viewport, submit_enabled,
};
use codebug_editor_highlight_simple::RegexHighlighter;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

pub struct App {
    editor: CodeEditor,
    controller: AnalysisController,
    /// Colours the result pane; `None` renders it as plain text.
    result_highlighter: Option<RegexHighlighter>,
    /// First visible row of the result pane.
    result_scroll: usize,
    viewport: Viewport,
    endpoint: String,
    status_message: String,
    health: Option<Receiver<Result<(), String>>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        text: String,
        engine: Option<Box<dyn HighlightingEngine>>,
        service: Arc<dyn AnalysisService>,
        endpoint: impl Into<String>,
    ) -> Self {
        let result_highlighter = match RegexHighlighter::json_default() {
            Ok(highlighter) => Some(highlighter),
            Err(err) => {
                tracing::warn!(%err, "result highlighting disabled");
                None
            }
        };

        Self {
            editor: CodeEditor::new(text, engine),
            controller: AnalysisController::new(service),
            result_highlighter,
            result_scroll: 0,
            viewport: Viewport::new(0, 0),
            endpoint: endpoint.into(),
            status_message: String::new(),
            health: None,
            should_quit: false,
        }
    }

    pub fn editor(&self) -> &CodeEditor {
        &self.editor
    }

    pub fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn result_highlighter(&self) -> Option<&RegexHighlighter> {
        self.result_highlighter.as_ref()
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn can_submit(&self) -> bool {
        submit_enabled(self.controller.state(), self.editor.text())
    }

    /// Record the editor pane size and keep the cursor inside it.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.editor.ensure_cursor_visible(viewport);
    }

    /// Run a service liveness probe in the background; the result shows up in the status line.
    pub fn watch_health<F>(&mut self, probe: F)
    where
        F: FnOnce() -> Result<(), String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(probe());
        });
        self.health = Some(rx);
    }

    /// Apply finished background work. Called once per frame.
    pub fn tick(&mut self) {
        if let Some(rx) = &self.health
            && let Ok(result) = rx.try_recv()
        {
            self.status_message = match result {
                Ok(()) => format!("Analysis service online at {}", self.endpoint),
                Err(err) => format!("Analysis service unreachable: {err}"),
            };
            self.health = None;
        }

        let summary = self.controller.poll();
        if summary.applied > 0 {
            self.result_scroll = 0;
            self.status_message = match self.controller.state().outcome() {
                Some(AnalysisOutcome::Success(_)) => "Analysis finished".to_string(),
                Some(AnalysisOutcome::Failure(_)) => "Analysis failed".to_string(),
                None => String::new(),
            };
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                self.should_quit = true;
                return;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) | (_, KeyCode::F(5)) => self.analyze(),
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => self.clear(),

            (KeyModifiers::ALT, KeyCode::Up) => {
                self.result_scroll = self.result_scroll.saturating_sub(1);
            }
            (KeyModifiers::ALT, KeyCode::Down) => {
                self.result_scroll = self.result_scroll.saturating_add(1);
            }

            (KeyModifiers::CONTROL, KeyCode::Home) => {
                self.editor.move_cursor(CursorCommand::DocumentStart);
            }
            (KeyModifiers::CONTROL, KeyCode::End) => {
                self.editor.move_cursor(CursorCommand::DocumentEnd);
            }
            (_, KeyCode::Left) => {
                self.editor.move_cursor(CursorCommand::Left);
            }
            (_, KeyCode::Right) => {
                self.editor.move_cursor(CursorCommand::Right);
            }
            (_, KeyCode::Up) => {
                self.editor.move_cursor(CursorCommand::Up);
            }
            (_, KeyCode::Down) => {
                self.editor.move_cursor(CursorCommand::Down);
            }
            (_, KeyCode::Home) => {
                self.editor.move_cursor(CursorCommand::LineStart);
            }
            (_, KeyCode::End) => {
                self.editor.move_cursor(CursorCommand::LineEnd);
            }
            (_, KeyCode::PageUp) => self.page(CursorCommand::Up),
            (_, KeyCode::PageDown) => self.page(CursorCommand::Down),

            (_, KeyCode::Enter) => {
                self.editor.edit(EditCommand::InsertNewline);
            }
            (_, KeyCode::Tab) => {
                self.editor.edit(EditCommand::InsertTab);
            }
            (_, KeyCode::Backspace) => {
                self.editor.edit(EditCommand::Backspace);
            }
            (_, KeyCode::Delete) => {
                self.editor.edit(EditCommand::DeleteForward);
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.editor.edit(EditCommand::Insert {
                    text: c.to_string(),
                });
            }
            _ => {}
        }

        self.editor.ensure_cursor_visible(self.viewport);
    }

    /// Insert pasted text with line endings normalized to `\n`.
    pub fn handle_paste(&mut self, text: String) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.editor.edit(EditCommand::Insert { text });
        self.editor.ensure_cursor_visible(self.viewport);
    }

    fn analyze(&mut self) {
        match self.controller.analyze(self.editor.text()) {
            Ok(request) => {
                self.status_message = format!("Submitted request {request} to {}", self.endpoint);
            }
            Err(SubmitError::Busy(_)) => {
                self.status_message = "An analysis is already in progress".to_string();
            }
            Err(SubmitError::EmptySource) => {
                self.status_message = "Nothing to analyze, type some code first".to_string();
            }
        }
    }

    /// Empty the editor and forget the last result.
    fn clear(&mut self) {
        self.editor.set_text("");
        self.controller.clear();
        self.result_scroll = 0;
        self.status_message = "Cleared".to_string();
    }

    fn page(&mut self, direction: CursorCommand) {
        for _ in 0..self.viewport.height.max(1) {
            if !self.editor.move_cursor(direction) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codebug_editor::{
        AnalysisRequest, Position, Presentation, ScrollOffset, ServiceError, present,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::{Duration, Instant};

    struct LineCounter;

    impl AnalysisService for LineCounter {
        fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError> {
            Ok(json!({ "lines": request.code.line_count() }))
        }
    }

    fn app(text: &str) -> App {
        let mut app = App::new(text.to_string(), None, Arc::new(LineCounter), "mock");
        app.set_viewport(Viewport::new(40, 5));
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => press(app, KeyCode::Enter),
                c => press(app, KeyCode::Char(c)),
            }
        }
    }

    fn tick_until_resolved(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.state().is_pending() {
            assert!(Instant::now() < deadline, "analysis never completed");
            app.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_typing_updates_overlay() {
        let mut app = app("");
        type_text(&mut app, "if a<b:\nx");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.editor().text().as_str(), "if a<b:\nx   ");
        assert_eq!(app.editor().rendered().markup, "if a&lt;b:\nx   ");
    }

    #[test]
    fn test_analyze_round_trip() {
        let mut app = app("");
        assert!(!app.can_submit());
        type_text(&mut app, "a = 1\nb = 2");
        assert!(app.can_submit());

        ctrl(&mut app, 'r');
        assert!(app.state().is_pending());
        assert!(!app.can_submit());
        assert!(app.status_message().contains("#1"));

        tick_until_resolved(&mut app);
        assert_eq!(app.status_message(), "Analysis finished");
        assert_eq!(
            present(app.state()),
            Presentation::Success {
                body: "{\n  \"lines\": 2\n}".to_string()
            }
        );
    }

    #[test]
    fn test_f5_on_blank_text_is_refused() {
        let mut app = app("   ");
        press(&mut app, KeyCode::F(5));
        assert_eq!(app.state(), &UiState::Idle);
        assert_eq!(app.status_message(), "Nothing to analyze, type some code first");
    }

    #[test]
    fn test_clear_empties_editor_and_result() {
        let mut app = app("print(1)");
        press(&mut app, KeyCode::F(5));
        tick_until_resolved(&mut app);

        ctrl(&mut app, 'l');
        assert_eq!(app.editor().text().as_str(), "");
        assert_eq!(app.editor().rendered().markup, " ");
        assert_eq!(app.state(), &UiState::Idle);
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut app = app("");
        app.handle_paste("a\r\nb\rc".to_string());
        assert_eq!(app.editor().text().as_str(), "a\nb\nc");
    }

    #[test]
    fn test_page_down_scrolls_both_layers() {
        let text = (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut app = app(&text);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.editor().surface().cursor_position(), Position::new(5, 0));
        assert_eq!(app.editor().scroll_offset(), ScrollOffset::new(1, 0));
        assert_eq!(
            app.editor().overlay().scroll_offset(),
            app.editor().scroll_offset()
        );

        app.handle_key_event(KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL));
        assert_eq!(app.editor().scroll_offset(), ScrollOffset::new(15, 0));
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = app("x");
        assert!(!app.should_quit());
        ctrl(&mut app, 'q');
        assert!(app.should_quit());
        assert_eq!(app.editor().text().as_str(), "x");
    }

    #[test]
    fn test_health_probe_reported() {
        let mut app = app("");
        app.watch_health(|| Err("connection refused".to_string()));
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.status_message().is_empty() {
            assert!(Instant::now() < deadline, "probe never reported");
            app.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(
            app.status_message(),
            "Analysis service unreachable: connection refused"
        );
    }
}
