use crate::client::{ClientResult, StoryApi, StoryClient};
use crate::controller::{OutputItem, PendingSubmission, RequestToken, StoryRequestController};
use crate::form::{FieldId, StoryForm};
use crate::render::CardLine;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use serde_json::Value;
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

type UiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const LABEL_WIDTH: usize = 18;
const FORM_HEIGHT: u16 = FieldId::ALL.len() as u16 + 2;
const SCROLL_STEP: u16 = 5;

// Restores terminal settings even if the loop exits early.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Self {
        Self
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();
    }
}

#[derive(Debug)]
pub enum UiEvent {
    Settled {
        token: RequestToken,
        result: ClientResult<Value>,
    },
}

/// Terminal colour for a card line at the given fade-in opacity.
fn line_style(line: &CardLine, opacity: f32) -> Style {
    let base = match line {
        CardLine::Title(_) => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
        CardLine::Caption(_) => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        CardLine::Paragraph(_) => Style::default().fg(Color::White),
        CardLine::Heading(_) => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        CardLine::Character(_) | CardLine::Field { .. } => Style::default().fg(Color::White),
        CardLine::Rationale(_) => Style::default().fg(Color::Gray),
    };

    if opacity < 0.34 {
        Style::default().fg(Color::Black)
    } else if opacity < 0.67 {
        base.fg(Color::DarkGray)
    } else {
        base
    }
}

fn card_line(line: &CardLine, style: Style) -> Line<'static> {
    let bold = style.add_modifier(Modifier::BOLD);
    match line {
        CardLine::Title(text) | CardLine::Caption(text) | CardLine::Paragraph(text) => {
            Line::from(Span::styled(text.clone(), style))
        }
        CardLine::Heading(text) => Line::from(Span::styled(*text, style)),
        CardLine::Character(character) => Line::from(vec![
            Span::styled("  • ", style),
            Span::styled(character.name.clone(), bold),
            Span::styled(format!(" — {}", character.summary), style),
        ]),
        CardLine::Field { label, value } => Line::from(vec![
            Span::styled(*label, bold),
            Span::styled(format!(" {}", value), style),
        ]),
        CardLine::Rationale(text) => Line::from(vec![
            Span::styled("Why it works for you:", bold),
            Span::styled(format!(" {}", text), style),
        ]),
    }
}

fn value_span(field: FieldId, text: &str) -> Span<'static> {
    if text.is_empty() {
        Span::styled(field.element_id(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(text.to_string())
    }
}

/// Builds the output pane from the controller's output container.
fn output_text(items: &[OutputItem], now: Instant) -> Text<'static> {
    let mut lines = Vec::new();
    for item in items {
        match item {
            OutputItem::Card(rendered) => {
                let opacity = rendered.reveal.opacity(now);
                for line in rendered.card.lines() {
                    let style = line_style(&line, opacity);
                    lines.push(card_line(&line, style));
                }
                lines.push(Line::default());
            }
            OutputItem::Error(message) => {
                lines.push(
                    Line::from(Span::styled(*message, Style::default().fg(Color::LightRed)))
                        .alignment(Alignment::Center),
                );
            }
        }
    }
    Text::from(lines)
}

/// Terminal cell for the cursor of a form row, clamped inside the border.
fn cursor_position(area: Rect, row: usize, cursor: usize) -> (u16, u16) {
    let column = u16::try_from(LABEL_WIDTH.saturating_add(cursor)).unwrap_or(u16::MAX);
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(column)
        .min(area.x.saturating_add(area.width.saturating_sub(2)));
    let y = area.y.saturating_add(1).saturating_add(row);
    (x, y)
}

pub struct App<A> {
    form: StoryForm,
    controller: StoryRequestController,
    api: Arc<A>,
    sender: mpsc::Sender<UiEvent>,
    receiver: mpsc::Receiver<UiEvent>,
    scroll: u16,
    should_quit: bool,
}

impl<A> App<A>
where
    A: StoryApi + Send + Sync + 'static,
{
    pub fn new(api: A) -> Self {
        let (sender, receiver) = mpsc::channel(16);

        Self {
            form: StoryForm::new(),
            controller: StoryRequestController::new(),
            api: Arc::new(api),
            sender,
            receiver,
            scroll: 0,
            should_quit: false,
        }
    }

    fn draw(&self, f: &mut Frame) {
        let [form_area, status_area, output_area] = Layout::vertical([
            Constraint::Length(FORM_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .areas(f.area());

        let focused = self.form.focused();
        let form_lines = FieldId::ALL
            .iter()
            .map(|&field| {
                let label_style = if field == focused {
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", field.label(), width = LABEL_WIDTH),
                        label_style,
                    ),
                    value_span(field, self.form.field(field).text()),
                ])
            })
            .collect::<Vec<_>>();

        let form = Paragraph::new(form_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Story form (Tab to move, Enter to submit, Esc to quit) ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(form, form_area);

        if self.controller.state().loading {
            let loading = Paragraph::new(Span::styled(
                "Generating stories...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            f.render_widget(loading, status_area);
        }

        let output = Paragraph::new(output_text(
            &self.controller.state().output,
            Instant::now(),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Stories ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((self.scroll, 0));
        f.render_widget(output, output_area);

        let row = FieldId::ALL
            .iter()
            .position(|&field| field == focused)
            .unwrap_or(0);
        f.set_cursor_position(cursor_position(
            form_area,
            row,
            self.form.field(focused).cursor(),
        ));
    }

    fn submit(&mut self) {
        let input = self.form.read();
        let PendingSubmission { token, request } = self.controller.begin_submission(&input);
        self.scroll = 0;

        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = api.post_story(&request).await;
            if sender.send(UiEvent::Settled { token, result }).await.is_err() {
                debug!("ui closed before request settled");
            }
        });
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Settled { token, result } => {
                debug!(request_id = %token.id(), "request settled");
                self.controller.settle(token, result);
            }
        }
    }

    fn handle_events(&mut self) -> UiResult<bool> {
        while let Ok(event) = self.receiver.try_recv() {
            self.apply_event(event);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }

                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    self.should_quit = true;
                    return Ok(false);
                }

                match key.code {
                    KeyCode::Esc => {
                        self.should_quit = true;
                        return Ok(false);
                    }
                    KeyCode::Enter => self.submit(),
                    KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
                    KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
                    KeyCode::PageDown => self.scroll = self.scroll.saturating_add(SCROLL_STEP),
                    KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(SCROLL_STEP),
                    KeyCode::Char(c) => self.form.focused_mut().insert_char(c),
                    KeyCode::Backspace => self.form.focused_mut().delete_char(),
                    KeyCode::Left => self.form.focused_mut().move_left(),
                    KeyCode::Right => self.form.focused_mut().move_right(),
                    KeyCode::Home => self.form.focused_mut().home(),
                    KeyCode::End => self.form.focused_mut().end(),
                    _ => {}
                }
            }
        }

        Ok(true)
    }
}

pub fn run_tui(client: StoryClient) -> UiResult<()> {
    enable_raw_mode()?;
    let _guard = TerminalGuard::new();

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    debug!(base_url = client.base_url(), "interactive session started");
    let mut app = App::new(client);

    terminal.draw(|f| app.draw(f))?;

    while !app.should_quit {
        if !app.handle_events()? {
            break;
        }

        terminal.draw(|f| app.draw(f))?;

        std::thread::sleep(Duration::from_millis(10));
    }

    Ok(())
}
