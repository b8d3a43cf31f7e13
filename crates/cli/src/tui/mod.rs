use std::io::{stdout, Write};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use pagesel_artic::Artwork;
use pagesel_engine::auto_select::accepts_partial_input;
use pagesel_engine::{
    AutoSelectStatus, FetchError, FetchOutcome, FetchTicket, PageResponse, PageSource,
    TableSession,
};

use crate::fetcher::Fetcher;
use crate::util;

/// Checkbox gutter: "[x] "
const GUTTER: usize = 4;

struct BrowseApp {
    session: TableSession<Artwork>,
    /// Row index on the resident page
    cursor: usize,
    /// "Select rows..." input; `Some` while the overlay is open
    input: Option<String>,
    /// One-line notice shown in the status bar until the next key
    notice: Option<String>,
    source_label: String,
    should_quit: bool,
    show_help: bool,
}

impl BrowseApp {
    fn new(session: TableSession<Artwork>, source_label: String) -> Self {
        Self {
            session,
            cursor: 0,
            input: None,
            notice: None,
            source_label,
            should_quit: false,
            show_help: false,
        }
    }

    /// Handle a key press. Returns a fetch to start, if the key asked for one.
    fn handle_key(&mut self, key: KeyEvent) -> Option<FetchTicket> {
        self.notice = None;

        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return None;
        }
        if self.input.is_some() {
            self.handle_input_key(key);
            return None;
        }

        let page = self.session.pager().current_page();
        let last = self.session.pager().total_pages();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_cursor_row(),
            KeyCode::Char('a') => {
                let all = self
                    .session
                    .ledger()
                    .is_page_fully_selected(self.session.pager().items());
                self.session.set_page_checked(!all);
            }
            KeyCode::Char('/') | KeyCode::Char('s') => self.input = Some(String::new()),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown if page < last => {
                return self.go_to(page + 1);
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp if page > 1 => {
                return self.go_to(page - 1);
            }
            KeyCode::Home | KeyCode::Char('g') => return self.go_to(1),
            KeyCode::End | KeyCode::Char('G') => return self.go_to(last),
            KeyCode::Char('r') => return Some(self.session.refresh()),
            _ => {}
        }
        None
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let value = match self.input.as_mut() {
            Some(value) => value,
            None => return,
        };
        match key.code {
            KeyCode::Esc => self.input = None,
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Char(c) => {
                let mut next = value.clone();
                next.push(c);
                if accepts_partial_input(&next) {
                    *value = next;
                }
            }
            KeyCode::Enter => {
                // Submit is disabled while the field is empty.
                if value.is_empty() {
                    return;
                }
                let submitted = value.clone();
                match self.session.submit_auto_select(&submitted) {
                    Ok(()) => {
                        self.input = None;
                        self.notice = Some(match self.session.auto_select() {
                            AutoSelectStatus::Active { target } => {
                                format!("selecting first {} rows", target)
                            }
                            AutoSelectStatus::Inactive => "selection cleared".to_string(),
                        });
                    }
                    Err(e) => self.notice = Some(e.to_string()),
                }
            }
            _ => {}
        }
    }

    fn go_to(&mut self, page: usize) -> Option<FetchTicket> {
        let ticket = self.session.on_page_requested(page);
        if ticket.is_some() {
            self.cursor = 0;
        }
        ticket
    }

    fn on_fetched(&mut self, ticket: &FetchTicket, result: Result<PageResponse<Artwork>, FetchError>) {
        if let FetchOutcome::Failed(e) = self.session.on_fetch_complete(ticket, result) {
            self.notice = Some(e.to_string());
        }
        let len = self.session.pager().items().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn move_cursor(&mut self, delta: i32) {
        let len = self.session.pager().items().len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as i32 + delta).clamp(0, len as i32 - 1) as usize;
    }

    fn toggle_cursor_row(&mut self) {
        let id = match self.session.pager().items().get(self.cursor) {
            Some(art) => art.id,
            None => return,
        };
        self.session.toggle_row(&id);
    }

    /// Dataset positions (1-based, inclusive) of the rows on screen.
    fn row_range(&self) -> Option<(usize, usize)> {
        let pager = self.session.pager();
        let page = pager.resident_page()?;
        let len = pager.items().len();
        if len == 0 {
            return None;
        }
        let offset = (page - 1) * pager.page_size();
        Some((offset + 1, offset + len))
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);

        if self.input.is_some() {
            self.draw_input(frame, area);
        } else if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.view();
        let target = match self.session.auto_select() {
            AutoSelectStatus::Active { target } => format!(" | first {} ", target),
            AutoSelectStatus::Inactive => String::new(),
        };
        let title = format!(
            " pagesel: {} | {} items | {} selected{} ",
            self.source_label, view.total, view.selected_count, target
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.view();
        if view.items.is_empty() {
            let msg = if view.loading { "Loading..." } else { "No artworks found." };
            let para = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(para, area);
            return;
        }

        let widths = util::artwork_column_widths((area.width as usize).saturating_sub(GUTTER));
        let page_checked = self.session.ledger().is_page_fully_selected(view.items);

        let header_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let mut header = vec![Span::styled(
            if page_checked { "[x] " } else { "[ ] " },
            header_style,
        )];
        for (name, w) in Artwork::COLUMNS.iter().zip(widths) {
            header.push(Span::styled(format!("{} ", util::pad_right(name, w)), header_style));
        }

        let visible_rows = area.height.saturating_sub(1) as usize;
        let scroll = self.cursor.saturating_sub(visible_rows.saturating_sub(1));

        let mut lines: Vec<Line> = Vec::with_capacity(visible_rows + 1);
        lines.push(Line::from(header));

        for (r, art) in view.items.iter().enumerate().skip(scroll).take(visible_rows) {
            let checked = self.session.ledger().is_selected(&art.id);
            let is_cursor = r == self.cursor;
            let style = if is_cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if checked {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };

            let mut spans = vec![Span::styled(if checked { "[x] " } else { "[ ] " }, style)];
            for (value, w) in art.cells().iter().zip(widths) {
                spans.push(Span::styled(format!("{} ", util::pad_right(value, w)), style));
            }
            lines.push(Line::from(spans));
        }

        let para = Paragraph::new(lines);
        frame.render_widget(para, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.view();

        let left = if let Some(notice) = &self.notice {
            format!(" {}", notice)
        } else if let Some(err) = view.error {
            format!(" {} (r: retry)", err)
        } else if view.loading {
            " loading...".to_string()
        } else if let Some((first, last)) = self.row_range() {
            format!(" {}-{} of {}", first, last, view.total)
        } else {
            " no rows".to_string()
        };
        let right = format!("Page {}/{}  ?: help ", view.current_page, view.total_pages);

        let padding = (area.width as usize)
            .saturating_sub(left.chars().count() + right.chars().count());
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let bg = if view.error.is_some() { Color::Red } else { Color::DarkGray };
        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(bg),
        )]))
        .style(Style::default().bg(bg));
        frame.render_widget(para, area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let value = self.input.as_deref().unwrap_or("");
        let popup = centered(area, 34, 5);
        let placeholder = value.is_empty();
        let lines = vec![
            Line::from(Span::styled(
                if placeholder { "Select rows..." } else { value },
                if placeholder {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                },
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: submit  Esc: cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Select first N rows ")
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Rows",
            "  ----",
            "  up / down / jk    Move cursor",
            "  space / x         Toggle row",
            "  a                 Toggle all rows on page",
            "  / or s            Select first N rows",
            "",
            "  Pages",
            "  -----",
            "  n / p             Next/prev page",
            "  PgDn / PgUp       Next/prev page",
            "  g / G             First/last page",
            "  r                 Reload page",
            "",
            "  General",
            "  -------",
            "  q / Esc           Quit",
            "  ?                 Toggle this help",
            "",
        ];
        let popup = centered(area, 46, help_lines.len() as u16 + 2);

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(
        area.x + x,
        area.y + y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Run the interactive table against `source` until the user quits.
pub fn run<S>(source: S, session: TableSession<Artwork>, source_label: String) -> Result<(), String>
where
    S: PageSource<Artwork> + Send + Sync + 'static,
{
    let fetcher = Fetcher::new(source);
    let mut app = BrowseApp::new(session, source_label);
    fetcher.spawn(app.session.mount());

    terminal::enable_raw_mode()
        .map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        for (ticket, result) in fetcher.drain() {
            app.on_fetched(&ticket, result);
        }

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(50))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                if let Some(ticket) = app.handle_key(key) {
                    fetcher.spawn(ticket);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Print one page as a plain-text table (non-TTY and `page` output).
pub fn print_plain(w: &mut impl Write, items: &[Artwork], width: usize) -> Result<(), String> {
    let id_width = items
        .iter()
        .map(|art| art.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max(2);
    let widths = util::artwork_column_widths(width.saturating_sub(id_width + 1));

    // Header
    write!(w, "{:>width$} ", "id", width = id_width).map_err(|e| e.to_string())?;
    for (name, cw) in Artwork::COLUMNS.iter().zip(widths) {
        write!(w, "{} ", util::pad_right(name, cw)).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    // Separator
    write!(w, "{:->width$}-", "", width = id_width).map_err(|e| e.to_string())?;
    for cw in widths {
        write!(w, "{}-", "-".repeat(cw)).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    // Rows
    for art in items {
        write!(w, "{:>width$} ", art.id, width = id_width).map_err(|e| e.to_string())?;
        for (value, cw) in art.cells().iter().zip(widths) {
            write!(w, "{} ", util::pad_right(value, cw)).map_err(|e| e.to_string())?;
        }
        writeln!(w).map_err(|e| e.to_string())?;
    }
    Ok(())
}
