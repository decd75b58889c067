//! Ratatui front end for the selector.
//!
//! Draws to **stderr** so stdout stays clean for the shell line the caller
//! `eval`s. All decisions live in [`SelectorSession`]; this module only
//! renders it and feeds it key events.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use std::io::{self, IsTerminal, Stderr};

use crate::model::types::RankedEntry;
use crate::ui::components::theme::{ThemePalette, kbd_style, score_style};
use crate::ui::selector::{Action, LineEditor, Mode, Row, SelectorSession};
use crate::ui::shortcuts;

/// Restores the terminal on drop, including on early returns and errors.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        if let Err(e) = execute!(io::stderr(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("entering alternate screen");
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
    }
}

/// Run the interactive loop until the session yields a terminal action.
pub fn run_selector(session: &mut SelectorSession) -> Result<Action> {
    if !io::stderr().is_terminal() {
        bail!("the interactive picker needs a terminal on stderr");
    }

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stderr());
    let mut terminal: Terminal<CrosstermBackend<Stderr>> =
        Terminal::new(backend).context("creating terminal")?;
    let palette = ThemePalette::detect();
    let now = Utc::now();

    loop {
        terminal.draw(|f| draw(f, session, palette, now))?;
        if let Event::Key(key) = event::read()?
            && let Some(action) = session.handle_key(key)
        {
            tracing::debug!(mode = session.mode().label(), "selector finished");
            return Ok(action);
        }
    }
}

/// One-line key legend for the current mode.
pub fn footer_legend(mode: &Mode) -> String {
    match mode {
        Mode::Search => format!(
            "{} select • {} move • {} word • {} clear • {} delete • {} archive • {} promote • {} rename • {} quit",
            shortcuts::SELECT,
            shortcuts::NAV,
            shortcuts::DELETE_WORD,
            shortcuts::CLEAR_QUERY,
            shortcuts::DELETE,
            shortcuts::ARCHIVE,
            shortcuts::PROMOTE,
            shortcuts::RENAME,
            shortcuts::QUIT
        ),
        Mode::DeleteConfirm { .. } => format!(
            "type the name, then {} to delete • {} back",
            shortcuts::SELECT,
            shortcuts::BACK
        ),
        Mode::PromoteConfirm {
            index_prompt: true, ..
        }
        | Mode::RenameConfirm {
            index_prompt: true, ..
        } => format!("y update index • n/{} skip • {} back", shortcuts::SELECT, shortcuts::BACK),
        _ => format!(
            "{} confirm • {}/{} start/end • {} kill→end • {} kill→start • {} back",
            shortcuts::SELECT,
            shortcuts::LINE_START,
            shortcuts::LINE_END,
            shortcuts::KILL_TO_END,
            shortcuts::KILL_TO_START,
            shortcuts::BACK
        ),
    }
}

/// Human-friendly age of an entry, e.g. `just now`, `5m`, `3h`, `2d`, `6w`.
pub fn format_age(modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(modified).num_seconds().max(0);
    match secs {
        0..60 => "just now".to_string(),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        86_400..1_209_600 => format!("{}d", secs / 86_400),
        _ => format!("{}w", secs / 604_800),
    }
}

/// Split `name` into spans, styling the chars at `positions` as matches.
fn highlight_name(name: &str, positions: &[usize], palette: ThemePalette, base: Style) -> Line<'static> {
    if positions.is_empty() {
        return Line::from(Span::styled(name.to_string(), base));
    }
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;
    for (idx, c) in name.chars().enumerate() {
        let matched = positions.contains(&idx);
        if matched != run_matched && !run.is_empty() {
            let style = if run_matched { base.patch(palette.match_style()) } else { base };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = matched;
        run.push(c);
    }
    if !run.is_empty() {
        let style = if run_matched { base.patch(palette.match_style()) } else { base };
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

fn entry_item(ranked: &RankedEntry, palette: ThemePalette, now: DateTime<Utc>) -> ListItem<'static> {
    let mut line = highlight_name(
        &ranked.entry.name,
        &ranked.positions,
        palette,
        Style::default().fg(palette.fg),
    );
    line.spans.push(Span::styled(
        format!("  {}", format_age(ranked.entry.modified_at, now)),
        palette.hint_style(),
    ));
    line.spans.push(Span::styled(
        format!("  {:.2}", ranked.score),
        score_style(ranked.score, palette),
    ));
    ListItem::new(line)
}

fn draw(f: &mut Frame, session: &SelectorSession, palette: ThemePalette, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // query
            Constraint::Min(0),    // results
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    let query_block = Block::default()
        .title(Span::styled(
            format!(" try · {} ", session.root().display()),
            palette.title(),
        ))
        .borders(Borders::ALL)
        .border_style(palette.border_focus_style());
    let query_line = Line::from(vec![
        Span::styled("› ", kbd_style(palette)),
        Span::raw(session.query().to_string()),
    ]);
    f.render_widget(Paragraph::new(query_line).block(query_block), chunks[0]);
    if matches!(session.mode(), Mode::Search) {
        let x = chunks[0].x + 3 + session.query().chars().count() as u16;
        f.set_cursor_position((x.min(chunks[0].right().saturating_sub(2)), chunks[0].y + 1));
    }

    let items: Vec<ListItem> = (0..session.row_count())
        .filter_map(|idx| session.row(idx))
        .map(|row| match row {
            Row::Entry(ranked) => entry_item(ranked, palette, now),
            Row::Create => ListItem::new(Line::from(vec![
                Span::styled("+ create ", palette.title()),
                Span::styled(session.create_name(), Style::default().fg(palette.accent_alt)),
            ])),
        })
        .collect();
    let empty = items.is_empty();
    let mut state = ListState::default();
    if !empty {
        state.select(Some(session.cursor()));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border_style())
                .title(Span::styled(
                    format!(" {} ", session.ranked().len()),
                    palette.hint_style(),
                )),
        )
        .highlight_style(palette.selected_style())
        .highlight_symbol("▸ ");
    if empty {
        let hint = Paragraph::new("No tries yet. Type a name and press Enter to create one.")
            .style(palette.hint_style())
            .block(Block::default().borders(Borders::ALL).border_style(palette.border_style()));
        f.render_widget(hint, chunks[1]);
    } else {
        f.render_stateful_widget(list, chunks[1], &mut state);
    }

    let footer = match session.notice() {
        Some(notice) => Line::from(Span::styled(notice.to_string(), palette.warning_style())),
        None => Line::from(Span::styled(footer_legend(session.mode()), palette.hint_style())),
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);

    draw_confirm(f, session.mode(), palette);
}

fn draw_confirm(f: &mut Frame, mode: &Mode, palette: ThemePalette) {
    let (title, prompt, input, index_prompt, danger) = match mode {
        Mode::Search => return,
        Mode::DeleteConfirm { target, typed } => {
            let armed = *typed == target.name;
            let prompt = format!("Delete {}? Type its name to confirm.", target.path.display());
            let input = LineEditor::new(typed);
            (" Delete ", prompt, input, false, !armed)
        }
        Mode::ArchiveConfirm { target, input } => (
            " Archive ",
            format!("Move {} to:", target.name),
            input.clone(),
            false,
            false,
        ),
        Mode::PromoteConfirm {
            target,
            input,
            index_prompt,
        } => (
            " Promote ",
            format!("Move {} out of tries to:", target.name),
            input.clone(),
            *index_prompt,
            false,
        ),
        Mode::RenameConfirm {
            target,
            input,
            index_prompt,
        } => (
            " Rename ",
            format!("Rename {} to:", target.name),
            input.clone(),
            *index_prompt,
            false,
        ),
    };

    let area = centered_rect(70, 30, f.area());
    f.render_widget(Clear, area);
    let border = if matches!(mode, Mode::DeleteConfirm { .. }) {
        palette.danger_style()
    } else {
        palette.border_focus_style()
    };
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(palette.surface).fg(palette.fg));

    let value = input.value();
    let input_style = if danger {
        palette.danger_style()
    } else {
        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)
    };
    let mut lines = vec![
        Line::from(prompt),
        Line::from(""),
        Line::from(vec![
            Span::styled("› ", kbd_style(palette)),
            Span::styled(value.clone(), input_style),
        ]),
    ];
    if index_prompt {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "A project index exists for this directory. Update it too? [y/N]",
            palette.warning_style(),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
    if !index_prompt {
        let x = area.x + 3 + input.cursor() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 3));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn age_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h");
        assert_eq!(format_age(now - Duration::days(2), now), "2d");
        assert_eq!(format_age(now - Duration::days(42), now), "6w");
        assert_eq!(format_age(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn highlight_splits_matched_runs() {
        let palette = ThemePalette::dark();
        let line = highlight_name("2025-api", &[5, 6, 7], palette, Style::default());
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["2025-", "api"]);

        let plain = highlight_name("abc", &[], palette, Style::default());
        assert_eq!(plain.spans.len(), 1);
    }

    #[test]
    fn highlight_handles_multibyte_names() {
        let palette = ThemePalette::dark();
        let line = highlight_name("café-x", &[3], palette, Style::default());
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["caf", "é", "-x"]);
    }
}
