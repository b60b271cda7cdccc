//! Team Clicker rendering: team select, game, shop, leaderboard, and log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, ShareBar, TabBar};

use super::actions::*;
use super::state::{Phase, Team};
use super::{ClickerGame, Tab, UsernamePrompt};

pub fn render(game: &ClickerGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    // Narrow screens stack the log under the game; wide screens put it on the right
    let (main_area, log_area) = if is_narrow_layout(area.width) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(6)])
            .split(area);
        (chunks[0], chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (chunks[0], chunks[1])
    };

    // The name prompt overlays whichever phase is underneath
    if let Some(prompt) = &game.prompt {
        render_prompt(game, prompt, f, main_area, click_state);
    } else {
        match game.engine.phase() {
            Phase::Unselected => render_team_select(game, f, main_area, click_state),
            Phase::Active => render_active(game, f, main_area, click_state),
        }
    }
    render_log(game, f, log_area);
}

fn team_color(team: Team) -> Color {
    match team {
        Team::Red => Color::Red,
        Team::Blue => Color::Blue,
    }
}

/// Thousands-separated count, e.g. `12,345`.
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Key hint helper ─────────────────────────────────────────

fn push_choice(cl: &mut ClickableList, key: char, label: String, style: Style, action_id: u16) {
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", key.to_ascii_uppercase()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, style),
        ]),
        action_id,
    );
}

// ── Username prompt ─────────────────────────────────────────

fn render_prompt(
    game: &ClickerGame,
    prompt: &UsernamePrompt,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let config = game.engine.config();
    let mut cl = ClickableList::new();
    // --- Input line with a blinking cursor ---
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        format!(
            " ユーザー名（{}〜{}文字）",
            config.username_min_len, config.username_max_len
        ),
        Style::default().fg(Color::White),
    )));
    cl.push(Line::from(vec![
        Span::styled(" > ", Style::default().fg(Color::Cyan)),
        Span::styled(
            prompt.buffer.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("_", Style::default().fg(Color::Cyan).add_modifier(Modifier::SLOW_BLINK)),
    ]));
    // Validation error, or a blank line to keep the layout steady
    match &prompt.error {
        Some(err) => cl.push(Line::from(Span::styled(
            format!(" {}", err),
            Style::default().fg(Color::Red),
        ))),
        None => cl.push(Line::from("")),
    }
    if let Some(team) = prompt.pending_team {
        cl.push(Line::from(Span::styled(
            format!(" 決定すると{}に参加します", team.name()),
            Style::default().fg(team_color(team)),
        )));
    }
    // --- Submit / cancel ---
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            " ▶ 決定 (Enter)",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        SUBMIT_USERNAME,
    );
    cl.push(Line::from(Span::styled(
        " Esc でキャンセル",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 名前を入力 ");
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets_with_block(area, &block, &mut cs, 0);
    }
    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Team select ─────────────────────────────────────────────

fn render_team_select(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let totals = game.engine.totals();
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        " チームを選んでクリックで勝負！",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    // One row per team, keyed 1 / 2
    for team in Team::all() {
        let row = totals.get(*team);
        push_choice(
            &mut cl,
            char::from(b'1' + team.index() as u8),
            format!(
                "{}  {} クリック / {}人",
                team.name(),
                format_count(totals.clicks(*team)),
                row.members.max(0)
            ),
            Style::default().fg(team_color(*team)).add_modifier(Modifier::BOLD),
            SELECT_TEAM_BASE + team.index() as u16,
        );
    }
    // --- Username (kept across logouts) ---
    cl.push(Line::from(""));
    match &game.engine.progress().username {
        Some(name) => {
            cl.push(Line::from(Span::styled(
                format!(" 名前: {}", name),
                Style::default().fg(Color::Gray),
            )));
            push_choice(
                &mut cl,
                'n',
                "名前を変更".into(),
                Style::default().fg(Color::Gray),
                EDIT_USERNAME,
            );
        }
        None => {
            push_choice(
                &mut cl,
                'n',
                "名前を入力".into(),
                Style::default().fg(Color::Gray),
                EDIT_USERNAME,
            );
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Team Clicker ");
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets_with_block(area, &block, &mut cs, 0);
    }
    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Active play ─────────────────────────────────────────────

fn render_active(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8)])
        .split(area);

    render_tab_bar(game, f, chunks[0], click_state);
    match game.tab {
        Tab::Game => render_game_tab(game, f, chunks[1], click_state),
        Tab::Shop => render_shop_tab(game, f, chunks[1], click_state),
        Tab::Leaderboard => render_leaderboard_tab(game, f, chunks[1], click_state),
    }
}

fn render_tab_bar(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let tab_style = |tab: Tab, color: Color| -> Style {
        if game.tab == tab {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };
    // Badge the shop tab while something is affordable
    let (shop_label, shop_color) = if game.engine.has_affordable_bonus() {
        ("ショップ ●", Color::Green)
    } else {
        ("ショップ", Color::Magenta)
    };

    let mut cs = click_state.borrow_mut();
    TabBar::new("│")
        .tab("ゲーム", tab_style(Tab::Game, Color::Yellow), TAB_GAME)
        .tab(shop_label, tab_style(Tab::Shop, shop_color), TAB_SHOP)
        .tab(
            "ランキング",
            tab_style(Tab::Leaderboard, Color::Cyan),
            TAB_LEADERBOARD,
        )
        .render(f, area, &mut cs);
}

fn render_game_tab(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    // The notice row only takes space while a bonus was just activated
    let notice_height = if game.engine.activation_notice(game.now_ms).is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),             // team stats
            Constraint::Length(5),             // personal stats
            Constraint::Length(notice_height), // activation notice
            Constraint::Length(3),             // click button
            Constraint::Min(1),                // team change
        ])
        .split(area);

    render_team_stats(game, f, chunks[0]);
    render_personal_stats(game, f, chunks[1]);
    if notice_height > 0 {
        render_activation_notice(game, f, chunks[2]);
    }
    render_click_button(game, f, chunks[3], click_state);
    render_change_team(game, f, chunks[4], click_state);
}

fn render_team_stats(game: &ClickerGame, f: &mut Frame, area: Rect) {
    let totals = game.engine.totals();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 戦況 ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // --- Row 0: per-team totals, members and live boost ---
    let mine = game.engine.team();
    let lines: Vec<Line> = Team::all()
        .iter()
        .map(|team| {
            let row = totals.get(*team);
            let marker = if mine == Some(*team) { "▶" } else { " " };
            let mut spans = vec![
                Span::styled(
                    format!("{}{} ", marker, team.name()),
                    Style::default().fg(team_color(*team)).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ", format_count(totals.clicks(*team))),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("({}人)", row.members.max(0)),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            let boost = row.active_boost(game.now_ms);
            if boost > 0 {
                spans.push(Span::styled(
                    format!(" ブースト+{} 残り{}秒", boost, row.boost_seconds_left(game.now_ms)),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Line::from(spans)
        })
        .collect();
    f.render_widget(Paragraph::new(lines), rows[0]);

    // --- Row 1: share bar (red fills from the left) ---
    ShareBar {
        left_share: totals.share(Team::Red),
        left_color: team_color(Team::Red),
        right_color: team_color(Team::Blue),
    }
    .render(f, rows[1]);

    // --- Row 2: share percentages ---
    let split = Line::from(vec![
        Span::styled(
            format!("{:.1}%", totals.share(Team::Red)),
            Style::default().fg(team_color(Team::Red)),
        ),
        Span::styled(" / ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.1}%", totals.share(Team::Blue)),
            Style::default().fg(team_color(Team::Blue)),
        ),
    ]);
    f.render_widget(Paragraph::new(split).alignment(Alignment::Center), rows[2]);
}

fn render_personal_stats(game: &ClickerGame, f: &mut Frame, area: Rect) {
    let progress = game.engine.progress();
    let rates = game.engine.rates();
    let name = progress.username.as_deref().unwrap_or("-");

    // Auto-clicker status: locked, unlocked without a bonus, or running
    let auto_status = if !progress.auto_clicker_unlocked {
        Span::styled(
            format!(
                "オート: {}クリックで解放",
                game.engine.config().auto_clicker_threshold
            ),
            Style::default().fg(Color::DarkGray),
        )
    } else if game.engine.auto_clicker_running() {
        Span::styled(
            format!("オート: {}/秒 稼働中", rates.clicks_per_tick()),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("オート: 解放済み（ショップで入手）", Style::default().fg(Color::Cyan))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" 名前: ", Style::default().fg(Color::DarkGray)),
            Span::styled(name.to_string(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled(" 個人クリック: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_count(progress.personal_clicks),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  倍率 x{}", rates.click_multiplier),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(vec![Span::raw(" "), auto_status]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" あなた ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_activation_notice(game: &ClickerGame, f: &mut Frame, area: Rect) {
    let Some(bonus) = game.engine.activation_notice(game.now_ms) else {
        return;
    };
    let line = Line::from(Span::styled(
        format!("★ {} が発動！ ★", bonus.name),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_click_button(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let color = game.engine.team().map(team_color).unwrap_or(Color::White);
    let label = format!("クリック！ (+{})", game.engine.rates().clicks_per_tap());
    let button = Paragraph::new(Line::from(Span::styled(
        label,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(button, area);
    // The whole button box is the tap target
    click_state.borrow_mut().add_click_target(area, CLICK_BUTTON);
}

fn render_change_team(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    // Changing team wipes progress, so it goes through a y/n confirmation
    if game.confirm_change_team {
        cl.push(Line::from(Span::styled(
            " 進行状況（クリック・ボーナス）がリセットされます",
            Style::default().fg(Color::Red),
        )));
        push_choice(
            &mut cl,
            'y',
            "チームを変更する".into(),
            Style::default().fg(Color::Red),
            CONFIRM_CHANGE_TEAM,
        );
        push_choice(
            &mut cl,
            'n',
            "やめる".into(),
            Style::default().fg(Color::White),
            CANCEL_CHANGE_TEAM,
        );
    } else {
        push_choice(
            &mut cl,
            'c',
            "クリック".into(),
            Style::default().fg(Color::White),
            CLICK_BUTTON,
        );
        push_choice(
            &mut cl,
            'x',
            "チームを変更".into(),
            Style::default().fg(Color::DarkGray),
            CHANGE_TEAM,
        );
    }

    // No block here: targets start at the area's top-left
    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 0, 0, 0, area.width);
    f.render_widget(
        Paragraph::new(cl.into_lines()).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Shop ────────────────────────────────────────────────────

fn render_shop_tab(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let engine = &game.engine;
    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled(" 所持クリック: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_count(engine.progress().personal_clicks),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(""));

    // --- Bonuses still for sale, keyed a, b, c... by display order ---
    let available = engine.available_bonuses();
    if available.is_empty() {
        cl.push(Line::from(Span::styled(
            " すべてのボーナスを入手済み！",
            Style::default().fg(Color::Green),
        )));
    }
    for (i, bonus) in available.iter().enumerate() {
        // Unaffordable entries stay tappable but are dimmed
        let affordable = engine.can_purchase(bonus.id);
        let key = char::from(b'a' + i as u8);
        let (name_style, cost_style) = if affordable {
            (
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Green),
            )
        } else {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
            )
        };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    format!(" [{}] ", key),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(bonus.name.clone(), name_style),
                Span::styled(format!(" {}C ", format_count(bonus.cost)), cost_style),
                Span::styled(bonus.effect_label(), Style::default().fg(Color::Cyan)),
            ]),
            BUY_BONUS_BASE + i as u16,
        );
    }

    // --- Owned bonuses ---
    let owned = engine.owned_bonuses();
    if !owned.is_empty() {
        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled(
            " ── 所持ボーナス ──",
            Style::default().fg(Color::DarkGray),
        )));
        for bonus in owned {
            cl.push(Line::from(vec![
                Span::styled(" ✔ ", Style::default().fg(Color::Green)),
                Span::styled(bonus.name.clone(), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("  {}", bonus.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" ショップ ");
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets_with_block(area, &block, &mut cs, 0);
    }
    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Leaderboard ─────────────────────────────────────────────

fn render_leaderboard_tab(
    game: &ClickerGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    // Team switcher
    let shown = game.leaderboard.team();
    {
        let mut cs = click_state.borrow_mut();
        let mut bar = TabBar::new("│");
        for team in Team::all() {
            let style = if *team == shown {
                Style::default()
                    .fg(Color::White)
                    .bg(team_color(*team))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(team_color(*team))
            };
            bar = bar.tab(team.name(), style, RANK_TEAM_BASE + team.index() as u16);
        }
        bar.render(f, chunks[0], &mut cs);
    }

    // --- Ranking rows, with the player's own name highlighted ---
    let me = game.engine.progress().username.as_deref();
    let entries = game.leaderboard.entries();
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            " まだ誰もいない",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let rank_style = match i {
                    0 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    1 | 2 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    _ => Style::default().fg(Color::Gray),
                };
                let name_style = if Some(entry.name.as_str()) == me {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!(" {:>2}. ", i + 1), rank_style),
                    Span::styled(format!("{:<16}", entry.name), name_style),
                    Span::styled(format_count(entry.clicks), Style::default().fg(Color::Cyan)),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(team_color(shown)))
        .title(format!(" {} トップ{} ", shown.name(), game.engine.config().leaderboard_limit));
    f.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

// ── Log ─────────────────────────────────────────────────────

fn render_log(game: &ClickerGame, f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = game
        .log
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!(" > {}", entry.text), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" ログ ");
    let inner = block.inner(area);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    // Keep the newest entries in view.
    let total = paragraph.line_count(inner.width) as u16;
    let scroll = total.saturating_sub(inner.height);
    f.render_widget(paragraph.block(block).scroll((scroll, 0)), area);
}
