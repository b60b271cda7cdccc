use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use team_clicker::clicker::catalog::Catalog;
use team_clicker::clicker::ledger::MemoryLedger;
use team_clicker::clicker::save::KeyValueStore;
use team_clicker::clicker::ClickerGame;
use team_clicker::config::GameConfig;
use team_clicker::input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    log::debug!("click: cell=({col}, {row}), targets={}", cs.targets.len());
    Some((col, row))
}

#[cfg(target_arch = "wasm32")]
fn local_store() -> Rc<dyn KeyValueStore> {
    Rc::new(team_clicker::clicker::save::BrowserStorage)
}

#[cfg(not(target_arch = "wasm32"))]
fn local_store() -> Rc<dyn KeyValueStore> {
    Rc::new(team_clicker::clicker::save::MemoryStorage::new())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let game = Rc::new(RefCell::new(ClickerGame::new(
        GameConfig::default(),
        Catalog::standard(),
        local_store(),
        Rc::new(MemoryLedger::new()),
        js_sys::Date::now(),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(action_id) = action {
                let mut g = game.borrow_mut();
                g.tick(js_sys::Date::now());
                g.handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Backspace => InputEvent::Backspace,
                KeyCode::Enter => InputEvent::Enter,
                KeyCode::Esc => InputEvent::Escape,
                _ => return,
            };
            let mut g = game.borrow_mut();
            g.tick(js_sys::Date::now());
            g.handle_input(&event);
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            game.borrow_mut().tick(js_sys::Date::now());

            let size = f.area();
            click_state.borrow_mut().begin_frame(size.width, size.height);
            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
