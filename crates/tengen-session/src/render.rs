//! Turning session state into text for the player.

use std::fmt::Write;

use tengen_service::{ColourState, GameSnapshot, Stone};

use crate::Mode;

/// Produces the text shown after every event.
///
/// Implementations must be pure: the same mode and snapshot always render
/// the same text.
pub trait Renderer: Send {
    fn render(&self, mode: Mode, snapshot: Option<&GameSnapshot>) -> String;
}

/// The default terminal renderer: a box-drawing board plus a menu of the
/// commands accepted in the current mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, mode: Mode, snapshot: Option<&GameSnapshot>) -> String {
        let mut out = String::new();
        if matches!(mode, Mode::WaitTurn | Mode::PerformTurn) {
            if let Some(snapshot) = snapshot {
                out.push_str(&board(snapshot));
            }
        }
        out.push_str(menu(mode));
        out
    }
}

fn menu(mode: Mode) -> &'static str {
    match mode {
        Mode::NoGame => {
            "\nSelect a type of game:\n \
             [q]: - quit from the Lobby.\n \
             [j]: - Game with someone on the standard field.\n"
        }
        Mode::WaitJoin => "\nWaiting for the game to start:\n [q]: - quit from the Lobby.\n",
        Mode::WaitTurn => {
            "\nWaiting for the turn:\n \
             [q]: - quit from the Lobby.\n \
             [e]: - exit this Game.\n"
        }
        Mode::PerformTurn => {
            "\nPlease, make a turn:\n \
             [q]: - quit from the Lobby.\n \
             [e]: - exit this Game.\n \
             [xxx yyy]: - enter coordinates to make a turn.\n"
        }
        Mode::GameOver => {
            "\nThe Game is over:\n \
             [q]: - quit from the Lobby.\n \
             [e]: - exit this Game.\n"
        }
    }
}

/// Largest board the grid is drawn for. Anything bigger only gets the
/// komi and situation lines.
const MAX_DRAWN_SIZE: u32 = 52;

/// Draws the grid. Coordinates are 1-based, `y` grows downwards.
fn board(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    if snapshot.size <= MAX_DRAWN_SIZE {
        grid(snapshot, &mut out);
    } else {
        tracing::warn!(size = snapshot.size, "board too large to draw");
    }

    // Writing into a String cannot fail.
    let _ = writeln!(out, "komi is {:.1}", snapshot.komi);
    let _ = writeln!(out, "Black situation: {}", situation(&snapshot.black));
    let _ = writeln!(out, "White situation: {}", situation(&snapshot.white));
    out
}

fn grid(snapshot: &GameSnapshot, out: &mut String) {
    let size = i64::from(snapshot.size);
    let spacer = " │ ".repeat(snapshot.size as usize);

    for y in 1..=size {
        out.push_str(&spacer);
        out.push('\n');
        for x in 1..=size {
            let symbol = match snapshot.stone_at(x, y) {
                Some(Stone::Black) => '●',
                Some(Stone::White) => '○',
                None => '┼',
            };
            out.push('─');
            out.push(symbol);
            out.push('─');
        }
        out.push('\n');
    }
    out.push_str(&spacer);
    out.push('\n');
}

fn situation(colour: &ColourState) -> String {
    format!(
        "Stones in cup: {:3} Stones captured: {:3} Score: {:5.1}",
        colour.stones_in_cup, colour.stones_captured, colour.score
    )
}
