//! Software-rendered operator viewer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────┬───────────────────────────┐
//! │  progress strip              │  QUESTION i/n             │
//! │                              │  question text            │
//! │  [camera frame               │                           │
//! │   or flat panel in sim mode] │  1. option A  ◄ selected  │
//! │                              │  2. option B              │
//! │                              │  3. option C              │
//! │  status bar                  │  4. option D              │
//! └──────────────────────────────┴───────────────────────────┘
//! ```
//!
//! The viewer is feedback only: it never touches the session beyond
//! reading it for display, and a closed window never stalls capture.

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::sync::mpsc::Sender;

use quiz_core::{QuizSession, SessionState};

use crate::capture::Frame;
use crate::gesture::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 980;
pub const WIN_H: usize = 560;
const PANEL_W: usize = 560; // camera panel width
const PANEL_X: usize = 10;
const PANEL_Y: usize = 40;
const PANEL_H: usize = 420;
const TEXT_X: usize = PANEL_X + PANEL_W + 20;
const OPTION_H: usize = 54;
const STATUS_Y: usize = WIN_H - 36;
const BG_COLOR: u32 = 0xFF1A1A2E;
const PANEL_BG: u32 = 0xFF16213E;
const OPTION_BG: u32 = 0xFF0F3460;
const SELECT_COLOR: u32 = 0xFFFFD700; // gold
const TEXT_COLOR: u32 = 0xFFEEEEEE;
const DIM_COLOR: u32 = 0xFF888888;

// ════════════════════════════════════════════════════════════════════════════
// Viewer
// ════════════════════════════════════════════════════════════════════════════

pub struct Viewer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,
}

impl Viewer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Gestura — Gesture Quiz",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Viewer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input and translate to SimInput events.
    /// Returns false when the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Key(SimKey::Quit));
            return false;
        }
        for (key, n) in [(Key::Key1, 1), (Key::Key2, 2), (Key::Key3, 3), (Key::Key4, 4)] {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::Key(SimKey::Select(n)));
            }
        }
        if one_shot(Key::Key5) || one_shot(Key::Space) {
            let _ = self.sim_tx.send(SimInput::Key(SimKey::Submit));
        }
        if one_shot(Key::N) {
            let _ = self.sim_tx.send(SimInput::Key(SimKey::Next));
        }
        if one_shot(Key::P) {
            let _ = self.sim_tx.send(SimInput::Key(SimKey::Prev));
        }

        true
    }

    /// Render one frame of feedback.
    pub fn render(&mut self, camera: Option<&Frame>, session: &QuizSession, status: &str) {
        self.buf.fill(BG_COLOR);

        // ── Camera panel ──────────────────────────────────────────────────
        self.fill_rect(PANEL_X, PANEL_Y, PANEL_W, PANEL_H, PANEL_BG);
        if let Some(frame) = camera {
            self.blit_frame(frame);
        } else {
            self.draw_label("SIMULATION MODE - NO CAMERA", PANEL_X + 150, PANEL_Y + PANEL_H / 2, DIM_COLOR, 2);
        }

        // ── Progress strip ────────────────────────────────────────────────
        let total = session.quiz().len();
        let answered = session.answered_count();
        let filled = WIN_W * answered / total.max(1);
        self.fill_rect(0, 0, filled, 8, SELECT_COLOR);
        self.fill_rect(filled, 0, WIN_W - filled, 8, OPTION_BG);

        // ── Question + options ────────────────────────────────────────────
        let idx = session.current_index();
        let question = &session.quiz().questions[idx];
        self.draw_label(
            &format!("QUESTION {}/{}  ANSWERED {}/{}", idx + 1, total, answered, total),
            TEXT_X,
            PANEL_Y,
            DIM_COLOR,
            2,
        );
        self.draw_label(&question.text, TEXT_X, PANEL_Y + 28, TEXT_COLOR, 2);

        let selected = session.selection();
        let mut oy = PANEL_Y + 80;
        for (i, option) in question.options.iter().enumerate() {
            let w = WIN_W - TEXT_X - 10;
            self.fill_rect(TEXT_X, oy, w, OPTION_H - 10, OPTION_BG);
            if selected == Some(i) {
                self.draw_border(TEXT_X, oy, w, OPTION_H - 10, SELECT_COLOR);
            }
            let color = if selected == Some(i) { SELECT_COLOR } else { TEXT_COLOR };
            self.draw_label(&format!("{}. {}", i + 1, option), TEXT_X + 10, oy + 14, color, 2);
            oy += OPTION_H;
        }

        // ── Submitted banner ──────────────────────────────────────────────
        if session.state() == SessionState::Submitted {
            if let Some(result) = session.result() {
                self.draw_label(
                    &format!("FINAL SCORE {}/{}", result.score, result.total),
                    TEXT_X,
                    oy + 10,
                    SELECT_COLOR,
                    3,
                );
            }
        }

        // ── Status bar + key legend ───────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, OPTION_BG);
        self.draw_label(status, 10, STATUS_Y + 6, TEXT_COLOR, 2);
        self.draw_label(
            "1-4=select  5/space=submit  n=next  p=prev  q=quit",
            10,
            STATUS_Y + 22,
            DIM_COLOR,
            1,
        );

        self.window
            .update_with_buffer(&self.buf, WIN_W, WIN_H)
            .ok();
    }

    // ── Camera frame blit (nearest neighbour into the panel) ──────────────

    fn blit_frame(&mut self, frame: &Frame) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        for py in 0..PANEL_H {
            let sy = py * frame.height / PANEL_H;
            for px in 0..PANEL_W {
                let sx = px * frame.width / PANEL_W;
                let o = (sy * frame.width + sx) * 3;
                if o + 2 < frame.rgb.len() {
                    let (r, g, b) = (frame.rgb[o], frame.rgb[o + 1], frame.rgb[o + 2]);
                    let color = 0xFF000000 | (r as u32) << 16 | (g as u32) << 8 | b as u32;
                    self.buf[(PANEL_Y + py) * WIN_W + PANEL_X + px] = color;
                }
            }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(WIN_W) {
            if y < WIN_H {
                self.buf[y * WIN_W + col] = color;
            }
            if y + h - 1 < WIN_H {
                self.buf[(y + h - 1) * WIN_W + col] = color;
            }
        }
        for row in y..(y + h).min(WIN_H) {
            if x < WIN_W {
                self.buf[row * WIN_W + x] = color;
            }
            if x + w - 1 < WIN_W {
                self.buf[row * WIN_W + x + w - 1] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Minimal bitmap font — 3×5 glyphs scaled by `scale`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(
                                    cx + col * scale + dx,
                                    y + row * scale + dy,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
