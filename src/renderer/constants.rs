//! Shared constants for the notation renderer (all in surface pixels).

// ── Notes ───────────────────────────────────────────────────────────
pub(super) const NOTE_WIDTH: f64 = 17.0;
pub(super) const NOTE_HEIGHT: f64 = 14.0; // also the height of one staff row
pub(super) const NOTE_SPACE: f64 = 16.0; // horizontal advance from one note to the next
pub(super) const FIRST_NOTE_OFFSET: f64 = NOTE_WIDTH;
pub(super) const LAST_NOTE_SPACE_RIGHT: f64 = NOTE_WIDTH;

// ── Staff ───────────────────────────────────────────────────────────
pub(super) const LINE_WIDTH: f64 = 1.0;
pub(super) const DISTANCE_BETWEEN_LINES: f64 = 16.0;
pub(super) const NUMBER_OF_LINES: usize = 5;
pub(super) const ROWS_ABOVE_STAFF: usize = 3;
pub(super) const ROWS_BELOW_STAFF: usize = 3;
pub(super) const LEDGER_LINE_OVERHANG: f64 = 3.0; // on each side of the note

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const LINE_COLOR: &str = "black";
