use crate::command::{Font, LineMode, MoveDirection, ShiftType, State};

/// visible rows of a LCD1602
pub(crate) const ROWS: usize = 2;
/// visible columns of a LCD1602
pub(crate) const COLUMNS: usize = 16;

#[derive(Clone)]
pub(crate) struct LcdState {
    line: LineMode,
    font: Font,
    display_on: State,
    cursor_on: State,
    cursor_blink: State,
    direction: MoveDirection,
    shift_type: ShiftType,
    backlight: State,
    // (row, column), mirrors the controller's address counter
    cursor_pos: (u8, u8),
    // shadow of what is visible at display offset 0
    cells: [[u8; COLUMNS]; ROWS],
}

impl Default for LcdState {
    fn default() -> Self {
        Self {
            line: LineMode::default(),
            font: Font::default(),
            display_on: State::On,
            cursor_on: State::Off,
            cursor_blink: State::Off,
            direction: MoveDirection::default(),
            shift_type: ShiftType::default(),
            backlight: State::On,
            cursor_pos: (0, 0),
            cells: [[b' '; COLUMNS]; ROWS],
        }
    }
}

impl LcdState {
    pub(crate) fn get_backlight(&self) -> State {
        self.backlight
    }

    pub(crate) fn set_backlight(&mut self, backlight: State) {
        self.backlight = backlight;
    }

    pub(crate) fn get_line_mode(&self) -> LineMode {
        self.line
    }

    pub(crate) fn set_line_mode(&mut self, line: LineMode) {
        assert!(
            !(self.get_font() == Font::Font5x11 && line == LineMode::TwoLine),
            "font is 5x11, line cannot be 2"
        );

        self.line = line;
    }

    // DDRAM length of one line
    pub(crate) fn get_line_capacity(&self) -> u8 {
        match self.get_line_mode() {
            LineMode::OneLine => 80,
            LineMode::TwoLine => 40,
        }
    }

    pub(crate) fn get_font(&self) -> Font {
        self.font
    }

    pub(crate) fn set_font(&mut self, font: Font) {
        assert!(
            !(self.get_line_mode() == LineMode::TwoLine && font == Font::Font5x11),
            "there is 2 line, font cannot be 5x11"
        );

        self.font = font;
    }

    pub(crate) fn get_display_state(&self) -> State {
        self.display_on
    }

    pub(crate) fn set_display_state(&mut self, display: State) {
        self.display_on = display;
    }

    pub(crate) fn get_cursor_state(&self) -> State {
        self.cursor_on
    }

    pub(crate) fn set_cursor_state(&mut self, cursor: State) {
        self.cursor_on = cursor;
    }

    pub(crate) fn get_cursor_blink(&self) -> State {
        self.cursor_blink
    }

    pub(crate) fn set_cursor_blink(&mut self, blink: State) {
        self.cursor_blink = blink;
    }

    pub(crate) fn get_direction(&self) -> MoveDirection {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, dir: MoveDirection) {
        self.direction = dir;
    }

    pub(crate) fn get_shift_type(&self) -> ShiftType {
        self.shift_type
    }

    pub(crate) fn set_shift_type(&mut self, shift: ShiftType) {
        self.shift_type = shift;
    }

    pub(crate) fn get_cursor_pos(&self) -> (u8, u8) {
        self.cursor_pos
    }

    pub(crate) fn set_cursor_pos(&mut self, pos: (u8, u8)) {
        self.check_cursor_pos(pos);
        self.cursor_pos = pos;
    }

    /// Panics when `pos` is outside the DDRAM of the current line mode
    pub(crate) fn check_cursor_pos(&self, pos: (u8, u8)) {
        let line_capacity = self.get_line_capacity();
        match self.line {
            LineMode::OneLine => {
                assert!(pos.0 < 1, "always keep row as 0 on OneLine mode");
                assert!(pos.1 < line_capacity, "column too big");
            }
            LineMode::TwoLine => {
                assert!(pos.0 < ROWS as u8, "row too big");
                assert!(pos.1 < line_capacity, "column too big");
            }
        }
    }

    /// DDRAM address of a (row, column) position
    pub(crate) fn ddram_addr(&self, pos: (u8, u8)) -> u8 {
        // in one line mode, row will always keep at 0
        // in two line mode, the second line start at 0x40
        const ROW_OFFSET: [u8; ROWS] = [0x00, 0x40];
        ROW_OFFSET[pos.0 as usize] + pos.1
    }

    /// Record a byte written at the cursor, then step the cursor like the address counter does
    pub(crate) fn put_byte(&mut self, byte: u8) {
        let (row, col) = self.cursor_pos;
        if (col as usize) < COLUMNS {
            self.cells[row as usize][col as usize] = byte;
        }

        // since RAM of the controller is looped, we need to mimic it
        let line_capacity = self.get_line_capacity();
        let last_row = match self.get_line_mode() {
            LineMode::OneLine => 0,
            LineMode::TwoLine => ROWS as u8 - 1,
        };

        self.cursor_pos = match self.get_direction() {
            MoveDirection::LeftToRight => {
                if col == line_capacity - 1 {
                    (if row == last_row { 0 } else { row + 1 }, 0)
                } else {
                    (row, col + 1)
                }
            }
            MoveDirection::RightToLeft => {
                if col == 0 {
                    (
                        if row == 0 { last_row } else { row - 1 },
                        line_capacity - 1,
                    )
                } else {
                    (row, col - 1)
                }
            }
        };
    }

    pub(crate) fn clear_cells(&mut self) {
        self.cells = [[b' '; COLUMNS]; ROWS];
        self.cursor_pos = (0, 0);
    }

    pub(crate) fn get_cell(&self, row: u8, col: u8) -> u8 {
        self.cells[row as usize][col as usize]
    }

    pub(crate) fn get_line(&self, row: u8) -> &[u8; COLUMNS] {
        &self.cells[row as usize]
    }
}
