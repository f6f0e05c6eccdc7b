use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub opcode: Color,
    pub disabled_opcode: Color,
    pub string: Color,
    pub number: Color,
    pub hex: Color,
    pub delimiter: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub popup_bg: Color,
    pub stack_item: Color,
    pub stack_item_alt: Color, // Alternating stack elements
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    opcode: Color::Rgb(137, 180, 250),          // Blue for opcodes
    disabled_opcode: Color::Rgb(180, 165, 120), // Muted yellow for disabled opcodes
    string: Color::Rgb(250, 179, 135),          // Orange for text literals
    number: Color::Rgb(250, 179, 135),          // Orange for numbers
    hex: Color::Rgb(148, 226, 213),             // Cyan/teal for hex literals
    delimiter: Color::Rgb(249, 226, 175),       // Yellow for < > $( )
    border_focused: Color::Rgb(249, 226, 175),  // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),   // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),    // Slightly lighter BG for current line
    popup_bg: Color::Rgb(30, 30, 46),
    stack_item: Color::Rgb(166, 227, 161),
    stack_item_alt: Color::Rgb(245, 194, 231),
};
