use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Stylize};
use std::io::{self, BufRead, Write};
use unicode_width::UnicodeWidthStr;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Color Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const GREEN: Color = Color::Rgb {
        r: 30,
        g: 215,
        b: 96,
    };
    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 220,
        b: 220,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Box Drawing Characters
// ═══════════════════════════════════════════════════════════════════════════════

pub mod box_chars {
    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";

    // Rounded box
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    // T-junctions
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.to_string().with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        box_chars::CROSS_MARK.to_string().with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Section Headers
// ═══════════════════════════════════════════════════════════════════════════════

const SECTION_WIDTH: usize = 60;

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;

    println!();
    print!("{}", box_chars::ROUND_TOP_LEFT.with(colors::GREEN));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(padding)
            .with(colors::GREEN)
    );
    print!(
        " {} ",
        title.with(colors::GREEN).bold().attribute(Attribute::Italic)
    );
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH.saturating_sub(title_len + 4 + padding))
            .with(colors::GREEN)
    );
    println!("{}", box_chars::ROUND_TOP_RIGHT.with(colors::GREEN));
}

pub fn print_section_footer() {
    print!("{}", box_chars::ROUND_BOTTOM_LEFT.with(colors::GREEN));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH)
            .with(colors::GREEN)
    );
    println!("{}", box_chars::ROUND_BOTTOM_RIGHT.with(colors::GREEN));
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Key-Value and List Display
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::GREEN),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    let indent_str = "  ".repeat(indent);
    println!(
        "{}{}  {}",
        indent_str,
        box_chars::ARROW_RIGHT.with(colors::CYAN),
        item.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    right_aligned: Vec<bool>,
}

impl TableBuilder {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        TableBuilder {
            right_aligned: vec![false; headers.len()],
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Right-align column `col` (counts, ranks).
    pub fn align_right(mut self, col: usize) -> Self {
        if let Some(flag) = self.right_aligned.get_mut(col) {
            *flag = true;
        }
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(cell.width());
            }
        }
        self.rows.push(row);
    }

    fn pad(&self, col: usize, cell: &str) -> String {
        let width = self.col_widths.get(col).copied().unwrap_or(0);
        let padding = " ".repeat(width.saturating_sub(cell.width()));
        if self.right_aligned.get(col).copied().unwrap_or(false) {
            format!("{}{}", padding, cell)
        } else {
            format!("{}{}", cell, padding)
        }
    }

    fn print_border(&self, left: &str, junction: &str, right: &str) {
        print!("{}", left.with(colors::GREEN));
        for (i, width) in self.col_widths.iter().enumerate() {
            print!(
                "{}",
                box_chars::SINGLE_HORIZONTAL
                    .repeat(width + 2)
                    .with(colors::GREEN)
            );
            if i < self.col_widths.len() - 1 {
                print!("{}", junction.with(colors::GREEN));
            }
        }
        println!("{}", right.with(colors::GREEN));
    }

    pub fn print(&self) {
        if self.col_widths.is_empty() {
            return;
        }

        self.print_border(
            box_chars::ROUND_TOP_LEFT,
            box_chars::T_TOP,
            box_chars::ROUND_TOP_RIGHT,
        );

        // Header
        print!("{}", box_chars::SINGLE_VERTICAL.with(colors::GREEN));
        for (i, header) in self.headers.iter().enumerate() {
            print!(" {} ", self.pad(i, header).with(colors::GREEN).bold());
            print!("{}", box_chars::SINGLE_VERTICAL.with(colors::GREEN));
        }
        println!();

        self.print_border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT);

        // Rows
        for row in &self.rows {
            print!("{}", box_chars::SINGLE_VERTICAL.with(colors::GREEN));
            for (i, cell) in row.iter().enumerate() {
                print!(" {} ", self.pad(i, cell).with(colors::WHITE));
                print!("{}", box_chars::SINGLE_VERTICAL.with(colors::GREEN));
            }
            println!();
        }

        self.print_border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Authorization Prompt
// ═══════════════════════════════════════════════════════════════════════════════

/// Show the consent URL and read back the URL the browser was redirected to.
pub fn prompt_for_redirect(authorize_url: &str) -> io::Result<String> {
    print_section_header("Authorization required");
    println!(
        "  {}",
        "Open this URL in a browser and grant access:".with(colors::DIM)
    );
    println!();
    println!("  {}", authorize_url.with(colors::CYAN).underlined());
    println!();
    print_section_footer();
    print!(
        "{} ",
        "Paste the URL you were redirected to:"
            .with(colors::GREEN)
            .bold()
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
