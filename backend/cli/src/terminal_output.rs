//! Terminal output helpers: ANSI styling, notes, tables and streamed text.

use std::io::Write;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false)
}

/// Wrap `s` in `style` when the terminal supports it.
pub fn paint(style: &str, s: &str) -> String {
    if supports_color() {
        format!("{style}{s}{RESET}")
    } else {
        s.to_string()
    }
}

pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}i{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}!{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}x{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}ok{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Render left-aligned columns; cells wider than `max_width` are cut with `...`.
pub fn render_table(headers: &[&str], rows: &[Vec<String>], max_width: usize) -> String {
    let clip = |s: &str| -> String {
        if s.chars().count() > max_width {
            let kept: String = s.chars().take(max_width.saturating_sub(3)).collect();
            format!("{kept}...")
        } else {
            s.to_string()
        }
    };
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                let pad = w.saturating_sub(strip_ansi(cell).chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    let mut out = paint(BOLD, &line(headers.iter().map(|h| h.to_string()).collect()));
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        let mut cells = row;
        cells.resize(widths.len(), String::new());
        out.push_str(&line(cells));
    }
    out
}

/// Write a chunk and flush so partial text shows up immediately.
pub fn stream_write(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        assert_eq!(strip_ansi(&format!("{GREEN}hello{RESET}")), "hello");
    }

    #[test]
    fn renders_and_clips_rows() {
        let rows = vec![
            vec!["intakeAgent".to_string(), "Create a new client intake record".to_string()],
            vec!["callAgent".to_string(), "Call".to_string()],
        ];
        let table = strip_ansi(&render_table(&["Name", "Description"], &rows, 12));
        assert!(table.contains("intakeAgent"));
        assert!(table.contains("Create a ..."));
        assert!(!table.contains("intake record"));
    }

    #[test]
    fn stream_write_passes_bytes_through() {
        let mut buf = Vec::new();
        stream_write(&mut buf, "Hello ").unwrap();
        stream_write(&mut buf, "there").unwrap();
        assert_eq!(buf, b"Hello there");
    }
}
