use polars::prelude::*;

use terminal_size::{Width, Height, terminal_size};

// Render a summary frame as an ASCII table, fitted to the terminal width.
// Returns false (and prints nothing) for a frame without rows.
pub fn print_frame(title: &str, df: &DataFrame) -> bool {
    let lines = match render_frame(df, get_terminal_width()) {
        Some(lines) => lines,
        None => return false,
    };
    println!("{}:", title);
    for l in lines {
        println!("{}", l);
    }
    true
}

// Build the table lines for `df` without printing them.
pub fn render_frame(df: &DataFrame, termw: usize) -> Option<Vec<String>> {
    if df.height() == 0 { return None; }
    let cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let rows = frame_rows(df);

    let max_col_width: usize = 48; // cap to keep output readable
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(max_col_width)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(max_col_width); }
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 5);
    let sep = build_separator(&widths);
    out.push(fit_line_to_width(&sep, termw));
    out.push(fit_line_to_width(&build_row(&cols, &widths, false), termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in &rows {
        out.push(fit_line_to_width(&build_row(r, &widths, true), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out.push(format!("rows: {}, cols: {}", rows.len(), cols.len()));
    Some(out)
}

fn frame_rows(df: &DataFrame) -> Vec<Vec<String>> {
    let columns = df.get_columns();
    (0..df.height())
        .map(|i| columns.iter().map(|c| to_cell_string(c.get(i).ok())).collect())
        .collect()
}

fn to_cell_string(v: Option<AnyValue<'_>>) -> String {
    match v {
        None | Some(AnyValue::Null) => String::from("NULL"),
        Some(AnyValue::String(s)) => s.to_string(),
        Some(AnyValue::StringOwned(s)) => s.to_string(),
        Some(AnyValue::Float64(f)) => format!("{:.2}", f),
        Some(AnyValue::Float32(f)) => format!("{:.2}", f),
        Some(other) => other.to_string(),
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize], align_numbers: bool) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), align_numbers && is_numeric_like(&cell));
        s.push(' ');
        let pad = w.saturating_sub(visible_len(&text));
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    let take = max - 1;
    s.chars().take(take).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}

// --- Terminal fitting ---

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w as usize).saturating_sub(4).max(20);
    }
    80
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    let vlen = visible_len(s);
    if vlen <= maxw { return s.to_string(); }
    elide_middle(s, maxw)
}

fn visible_len(s: &str) -> usize { s.chars().count() }

fn elide_middle(s: &str, maxw: usize) -> String {
    if maxw <= 3 { return "…".repeat(maxw.min(1)); }
    let budget = maxw - 3;
    let front_keep = budget / 2;
    let back_keep = budget - front_keep;
    let chars: Vec<char> = s.chars().collect();
    let front: String = chars[..front_keep].iter().collect();
    let back: String = chars[chars.len() - back_keep..].iter().collect();
    format!("{}...{}", front, back)
}
