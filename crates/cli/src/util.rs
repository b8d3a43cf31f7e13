use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate to at most `width` display columns, ending in ".." when cut.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .next()
            .filter(|ch| UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Exactly `width` display columns: padded with spaces or truncated.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let w = UnicodeWidthStr::width(cut.as_str());
    format!("{}{}", cut, " ".repeat(width.saturating_sub(w)))
}

/// Widths for the six artwork columns given the space left after the
/// checkbox gutter. Years get a fixed width; text columns share the rest.
pub(crate) fn artwork_column_widths(available: usize) -> [usize; 6] {
    const YEAR: usize = 10;
    // title, origin, artist, inscriptions
    const SHARES: [usize; 4] = [35, 15, 30, 20];

    // One separator space per column.
    let text = available.saturating_sub(2 * YEAR + 6);
    let mut widths = [0usize; 6];
    for (i, share) in SHARES.iter().enumerate() {
        widths[i] = (text * share / 100).max(3);
    }
    widths[4] = YEAR;
    widths[5] = YEAR;
    widths
}

/// Parse `12,40,  7` style id lists.
pub(crate) fn parse_id_list(values: &[String]) -> Result<Vec<u64>, String> {
    let mut ids = Vec::new();
    for value in values {
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part
                .parse::<u64>()
                .map_err(|_| format!("invalid item id: {:?}", part))?;
            ids.push(id);
        }
    }
    Ok(ids)
}
