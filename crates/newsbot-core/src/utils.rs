use chrono::Local;

// ============== Timestamp Helpers ==============

/// Local wall-clock timestamp as stored in the `date_added` columns.
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============== Message Size Helpers ==============

/// Split `text` into chunks of at most `limit` chars, breaking on blank lines
/// (paragraph/article boundaries) where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;

    for block in text.split("\n\n") {
        let block_len = block.chars().count();
        let sep = if chunk.is_empty() { 0 } else { 2 };

        if chunk_len + sep + block_len <= limit {
            if sep > 0 {
                chunk.push_str("\n\n");
            }
            chunk.push_str(block);
            chunk_len += sep + block_len;
            continue;
        }

        if !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }

        if block_len <= limit {
            chunk.push_str(block);
            chunk_len = block_len;
            continue;
        }

        out.extend(split_markup(block, limit));
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

/// Hard split of a single oversized block. Cuts never fall inside a tag or an
/// entity; tags open at a cut are closed there and reopened in the next piece.
fn split_markup(block: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    // (name, opening tag) of every unclosed element, outermost first.
    let mut open: Vec<(&str, &str)> = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;
    let mut reopened_len = 0usize;

    for unit in markup_units(block) {
        let unit_len = unit.chars().count();
        let tag = parse_tag(unit);
        let closers: usize = open.iter().map(|(name, _)| closer_len(name)).sum();
        let closers_after = match tag {
            Some(Tag::Open(name)) => closers + closer_len(name),
            Some(Tag::Close(name)) if open.iter().any(|(n, _)| *n == name) => {
                closers - closer_len(name)
            }
            _ => closers,
        };

        if chunk_len > reopened_len && chunk_len + unit_len + closers_after > limit {
            for (name, _) in open.iter().rev() {
                chunk.push_str(&format!("</{name}>"));
            }
            out.push(std::mem::take(&mut chunk));
            for (_, opening) in &open {
                chunk.push_str(opening);
            }
            chunk_len = chunk.chars().count();
            reopened_len = chunk_len;
        }

        chunk.push_str(unit);
        chunk_len += unit_len;
        match tag {
            Some(Tag::Open(name)) => open.push((name, unit)),
            Some(Tag::Close(name)) => {
                if let Some(i) = open.iter().rposition(|(n, _)| *n == name) {
                    open.remove(i);
                }
            }
            None => {}
        }
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

/// Longest `&...;` run treated as one entity.
const MAX_ENTITY_LEN: usize = 10;

/// Break `text` into tags, entities and single chars.
fn markup_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let len = match c {
            '<' => rest.find('>').map(|i| i + 1),
            '&' => rest
                .find(';')
                .filter(|&i| {
                    i <= MAX_ENTITY_LEN
                        && rest[1..i].chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
                })
                .map(|i| i + 1),
            _ => None,
        }
        .unwrap_or(c.len_utf8());
        let (unit, tail) = rest.split_at(len);
        units.push(unit);
        rest = tail;
    }
    units
}

#[derive(Clone, Copy)]
enum Tag<'a> {
    Open(&'a str),
    Close(&'a str),
}

fn parse_tag(unit: &str) -> Option<Tag<'_>> {
    let inner = unit.strip_prefix('<')?.strip_suffix('>')?;
    if let Some(name) = inner.strip_prefix('/') {
        return Some(Tag::Close(name.trim()));
    }
    if inner.ends_with('/') {
        return None;
    }
    inner.split_whitespace().next().map(Tag::Open)
}

fn closer_len(name: &str) -> usize {
    name.chars().count() + 3
}
