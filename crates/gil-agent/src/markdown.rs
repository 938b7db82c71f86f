//! Markdown rendering for chat replies.
//!
//! Model output is Markdown; the chat frontend wants HTML. This covers the
//! subset the assistant actually emits: headings, bold, links, inline code,
//! unordered lists, fenced code blocks, pipe tables, and hard line breaks
//! inside paragraphs.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Render a Markdown fragment to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut list: Vec<String> = Vec::new();
    let mut table: Vec<String> = Vec::new();
    let mut code_block: Option<Vec<String>> = None;

    for line in markdown.lines() {
        if let Some(block) = code_block.as_mut() {
            if line.trim_start().starts_with("```") {
                flush_code(&mut out, code_block.take().unwrap_or_default());
            } else {
                block.push(escape(line));
            }
            continue;
        }
        let trimmed = line.trim_end();

        if trimmed.trim_start().starts_with("```") {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            flush_table(&mut out, &mut table);
            code_block = Some(Vec::new());
            continue;
        }
        if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            flush_table(&mut out, &mut table);
            out.push_str(&format!("<h{level}>{}</h{level}>\n", inline(text)));
            continue;
        }
        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            flush_paragraph(&mut out, &mut paragraph);
            flush_table(&mut out, &mut table);
            list.push(inline(item));
            continue;
        }
        if trimmed.starts_with('|') && trimmed.ends_with('|') {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            table.push(trimmed.to_owned());
            continue;
        }
        if trimmed.is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            flush_table(&mut out, &mut table);
            continue;
        }
        flush_list(&mut out, &mut list);
        flush_table(&mut out, &mut table);
        paragraph.push(inline(trimmed));
    }

    flush_paragraph(&mut out, &mut paragraph);
    flush_list(&mut out, &mut list);
    flush_table(&mut out, &mut table);
    if let Some(block) = code_block {
        flush_code(&mut out, block);
    }
    out
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) {
        line[level..].strip_prefix(' ').map(|text| (level, text))
    } else {
        None
    }
}

fn inline(text: &str) -> String {
    let escaped = escape(text);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let linked = LINK.replace_all(&bolded, r#"<a href="$2">$1</a>"#);
    CODE.replace_all(&linked, "<code>$1</code>").into_owned()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    // Single newlines inside a paragraph become hard breaks.
    out.push_str(&format!("<p>{}</p>\n", paragraph.join("<br />")));
    paragraph.clear();
}

fn flush_list(out: &mut String, list: &mut Vec<String>) {
    if list.is_empty() {
        return;
    }
    out.push_str("<ul>\n");
    for item in list.iter() {
        out.push_str(&format!("<li>{item}</li>\n"));
    }
    out.push_str("</ul>\n");
    list.clear();
}

fn flush_code(out: &mut String, block: Vec<String>) {
    out.push_str(&format!("<pre><code>{}</code></pre>\n", block.join("\n")));
}

fn flush_table(out: &mut String, table: &mut Vec<String>) {
    if table.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = table
        .iter()
        .map(|row| {
            row.trim_matches('|').split('|').map(|cell| inline(cell.trim())).collect()
        })
        .collect();
    let has_separator =
        rows.len() > 1 && rows[1].iter().all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'));

    out.push_str("<table>\n");
    for (i, row) in rows.iter().enumerate() {
        if has_separator && i == 1 {
            continue;
        }
        let tag = if has_separator && i == 0 { "th" } else { "td" };
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<{tag}>{cell}</{tag}>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    table.clear();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn headings_and_lists_render() {
        let html = to_html("## Day1\n\n### 오전활동\n- 장소: 경복궁\n- 시간: 09:00-11:00\n");
        assert!(html.contains("<h2>Day1</h2>"));
        assert!(html.contains("<h3>오전활동</h3>"));
        assert!(html.contains("<li>장소: 경복궁</li>"));
        assert!(html.contains("<li>시간: 09:00-11:00</li>"));
    }

    #[test]
    fn single_newline_becomes_break() {
        let html = to_html("첫 줄\n둘째 줄\n\n새 문단");
        assert!(html.contains("<p>첫 줄<br />둘째 줄</p>"));
        assert!(html.contains("<p>새 문단</p>"));
    }

    #[test]
    fn bold_and_links_render_inline() {
        let html = to_html("**추천 장소**는 [여기](https://example.com) 참고");
        assert!(html.contains("<strong>추천 장소</strong>"));
        assert!(html.contains(r#"<a href="https://example.com">여기</a>"#));
    }

    #[test]
    fn fenced_code_is_not_inlined() {
        let html = to_html("```json\n{\"schedule\": {}}\n```");
        assert!(html.contains("<pre><code>"));
        assert!(html.contains("{\"schedule\": {}}"));
        assert!(!html.contains("<p>```"));
    }

    #[test]
    fn raw_angle_brackets_are_escaped() {
        let html = to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn pipe_table_renders_with_header() {
        let html = to_html("| 장소 | 비용 |\n| --- | --- |\n| 경복궁 | 3000원 |");
        assert!(html.contains("<th>장소</th>"));
        assert!(html.contains("<td>경복궁</td>"));
        assert!(!html.contains("---"));
    }
}
