//! Flattens assistant markdown to plain terminal text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

pub fn render_terminal(markdown: &str) -> String {
    let mut out = String::new();
    let mut lists: Vec<Option<u64>> = Vec::new();

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading { .. }) | Event::Start(Tag::CodeBlock(_)) => {
                line_start(&mut out);
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::CodeBlock) => {
                block_break(&mut out);
            }
            Event::End(TagEnd::Paragraph) => {
                if lists.is_empty() {
                    block_break(&mut out);
                } else {
                    line_start(&mut out);
                }
            }
            Event::Start(Tag::List(start)) => {
                line_start(&mut out);
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    block_break(&mut out);
                }
            }
            Event::Start(Tag::Item) => {
                line_start(&mut out);
                out.push_str(&"  ".repeat(lists.len().saturating_sub(1)));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => out.push_str("- "),
                }
            }
            Event::End(TagEnd::Item) | Event::End(TagEnd::TableRow) | Event::End(TagEnd::TableHead) => {
                line_start(&mut out);
            }
            Event::End(TagEnd::TableCell) => out.push_str(" | "),
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => {
                line_start(&mut out);
                out.push_str("---");
                block_break(&mut out);
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn block_break(out: &mut String) {
    line_start(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraphs_and_emphasis() {
        assert_eq!(
            render_terminal("Hello **world**.\n\nSecond *line*\ncontinues."),
            "Hello world.\n\nSecond line continues."
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(render_terminal("- a\n- b"), "- a\n- b");
        assert_eq!(render_terminal("1. x\n2. y\n3. z"), "1. x\n2. y\n3. z");
        assert_eq!(render_terminal("- a\n  - b\n- c"), "- a\n  - b\n- c");
        assert_eq!(render_terminal("Steps:\n\n1. one\n2. two\n\nDone."), "Steps:\n\n1. one\n2. two\n\nDone.");
    }

    #[test]
    fn test_heading_and_inline_code() {
        assert_eq!(
            render_terminal("# Summary\nUses `softmax` here."),
            "Summary\n\nUses `softmax` here."
        );
    }

    #[test]
    fn test_code_block_kept_verbatim() {
        assert_eq!(
            render_terminal("Try:\n\n```\nx = 1\ny = 2\n```"),
            "Try:\n\nx = 1\ny = 2"
        );
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render_terminal("Just an answer."), "Just an answer.");
        assert_eq!(render_terminal(""), "");
    }
}
