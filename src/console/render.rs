//! Markdown to terminal text
//!
//! Model replies are Markdown. The terminal gets plain text with the block
//! structure kept: list markers, indented code, quoted lines, link targets.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 40;

/// Render Markdown `text` for a plain terminal
pub fn render_markdown(text: &str) -> String {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    out: String,
    /// Next number per open list; `None` for bullets
    lists: Vec<Option<u64>>,
    /// Target and start offset of each open link
    links: Vec<(String, usize)>,
    quote_depth: usize,
    in_code_block: bool,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.write(&text),
            Event::Code(code) => self.write(&format!("`{code}`")),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.write(&math),
            Event::SoftBreak | Event::HardBreak => self.write("\n"),
            Event::Rule => {
                self.line_break();
                self.write(&"-".repeat(RULE_WIDTH));
                self.end_block();
            }
            Event::TaskListMarker(checked) => self.write(if checked { "[x] " } else { "[ ] " }),
            Event::FootnoteReference(label) => self.write(&format!("[^{label}]")),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::CodeBlock(_) => {
                self.line_break();
                self.in_code_block = true;
            }
            Tag::BlockQuote(_) => {
                self.line_break();
                self.quote_depth += 1;
            }
            Tag::List(first) => {
                self.line_break();
                self.lists.push(first);
            }
            Tag::Item => {
                self.line_break();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                let prefix = self.quote_prefix();
                self.out.push_str(&prefix);
                self.out.push_str(&indent);
                self.out.push_str(&marker);
            }
            Tag::Link { dest_url, .. } => {
                self.links.push((dest_url.to_string(), self.out.len()));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => self.end_block(),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.end_block();
            }
            TagEnd::Link => {
                if let Some((dest, start)) = self.links.pop() {
                    let label = self.out.get(start..).unwrap_or_default();
                    if !dest.is_empty() && label != dest {
                        self.write(&format!(" ({dest})"));
                    }
                }
            }
            _ => {}
        }
    }

    /// Append text, prefixing each new line for the open blocks
    fn write(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start() {
                let prefix = self.line_prefix();
                self.out.push_str(&prefix);
            }
            self.out.push_str(line);
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn quote_prefix(&self) -> String {
        "> ".repeat(self.quote_depth)
    }

    fn line_prefix(&self) -> String {
        let mut prefix = self.quote_prefix();
        prefix.push_str(&"  ".repeat(self.lists.len()));
        if self.in_code_block {
            prefix.push_str("    ");
        }
        prefix
    }

    fn line_break(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    /// Blocks are separated by a blank line, list items by a line break
    fn end_block(&mut self) {
        self.line_break();
        if self.lists.is_empty() && !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}
