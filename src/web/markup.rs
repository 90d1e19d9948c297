//! A small element tree for server-rendered pages. Text and attribute
//! values are escaped when rendered, so views never splice raw strings.

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn id(self, value: impl Into<String>) -> Self {
        self.attr("id", value)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(out),
                Node::Text(text) => escape_into(text, out),
            }
        }

        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

/// Renders `root` as a complete HTML document.
pub fn document(root: Element) -> String {
    let mut out = String::from("<!DOCTYPE html>\n");
    root.write_to(&mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements_with_attributes() {
        let html = Element::new("div")
            .class("card")
            .attr("data-id", "7")
            .child(Element::new("h3").text("Title"))
            .child(Element::new("a").attr("href", "/x").text("/x"))
            .render();
        assert_eq!(
            html,
            r#"<div class="card" data-id="7"><h3>Title</h3><a href="/x">/x</a></div>"#
        );
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let html = Element::new("a")
            .attr("href", "/x?a=1&b=\"2\"")
            .text("<script>alert('hi')</script>")
            .render();
        assert_eq!(
            html,
            "<a href=\"/x?a=1&amp;b=&quot;2&quot;\">&lt;script&gt;alert(&#39;hi&#39;)&lt;/script&gt;</a>"
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let html = Element::new("p")
            .child(Element::new("input").id("titleinput").attr("type", "text"))
            .child(Element::new("br"))
            .render();
        assert_eq!(html, r#"<p><input id="titleinput" type="text"><br></p>"#);
    }

    #[test]
    fn document_adds_doctype() {
        let html = document(Element::new("html").child(Element::new("body")));
        assert_eq!(html, "<!DOCTYPE html>\n<html><body></body></html>");
    }
}
