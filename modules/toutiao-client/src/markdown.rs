//! Minimal markdown → HTML conversion for the Toutiao graphic editor.
//!
//! The editor accepts pasted HTML; generated articles only use `###`
//! headings, blockquotes, bold blocks, and plain paragraphs, so a full
//! markdown parser would be dead weight here.

pub fn markdown_to_html(markdown: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in markdown.split("\n\n") {
        let stripped = block.trim();
        if stripped.is_empty() {
            continue;
        }
        if let Some(rest) = stripped.strip_prefix("### ") {
            parts.push(format!("<h3>{}</h3>", rest.trim()));
        } else if let Some(rest) = stripped.strip_prefix("## ") {
            parts.push(format!("<h2>{}</h2>", rest.trim()));
        } else if let Some(rest) = stripped.strip_prefix("# ") {
            parts.push(format!("<h1>{}</h1>", rest.trim()));
        } else if stripped.starts_with('>') {
            let quote = stripped.trim_start_matches(['>', ' ']).trim();
            parts.push(format!("<blockquote>{quote}</blockquote>"));
        } else if stripped.starts_with("**") && stripped.ends_with("**") && stripped.len() > 4 {
            parts.push(format!("<strong>{}</strong>", stripped.trim_matches('*')));
        } else {
            parts.push(format!("<p>{}</p>", stripped.replace('\n', "<br>")));
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_and_paragraphs() {
        let md = "### 第一节\n\n第一段内容。\n第二行。\n\n### 第二节\n\n收尾。";
        let html = markdown_to_html(md);
        assert_eq!(
            html,
            "<h3>第一节</h3>\n<p>第一段内容。<br>第二行。</p>\n<h3>第二节</h3>\n<p>收尾。</p>"
        );
    }

    #[test]
    fn converts_blockquote_and_bold() {
        let html = markdown_to_html("> a quote\n\n**emphasis**");
        assert_eq!(html, "<blockquote>a quote</blockquote>\n<strong>emphasis</strong>");
    }

    #[test]
    fn skips_empty_blocks() {
        assert_eq!(markdown_to_html("\n\n\n\nhello"), "<p>hello</p>");
    }
}
