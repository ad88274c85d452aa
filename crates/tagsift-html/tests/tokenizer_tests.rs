//! Integration tests for the HTML tokenizer.

use tagsift_html::{Attribute, HTMLTokenizer, Token, TokenizerState};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::tokenize(input)
}

/// Helper to tokenize input delivered in several chunks
fn tokenize_chunks(chunks: &[&str]) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new();
    for chunk in chunks {
        tokenizer.feed(chunk);
    }
    tokenizer.finish();
    tokenizer.into_tokens()
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

fn start(name: &str, attributes: &[(&str, Option<&str>)]) -> Token {
    Token::StartTag {
        name: name.to_string(),
        self_closing: false,
        attributes: attributes
            .iter()
            .map(|(n, v)| Attribute::new((*n).to_string(), v.map(str::to_string)))
            .collect(),
    }
}

fn end(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

#[test]
fn test_plain_text_is_one_token() {
    assert_eq!(tokenize("Hello"), vec![text("Hello"), Token::EndOfFile]);
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize(""), vec![Token::EndOfFile]);
}

#[test]
fn test_start_and_end_tags() {
    assert_eq!(
        tokenize("<p>hi</p>"),
        vec![start("p", &[]), text("hi"), end("p"), Token::EndOfFile]
    );
}

#[test]
fn test_names_are_lowercased() {
    assert_eq!(
        tokenize("<DIV Class='x'></Div>"),
        vec![
            start("div", &[("class", Some("x"))]),
            end("div"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_attribute_forms() {
    let tokens = tokenize(r#"<input type="text" name='q' size=10 disabled value=>"#);
    assert_eq!(
        tokens[0],
        start(
            "input",
            &[
                ("type", Some("text")),
                ("name", Some("q")),
                ("size", Some("10")),
                ("disabled", None),
                ("value", Some("")),
            ]
        )
    );
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<a x=1 x=2 y>");
    assert_eq!(tokens[0], start("a", &[("x", Some("1")), ("y", None)]));
}

#[test]
fn test_attribute_values_are_decoded() {
    let tokens = tokenize(r#"<a title="x &amp; y &#33;" href="?a=1&b=2">"#);
    assert_eq!(
        tokens[0],
        start(
            "a",
            &[("title", Some("x & y !")), ("href", Some("?a=1&b=2"))]
        )
    );
}

#[test]
fn test_self_closing() {
    let tokens = tokenize(r#"<br/><img src="a.png"/>"#);
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
    assert!(matches!(
        &tokens[1],
        Token::StartTag { name, self_closing: true, attributes } if name == "img" && attributes.len() == 1
    ));
}

#[test]
fn test_stray_markup_characters_are_text() {
    assert_eq!(
        tokenize("a < b & c"),
        vec![text("a < b & c"), Token::EndOfFile]
    );
    assert_eq!(tokenize("</>"), vec![text("</>"), Token::EndOfFile]);
    assert_eq!(tokenize("</ x>"), vec![text("</ x>"), Token::EndOfFile]);
    assert_eq!(tokenize("1<2"), vec![text("1<2"), Token::EndOfFile]);
}

#[test]
fn test_references_kept_verbatim() {
    assert_eq!(
        tokenize("&amp;&#38;&#x26;&copy"),
        vec![
            Token::EntityReference {
                data: "&amp;".to_string()
            },
            Token::CharacterReference {
                data: "&#38;".to_string()
            },
            Token::CharacterReference {
                data: "&#x26;".to_string()
            },
            text("&copy"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_declarations_comments_and_dropped_markup() {
    assert_eq!(
        tokenize("<!DOCTYPE html><!-- hi --><![CDATA[x]]><?php x ?>after"),
        vec![
            Token::Doctype {
                data: "DOCTYPE html".to_string()
            },
            Token::Comment {
                data: " hi ".to_string()
            },
            text("after"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_comment_needs_double_dash_close() {
    assert_eq!(
        tokenize("<!-->x-->"),
        vec![
            Token::Comment {
                data: ">x".to_string()
            },
            Token::EndOfFile
        ]
    );
    assert_eq!(
        tokenize("<!---->"),
        vec![
            Token::Comment {
                data: String::new()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_script_content_is_raw_text() {
    assert_eq!(
        tokenize("<script>if (a<b && c) {}</SCRIPT>"),
        vec![
            start("script", &[]),
            text("if (a<b && c) {}"),
            end("script"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_raw_text_ignores_other_end_tags() {
    assert_eq!(
        tokenize("<style>a</p></styles></style>"),
        vec![
            start("style", &[]),
            text("a</p></styles>"),
            end("style"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_tag_split_across_chunks() {
    assert_eq!(
        tokenize_chunks(&["<di", "v class=\"a", "\">text</d", "iv>"]),
        tokenize("<div class=\"a\">text</div>")
    );
}

#[test]
fn test_comment_and_reference_split_across_chunks() {
    assert_eq!(
        tokenize_chunks(&["<!-", "- a -", "->&am", "p;"]),
        vec![
            Token::Comment {
                data: " a ".to_string()
            },
            Token::EntityReference {
                data: "&amp;".to_string()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_state_persists_between_chunks() {
    let mut tokenizer = HTMLTokenizer::new();
    tokenizer.feed("<a hr");
    assert_eq!(tokenizer.state(), TokenizerState::AttributeName);
    assert!(tokenizer.take_tokens().is_empty());
    tokenizer.feed("ef=x>");
    assert_eq!(tokenizer.state(), TokenizerState::Data);
    assert_eq!(tokenizer.take_tokens(), vec![start("a", &[("href", Some("x"))])]);
}

#[test]
fn test_unterminated_markup_becomes_text() {
    assert_eq!(
        tokenize("ok <div class="),
        vec![text("ok "), text("<div class="), Token::EndOfFile]
    );
}
