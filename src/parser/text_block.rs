// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing of a single `Background:`/`Scenario:` body into [`Step`]s.

use lazy_regex::{regex_captures, regex_is_match};

use crate::{
    feature::{Keyword, Step},
    tag, DataTable,
};

use super::{scan::Header, Error, SyntaxError};

/// Line delimiting a text block.
pub const DOCSTRING_DELIMITER: &str = r#"""""#;

/// Character delimiting table cells.
pub const TABLE_DELIMITER: char = '|';

/// State of the [`parse()`] pass.
enum State<'s> {
    /// Outside of any text block.
    Normal,

    /// Inside a text block opened at the given 1-based line.
    InTextBlock {
        opened_at: usize,
        lines: Vec<&'s str>,
    },
}

/// Parses the raw `body` of a `Background:` or `Scenario:` into [`Step`]s.
///
/// `Examples:` sections of a `Scenario Outline:` are skipped along with their
/// table rows, as outlines run as plain scenarios.
///
/// `first_line` is the 1-based number of the `body`'s first line in its file
/// and is used for [`Step::line`]s and error locations only.
///
/// # Errors
///
/// - If a text block is never closed.
/// - If a table row or a text block appears before any step line.
pub fn parse(body: &str, first_line: usize) -> Result<Vec<Step>, Error> {
    let mut steps: Vec<Step> = Vec::new();
    let mut state = State::Normal;
    let mut in_examples = false;

    for (n, line) in body.lines().enumerate() {
        let line_no = first_line + n;
        let trimmed = line.trim();

        if let State::InTextBlock { opened_at, lines } = &mut state {
            if trimmed == DOCSTRING_DELIMITER {
                let text = lines.join("\n");
                let current = steps
                    .last_mut()
                    .ok_or_else(|| syntax(*opened_at, SyntaxError::Orphan))?;
                current.docstring = Some(text);
                state = State::Normal;
            } else {
                lines.push(line);
            }
            continue;
        }

        if trimmed == DOCSTRING_DELIMITER {
            if steps.is_empty() {
                return Err(syntax(line_no, SyntaxError::Orphan));
            }
            state =
                State::InTextBlock { opened_at: line_no, lines: Vec::new() };
        } else if is_examples_header(trimmed) {
            in_examples = true;
        } else if trimmed.is_empty()
            || tag::is_comment_line(trimmed)
            || tag::is_tag_line(trimmed)
            || Header::parse(trimmed).is_some()
        {
            continue;
        } else if trimmed.starts_with(TABLE_DELIMITER) {
            if in_examples {
                continue;
            }
            let current = steps
                .last_mut()
                .ok_or_else(|| syntax(line_no, SyntaxError::Orphan))?;
            current
                .table
                .get_or_insert_with(DataTable::default)
                .push_row(split_row(trimmed));
        } else {
            in_examples = false;
            steps.push(step(trimmed, line_no));
        }
    }

    if let State::InTextBlock { opened_at, .. } = state {
        return Err(syntax(opened_at, SyntaxError::UnterminatedDocString));
    }
    Ok(steps)
}

/// Indicates whether the trimmed `line` opens an `Examples:` section.
fn is_examples_header(line: &str) -> bool {
    regex_is_match!(r"^(?:Examples|Scenarios)[ \t]*:", line)
}

/// Creates a new [`Step`] out of the given trimmed step `line`.
fn step(line: &str, line_no: usize) -> Step {
    let captured =
        regex_captures!(r"(?i)^(given|when|then|and|but)\b\s*(.*)$", line);
    let (keyword, rest) = match captured {
        Some((_, kw, rest)) => (kw.parse::<Keyword>().ok(), rest),
        None => (None, line),
    };
    let text = rest.trim();
    let text = text.strip_suffix(':').map_or(text, str::trim_end);

    Step {
        keyword,
        raw: line.to_owned(),
        text: text.to_owned(),
        table: None,
        docstring: None,
        line: line_no,
    }
}

/// Splits a table `row` into trimmed cells, dropping the empty segments
/// produced by the enclosing delimiters.
///
/// `\|` escapes a delimiter inside a cell.
fn split_row(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&TABLE_DELIMITER) => {
                cell.push(TABLE_DELIMITER);
                _ = chars.next();
            }
            TABLE_DELIMITER => cells.push(std::mem::take(&mut cell)),
            c => cell.push(c),
        }
    }
    cells.push(cell);

    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        _ = cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        _ = cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_owned()).collect()
}

fn syntax(line: usize, kind: SyntaxError) -> Error {
    Error::Syntax { path: None, line, kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn strips_keywords_and_colons() {
        let steps = parse(
            "Given I open \"/login\"\n\
             when I fill in:\n\
             AND I pause\n\
             But nothing happens\n\
             Then:\n\
             I see the title",
            1,
        )
        .unwrap();

        assert_eq!(
            texts(&steps),
            ["I open \"/login\"", "I fill in", "I pause", "nothing happens", "", "I see the title"],
        );
        assert_eq!(steps[1].keyword, Some(Keyword::When));
        assert_eq!(steps[5].keyword, None);
        assert_eq!(steps[2].raw, "AND I pause");
        assert_eq!(steps[3].line, 4);
    }

    #[test]
    fn keyword_must_be_a_whole_word() {
        let steps = parse("Andy clicks the button", 1).unwrap();
        assert_eq!(steps[0].keyword, None);
        assert_eq!(steps[0].text, "Andy clicks the button");
    }

    #[test]
    fn parses_tables() {
        let steps = parse(
            "When I fill the form\n\
             | Target | Value |\n\
             | #user  | alice |\n\
             Then it works",
            1,
        )
        .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[0].table.as_ref().unwrap().raw(),
            [["Target", "Value"], ["#user", "alice"]],
        );
        assert!(steps[1].table.is_none());
    }

    #[test]
    fn table_cells_may_escape_delimiter() {
        assert_eq!(split_row(r"| a\|b | c |"), ["a|b", "c"]);
        assert_eq!(split_row("| a | b"), ["a", "b"]);
        assert_eq!(split_row("|  | b |"), ["", "b"]);
    }

    #[test]
    fn text_block_is_kept_verbatim() {
        let literal = "{\n  \"user\": \"alice\",\n\n      \"deep\": true\n}";
        let body = format!(
            "When I send the payload\n  \"\"\"\n{literal}\n  \"\"\"\nThen it is stored",
        );
        let steps = parse(&body, 1).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].docstring.as_deref(), Some(literal));
    }

    #[test]
    fn text_block_content_is_never_interpreted() {
        let steps = parse(
            "Then the page shows\n\"\"\"\n# not a comment\n@not-a-tag\n| not | a table |\nScenario: nope\n\"\"\"",
            1,
        )
        .unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(
            steps[0].docstring.as_deref(),
            Some("# not a comment\n@not-a-tag\n| not | a table |\nScenario: nope"),
        );
    }

    #[test]
    fn skips_comments_tags_and_headers() {
        let steps = parse(
            "# a comment\n@tag @other\nScenario: inner\n\nGiven a step\n  #\n",
            1,
        )
        .unwrap();
        assert_eq!(texts(&steps), ["a step"]);
    }

    #[test]
    fn skips_outline_examples() {
        let steps = parse(
            "When I search <query>\n\
             Then I see <count> results\n\
             \n\
             @fast\n\
             Examples: small\n\
             | query | count |\n\
             | shoes | 3     |\n\
             Scenarios:\n\
             | query | count |",
            1,
        )
        .unwrap();

        assert_eq!(texts(&steps), ["I search <query>", "I see <count> results"]);
        assert!(steps.iter().all(|s| s.table.is_none()));
    }

    #[test]
    fn step_after_examples_takes_tables_again() {
        let steps = parse(
            "Examples:\n| a |\nGiven a form\n| b |",
            1,
        )
        .unwrap();

        assert_eq!(texts(&steps), ["a form"]);
        assert_eq!(steps[0].table.as_ref().unwrap().raw(), [["b"]]);
    }

    #[test]
    fn inline_at_sign_is_step_text() {
        let steps = parse("Then I see \"@smoke\" label\n", 1).unwrap();
        assert_eq!(texts(&steps), ["I see \"@smoke\" label"]);
    }

    #[test]
    fn unterminated_text_block_fails() {
        let err = parse("Given a step\n\"\"\"\nsome text\n", 10).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax {
                line: 11,
                kind: SyntaxError::UnterminatedDocString,
                ..
            },
        ));
    }

    #[test]
    fn orphan_table_fails() {
        let err = parse("| a | b |\nGiven a step", 3).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax { line: 3, kind: SyntaxError::Orphan, .. },
        ));
    }
}
