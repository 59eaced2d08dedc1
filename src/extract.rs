/// Pulls the source code out of the first Markdown code block in `text`.
///
/// Both inline blocks (`` `code` ``, ``` ``code`` ```) and fenced blocks with
/// an optional language tag are recognized. The closing delimiter must be the
/// same kind as the opening one. Returns an empty string when there is no
/// block, which callers must treat as "no code supplied".
pub fn extract_code(text: &str) -> String {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('`') {
        let start = search_from + offset;
        let ticks = text[start..].chars().take_while(|&c| c == '`').count();
        let delim = if ticks >= 3 { "```" } else { &"``"[..ticks] };

        if let Some(code) = match_block(&text[start + delim.len()..], delim) {
            return code.to_string();
        }
        search_from = start + ticks;
    }

    String::new()
}

fn match_block<'a>(body: &'a str, delim: &str) -> Option<&'a str> {
    let body = if delim == "```" {
        skip_language_tag(body)
    } else {
        body
    };
    let body = skip_blank_lines(body);

    let end = body.find(delim)?;
    Some(body[..end].trim_end())
}

/// Skips `lang\n` right after an opening fence. Only ASCII letters count as a
/// tag, anything else is treated as part of the code.
fn skip_language_tag(body: &str) -> &str {
    let tag_len = body
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if tag_len > 0 && body[tag_len..].starts_with('\n') {
        &body[tag_len + 1..]
    } else {
        body
    }
}

fn skip_blank_lines(mut body: &str) -> &str {
    while let Some(newline) = body.find('\n') {
        if body[..newline].chars().all(|c| c == ' ' || c == '\t') {
            body = &body[newline + 1..];
        } else {
            break;
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_round_trip() {
        let source = "n = int(input())\nfor i in range(n):\n    print(i)";
        let text = format!("```{source}```");
        assert_eq!(extract_code(&text), source);
    }

    #[test]
    fn test_fenced_block_with_language_tag() {
        let text = "!check 1 ```py\nprint(sum(map(int, input().split())))\n```";
        assert_eq!(
            extract_code(text),
            "print(sum(map(int, input().split())))"
        );
    }

    #[test]
    fn test_language_tag_is_case_insensitive() {
        assert_eq!(extract_code("```Python\nprint(1)\n```"), "print(1)");
    }

    #[test]
    fn test_leading_blank_lines_and_trailing_whitespace_are_dropped() {
        let text = "```\n\n   \n\t\nx = 1\n  print(x)\n\n  ```";
        assert_eq!(extract_code(text), "x = 1\n  print(x)");
    }

    #[test]
    fn test_indentation_of_first_line_is_kept() {
        assert_eq!(extract_code("```\n    pass\n```"), "    pass");
    }

    #[test]
    fn test_inline_block() {
        assert_eq!(extract_code("look: `print('hi')` please"), "print('hi')");
        assert_eq!(extract_code("``print(`x`)``"), "print(`x`)");
    }

    #[test]
    fn test_no_block_yields_empty() {
        assert_eq!(extract_code("print('hello')"), "");
        assert_eq!(extract_code(""), "");
    }

    #[test]
    fn test_mismatched_delimiters_do_not_match() {
        assert_eq!(extract_code("```print(1)`"), "");
        assert_eq!(extract_code("``print(1)`"), "");
    }

    #[test]
    fn test_first_block_wins() {
        assert_eq!(extract_code("`a` and then `b`"), "a");
    }
}
