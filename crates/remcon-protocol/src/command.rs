//! Command-line tokenization for inbound console text.
//!
//! An envelope's `Message` field holds a command line such as:
//!
//! ```text
//! kick "some player" spamming
//! ```
//!
//! which must become the command `kick` with arguments
//! `["some player", "spamming"]`. Splitting happens on whitespace, but a
//! quoted span (double or single quotes) is kept as one token with the
//! quotes removed.

/// Splits a command line into tokens.
///
/// Quoted spans become single tokens (quotes stripped), including the
/// empty token produced by `""`. An unterminated quote runs to the end of
/// the input rather than being an error — operators typing into a console
/// get the forgiving interpretation.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Some(q) while inside a span opened by the quote character `q`.
    let mut quote: Option<char> = None;
    // Tracks whether the current token contained a quoted span, so that
    // `""` yields an (empty) token instead of nothing.
    let mut saw_quote = false;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    saw_quote = true;
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() || saw_quote {
                        tokens.push(std::mem::take(&mut current));
                    }
                    saw_quote = false;
                }
                c => current.push(c),
            },
        }
    }

    if !current.is_empty() || saw_quote {
        tokens.push(current);
    }

    tokens
}

/// Parses a command line into `(command, args)`.
///
/// The first token, case-folded to lowercase, is the command name; the
/// remaining tokens are positional arguments in order. Returns `None`
/// when the input contains no tokens at all.
pub fn parse_command(input: &str) -> Option<(String, Vec<String>)> {
    let mut tokens = tokenize(input).into_iter();
    let command = tokens.next()?.to_lowercase();
    Some((command, tokens.collect()))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // =====================================================================
    // tokenize()
    // =====================================================================

    #[test]
    fn test_tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("kick player one"), args(&["kick", "player", "one"]));
    }

    #[test]
    fn test_tokenize_collapses_repeated_whitespace() {
        assert_eq!(tokenize("say   hello\tthere"), args(&["say", "hello", "there"]));
    }

    #[test]
    fn test_tokenize_quoted_span_is_one_token() {
        assert_eq!(
            tokenize(r#"say "hello world""#),
            args(&["say", "hello world"])
        );
    }

    #[test]
    fn test_tokenize_single_quotes_work_too() {
        assert_eq!(
            tokenize("kick 'some player' spamming"),
            args(&["kick", "some player", "spamming"])
        );
    }

    #[test]
    fn test_tokenize_quotes_glued_to_text_extend_the_token() {
        // `ban"the player"` is one token: quotes delimit a span, not a word.
        assert_eq!(tokenize(r#"ban"the player""#), args(&["banthe player"]));
    }

    #[test]
    fn test_tokenize_empty_quotes_yield_empty_token() {
        assert_eq!(tokenize(r#"say """#), args(&["say", ""]));
    }

    #[test]
    fn test_tokenize_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize(r#"say "unclosed span"#), args(&["say", "unclosed span"]));
    }

    #[test]
    fn test_tokenize_empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    // =====================================================================
    // parse_command()
    // =====================================================================

    #[test]
    fn test_parse_command_lowercases_command_name() {
        let (cmd, rest) = parse_command("STATUS").unwrap();
        assert_eq!(cmd, "status");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_parse_command_preserves_argument_case_and_order() {
        let (cmd, rest) = parse_command(r#"Say "Hello World" Second"#).unwrap();
        assert_eq!(cmd, "say");
        assert_eq!(rest, args(&["Hello World", "Second"]));
    }

    #[test]
    fn test_parse_command_blank_input_returns_none() {
        assert!(parse_command("").is_none());
        assert!(parse_command("  \t ").is_none());
    }
}
