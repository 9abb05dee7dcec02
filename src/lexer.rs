//! A module implementing tokenization of a single command.
//!
//! Words are separated by runs of spaces. A word after the program name that is
//! entirely wrapped in one pair of matching quotes (`"..."` or `'...'`) loses that
//! one pair. There is no escaping and no nested unwrapping.

/// Splits `line` into argument tokens, keeping at most `max_args` of them.
///
/// Tokens beyond the limit are dropped; this is an implementation limit, not an error.
pub fn split_into_tokens(line: &str, max_args: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for word in line.split(' ').filter(|w| !w.is_empty()) {
        if out.len() == max_args {
            log::debug!("argument limit {max_args} reached, dropping `{word}` and the rest");
            break;
        }
        if out.is_empty() {
            out.push(word.to_owned());
        } else {
            out.push(strip_quotes(word).to_owned());
        }
    }

    out
}

/// Removes exactly one pair of matching quotes wrapping the whole word.
fn strip_quotes(word: &str) -> &str {
    for quote in ['"', '\''] {
        if word.len() >= 2 && word.starts_with(quote) && word.ends_with(quote) {
            return &word[1..word.len() - 1];
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 128;

    fn toks(line: &str) -> Vec<String> {
        split_into_tokens(line, LIMIT)
    }

    #[test]
    fn splits_on_runs_of_spaces() {
        assert_eq!(toks("  ls   -l  /tmp "), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(toks("").is_empty());
        assert!(toks("     ").is_empty());
    }

    #[test]
    fn strips_one_layer_of_double_quotes() {
        assert_eq!(toks("echo \"hello\""), vec!["echo", "hello"]);
    }

    #[test]
    fn strips_one_layer_of_single_quotes() {
        assert_eq!(toks("printf 'b\\na\\n'"), vec!["printf", "b\\na\\n"]);
    }

    #[test]
    fn does_not_unwrap_recursively() {
        assert_eq!(toks("echo \"'x'\""), vec!["echo", "'x'"]);
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        assert_eq!(toks("echo \"x'"), vec!["echo", "\"x'"]);
        assert_eq!(toks("echo \"a b\""), vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(toks("echo \""), vec!["echo", "\""]);
    }

    #[test]
    fn empty_quotes_become_empty_argument() {
        assert_eq!(toks("echo ''"), vec!["echo", ""]);
    }

    #[test]
    fn program_name_is_never_unquoted() {
        assert_eq!(toks("'ls' -l"), vec!["'ls'", "-l"]);
    }

    #[test]
    fn extra_tokens_are_dropped() {
        assert_eq!(split_into_tokens("a b c d e", 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn rejoining_is_idempotent() {
        for line in ["ls -la /tmp", "  a  b c   ", "sort -r -n file.txt", "x"] {
            let first = toks(line);
            let second = toks(&first.join(" "));
            assert_eq!(first, second, "line: {line:?}");
        }
    }
}
