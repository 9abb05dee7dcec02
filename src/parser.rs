//! Structural parsing of a raw line.
//!
//! A line is first split into batch segments at top-level `;`. Each segment is then
//! classified into a [`Dispatch`]: a builtin call, or a [`CommandGroup`] to be run in
//! child processes. Text inside matched parentheses is opaque to the splitters; it is
//! re-parsed from scratch when the subshell runs.

use crate::builtin::Builtin;
use crate::command::{Command, CommandGroup, Stage, Subshell};
use crate::config::Limits;
use crate::error::{BuiltinError, ShellError, StructuralError};
use crate::lexer;
use crate::redirect;

/// What the interpreter should do with one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Runs inside the shell process, never forked.
    Builtin(Builtin),
    /// Runs in one or more child processes.
    Group(CommandGroup),
}

/// How empty segments are treated by [`split_top_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmptySegments {
    /// `a ;; b` is fine: the empty segment is dropped.
    Skip,
    /// `a | | b` is an error: a pipeline must not have a vacant stage.
    Reject,
}

/// Splits `line` at top-level occurrences of `sep`, ignoring separators nested in
/// parentheses. Every returned segment is trimmed and non-empty.
fn split_top_level(
    line: &str,
    sep: char,
    empty: EmptySegments,
    limit: usize,
) -> Result<Vec<String>, StructuralError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    let flush = |segment: &str, segments: &mut Vec<String>| {
        let segment = segment.trim_matches(' ');
        if segment.is_empty() {
            return match empty {
                EmptySegments::Skip => Ok(()),
                EmptySegments::Reject => Err(StructuralError::EmptyStage),
            };
        }
        if segments.len() == limit {
            return Err(StructuralError::TooManySegments { limit });
        }
        segments.push(segment.to_owned());
        Ok(())
    };

    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Err(StructuralError::UnbalancedParens),
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                flush(&line[start..i], &mut segments)?;
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(StructuralError::UnbalancedParens);
    }
    flush(&line[start..], &mut segments)?;

    if segments.is_empty() {
        return Err(StructuralError::EmptyCommand);
    }
    Ok(segments)
}

/// The runnable segments of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Segments within the limit, in input order.
    pub segments: Vec<String>,
    /// Set when segments past the limit were cut off.
    pub overflow: Option<StructuralError>,
}

/// Splits a line into its `;`-separated segments. Empty segments are skipped.
///
/// Segments past `max_segments` are dropped and reported through
/// [`Batch::overflow`]; the ones before them still run.
pub fn split_batch(line: &str, limits: &Limits) -> Result<Batch, StructuralError> {
    let mut segments = split_top_level(line, ';', EmptySegments::Skip, usize::MAX)?;
    let limit = limits.max_segments;
    let overflow = (segments.len() > limit).then(|| {
        log::debug!("dropping {} segments past the limit", segments.len() - limit);
        segments.truncate(limit);
        StructuralError::TooManySegments { limit }
    });
    Ok(Batch { segments, overflow })
}

/// Splits a segment into its `|`-separated stages. An empty stage is an error.
pub fn split_pipeline(segment: &str, limits: &Limits) -> Result<Vec<String>, StructuralError> {
    split_top_level(segment, '|', EmptySegments::Reject, limits.max_segments)
}

/// Extracts the first top-level parenthesized group of `text`.
///
/// Returns the trimmed text inside the group and whatever follows the matching `)`.
pub fn extract_subshell(text: &str) -> Result<(String, String), StructuralError> {
    let open = text.find('(').ok_or(StructuralError::UnbalancedParens)?;
    let mut depth = 0usize;

    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + i;
                    let body = text[open + 1..close].trim_matches(' ');
                    if body.is_empty() {
                        return Err(StructuralError::EmptyCommand);
                    }
                    return Ok((body.to_owned(), text[close + 1..].to_owned()));
                }
            }
            _ => {}
        }
    }
    Err(StructuralError::UnbalancedParens)
}

/// Parses one pipeline stage, or a whole segment with no `|` in it.
fn parse_stage(text: &str, limits: &Limits) -> Result<Stage, ShellError> {
    if text.starts_with('(') {
        let (body, rest) = extract_subshell(text)?;
        let mut trailing = lexer::split_into_tokens(&rest, limits.max_args);
        let redirect = redirect::take_redirection(&mut trailing)?;
        if let Some(extra) = trailing.into_iter().next() {
            return Err(StructuralError::TrailingText(extra).into());
        }
        return Ok(Stage::Subshell(Subshell { body, redirect }));
    }
    if text.contains('(') {
        return Err(StructuralError::UnexpectedParen.into());
    }

    let mut tokens = lexer::split_into_tokens(text, limits.max_args);
    let redirect = redirect::take_redirection(&mut tokens)?;
    Ok(Stage::Command(Command::new(tokens)?, redirect))
}

/// Classifies one batch segment.
///
/// Rules are tried in order: builtin, subshell, pipeline, redirection, plain command.
/// A builtin is recognized by the segment's first word only, so `cd` appearing as a
/// later pipeline stage is just a program name. A `cd` heading a pipeline is an error.
pub fn classify(segment: &str, limits: &Limits) -> Result<Dispatch, ShellError> {
    let tokens = lexer::split_into_tokens(segment, limits.max_args);
    if let Some(builtin) = Builtin::recognize(&tokens) {
        let piped = split_pipeline(segment, limits).is_ok_and(|stages| stages.len() > 1);
        if piped && matches!(builtin, Builtin::Cd(_)) {
            return Err(BuiltinError::InPipeline.into());
        }
        return Ok(Dispatch::Builtin(builtin));
    }

    let stages = split_pipeline(segment, limits)?;
    let group = if let [single] = stages.as_slice() {
        match parse_stage(single, limits)? {
            Stage::Subshell(subshell) => CommandGroup::Subshell(subshell),
            Stage::Command(command, Some(redirect)) => CommandGroup::Redirected(command, redirect),
            Stage::Command(command, None) => CommandGroup::Simple(command),
        }
    } else {
        let stages = stages
            .iter()
            .map(|stage| parse_stage(stage, limits))
            .collect::<Result<Vec<_>, _>>()?;
        CommandGroup::Pipeline(stages)
    };

    log::debug!("classified `{segment}` as {group:?}");
    Ok(Dispatch::Group(group))
}
