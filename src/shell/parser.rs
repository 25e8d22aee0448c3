use crate::shell::ast::ParsedCommand;
use crate::shell::error::ShellError;

/// Splits an input line into a command name and its arguments.
///
/// Whitespace separates tokens unless it sits between double quotes. A `"`
/// toggles quote mode and is dropped from the token; there is no escape
/// sequence for a literal quote. Blank input yields the empty sentinel.
pub fn parse_command_line(input: &str) -> Result<ParsedCommand, ShellError> {
    if input.trim().is_empty() {
        return Ok(ParsedCommand::empty());
    }

    let mut tokens = tokenize(input)?.into_iter();
    match tokens.next() {
        Some(name) => Ok(ParsedCommand::new(name, tokens.collect())),
        None => Ok(ParsedCommand::empty()),
    }
}

fn tokenize(input: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current_token = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if c.is_whitespace() && !in_quotes {
            if !current_token.is_empty() {
                tokens.push(std::mem::take(&mut current_token));
            }
            continue;
        }

        current_token.push(c);
    }

    if in_quotes {
        return Err(ShellError::MalformedInput("Unmatched quotes in command.".to_string()));
    }

    if !current_token.is_empty() {
        tokens.push(current_token);
    }

    Ok(tokens)
}
