/// A single tokenized input line: `name arg1 arg2 ...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self { name: name.into(), args }
    }

    /// The "nothing was typed" sentinel. Never dispatched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Renders the command back into a line the parser accepts.
    /// Arguments containing whitespace are wrapped in double quotes.
    pub fn to_line(&self) -> String {
        let mut line = self.name.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.chars().any(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}
