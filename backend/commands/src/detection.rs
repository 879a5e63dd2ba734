/// Prefix command detection.
use crate::types::CommandInvocation;

/// Split a prefixed message into command name and arguments.
///
/// Returns `None` when `content` does not start with `prefix` or has no tokens.
/// The first token loses the prefix and is lowercased; the rest are arguments.
pub fn parse_invocation(content: &str, prefix: &str) -> Option<CommandInvocation> {
    if !content.starts_with(prefix) {
        return None;
    }

    let mut tokens = content.split_whitespace();
    let first = tokens.next()?;
    let name = first.get(prefix.len()..).unwrap_or_default().to_lowercase();

    Some(CommandInvocation {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}
