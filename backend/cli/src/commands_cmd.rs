//! `tavern commands`: list the built-in command set.

use tavern_commands::builtin_commands;
use tavern_config::schema::DEFAULT_PREFIX;

pub fn render() -> String {
    let mut commands = builtin_commands();
    commands.sort_by(|a, b| a.name.cmp(&b.name));
    let width = commands.iter().map(|c| c.name.len()).max().unwrap_or(0) + DEFAULT_PREFIX.len();

    let mut out = String::from("Built-in commands:\n");
    for cmd in &commands {
        let label = format!("{DEFAULT_PREFIX}{}", cmd.name);
        out.push_str(&format!("  {label:<width$}  {}\n", cmd.description));
    }
    out.push_str("  ping (no prefix) replies pong\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_builtin() {
        let text = render();
        assert!(text.contains("!dice "));
        assert!(text.contains("!help "));
        assert!(text.contains("!whois "));
        assert!(text.contains("ping"));
    }
}
