//! Command policy filter.
//!
//! Backend-side allowlist for console commands forwarded to the plugin.
//! Evaluated before forwarding regardless of what the plugin itself allows.

/// Command prefixes the panel is willing to forward.
pub const ALLOWED_COMMAND_PREFIXES: &[&str] = &[
    "say",
    "kick",
    "ban",
    "tempban",
    "whitelist add",
    "whitelist remove",
];

/// Join a command and its arguments into the single line that is checked,
/// audited and executed.
pub fn full_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", args.join(" "))
    }
}

/// `true` iff the lowercased command line starts with an allowed prefix.
pub fn is_allowed(full_command: &str) -> bool {
    let lowered = full_command.to_lowercase();
    ALLOWED_COMMAND_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_listed_commands() {
        assert!(is_allowed("say hello"));
        assert!(is_allowed("kick Steve griefing"));
        assert!(is_allowed("tempban Alex 1d"));
        assert!(is_allowed("whitelist remove Alex"));
    }

    #[test]
    fn prefix_match_ignores_case() {
        assert!(is_allowed("WHITELIST ADD Steve"));
        assert!(is_allowed("Say hi"));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_allowed("/op grief"));
        assert!(!is_allowed("op Steve"));
        assert!(!is_allowed("stop"));
        assert!(!is_allowed("whitelist off"));
        assert!(!is_allowed(" say leading space"));
        assert!(!is_allowed(""));
    }

    #[test]
    fn joins_args_with_spaces() {
        assert_eq!(full_command("say", &[]), "say");
        assert_eq!(
            full_command("kick", &["Steve".into(), "bye".into()]),
            "kick Steve bye"
        );
    }
}
