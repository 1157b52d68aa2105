// ABOUTME: POSIX shell quoting for command lines sent to the remote host.
// ABOUTME: Arguments are left bare when safe and single-quoted otherwise.

/// Escape content destined for the inside of a single-quoted string.
pub fn escape_single_quoted(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for `sh`.
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~', '%',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quoted(arg))
}

/// Always-quoted form, for paths.
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quoted(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_stay_bare() {
        assert_eq!(quote_arg("docker"), "docker");
        assert_eq!(quote_arg("widget:latest"), "widget:latest");
        assert_eq!(quote_arg("3000:3000"), "3000:3000");
    }

    #[test]
    fn empty_argument_is_quoted() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn metacharacters_force_quotes() {
        assert_eq!(quote_arg("a b"), "'a b'");
        assert_eq!(quote_arg("{{.Names}}"), "'{{.Names}}'");
        assert_eq!(quote_arg("$HOME"), "'$HOME'");
    }

    #[test]
    fn embedded_single_quote() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
        assert_eq!(quote_path("/srv/o'neil"), "'/srv/o'\\''neil'");
    }
}
