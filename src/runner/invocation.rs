// ABOUTME: Description of one external command: program, arguments, environment and target.
// ABOUTME: Secret arguments are redacted in every rendering except the one handed to the process.

use super::shell::{quote_arg, quote_path};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a command executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local => write!(f, "local"),
            Target::Remote => write!(f, "remote"),
        }
    }
}

enum Arg {
    Plain(String),
    Secret(SecretString),
}

const REDACTED: &str = "****";

/// A command to run through a [`CommandRunner`](super::CommandRunner).
pub struct Invocation {
    target: Target,
    program: String,
    args: Vec<Arg>,
    env: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
    /// Program is a complete shell script rather than an executable name.
    script: bool,
}

impl Invocation {
    fn new(target: Target, program: String, script: bool) -> Self {
        Self {
            target,
            program,
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
            script,
        }
    }

    pub fn local(program: impl Into<String>) -> Self {
        Self::new(Target::Local, program.into(), false)
    }

    pub fn remote(program: impl Into<String>) -> Self {
        Self::new(Target::Remote, program.into(), false)
    }

    /// A shell script run verbatim by the remote login shell.
    ///
    /// Scripts must not contain secrets: they are logged as written.
    pub fn remote_script(script: impl Into<String>) -> Self {
        Self::new(Target::Remote, script.into(), true)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| Arg::Plain(a.into())));
        self
    }

    pub fn secret_arg(mut self, secret: SecretString) -> Self {
        self.args.push(Arg::Secret(secret));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_remote(&self) -> bool {
        self.target == Target::Remote
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Arguments with secrets exposed, for handing to the child process.
    pub fn exposed_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Plain(s) => s.as_str(),
                Arg::Secret(s) => s.expose_secret(),
            })
            .collect()
    }

    /// Full shell command line for remote execution, secrets exposed.
    pub fn remote_command_line(&self) -> String {
        self.render(false)
    }

    fn render(&self, redact: bool) -> String {
        let mut line = String::new();

        if let Some(dir) = &self.current_dir {
            line.push_str("cd ");
            line.push_str(&quote_path(&dir.to_string_lossy()));
            line.push_str(" && ");
        }

        for (key, value) in &self.env {
            line.push_str(key);
            line.push('=');
            line.push_str(&quote_arg(value));
            line.push(' ');
        }

        if self.script {
            line.push_str(&self.program);
            return line;
        }

        line.push_str(&quote_arg(&self.program));
        for arg in &self.args {
            line.push(' ');
            match arg {
                Arg::Plain(s) => line.push_str(&quote_arg(s)),
                Arg::Secret(_) if redact => line.push_str(REDACTED),
                Arg::Secret(s) => line.push_str(&quote_arg(s.expose_secret())),
            }
        }
        line
    }
}

/// Redacted command line, safe for logs and terminals.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(true))
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", &self.target)
            .field("command", &self.render(true))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_secrets() {
        let inv = Invocation::local("git")
            .arg("clone")
            .secret_arg(SecretString::from("https://tok@github.com/a/b.git"))
            .arg("/tmp/b");
        assert_eq!(inv.to_string(), "git clone **** /tmp/b");
        assert_eq!(
            inv.exposed_args(),
            vec!["clone", "https://tok@github.com/a/b.git", "/tmp/b"]
        );
    }

    #[test]
    fn remote_line_includes_dir_and_env() {
        let inv = Invocation::remote("docker")
            .args(["compose", "up", "-d"])
            .current_dir("/home/deploy/widget")
            .env("COMPOSE_PROJECT_NAME", "widget");
        assert_eq!(
            inv.remote_command_line(),
            "cd '/home/deploy/widget' && COMPOSE_PROJECT_NAME=widget docker compose up -d"
        );
    }

    #[test]
    fn scripts_are_not_quoted() {
        let inv = Invocation::remote_script("command -v docker >/dev/null 2>&1");
        assert_eq!(inv.to_string(), "command -v docker >/dev/null 2>&1");
        assert!(inv.is_remote());
    }
}
