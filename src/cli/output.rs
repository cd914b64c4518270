//! Colored output helpers for CLI
//!
//! Status lines go through [`Output`]; tool results and agent answers are
//! printed verbatim with [`Output::result`] so they can be piped.

use owo_colors::OwoColorize;

/// Kind of status line. Each has a symbol when colored and a tag when plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Info,
    Warn,
    Error,
    Created,
    Skipped,
}

impl Status {
    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERROR]",
            Status::Created => "[CREATED]",
            Status::Skipped => "[SKIPPED]",
        }
    }

    fn symbol(self) -> String {
        match self {
            Status::Ok | Status::Created => "✓".green().bold().to_string(),
            Status::Info => "•".blue().to_string(),
            Status::Skipped => "-".dimmed().to_string(),
            Status::Warn => "⚠".yellow().bold().to_string(),
            Status::Error => "✗".red().bold().to_string(),
        }
    }
}

/// Terminal printer for the `techsupport-agent` binary.
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Colored output.
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Plain output for pipes, logs and `--no-color`.
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn line(&self, status: Status, message: &str) -> String {
        if !self.colored {
            return format!("  {} {}", status.tag(), message);
        }
        let body = match status {
            Status::Ok => message.green().to_string(),
            Status::Warn => message.yellow().to_string(),
            Status::Error => message.red().to_string(),
            Status::Info | Status::Created | Status::Skipped => message.to_string(),
        };
        format!("  {} {}", status.symbol(), body)
    }

    /// Green, for a step that worked.
    pub fn success(&self, message: &str) {
        println!("{}", self.line(Status::Ok, message));
    }

    /// Neutral status line.
    pub fn info(&self, message: &str) {
        println!("{}", self.line(Status::Info, message));
    }

    /// Yellow. The command carries on.
    pub fn warning(&self, message: &str) {
        println!("{}", self.line(Status::Warn, message));
    }

    /// Errors go to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.line(Status::Error, message));
    }

    /// `kind` is a short label such as `config` or `env`.
    pub fn created(&self, kind: &str, path: &str) {
        let message = if self.colored {
            format!("{} {}", kind.dimmed(), path.bright_white())
        } else {
            format!("{} {}", kind, path)
        };
        println!("{}", self.line(Status::Created, &message));
    }

    /// An existing file left untouched.
    pub fn skipped(&self, kind: &str, path: &str) {
        let message = format!("{} {} (exists, use --force to overwrite)", kind, path);
        let message = if self.colored {
            message.dimmed().to_string()
        } else {
            message
        };
        println!("{}", self.line(Status::Skipped, &message));
    }

    /// Reports a directory that was created.
    pub fn created_dir(&self, path: &str) {
        self.created("directory", path);
    }

    /// Section title.
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Smaller title inside a section.
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Indented `key: value`, used for config and schema dumps.
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Bulleted line.
    pub fn list_item(&self, item: &str) {
        let bullet = if self.colored {
            "•".blue().to_string()
        } else {
            "-".to_string()
        };
        println!("    {} {}", bullet, item);
    }

    /// One row of `tools list`.
    pub fn tool_entry(&self, name: &str, description: &str) {
        if self.colored {
            println!("    {:<18} {}", name.bright_cyan().bold(), description.dimmed());
        } else {
            println!("    {}: {}", name, description);
        }
    }

    /// A dimmed tip, set off by a blank line.
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// A shell command the user may want to run next.
    pub fn command(&self, cmd: &str) {
        let cmd = format!("$ {}", cmd);
        if self.colored {
            println!("     {}", cmd.bright_cyan());
        } else {
            println!("     {}", cmd);
        }
    }

    /// Final line of a command that succeeded.
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "✓".green().bold(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Tool output or the agent's answer, unchanged.
    pub fn result(&self, text: &str) {
        println!("{}", text);
    }

    /// Multi-line text indented under the preceding line.
    pub fn block(&self, text: &str) {
        for line in text.lines() {
            if self.colored {
                println!("      {}", line.dimmed());
            } else {
                println!("      {}", line);
            }
        }
    }

    /// Blank line.
    pub fn newline(&self) {
        println!();
    }
}
