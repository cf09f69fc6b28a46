//! Styled terminal output for the CLI
//!
//! Status lines go to stdout and errors to stderr. Quiet mode keeps errors
//! and machine-readable output only.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Print an error message (shown even in quiet mode)
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<22} {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("  • {}", item);
        }
    }

    /// One line per hook: icon, name, timing and cache details
    pub fn hook_result(&self, name: &str, success: bool, detail: &str) {
        if self.quiet && success {
            return;
        }
        let icon = if success {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };
        println!("{} {} {}", icon, style(name).bold(), style(detail).dim());
    }

    /// Print text unchanged, even in quiet mode (reports, JSON)
    pub fn raw(&self, text: &str) {
        println!("{}", text.trim_end());
    }

    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }
}
