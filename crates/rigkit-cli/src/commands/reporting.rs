//! Text output shared by commands.

use colored::Colorize;
use rigkit_ir::{Diagnostic, Severity};
use rigkit_mirror::MirrorRejection;

/// Prints diagnostics, one per line, marked by severity.
pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\n{}", "Diagnostics:".yellow().bold());
    for diagnostic in diagnostics {
        let marker = match diagnostic.severity() {
            Severity::Rejected => "x".red(),
            Severity::Warning => "!".yellow(),
        };
        println!("  {} {}", marker, diagnostic);
    }
}

/// Prints mirror rejections.
pub(crate) fn print_rejections(rejections: &[MirrorRejection]) {
    if rejections.is_empty() {
        return;
    }
    println!("\n{}", "Rejected:".red().bold());
    for rejection in rejections {
        println!("  {} {}", "x".red(), rejection);
    }
}

/// Prints a list of names under a heading, skipping empty lists.
pub(crate) fn print_names(heading: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    println!("  {} {}", heading.dimmed(), names.join(", "));
}
