//! Plain text rendering of the main window

use std::fmt::Write;

use session::{Command, DocumentView, DocumentWorkspace, Tabs, Toolbar};

/// Enabled actions in brackets, disabled ones dimmed with dashes
pub fn toolbar(toolbar: &Toolbar) -> String {
    Command::ALL
        .iter()
        .map(|command| {
            if toolbar.is_enabled(*command) {
                format!("[{command}]")
            } else {
                format!("-{command}-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tab_strip(tabs: &Tabs) -> String {
    if tabs.is_empty() {
        return "(no documents open)".to_string();
    }

    tabs.iter()
        .enumerate()
        .map(|(idx, view)| {
            if Some(idx) == tabs.active_index() {
                format!("*{}*", view.title())
            } else {
                view.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Lines around the execution marker, or the top of the document without one
pub fn document(view: &DocumentView, context: usize) -> String {
    let lines: Vec<&str> = view.contents().lines().collect();
    let (first, last) = match view.line() {
        Some(line) => (line.saturating_sub(context).max(1), line.saturating_add(context)),
        None => (1, context.saturating_mul(2).saturating_add(1)),
    };
    let last = last.min(lines.len());
    let width = last.max(1).to_string().len();

    let mut out = String::new();
    for lineno in first..=last {
        let marker = if view.line() == Some(lineno) { "=>" } else { "  " };
        let _ = writeln!(out, "{marker} {lineno:>width$} {}", lines[lineno - 1]);
    }
    out
}

/// The whole window
pub fn screen(actions: &Toolbar, tabs: &Tabs, status: &str, context: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", toolbar(actions));
    let _ = writeln!(out, "{}", tab_strip(tabs));
    if let Some(view) = tabs.current_document() {
        out.push_str(&document(view, context));
    }
    let _ = writeln!(out, "-- {status}");
    out
}
