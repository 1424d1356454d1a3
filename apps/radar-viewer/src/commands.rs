//! User commands and their keyboard shortcuts.

use eframe::egui::{Key, KeyboardShortcut, Modifiers};
use qc_filters::QcFilter;
use renderer::ColormapChoice;

/// Everything the menus and shortcuts can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenFile,
    OpenFolder,
    SaveImage,
    Quit,
    PreviousFile,
    NextFile,
    ToggleOverlay,
    SetColormap(ColormapChoice),
    ApplyQc(QcFilter),
    Plot,
    About,
}

const OPEN_FILE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const OPEN_FOLDER: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::O);
const SAVE_IMAGE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
const QUIT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);
const TOGGLE_OVERLAY: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::B);
const PREVIOUS_FILE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::ArrowLeft);
const NEXT_FILE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::ArrowRight);

impl Command {
    /// Commands reachable from the keyboard, most specific first so that
    /// Ctrl+Shift+O is consumed before Ctrl+O.
    pub const WITH_SHORTCUTS: [Command; 7] = [
        Command::OpenFolder,
        Command::OpenFile,
        Command::SaveImage,
        Command::Quit,
        Command::ToggleOverlay,
        Command::PreviousFile,
        Command::NextFile,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::OpenFile => "Open File…",
            Command::OpenFolder => "Open Folder…",
            Command::SaveImage => "Save Image As…",
            Command::Quit => "Quit",
            Command::PreviousFile => "Previous File",
            Command::NextFile => "Next File",
            Command::ToggleOverlay => "Boundary Overlay",
            Command::SetColormap(choice) => choice.label(),
            Command::ApplyQc(filter) => filter.label(),
            Command::Plot => "Plot",
            Command::About => "About…",
        }
    }

    pub fn shortcut(&self) -> Option<KeyboardShortcut> {
        match self {
            Command::OpenFile => Some(OPEN_FILE),
            Command::OpenFolder => Some(OPEN_FOLDER),
            Command::SaveImage => Some(SAVE_IMAGE),
            Command::Quit => Some(QUIT),
            Command::ToggleOverlay => Some(TOGGLE_OVERLAY),
            Command::PreviousFile => Some(PREVIOUS_FILE),
            Command::NextFile => Some(NEXT_FILE),
            Command::SetColormap(_) | Command::ApplyQc(_) | Command::Plot | Command::About => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_are_unique() {
        let shortcuts: Vec<KeyboardShortcut> = Command::WITH_SHORTCUTS
            .iter()
            .filter_map(Command::shortcut)
            .collect();
        assert_eq!(shortcuts.len(), Command::WITH_SHORTCUTS.len());
        for (i, a) in shortcuts.iter().enumerate() {
            for b in &shortcuts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_folder_shortcut_checked_before_file() {
        let order: Vec<Command> = Command::WITH_SHORTCUTS.to_vec();
        let folder = order.iter().position(|c| *c == Command::OpenFolder).unwrap();
        let file = order.iter().position(|c| *c == Command::OpenFile).unwrap();
        assert!(folder < file);
    }

    #[test]
    fn test_menu_only_commands_have_no_shortcut() {
        assert!(Command::ApplyQc(QcFilter::Clutter).shortcut().is_none());
        assert_eq!(Command::ApplyQc(QcFilter::Attenuation).label(), "Attenuation Correction");
        assert_eq!(Command::SetColormap(ColormapChoice::Viridis).label(), "Viridis");
    }
}
