use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(150);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(6);

pub(crate) const COMMAND_HELP: &str = concat!(
    "Commands: /help, /add <title>, /remove <n>, /clear, /import, /export <path>, ",
    "/analyze, /suggest, /strategy <name>, /cancel, /quit"
);

pub(crate) const STATUS_ENTER_ADD: &str =
    "New task — Tab/↑/↓ switch field • Enter to add • Esc to close";
pub(crate) const STATUS_ENTER_IMPORT: &str =
    "Paste a JSON array of tasks • Enter imports • Ctrl+U clears • Esc keeps text for the next analyze";
pub(crate) const STATUS_COMMAND_PALETTE: &str =
    "Type a /command • Up/Down: navigate • Tab/Right: complete • Enter: run • Esc: cancel";
pub(crate) const STATUS_HELP: &str = "Keyboard reference — Enter/Esc to close";
pub(crate) const STATUS_CONFIRM_CLEAR: &str =
    "Clear all tasks and results? — arrows choose, Enter confirms, Esc cancels";
pub(crate) const STATUS_NOTHING_TO_REMOVE: &str = "Nothing to remove";
