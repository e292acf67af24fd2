// ABOUTME: Library side of the Tasklane command-line interface
// ABOUTME: Application wiring, console notifications, argument parsing and logging setup

pub mod app;
pub mod console;
pub mod input;
pub mod logging;

pub use app::App;
pub use console::ConsoleNotifier;
