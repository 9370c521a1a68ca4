//! Report generation from trend and daily rows.

mod console;
mod html;

pub use console::generate as generate_console;
pub use html::generate as generate_html;
