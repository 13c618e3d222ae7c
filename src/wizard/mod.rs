//! Trade entry wizard: flow controller, screen views and terminal driver.

mod flow;
mod terminal;
mod view;

pub use flow::Wizard;
pub use terminal::Terminal;
pub use view::{journal_table, sizing_report};
