pub mod prompt;
pub mod providers;
pub mod tax_calendar;

pub use prompt::InstructionTemplate;
