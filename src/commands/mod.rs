// ABOUTME: Command module aggregator for the marshal CLI.
// ABOUTME: Re-exports plan, run, and rollback command handlers.

mod plan;
mod project;
mod rollback;
mod run;

pub use plan::plan;
pub use rollback::rollback;
pub use run::run;
