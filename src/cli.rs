//! CLI domain: parse, route, wizard, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;
mod wizard;

pub use output::map_error;
pub use parse::{Cli, Commands, NewArgs};
pub use presentation::{
    format_branch_result, format_options, format_request_summary, format_run_summary,
    format_stage_started, format_state_changed, format_story_list, format_suggestions,
};
pub use route::{request_from_args, RunContext};
pub use wizard::{run_wizard, WizardDefaults};
