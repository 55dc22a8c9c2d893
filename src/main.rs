mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use dustcal::{CommandId, NoteType};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);
    let vault = args.vault.as_deref();
    let open = CommandId::OpenNote;
    match args.command {
        cli::Command::Init => commands::init(vault),
        cli::Command::ActiveCalendarView => {
            commands::run(vault, CommandId::ActiveCalendarView, None)
        }
        cli::Command::OpenDailyNote { date } => commands::run(vault, open(NoteType::Daily), date),
        cli::Command::OpenWeeklyNote { date } => {
            commands::run(vault, open(NoteType::Weekly), date)
        }
        cli::Command::OpenMonthlyNote { date } => {
            commands::run(vault, open(NoteType::Monthly), date)
        }
        cli::Command::OpenQuarterlyNote { date } => {
            commands::run(vault, open(NoteType::Quarterly), date)
        }
        cli::Command::OpenYearlyNote { date } => {
            commands::run(vault, open(NoteType::Yearly), date)
        }
        cli::Command::Resolve { date } => commands::resolve(vault, date),
        cli::Command::Settings {
            template_plugin,
            quarter_names,
        } => commands::settings(vault, template_plugin, quarter_names),
        cli::Command::Session => commands::session(vault),
    }
}
