use clap::{Parser, Subcommand};
use dustcal::{QuarterNameMode, TemplatePlugin};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dustcal", version, about = "Periodic notes with a calendar panel")]
pub struct Cli {
    /// Vault directory (defaults to the nearest directory holding .dustcal)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,
    /// Print debug logs to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a vault in the current directory
    Init,
    /// Open the calendar view, reusing an existing panel
    ActiveCalendarView,
    /// Open or create today's daily note
    OpenDailyNote {
        /// Target date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Open or create this week's note
    OpenWeeklyNote {
        /// Target date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Open or create this month's note
    OpenMonthlyNote {
        /// Target date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Open or create this quarter's note
    OpenQuarterlyNote {
        /// Target date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Open or create this year's note
    OpenYearlyNote {
        /// Target date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the period, title and note path of every note type
    Resolve {
        /// Date in YYYY-MM-DD format instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show settings, optionally changing them first
    Settings {
        /// Template plugin used for new notes
        #[arg(long, value_enum)]
        template_plugin: Option<TemplatePlugin>,
        /// How quarters are titled
        #[arg(long, value_enum)]
        quarter_names: Option<QuarterNameMode>,
    },
    /// Run command ids read from stdin, one per line
    Session,
}
