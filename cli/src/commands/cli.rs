use clap::{Args as ClapArgs, Parser, Subcommand};
use tablero_core::api::StatusFilter;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    Todas,
    Pendientes,
    Completadas,
}

impl From<FilterArg> for StatusFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Todas => StatusFilter::Todas,
            FilterArg::Pendientes => StatusFilter::Pendientes,
            FilterArg::Completadas => StatusFilter::Completadas,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tablero", about = "Panel de tareas sobre el servicio REST de tareas")]
pub struct Args {
    /// Without a subcommand the interactive board is opened.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the configured service base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = FilterArg::Todas)]
    pub status: FilterArg,

    /// Case-insensitive substring over title and description.
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AddArgs {
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub completed: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub completed: Option<bool>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct IdArg {
    pub id: i64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RmArgs {
    pub id: i64,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks, optionally filtered.
    List(ListArgs),
    /// Create a task.
    Add(AddArgs),
    /// Edit a task; omitted fields keep their current value.
    Edit(EditArgs),
    /// Mark a task as completed.
    Done(IdArg),
    /// Mark a task as pending again.
    Reopen(IdArg),
    /// Delete a task (asks for confirmation).
    Rm(RmArgs),
    /// Open the interactive board (the default).
    Board,
}
