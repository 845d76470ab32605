use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tablero_core::api::{
    visible_tasks, AppConfig, CliError, Task, TaskQueryCache, TaskRepository, Transport,
};

use crate::commands::cli::{AddArgs, EditArgs, IdArg, ListArgs, RmArgs};
use crate::form;

// User-facing notification strings, kept identical to the original web UI.
pub const MSG_CREATED: &str = "Tarea creada con éxito.";
pub const MSG_UPDATED: &str = "Tarea actualizada correctamente.";
pub const MSG_DELETED: &str = "Tarea eliminada.";
pub const ERR_LOAD: &str = "Error al cargar las tareas";
pub const ERR_UPDATE: &str = "Error al actualizar la tarea.";
pub const ERR_DELETE: &str = "Error al eliminar la tarea.";
pub const ERR_TOGGLE: &str = "Error al cambiar el estado de la tarea.";

/// Everything a command or the board needs: config plus the shared query
/// cache over the task repository.
pub struct AppContext {
    pub cfg: AppConfig,
    pub cache: Arc<TaskQueryCache>,
}

impl AppContext {
    pub fn new(cfg: AppConfig) -> Result<Self, CliError> {
        let transport = Transport::new(&cfg.api.base_url, cfg.api.timeout_ms)?;
        let cache = Arc::new(TaskQueryCache::new(
            TaskRepository::new(transport),
            &cfg.cache,
        ));
        Ok(Self { cfg, cache })
    }
}

pub async fn run_list(ctx: &AppContext, args: ListArgs) -> Result<i32, CliError> {
    let tasks = match ctx.cache.tasks().await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!(target: "tablero.cli", error = %e, "list failed");
            eprintln!("{ERR_LOAD}: {e}");
            return Ok(1);
        }
    };

    let visible = visible_tasks(Some(tasks.as_slice()), args.status.into(), &args.search);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(0);
    }

    for task in &visible {
        println!("{}", format_task_line(task));
    }
    println!(
        "{} de {} tareas",
        visible.len(),
        tasks.len()
    );
    Ok(0)
}

pub async fn run_add(ctx: &AppContext, args: AddArgs) -> Result<i32, CliError> {
    if let Err(msg) = form::validate(&args.title, &args.description) {
        eprintln!("{msg}");
        return Ok(2);
    }
    match ctx
        .cache
        .create_task(args.title.trim(), &args.description, args.completed)
        .await
    {
        Ok(task) => {
            println!("{MSG_CREATED} (id {})", task.id);
            Ok(0)
        }
        Err(e) => {
            // Create surfaces the service's own message (e.g. a title
            // conflict) rather than a generic fallback.
            eprintln!("{e}");
            Ok(1)
        }
    }
}

pub async fn run_edit(ctx: &AppContext, args: EditArgs) -> Result<i32, CliError> {
    let Some(current) = find_task(ctx, args.id).await else {
        eprintln!("No existe la tarea {}", args.id);
        return Ok(1);
    };

    let title = args.title.unwrap_or(current.title);
    let description = args.description.unwrap_or(current.description);
    let completed = args.completed.unwrap_or(current.status.is_completed());

    if let Err(msg) = form::validate(&title, &description) {
        eprintln!("{msg}");
        return Ok(2);
    }
    match ctx
        .cache
        .update_task(args.id, title.trim(), &description, completed)
        .await
    {
        Ok(_) => {
            println!("{MSG_UPDATED}");
            Ok(0)
        }
        Err(e) => {
            tracing::error!(target: "tablero.cli", error = %e, "update failed");
            eprintln!("{ERR_UPDATE}");
            Ok(1)
        }
    }
}

pub async fn run_set_completed(
    ctx: &AppContext,
    args: IdArg,
    completed: bool,
) -> Result<i32, CliError> {
    match ctx.cache.set_completed(args.id, completed).await {
        Ok(task) => {
            println!("{}", format_task_line(&task));
            Ok(0)
        }
        Err(e) => {
            tracing::error!(target: "tablero.cli", error = %e, "toggle failed");
            eprintln!("{ERR_TOGGLE}");
            Ok(1)
        }
    }
}

pub async fn run_rm(ctx: &AppContext, args: RmArgs) -> Result<i32, CliError> {
    if !args.yes {
        // Best-effort title lookup for the prompt, like the web dialog.
        let title = find_task(ctx, args.id)
            .await
            .map(|t| format!("\"{}\"", t.title))
            .unwrap_or_else(|| "esta tarea".to_string());
        print!(
            "¿Estás seguro de que quieres eliminar {title}? Esta acción no se puede deshacer. [s/N] "
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "s" | "S" | "y" | "Y") {
            println!("Cancelado.");
            return Ok(0);
        }
    }

    match ctx.cache.delete_task(args.id).await {
        Ok(()) => {
            println!("{MSG_DELETED}");
            Ok(0)
        }
        Err(e) => {
            tracing::error!(target: "tablero.cli", error = %e, "delete failed");
            eprintln!("{ERR_DELETE}");
            Ok(1)
        }
    }
}

async fn find_task(ctx: &AppContext, id: i64) -> Option<Task> {
    let tasks = ctx.cache.tasks().await.ok()?;
    tasks.iter().find(|t| t.id == id).cloned()
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.status.is_completed() { 'x' } else { ' ' };
    if task.description.is_empty() {
        format!("[{mark}] {:>4}  {}", task.id, task.title)
    } else {
        format!("[{mark}] {:>4}  {} - {}", task.id, task.title, task.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablero_core::api::Status;

    #[test]
    fn task_line_shows_completion_mark() {
        let task = Task {
            id: 12,
            title: "Enviar reporte".to_string(),
            description: String::new(),
            status: Status::Completed,
        };
        assert_eq!(format_task_line(&task), "[x]   12  Enviar reporte");
    }

    #[test]
    fn task_line_appends_description_when_present() {
        let task = Task {
            id: 3,
            title: "Comprar leche".to_string(),
            description: "supermercado".to_string(),
            status: Status::Pending,
        };
        assert_eq!(
            format_task_line(&task),
            "[ ]    3  Comprar leche - supermercado"
        );
    }
}
