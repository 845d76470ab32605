//! Derives the visible subset of the task collection from the active status
//! filter and search text. Pure and recomputed on every input change; the
//! collection is small enough that no memoization is warranted.

use crate::model::{StatusFilter, Task};

/// A task is visible iff it matches the status filter AND the search text.
/// A blank query matches everything; otherwise the match is a
/// case-insensitive substring test against title or description. `None`
/// input (collection still loading, or load failed) yields an empty list
/// rather than an error.
pub fn visible_tasks(tasks: Option<&[Task]>, status: StatusFilter, search: &str) -> Vec<Task> {
    let Some(tasks) = tasks else {
        return Vec::new();
    };

    let query = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            status.matches(task.status)
                && (query.is_empty()
                    || task.title.to_lowercase().contains(&query)
                    || task.description.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use pretty_assertions::assert_eq;

    fn task(id: i64, title: &str, description: &str, status: Status) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
        }
    }

    fn board() -> Vec<Task> {
        vec![
            task(1, "Comprar leche", "en el supermercado", Status::Pending),
            task(2, "Enviar reporte", "reporte mensual de ventas", Status::Completed),
            task(3, "Llamar a Marta", "sobre el reporte", Status::Pending),
        ]
    }

    #[test]
    fn all_filter_and_blank_query_return_everything_in_order() {
        let tasks = board();
        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Todas, "");
        assert_eq!(visible, tasks);
    }

    #[test]
    fn status_filter_selects_exact_subset() {
        let tasks = board();
        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Pendientes, "");
        assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);

        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Completadas, "");
        assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let tasks = board();
        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Todas, "REPORTE");
        assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn whitespace_only_query_matches_everything() {
        let tasks = board();
        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Todas, "   ");
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn predicates_combine_with_and() {
        let tasks = board();
        let visible = visible_tasks(Some(tasks.as_slice()), StatusFilter::Pendientes, "reporte");
        assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn missing_collection_yields_empty_list() {
        let visible = visible_tasks(None, StatusFilter::Todas, "reporte");
        assert!(visible.is_empty());
    }
}
