use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use todo_core::TodoError;

use super::{is_async_request, list_path, not_found, redirect};
use crate::dto::{ListPath, TodoForm, TodoPath, TodoStatusForm};
use crate::session::SessionHandle;
use crate::views;

/// POST /lists/{list_id}/todos
pub async fn create(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
    form: web::Form<TodoForm>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };
    let todo_name = form.into_inner().todo;

    match session.lists.add_todo(index, &todo_name) {
        Ok(todo) => {
            log::info!(
                "[{}] Added todo {} '{}' to list {}",
                handle.id(),
                todo.id,
                todo.name,
                index
            );
            session.set_success("The todo was added.");
            redirect(&list_path(index))
        }
        Err(error) if error.is_validation() => {
            log::debug!("[{}] Rejected todo name: {}", handle.id(), error);
            session.set_error(error.to_string());
            views::list(
                &mut session,
                index,
                Some(todo_name.trim()),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .unwrap_or_else(|error| not_found(&req, &mut session, error))
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// POST /lists/{list_id}/todos/{todo_id}/delete
///
/// Background requests get `204 No Content`.
pub async fn delete(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<TodoPath>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };
    let Some(todo_id) = path.todo_id() else {
        return not_found(&req, &mut session, TodoError::TodoNotFound);
    };

    match session.lists.delete_todo(index, todo_id) {
        Ok(todo) => {
            log::info!(
                "[{}] Deleted todo {} '{}' from list {}",
                handle.id(),
                todo.id,
                todo.name,
                index
            );
            if is_async_request(&req) {
                HttpResponse::NoContent().finish()
            } else {
                session.set_success("The todo has been deleted.");
                redirect(&list_path(index))
            }
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// POST /lists/{list_id}/todos/{todo_id}
pub async fn update_status(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<TodoPath>,
    form: web::Form<TodoStatusForm>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };
    let Some(todo_id) = path.todo_id() else {
        return not_found(&req, &mut session, TodoError::TodoNotFound);
    };

    match session
        .lists
        .set_todo_status(index, todo_id, form.is_completed())
    {
        Ok(todo) => {
            log::info!(
                "[{}] Todo {} in list {} completed={}",
                handle.id(),
                todo.id,
                index,
                todo.completed
            );
            session.set_success("The todo has been updated.");
            redirect(&list_path(index))
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}
