use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use todo_core::TodoError;

use super::{is_async_request, list_path, not_found, redirect, LISTS_PATH};
use crate::dto::{ListNameForm, ListPath};
use crate::session::SessionHandle;
use crate::views;

/// GET / - the index lives at /lists
pub async fn root() -> HttpResponse {
    redirect(LISTS_PATH)
}

/// GET /lists
pub async fn index(session: SessionHandle) -> HttpResponse {
    let mut session = session.lock().await;
    views::lists(&mut session)
}

/// GET /lists/new
pub async fn new_form(session: SessionHandle) -> HttpResponse {
    let mut session = session.lock().await;
    views::new_list(&mut session, "", StatusCode::OK)
}

/// POST /lists
pub async fn create(session: SessionHandle, form: web::Form<ListNameForm>) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let list_name = form.into_inner().list_name;

    match session.lists.create_list(&list_name) {
        Ok(list) => {
            log::info!("[{}] Created list '{}'", handle.id(), list.name);
            session.set_success("The list has been created.");
            redirect(LISTS_PATH)
        }
        Err(error) => {
            log::debug!("[{}] Rejected list name: {}", handle.id(), error);
            session.set_error(error.to_string());
            views::new_list(
                &mut session,
                list_name.trim(),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

/// GET /lists/{list_id}
pub async fn show(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
) -> HttpResponse {
    let mut session = session.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };

    match views::list(&mut session, index, None, StatusCode::OK) {
        Ok(response) => response,
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// GET /lists/{list_id}/edit
pub async fn edit_form(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
) -> HttpResponse {
    let mut session = session.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };

    match views::edit_list(&mut session, index, None, StatusCode::OK) {
        Ok(response) => response,
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// POST /lists/{list_id}
pub async fn rename(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
    form: web::Form<ListNameForm>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };
    let list_name = form.into_inner().list_name;

    match session.lists.rename_list(index, &list_name) {
        Ok(list) => {
            log::info!("[{}] Renamed list {} to '{}'", handle.id(), index, list.name);
            session.set_success("The list has been updated.");
            redirect(&list_path(index))
        }
        Err(error) if error.is_validation() => {
            log::debug!("[{}] Rejected list name: {}", handle.id(), error);
            session.set_error(error.to_string());
            views::edit_list(
                &mut session,
                index,
                Some(list_name.trim()),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .unwrap_or_else(|error| not_found(&req, &mut session, error))
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// POST /lists/{list_id}/delete
///
/// Background requests get the index path to navigate to as the body.
pub async fn delete(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };

    match session.lists.delete_list(index) {
        Ok(list) => {
            log::info!("[{}] Deleted list '{}'", handle.id(), list.name);
            if is_async_request(&req) {
                HttpResponse::Ok().body(LISTS_PATH)
            } else {
                session.set_success("The list has been deleted.");
                redirect(LISTS_PATH)
            }
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}

/// POST /lists/{list_id}/complete_all
pub async fn complete_all(
    req: HttpRequest,
    session: SessionHandle,
    path: web::Path<ListPath>,
) -> HttpResponse {
    let handle = session;
    let mut session = handle.lock().await;
    let Some(index) = path.index() else {
        return not_found(&req, &mut session, TodoError::ListNotFound);
    };

    match session.lists.complete_all(index) {
        Ok(list) => {
            log::info!("[{}] Completed all todos in '{}'", handle.id(), list.name);
            session.set_success("All todos have been completed.");
            redirect(&list_path(index))
        }
        Err(error) => not_found(&req, &mut session, error),
    }
}
