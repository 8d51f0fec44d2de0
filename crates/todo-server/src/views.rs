//! View documents
//!
//! Presentation is left to the client: each page is a JSON document naming
//! the view, carrying the data it shows and the pending flash messages.
//! Rendering consumes the flash.

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use todo_core::{list_class, sort_lists, sort_todos, Todo, TodoId, TodoList};

use crate::session::{Flash, SessionData};

pub const LISTS_VIEW: &str = "lists";
pub const NEW_LIST_VIEW: &str = "new_list";
pub const LIST_VIEW: &str = "list";
pub const EDIT_LIST_VIEW: &str = "edit_list";

#[derive(Serialize)]
struct ViewDocument<T: Serialize> {
    view: &'static str,
    flash: Flash,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Serialize)]
pub struct ListSummary {
    pub id: usize,
    pub name: String,
    pub todos_count: usize,
    pub todos_remaining_count: usize,
    pub completed: bool,
    pub class: &'static str,
}

impl ListSummary {
    fn new(id: usize, list: &TodoList) -> Self {
        Self {
            id,
            name: list.name.clone(),
            todos_count: list.todos_count(),
            todos_remaining_count: list.todos_remaining_count(),
            completed: list.is_completed(),
            class: list_class(list),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoView {
    pub id: TodoId,
    pub name: String,
    pub completed: bool,
}

impl From<&Todo> for TodoView {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            name: todo.name.clone(),
            completed: todo.completed,
        }
    }
}

#[derive(Serialize)]
struct ListsData {
    lists: Vec<ListSummary>,
}

#[derive(Serialize)]
struct NewListData<'a> {
    list_name: &'a str,
}

#[derive(Serialize)]
struct ListData<'a> {
    list: ListSummary,
    todos: Vec<TodoView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    todo: Option<&'a str>,
}

#[derive(Serialize)]
struct EditListData<'a> {
    list: ListSummary,
    list_name: &'a str,
}

fn render<T: Serialize>(
    session: &mut SessionData,
    view: &'static str,
    status: StatusCode,
    data: T,
) -> HttpResponse {
    let document = ViewDocument {
        view,
        flash: session.take_flash(),
        data,
    };
    HttpResponse::build(status).json(document)
}

/// Index of all lists, incomplete lists first.
pub fn lists(session: &mut SessionData) -> HttpResponse {
    let lists = sort_lists(session.lists.list_all())
        .into_iter()
        .map(|(id, list)| ListSummary::new(id, list))
        .collect();
    render(session, LISTS_VIEW, StatusCode::OK, ListsData { lists })
}

/// Creation form, optionally prefilled with a rejected name.
pub fn new_list(session: &mut SessionData, list_name: &str, status: StatusCode) -> HttpResponse {
    render(session, NEW_LIST_VIEW, status, NewListData { list_name })
}

/// One list with its todos, incomplete todos first.
pub fn list(
    session: &mut SessionData,
    index: usize,
    todo: Option<&str>,
    status: StatusCode,
) -> todo_core::Result<HttpResponse> {
    let found = session.lists.get(index)?;
    let data = ListData {
        list: ListSummary::new(index, found),
        todos: sort_todos(&found.todos).into_iter().map(TodoView::from).collect(),
        todo,
    };
    Ok(render(session, LIST_VIEW, status, data))
}

/// Rename form. `list_name` is the current name, or the rejected one.
pub fn edit_list(
    session: &mut SessionData,
    index: usize,
    list_name: Option<&str>,
    status: StatusCode,
) -> todo_core::Result<HttpResponse> {
    let found = session.lists.get(index)?;
    let summary = ListSummary::new(index, found);
    let name = list_name.map(str::to_string).unwrap_or_else(|| found.name.clone());
    let data = EditListData {
        list: summary,
        list_name: &name,
    };
    Ok(render(session, EDIT_LIST_VIEW, status, data))
}
