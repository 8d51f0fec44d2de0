use actix_http::Request;
use actix_web::{
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::{
        header::{self, ContentType},
        StatusCode,
    },
    test, web, App, Error, HttpRequest, HttpResponse,
};
use serde_json::{json, Value};
use todo_server::middleware::{RequestTrace, SessionMiddleware, TracingMiddleware};
use todo_server::{app_config, AppState, SessionHandle};

const COOKIE_NAME: &str = "todo.session";

async fn create_test_app() -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    create_app_with_state(web::Data::new(AppState::default())).await
}

async fn create_app_with_state(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware::from_state(&state))
            .wrap(TracingMiddleware)
            .route("/whoami", web::get().to(whoami))
            .configure(app_config),
    )
    .await
}

/// Reports the request's log context next to the session it resolved.
async fn whoami(req: HttpRequest, session: SessionHandle) -> HttpResponse {
    let trace = RequestTrace::from_request(&req).expect("tracing middleware installed");
    HttpResponse::Ok().json(json!({
        "trace_id": trace.trace_id(),
        "traced_session": trace.session_id(),
        "session": session.id(),
    }))
}

fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.into_owned())
}

/// Starts a session and returns its cookie.
async fn start_session(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
) -> Cookie<'static> {
    let req = test::TestRequest::get().uri("/lists").to_request();
    let resp = test::call_service(app, req).await;
    session_cookie(&resp).expect("new session should set a cookie")
}

fn get(uri: &str, cookie: &Cookie<'static>) -> Request {
    test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request()
}

fn post_form(uri: &str, cookie: &Cookie<'static>, body: &str) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .insert_header(ContentType::form_url_encoded())
        .set_payload(body.to_string())
        .to_request()
}

fn post_async(uri: &str, cookie: &Cookie<'static>) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .insert_header(("X-Requested-With", "XMLHttpRequest"))
        .to_request()
}

fn location(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn get_json(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
) -> Value {
    let resp = test::call_service(app, get(uri, cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
    test::read_body_json(resp).await
}

async fn create_list(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    cookie: &Cookie<'static>,
    name: &str,
) {
    let body = format!("list_name={}", name);
    let resp = test::call_service(app, post_form("/lists", cookie, &body)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

async fn add_todo(
    app: &impl Service<Request, Response = ServiceResponse, Error = Error>,
    cookie: &Cookie<'static>,
    list: usize,
    name: &str,
) {
    let uri = format!("/lists/{}/todos", list);
    let body = format!("todo={}", name);
    let resp = test::call_service(app, post_form(&uri, cookie, &body)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");
}

#[actix_web::test]
async fn test_root_redirects_to_lists() {
    let app = create_test_app().await;
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists");
}

#[actix_web::test]
async fn test_session_cookie_issued_once() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;

    let resp = test::call_service(&app, get("/lists", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
}

#[actix_web::test]
async fn test_sessionless_routes_do_not_create_sessions() {
    let state = web::Data::new(AppState::default());
    let app = create_app_with_state(state.clone()).await;

    for uri in ["/health", "/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(session_cookie(&resp).is_none(), "GET {}", uri);
    }
    assert!(state.sessions.is_empty().await);

    start_session(&app).await;
    assert_eq!(state.sessions.len().await, 1);
}

#[actix_web::test]
async fn test_tampered_cookie_starts_new_session() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;

    let forged = Cookie::new(COOKIE_NAME, "not-a-signed-value");
    let resp = test::call_service(&app, get("/lists", &forged)).await;
    assert!(session_cookie(&resp).is_some());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["lists"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_sessions_are_isolated() {
    let app = create_test_app().await;
    let alice = start_session(&app).await;
    let bob = start_session(&app).await;

    create_list(&app, &alice, "Alice").await;

    let body = get_json(&app, "/lists", &bob).await;
    assert!(body["lists"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_list_and_view_it() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;

    let resp = test::call_service(&app, post_form("/lists", &cookie, "list_name=Groceries")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists");

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["view"], "lists");
    assert_eq!(index["flash"]["success"], "The list has been created.");
    assert_eq!(index["lists"].as_array().unwrap().len(), 1);
    assert_eq!(index["lists"][0]["name"], "Groceries");
    assert_eq!(index["lists"][0]["id"], 0);

    let list = get_json(&app, "/lists/0", &cookie).await;
    assert_eq!(list["view"], "list");
    assert_eq!(list["list"]["name"], "Groceries");
    assert_eq!(list["todos"], serde_json::json!([]));
}

#[actix_web::test]
async fn test_flash_shown_once() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;

    let first = get_json(&app, "/lists", &cookie).await;
    assert!(first["flash"]["success"].is_string());

    let second = get_json(&app, "/lists", &cookie).await;
    assert_eq!(second["flash"], serde_json::json!({}));
}

#[actix_web::test]
async fn test_create_list_rejects_bad_names() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;

    let long_name = format!("list_name={}", "x".repeat(101));
    for body in ["list_name=", "list_name=+++", long_name.as_str(), ""] {
        let resp = test::call_service(&app, post_form("/lists", &cookie, body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {:?}", body);

        let view: Value = test::read_body_json(resp).await;
        assert_eq!(view["view"], "new_list");
        assert_eq!(
            view["flash"]["error"],
            "The list name must be between 1 and 100 characters."
        );
    }

    let index = get_json(&app, "/lists", &cookie).await;
    assert!(index["lists"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_duplicate_list() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Groceries").await;

    let resp = test::call_service(&app, post_form("/lists", &cookie, "list_name=Groceries")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["flash"]["error"], "List name must be unique.");
    assert_eq!(view["list_name"], "Groceries");

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["lists"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_missing_list_redirects_with_error() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;

    for uri in ["/lists/0", "/lists/abc", "/lists/3/edit"] {
        let resp = test::call_service(&app, get(uri, &cookie)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {}", uri);
        assert_eq!(location(&resp), "/lists");
    }

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["flash"]["error"], "The specified list was not found.");
}

#[actix_web::test]
async fn test_edit_and_rename_list() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;
    create_list(&app, &cookie, "Home").await;

    let form = get_json(&app, "/lists/1/edit", &cookie).await;
    assert_eq!(form["view"], "edit_list");
    assert_eq!(form["list_name"], "Home");

    let resp = test::call_service(&app, post_form("/lists/1", &cookie, "list_name=House")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists/1");

    let list = get_json(&app, "/lists/1", &cookie).await;
    assert_eq!(list["list"]["name"], "House");
    assert_eq!(list["flash"]["success"], "The list has been updated.");
}

#[actix_web::test]
async fn test_rename_to_own_name_succeeds() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;

    let resp = test::call_service(&app, post_form("/lists/0", &cookie, "list_name=Work")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn test_rename_to_taken_name_rerenders_form() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;
    create_list(&app, &cookie, "Home").await;

    let resp = test::call_service(&app, post_form("/lists/1", &cookie, "list_name=Work")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["view"], "edit_list");
    assert_eq!(view["list_name"], "Work");
    assert_eq!(view["list"]["name"], "Home");
    assert_eq!(view["flash"]["error"], "List name must be unique.");
}

#[actix_web::test]
async fn test_delete_list() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;

    let resp = test::call_service(&app, post_form("/lists/0/delete", &cookie, "")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists");

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["flash"]["success"], "The list has been deleted.");
    assert!(index["lists"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_list_async() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Work").await;

    let resp = test::call_service(&app, post_async("/lists/0/delete", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "/lists");

    let resp = test::call_service(&app, post_async("/lists/0/delete", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_add_and_delete_todos() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Groceries").await;
    add_todo(&app, &cookie, 0, "Milk").await;
    add_todo(&app, &cookie, 0, "Eggs").await;

    let resp = test::call_service(&app, post_form("/lists/0/todos/1/delete", &cookie, "")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists/0");

    let list = get_json(&app, "/lists/0", &cookie).await;
    assert_eq!(list["flash"]["success"], "The todo has been deleted.");
    assert_eq!(
        list["todos"],
        serde_json::json!([{ "id": 2, "name": "Eggs", "completed": false }])
    );
}

#[actix_web::test]
async fn test_deleting_middle_todo_keeps_ids() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Chores").await;
    for name in ["one", "two", "three"] {
        add_todo(&app, &cookie, 0, name).await;
    }

    let resp = test::call_service(&app, post_async("/lists/0/todos/2/delete", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let list = get_json(&app, "/lists/0", &cookie).await;
    let ids: Vec<u64> = list["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[actix_web::test]
async fn test_delete_missing_todo() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Groceries").await;

    let resp = test::call_service(&app, post_async("/lists/0/todos/7/delete", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, post_form("/lists/0/todos/7/delete", &cookie, "")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists");

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["flash"]["error"], "The specified todo was not found.");
}

#[actix_web::test]
async fn test_add_empty_todo_rerenders_list() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Groceries").await;
    add_todo(&app, &cookie, 0, "Milk").await;

    let resp = test::call_service(&app, post_form("/lists/0/todos", &cookie, "todo=+")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["view"], "list");
    assert_eq!(
        view["flash"]["error"],
        "The todo name must be between 1 and 100 characters."
    );
    assert_eq!(view["todos"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_add_todo_to_missing_list() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;

    let resp = test::call_service(&app, post_form("/lists/0/todos", &cookie, "todo=Milk")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists");
}

#[actix_web::test]
async fn test_update_todo_status() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Groceries").await;
    add_todo(&app, &cookie, 0, "Milk").await;
    add_todo(&app, &cookie, 0, "Eggs").await;

    let resp =
        test::call_service(&app, post_form("/lists/0/todos/1", &cookie, "completed=true")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists/0");

    let list = get_json(&app, "/lists/0", &cookie).await;
    assert_eq!(list["flash"]["success"], "The todo has been updated.");
    // completed todos sort last
    assert_eq!(list["todos"][0]["name"], "Eggs");
    assert_eq!(list["todos"][1]["name"], "Milk");
    assert_eq!(list["todos"][1]["completed"], true);

    let resp =
        test::call_service(&app, post_form("/lists/0/todos/1", &cookie, "completed=yes")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let list = get_json(&app, "/lists/0", &cookie).await;
    assert_eq!(list["list"]["todos_remaining_count"], 2);
}

#[actix_web::test]
async fn test_complete_all() {
    let app = create_test_app().await;
    let cookie = start_session(&app).await;
    create_list(&app, &cookie, "Done").await;
    create_list(&app, &cookie, "Empty").await;
    add_todo(&app, &cookie, 0, "Milk").await;
    add_todo(&app, &cookie, 0, "Eggs").await;

    let resp = test::call_service(&app, post_form("/lists/0/complete_all", &cookie, "")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/lists/0");

    let index = get_json(&app, "/lists", &cookie).await;
    assert_eq!(index["flash"]["success"], "All todos have been completed.");
    // the empty list is not complete, so it sorts first
    assert_eq!(index["lists"][0]["name"], "Empty");
    assert_eq!(index["lists"][0]["completed"], false);
    assert_eq!(index["lists"][1]["name"], "Done");
    assert_eq!(index["lists"][1]["id"], 0);
    assert_eq!(index["lists"][1]["class"], "complete");
    assert_eq!(index["lists"][1]["todos_remaining_count"], 0);
}

#[actix_web::test]
async fn test_trace_id_is_echoed() {
    let app = create_test_app().await;
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("X-Trace-Id", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-trace-id").unwrap(), "trace-42");
}

#[actix_web::test]
async fn test_trace_records_session() {
    let app = create_test_app().await;
    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("X-Trace-Id", "trace-7"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp).expect("new session should set a cookie");
    let fresh: Value = test::read_body_json(resp).await;
    assert_eq!(fresh["trace_id"], "trace-7");
    assert_eq!(fresh["traced_session"], fresh["session"]);

    let resumed = get_json(&app, "/whoami", &cookie).await;
    assert_eq!(resumed["session"], fresh["session"]);
    assert_eq!(resumed["traced_session"], fresh["session"]);
    assert_ne!(resumed["trace_id"], "trace-7");
}
