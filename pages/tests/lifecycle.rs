use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};
use pages::{
    Backend, EditPage, Entity, Entry, ListPage, Method, Navigation, PageError, PageState, Route, Router,
    RouterState, Shell, TransportError,
};
use schema::Fields;
use serde_json::{json, Value};

/// Serves the backend’s HTTP surface from memory and records every call.
#[derive(Default)]
struct FakeBackend {
    records: Mutex<BTreeMap<String, Vec<Entry>>>,
    calls: Mutex<Vec<(Method, String)>>,
    next_id: AtomicU64,
    failing: AtomicBool,
    stalled: Mutex<Option<String>>,
}

impl FakeBackend {
    fn insert(&self, resource: &str, pairs: &[(&str, &str)]) -> String {
        let id = format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let fields = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        self.records
            .lock()
            .unwrap()
            .entry(resource.to_owned())
            .or_default()
            .push(Entry::new(id.clone(), fields));
        id
    }

    fn stored(&self, resource: &str) -> Vec<Entry> {
        self.records.lock().unwrap().get(resource).cloned().unwrap_or_default()
    }

    fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn stall(&self, path: &str) {
        *self.stalled.lock().unwrap() = Some(path.to_owned());
    }

    fn answer(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, PageError> {
        let refuse = |status: u16, message: &str| PageError::TransportFailure {
            method,
            path: path.to_owned(),
            source: TransportError::Status {
                status,
                message: message.to_owned(),
            },
        };

        if self.failing.load(Ordering::SeqCst) {
            return Err(refuse(500, "store unavailable"));
        }

        let resource_path = path.split('?').next().unwrap_or_default();
        let mut segments = resource_path.trim_start_matches('/').splitn(2, '/');
        let resource = segments.next().unwrap_or_default().to_owned();
        let id = segments.next().map(str::to_owned);

        let body_fields: Fields = body
            .and_then(|body| body.as_object().cloned())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k, v.to_owned())))
            .collect();

        match (method, id) {
            (Method::Get, None) => Ok(json!(self.stored(&resource))),
            (Method::Post, None) => {
                let pairs: Vec<(&str, &str)> = body_fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                let id = self.insert(&resource, &pairs);
                let created = self.stored(&resource).into_iter().find(|e| e.id == id);
                Ok(json!(created))
            }
            (Method::Get, Some(id)) => match self.stored(&resource).into_iter().find(|e| e.id == id) {
                Some(entry) => Ok(json!(entry)),
                None => Err(refuse(404, "null")),
            },
            (Method::Put, Some(id)) => {
                let mut records = self.records.lock().unwrap();
                let entry = records
                    .get_mut(&resource)
                    .and_then(|entries| entries.iter_mut().find(|e| e.id == id));

                match entry {
                    Some(entry) => {
                        for (k, v) in body_fields {
                            if !v.is_empty() {
                                entry.fields.insert(k, v);
                            }
                        }
                        Ok(json!(entry))
                    }
                    None => Err(refuse(404, "null")),
                }
            }
            (Method::Delete, Some(id)) => {
                let mut records = self.records.lock().unwrap();
                let entries = records.entry(resource).or_default();
                let before = entries.len();
                entries.retain(|e| e.id != id);
                Ok(json!(before - entries.len()))
            }
            _ => Err(refuse(405, "method not allowed")),
        }
    }
}

impl Backend for FakeBackend {
    fn fetch(&self, method: Method, path: &str, body: Option<Value>) -> BoxFuture<'_, Result<Value, PageError>> {
        self.calls.lock().unwrap().push((method, path.to_owned()));

        if self.stalled.lock().unwrap().as_deref() == Some(path) {
            return future::pending().boxed();
        }

        future::ready(self.answer(method, path, body)).boxed()
    }
}

/// Records every interaction a page has with its host.
#[derive(Default)]
struct FakeShell {
    agree: AtomicBool,
    questions: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
    exceptions: Mutex<Vec<String>>,
    navigations: Mutex<Vec<Route>>,
}

impl FakeShell {
    fn agreeing() -> Self {
        let shell = FakeShell::default();
        shell.agree.store(true, Ordering::SeqCst);
        shell
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    fn exceptions(&self) -> Vec<String> {
        self.exceptions.lock().unwrap().clone()
    }

    fn navigations(&self) -> Vec<Route> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Shell for FakeShell {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_owned());
        self.agree.load(Ordering::SeqCst)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_owned());
    }

    fn show_exception(&self, error: &PageError) {
        self.exceptions.lock().unwrap().push(error.to_string());
    }

    fn navigate(&self, route: Route) {
        self.navigations.lock().unwrap().push(route);
    }
}

fn list_page(backend: &Arc<FakeBackend>, shell: &Arc<FakeShell>, entity: Entity) -> ListPage {
    ListPage::new(entity.screen(), backend.clone(), shell.clone(), &log::discard())
}

fn edit_page(backend: &Arc<FakeBackend>, shell: &Arc<FakeShell>, entity: Entity, id: Option<&str>) -> EditPage {
    EditPage::new(
        entity.screen(),
        backend.clone(),
        shell.clone(),
        &log::discard(),
        id.map(str::to_owned),
    )
}

#[tokio::test]
async fn placeholder_tracks_empty_list() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());

    let mut page = list_page(&backend, &shell, Entity::Recipe);
    assert_eq!(page.state(), PageState::Loading);

    page.init().await.unwrap();
    assert_eq!(page.state(), PageState::Ready);
    assert!(page.entries().is_empty());
    assert!(page.is_placeholder_visible());

    let id = backend.insert("recipe", &[("name", "Gurkensalat"), ("ingredients", "Gurke")]);
    page.init().await.unwrap();

    assert_eq!(page.entries().len(), 1);
    assert!(!page.is_placeholder_visible());
    assert_eq!(page.entries()[0].id(), id);
    assert!(page.entries()[0].markup.contains(&format!(r#"data-id="{}""#, id)));
    assert!(page.entries()[0].markup.contains("Gurkensalat"));
    assert_eq!(backend.calls(), vec![(Method::Get, "/recipe".to_owned()); 2]);
}

#[tokio::test]
async fn entries_are_escaped() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    backend.insert("login", &[("username", "<script>"), ("password", "x")]);

    let mut page = list_page(&backend, &shell, Entity::User);
    page.init().await.unwrap();

    let markup = &page.entries()[0].markup;
    assert!(markup.contains("&lt;script&gt;"));
    assert!(!markup.contains("<script>"));
}

#[tokio::test]
async fn delete_asks_first() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let id = backend.insert("recipe", &[("name", "Kartoffelsalat")]);

    let mut page = list_page(&backend, &shell, Entity::Recipe);
    page.init().await.unwrap();

    assert!(!page.ask_delete(&id).await.unwrap());
    assert_eq!(page.entries().len(), 1);
    assert_eq!(*shell.questions.lock().unwrap(), vec!["Really delete this recipe?".to_owned()]);
    assert!(backend.calls().iter().all(|(method, _)| *method == Method::Get));
}

#[tokio::test]
async fn delete_removes_entry_locally() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::agreeing());
    let first = backend.insert("recipe", &[("name", "Kartoffelsalat")]);
    let second = backend.insert("recipe", &[("name", "Gurkensalat")]);

    let mut page = list_page(&backend, &shell, Entity::Recipe);
    page.init().await.unwrap();

    assert!(page.ask_delete(&first).await.unwrap());
    assert_eq!(page.entries().len(), 1);
    assert_eq!(page.entries()[0].id(), second);
    assert!(!page.is_placeholder_visible());

    assert!(page.ask_delete(&second).await.unwrap());
    assert!(page.entries().is_empty());
    assert!(page.is_placeholder_visible());

    assert!(backend.stored("recipe").is_empty());
    assert_eq!(
        backend.calls().last(),
        Some(&(Method::Delete, format!("/recipe/{}", second)))
    );
    // No reload after a delete.
    assert_eq!(backend.calls().iter().filter(|(m, _)| *m == Method::Get).count(), 1);
}

#[tokio::test]
async fn failed_delete_is_shown_and_keeps_entry() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::agreeing());
    let id = backend.insert("recipe", &[("name", "Kartoffelsalat")]);

    let mut page = list_page(&backend, &shell, Entity::Recipe);
    page.init().await.unwrap();
    backend.fail();

    let error = page.ask_delete(&id).await.unwrap_err();
    assert_eq!(error.status(), Some(500));
    assert_eq!(shell.exceptions().len(), 1);
    assert_eq!(page.entries().len(), 1);
}

#[tokio::test]
async fn list_actions_navigate() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());

    let page = list_page(&backend, &shell, Entity::User);
    page.edit("id-7");
    page.add();

    assert_eq!(
        shell.navigations(),
        vec![Route::EditUser { id: "id-7".to_owned() }, Route::NewUser {}]
    );
}

#[tokio::test]
async fn validation_blocks_save_without_network() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());

    let mut page = edit_page(&backend, &shell, Entity::Recipe, None);
    page.init().await.unwrap();
    assert!(page.is_new());
    assert_eq!(page.title(), "New recipe");
    assert_eq!(page.input("name"), Some(""));

    assert!(page.set_input("name", "Pfannkuchen"));
    assert!(page.set_input("ingredients", "   "));

    match page.save().await {
        Err(PageError::ValidationFailed { field, message }) => {
            assert_eq!(field, "ingredients");
            assert_eq!(message, "Please list the ingredients first.");
        }
        other => panic!("expected a validation failure, got {:?}", other),
    }

    assert_eq!(shell.alerts(), vec!["Please list the ingredients first.".to_owned()]);
    assert!(backend.calls().is_empty());
    assert!(shell.navigations().is_empty());
}

#[tokio::test]
async fn save_creates_trimmed_record() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());

    let mut page = edit_page(&backend, &shell, Entity::Recipe, None);
    page.init().await.unwrap();
    page.set_input("name", "  Pfannkuchen ");
    page.set_input("ingredients", "Mehl, Milch, Eier\n");
    assert!(!page.set_input("_id", "forged"));

    let saved = page.save().await.unwrap();
    assert_eq!(saved.get("name"), "Pfannkuchen");
    assert_eq!(saved.get("ingredients"), "Mehl, Milch, Eier");
    assert_eq!(saved.get("category"), "");

    assert_eq!(backend.calls(), vec![(Method::Post, "/recipe".to_owned())]);
    assert_eq!(shell.navigations(), vec![Route::ListRecipes {}]);
    assert_eq!(backend.stored("recipe").len(), 1);
}

#[tokio::test]
async fn edit_page_updates_existing_record() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let id = backend.insert(
        "login",
        &[("username", "Moritz"), ("email", "m@example.org"), ("password", "geheim")],
    );

    let mut page = edit_page(&backend, &shell, Entity::User, Some(&id));
    page.init().await.unwrap();

    assert!(!page.is_new());
    assert_eq!(page.title(), "Moritz");
    assert_eq!(page.input("email"), Some("m@example.org"));
    assert!(page.markup().contains("m@example.org"));

    page.set_input("email", "moritz@example.org");
    let saved = page.save().await.unwrap();

    assert_eq!(saved.id, id);
    assert_eq!(saved.get("email"), "moritz@example.org");
    assert_eq!(saved.get("username"), "Moritz");
    assert_eq!(backend.calls().last(), Some(&(Method::Put, format!("/login/{}", id))));
    assert_eq!(shell.navigations(), vec![Route::ListUsers {}]);
}

#[tokio::test]
async fn failed_save_stays_on_page() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let id = backend.insert("recipe", &[("name", "Kartoffelsalat"), ("ingredients", "Kartoffeln")]);

    let mut page = edit_page(&backend, &shell, Entity::Recipe, Some(&id));
    page.init().await.unwrap();
    page.set_input("time", "45");
    backend.fail();

    assert!(page.save().await.is_err());
    assert_eq!(shell.exceptions().len(), 1);
    assert!(shell.navigations().is_empty());
    assert_eq!(page.input("time"), Some("45"));

    page.cancel();
    assert_eq!(shell.navigations(), vec![Route::ListRecipes {}]);
}

#[tokio::test]
async fn router_shows_page_for_hash() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    backend.insert("recipe", &[("name", "Gurkensalat")]);

    let router = Router::new(backend.clone(), shell.clone(), &log::discard());
    assert_eq!(router.state(), RouterState::Idle);

    assert_eq!(router.navigate("").await.unwrap(), Navigation::Shown);
    assert_eq!(router.state(), RouterState::Ready);
    assert_eq!(router.route(), Some(Route::ListRecipes {}));

    let page = router.page().unwrap();
    let mut page = page.lock().await;
    assert_eq!(page.title(), "Recipes");
    assert_eq!(page.state(), PageState::Ready);
    assert_eq!(page.as_list().unwrap().entries().len(), 1);
}

#[tokio::test]
async fn router_rejects_unknown_hash() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let router = Router::new(backend.clone(), shell.clone(), &log::discard());

    match router.navigate("#/cookies").await {
        Err(PageError::UnknownRoute(hash)) => assert_eq!(hash, "#/cookies"),
        other => panic!("expected an unknown route, got {:?}", other),
    }
    assert_eq!(router.state(), RouterState::Idle);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_load_leaves_nothing_shown() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let router = Router::new(backend.clone(), shell.clone(), &log::discard());

    let error = router.navigate("#/edit-recipe/missing").await.unwrap_err();
    assert_eq!(error.status(), Some(404));
    assert_eq!(router.state(), RouterState::Idle);
    assert!(router.page().is_none());
    assert_eq!(router.route(), None);
}

#[tokio::test]
async fn newer_navigation_aborts_stale_load() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    backend.insert("login", &[("username", "Jan-Niklas")]);
    backend.stall("/recipe/slow");

    let router = Router::new(backend.clone(), shell.clone(), &log::discard());

    let (stale, fresh) = futures::join!(
        router.navigate("#/edit-recipe/slow"),
        router.navigate("#/list-users")
    );

    assert_eq!(stale.unwrap(), Navigation::Cancelled);
    assert_eq!(fresh.unwrap(), Navigation::Shown);
    assert_eq!(router.state(), RouterState::Ready);
    assert_eq!(router.route(), Some(Route::ListUsers {}));
    assert_eq!(router.page().unwrap().lock().await.title(), "Users");
}

#[tokio::test]
async fn disposed_router_ignores_navigation() {
    let backend = Arc::new(FakeBackend::default());
    let shell = Arc::new(FakeShell::default());
    let router = Router::new(backend.clone(), shell.clone(), &log::discard());

    router.navigate("#/new-user").await.unwrap();
    assert!(router.page().is_some());

    router.dispose();
    assert_eq!(router.state(), RouterState::Disposed);
    assert!(router.page().is_none());

    assert_eq!(router.navigate("#/list-users").await.unwrap(), Navigation::Cancelled);
    assert_eq!(router.state(), RouterState::Disposed);
}
