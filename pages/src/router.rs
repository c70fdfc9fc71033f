//! Hash-based navigation between pages.
//!
//! Navigating builds a fresh page for the route and initializes it. A
//! navigation that starts while another one is still loading aborts the
//! older load, so a slow response can never replace a newer page.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dioxus::prelude::*;
use futures::future::{AbortHandle, Abortable};
use futures::lock::Mutex as AsyncMutex;
use log::{debug, error, o, Logger};

use crate::backend::Backend;
use crate::edit::EditPage;
use crate::error::PageError;
use crate::list::ListPage;
use crate::screens::{Screen, RECIPES, USERS};
use crate::shell::Shell;
use crate::PageState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Recipe,
    User,
}

impl Entity {
    pub const ALL: [Entity; 2] = [Entity::Recipe, Entity::User];

    pub fn screen(self) -> &'static Screen {
        match self {
            Entity::Recipe => &RECIPES,
            Entity::User => &USERS,
        }
    }
}

/// Every page the application can show, addressed by the path after the
/// `#` of the location.
#[derive(Clone, Debug, PartialEq, Eq, Routable)]
#[rustfmt::skip]
pub enum Route {
    #[route("/list-recipes")]
    ListRecipes {},
    #[route("/new-recipe")]
    NewRecipe {},
    #[route("/edit-recipe/:id")]
    EditRecipe { id: String },
    #[route("/list-users")]
    ListUsers {},
    #[route("/new-user")]
    NewUser {},
    #[route("/edit-user/:id")]
    EditUser { id: String },
}

impl Route {
    pub fn list(entity: Entity) -> Route {
        match entity {
            Entity::Recipe => Route::ListRecipes {},
            Entity::User => Route::ListUsers {},
        }
    }

    pub fn create(entity: Entity) -> Route {
        match entity {
            Entity::Recipe => Route::NewRecipe {},
            Entity::User => Route::NewUser {},
        }
    }

    pub fn edit(entity: Entity, id: &str) -> Route {
        let id = id.to_owned();
        match entity {
            Entity::Recipe => Route::EditRecipe { id },
            Entity::User => Route::EditUser { id },
        }
    }

    /// Parses a location hash such as `#/edit-recipe/<id>`. An empty hash
    /// is the recipe list.
    pub fn parse(hash: &str) -> Result<Route, PageError> {
        let path = hash.trim_start_matches('#');
        if path.is_empty() || path == "/" {
            return Ok(Route::default());
        }

        let parsed = if path.starts_with('/') {
            path.parse::<Route>()
        } else {
            format!("/{}", path).parse::<Route>()
        };

        parsed
            .ok()
            .filter(|route| route.id().map_or(true, |id| !id.is_empty()))
            .ok_or_else(|| PageError::UnknownRoute(hash.to_owned()))
    }

    pub fn entity(&self) -> Entity {
        match self {
            Route::ListRecipes {} | Route::NewRecipe {} | Route::EditRecipe { .. } => Entity::Recipe,
            Route::ListUsers {} | Route::NewUser {} | Route::EditUser { .. } => Entity::User,
        }
    }

    /// The id of the record an edit route points at.
    pub fn id(&self) -> Option<&str> {
        match self {
            Route::EditRecipe { id } | Route::EditUser { id } => Some(id),
            _ => None,
        }
    }

    /// The location hash that leads here.
    pub fn to_hash(&self) -> String {
        format!("#{}", self)
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::ListRecipes {}
    }
}

/// Marks where the host mounts the page for `route`.
#[component]
pub fn PageMount(route: Route) -> Element {
    let hash = route.to_hash();
    let entity = match route.entity() {
        Entity::Recipe => "recipe",
        Entity::User => "user",
    };

    rsx! {
        main { id: "page", "data-route": "{hash}", "data-entity": "{entity}" }
    }
}

#[component]
fn ListRecipes() -> Element {
    rsx! { PageMount { route: Route::ListRecipes {} } }
}

#[component]
fn NewRecipe() -> Element {
    rsx! { PageMount { route: Route::NewRecipe {} } }
}

#[component]
fn EditRecipe(id: String) -> Element {
    rsx! { PageMount { route: Route::EditRecipe { id } } }
}

#[component]
fn ListUsers() -> Element {
    rsx! { PageMount { route: Route::ListUsers {} } }
}

#[component]
fn NewUser() -> Element {
    rsx! { PageMount { route: Route::NewUser {} } }
}

#[component]
fn EditUser(id: String) -> Element {
    rsx! { PageMount { route: Route::EditUser { id } } }
}

/// The page a route shows.
pub enum Page {
    List(ListPage),
    Edit(EditPage),
}

impl Page {
    pub fn for_route(route: &Route, backend: Arc<dyn Backend>, shell: Arc<dyn Shell>, logger: &Logger) -> Page {
        let screen = route.entity().screen();

        match route {
            Route::ListRecipes {} | Route::ListUsers {} => Page::List(ListPage::new(screen, backend, shell, logger)),
            Route::NewRecipe {} | Route::NewUser {} => {
                Page::Edit(EditPage::new(screen, backend, shell, logger, None))
            }
            Route::EditRecipe { id } | Route::EditUser { id } => {
                Page::Edit(EditPage::new(screen, backend, shell, logger, Some(id.clone())))
            }
        }
    }

    pub async fn init(&mut self) -> Result<(), PageError> {
        match self {
            Page::List(page) => page.init().await,
            Page::Edit(page) => page.init().await,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::List(page) => page.title(),
            Page::Edit(page) => page.title(),
        }
    }

    pub fn state(&self) -> PageState {
        match self {
            Page::List(page) => page.state(),
            Page::Edit(page) => page.state(),
        }
    }

    pub fn as_list(&mut self) -> Option<&mut ListPage> {
        match self {
            Page::List(page) => Some(page),
            Page::Edit(_) => None,
        }
    }

    pub fn as_edit(&mut self) -> Option<&mut EditPage> {
        match self {
            Page::Edit(page) => Some(page),
            Page::List(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterState {
    /// Nothing is shown.
    Idle,
    /// A page is being initialized.
    Loading,
    /// The current page finished loading.
    Ready,
    /// The router has been torn down and ignores navigation.
    Disposed,
}

impl RouterState {
    fn can_become(self, next: RouterState) -> bool {
        use RouterState::*;

        match (self, next) {
            (Disposed, _) => false,
            (_, Disposed) | (_, Loading) => true,
            (Loading, Ready) | (Loading, Idle) => true,
            _ => false,
        }
    }
}

/// How a call to [`Router::navigate`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Shown,
    /// A later navigation (or disposal) took over before the page loaded.
    Cancelled,
}

struct Inner {
    state: RouterState,
    generation: u64,
    route: Option<Route>,
    loading: Option<AbortHandle>,
    page: Option<Arc<AsyncMutex<Page>>>,
}

impl Inner {
    fn transition(&mut self, next: RouterState) {
        debug_assert!(
            self.state.can_become(next),
            "router cannot go from {:?} to {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    fn abandon(&mut self) {
        if let Some(handle) = self.loading.take() {
            handle.abort();
        }
        self.page = None;
        self.generation += 1;
    }
}

pub struct Router {
    backend: Arc<dyn Backend>,
    shell: Arc<dyn Shell>,
    logger: Logger,
    inner: Mutex<Inner>,
}

impl Router {
    pub fn new(backend: Arc<dyn Backend>, shell: Arc<dyn Shell>, logger: &Logger) -> Self {
        Router {
            backend,
            shell,
            logger: logger.new(o!("component" => "router")),
            inner: Mutex::new(Inner {
                state: RouterState::Idle,
                generation: 0,
                route: None,
                loading: None,
                page: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RouterState {
        self.lock().state
    }

    pub fn route(&self) -> Option<Route> {
        self.lock().route.clone()
    }

    /// The page currently shown, once it has loaded.
    pub fn page(&self) -> Option<Arc<AsyncMutex<Page>>> {
        self.lock().page.clone()
    }

    /// Shows the page for `hash`. The previous page is dropped right away;
    /// if the new one fails to load, nothing is shown and the error is
    /// returned.
    pub async fn navigate(&self, hash: &str) -> Result<Navigation, PageError> {
        let route = Route::parse(hash)?;

        let (generation, registration) = {
            let mut inner = self.lock();
            if inner.state == RouterState::Disposed {
                debug!(self.logger, "Ignoring navigation after disposal"; "route" => %route);
                return Ok(Navigation::Cancelled);
            }

            inner.abandon();
            inner.transition(RouterState::Loading);
            inner.route = Some(route.clone());

            let (handle, registration) = AbortHandle::new_pair();
            inner.loading = Some(handle);
            (inner.generation, registration)
        };

        debug!(self.logger, "Loading page"; "route" => %route);

        let mut page = Page::for_route(&route, self.backend.clone(), self.shell.clone(), &self.logger);
        let loaded = Abortable::new(
            async move {
                page.init().await?;
                Ok::<_, PageError>(page)
            },
            registration,
        )
        .await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(self.logger, "Page load superseded"; "route" => %route);
            return Ok(Navigation::Cancelled);
        }
        inner.loading = None;

        match loaded {
            Ok(Ok(page)) => {
                inner.page = Some(Arc::new(AsyncMutex::new(page)));
                inner.transition(RouterState::Ready);
                Ok(Navigation::Shown)
            }
            Ok(Err(e)) => {
                error!(self.logger, "Page failed to load"; "route" => %route, "error" => %e);
                inner.route = None;
                inner.transition(RouterState::Idle);
                Err(e)
            }
            Err(_aborted) => Ok(Navigation::Cancelled),
        }
    }

    /// Drops the current page and aborts any pending load.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        if inner.state == RouterState::Disposed {
            return;
        }

        inner.abandon();
        inner.route = None;
        inner.transition(RouterState::Disposed);
    }
}
