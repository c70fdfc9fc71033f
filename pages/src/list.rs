use std::sync::Arc;

use log::{debug, o, Logger};
use schema::Fields;

use crate::backend::Backend;
use crate::client::{Entry, ResourceClient};
use crate::error::PageError;
use crate::router::Route;
use crate::screens::Screen;
use crate::shell::Shell;
use crate::PageState;

/// One rendered row of a list page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListEntry {
    pub entry: Entry,
    pub markup: String,
}

impl ListEntry {
    pub fn id(&self) -> &str {
        &self.entry.id
    }
}

/// Shows every record of an entity with edit and delete actions.
pub struct ListPage {
    screen: &'static Screen,
    client: ResourceClient,
    shell: Arc<dyn Shell>,
    logger: Logger,
    state: PageState,
    entries: Vec<ListEntry>,
    placeholder_visible: bool,
}

impl ListPage {
    pub fn new(screen: &'static Screen, backend: Arc<dyn Backend>, shell: Arc<dyn Shell>, logger: &Logger) -> Self {
        ListPage {
            screen,
            client: ResourceClient::new(screen.schema, backend),
            shell,
            logger: logger.new(o!("page" => "list", "resource" => screen.schema.resource)),
            state: PageState::Loading,
            entries: Vec::new(),
            placeholder_visible: false,
        }
    }

    /// Loads every record and renders one entry per record, in the order
    /// the backend returned them.
    pub async fn init(&mut self) -> Result<(), PageError> {
        self.state = PageState::Loading;

        let found = self.client.search(&Fields::new()).await?;
        debug!(self.logger, "Loaded entries"; "count" => found.len());

        self.entries = found.into_iter().map(|entry| self.render(entry)).collect();
        self.refresh_placeholder();
        self.state = PageState::Ready;

        Ok(())
    }

    fn render(&self, entry: Entry) -> ListEntry {
        ListEntry {
            markup: (self.screen.entry_view)(&entry),
            entry,
        }
    }

    fn refresh_placeholder(&mut self) {
        self.placeholder_visible = self.entries.is_empty();
    }

    pub fn title(&self) -> &'static str {
        self.screen.list_title
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn is_placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    /// Switches to the edit page of `id`.
    pub fn edit(&self, id: &str) {
        self.shell.navigate(Route::edit(self.screen.entity, id));
    }

    /// Switches to an empty form for a new record.
    pub fn add(&self) {
        self.shell.navigate(Route::create(self.screen.entity));
    }

    /// Asks before deleting `id`. Returns whether the entry was removed.
    /// A failed delete is shown to the user and leaves the list as it is.
    pub async fn ask_delete(&mut self, id: &str) -> Result<bool, PageError> {
        if !self.shell.confirm(self.screen.delete_prompt) {
            return Ok(false);
        }

        if let Err(e) = self.client.delete(id).await {
            self.shell.show_exception(&e);
            return Err(e);
        }

        debug!(self.logger, "Deleted entry"; "id" => id);
        self.entries.retain(|entry| entry.id() != id);
        self.refresh_placeholder();

        Ok(true)
    }
}
