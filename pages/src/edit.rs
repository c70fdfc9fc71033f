use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, o, warn, Logger};
use schema::Fields;

use crate::backend::Backend;
use crate::client::{Entry, ResourceClient};
use crate::error::PageError;
use crate::router::Route;
use crate::screens::Screen;
use crate::shell::Shell;
use crate::PageState;

/// A form for one record. Without an id it creates a new one.
pub struct EditPage {
    screen: &'static Screen,
    client: ResourceClient,
    shell: Arc<dyn Shell>,
    logger: Logger,
    edit_id: Option<String>,
    state: PageState,
    title: String,
    draft: Fields,
    markup: String,
    inputs: BTreeMap<&'static str, String>,
}

impl EditPage {
    pub fn new(
        screen: &'static Screen,
        backend: Arc<dyn Backend>,
        shell: Arc<dyn Shell>,
        logger: &Logger,
        edit_id: Option<String>,
    ) -> Self {
        let logger = logger.new(o!(
            "page" => "edit",
            "resource" => screen.schema.resource,
            "id" => edit_id.clone(),
        ));

        EditPage {
            screen,
            client: ResourceClient::new(screen.schema, backend),
            shell,
            logger,
            edit_id,
            state: PageState::Loading,
            title: screen.new_title.to_owned(),
            draft: screen.schema.blank(),
            markup: String::new(),
            inputs: BTreeMap::new(),
        }
    }

    /// Loads the record being edited, if any, and fills the form with it.
    pub async fn init(&mut self) -> Result<(), PageError> {
        self.state = PageState::Loading;
        self.draft = self.screen.schema.blank();

        if let Some(id) = &self.edit_id {
            let entry = self.client.read(id).await?;

            for field in self.screen.schema.fields {
                if let Some(value) = entry.fields.get(*field) {
                    self.draft.insert((*field).to_owned(), value.clone());
                }
            }

            self.title = entry.get(self.screen.title_field).to_owned();
        } else {
            self.title = self.screen.new_title.to_owned();
        }

        self.markup = (self.screen.form_view)(&self.draft);
        self.inputs = self
            .screen
            .schema
            .fields
            .iter()
            .map(|field| (*field, self.draft.get(*field).cloned().unwrap_or_default()))
            .collect();

        self.state = PageState::Ready;
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn is_new(&self) -> bool {
        self.edit_id.is_none()
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The current content of the input bound to `field`.
    pub fn input(&self, field: &str) -> Option<&str> {
        self.inputs.get(field).map(String::as_str)
    }

    /// Types into the input bound to `field`. Returns `false` if the form
    /// has no such input.
    pub fn set_input(&mut self, field: &str, value: &str) -> bool {
        match self.inputs.get_mut(field) {
            Some(input) => {
                *input = value.to_owned();
                true
            }
            None => false,
        }
    }

    /// Leaves the form without saving.
    pub fn cancel(&self) {
        self.shell.navigate(Route::list(self.screen.entity));
    }

    /// Copies the trimmed inputs into the draft, checks the required
    /// fields and stores the draft. On success the list page is shown.
    ///
    /// Every failure has already been shown through the shell when this
    /// returns; the page stays open with the user’s input intact.
    pub async fn save(&mut self) -> Result<Entry, PageError> {
        for (field, value) in &self.inputs {
            self.draft.insert((*field).to_owned(), value.trim().to_owned());
        }

        if let Some(field) = self.screen.schema.first_missing_required(&self.draft) {
            let message = self.screen.required_message(field);
            self.shell.alert(message);
            return Err(PageError::ValidationFailed { field, message });
        }

        let saved = match &self.edit_id {
            Some(id) => self.client.update(id, &self.draft).await,
            None => self.client.create(&self.draft).await,
        };

        match saved {
            Ok(entry) => {
                debug!(self.logger, "Saved"; "id" => &entry.id);
                self.shell.navigate(Route::list(self.screen.entity));
                Ok(entry)
            }
            Err(e) => {
                warn!(self.logger, "Save failed"; "error" => %e);
                self.shell.show_exception(&e);
                Err(e)
            }
        }
    }
}
