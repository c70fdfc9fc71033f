use schema::{Fields, Schema, LOGIN, RECIPE};

use crate::client::Entry;
use crate::router::Entity;
use crate::views;

/// How one entity is presented: its views, titles and messages.
pub struct Screen {
    pub entity: Entity,
    pub schema: &'static Schema,
    pub list_title: &'static str,
    pub new_title: &'static str,
    /// The field that titles an existing record on its edit page.
    pub title_field: &'static str,
    /// Markup of one list entry.
    pub entry_view: fn(&Entry) -> String,
    /// Markup of the edit form, with one input per declared field.
    pub form_view: fn(&Fields) -> String,
    pub delete_prompt: &'static str,
    /// Alert text per required field.
    pub required_messages: &'static [(&'static str, &'static str)],
}

impl Screen {
    pub fn required_message(&self, field: &str) -> &'static str {
        self.required_messages
            .iter()
            .find(|(name, _)| *name == field)
            .map_or("Please fill in all required fields.", |(_, message)| *message)
    }
}

pub static RECIPES: Screen = Screen {
    entity: Entity::Recipe,
    schema: &RECIPE,
    list_title: "Recipes",
    new_title: "New recipe",
    title_field: "name",
    entry_view: views::recipe_entry,
    form_view: views::recipe_form,
    delete_prompt: "Really delete this recipe?",
    required_messages: &[
        ("name", "Please give the recipe a name first."),
        ("ingredients", "Please list the ingredients first."),
    ],
};

pub static USERS: Screen = Screen {
    entity: Entity::User,
    schema: &LOGIN,
    list_title: "Users",
    new_title: "New user",
    title_field: "username",
    entry_view: views::user_entry,
    form_view: views::user_form,
    delete_prompt: "Really delete this user?",
    required_messages: &[
        ("username", "Please choose a username first."),
        ("password", "Please choose a password first."),
    ],
};
