//! Markup of list entries and edit forms, as dioxus components rendered
//! to HTML strings. Record values only ever reach the markup through
//! `rsx!` text and attribute values, which the renderer escapes.

use dioxus::prelude::*;
use schema::Fields;

use crate::client::Entry;
use crate::router::{Entity, Route};

fn field<'a>(fields: &'a Fields, name: &str) -> &'a str {
    fields.get(name).map_or("", String::as_str)
}

#[component]
fn RecipeEntry(entry: Entry) -> Element {
    let id = entry.id.clone();
    let name = entry.get("name");
    let difficulty = entry.get("difficulty");
    let time = entry.get("time");
    let serves = entry.get("serves");
    let category = entry.get("category");

    rsx! {
        li { class: "list-entry", "data-id": "{id}",
            div { class: "name", "{name}" }
            div { class: "details", "{difficulty} · {time} min · serves {serves} · {category}" }
            EntryActions { edit: Route::edit(Entity::Recipe, &id).to_hash() }
        }
    }
}

#[component]
fn UserEntry(entry: Entry) -> Element {
    let id = entry.id.clone();
    let username = entry.get("username");
    let email = entry.get("email");

    rsx! {
        li { class: "list-entry", "data-id": "{id}",
            div { class: "name", "{username}" }
            div { class: "details", "{email}" }
            EntryActions { edit: Route::edit(Entity::User, &id).to_hash() }
        }
    }
}

#[component]
fn EntryActions(edit: String) -> Element {
    rsx! {
        div { class: "actions",
            a { class: "action edit", href: "{edit}", "Edit" }
            a { class: "action delete", "Delete" }
        }
    }
}

#[component]
fn RecipeForm(draft: Fields) -> Element {
    let name = field(&draft, "name");
    let difficulty = field(&draft, "difficulty");
    let time = field(&draft, "time");
    let serves = field(&draft, "serves");
    let category = field(&draft, "category");
    let ingredients = field(&draft, "ingredients");
    let description = field(&draft, "description");

    rsx! {
        form { class: "edit-recipe",
            label { "Name " input { class: "name", value: "{name}" } }
            label { "Difficulty " input { class: "difficulty", value: "{difficulty}" } }
            label { "Time " input { class: "time", value: "{time}" } }
            label { "Serves " input { class: "serves", value: "{serves}" } }
            label { "Category " input { class: "category", value: "{category}" } }
            label { "Ingredients " textarea { class: "ingredients", "{ingredients}" } }
            label { "Description " textarea { class: "description", "{description}" } }
            FormActions {}
        }
    }
}

#[component]
fn UserForm(draft: Fields) -> Element {
    let username = field(&draft, "username");
    let email = field(&draft, "email");
    let password = field(&draft, "password");

    rsx! {
        form { class: "edit-user",
            label { "Username " input { class: "username", value: "{username}" } }
            label { "E-mail " input { class: "email", r#type: "email", value: "{email}" } }
            label { "Password " input { class: "password", r#type: "password", value: "{password}" } }
            FormActions {}
        }
    }
}

#[component]
fn FormActions() -> Element {
    rsx! {
        div { class: "actions",
            button { class: "action cancel", "Cancel" }
            button { class: "action save", "Save" }
        }
    }
}

pub fn recipe_entry(entry: &Entry) -> String {
    dioxus_ssr::render_element(rsx! { RecipeEntry { entry: entry.clone() } })
}

pub fn user_entry(entry: &Entry) -> String {
    dioxus_ssr::render_element(rsx! { UserEntry { entry: entry.clone() } })
}

pub fn recipe_form(draft: &Fields) -> String {
    dioxus_ssr::render_element(rsx! { RecipeForm { draft: draft.clone() } })
}

pub fn user_form(draft: &Fields) -> String {
    dioxus_ssr::render_element(rsx! { UserForm { draft: draft.clone() } })
}
