//! Fastening the reference widgets to models through the core binder.

use std::rc::Rc;

use ziptie_core::{
    Binder, BinderConfig, CHECKED, CLICK_EVENT, ContentFallback, Endpoint, INPUT_EVENT, LocalBus,
    MUTATION_EVENT, Model, Value,
};
use ziptie_widgets::{Checkbox, Panel, TextInput};

#[test]
fn checkbox_click_reaches_model_and_back() {
    let todo = Model::new().with("done", false);
    let cb = Checkbox::new("Done");
    let binder = Binder::new();
    let widget = Endpoint::widget(Rc::clone(&cb));
    let model = Endpoint::from(todo.clone());

    // The requested property is overridden by the widget kind.
    assert!(binder.fasten((&widget, "label"), (&model, "done")));
    assert_eq!(binder.fasteners()[0].first.property, CHECKED);

    cb.click();
    assert_eq!(todo.get("done"), Some(Value::Bool(true)));

    todo.set("done", false);
    assert!(!cb.is_checked());

    assert!(binder.snip(&model, &widget));
    assert_eq!(cb.listener_count(CLICK_EVENT), 0);
    cb.click();
    assert_eq!(todo.get("done"), Some(Value::Bool(false)));
}

#[test]
fn radio_binds_like_checkbox() {
    let form = Model::new().with("express", false);
    let radio = Checkbox::radio("Express");
    let binder = Binder::new();
    assert!(binder.fasten(
        &Endpoint::widget(Rc::clone(&radio)),
        (&Endpoint::from(form.clone()), "express"),
    ));
    radio.click();
    assert_eq!(form.get("express"), Some(Value::Bool(true)));
}

#[test]
fn typing_updates_model_and_model_updates_input() {
    let person = Model::new().with("name", "");
    let input = TextInput::new();
    let bus = Rc::new(LocalBus::new());
    let binder = Binder::with_bus(Rc::clone(&bus));
    let widget = Endpoint::widget(Rc::clone(&input));
    assert!(binder.fasten(&widget, (&Endpoint::from(person.clone()), "name")));

    input.type_text("Ada");
    assert_eq!(person.get("name"), Some(Value::from("Ada")));

    bus.reset_counters();
    person.set("name", "Grace");
    assert_eq!(input.value(), "Grace");
    assert!(bus.published_count() <= 3);
    assert_eq!(input.listener_count(INPUT_EVENT), 1);
}

#[test]
fn text_area_keeps_multiline_values() {
    let note = Model::new().with("body", "");
    let area = TextInput::multiline();
    let binder = Binder::new();
    assert!(binder.fasten(
        (&Endpoint::from(note.clone()), "body"),
        &Endpoint::widget(Rc::clone(&area)),
    ));
    area.replace("line one\nline two");
    assert_eq!(note.get("body"), Some(Value::from("line one\nline two")));
}

#[test]
fn panel_mirrors_through_mutation() {
    let page = Model::new().with("html", "");
    let panel = Panel::new();
    let binder = Binder::new();
    let widget = Endpoint::widget(Rc::clone(&panel));
    let model = Endpoint::from(page.clone());
    assert!(binder.fasten(&widget, (&model, "html")));

    panel.render("<h1>Hi</h1>");
    assert_eq!(page.get("html"), Some(Value::from("<h1>Hi</h1>")));

    page.set("html", "<h1>Bye</h1>");
    assert_eq!(panel.content(), "<h1>Bye</h1>");

    let report = binder.try_snip(&widget, &model).unwrap();
    assert!(report.is_clean());
    assert_eq!(panel.listener_count(MUTATION_EVENT), 0);
}

#[test]
fn untracked_panel_only_receives() {
    let config = BinderConfig::new().with_content_fallback(ContentFallback::Untracked);
    let binder = Binder::with_config(config).unwrap();
    let page = Model::new().with("html", "");
    let panel = Panel::new();
    let widget = Endpoint::widget(Rc::clone(&panel));
    let model = Endpoint::from(page.clone());
    assert!(binder.fasten(&widget, (&model, "html")));
    assert_eq!(panel.listener_count(MUTATION_EVENT), 0);

    page.set("html", "in");
    assert_eq!(panel.content(), "in");
    panel.render("out");
    assert_eq!(page.get("html"), Some(Value::from("in")));

    assert_eq!(binder.try_snip(&model, &widget).unwrap().listenerless(), 1);
}

#[test]
fn checkbox_and_text_input_coerce_into_each_other() {
    let cb = Checkbox::new("Agree");
    let input = TextInput::new();
    let bus = Rc::new(LocalBus::new());
    let binder = Binder::with_bus(Rc::clone(&bus));
    let toggle = Endpoint::widget(Rc::clone(&cb));
    let field = Endpoint::widget(Rc::clone(&input));
    assert!(binder.fasten(&toggle, &field));

    bus.reset_counters();
    cb.click();
    assert_eq!(input.value(), "true");
    assert!(bus.published_count() <= 2);
    assert!(bus.max_depth() <= 2);

    bus.reset_counters();
    input.replace("");
    assert!(!cb.is_checked());
    assert!(bus.published_count() <= 2);

    input.type_text("yes");
    assert!(cb.is_checked());
    assert_eq!(input.value(), "yes");

    assert!(binder.snip(&field, &toggle));
    assert_eq!(cb.listener_count(CLICK_EVENT), 0);
    assert_eq!(input.listener_count(INPUT_EVENT), 0);
}
