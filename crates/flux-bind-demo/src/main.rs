//! Binds a small todo store and drives it through its registered actions.

mod logger;

use anyhow::Context;
use flux_bind::{
    ActionOptions, ApiHolder, ApiRegistry, BindingConfig, LocalRuntime, NamingConvention,
    Payload, StoreBinder, StoreDefinition,
};
use serde_json::json;

#[derive(Debug, Clone, Default)]
struct Todos {
    items: Vec<String>,
    done: usize,
}

fn todo_store() -> StoreDefinition<Todos> {
    StoreDefinition::new()
        .method("onAdd", |todos: &mut Todos, payload: &Payload| {
            if let Some(item) = payload.as_str() {
                todos.items.push(item.to_string());
            }
        })
        .method("onCompleteSync", |todos: &mut Todos, _: &Payload| {
            todos.done = (todos.done + 1).min(todos.items.len());
        })
        .method("onClearSync", |todos: &mut Todos, _: &Payload| {
            *todos = Todos::default();
        })
        .method("summary", |todos: &mut Todos, _: &Payload| {
            log::info!("{} of {} done", todos.done, todos.items.len());
        })
        .get_initial_state(|| Todos {
            items: vec!["write docs".to_string()],
            done: 0,
        })
}

fn main() -> anyhow::Result<()> {
    logger::init().context("failed to initialize logger")?;

    let convention = NamingConvention::load();
    let mut binder = StoreBinder::new(LocalRuntime::new(), ApiHolder::new());

    let config = BindingConfig::new("todos").convention(convention);
    let store = binder.create_store(config, todo_store())?;
    store.listen(|todos| log::debug!("todos changed: {:?}", todos));

    let actions = binder
        .api()
        .actions("todos")
        .context("todos actions were not registered")?
        .clone();
    log::info!(
        "Store {} listens to {:?}",
        store.store_name().unwrap_or("?"),
        store.listened_actions()
    );

    for item in ["ship release", "tag version"] {
        if let Some(add) = actions.get("onAdd") {
            add.trigger(json!(item));
        }
    }
    log::info!("{} emission(s) pending", binder.runtime().pending());
    binder.runtime().flush();

    if let Some(complete) = actions.get("onCompleteSync") {
        complete.trigger(json!(null));
    }
    store.call("summary", json!(null));

    let ping = binder.create_actions("onPing", ActionOptions::sync())?;
    if let Some(ping) = ping.get("onPing") {
        ping.listen(|_| log::info!("pong"));
        ping.trigger(json!(null));
    }

    let todos = store.state();
    println!("{} item(s), {} done", todos.items.len(), todos.done);
    Ok(())
}
