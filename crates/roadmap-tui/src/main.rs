use std::sync::Arc;

use anyhow::Result;
use roadmap_core::{Config, ConversationController, HttpChatbotClient, MessageStore};

mod app;
mod handler;
mod logging;
mod markup;
mod tui;
mod ui;

use app::{App, Op};
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init_logging(&config.log_path()?)?;

    let client = HttpChatbotClient::from_config(&config)?;
    tracing::info!(api_root = client.base_url(), "Starting roadmap client");

    let store = MessageStore::new(Arc::new(client));
    let controller = ConversationController::new(store.clone());
    let mut app = App::new(controller, config.api_root());

    // Subscribe before the first load so its result is not missed
    let mut events = EventHandler::new(store.subscribe());
    app.spawn(Op::Load);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Unmount: anything still in flight must not touch state
    app.quit();
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Roadmap client exited with an error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
