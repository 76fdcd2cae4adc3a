use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::input::handle_key;
use crate::render::render;
use crate::ui::{App, InputMode, Tui};

pub(crate) async fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut event_stream = EventStream::new();

    // Redraw periodically so busy markers clear without input
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    let mut completions = app
        .browser
        .take_completion_rx()
        .ok_or_else(|| anyhow::anyhow!("Completion receiver already taken"))?;

    while app.running {
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key(app, key);
                    }
                    Some(Ok(Event::Paste(text))) if app.input_mode == InputMode::Editing => {
                        app.paste(&text);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("terminal event error: {}", e);
                    }
                    None => {
                        debug!("terminal event stream closed");
                        app.quit();
                    }
                }
            }

            Some(completion) = completions.recv() => {
                app.browser.on_fetch_complete(completion);
                app.sync_view();
            }

            _ = tick_interval.tick() => {}
        }
    }

    Ok(())
}
