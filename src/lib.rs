pub mod aggregate;
pub mod cloudflare;
pub mod error;
pub mod normalize;
pub mod notion;
pub mod render;
pub mod source;
pub mod state;
pub mod substitute;
pub mod types;
pub mod view;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use error::DashboardError;
use render::RenderOptions;
use source::RecordSource;
use state::AppState;
use view::DashboardView;

/// Channel buffer size for rendered frames
const FRAME_CHANNEL_SIZE: usize = 8;

/// Clear the screen and home the cursor before each frame.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Run the dashboard in the terminal until `q` or Ctrl-C.
///
/// Keys (followed by Enter): `r` refreshes now, `q` quits.
pub async fn run() -> Result<(), DashboardError> {
    let config = state::load_config()?;

    let source: Option<Arc<dyn RecordSource>> = match source::source_from_config(&config.notion) {
        Some(client) => Some(Arc::new(client)),
        None => {
            DashboardError::MissingCredential.log("Dashboard");
            None
        }
    };

    let mut stdout = std::io::stdout();
    let interactive = stdout.is_terminal();
    let options = RenderOptions {
        color: interactive,
        task_preview_limit: config.dashboard.task_preview_limit,
    };

    let state = Arc::new(AppState::new(config));
    let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_CHANNEL_SIZE);
    let view = DashboardView::mount(state, source, frame_tx, options);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                let Some(frame) = frame else { break };
                if interactive {
                    write!(stdout, "{}", CLEAR_SCREEN)?;
                }
                writeln!(stdout, "{}", frame)?;
                stdout.flush()?;
            }
            line = input.next_line(), if input_open => {
                match line? {
                    Some(line) => match line.trim() {
                        "r" | "R" => view.refresh_now(),
                        "q" | "Q" => break,
                        _ => {}
                    },
                    None => {
                        log::debug!("Dashboard: stdin closed, keys disabled");
                        input_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Dashboard: interrupted");
                break;
            }
        }
    }

    view.unmount();
    Ok(())
}
