use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use skoolway_tui::api::SkoolwayClient;
use skoolway_tui::cache;
use skoolway_tui::config::Config;
use skoolway_tui::tui::{self, App};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it with your Skoolway URL and API token, then run skoolway-tui.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("skoolway-tui — weekly timetable for Skoolway schools");
        println!();
        println!("USAGE:");
        println!("  skoolway-tui           Start the TUI");
        println!("  skoolway-tui --init    Generate a default config file");
        println!();
        println!("CONFIG:");
        println!("  File: ~/.config/skoolway-tui/config.toml");
        println!("  Or set env vars: SKOOLWAY_URL and SKOOLWAY_API_TOKEN");
        println!("  Log level: log_level in the file or SKOOLWAY_LOG");
        println!();
        println!("KEYBINDINGS:");
        println!("  Tab / Shift+Tab   Switch tabs");
        println!("  1-3               Jump to tab");
        println!("  h / l             Previous / next day");
        println!("  j / k / Up / Down Move between periods");
        println!("  [ / ]             Previous / next class");
        println!("  a                 Assign a lesson to the empty cell");
        println!("  e                 Edit timetable settings");
        println!("  r                 Refresh");
        println!("  q / Ctrl+C        Quit");
        return Ok(());
    }

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `skoolway-tui --init` to generate a config file,\n\
         or set SKOOLWAY_URL and SKOOLWAY_API_TOKEN environment variables."
    })?;

    init_logging(&config)?;
    info!(api_url = %config.api_url, "starting skoolway-tui");

    let client = SkoolwayClient::new(&config.api_url, &config.api_token)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

/// The terminal belongs to the TUI, so logs go to a file next to the cache.
fn init_logging(config: &Config) -> Result<()> {
    let dir = dirs::cache_dir()
        .with_context(|| "Could not determine cache directory")?
        .join("skoolway-tui");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("skoolway-tui.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: SkoolwayClient,
) -> Result<()> {
    let mut app = App::new(client);

    // Show cached data instantly, then kick off a background sync.
    if let Some(cached) = cache::load_cache() {
        app.load_from_cache(cached);
        app.start_fetch();
        app.status_message = "Showing cached timetable, syncing in background…".into();
    } else {
        app.start_fetch();
    }

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        })) = tui::event::poll_event(Duration::from_millis(100))?
        {
            tui::event::handle_key(&mut app, code, modifiers);
        }

        if !app.running {
            break;
        }

        // Apply completed fetch/action results without blocking.
        app.poll_fetch_result();
        app.poll_action_result();

        if app.needs_refresh {
            app.needs_refresh = false;
            app.start_fetch();
        }
    }

    Ok(())
}
