//! ENTRAIN - terminal binaural beat and Solfeggio session player

use std::fs;
use std::io::{self, stdout};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Frame, Terminal,
};
use tracing::{info, warn};

use entrain_analysis::estimate_peak;
use entrain_audio::{encode_wav, export_file_name, render_session, CpalBackend, SessionConfig};
use entrain_session::{
    AppConfig, MemoryStore, SessionController, SqliteStore, StatisticsStore, SystemClock,
};
use entrain_tui::{
    App, BarSpectrumWidget, ControlsWidget, Field, PresetListWidget, SpectrumLineWidget,
    StatsWidget, StatusBarWidget, Theme, TimerWidget, VerifyDisplay, MIDNIGHT,
};

/// Frame rate for UI updates
const FPS: u64 = 30;

/// Peak search range for the spectrum display (audible band)
const DISPLAY_RANGE_HZ: (f32, f32) = (20.0, 2000.0);

fn main() -> anyhow::Result<()> {
    // Log to stderr; silent unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::load();

    // Durable statistics when the data dir is writable, in-memory otherwise
    let store: Box<dyn StatisticsStore> = match SqliteStore::open(&SqliteStore::default_path()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("statistics database unavailable, using in-memory store: {e}");
            Box::new(MemoryStore::new())
        }
    };
    let controller = SessionController::new(
        Box::new(CpalBackend::new()),
        store,
        Box::new(SystemClock),
    );

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, controller, config.last_session);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut controller: SessionController,
    last_session: SessionConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(last_session);
    let events = controller.events();
    let theme = MIDNIGHT;

    // In-flight WAV export, if any
    let mut export_rx: Option<Receiver<Result<String, String>>> = None;

    let frame_duration = Duration::from_millis(1000 / FPS);

    app.set_message("ENTRAIN | space to play, p for presets, q to quit");

    while app.running {
        let frame_start = Instant::now();

        // Process session events
        while let Ok(event) = events.try_recv() {
            app.handle_session_event(event);
        }

        // Process export completion
        let export_done = export_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        if let Some(outcome) = export_done {
            match outcome {
                Ok(name) => app.set_message(format!("Exported {name}")),
                Err(e) => app.set_message(format!("Export failed: {e}")),
            }
            export_rx = None;
        }

        controller.tick();
        refresh_spectra(&mut app, &controller);

        terminal.draw(|f| ui(f, &app, &controller, &theme))?;

        // Wait for input for the rest of the frame
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, &mut app, &mut controller, &mut export_rx);
                }
            }
        }
    }

    controller.stop();

    // Remember the form for the next run
    let config = AppConfig {
        last_session: app.form,
    };
    if let Err(e) = config.save() {
        warn!("failed to save config: {e}");
    }

    Ok(())
}

/// Pull fresh spectrum snapshots from the session taps
fn refresh_spectra(app: &mut App, controller: &SessionController) {
    let Some(tone) = controller.tone() else {
        return;
    };
    let display = tone.display_tap.lock().sample();
    let detail = tone.detail_tap.lock().sample();
    let peak = estimate_peak(&detail.db, tone.sample_rate, DISPLAY_RANGE_HZ);

    app.spectra.display = Some(display);
    app.spectra.detail = Some(detail);
    app.spectra.peak_hz = Some(peak.frequency_hz);
    app.spectra.sample_rate = tone.sample_rate;

    if let Some((done, total)) = controller.verification_progress() {
        app.verify = VerifyDisplay::InProgress(done, total);
    }
}

fn handle_key(
    key: KeyEvent,
    app: &mut App,
    controller: &mut SessionController,
    export_rx: &mut Option<Receiver<Result<String, String>>>,
) {
    // Popups swallow navigation keys while open
    if app.show_presets {
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('q') => app.show_presets = false,
            KeyCode::Up | KeyCode::Char('k') => app.move_preset_selection(false),
            KeyCode::Down | KeyCode::Char('j') => app.move_preset_selection(true),
            KeyCode::Enter => {
                let preset = app.selected_preset();
                app.apply_preset(preset);
                let config = AppConfig {
                    last_session: app.form,
                };
                if let Err(e) = config.save() {
                    warn!("failed to save config: {e}");
                }
            }
            _ => {}
        }
        return;
    }
    if app.show_stats {
        match key.code {
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => app.show_stats = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char(' ') => {
            if controller.is_running() {
                controller.stop();
            } else {
                app.verify = VerifyDisplay::Hidden;
                if let Err(e) = controller.start(app.form) {
                    app.set_message(format!("Cannot start: {e}"));
                }
            }
        }
        KeyCode::Char('v') => match controller.begin_verify(app.form.carrier_hz) {
            Ok(()) => {
                app.verify = VerifyDisplay::InProgress(0, entrain_analysis::VERIFY_SAMPLE_COUNT)
            }
            Err(_) => app.set_message("Play a tone first to verify frequency"),
        },
        KeyCode::Char('x') => {
            if export_rx.is_some() {
                app.set_message("Export already in progress");
            } else {
                *export_rx = Some(spawn_export(app.form));
                app.set_message("Exporting...");
            }
        }
        KeyCode::Char('p') => app.show_presets = true,
        KeyCode::Char('t') => app.show_stats = true,
        KeyCode::Char('m') => {
            app.selected = Field::Mode;
            app.adjust_selected(1.0);
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_field(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.select_next_field(),
        KeyCode::Left | KeyCode::Char('h') => {
            app.adjust_selected(-1.0);
            if app.selected == Field::Volume {
                controller.set_volume(app.form.volume);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.adjust_selected(1.0);
            if app.selected == Field::Volume {
                controller.set_volume(app.form.volume);
            }
        }
        _ => {}
    }
}

/// Render and encode the session off the UI thread
fn spawn_export(config: SessionConfig) -> Receiver<Result<String, String>> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let result = render_session(&config)
            .map_err(|e| e.to_string())
            .and_then(|audio| encode_wav(&audio).map_err(|e| e.to_string()))
            .and_then(|bytes| {
                let name = export_file_name(&config);
                fs::write(&name, bytes)
                    .map(|_| name)
                    .map_err(|e| e.to_string())
            });
        if let Ok(name) = &result {
            info!(file = %name, "session exported");
        }
        let _ = tx.send(result);
    });
    rx
}

fn ui(f: &mut Frame, app: &App, controller: &SessionController, theme: &Theme) {
    let area = f.area();
    let rows = Layout::vertical([Constraint::Min(10), Constraint::Length(1)]).split(area);
    let (main, status) = (rows[0], rows[1]);

    let columns =
        Layout::horizontal([Constraint::Length(36), Constraint::Min(40)]).split(main);
    let (left, right) = (columns[0], columns[1]);

    let left_rows = Layout::vertical([
        Constraint::Length(10),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .split(left);
    let (controls_area, timer_area) = (left_rows[0], left_rows[1]);

    let right_rows =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(right);
    let (bars_area, line_area) = (right_rows[0], right_rows[1]);

    f.render_widget(ControlsWidget::new(&app.form, app.selected, theme), controls_area);
    f.render_widget(TimerWidget::new(controller.progress(), theme), timer_area);
    f.render_widget(
        BarSpectrumWidget::new(app.spectra.display.as_ref(), theme),
        bars_area,
    );

    // Marker frequencies follow the running session when there is one
    let marker_config = controller.config().copied().unwrap_or(app.form);
    let beat_marker = match marker_config.mode {
        entrain_audio::Mode::Binaural => Some(marker_config.right_hz()),
        entrain_audio::Mode::Pure => None,
    };
    let sample_rate = if app.spectra.sample_rate > 0 {
        app.spectra.sample_rate
    } else {
        48000
    };
    f.render_widget(
        SpectrumLineWidget::new(
            app.spectra.detail.as_ref(),
            sample_rate,
            marker_config.carrier_hz,
            theme,
        )
        .beat_marker(beat_marker)
        .peak(app.spectra.peak_hz),
        line_area,
    );

    f.render_widget(
        StatusBarWidget::new(app.active_carrier, theme)
            .message(app.message.as_deref())
            .verification(app.verify),
        status,
    );

    if app.show_presets {
        let popup = PresetListWidget::popup_area(area);
        f.render_widget(PresetListWidget::new(app.preset_index, theme), popup);
    }
    if app.show_stats {
        let popup = StatsWidget::popup_area(area);
        f.render_widget(StatsWidget::new(controller.statistics(), theme), popup);
    }
}
