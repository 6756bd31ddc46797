use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use leadtui::{App, AppEvent, Args, ConfigManager, OpenOptions, StorageManager, APP_NAME};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;

fn open_options(args: &Args) -> OpenOptions {
    let mut opts = OpenOptions::new();
    if let Some(delimiter) = args.delimiter {
        opts = opts.with_delimiter(delimiter);
    }
    opts
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args) -> Result<()> {
    let storage = match &args.data_dir {
        Some(dir) => StorageManager::with_dir(dir.clone()),
        None => StorageManager::new(APP_NAME)?,
    };
    let config_manager = match &args.config_dir {
        Some(dir) => ConfigManager::with_dir(dir.clone()),
        None => ConfigManager::new(APP_NAME)?,
    };
    let mut config = config_manager.load()?;
    if let Some(page_size) = args.page_size {
        config.display.page_size = page_size.max(1);
    }

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::with_config(tx.clone(), &storage, config);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;

    let path = args
        .path
        .clone()
        .ok_or_else(|| eyre!("No spreadsheet path given"))?;
    tx.send(AppEvent::Open(path, open_options(args)))?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_saved {
        let storage = match &args.data_dir {
            Some(dir) => StorageManager::with_dir(dir.clone()),
            None => StorageManager::new(APP_NAME)?,
        };
        if let Err(e) = storage.clear_all() {
            eprintln!("Error clearing saved profiles: {}", e);
            std::process::exit(1);
        }
        println!("Saved profiles cleared successfully");
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
