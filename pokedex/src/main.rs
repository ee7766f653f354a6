//! Pokedex TUI - handheld-style PokeAPI browser

mod ui;

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::PokeClient;
use pokedex::config::{ClientConfig, DEFAULT_BASE_URL};
use pokedex::effect::Effect;
use pokedex::fetch::{RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS};
use pokedex::reducer::reducer;
use pokedex::state::{AppState, View};
use pokedex::store::{self, JsonFileStore};
use pokedex::{cache, rate, tasks};

const STORE_FILE: &str = "store.json";
const LOG_FILE: &str = "pokedex.log";

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Handheld-style Pokedex for PokeAPI")]
struct Args {
    /// PokeAPI base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Seconds a cached response stays fresh
    #[arg(long, default_value_t = cache::DEFAULT_TTL.as_secs())]
    cache_ttl_secs: u64,

    /// Attempts per request, including the first
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Delay before the first retry; doubled after each failure
    #[arg(long, default_value_t = DEFAULT_INITIAL_DELAY.as_millis() as u64)]
    retry_delay_ms: u64,

    /// Sliding window used for the request budget
    #[arg(long, default_value_t = rate::DEFAULT_WINDOW.as_secs())]
    rate_window_secs: u64,

    /// Requests allowed per window
    #[arg(long, default_value_t = rate::DEFAULT_MAX_REQUESTS)]
    rate_max_requests: usize,

    /// Directory for favorites (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log file (defaults to pokedex.log in the data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_delay: Duration::from_millis(self.retry_delay_ms),
            },
            rate_window: Duration::from_secs(self.rate_window_secs),
            rate_max_requests: self.rate_max_requests,
            ..ClientConfig::default()
        }
        .with_base_url(self.base_url.clone())
    }
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokeComponentId {
    Header,
    DexList,
    Detail,
    Favorites,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum PokeContext {
    Browse,
    Favorites,
    Search,
}

impl EventRoutingState<PokeComponentId, PokeContext> for AppState {
    fn focused(&self) -> Option<PokeComponentId> {
        if self.search.active {
            return Some(PokeComponentId::Search);
        }
        match self.view {
            View::Favorites => Some(PokeComponentId::Favorites),
            View::List | View::Detail => Some(PokeComponentId::DexList),
        }
    }

    fn modal(&self) -> Option<PokeComponentId> {
        if self.search.active {
            Some(PokeComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokeComponentId) -> PokeContext {
        match id {
            PokeComponentId::Favorites => PokeContext::Favorites,
            PokeComponentId::Search => PokeContext::Search,
            PokeComponentId::Header | PokeComponentId::DexList | PokeComponentId::Detail => {
                PokeContext::Browse
            }
        }
    }

    fn default_context(&self) -> PokeContext {
        PokeContext::Browse
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| dirs_next::data_local_dir().map(|dir| dir.join("pokedex")))
        .unwrap_or_else(|| PathBuf::from(".pokedex"));
    std::fs::create_dir_all(&data_dir)?;
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join(LOG_FILE));
    init_logging(&log_path)?;

    let config = args.client_config();
    tracing::info!(base_url = config.base_url.as_str(), data_dir = %data_dir.display(), "starting");
    let client = PokeClient::new(config);
    let favorites_store = JsonFileStore::open(data_dir.join(STORE_FILE));
    let favorites = store::load_favorites(&favorites_store);

    let debug = DebugSession::new(args.debug);
    let state = debug
        .load_state_or_else_async(|| {
            let favorites = favorites.clone();
            async move { Ok::<AppState, io::Error>(AppState::new(favorites)) }
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        replay_actions,
        client,
        Arc::new(Mutex::new(favorites_store)),
    )
    .await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokedex=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    client: PokeClient,
    favorites_store: Arc<Mutex<JsonFileStore>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ui::PokeUi::new()));
    let mut bus: EventBus<AppState, Action, PokeComponentId, PokeContext> = EventBus::new();
    let keybindings: Keybindings<PokeContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(PokeComponentId::DexList, move |event, state| {
        ui_list
            .borrow_mut()
            .handle_list_event(&event.kind, state)
    });

    let ui_favorites = Rc::clone(&ui);
    bus.register(PokeComponentId::Favorites, move |event, state| {
        ui_favorites
            .borrow_mut()
            .handle_favorites_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(PokeComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    // Console buttons: arrows move, a/b act and go back, s is start.
    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search.active => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/') => HandlerResponse::action(Action::SearchStart),
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                HandlerResponse::action(Action::CategoryCycle(-1))
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                HandlerResponse::action(Action::CategoryCycle(1))
            }
            crossterm::event::KeyCode::Char('b') | crossterm::event::KeyCode::Esc => {
                HandlerResponse::action(Action::Back)
            }
            crossterm::event::KeyCode::Char('s') | crossterm::event::KeyCode::Char(' ') => {
                HandlerResponse::action(Action::FavoritesToggleView)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);

                let rate_client = client.clone();
                runtime
                    .subscriptions()
                    .interval("rate", Duration::from_secs(1), move || {
                        Action::RateDidUpdate(rate_client.rate_budget())
                    });
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            {
                let client = client.clone();
                move |effect, ctx| handle_effect(effect, ctx, &client, &favorites_store)
            },
        )
        .await
}

fn handle_effect(
    effect: Effect,
    ctx: &mut EffectContext<Action>,
    client: &PokeClient,
    favorites_store: &Mutex<JsonFileStore>,
) {
    match effect {
        Effect::LoadList {
            category,
            generation,
        } => {
            let key = format!("list_{generation}");
            let client = client.clone();
            ctx.tasks().spawn(
                TaskKey::new(key),
                tasks::load_list(client, category, generation),
            );
        }
        Effect::LoadDetail {
            category,
            id,
            generation,
        } => {
            let key = format!("detail_{generation}");
            let client = client.clone();
            ctx.tasks().spawn(
                TaskKey::new(key),
                tasks::load_detail(client, category, id, generation),
            );
        }
        Effect::PrefetchNext {
            category,
            list,
            current_id,
        } => {
            let _ = client.prefetch_next(&category, &list, &current_id);
        }
        Effect::SaveFavorites {
            favorites,
            previous,
        } => {
            let mut store = favorites_store
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(rollback) = tasks::persist_favorites(&mut *store, favorites, previous) {
                tracing::warn!(path = %store.path().display(), "favorites rolled back");
                ctx.emit(rollback);
            }
        }
    }
}
