use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventContext, EventKind, HandlerResponse, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use pokedex::action::Action;
use pokedex::category::{self, CATEGORIES};
use pokedex::sprites;
use pokedex::state::{AppState, DetailRecord, PokemonStat, View};

use crate::PokeComponentId;

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(220, 88, 88);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct PokeUi {
    dex_list: SelectList,
    favorites_list: SelectList,
    status_bar: StatusBar,
}

impl PokeUi {
    pub fn new() -> Self {
        Self {
            dex_list: SelectList::new(),
            favorites_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokeComponentId>,
    ) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state, event_ctx);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
            .split(layout[1]);
        render_list(frame, body[0], state, event_ctx, &mut self.dex_list);
        match state.view {
            View::Favorites => {
                render_favorites(frame, body[1], state, event_ctx, &mut self.favorites_list)
            }
            View::List | View::Detail => render_detail(frame, body[1], state, event_ctx),
        }

        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.dex_list)
    }

    pub fn handle_favorites_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_favorites_event(event, state, &mut self.favorites_list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    dex_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Char('k') => {
                vec![Action::SelectionMove(-1)]
            }
            crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j') => {
                vec![Action::SelectionMove(1)]
            }
            crossterm::event::KeyCode::Char('a') if state.selected.is_some() => {
                vec![Action::FavoriteToggleSelected]
            }
            crossterm::event::KeyCode::Char('x') => vec![Action::SelectRandom],
            _ => {
                let items = dex_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_visible_index().unwrap_or(0),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::ListSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = dex_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_favorites_event(
    event: &EventKind,
    state: &AppState,
    favorites_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter | crossterm::event::KeyCode::Char('a') => {
                vec![Action::FavoriteOpen(state.favorite_index)]
            }
            crossterm::event::KeyCode::Char('d') | crossterm::event::KeyCode::Delete => state
                .favorites
                .get(state.favorite_index)
                .map(|favorite| Action::FavoriteRemove {
                    id: favorite.id.clone(),
                    category: favorite.category.clone(),
                })
                .into_iter()
                .collect(),
            _ => {
                let items = favorite_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.favorite_index,
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: true,
                    },
                    on_select: Action::FavoriteSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = favorites_list
                    .handle_event(event, props)
                    .into_iter()
                    .collect();
                return handler_response(actions);
            }
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<PokeComponentId>,
) {
    event_ctx.set_component_area(PokeComponentId::Header, area);
    if state.search.active {
        event_ctx.set_component_area(PokeComponentId::Search, area);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKEDEX");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let tabs = Tabs::new(CATEGORIES.iter().map(|c| c.label).collect::<Vec<_>>())
        .select(state.category_index)
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, rows[0]);

    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let rate_color = if state.rate.percentage() < 20.0 {
        ACCENT_RED
    } else {
        ACCENT_GOLD
    };
    let line = Line::from(vec![
        Span::raw("Search: "),
        Span::styled(search, Style::default().fg(ACCENT_TEAL)),
        Span::raw("  |  Favorites: "),
        Span::styled(
            state.favorites.len().to_string(),
            Style::default().fg(ACCENT_GOLD),
        ),
        Span::raw("  |  API: "),
        Span::styled(
            format!(
                "{}/{} ({:.0}%)",
                state.rate.remaining,
                state.rate.max_requests,
                state.rate.percentage()
            ),
            Style::default().fg(rate_color),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), rows[1]);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<PokeComponentId>,
    dex_list: &mut SelectList,
) {
    event_ctx.set_component_area(PokeComponentId::DexList, area);
    let visible = state.visible_list().len();
    let title = if state.search.query.is_empty() {
        format!("{} ({})", state.category_label(), state.list.len())
    } else {
        format!("{} ({}/{})", state.category_label(), visible, state.list.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(state.view != View::Favorites));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.list_loading {
        frame.render_widget(
            Paragraph::new(format!("{} Loading...", spinner(state)))
                .style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let items = dex_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_visible_index().unwrap_or(0),
        is_focused: state.view != View::Favorites,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::ListSelect,
        render_item: &|item| item.clone(),
    };
    dex_list.render(frame, inner, props);
}

fn render_favorites(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<PokeComponentId>,
    favorites_list: &mut SelectList,
) {
    event_ctx.set_component_area(PokeComponentId::Favorites, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("FAVORITES")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.favorites.is_empty() {
        frame.render_widget(
            Paragraph::new("No favorites yet. Press a on an entry to add it.")
                .style(Style::default().fg(TEXT_DIM))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let items = favorite_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.favorite_index,
        is_focused: true,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: true,
        },
        on_select: Action::FavoriteSelect,
        render_item: &|item| item.clone(),
    };
    favorites_list.render(frame, inner, props);
}

fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<PokeComponentId>,
) {
    event_ctx.set_component_area(PokeComponentId::Detail, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DATA")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(detail) = state.detail.as_ref() else {
        let message = match state.selected.as_ref() {
            Some(entry) if state.detail_loading => {
                format!("{} Loading {}...", spinner(state), format_name(&entry.name))
            }
            Some(_) => "No data.".to_string(),
            None => "Select an entry.".to_string(),
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    };

    if detail.category != category::POKEMON {
        frame.render_widget(
            Paragraph::new(generic_detail_text(detail))
                .style(Style::default().fg(TEXT_MAIN))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(inner);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[0]);

    frame.render_widget(
        Paragraph::new(pokemon_summary_text(state, detail))
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        top[0],
    );
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .title("STATS")
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(
        Paragraph::new(stats_text(&detail.stats()))
            .block(stats_block)
            .wrap(Wrap { trim: true }),
        top[1],
    );
    frame.render_widget(
        Paragraph::new(species_text(detail))
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        layout[1],
    );
}

fn pokemon_summary_text(state: &AppState, detail: &DetailRecord) -> Text<'static> {
    let name = detail.name().map(format_name).unwrap_or_default();
    let id = detail
        .numeric_id()
        .map(|id| id.to_string())
        .or_else(|| state.selected.as_ref().map(|entry| entry.id.clone()))
        .unwrap_or_default();
    let star = if state.selected_is_favorite() { " *" } else { "" };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}  #{:0>3}{star}", name.to_ascii_uppercase(), id),
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Type: {}", detail.types().join(" / "))),
        Line::from(format!("Abilities: {}", detail.abilities().join(", "))),
        Line::from(format!(
            "Height: {}  Weight: {}",
            detail.pointer_u64("/height").unwrap_or(0),
            detail.pointer_u64("/weight").unwrap_or(0)
        )),
    ];
    if let Some(genus) = detail.genus().filter(|genus| !genus.is_empty()) {
        lines.push(Line::from(format!("Genus: {genus}")));
    }
    if !id.is_empty() {
        lines.push(Line::from(Span::styled(
            sprites::artwork_url(&id),
            Style::default().fg(TEXT_DIM),
        )));
    }
    Text::from(lines)
}

fn species_text(detail: &DetailRecord) -> Text<'static> {
    if !detail.is_enriched() {
        return Text::from(Line::from(Span::styled(
            "Species data unavailable.",
            Style::default().fg(TEXT_DIM),
        )));
    }
    let mut lines = Vec::new();
    if let Some(flavor) = detail.flavor_text().filter(|text| !text.is_empty()) {
        lines.push(Line::from(flavor.to_string()));
        lines.push(Line::from(" "));
    }
    if let Some(chain) = detail.evolution_chain() {
        let current = detail.name().unwrap_or_default();
        let mut spans = vec![Span::raw("Evolution: ")];
        for (idx, stage) in chain.stages.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw(" > "));
            }
            let style = if stage == current {
                Style::default()
                    .fg(ACCENT_GOLD)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_MAIN)
            };
            spans.push(Span::styled(format_name(stage), style));
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

fn generic_detail_text(detail: &DetailRecord) -> Text<'static> {
    let name = detail.name().map(format_name).unwrap_or_default();
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{}  #{}",
            name.to_ascii_uppercase(),
            detail.numeric_id().unwrap_or(0)
        ),
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
    ))];
    let fields = [
        ("Generation", "/generation/name"),
        ("Damage class", "/move_damage_class/name"),
        ("Version group", "/version_group/name"),
        ("Color", "/color/name"),
        ("Habitat", "/habitat/name"),
    ];
    for (label, pointer) in fields {
        if let Some(value) = detail.pointer_string(pointer) {
            lines.push(Line::from(format!("{label}: {}", format_name(&value))));
        }
    }
    if let Some(count) = detail
        .payload
        .get("pokemon")
        .and_then(|value| value.as_array())
        .map(|members| members.len())
    {
        lines.push(Line::from(format!("Pokemon: {count}")));
    }
    Text::from(lines)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let (status, status_color) = match state.error.as_ref() {
        Some(error) => (error.clone(), ACCENT_RED),
        None if state.list_loading => ("Loading list...".to_string(), ACCENT_GOLD),
        None if state.detail_loading => ("Loading detail...".to_string(), ACCENT_GOLD),
        None => (String::new(), ACCENT_GOLD),
    };
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(status_color));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }

    let left = match state.view {
        View::Favorites => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("a", "Open"),
            StatusBarHint::new("d", "Remove"),
        ],
        View::List | View::Detail => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("h/l", "Category"),
            StatusBarHint::new("a", "Favorite"),
            StatusBarHint::new("x", "Random"),
        ],
    };
    let center = vec![
        StatusBarHint::new("b", "Back"),
        StatusBarHint::new("s", "Favorites"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn dex_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .visible_list()
        .into_iter()
        .map(|entry| {
            let fav = if state.is_favorite(&entry.id, &state.category) {
                "*"
            } else {
                " "
            };
            Line::from(format!("{fav} #{:0>3} {}", entry.id, format_name(&entry.name)))
        })
        .collect()
}

fn favorite_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .favorites
        .iter()
        .map(|favorite| {
            let label = category::find(&favorite.category)
                .map(|descriptor| descriptor.label)
                .unwrap_or("?");
            Line::from(vec![
                Span::styled(format!("{label:<9}"), Style::default().fg(ACCENT_GOLD)),
                Span::raw(format!("#{:0>3} {}", favorite.id, format_name(&favorite.name))),
            ])
        })
        .collect()
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT_TEAL)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[(state.tick % SPINNER.len() as u64) as usize]
}

fn stats_text(stats: &[PokemonStat]) -> Text<'static> {
    if stats.is_empty() {
        return Text::from("No stats.");
    }
    Text::from(
        stats
            .iter()
            .map(|stat| Line::from(render_stat(stat)))
            .collect::<Vec<_>>(),
    )
}

fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_stat(stat: &PokemonStat) -> String {
    let label = shorten_stat(&stat.name);
    let bar_len = (stat.value as usize / 15).clamp(1, 12);
    let bar = "#".repeat(bar_len);
    format!("{label:>4} {value:>3} {bar}", value = stat.value)
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => " HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SAT".to_string(),
        "special-defense" => "SDF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}
