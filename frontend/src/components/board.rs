use crate::api::{self, Listing, STREAM_URL, UPDATED_KEY};
use crate::components::exp_bar::ExpBar;
use crate::components::markdown::SheetText;
use crate::components::player_list::PLACEHOLDER_IMAGE;
use futures::StreamExt;
use gloo_events::EventListener;
use gloo_net::eventsource::futures::EventSource;
use shared::models::{EVENT_PLAYERS_UPDATED, Player};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, StorageEvent};
use yew::prelude::*;

/// Safety net for browsers where the event stream drops silently.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone, Default, PartialEq)]
struct Filter {
    name: String,
    level: String,
}

impl Filter {
    fn matches(&self, player: &Player) -> bool {
        let name = self.name.trim().to_lowercase();
        let level = self.level.trim();
        (name.is_empty() || player.name.to_lowercase().contains(&name))
            && (level.is_empty() || player.level.to_string() == level)
    }
}

/// Read-only view for the table. Refreshes on server-sent events, on
/// storage events from a master tab, and on a slow poll.
#[function_component(PlayerBoard)]
pub fn player_board() -> Html {
    let players = use_state(Vec::<Player>::new);
    let etag = use_mut_ref(|| None::<String>);
    let filter = use_state(Filter::default);

    let refresh = {
        let players = players.clone();
        let etag = etag.clone();
        Callback::from(move |_: ()| {
            let players = players.clone();
            let etag = etag.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let current = etag.borrow().clone();
                match api::fetch_players(current.as_deref()).await {
                    Ok(Listing::Players {
                        players: fresh,
                        etag: tag,
                    }) => {
                        *etag.borrow_mut() = tag;
                        players.set(fresh);
                    }
                    Ok(Listing::NotModified) => {}
                    Err(e) => tracing::warn!("Board refresh failed: {:?}", e),
                }
            });
        })
    };

    {
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            refresh.emit(());
            let alive = Rc::new(Cell::new(true));

            {
                let alive = alive.clone();
                let refresh = refresh.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    while alive.get() {
                        yew::platform::time::sleep(POLL_INTERVAL).await;
                        if alive.get() {
                            refresh.emit(());
                        }
                    }
                });
            }

            let source = Rc::new(RefCell::new(EventSource::new(STREAM_URL).ok()));
            let subscription = source
                .borrow_mut()
                .as_mut()
                .and_then(|s| s.subscribe(EVENT_PLAYERS_UPDATED).ok());
            if let Some(mut subscription) = subscription {
                let alive = alive.clone();
                let refresh = refresh.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    while let Some(message) = subscription.next().await {
                        if !alive.get() {
                            break;
                        }
                        match message {
                            Ok(_) => refresh.emit(()),
                            Err(e) => tracing::debug!("Player stream error: {:?}", e),
                        }
                    }
                });
            } else {
                tracing::warn!("Player stream unavailable, relying on polling");
            }

            let storage_listener = web_sys::window().map(|window| {
                let refresh = refresh.clone();
                EventListener::new(&window, "storage", move |event| {
                    let key = event
                        .dyn_ref::<StorageEvent>()
                        .and_then(|e| e.key());
                    if key.as_deref() == Some(UPDATED_KEY) {
                        refresh.emit(());
                    }
                })
            });

            move || {
                alive.set(false);
                drop(storage_listener);
                source.borrow_mut().take();
            }
        });
    }

    let on_name = {
        let filter = filter.clone();
        Callback::from(move |e: InputEvent| {
            let i: HtmlInputElement = e.target_unchecked_into();
            filter.set(Filter {
                name: i.value(),
                ..(*filter).clone()
            });
        })
    };

    let on_level = {
        let filter = filter.clone();
        Callback::from(move |e: InputEvent| {
            let i: HtmlInputElement = e.target_unchecked_into();
            filter.set(Filter {
                level: i.value(),
                ..(*filter).clone()
            });
        })
    };

    let on_clear = {
        let filter = filter.clone();
        Callback::from(move |_: MouseEvent| filter.set(Filter::default()))
    };

    let visible: Vec<&Player> = players.iter().filter(|p| filter.matches(p)).collect();

    html! {
        <div class="board">
            <header class="board-header">
                <h1 class="app-title">{"Tavern"}</h1>
                <div class="board-search">
                    <input class="form-input" type="text" placeholder="Search by name" value={filter.name.clone()} oninput={on_name} />
                    <input class="form-input" type="number" min="1" placeholder="Level" value={filter.level.clone()} oninput={on_level} />
                    <button class="btn btn-secondary" onclick={on_clear}>{"Clear"}</button>
                </div>
            </header>
            if visible.is_empty() {
                <div class="empty-state">{"No adventurers here yet."}</div>
            }
            <div class="card-grid">
                { for visible.into_iter().map(|player| html! {
                    <BoardCard key={player.id.to_string()} player={player.clone()} />
                })}
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct BoardCardProps {
    player: Player,
}

#[function_component(BoardCard)]
fn board_card(props: &BoardCardProps) -> Html {
    let player = &props.player;
    let portrait = player
        .portrait_image
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    html! {
        <div class="card board-card">
            <h2 class="card-name">{format!("{} (Level {})", player.name, player.level.max(1))}</h2>
            <img class="card-portrait" src={portrait} alt={player.name.clone()} />
            <p>{format!("❤️ Life: {}", player.life)}</p>
            if !player.skills.is_empty() {
                <ul class="card-skills">
                    { for player.skills.iter().map(|s| html! { <li>{s.clone()}</li> }) }
                </ul>
            }
            <h4>{"Milestones"}</h4>
            <SheetText content={player.milestones.clone()} />
            <h4>{"Attributes"}</h4>
            <SheetText content={player.attributes.clone()} />
            <ExpBar level={player.level} exp={player.exp} />
            <div class="item-grid">
                { for player.item_images.iter().zip(&player.item_descriptions).map(|(src, desc)| html! {
                    <figure class="item">
                        <img class="item-thumb" src={src.clone()} title={desc.clone()} alt={desc.clone()} />
                        if !desc.is_empty() {
                            <figcaption>{desc.clone()}</figcaption>
                        }
                    </figure>
                })}
            </div>
        </div>
    }
}
