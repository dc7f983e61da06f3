use crate::api::{self, Listing};
use crate::components::markdown::SheetText;
use crate::store::{Action, SheetModal, StoreContext};
use shared::models::Player;
use uuid::Uuid;
use yew::prelude::*;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Refetches the listing unless the server says it is unchanged.
pub fn refresh_players(store: StoreContext) {
    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_players(store.etag.as_deref()).await {
            Ok(Listing::Players { players, etag }) => {
                store.dispatch(Action::SetPlayers { players, etag })
            }
            Ok(Listing::NotModified) => {}
            Err(e) => tracing::error!("Failed to load players: {:?}", e),
        }
    });
}

#[function_component(PlayerList)]
pub fn player_list() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");

    {
        let store = store.clone();
        use_effect_with((), move |_| {
            refresh_players(store);
            || {}
        });
    }

    let open_create = {
        let store = store.clone();
        Callback::from(move |_: MouseEvent| store.dispatch(Action::OpenModal(SheetModal::Create)))
    };

    let on_edit = {
        let store = store.clone();
        Callback::from(move |id: Uuid| store.dispatch(Action::OpenModal(SheetModal::Edit(id))))
    };

    let on_delete = {
        let store = store.clone();
        Callback::from(move |id: Uuid| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Delete this character?").ok())
                == Some(true);
            if !confirmed {
                return;
            }
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api::delete_player(id).await {
                    Ok(_) => {
                        store.dispatch(Action::PlayerDeleted(id));
                        refresh_players(store);
                    }
                    Err(e) => {
                        tracing::error!("Failed to delete player: {:?}", e);
                        store.dispatch(Action::SetError(Some(e.to_string())));
                    }
                }
            });
        })
    };

    html! {
        <section class="player-list">
            <div class="list-toolbar">
                <h2 class="section-label">{"Characters"}</h2>
                <button class="btn btn-primary" onclick={open_create}>{"New character"}</button>
            </div>
            if let (Some(error), None) = (&store.error, &store.modal) {
                <div class="form-error">{error}</div>
            }
            if store.players.is_empty() {
                <div class="empty-state">{"No characters yet."}</div>
            }
            <div class="card-grid">
                { for store.players.iter().map(|player| html! {
                    <MasterCard
                        key={player.id.to_string()}
                        player={player.clone()}
                        on_edit={on_edit.clone()}
                        on_delete={on_delete.clone()}
                    />
                })}
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct MasterCardProps {
    player: Player,
    on_edit: Callback<Uuid>,
    on_delete: Callback<Uuid>,
}

#[function_component(MasterCard)]
fn master_card(props: &MasterCardProps) -> Html {
    let player = &props.player;
    let id = player.id;
    let on_edit = props.on_edit.clone();
    let on_delete = props.on_delete.clone();
    let portrait = player
        .portrait_image
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    html! {
        <div class="card">
            <img class="card-portrait" src={portrait} alt={player.name.clone()} />
            <h3 class="card-name">{&player.name}</h3>
            <p class="card-level">{format!("Level {} · {}", player.level, player.campaign)}</p>
            <div class="card-stats">
                <p>{format!("❤️ {} life", player.life)}</p>
                <p>{format!("⭐ {} EXP", player.exp)}</p>
            </div>
            if !player.skills.is_empty() {
                <ul class="card-skills">
                    { for player.skills.iter().map(|s| html! { <li>{s}</li> }) }
                </ul>
            }
            <SheetText content={player.milestones.clone()} class={classes!("card-milestones")} />
            <div class="item-grid">
                { for player.item_images.iter().zip(&player.item_descriptions).map(|(src, desc)| html! {
                    <img class="item-thumb" src={src.clone()} title={desc.clone()} alt={desc.clone()} />
                })}
            </div>
            <div class="card-actions">
                <button class="btn btn-primary" onclick={move |_| on_edit.emit(id)}>{"Edit"}</button>
                <button class="btn btn-danger" onclick={move |_| on_delete.emit(id)}>{"Delete"}</button>
            </div>
        </div>
    }
}
