mod api;
mod components;
mod store;

use components::board::PlayerBoard;
use components::login::LoginGate;
use components::player_list::PlayerList;
use components::sheet_modal::SheetEditor;
use store::{Action, State, StoreContext};
use yew::prelude::*;

const BOARD_PATH: &str = "/board";

#[function_component(MasterApp)]
fn master_app() -> Html {
    let store = use_reducer(State::default);

    let on_logout = {
        let store = store.clone();
        Callback::from(move |_: MouseEvent| store.dispatch(Action::Logout))
    };

    html! {
        <ContextProvider<StoreContext> context={store.clone()}>
            if !store.authenticated {
                <LoginGate />
            } else {
                <div class="app-container">
                    <header class="app-header">
                        <h1 class="app-title">{"Tavern"}</h1>
                        <div class="header-actions">
                            <a class="btn btn-secondary" href={BOARD_PATH} target="_blank">{"Player board"}</a>
                            <button class="btn btn-secondary" onclick={on_logout}>{"Log out"}</button>
                        </div>
                    </header>
                    <PlayerList />
                    if store.modal.is_some() {
                        <SheetEditor />
                    }
                </div>
            }
        </ContextProvider<StoreContext>>
    }
}

#[function_component(App)]
fn app() -> Html {
    let path = web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default();

    if path.trim_end_matches('/') == BOARD_PATH {
        html! { <PlayerBoard /> }
    } else {
        html! { <MasterApp /> }
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
