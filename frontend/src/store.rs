use gloo_storage::{SessionStorage, Storage};
use shared::models::*;
use std::rc::Rc;
use uuid::Uuid;
use yew::prelude::*;

const SESSION_KEY: &str = "tavern.master";
/// Client-side gate only. The API itself is open.
pub const MASTER_PASSWORD: &str = "dragon";

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub players: Vec<Player>,
    pub etag: Option<String>,
    pub authenticated: bool,
    pub modal: Option<SheetModal>,
    pub busy: bool,
    pub error: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        let authenticated = SessionStorage::get::<bool>(SESSION_KEY).unwrap_or(false);
        Self {
            players: Vec::new(),
            etag: None,
            authenticated,
            modal: None,
            busy: false,
            error: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SheetModal {
    Create,
    Edit(Uuid),
}

pub enum Action {
    SetPlayers {
        players: Vec<Player>,
        etag: Option<String>,
    },
    Login,
    Logout,
    OpenModal(SheetModal),
    CloseModal,
    SetBusy(bool),
    SetError(Option<String>),
    PlayerSaved(Player),
    PlayerDeleted(Uuid),
}

impl State {
    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

impl Reducible for State {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();

        match action {
            Action::SetPlayers { players, etag } => {
                next.players = players;
                next.etag = etag;
            }
            Action::Login => {
                next.authenticated = true;
                next.error = None;
                let _ = SessionStorage::set(SESSION_KEY, true);
            }
            Action::Logout => {
                next.authenticated = false;
                next.modal = None;
                SessionStorage::delete(SESSION_KEY);
            }
            Action::OpenModal(modal) => {
                next.modal = Some(modal);
                next.error = None;
            }
            Action::CloseModal => {
                next.modal = None;
            }
            Action::SetBusy(busy) => {
                next.busy = busy;
            }
            Action::SetError(error) => {
                next.error = error;
            }
            Action::PlayerSaved(player) => {
                // The listing is refetched afterwards; this keeps the UI current until then.
                match next.players.iter_mut().find(|p| p.id == player.id) {
                    Some(existing) => *existing = player,
                    None => next.players.insert(0, player),
                }
                next.etag = None;
                next.modal = None;
            }
            Action::PlayerDeleted(id) => {
                next.players.retain(|p| p.id != id);
                next.etag = None;
            }
        }

        Rc::new(next)
    }
}

pub type StoreContext = UseReducerHandle<State>;
