use crate::api;
use crate::components::player_list::{PLACEHOLDER_IMAGE, refresh_players};
use crate::store::{Action, SheetModal, StoreContext};
use shared::limits::{MAX_IMAGE_BYTES, MAX_ITEM_IMAGES, MAX_SKILLS, is_allowed_image_type};
use shared::models::{Player, clean_skills};
use web_sys::{File, FormData, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

/// One of the six item boxes in the editor.
#[derive(Clone, Default)]
struct ItemSlot {
    /// Reference already stored on the sheet
    existing: Option<String>,
    /// Replacement or new upload
    file: Option<File>,
    preview: Option<String>,
    description: String,
    removed: bool,
}

impl ItemSlot {
    fn kept(&self) -> Option<&str> {
        match (&self.existing, &self.file, self.removed) {
            (Some(existing), None, false) => Some(existing),
            _ => None,
        }
    }
}

fn initial_slots(player: Option<&Player>) -> Vec<ItemSlot> {
    let mut slots = vec![ItemSlot::default(); MAX_ITEM_IMAGES];
    if let Some(player) = player {
        for (slot, (image, description)) in slots
            .iter_mut()
            .zip(player.item_images.iter().zip(&player.item_descriptions))
        {
            slot.existing = Some(image.clone());
            slot.description = description.clone();
        }
    }
    slots
}

fn check_image(file: &File) -> Result<(), String> {
    if !is_allowed_image_type(&file.type_()) {
        return Err("Only PNG, JPG, JPEG or WEBP images are allowed".to_string());
    }
    if file.size() > MAX_IMAGE_BYTES as f64 {
        return Err(format!("{} is larger than 2 MB", file.name()));
    }
    Ok(())
}

/// Takes the chosen file from an `<input type=file>`, rejecting bad images.
fn picked_file(e: &Event) -> Result<Option<File>, String> {
    let input: HtmlInputElement = e.target_unchecked_into();
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    if let Err(message) = check_image(&file) {
        input.set_value("");
        return Err(message);
    }
    Ok(Some(file))
}

fn object_url(file: &File) -> Option<String> {
    web_sys::Url::create_object_url_with_blob(file).ok()
}

struct Draft {
    name: String,
    campaign: String,
    life: String,
    exp: String,
    level: String,
    milestones: String,
    attributes: String,
    skills: Vec<String>,
    portrait: Option<File>,
    slots: Vec<ItemSlot>,
    editing: bool,
}

impl Draft {
    /// Multipart body for create or update. Descriptions follow the order
    /// the server stores items in: kept references first, then uploads.
    fn to_form_data(&self) -> Result<FormData, String> {
        let js = |e: wasm_bindgen::JsValue| format!("Failed to build form: {:?}", e);
        let form = FormData::new().map_err(js)?;

        for (key, value) in [
            ("name", &self.name),
            ("campaign", &self.campaign),
            ("life", &self.life),
            ("exp", &self.exp),
            ("level", &self.level),
            ("milestones", &self.milestones),
            ("attributes", &self.attributes),
        ] {
            form.append_with_str(key, value).map_err(js)?;
        }

        let skills = serde_json::to_string(&clean_skills(&self.skills)).map_err(|e| e.to_string())?;
        form.append_with_str("skills", &skills).map_err(js)?;

        if let Some(file) = &self.portrait {
            form.append_with_blob_and_filename("charImg", file, &file.name())
                .map_err(js)?;
        }

        let kept: Vec<&ItemSlot> = self.slots.iter().filter(|s| s.kept().is_some()).collect();
        let uploads: Vec<&ItemSlot> = self.slots.iter().filter(|s| s.file.is_some()).collect();

        for slot in &uploads {
            if let Some(file) = &slot.file {
                form.append_with_blob_and_filename("items", file, &file.name())
                    .map_err(js)?;
            }
        }

        let descriptions: Vec<&str> = kept
            .iter()
            .chain(uploads.iter())
            .map(|s| s.description.as_str())
            .collect();
        let descriptions = serde_json::to_string(&descriptions).map_err(|e| e.to_string())?;
        form.append_with_str("itemDescriptions", &descriptions)
            .map_err(js)?;

        if self.editing {
            let keep: Vec<&str> = kept.iter().filter_map(|s| s.kept()).collect();
            let keep = serde_json::to_string(&keep).map_err(|e| e.to_string())?;
            form.append_with_str("keepItems", &keep).map_err(js)?;
        }

        Ok(form)
    }
}

fn text_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let i: HtmlInputElement = e.target_unchecked_into();
        state.set(i.value());
    })
}

fn text_area(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let i: HtmlTextAreaElement = e.target_unchecked_into();
        state.set(i.value());
    })
}

#[function_component(SheetEditor)]
pub fn sheet_editor() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");
    let editing = match &store.modal {
        Some(SheetModal::Edit(id)) => store.player(*id).cloned(),
        _ => None,
    };
    let player = editing.as_ref();

    let name = use_state(|| player.map(|p| p.name.clone()).unwrap_or_default());
    let campaign = use_state(|| player.map(|p| p.campaign.clone()).unwrap_or_default());
    let life = use_state(|| player.map(|p| p.life.to_string()).unwrap_or_default());
    let exp = use_state(|| player.map(|p| p.exp.to_string()).unwrap_or_default());
    let level = use_state(|| player.map(|p| p.level.to_string()).unwrap_or_default());
    let milestones = use_state(|| player.map(|p| p.milestones.clone()).unwrap_or_default());
    let attributes = use_state(|| player.map(|p| p.attributes.clone()).unwrap_or_default());
    let skills = use_state(|| player.map(|p| p.skills.clone()).unwrap_or_default());
    let portrait = use_state(|| None::<File>);
    let portrait_preview = use_state(|| player.and_then(|p| p.portrait_image.clone()));
    let slots = use_state(|| initial_slots(player));

    let on_close = {
        let store = store.clone();
        Callback::from(move |_: MouseEvent| store.dispatch(Action::CloseModal))
    };

    let on_portrait = {
        let store = store.clone();
        let portrait = portrait.clone();
        let portrait_preview = portrait_preview.clone();
        Callback::from(move |e: Event| match picked_file(&e) {
            Ok(Some(file)) => {
                portrait_preview.set(object_url(&file));
                portrait.set(Some(file));
            }
            Ok(None) => portrait.set(None),
            Err(message) => store.dispatch(Action::SetError(Some(message))),
        })
    };

    let on_skill = {
        let skills = skills.clone();
        Callback::from(move |(index, value): (usize, String)| {
            let mut next = (*skills).clone();
            if let Some(skill) = next.get_mut(index) {
                *skill = value;
            }
            skills.set(next);
        })
    };

    let add_skill = {
        let skills = skills.clone();
        Callback::from(move |_: MouseEvent| {
            if skills.len() < MAX_SKILLS {
                let mut next = (*skills).clone();
                next.push(String::new());
                skills.set(next);
            }
        })
    };

    let update_slot = {
        let slots = slots.clone();
        Callback::from(move |(index, edit): (usize, Box<dyn FnOnce(&mut ItemSlot)>)| {
            let mut next = (*slots).clone();
            if let Some(slot) = next.get_mut(index) {
                edit(slot);
            }
            slots.set(next);
        })
    };

    let on_save = {
        let store = store.clone();
        let draft = {
            let name = name.clone();
            let campaign = campaign.clone();
            let life = life.clone();
            let exp = exp.clone();
            let level = level.clone();
            let milestones = milestones.clone();
            let attributes = attributes.clone();
            let skills = skills.clone();
            let portrait = portrait.clone();
            let slots = slots.clone();
            let editing = editing.is_some();
            move || Draft {
                name: (*name).clone(),
                campaign: (*campaign).clone(),
                life: (*life).clone(),
                exp: (*exp).clone(),
                level: (*level).clone(),
                milestones: (*milestones).clone(),
                attributes: (*attributes).clone(),
                skills: (*skills).clone(),
                portrait: (*portrait).clone(),
                slots: (*slots).clone(),
                editing,
            }
        };
        let target = editing.as_ref().map(|p| p.id);

        Callback::from(move |_: MouseEvent| {
            let draft = draft();
            if draft.name.trim().is_empty() {
                store.dispatch(Action::SetError(Some("Name is required".to_string())));
                return;
            }
            let form = match draft.to_form_data() {
                Ok(form) => form,
                Err(message) => {
                    store.dispatch(Action::SetError(Some(message)));
                    return;
                }
            };

            let store = store.clone();
            store.dispatch(Action::SetBusy(true));
            wasm_bindgen_futures::spawn_local(async move {
                let saved = match target {
                    Some(id) => api::update_player(id, form).await,
                    None => api::create_player(form).await,
                };
                store.dispatch(Action::SetBusy(false));
                match saved {
                    Ok(player) => {
                        store.dispatch(Action::PlayerSaved(player));
                        refresh_players(store);
                    }
                    Err(e) => {
                        tracing::error!("Failed to save player: {:?}", e);
                        store.dispatch(Action::SetError(Some(e.to_string())));
                    }
                }
            });
        })
    };

    let title = match &editing {
        Some(p) => format!("Edit {}", p.name),
        None => "New character".to_string(),
    };

    html! {
        <div class="modal-overlay" onclick={on_close.clone()}>
            <div class="modal-content" onclick={|e: MouseEvent| e.stop_propagation()}>
                <div class="modal-header">
                    <h2 class="modal-title">{title}</h2>
                    <button class="close-btn" onclick={on_close.clone()}>{"×"}</button>
                </div>

                <div class="modal-body">
                    <div class="form-group">
                        <label class="form-label">{"Name"}</label>
                        <input class="form-input" type="text" value={(*name).clone()} oninput={text_input(&name)} />
                    </div>
                    <div class="form-group">
                        <label class="form-label">{"Campaign"}</label>
                        <input class="form-input" type="text" placeholder="default" value={(*campaign).clone()} oninput={text_input(&campaign)} />
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"Portrait"}</label>
                        <img class="portrait-preview" src={(*portrait_preview).clone().unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())} />
                        <input class="form-input" type="file" accept="image/png,image/jpeg,image/webp" onchange={on_portrait} />
                    </div>

                    <div class="form-row">
                        <div class="form-group">
                            <label class="form-label">{"Life"}</label>
                            <input class="form-input" type="number" min="0" value={(*life).clone()} oninput={text_input(&life)} />
                        </div>
                        <div class="form-group">
                            <label class="form-label">{"Experience"}</label>
                            <input class="form-input" type="number" min="0" value={(*exp).clone()} oninput={text_input(&exp)} />
                        </div>
                        <div class="form-group">
                            <label class="form-label">{"Level"}</label>
                            <input class="form-input" type="number" min="1" value={(*level).clone()} oninput={text_input(&level)} />
                        </div>
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"Skills"}</label>
                        { for skills.iter().enumerate().map(|(index, skill)| {
                            let on_skill = on_skill.clone();
                            html! {
                                <input class="form-input" type="text" value={skill.clone()} oninput={Callback::from(move |e: InputEvent| {
                                    let i: HtmlInputElement = e.target_unchecked_into();
                                    on_skill.emit((index, i.value()));
                                })} />
                            }
                        })}
                        if skills.len() < MAX_SKILLS {
                            <button class="btn btn-secondary" onclick={add_skill}>{"Add skill"}</button>
                        }
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"Milestones"}</label>
                        <textarea class="form-textarea" rows="3" value={(*milestones).clone()} oninput={text_area(&milestones)} />
                    </div>
                    <div class="form-group">
                        <label class="form-label">{"Attributes"}</label>
                        <textarea class="form-textarea" rows="3" value={(*attributes).clone()} oninput={text_area(&attributes)} />
                    </div>

                    <label class="form-label">{"Items"}</label>
                    <div class="item-slots">
                        { for slots.iter().enumerate().map(|(index, slot)| {
                            let shown = slot.preview.clone().or_else(|| slot.kept().map(str::to_string));
                            let on_file = {
                                let update_slot = update_slot.clone();
                                let store = store.clone();
                                Callback::from(move |e: Event| match picked_file(&e) {
                                    Ok(file) => {
                                        let preview = file.as_ref().and_then(object_url);
                                        update_slot.emit((index, Box::new(move |slot: &mut ItemSlot| {
                                            slot.file = file;
                                            slot.preview = preview;
                                        })));
                                    }
                                    Err(message) => store.dispatch(Action::SetError(Some(message))),
                                })
                            };
                            let on_description = {
                                let update_slot = update_slot.clone();
                                Callback::from(move |e: InputEvent| {
                                    let i: HtmlInputElement = e.target_unchecked_into();
                                    let value = i.value();
                                    update_slot.emit((index, Box::new(move |slot: &mut ItemSlot| slot.description = value)));
                                })
                            };
                            let on_remove = {
                                let update_slot = update_slot.clone();
                                Callback::from(move |_: MouseEvent| {
                                    update_slot.emit((index, Box::new(|slot: &mut ItemSlot| {
                                        slot.removed = !slot.removed;
                                        slot.file = None;
                                        slot.preview = None;
                                    })));
                                })
                            };
                            html! {
                                <div class="item-slot">
                                    <img class="item-thumb" src={shown.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())} />
                                    <input class="form-input" type="file" accept="image/png,image/jpeg,image/webp" onchange={on_file} />
                                    <input class="form-input" type="text" placeholder="Description" value={slot.description.clone()} oninput={on_description} />
                                    if slot.existing.is_some() {
                                        <button class="btn btn-secondary" onclick={on_remove}>
                                            { if slot.removed { "Restore" } else { "Remove" } }
                                        </button>
                                    }
                                </div>
                            }
                        })}
                    </div>

                    if let Some(error) = &store.error {
                        <div class="form-error">{error}</div>
                    }

                    <div class="form-actions">
                        <button class="btn btn-secondary" onclick={on_close}>{"Cancel"}</button>
                        <button class="btn btn-primary" disabled={store.busy} onclick={on_save}>
                            { if store.busy { "Saving..." } else { "Save" } }
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
