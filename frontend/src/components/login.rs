use crate::store::{Action, MASTER_PASSWORD, StoreContext};
use yew::prelude::*;

#[function_component(LoginGate)]
pub fn login_gate() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");
    let password = use_state(String::new);

    let on_submit = {
        let store = store.clone();
        let password = password.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *password == MASTER_PASSWORD {
                store.dispatch(Action::Login);
            } else {
                store.dispatch(Action::SetError(Some("Wrong password".to_string())));
                password.set(String::new());
            }
        })
    };

    let on_input = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            let i: web_sys::HtmlInputElement = e.target_unchecked_into();
            password.set(i.value());
        })
    };

    html! {
        <div class="login-screen">
            <form class="login-card" onsubmit={on_submit}>
                <h1 class="app-title">{"Tavern"}</h1>
                <label class="form-label">{"Master password"}</label>
                <input class="form-input" type="password" value={(*password).clone()} oninput={on_input} />
                if let Some(error) = &store.error {
                    <div class="form-error">{error}</div>
                }
                <button class="btn btn-primary" type="submit">{"Enter"}</button>
            </form>
        </div>
    }
}
