use shared::progression::LevelCurve;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ExpBarProps {
    pub level: i64,
    pub exp: i64,
}

/// Progress through the stored level on the default curve.
#[function_component(ExpBar)]
pub fn exp_bar(props: &ExpBarProps) -> Html {
    let curve = LevelCurve::default();
    let progress = curve.progress_at_level(props.level, props.exp as f64);
    let earned = curve.progress(props.exp as f64).level;
    let width = format!("width: {:.1}%;", progress.percent);

    html! {
        <div class="exp">
            <div class="exp-label">
                {format!("EXP {} · {} needed for level {}", props.exp, progress.exp_for_next.round(), progress.level + 1)}
            </div>
            <div class="exp-track">
                <div class="exp-fill" style={width}></div>
            </div>
            <div class="exp-percent">{format!("{:.1}% of level {}", progress.percent, progress.level)}</div>
            if earned != progress.level {
                <div class="exp-hint">{format!("EXP total is worth level {}", earned)}</div>
            }
        </div>
    }
}
