use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};
use yew::prelude::*;

/// Milestones and attributes are free text with light markdown.
#[derive(Properties, PartialEq)]
pub struct SheetTextProps {
    pub content: String,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(SheetText)]
pub fn sheet_text(props: &SheetTextProps) -> Html {
    if props.content.trim().is_empty() {
        return html! { <div class={classes!("sheet-text", "empty", props.class.clone())}>{"-"}</div> };
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events = Parser::new_ext(&props.content, options);
    html! {
        <div class={classes!("sheet-text", props.class.clone())}>
            { render_until_end(&mut events) }
        </div>
    }
}

fn render_until_end<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> Html {
    let mut nodes = Vec::new();

    while let Some(event) = events.next() {
        let node = match event {
            Event::Start(tag) => {
                let inner = render_until_end(events);
                wrap(tag, inner)
            }
            Event::End(_) => break,
            Event::Text(text) | Event::Code(text) => html! { {text.to_string()} },
            Event::SoftBreak | Event::HardBreak => html! { <br/> },
            Event::Rule => html! { <hr/> },
            Event::TaskListMarker(done) => {
                html! { <span class="task-mark">{ if done { "☑ " } else { "☐ " } }</span> }
            }
            // Raw HTML is shown as text, never injected.
            Event::Html(raw) | Event::InlineHtml(raw) => html! { {raw.to_string()} },
            _ => continue,
        };
        nodes.push(node);
    }

    html! { { for nodes } }
}

fn wrap(tag: Tag<'_>, inner: Html) -> Html {
    match tag {
        Tag::Paragraph => html! { <p>{inner}</p> },
        // Headings sit under the card title and are demoted.
        Tag::Heading {
            level: HeadingLevel::H1 | HeadingLevel::H2,
            ..
        } => html! { <h4>{inner}</h4> },
        Tag::Heading { .. } => html! { <h5>{inner}</h5> },
        Tag::List(Some(start)) => html! { <ol start={start.to_string()}>{inner}</ol> },
        Tag::List(None) => html! { <ul>{inner}</ul> },
        Tag::Item => html! { <li>{inner}</li> },
        Tag::Emphasis => html! { <em>{inner}</em> },
        Tag::Strong => html! { <strong>{inner}</strong> },
        Tag::Strikethrough => html! { <del>{inner}</del> },
        Tag::BlockQuote(_) => html! { <blockquote>{inner}</blockquote> },
        Tag::Link { dest_url, .. } => {
            html! { <a href={dest_url.to_string()} target="_blank" rel="noopener noreferrer">{inner}</a> }
        }
        _ => inner,
    }
}
