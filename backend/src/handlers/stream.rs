use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use shared::models::{EVENT_CONNECTED, EVENT_PLAYERS_UPDATED};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Server-sent events telling boards to refetch the player listing.
pub async fn player_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.notifier.subscribe();
    tracing::info!(
        "Board connected to player stream ({} listening)",
        state.notifier.subscriber_count()
    );

    let stream = async_stream::stream! {
        yield Ok(Event::default().event(EVENT_CONNECTED).data("ok"));

        loop {
            match receiver.recv().await {
                Ok(change) => {
                    tracing::debug!("Streaming {:?} of player {}", change.kind, change.player_id);
                    yield Ok(Event::default().event(EVENT_PLAYERS_UPDATED).data("update"));
                }
                // Missed events collapse into one refresh.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Player stream lagged by {} events", skipped);
                    yield Ok(Event::default().event(EVENT_PLAYERS_UPDATED).data("update"));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
