//! Server-Sent Events stream of light changes.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use khrushchevka_app::ports::{LightsController, Snapshotter};

use crate::state::AppState;

/// `GET /api/lights/stream` — one `data:` frame per light write.
///
/// Each frame is a JSON-encoded `PinState`. A client that falls behind
/// skips the changes it missed; the stream ends when the client disconnects.
pub async fn stream<L, S>(
    State(state): State<AppState<L, S>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    let changes = BroadcastStream::new(state.lights.subscribe()).filter_map(|result| match result {
        Ok(change) => match serde_json::to_string(&change) {
            Ok(json) => Some(Ok(Event::default().event("light").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize light change for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, light changes dropped");
            None
        }
    });

    Sse::new(changes).keep_alive(KeepAlive::default())
}
