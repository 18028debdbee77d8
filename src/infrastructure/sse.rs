// Server-sent event streaming of session views
use crate::application::telemetry_session::SessionView;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures::stream::Stream;
use tokio::sync::watch;

/// Streams every published view as a `session` event, starting with the
/// current one. Ends when the session stops.
pub fn view_events(
    mut views: watch::Receiver<Option<SessionView>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = async_stream::stream! {
        loop {
            let current = views.borrow_and_update().clone();
            if let Some(view) = current {
                yield Event::default().event("session").json_data(view.at(Utc::now()));
            }
            if views.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
