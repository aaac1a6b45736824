//! Effect runtime: executes [`Task`]s against a [`Backend`] and feeds the
//! results back into [`App::update`], one message at a time.

use futures::StreamExt;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::FuturesUnordered;

use super::app::{App, Task};
use crate::backend::Backend;
use crate::session::messages::{BackendMsg, Msg, OcrMsg};

pub struct Runtime<B: Backend> {
    backend: B,
    pending: FuturesUnordered<LocalBoxFuture<'static, Msg>>,
}

impl<B: Backend> Runtime<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pending: FuturesUnordered::new(),
        }
    }

    /// Number of effects still in flight
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Handle `msg` and start its effects without waiting for them
    pub fn send(&mut self, app: &mut App, msg: Msg) {
        let task = app.update(msg);
        self.spawn(task);
    }

    /// Drive in-flight effects until none is left
    pub async fn settle(&mut self, app: &mut App) {
        while let Some(msg) = self.pending.next().await {
            self.send(app, msg);
        }
    }

    pub async fn dispatch(&mut self, app: &mut App, msg: Msg) {
        self.send(app, msg);
        self.settle(app).await;
    }

    fn spawn(&mut self, task: Task) {
        let backend = self.backend.clone();
        let effect = match task {
            Task::None => return,
            Task::Batch(tasks) => {
                for task in tasks {
                    self.spawn(task);
                }
                return;
            }
            Task::FetchDataPoints { view } => async move {
                let result = backend.data_points().await.map_err(|err| format!("{err:#}"));
                Msg::Ocr(OcrMsg::Loaded { view, result })
            }
            .boxed_local(),
            Task::FetchTables { image } => async move {
                let result = backend.tables(&image).await.map_err(|err| format!("{err:#}"));
                Msg::Backend(BackendMsg::TablesLoaded { image, result })
            }
            .boxed_local(),
            Task::StoreTables { image, tables } => async move {
                let result = backend
                    .store_tables(&image, &tables)
                    .await
                    .map_err(|err| format!("{err:#}"));
                Msg::Backend(BackendMsg::TablesStored { image, result })
            }
            .boxed_local(),
            Task::FetchImages => async move {
                let result = backend.images().await.map_err(|err| format!("{err:#}"));
                Msg::Backend(BackendMsg::ImagesListed(result))
            }
            .boxed_local(),
        };
        self.pending.push(effect);
    }
}
