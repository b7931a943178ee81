// ── Admin list controller ──
//
// Drives one resource family's admin page: load the list, fetch one item,
// create, delete. Nothing is updated optimistically; after any successful
// mutation the list is reloaded from the backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use backoffice_api::{Envelope, Error as ApiError, ListFilter, Resource, ResourceId};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::notice::{Notice, capitalize};
use super::state::{AdminListState, Transition, reduce};
use crate::error::CoreError;
use crate::service::ResourceService;

const NOTICE_CHANNEL_SIZE: usize = 32;

type Draft<S> = <<S as ResourceService>::Item as Resource>::Draft;

/// Controller for one admin list page.
///
/// Cheaply cloneable via `Arc`. State is observable through
/// [`subscribe()`](Self::subscribe); notices are returned from each
/// operation and also broadcast through [`notices()`](Self::notices).
pub struct AdminController<S: ResourceService> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: ResourceService> {
    service: S,
    filter: Mutex<ListFilter>,
    draft: Mutex<Option<Draft<S>>>,
    state: watch::Sender<AdminListState<S::Item>>,
    notices: broadcast::Sender<Notice>,
    unmounted: CancellationToken,
}

impl<S: ResourceService> Clone for AdminController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ResourceService> AdminController<S> {
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(AdminListState::default());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        Self {
            inner: Arc::new(Inner {
                service,
                filter: Mutex::new(ListFilter::default()),
                draft: Mutex::new(None),
                state,
                notices,
                unmounted: CancellationToken::new(),
            }),
        }
    }

    pub fn service(&self) -> &S {
        &self.inner.service
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn state(&self) -> AdminListState<S::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminListState<S::Item>> {
        self.inner.state.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// True while a create or delete is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.state.borrow().is_busy()
    }

    // ── Filter and form state ────────────────────────────────────

    pub fn filter(&self) -> ListFilter {
        lock(&self.inner.filter).clone()
    }

    /// Query used by subsequent [`refresh()`](Self::refresh) calls.
    pub fn set_filter(&self, filter: ListFilter) {
        *lock(&self.inner.filter) = filter;
    }

    pub fn draft(&self) -> Option<Draft<S>> {
        lock(&self.inner.draft).clone()
    }

    pub fn set_draft(&self, draft: Draft<S>) {
        *lock(&self.inner.draft) = Some(draft);
    }

    pub fn discard_draft(&self) {
        lock(&self.inner.draft).take();
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Detach from the page. Calls still in flight complete, but their
    /// results no longer touch state or produce notices.
    pub fn unmount(&self) {
        debug!(resource = S::Item::PLURAL, "admin page unmounted");
        self.inner.unmounted.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.inner.unmounted.is_cancelled()
    }

    // ── Operations ───────────────────────────────────────────────

    /// Reload the list with the current filter.
    pub async fn refresh(&self) -> Option<Notice> {
        let notice = self.load_items().await;
        self.publish(notice)
    }

    /// Fetch one item into `selected`. On failure `selected` is left as is.
    pub async fn select(&self, id: &ResourceId) -> Option<Notice> {
        let result = self.inner.service.get_by_id(id).await;
        if self.discarding("get") {
            return None;
        }

        let fallback = || format!("Failed to load {}", S::Item::LABEL);
        let notice = match result {
            Ok(Envelope {
                success: true,
                data: Some(item),
                ..
            }) => {
                self.dispatch(Transition::SetSelected(Some(item)));
                None
            }
            Ok(envelope) => Some(Notice::error(message_or(envelope.error_message, fallback))),
            Err(e) => Some(transport_failure::<S>("get", e, fallback())),
        };
        self.publish(notice)
    }

    pub fn clear_selection(&self) {
        self.dispatch(Transition::SetSelected(None));
    }

    /// Create an item, then reload the list from the backend.
    pub async fn submit_create(&self, draft: &Draft<S>) -> Option<Notice> {
        self.dispatch(Transition::SetSubmitting(true));
        let result = self.inner.service.create(draft).await;
        if self.discarding("create") {
            return None;
        }

        let label = S::Item::LABEL;
        let notice = match result {
            Ok(envelope) if envelope.success => {
                info!(
                    resource = label,
                    id = ?envelope.data.as_ref().map(Resource::id),
                    "created"
                );
                let refreshed = self.load_items().await;
                self.publish(refreshed);
                self.discard_draft();
                Notice::success(message_or(envelope.success_message, || {
                    format!("{} created", capitalize(label))
                }))
            }
            Ok(envelope) => Notice::error(message_or(envelope.error_message, || {
                format!("Failed to create {label}")
            })),
            Err(e) => transport_failure::<S>("create", e, format!("Failed to create {label}")),
        };

        self.dispatch(Transition::SetSubmitting(false));
        self.publish(Some(notice))
    }

    /// Submit the draft held by [`set_draft()`](Self::set_draft).
    pub async fn submit_pending(&self) -> Option<Notice> {
        match self.draft() {
            Some(draft) => self.submit_create(&draft).await,
            None => self.publish(Some(Notice::error(format!(
                "No {} draft to submit",
                S::Item::LABEL
            )))),
        }
    }

    /// Delete an item, then reload the list from the backend.
    pub async fn remove(&self, id: &ResourceId) -> Option<Notice> {
        self.dispatch(Transition::SetDeleting(Some(id.clone())));
        let result = self.inner.service.delete(id).await;
        if self.discarding("delete") {
            return None;
        }

        let label = S::Item::LABEL;
        let notice = match result {
            Ok(envelope) if envelope.success => {
                info!(resource = label, %id, "deleted");
                if self
                    .inner
                    .state
                    .borrow()
                    .selected
                    .as_ref()
                    .is_some_and(|item| item.id() == id)
                {
                    self.dispatch(Transition::SetSelected(None));
                }
                let refreshed = self.load_items().await;
                self.publish(refreshed);
                Notice::success(message_or(envelope.success_message, || {
                    format!("{} deleted", capitalize(label))
                }))
            }
            Ok(envelope) => Notice::error(message_or(envelope.error_message, || {
                format!("Failed to delete {label}")
            })),
            Err(e) => transport_failure::<S>("delete", e, format!("Failed to delete {label}")),
        };

        self.dispatch(Transition::SetDeleting(None));
        self.publish(Some(notice))
    }

    // ── Internals ────────────────────────────────────────────────

    /// List call plus loading bookkeeping. Does not publish.
    async fn load_items(&self) -> Option<Notice> {
        self.dispatch(Transition::SetLoading(true));
        let filter = self.filter();
        let result = self.inner.service.list(&filter).await;
        if self.discarding("list") {
            return None;
        }

        let fallback = || format!("Failed to load {}", S::Item::PLURAL);
        let notice = match result {
            Ok(envelope) if envelope.success => {
                let page = envelope.data.unwrap_or_default();
                debug!(
                    resource = S::Item::PLURAL,
                    count = page.items.len(),
                    total = ?page.total,
                    "list loaded"
                );
                self.dispatch(Transition::SetItems(page.items));
                None
            }
            Ok(envelope) => Some(Notice::error(message_or(envelope.error_message, fallback))),
            Err(e) => Some(transport_failure::<S>("list", e, fallback())),
        };

        self.dispatch(Transition::SetLoading(false));
        notice
    }

    fn dispatch(&self, transition: Transition<S::Item>) {
        if self.is_unmounted() {
            return;
        }
        self.inner
            .state
            .send_modify(|state| *state = reduce(std::mem::take(state), transition));
    }

    fn publish(&self, notice: Option<Notice>) -> Option<Notice> {
        if self.is_unmounted() {
            return None;
        }
        if let Some(ref notice) = notice {
            // no subscribers is fine
            let _ = self.inner.notices.send(notice.clone());
        }
        notice
    }

    fn discarding(&self, operation: &str) -> bool {
        let unmounted = self.is_unmounted();
        if unmounted {
            debug!(
                resource = S::Item::PLURAL,
                operation, "discarding result after unmount"
            );
        }
        unmounted
    }
}

impl<S: ResourceService> std::fmt::Debug for AdminController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("AdminController")
            .field("resource", &S::Item::PLURAL)
            .field("items", &state.items.len())
            .field("is_loading", &state.is_loading)
            .field("unmounted", &self.is_unmounted())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn message_or(message: Option<String>, fallback: impl FnOnce() -> String) -> String {
    message.filter(|m| !m.trim().is_empty()).unwrap_or_else(fallback)
}

fn transport_failure<S: ResourceService>(operation: &str, err: ApiError, message: String) -> Notice {
    let cause = CoreError::from(err);
    warn!(resource = S::Item::PLURAL, operation, error = %cause, "backend call failed");
    Notice::failed(message, cause)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::VecDeque;

    use backoffice_api::{Blog, BlogDraft, Page};
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;

    type Reply<T> = Result<Envelope<T>, ApiError>;

    /// Replays queued replies in order and records every call.
    #[derive(Default)]
    struct Scripted {
        lists: Mutex<VecDeque<Reply<Page<Blog>>>>,
        gets: Mutex<VecDeque<Reply<Blog>>>,
        creates: Mutex<VecDeque<Reply<Blog>>>,
        deletes: Mutex<VecDeque<Reply<()>>>,
        calls: Mutex<Vec<String>>,
        list_gate: Option<Arc<Notify>>,
    }

    impl Scripted {
        fn on_list(self, reply: Reply<Page<Blog>>) -> Self {
            lock(&self.lists).push_back(reply);
            self
        }
        fn on_get(self, reply: Reply<Blog>) -> Self {
            lock(&self.gets).push_back(reply);
            self
        }
        fn on_create(self, reply: Reply<Blog>) -> Self {
            lock(&self.creates).push_back(reply);
            self
        }
        fn on_delete(self, reply: Reply<()>) -> Self {
            lock(&self.deletes).push_back(reply);
            self
        }
        fn record(&self, call: String) {
            lock(&self.calls).push(call);
        }
        fn calls(&self) -> Vec<String> {
            lock(&self.calls).clone()
        }
    }

    impl ResourceService for Scripted {
        type Item = Blog;

        async fn list(&self, _filter: &ListFilter) -> Reply<Page<Blog>> {
            self.record("list".into());
            if let Some(gate) = &self.list_gate {
                gate.notified().await;
            }
            lock(&self.lists).pop_front().expect("unscripted list")
        }

        async fn get_by_id(&self, id: &ResourceId) -> Reply<Blog> {
            self.record(format!("get {id}"));
            lock(&self.gets).pop_front().expect("unscripted get")
        }

        async fn create(&self, draft: &BlogDraft) -> Reply<Blog> {
            self.record(format!("create {}", draft.title));
            lock(&self.creates).pop_front().expect("unscripted create")
        }

        async fn delete(&self, id: &ResourceId) -> Reply<()> {
            self.record(format!("delete {id}"));
            lock(&self.deletes).pop_front().expect("unscripted delete")
        }
    }

    fn blog(id: &str, title: &str) -> Blog {
        Blog {
            id: ResourceId::from(id),
            title: title.into(),
            content: String::new(),
            category: "news".into(),
            image: None,
            created_at: None,
        }
    }

    fn page(items: Vec<Blog>) -> Reply<Page<Blog>> {
        Ok(Envelope::ok(Page::new(items)))
    }

    fn draft(title: &str) -> BlogDraft {
        BlogDraft {
            title: title.into(),
            ..BlogDraft::default()
        }
    }

    fn titles(controller: &AdminController<Scripted>) -> Vec<String> {
        controller
            .state()
            .items
            .into_iter()
            .map(|b| b.title)
            .collect()
    }

    fn connection_error() -> ApiError {
        ApiError::Tls("handshake failed".into())
    }

    // ── refresh ──────────────────────────────────────────────────

    #[tokio::test]
    async fn refresh_replaces_items_and_clears_loading() {
        let controller = AdminController::new(
            Scripted::default().on_list(page(vec![blog("1", "Old"), blog("2", "Other")])),
        );

        let notice = controller.refresh().await;

        assert_eq!(notice, None);
        let state = controller.state();
        assert_eq!(state.items.len(), 2);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn refresh_expected_failure_keeps_items() {
        let controller = AdminController::new(
            Scripted::default()
                .on_list(page(vec![blog("1", "Old")]))
                .on_list(Ok(Envelope::failure("Database offline"))),
        );
        controller.refresh().await;

        let notice = controller.refresh().await.unwrap();

        assert_eq!(notice, Notice::error("Database offline"));
        assert_eq!(titles(&controller), vec!["Old"]);
        assert!(!controller.state().is_loading);
    }

    #[tokio::test]
    async fn refresh_transport_failure_uses_fallback_message() {
        let controller =
            AdminController::new(Scripted::default().on_list(Err(connection_error())));

        let notice = controller.refresh().await.unwrap();

        match notice {
            Notice::Error { message, cause } => {
                assert_eq!(message, "Failed to load blogs");
                assert!(matches!(cause, Some(CoreError::ConnectionFailed { .. })));
            }
            other @ Notice::Success(_) => panic!("expected error notice, got {other:?}"),
        }
        assert!(!controller.state().is_loading);
    }

    #[tokio::test]
    async fn refresh_success_without_data_empties_list() {
        let controller = AdminController::new(
            Scripted::default()
                .on_list(page(vec![blog("1", "Old")]))
                .on_list(Ok(Envelope {
                    success: true,
                    data: None,
                    success_message: None,
                    error_message: None,
                })),
        );
        controller.refresh().await;
        controller.refresh().await;

        assert!(controller.state().items.is_empty());
    }

    // ── select ───────────────────────────────────────────────────

    #[tokio::test]
    async fn select_sets_and_failure_keeps_selection() {
        let controller = AdminController::new(
            Scripted::default()
                .on_get(Ok(Envelope::ok(blog("1", "Old"))))
                .on_get(Ok(Envelope::failure("Blog not found"))),
        );

        assert_eq!(controller.select(&ResourceId::from("1")).await, None);
        assert_eq!(controller.state().selected.unwrap().title, "Old");

        let notice = controller.select(&ResourceId::from("9")).await.unwrap();
        assert_eq!(notice.message(), "Blog not found");
        assert_eq!(controller.state().selected.unwrap().title, "Old");

        controller.clear_selection();
        assert!(controller.state().selected.is_none());
    }

    // ── submit_create ────────────────────────────────────────────

    #[tokio::test]
    async fn create_refreshes_from_server_instead_of_appending() {
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "Old")]))
            .on_create(Ok(
                Envelope::ok(blog("2", "New")).with_success_message("Blog created"),
            ))
            .on_list(page(vec![blog("1", "Old"), blog("2", "New")]));
        let controller = AdminController::new(service);
        controller.refresh().await;
        controller.set_draft(draft("New"));

        let notice = controller.submit_pending().await;

        assert_eq!(notice, Some(Notice::success("Blog created")));
        assert_eq!(titles(&controller), vec!["Old", "New"]);
        assert!(controller.draft().is_none());
        let state = controller.state();
        assert!(!state.is_submitting);
        assert!(!state.is_loading);
        assert_eq!(
            controller.service().calls(),
            vec!["list", "create New", "list"]
        );
    }

    #[tokio::test]
    async fn create_shows_server_state_even_when_it_differs() {
        // two existing items, the server assigns its own id and order
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "B"), blog("2", "C")]))
            .on_create(Ok(Envelope::ok(blog("srv-9", "A"))))
            .on_list(page(vec![blog("srv-9", "A"), blog("1", "B"), blog("2", "C")]));
        let controller = AdminController::new(service);
        controller.refresh().await;

        let notice = controller.submit_create(&draft("A")).await.unwrap();

        assert_eq!(notice, Notice::success("Blog created"));
        let state = controller.state();
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.items[0].id, ResourceId::from("srv-9"));
    }

    #[tokio::test]
    async fn create_succeeds_even_when_reload_fails() {
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "Old")]))
            .on_create(Ok(Envelope::ok(blog("2", "New"))))
            .on_list(Err(connection_error()));
        let controller = AdminController::new(service);
        controller.refresh().await;
        controller.set_draft(draft("New"));
        let mut notices = controller.notices();

        let notice = controller.submit_pending().await;

        assert_eq!(notice, Some(Notice::success("Blog created")));
        let reload = notices.recv().await.unwrap();
        assert_eq!(reload.message(), "Failed to load blogs");
        assert!(reload.is_error());
        assert_eq!(notices.recv().await.unwrap(), Notice::success("Blog created"));

        // the list still shows the last server state
        assert_eq!(titles(&controller), vec!["Old"]);
        let state = controller.state();
        assert!(!state.is_loading);
        assert!(!state.is_submitting);
        assert!(controller.draft().is_none());
    }

    #[tokio::test]
    async fn create_validation_failure_leaves_items_untouched() {
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "Old")]))
            .on_create(Ok(Envelope::failure("Validation failed")));
        let controller = AdminController::new(service);
        controller.refresh().await;
        controller.set_draft(draft(""));

        let notice = controller.submit_pending().await;

        assert_eq!(notice, Some(Notice::error("Validation failed")));
        assert_eq!(titles(&controller), vec!["Old"]);
        assert!(!controller.state().is_submitting);
        // the draft stays for correction
        assert!(controller.draft().is_some());
        assert_eq!(controller.service().calls(), vec!["list", "create "]);
    }

    #[tokio::test]
    async fn create_transport_failure_clears_submitting() {
        let controller =
            AdminController::new(Scripted::default().on_create(Err(connection_error())));

        let notice = controller.submit_create(&draft("X")).await.unwrap();

        assert_eq!(notice.message(), "Failed to create blog");
        assert!(!controller.state().is_submitting);
    }

    #[tokio::test]
    async fn submit_without_draft_is_an_error() {
        let controller = AdminController::new(Scripted::default());
        let notice = controller.submit_pending().await.unwrap();
        assert!(notice.is_error());
        assert!(controller.service().calls().is_empty());
    }

    // ── remove ───────────────────────────────────────────────────

    #[tokio::test]
    async fn remove_refreshes_and_clears_pending_id() {
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "Old"), blog("2", "Gone")]))
            .on_get(Ok(Envelope::ok(blog("2", "Gone"))))
            .on_delete(Ok(Envelope::ok(())))
            .on_list(page(vec![blog("1", "Old")]));
        let controller = AdminController::new(service);
        controller.refresh().await;
        controller.select(&ResourceId::from("2")).await;

        let notice = controller.remove(&ResourceId::from("2")).await;

        assert_eq!(notice, Some(Notice::success("Blog deleted")));
        let state = controller.state();
        assert_eq!(state.pending_delete_id, None);
        assert!(state.selected.is_none());
        assert_eq!(titles(&controller), vec!["Old"]);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn remove_failure_keeps_list_and_clears_pending_id() {
        let service = Scripted::default()
            .on_list(page(vec![blog("1", "Old")]))
            .on_delete(Ok(Envelope::failure("Forbidden")));
        let controller = AdminController::new(service);
        controller.refresh().await;

        let notice = controller.remove(&ResourceId::from("1")).await;

        assert_eq!(notice, Some(Notice::error("Forbidden")));
        assert_eq!(titles(&controller), vec!["Old"]);
        assert_eq!(controller.state().pending_delete_id, None);
        assert_eq!(controller.service().calls(), vec!["list", "delete 1"]);
    }

    #[tokio::test]
    async fn busy_until_post_delete_refresh_completes() {
        let gate = Arc::new(Notify::new());
        let service = Scripted {
            list_gate: Some(Arc::clone(&gate)),
            ..Scripted::default()
        }
        .on_delete(Ok(Envelope::ok(())))
        .on_list(page(vec![]));
        let controller = AdminController::new(service);
        let id = ResourceId::from("1");

        let (notice, saw_busy) = tokio::join!(controller.remove(&id), async {
            let busy = controller.is_busy();
            gate.notify_one();
            busy
        });

        assert!(saw_busy);
        assert!(notice.is_some());
        assert!(!controller.is_busy());
    }

    // ── notices and unmount ──────────────────────────────────────

    #[tokio::test]
    async fn notices_are_broadcast() {
        let controller = AdminController::new(
            Scripted::default().on_list(Ok(Envelope::failure("Nope"))),
        );
        let mut notices = controller.notices();

        controller.refresh().await;

        assert_eq!(notices.recv().await.unwrap(), Notice::error("Nope"));
    }

    #[tokio::test]
    async fn results_after_unmount_are_discarded() {
        let gate = Arc::new(Notify::new());
        let service = Scripted {
            list_gate: Some(Arc::clone(&gate)),
            ..Scripted::default()
        }
        .on_list(page(vec![blog("1", "Late")]));
        let controller = AdminController::new(service);
        let mut notices = controller.notices();

        let (notice, ()) = tokio::join!(controller.refresh(), async {
            controller.unmount();
            gate.notify_one();
        });

        assert_eq!(notice, None);
        assert!(controller.state().items.is_empty());
        assert!(notices.try_recv().is_err());
    }
}
