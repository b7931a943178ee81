use backoffice_api::ResourceId;

/// Everything an admin list page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminListState<R> {
    pub items: Vec<R>,
    pub selected: Option<R>,
    pub is_loading: bool,
    pub is_submitting: bool,
    /// Id of the item whose delete request is in flight.
    pub pending_delete_id: Option<ResourceId>,
}

impl<R> Default for AdminListState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            is_loading: false,
            is_submitting: false,
            pending_delete_id: None,
        }
    }
}

impl<R> AdminListState<R> {
    /// Mutating controls should be disabled while this holds.
    pub fn is_busy(&self) -> bool {
        self.is_submitting || self.pending_delete_id.is_some()
    }
}

/// The only ways [`AdminListState`] changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<R> {
    SetItems(Vec<R>),
    SetSelected(Option<R>),
    SetLoading(bool),
    SetSubmitting(bool),
    SetDeleting(Option<ResourceId>),
}

/// Apply one transition. Each transition replaces exactly one field.
pub fn reduce<R>(state: AdminListState<R>, transition: Transition<R>) -> AdminListState<R> {
    match transition {
        Transition::SetItems(items) => AdminListState { items, ..state },
        Transition::SetSelected(selected) => AdminListState { selected, ..state },
        Transition::SetLoading(is_loading) => AdminListState { is_loading, ..state },
        Transition::SetSubmitting(is_submitting) => AdminListState {
            is_submitting,
            ..state
        },
        Transition::SetDeleting(pending_delete_id) => AdminListState {
            pending_delete_id,
            ..state
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_items_replaces_wholesale() {
        let state = AdminListState {
            items: vec!["a", "b", "c"],
            is_loading: true,
            ..AdminListState::default()
        };

        let next = reduce(state, Transition::SetItems(vec!["z"]));

        assert_eq!(next.items, vec!["z"]);
        assert!(next.is_loading);
    }

    #[test]
    fn each_transition_touches_one_field() {
        let base: AdminListState<&str> = AdminListState::default();

        let next = reduce(base.clone(), Transition::SetSelected(Some("x")));
        assert_eq!(next, AdminListState { selected: Some("x"), ..base.clone() });

        let next = reduce(base.clone(), Transition::SetLoading(true));
        assert_eq!(next, AdminListState { is_loading: true, ..base.clone() });

        let next = reduce(base.clone(), Transition::SetSubmitting(true));
        assert_eq!(next, AdminListState { is_submitting: true, ..base.clone() });

        let id = ResourceId::from("7");
        let next = reduce(base.clone(), Transition::SetDeleting(Some(id.clone())));
        assert_eq!(
            next,
            AdminListState {
                pending_delete_id: Some(id),
                ..base
            }
        );
    }

    #[test]
    fn busy_while_submitting_or_deleting() {
        let idle: AdminListState<()> = AdminListState::default();
        assert!(!idle.is_busy());

        let loading = reduce(idle.clone(), Transition::SetLoading(true));
        assert!(!loading.is_busy());

        assert!(reduce(idle.clone(), Transition::SetSubmitting(true)).is_busy());
        assert!(reduce(idle, Transition::SetDeleting(Some(ResourceId::from("1")))).is_busy());
    }
}
