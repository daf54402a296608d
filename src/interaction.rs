//! Hover and selection state.
//!
//! Two single slots over the union of node ids and edge ids: one hovered
//! entity and one selected entity at most. Ids are stable across layout passes,
//! so this state survives a strategy switch untouched.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    hovered_id: Option<String>,
    selected_id: Option<String>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_id(&self) -> Option<&str> {
        self.hovered_id.as_deref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered_id() == Some(id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id() == Some(id)
    }

    /// Replace the hover unconditionally. Returns true if it changed.
    pub fn set_hover(&mut self, id: Option<&str>) -> bool {
        if self.hovered_id.as_deref() == id {
            return false;
        }
        self.hovered_id = id.map(str::to_owned);
        true
    }

    /// Select `id`, or clear the selection if `id` is already selected.
    pub fn toggle_select(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected_id = None;
        } else {
            self.selected_id = Some(id.to_owned());
        }
    }

    pub fn clear(&mut self) {
        self.hovered_id = None;
        self.selected_id = None;
    }

    /// Drop hover/selection for ids that no longer pass `keep`.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        if self.hovered_id.as_deref().is_some_and(|id| !keep(id)) {
            self.hovered_id = None;
        }
        if self.selected_id.as_deref().is_some_and(|id| !keep(id)) {
            self.selected_id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_clears() {
        let mut s = InteractionState::new();
        s.toggle_select("root-1");
        assert_eq!(s.selected_id(), Some("root-1"));
        s.toggle_select("root-1");
        assert_eq!(s.selected_id(), None);
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut s = InteractionState::new();
        s.toggle_select("root-1");
        s.toggle_select("root->root-2");
        assert_eq!(s.selected_id(), Some("root->root-2"));
        assert!(!s.is_selected("root-1"));
    }

    #[test]
    fn test_set_hover_is_idempotent() {
        let mut s = InteractionState::new();
        assert!(s.set_hover(Some("root-0")));
        let once = s.clone();
        assert!(!s.set_hover(Some("root-0")));
        assert!(!s.set_hover(Some("root-0")));
        assert_eq!(s, once);
    }

    #[test]
    fn test_hover_replaces_and_clears() {
        let mut s = InteractionState::new();
        s.set_hover(Some("root-0"));
        s.set_hover(Some("root-1"));
        assert_eq!(s.hovered_id(), Some("root-1"));
        s.set_hover(None);
        assert_eq!(s.hovered_id(), None);
    }

    #[test]
    fn test_hover_and_selection_are_independent() {
        let mut s = InteractionState::new();
        s.set_hover(Some("root-0"));
        s.toggle_select("root-3");
        s.set_hover(None);
        assert_eq!(s.selected_id(), Some("root-3"));
    }

    #[test]
    fn test_retain_drops_missing_ids() {
        let mut s = InteractionState::new();
        s.set_hover(Some("root-0-1"));
        s.toggle_select("root-2");
        s.retain(|id| id.matches('-').count() < 2);
        assert_eq!(s.hovered_id(), None);
        assert_eq!(s.selected_id(), Some("root-2"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut s = InteractionState::new();
        s.toggle_select("root");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"hoveredId": null, "selectedId": "root"}));
    }
}
