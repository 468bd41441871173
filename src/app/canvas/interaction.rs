use eframe::egui::{self, Rect, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::chart::PointHover;

use super::super::render_utils::{ChartFrame, fuzzy_match_score};
use super::super::{SearchMatchCache, ViewModel};

impl ViewModel {
    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect, frame: ChartFrame) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        self.session.hit_test(frame.to_chart(pointer))
    }

    /// Routes hover changes through the session's enter/leave callbacks and
    /// keeps the tooltip they return.
    pub(in crate::app) fn update_hover(&mut self, hovered: Option<usize>) {
        let previous = self.session.hovered();
        if previous == hovered {
            return;
        }

        if let Some(source) = previous.and_then(|index| self.source_at(index)) {
            self.session.on_point_leave(&source);
            self.tooltip = None;
        }

        if let Some(source) = hovered.and_then(|index| self.source_at(index)) {
            self.tooltip = self.session.on_point_enter(&source);
        }
    }

    pub(in crate::app) fn handle_chart_click(&mut self, response: &egui::Response, hovered: Option<usize>) {
        if response.clicked_by(egui::PointerButton::Primary) {
            let next = if hovered == self.pinned { None } else { hovered };
            self.set_pinned(next);
        }
    }

    /// Per-point fuzzy match flags for the current search query, or `None`
    /// while the query is empty.
    pub(in crate::app) fn refresh_search_matches(&mut self) {
        let query = self.search.trim();
        if query.is_empty() {
            self.search_matches = None;
            return;
        }

        if self
            .search_matches
            .as_ref()
            .is_some_and(|cached| cached.query == query)
        {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .session
            .dataset()
            .sources()
            .map(|source| fuzzy_match_score(&matcher, source, query).is_some())
            .collect();

        self.search_matches = Some(SearchMatchCache {
            query: query.to_owned(),
            matches,
        });
    }

    fn source_at(&self, index: usize) -> Option<String> {
        self.session
            .dataset()
            .points
            .get(index)
            .map(|point| point.source.clone())
    }
}
