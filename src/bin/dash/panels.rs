//! Dashboard panels: filter multi-select, flow table, and feature detail.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Sparkline, Table},
    Frame,
};
use reviewflow_core::presenter::{FeatureDetail, FlowDiagram};

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Multi-select list over the available time-filter buckets.
pub struct FilterPanel {
    items: Vec<String>,
    selected: Vec<bool>,
    pub cursor: usize,
}

impl FilterPanel {
    pub fn new(items: Vec<String>) -> Self {
        // Default selection: "All Time" (position 0 by construction)
        let mut selected = vec![false; items.len()];
        if !selected.is_empty() {
            selected[0] = true;
        }
        Self {
            items,
            selected,
            cursor: 0,
        }
    }

    pub fn toggle_current(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    pub fn move_cursor(&mut self, delta: i64) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as i64;
        self.cursor = ((self.cursor as i64 + delta).rem_euclid(len)) as usize;
    }

    /// Names of the currently selected buckets.
    pub fn selection(&self) -> Vec<String> {
        self.items
            .iter()
            .zip(&self.selected)
            .filter(|(_, &on)| on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let marker = if self.selected[idx] { "[x]" } else { "[ ]" };
                let style = if idx == self.cursor && focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else if self.selected[idx] {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{marker} {name}"),
                    style,
                )))
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(self.cursor));
        let list = List::new(items).block(panel_block("Periods", focused));
        f.render_stateful_widget(list, area, &mut state);
    }
}

/// Table of flow links for the current selection.
pub struct FlowPanel {
    pub cursor: usize,
}

impl FlowPanel {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn move_cursor(&mut self, delta: i64, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = ((self.cursor as i64 + delta).rem_euclid(len as i64)) as usize;
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, diagram: &FlowDiagram, focused: bool) {
        if diagram.links.is_empty() {
            let empty = Paragraph::new("No flows for this selection")
                .style(Style::default().fg(Color::DarkGray))
                .block(panel_block("Feature → Cluster Flows", focused));
            f.render_widget(empty, area);
            return;
        }

        let rows: Vec<Row> = diagram
            .links
            .iter()
            .enumerate()
            .map(|(idx, link)| {
                let style = if idx == self.cursor && focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    diagram.nodes[link.source].clone(),
                    diagram.nodes[link.target].clone(),
                    link.value.to_string(),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                ratatui::layout::Constraint::Percentage(55),
                ratatui::layout::Constraint::Percentage(30),
                ratatui::layout::Constraint::Percentage(15),
            ],
        )
        .header(
            Row::new(vec!["Feature", "Cluster", "Reviews"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(panel_block("Feature → Cluster Flows", focused));
        f.render_widget(table, area);
    }
}

/// Detail card for the last-selected feature, with a weekly trend sparkline.
pub struct DetailPanel {
    detail: Option<FeatureDetail>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self { detail: None }
    }

    pub fn update(&mut self, detail: FeatureDetail) {
        self.detail = Some(detail);
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = panel_block("Feature Details", false);

        match &self.detail {
            None => {
                let hint = Paragraph::new("Select a flow and press Enter to see details")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                f.render_widget(hint, area);
            }
            Some(FeatureDetail::NoData { title }) => {
                let text = Paragraph::new(format!("No review data for {title}"))
                    .style(Style::default().fg(Color::Yellow))
                    .block(block);
                f.render_widget(text, area);
            }
            Some(FeatureDetail::Summary(summary)) => {
                let inner = block.inner(area);
                f.render_widget(block, area);

                let chunks = ratatui::layout::Layout::default()
                    .direction(ratatui::layout::Direction::Vertical)
                    .constraints([
                        ratatui::layout::Constraint::Length(4),
                        ratatui::layout::Constraint::Min(3),
                        ratatui::layout::Constraint::Length(1),
                    ])
                    .split(inner);

                let lines = vec![
                    Line::from(Span::styled(
                        summary.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(summary.app_label.clone()),
                    Line::from(summary.release_label.clone()),
                    Line::from(Span::styled(
                        summary.ratio_label.clone(),
                        Style::default().fg(Color::Green),
                    )),
                ];
                f.render_widget(Paragraph::new(lines), chunks[0]);

                let counts: Vec<u64> = summary.trend.iter().map(|w| w.reviews).collect();
                let sparkline = Sparkline::default()
                    .block(Block::default().title("Reviews per week"))
                    .style(Style::default().fg(Color::Cyan))
                    .data(&counts);
                f.render_widget(sparkline, chunks[1]);

                if let (Some(first), Some(last)) = (summary.trend.first(), summary.trend.last())
                {
                    let span = Paragraph::new(format!(
                        "{} → {}",
                        first.week_start, last.week_start
                    ))
                    .style(Style::default().fg(Color::DarkGray));
                    f.render_widget(span, chunks[2]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_panel_defaults_to_first_item() {
        let panel = FilterPanel::new(vec!["All Time".into(), "2024Q1".into()]);
        assert_eq!(panel.selection(), vec!["All Time".to_string()]);
    }

    #[test]
    fn test_filter_panel_toggle_and_wrap() {
        let mut panel = FilterPanel::new(vec!["All Time".into(), "2024Q1".into()]);
        panel.move_cursor(1);
        panel.toggle_current();
        assert_eq!(
            panel.selection(),
            vec!["All Time".to_string(), "2024Q1".to_string()]
        );

        // Cursor wraps around both ways
        panel.move_cursor(1);
        assert_eq!(panel.cursor, 0);
        panel.move_cursor(-1);
        assert_eq!(panel.cursor, 1);
    }

    #[test]
    fn test_flow_panel_cursor_clamps_on_shrink() {
        let mut panel = FlowPanel::new();
        panel.move_cursor(3, 5);
        assert_eq!(panel.cursor, 3);
        panel.clamp(2);
        assert_eq!(panel.cursor, 1);
        panel.clamp(0);
        assert_eq!(panel.cursor, 0);
    }
}
