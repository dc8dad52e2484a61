use crate::model::{group_by_type, ModelElement, SpatialNode, StructuredMaterial, TypeGroup};
use crate::normalize::organize_structured_materials;
use crate::pipeline::PipelineOutput;
use crate::process_log::ProcessLog;
use crate::schema::TypeSchema;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Dashboard,
    ElementDetail,
    SpatialTree,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPanel {
    Types,
    Elements,
}

/// One row of the element detail table.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRow {
    Section(String),
    Entry { name: String, value: String },
}

/// One pre-rendered line of the spatial tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    pub depth: usize,
    pub label: String,
    /// The node was normalized into an element.
    pub is_element: bool,
}

pub struct App {
    pub title: String,
    pub elements: Vec<ModelElement>,
    pub groups: Vec<TypeGroup>,
    pub tree_lines: Vec<TreeLine>,
    pub log: ProcessLog,
    pub view: View,
    pub focus_panel: FocusPanel,
    pub selected_group: usize,
    pub selected_element: usize,
    pub detail_scroll_offset: usize,
    pub tree_scroll_offset: usize,
    pub log_scroll_offset: usize,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        output: PipelineOutput,
        log: ProcessLog,
        schema: &TypeSchema,
    ) -> Self {
        let groups = group_by_type(&output.elements);
        let element_ids: HashSet<u32> = output.elements.iter().map(|e| e.id).collect();
        let tree_lines = output
            .tree
            .as_ref()
            .map(|tree| tree_lines(tree, schema, &element_ids))
            .unwrap_or_default();

        Self {
            title: title.into(),
            elements: output.elements,
            groups,
            tree_lines,
            log,
            view: View::Dashboard,
            focus_panel: FocusPanel::Types,
            selected_group: 0,
            selected_element: 0,
            detail_scroll_offset: 0,
            tree_scroll_offset: 0,
            log_scroll_offset: 0,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => super::dashboard::draw_dashboard(frame, self),
            View::ElementDetail => super::dashboard::draw_element_detail(frame, self),
            View::SpatialTree => super::dashboard::draw_spatial_tree(frame, self),
            View::Log => super::dashboard::draw_log(frame, self),
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match self.view {
            View::Dashboard => self.handle_dashboard_keys(code),
            View::ElementDetail => self.handle_detail_keys(code),
            View::SpatialTree | View::Log => self.handle_listing_keys(code),
        }
    }

    fn handle_dashboard_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Left | KeyCode::Char('h') => self.focus_panel = FocusPanel::Types,
            KeyCode::Right | KeyCode::Char('l') => self.focus_panel = FocusPanel::Elements,
            KeyCode::Enter => self.enter_element_detail(),
            KeyCode::Char('t') => self.view = View::SpatialTree,
            KeyCode::Char('g') => self.view = View::Log,
            _ => {}
        }
    }

    fn handle_detail_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Backspace => {
                self.view = View::Dashboard;
                self.detail_scroll_offset = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.detail_rows().len().saturating_sub(1);
                if self.detail_scroll_offset < max {
                    self.detail_scroll_offset += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.previous_element_in_detail(),
            KeyCode::Right | KeyCode::Char('l') => self.next_element_in_detail(),
            _ => {}
        }
    }

    fn handle_listing_keys(&mut self, code: KeyCode) {
        let (offset, len) = match self.view {
            View::SpatialTree => (&mut self.tree_scroll_offset, self.tree_lines.len()),
            _ => (&mut self.log_scroll_offset, self.log.len()),
        };
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Backspace => self.view = View::Dashboard,
            KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if *offset < len.saturating_sub(1) {
                    *offset += 1;
                }
            }
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.focus_panel {
            FocusPanel::Types => {
                if self.selected_group > 0 {
                    self.selected_group -= 1;
                    self.selected_element = 0;
                }
            }
            FocusPanel::Elements => self.selected_element = self.selected_element.saturating_sub(1),
        }
    }

    fn navigate_down(&mut self) {
        match self.focus_panel {
            FocusPanel::Types => {
                if self.selected_group < self.groups.len().saturating_sub(1) {
                    self.selected_group += 1;
                    self.selected_element = 0;
                }
            }
            FocusPanel::Elements => {
                if self.selected_element < self.group_elements().len().saturating_sub(1) {
                    self.selected_element += 1;
                }
            }
        }
    }

    fn enter_element_detail(&mut self) {
        if self.focus_panel == FocusPanel::Elements && self.selected().is_some() {
            self.view = View::ElementDetail;
            self.detail_scroll_offset = 0;
        }
    }

    /// Previous element of the same type, wrapping around.
    fn previous_element_in_detail(&mut self) {
        let count = self.group_elements().len();
        if count == 0 {
            return;
        }
        self.selected_element = if self.selected_element > 0 {
            self.selected_element - 1
        } else {
            count - 1
        };
        self.detail_scroll_offset = 0;
    }

    /// Next element of the same type, wrapping around.
    fn next_element_in_detail(&mut self) {
        let count = self.group_elements().len();
        if count == 0 {
            return;
        }
        self.selected_element = (self.selected_element + 1) % count;
        self.detail_scroll_offset = 0;
    }

    #[must_use]
    pub fn selected_group(&self) -> Option<&TypeGroup> {
        self.groups.get(self.selected_group)
    }

    /// Elements of the selected type group, in pipeline order.
    #[must_use]
    pub fn group_elements(&self) -> Vec<&ModelElement> {
        self.selected_group()
            .map(|group| {
                group
                    .element_indices
                    .iter()
                    .filter_map(|&i| self.elements.get(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ModelElement> {
        self.group_elements().get(self.selected_element).copied()
    }

    /// Property sets, then structured materials, of the selected element.
    #[must_use]
    pub fn detail_rows(&self) -> Vec<DetailRow> {
        let Some(element) = self.selected() else {
            return Vec::new();
        };

        let mut rows = Vec::new();
        for set in &element.property_sets {
            rows.push(DetailRow::Section(set.name.clone()));
            rows.extend(set.properties.iter().map(|p| DetailRow::Entry {
                name: p.name.clone(),
                value: p.formatted(),
            }));
        }

        for material in organize_structured_materials(&element.materials) {
            match &material {
                StructuredMaterial::Simple(info) => {
                    let category = info.category.as_deref().unwrap_or("Material");
                    rows.push(DetailRow::Section(format!("{category}: {}", info.name)));
                    if let Some(description) = &info.description {
                        rows.push(DetailRow::Entry {
                            name: "Description".to_string(),
                            value: description.clone(),
                        });
                    }
                }
                set => {
                    rows.push(DetailRow::Section(format!("{}: {}", set.kind_label(), set.name())));
                    rows.extend(set.parts().iter().map(|part| DetailRow::Entry {
                        name: format!("{}. {}", part.index, part.material),
                        value: part.value.to_string(),
                    }));
                }
            }
        }
        rows
    }
}

fn tree_lines(root: &SpatialNode, schema: &TypeSchema, element_ids: &HashSet<u32>) -> Vec<TreeLine> {
    root.flatten()
        .into_iter()
        .map(|(depth, node)| {
            let type_name = schema.resolve(&node.type_code);
            let label = match &node.name {
                Some(name) => format!("{type_name} #{} {name}", node.id),
                None => format!("{type_name} #{}", node.id),
            };
            TreeLine {
                depth,
                label,
                is_element: element_ids.contains(&node.id),
            }
        })
        .collect()
}
