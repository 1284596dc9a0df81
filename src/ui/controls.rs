//! Controls shown in the button bar above the map
//!
//! Each control is a plain state model: what the page renders and what the
//! widget reads back when the user interacts with it.

use crate::{
    core::constants::TYPE_DROPDOWN_PLACEHOLDER,
    data::provider::Provider,
    geocode::client::GeocodeCandidate,
    prelude::HashSet,
};

/// Title and paragraph explaining the controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanatoryText {
    pub title: Option<String>,
    pub paragraph: String,
}

/// Lifecycle of the service type dropdown. It is built once and then only
/// has its options replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Uninitialized,
    Built {
        options: Vec<String>,
        selected: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TypeDropdown {
    state: DropdownState,
}

impl TypeDropdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DropdownState {
        &self.state
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, DropdownState::Built { .. })
    }

    pub fn placeholder(&self) -> &'static str {
        TYPE_DROPDOWN_PLACEHOLDER
    }

    /// Builds the dropdown on first use, otherwise replaces every option after
    /// the placeholder. Options are the distinct service types of `providers`
    /// in first-seen order. A selection that is no longer offered is dropped.
    pub fn rebuild(&mut self, providers: &[Provider]) {
        let mut seen = HashSet::default();
        let options: Vec<String> = providers
            .iter()
            .flat_map(|provider| provider.services.iter())
            .map(|service| service.type_label())
            .filter(|label| seen.insert(label.clone()))
            .collect();

        self.state = match std::mem::take(&mut self.state) {
            DropdownState::Uninitialized => {
                log::debug!("Type dropdown built with {} options", options.len());
                DropdownState::Built {
                    options,
                    selected: None,
                }
            }
            DropdownState::Built { selected, .. } => {
                let selected = selected.filter(|value| options.contains(value));
                DropdownState::Built { options, selected }
            }
        };
    }

    pub fn options(&self) -> &[String] {
        match &self.state {
            DropdownState::Built { options, .. } => options,
            DropdownState::Uninitialized => &[],
        }
    }

    /// Selects `value` if it is one of the options.
    pub fn select(&mut self, value: &str) -> bool {
        match &mut self.state {
            DropdownState::Built { options, selected } if options.iter().any(|o| o == value) => {
                *selected = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match &self.state {
            DropdownState::Built { selected, .. } => selected.as_deref(),
            DropdownState::Uninitialized => None,
        }
    }
}

/// "View coverage for this service in this area" checkbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageToggle {
    pub checked: bool,
    /// Ids of the coverage circles currently drawn
    pub circles: Vec<String>,
}

impl CoverageToggle {
    pub const LABEL: &'static str = "View coverage for this service in this area: ";
}

/// Address input with the candidates of the last search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSearchWidget {
    pub query: String,
    pub results: Vec<GeocodeCandidate>,
}

impl LocationSearchWidget {
    pub const PLACEHOLDER: &'static str = "Enter address";
    pub const RESULTS_TITLE: &'static str = "Choose a location";

    pub fn result(&self, index: usize) -> Option<&GeocodeCandidate> {
        self.results.get(index)
    }
}

/// Button bar rendered before the map
#[derive(Debug, Clone)]
pub struct ButtonBar {
    classes: Vec<String>,
    explanatory: Option<ExplanatoryText>,
    dropdown: TypeDropdown,
    coverage: Option<CoverageToggle>,
    search: Option<LocationSearchWidget>,
    locate_button: bool,
}

impl Default for ButtonBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonBar {
    pub const LOCATE_LABEL: &'static str = "Get your current location";

    pub fn new() -> Self {
        Self {
            classes: vec!["rentalsMapButtons".to_string(), "center".to_string()],
            explanatory: None,
            dropdown: TypeDropdown::new(),
            coverage: None,
            search: None,
            locate_button: false,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn set_explanatory(&mut self, title: Option<String>, paragraph: String) {
        self.add_class("emphasis");
        self.explanatory = Some(ExplanatoryText { title, paragraph });
    }

    pub fn explanatory(&self) -> Option<&ExplanatoryText> {
        self.explanatory.as_ref()
    }

    pub fn dropdown(&self) -> &TypeDropdown {
        &self.dropdown
    }

    pub fn dropdown_mut(&mut self) -> &mut TypeDropdown {
        &mut self.dropdown
    }

    /// Adds the coverage checkbox unless present. Returns whether it was added.
    pub fn ensure_coverage_toggle(&mut self) -> bool {
        if self.coverage.is_some() {
            return false;
        }
        self.coverage = Some(CoverageToggle::default());
        true
    }

    pub fn coverage(&self) -> Option<&CoverageToggle> {
        self.coverage.as_ref()
    }

    pub fn coverage_mut(&mut self) -> Option<&mut CoverageToggle> {
        self.coverage.as_mut()
    }

    pub fn ensure_search(&mut self) -> &mut LocationSearchWidget {
        self.search.get_or_insert_with(LocationSearchWidget::default)
    }

    pub fn search(&self) -> Option<&LocationSearchWidget> {
        self.search.as_ref()
    }

    pub fn add_locate_button(&mut self) {
        self.locate_button = true;
    }

    pub fn has_locate_button(&self) -> bool {
        self.locate_button
    }
}
