//! Transient interface state: the composer, the active filter and the filter
//! popup. None of it is persisted.

use crate::model::Filter;

/// Vertical gap between the filter control and the popup it opens.
pub const POPUP_GAP: f64 = 8.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Composer {
    #[default]
    Creating,
    Editing {
        id: String,
    },
}

impl Composer {
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Composer::Creating => None,
            Composer::Editing { id } => Some(id),
        }
    }

    /// Tooltip for the shared submit control.
    pub fn submit_title(&self) -> &'static str {
        match self {
            Composer::Creating => "Add todo",
            Composer::Editing { .. } => "Save changes",
        }
    }
}

/// What the composer inputs currently hold. `due` is in calendar-date form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerFields {
    pub text: String,
    pub due: String,
}

impl ComposerFields {
    pub fn clear(&mut self) {
        self.text.clear();
        self.due.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupPosition {
    pub left: f64,
    pub top: f64,
}

impl PopupPosition {
    pub fn below(anchor: Rect) -> Self {
        Self {
            left: anchor.left,
            top: anchor.bottom() + POPUP_GAP,
        }
    }
}

/// Where a pointer interaction landed, relative to the filter menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    FilterControl,
    Popup,
    Outside,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Popup {
    #[default]
    Closed,
    Open {
        position: PopupPosition,
    },
}

impl Popup {
    pub fn is_open(&self) -> bool {
        matches!(self, Popup::Open { .. })
    }

    pub fn open(&mut self, anchor: Rect) {
        *self = Popup::Open {
            position: PopupPosition::below(anchor),
        };
    }

    pub fn close(&mut self) {
        *self = Popup::Closed;
    }

    /// Closes the popup when the interaction is outside both the popup and its control.
    pub fn handle_click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Outside {
            self.close();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub filter: Filter,
    pub composer: Composer,
    pub fields: ComposerFields,
    pub popup: Popup,
}

impl UiState {
    pub fn filter_label(&self) -> String {
        self.filter.control_label()
    }
}
