//! Native tree to abstract control tree.

mod kind;
mod state;
mod visual;

pub use kind::classify;
pub use kind::KIND_TABLE;
pub use state::capture_label;
pub use state::capture_state;
pub use visual::capture_visual;

use tracing::debug;
use tracing::trace;

use crate::element::ElementRef;
use crate::element::NativeClass;
use crate::model::AbstractControl;

/// Walks a native tree and produces the abstract control tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeMapper;

impl TreeMapper {
    pub fn new() -> Self {
        Self
    }

    /// Maps `element` and its descendants. Depth counts from 0 at the
    /// starting element; anything deeper than `max_depth` is cut off.
    ///
    /// Unnamed elements without surviving children are pruned. Unnamed
    /// elements that do have surviving children get the id `_<TypeName>`.
    pub fn map(
        &self,
        element: &ElementRef,
        current_depth: usize,
        max_depth: usize,
    ) -> Option<AbstractControl> {
        if current_depth > max_depth {
            debug!(
                max_depth,
                native_type = element.type_name(),
                "depth limit reached"
            );
            return None;
        }
        if !element.class().is_ui_element() {
            return None;
        }

        let id = identifier(element);
        if current_depth <= 3 || id.is_some() {
            trace!(
                depth = current_depth,
                native_type = element.type_name(),
                id = id.as_deref().unwrap_or("(none)"),
                "mapping element"
            );
        }

        let children: Vec<AbstractControl> = element
            .children()
            .iter()
            .filter_map(|child| self.map(child, current_depth + 1, max_depth))
            .collect();

        if id.is_none() && children.is_empty() {
            return None;
        }

        Some(AbstractControl {
            id: id.unwrap_or_else(|| format!("_{}", element.type_name())),
            kind: classify(element.class()),
            label: capture_label(element),
            native_type: Some(element.type_name().to_string()),
            state: capture_state(element),
            visual: capture_visual(element),
            children,
        })
    }
}

/// Automation id first, then name. Only framework elements carry either.
pub fn identifier(element: &ElementRef) -> Option<String> {
    if !element.is_a(NativeClass::FrameworkElement) {
        return None;
    }
    element
        .automation_id()
        .or_else(|| element.name())
        .map(str::to_string)
}
