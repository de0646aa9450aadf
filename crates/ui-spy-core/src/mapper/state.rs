use crate::element::Element;
use crate::element::NativeClass;
use crate::element::Widget;
use crate::model::ControlState;

type Capture = fn(&Element, &mut ControlState);

/// Ordered per-class state capture. First `is_a` match wins; anything
/// unmatched only reports visibility.
const STATE_TABLE: &[(NativeClass, Capture)] = &[
    (NativeClass::TextBox, capture_text_box),
    (NativeClass::PasswordBox, capture_password_box),
    (NativeClass::RichEditBox, capture_rich_edit_box),
    (NativeClass::AutoSuggestBox, capture_suggest_box),
    (NativeClass::TextBlock, capture_text_block),
    (NativeClass::RichTextBlock, capture_visibility),
    (NativeClass::AppBarButton, capture_plain_button),
    (NativeClass::HyperlinkButton, capture_plain_button),
    (NativeClass::Button, capture_command_button),
    (NativeClass::ToggleSwitch, capture_switch),
    (NativeClass::CheckBox, capture_toggle),
    (NativeClass::RadioButton, capture_toggle),
    (NativeClass::ToggleButton, capture_toggle),
    (NativeClass::ComboBox, capture_selector),
    (NativeClass::ListBox, capture_selector),
    (NativeClass::DatePicker, capture_date),
    (NativeClass::TimePicker, capture_time),
    (NativeClass::Slider, capture_slider),
    (NativeClass::ListView, capture_list),
    (NativeClass::GridView, capture_list),
    (NativeClass::ProgressRing, capture_ring),
    (NativeClass::ProgressBar, capture_progress),
];

pub fn capture_state(element: &Element) -> ControlState {
    let mut state = ControlState::default();
    let capture = STATE_TABLE
        .iter()
        .find(|(class, _)| element.is_a(*class))
        .map(|(_, capture)| *capture)
        .unwrap_or(capture_visibility as Capture);
    capture(element, &mut state);
    state
}

/// Display text for controls that carry one.
pub fn capture_label(element: &Element) -> Option<String> {
    use NativeClass::*;
    let widget = element.widget();
    let labelled = [
        AppBarButton,
        HyperlinkButton,
        Button,
        TextBlock,
        ToggleSwitch,
        CheckBox,
        RadioButton,
        ToggleButton,
    ]
    .into_iter()
    .any(|class| element.is_a(class));
    if !labelled {
        return None;
    }
    match &*widget {
        Widget::Content(content) => content.clone(),
        Widget::Label(text) => Some(text.clone()),
        Widget::Switch { header, .. } => header.clone(),
        Widget::Toggle { content, .. } => content.clone(),
        _ => None,
    }
}

fn capture_visibility(element: &Element, state: &mut ControlState) {
    state.visible = element.is_visible();
}

fn capture_enabled(element: &Element, state: &mut ControlState) {
    state.enabled = element.is_enabled();
    state.visible = element.is_visible();
}

fn capture_text_box(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Text(input) = &*element.widget() {
        state.value = Some(input.text.clone());
        state.placeholder = input.placeholder.clone();
        state.read_only = input.read_only;
    }
    state.interactive = state.enabled && !state.read_only;
}

fn capture_password_box(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Password {
        password,
        placeholder,
    } = &*element.widget()
    {
        let masked = if password.is_empty() { "" } else { "***" };
        state.value = Some(masked.to_string());
        state.placeholder = placeholder.clone();
    }
    state.interactive = state.enabled;
}

fn capture_rich_edit_box(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Text(input) = &*element.widget() {
        state.value = Some(input.text.trim().to_string());
        state.read_only = input.read_only;
    }
    state.interactive = state.enabled && !state.read_only;
}

fn capture_suggest_box(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Text(input) = &*element.widget() {
        state.value = Some(input.text.clone());
        state.placeholder = input.placeholder.clone();
    }
    state.interactive = state.enabled;
}

fn capture_text_block(element: &Element, state: &mut ControlState) {
    capture_visibility(element, state);
    if let Widget::Label(text) = &*element.widget() {
        state.value = Some(text.clone());
    }
}

fn capture_plain_button(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    state.interactive = state.enabled;
}

fn capture_command_button(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    state.interactive = match element.command() {
        Some(binding) => binding.command.can_execute(binding.parameter.as_deref()),
        None => state.enabled,
    };
}

fn capture_switch(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Switch { on, .. } = &*element.widget() {
        state.checked = Some(*on);
    }
}

fn capture_toggle(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Toggle { checked, .. } = &*element.widget() {
        state.checked = *checked;
    }
}

fn capture_selector(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Items(list) = &*element.widget() {
        state.selected_index = Some(list.selected_index);
        state.item_count = Some(list.items.len());
        state.value = list.selected_item().map(str::to_string);
    }
}

fn capture_date(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Date(date) = &*element.widget() {
        state.value = Some(date.format("%Y-%m-%d").to_string());
    }
}

fn capture_time(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Time(time) = &*element.widget() {
        state.value = Some(time.format("%H:%M:%S").to_string());
    }
}

fn capture_slider(element: &Element, state: &mut ControlState) {
    capture_enabled(element, state);
    if let Widget::Range(value) = &*element.widget() {
        state.value = Some(value.to_string());
    }
}

fn capture_list(element: &Element, state: &mut ControlState) {
    capture_visibility(element, state);
    if let Widget::Items(list) = &*element.widget() {
        state.item_count = Some(list.items.len());
    }
}

fn capture_ring(element: &Element, state: &mut ControlState) {
    if let Widget::Ring { active } = &*element.widget() {
        state.visible = *active;
    }
    state.opacity = Some(crate::model::sanitize(element.opacity()));
}

fn capture_progress(element: &Element, state: &mut ControlState) {
    capture_visibility(element, state);
    if let Widget::Range(value) = &*element.widget() {
        state.value = Some(value.to_string());
    }
}
