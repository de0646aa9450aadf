use crate::element::NativeClass;
use crate::model::ControlKind;

/// Ordered class-to-kind table. The first entry the element `is_a` wins, so
/// specialisations sit above their supertypes.
pub const KIND_TABLE: &[(NativeClass, ControlKind)] = &[
    (NativeClass::TextBox, ControlKind::TextInput),
    (NativeClass::PasswordBox, ControlKind::TextInput),
    (NativeClass::RichEditBox, ControlKind::TextInput),
    (NativeClass::AutoSuggestBox, ControlKind::TextInput),
    (NativeClass::TextBlock, ControlKind::TextDisplay),
    (NativeClass::RichTextBlock, ControlKind::TextDisplay),
    (NativeClass::AppBarButton, ControlKind::ActionButton),
    (NativeClass::HyperlinkButton, ControlKind::ActionButton),
    (NativeClass::RepeatButton, ControlKind::ActionButton),
    (NativeClass::Button, ControlKind::ActionButton),
    (NativeClass::ToggleSwitch, ControlKind::Toggle),
    (NativeClass::CheckBox, ControlKind::Toggle),
    (NativeClass::RadioButton, ControlKind::Toggle),
    (NativeClass::ToggleButton, ControlKind::Toggle),
    (NativeClass::ComboBox, ControlKind::Selector),
    (NativeClass::ListBox, ControlKind::Selector),
    (NativeClass::DatePicker, ControlKind::Selector),
    (NativeClass::TimePicker, ControlKind::Selector),
    (NativeClass::Slider, ControlKind::RangeInput),
    (NativeClass::Image, ControlKind::Image),
    (NativeClass::ListView, ControlKind::List),
    (NativeClass::GridView, ControlKind::List),
    (NativeClass::ProgressRing, ControlKind::LoadingIndicator),
    (NativeClass::ProgressBar, ControlKind::ProgressIndicator),
    (NativeClass::Page, ControlKind::Screen),
    (NativeClass::Frame, ControlKind::Navigation),
    (NativeClass::NavigationView, ControlKind::Navigation),
    (NativeClass::Pivot, ControlKind::TabGroup),
    (NativeClass::Canvas, ControlKind::Container),
    (NativeClass::RelativePanel, ControlKind::Container),
    (NativeClass::VariableSizedWrapGrid, ControlKind::Container),
    (NativeClass::StackPanel, ControlKind::Container),
    (NativeClass::Grid, ControlKind::Container),
    (NativeClass::Border, ControlKind::Container),
    (NativeClass::ScrollViewer, ControlKind::Container),
    (NativeClass::Panel, ControlKind::Container),
];

pub fn classify(class: NativeClass) -> ControlKind {
    KIND_TABLE
        .iter()
        .find(|(candidate, _)| class.is_a(*candidate))
        .map(|(_, kind)| *kind)
        .unwrap_or(ControlKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialised_buttons_before_button() {
        assert_eq!(classify(NativeClass::AppBarButton), ControlKind::ActionButton);
        assert_eq!(classify(NativeClass::Button), ControlKind::ActionButton);
        assert_eq!(classify(NativeClass::RepeatButton), ControlKind::ActionButton);
    }

    #[test]
    fn test_toggle_family() {
        assert_eq!(classify(NativeClass::CheckBox), ControlKind::Toggle);
        assert_eq!(classify(NativeClass::RadioButton), ControlKind::Toggle);
        assert_eq!(classify(NativeClass::ToggleButton), ControlKind::Toggle);
        assert_eq!(classify(NativeClass::ToggleSwitch), ControlKind::Toggle);
    }

    #[test]
    fn test_list_views_are_lists_not_selectors() {
        assert_eq!(classify(NativeClass::ListView), ControlKind::List);
        assert_eq!(classify(NativeClass::GridView), ControlKind::List);
        assert_eq!(classify(NativeClass::ComboBox), ControlKind::Selector);
    }

    #[test]
    fn test_panels_and_unknowns() {
        assert_eq!(classify(NativeClass::Grid), ControlKind::Container);
        assert_eq!(classify(NativeClass::Panel), ControlKind::Container);
        assert_eq!(classify(NativeClass::ContentPresenter), ControlKind::Unknown);
        assert_eq!(classify(NativeClass::UserControl), ControlKind::Unknown);
        assert_eq!(classify(NativeClass::NavigationViewItem), ControlKind::Unknown);
    }

    #[test]
    fn test_table_lists_specialisations_first() {
        for (i, (later, _)) in KIND_TABLE.iter().enumerate() {
            for (earlier, _) in &KIND_TABLE[..i] {
                assert!(
                    !later.is_a(*earlier) || later == earlier,
                    "{} is shadowed by its supertype {}",
                    later,
                    earlier
                );
            }
        }
    }
}
