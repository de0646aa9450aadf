/// Closed set of native element classes the host toolkit exposes.
///
/// Classes form a single-inheritance hierarchy; [`NativeClass::base`] gives
/// the direct supertype and [`NativeClass::is_a`] walks the lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeClass {
    DependencyObject,
    UIElement,
    FrameworkElement,
    Control,
    ContentControl,
    UserControl,
    ItemsControl,
    Selector,
    ButtonBase,
    RangeBase,
    Panel,

    TextBox,
    PasswordBox,
    RichEditBox,
    AutoSuggestBox,
    TextBlock,
    RichTextBlock,
    Button,
    AppBarButton,
    HyperlinkButton,
    RepeatButton,
    ToggleButton,
    CheckBox,
    RadioButton,
    ToggleSwitch,
    ComboBox,
    ListBox,
    DatePicker,
    TimePicker,
    Slider,
    ProgressBar,
    ProgressRing,
    Image,
    ListView,
    GridView,
    Page,
    Frame,
    NavigationView,
    NavigationViewItem,
    Pivot,
    Canvas,
    RelativePanel,
    VariableSizedWrapGrid,
    StackPanel,
    Grid,
    Border,
    ScrollViewer,
    ContentPresenter,
}

impl NativeClass {
    pub fn base(self) -> Option<NativeClass> {
        use NativeClass::*;
        let base = match self {
            DependencyObject => return None,
            UIElement => DependencyObject,
            FrameworkElement => UIElement,
            Control | TextBlock | RichTextBlock | Image | Border | Panel | ContentPresenter => {
                FrameworkElement
            }
            ContentControl | UserControl | ItemsControl | RangeBase | TextBox | PasswordBox
            | RichEditBox | ToggleSwitch | DatePicker | TimePicker | ProgressRing => Control,
            ButtonBase | Frame | ScrollViewer | NavigationView | NavigationViewItem => {
                ContentControl
            }
            Button | HyperlinkButton | RepeatButton | ToggleButton => ButtonBase,
            AppBarButton => Button,
            CheckBox | RadioButton => ToggleButton,
            Selector | AutoSuggestBox | Pivot => ItemsControl,
            ComboBox | ListBox | ListView | GridView => Selector,
            Slider | ProgressBar => RangeBase,
            Page => UserControl,
            Canvas | RelativePanel | VariableSizedWrapGrid | StackPanel | Grid => Panel,
        };
        Some(base)
    }

    /// True when `self` is `other` or derives from it.
    pub fn is_a(self, other: NativeClass) -> bool {
        self.lineage().any(|class| class == other)
    }

    /// `self` followed by each supertype up to `DependencyObject`.
    pub fn lineage(self) -> impl Iterator<Item = NativeClass> {
        std::iter::successors(Some(self), |class| class.base())
    }

    pub fn is_ui_element(self) -> bool {
        self.is_a(NativeClass::UIElement)
    }

    pub fn name(self) -> &'static str {
        use NativeClass::*;
        match self {
            DependencyObject => "DependencyObject",
            UIElement => "UIElement",
            FrameworkElement => "FrameworkElement",
            Control => "Control",
            ContentControl => "ContentControl",
            UserControl => "UserControl",
            ItemsControl => "ItemsControl",
            Selector => "Selector",
            ButtonBase => "ButtonBase",
            RangeBase => "RangeBase",
            Panel => "Panel",
            TextBox => "TextBox",
            PasswordBox => "PasswordBox",
            RichEditBox => "RichEditBox",
            AutoSuggestBox => "AutoSuggestBox",
            TextBlock => "TextBlock",
            RichTextBlock => "RichTextBlock",
            Button => "Button",
            AppBarButton => "AppBarButton",
            HyperlinkButton => "HyperlinkButton",
            RepeatButton => "RepeatButton",
            ToggleButton => "ToggleButton",
            CheckBox => "CheckBox",
            RadioButton => "RadioButton",
            ToggleSwitch => "ToggleSwitch",
            ComboBox => "ComboBox",
            ListBox => "ListBox",
            DatePicker => "DatePicker",
            TimePicker => "TimePicker",
            Slider => "Slider",
            ProgressBar => "ProgressBar",
            ProgressRing => "ProgressRing",
            Image => "Image",
            ListView => "ListView",
            GridView => "GridView",
            Page => "Page",
            Frame => "Frame",
            NavigationView => "NavigationView",
            NavigationViewItem => "NavigationViewItem",
            Pivot => "Pivot",
            Canvas => "Canvas",
            RelativePanel => "RelativePanel",
            VariableSizedWrapGrid => "VariableSizedWrapGrid",
            StackPanel => "StackPanel",
            Grid => "Grid",
            Border => "Border",
            ScrollViewer => "ScrollViewer",
            ContentPresenter => "ContentPresenter",
        }
    }
}

impl std::fmt::Display for NativeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialisations_are_their_supertypes() {
        assert!(NativeClass::AppBarButton.is_a(NativeClass::Button));
        assert!(NativeClass::AppBarButton.is_a(NativeClass::ButtonBase));
        assert!(NativeClass::CheckBox.is_a(NativeClass::ToggleButton));
        assert!(NativeClass::ListView.is_a(NativeClass::Selector));
        assert!(NativeClass::Grid.is_a(NativeClass::Panel));
        assert!(NativeClass::Page.is_a(NativeClass::Control));
    }

    #[test]
    fn test_siblings_are_unrelated() {
        assert!(!NativeClass::Button.is_a(NativeClass::AppBarButton));
        assert!(!NativeClass::RadioButton.is_a(NativeClass::CheckBox));
        assert!(!NativeClass::TextBlock.is_a(NativeClass::Control));
        assert!(!NativeClass::RepeatButton.is_a(NativeClass::Button));
    }

    #[test]
    fn test_every_class_reaches_dependency_object() {
        for class in [
            NativeClass::AppBarButton,
            NativeClass::NavigationViewItem,
            NativeClass::VariableSizedWrapGrid,
            NativeClass::ContentPresenter,
        ] {
            assert_eq!(class.lineage().last(), Some(NativeClass::DependencyObject));
            assert!(class.is_ui_element());
        }
        assert!(!NativeClass::DependencyObject.is_ui_element());
    }
}
