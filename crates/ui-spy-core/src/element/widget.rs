use chrono::NaiveDate;
use chrono::NaiveTime;

use super::NativeClass;

/// Editable text with an optional hint, as carried by text boxes,
/// rich edit boxes and suggest boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    pub text: String,
    pub placeholder: Option<String>,
    pub read_only: bool,
}

/// Items of a selector-like or list-like control. `selected_index` is -1
/// when nothing is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemList {
    pub items: Vec<String>,
    pub selected_index: i32,
}

impl ItemList {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            selected_index: -1,
        }
    }

    pub fn selected(mut self, index: i32) -> Self {
        self.selected_index = index;
        self
    }

    pub fn selected_item(&self) -> Option<&str> {
        usize::try_from(self.selected_index)
            .ok()
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuItem {
    pub tag: Option<String>,
    pub content: Option<String>,
}

impl MenuItem {
    pub fn new(tag: Option<&str>, content: Option<&str>) -> Self {
        Self {
            tag: tag.map(str::to_string),
            content: content.map(str::to_string),
        }
    }
}

/// Per-class payload of a native element.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    None,
    Text(TextInput),
    Password {
        password: String,
        placeholder: Option<String>,
    },
    Label(String),
    Content(Option<String>),
    Toggle {
        content: Option<String>,
        checked: Option<bool>,
    },
    Switch {
        header: Option<String>,
        on: bool,
    },
    Items(ItemList),
    Date(NaiveDate),
    Time(NaiveTime),
    Range(f64),
    Ring {
        active: bool,
    },
    Frame {
        back_stack: Vec<String>,
    },
    Menu(Vec<MenuItem>),
}

impl Widget {
    pub fn default_for(class: NativeClass) -> Widget {
        use NativeClass::*;
        match class {
            TextBox | RichEditBox | AutoSuggestBox => Widget::Text(TextInput::default()),
            PasswordBox => Widget::Password {
                password: String::new(),
                placeholder: None,
            },
            TextBlock | RichTextBlock => Widget::Label(String::new()),
            Button | AppBarButton | HyperlinkButton | RepeatButton | NavigationViewItem => {
                Widget::Content(None)
            }
            ToggleButton | CheckBox | RadioButton => Widget::Toggle {
                content: None,
                checked: Some(false),
            },
            ToggleSwitch => Widget::Switch {
                header: None,
                on: false,
            },
            ComboBox | ListBox | ListView | GridView | Pivot => Widget::Items(ItemList::default()),
            DatePicker => Widget::Date(NaiveDate::default()),
            TimePicker => Widget::Time(NaiveTime::default()),
            Slider | ProgressBar => Widget::Range(0.0),
            ProgressRing => Widget::Ring { active: false },
            Frame => Widget::Frame {
                back_stack: Vec::new(),
            },
            NavigationView => Widget::Menu(Vec::new()),
            _ => Widget::None,
        }
    }
}
