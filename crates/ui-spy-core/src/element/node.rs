use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

use super::NativeClass;
use super::Widget;

pub type ElementRef = Rc<Element>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 0xFF, r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_weight: u16,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_weight: 400,
            foreground: Some(Color::rgb(0, 0, 0)),
            background: None,
        }
    }
}

/// Application command bound to a button, evaluated with the bound parameter.
pub struct Command {
    can_execute: Box<dyn Fn(Option<&str>) -> bool>,
    execute: Box<dyn Fn(Option<&str>)>,
}

impl Command {
    pub fn new(execute: impl Fn(Option<&str>) + 'static) -> Self {
        Self {
            can_execute: Box::new(|_| true),
            execute: Box::new(execute),
        }
    }

    pub fn with_can_execute(
        mut self,
        can_execute: impl Fn(Option<&str>) -> bool + 'static,
    ) -> Self {
        self.can_execute = Box::new(can_execute);
        self
    }

    pub fn can_execute(&self, parameter: Option<&str>) -> bool {
        (self.can_execute)(parameter)
    }

    pub fn execute(&self, parameter: Option<&str>) {
        (self.execute)(parameter)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct CommandBinding {
    pub command: Rc<Command>,
    pub parameter: Option<String>,
}

impl CommandBinding {
    pub fn new(command: Command) -> Self {
        Self {
            command: Rc::new(command),
            parameter: None,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

type ClickHandler = Rc<dyn Fn(&Element)>;

#[derive(Debug, Clone)]
struct Props {
    enabled: bool,
    visible: bool,
    opacity: f64,
    layout: Option<Rect>,
    style: TextStyle,
}

/// A node of the host's retained UI tree.
///
/// Elements are reference counted and single-threaded: they are created,
/// read and mutated on the UI thread only.
pub struct Element {
    type_name: String,
    class: NativeClass,
    automation_id: Option<String>,
    name: Option<String>,
    props: RefCell<Props>,
    widget: RefCell<Widget>,
    command: RefCell<Option<CommandBinding>>,
    click_handlers: RefCell<Vec<ClickHandler>>,
    parent: RefCell<Weak<Element>>,
    children: RefCell<Vec<ElementRef>>,
}

impl Element {
    pub fn builder(class: NativeClass) -> ElementBuilder {
        ElementBuilder::new(class)
    }

    /// Concrete type name; may be a host subclass such as `LoginPage`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn class(&self) -> NativeClass {
        self.class
    }

    pub fn is_a(&self, class: NativeClass) -> bool {
        self.class.is_a(class)
    }

    pub fn automation_id(&self) -> Option<&str> {
        self.automation_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    /// Name when set, type name otherwise. Used in error messages.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(&self.type_name)
    }

    pub fn is_enabled(&self) -> bool {
        self.props.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.props.borrow_mut().enabled = enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.props.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.props.borrow_mut().visible = visible;
    }

    pub fn opacity(&self) -> f64 {
        self.props.borrow().opacity
    }

    /// Bounds relative to the parent, or `None` when not laid out.
    pub fn layout(&self) -> Option<Rect> {
        self.props.borrow().layout
    }

    pub fn set_layout(&self, layout: Option<Rect>) {
        self.props.borrow_mut().layout = layout;
    }

    pub fn style(&self) -> TextStyle {
        self.props.borrow().style.clone()
    }

    pub fn widget(&self) -> Ref<'_, Widget> {
        self.widget.borrow()
    }

    pub fn widget_mut(&self) -> RefMut<'_, Widget> {
        self.widget.borrow_mut()
    }

    pub fn command(&self) -> Option<CommandBinding> {
        self.command.borrow().clone()
    }

    pub fn set_command(&self, binding: Option<CommandBinding>) {
        *self.command.borrow_mut() = binding;
    }

    pub fn on_click(&self, handler: impl Fn(&Element) + 'static) {
        self.click_handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Button types expose an invoke capability that raises their click handlers.
    pub fn supports_invoke(&self) -> bool {
        self.is_a(NativeClass::Button) || self.is_a(NativeClass::HyperlinkButton)
    }

    /// Raises the click handlers. Returns false when the element has no
    /// invoke capability.
    pub fn invoke(&self) -> bool {
        if !self.supports_invoke() {
            return false;
        }
        let handlers: Vec<ClickHandler> = self.click_handlers.borrow().clone();
        for handler in handlers {
            handler(self);
        }
        true
    }

    /// Sets the checked state. Checking a radio button clears its radio siblings.
    pub fn set_checked(&self, value: Option<bool>) {
        if let Widget::Toggle { checked, .. } = &mut *self.widget.borrow_mut() {
            *checked = value;
        }
        if value == Some(true) && self.is_a(NativeClass::RadioButton) {
            if let Some(parent) = self.parent() {
                for sibling in parent.children() {
                    let is_self = std::ptr::eq(Rc::as_ptr(&sibling), self);
                    if is_self || !sibling.is_a(NativeClass::RadioButton) {
                        continue;
                    }
                    if let Widget::Toggle { checked, .. } = &mut *sibling.widget.borrow_mut() {
                        *checked = Some(false);
                    }
                }
            }
        }
    }

    pub fn parent(&self) -> Option<ElementRef> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<ElementRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn append_child(self: &Rc<Self>, child: ElementRef) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }

    pub fn clear_children(&self) {
        for child in self.children.borrow_mut().drain(..) {
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    /// Pre-order walk over this element and its descendants.
    pub fn descendants(self: &Rc<Self>) -> Vec<ElementRef> {
        let mut out = Vec::new();
        let mut stack = vec![Rc::clone(self)];
        while let Some(element) = stack.pop() {
            stack.extend(element.children().into_iter().rev());
            out.push(element);
        }
        out
    }

    /// Position relative to the topmost ancestor. Fails when this element
    /// or any ancestor has not been laid out.
    pub fn transform_to_root(&self) -> Option<(f64, f64)> {
        let own = self.layout()?;
        let (mut x, mut y) = (own.x, own.y);
        let mut current = self.parent();
        while let Some(element) = current {
            let layout = element.layout()?;
            x += layout.x;
            y += layout.y;
            current = element.parent();
        }
        Some((x, y))
    }

    /// Frames show their current page as the first child.
    pub fn frame_content(&self) -> Option<ElementRef> {
        if !self.is_a(NativeClass::Frame) {
            return None;
        }
        self.children.borrow().first().cloned()
    }

    /// Replaces the frame content, pushing the previous page type on the back stack.
    pub fn navigate(self: &Rc<Self>, page: ElementRef) -> bool {
        if !self.is_a(NativeClass::Frame) {
            return false;
        }
        if let Some(previous) = self.frame_content() {
            if let Widget::Frame { back_stack } = &mut *self.widget.borrow_mut() {
                back_stack.push(previous.type_name().to_string());
            }
        }
        self.clear_children();
        self.append_child(page);
        true
    }

    pub fn back_stack_depth(&self) -> usize {
        match &*self.widget.borrow() {
            Widget::Frame { back_stack } => back_stack.len(),
            _ => 0,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type_name", &self.type_name)
            .field("automation_id", &self.automation_id)
            .field("name", &self.name)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

pub struct ElementBuilder {
    type_name: Option<String>,
    class: NativeClass,
    automation_id: Option<String>,
    name: Option<String>,
    props: Props,
    widget: Widget,
    command: Option<CommandBinding>,
    children: Vec<ElementRef>,
}

impl ElementBuilder {
    pub fn new(class: NativeClass) -> Self {
        Self {
            type_name: None,
            class,
            automation_id: None,
            name: None,
            props: Props {
                enabled: true,
                visible: true,
                opacity: 1.0,
                layout: None,
                style: TextStyle::default(),
            },
            widget: Widget::default_for(class),
            command: None,
            children: Vec::new(),
        }
    }

    /// Host subclass name, e.g. `LoginPage` over `Page`.
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn automation_id(mut self, id: impl Into<String>) -> Self {
        self.automation_id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.props.enabled = enabled;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.props.visible = visible;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.props.opacity = opacity;
        self
    }

    pub fn layout(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.props.layout = Some(Rect::new(x, y, width, height));
        self
    }

    pub fn style(mut self, style: TextStyle) -> Self {
        self.props.style = style;
        self
    }

    pub fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self
    }

    pub fn command(mut self, binding: CommandBinding) -> Self {
        self.command = Some(binding);
        self
    }

    pub fn child(mut self, child: ElementRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn build(self) -> ElementRef {
        let element = Rc::new(Element {
            type_name: self
                .type_name
                .unwrap_or_else(|| self.class.name().to_string()),
            class: self.class,
            automation_id: self.automation_id,
            name: self.name,
            props: RefCell::new(self.props),
            widget: RefCell::new(self.widget),
            command: RefCell::new(self.command),
            click_handlers: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        });
        for child in self.children {
            element.append_child(child);
        }
        element
    }
}
