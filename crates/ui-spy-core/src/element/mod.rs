//! Retained native element tree maintained by the host application.

mod class;
mod node;
mod widget;

pub use class::NativeClass;
pub use node::Color;
pub use node::Command;
pub use node::CommandBinding;
pub use node::Element;
pub use node::ElementBuilder;
pub use node::ElementRef;
pub use node::Rect;
pub use node::TextStyle;
pub use widget::ItemList;
pub use widget::MenuItem;
pub use widget::TextInput;
pub use widget::Widget;
