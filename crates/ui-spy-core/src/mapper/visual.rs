use crate::element::Element;
use crate::element::NativeClass;
use crate::model::sanitize;
use crate::model::ControlVisual;

pub fn capture_visual(element: &Element) -> ControlVisual {
    let mut visual = ControlVisual::default();

    // Elements that are collapsed or not yet laid out have no transform.
    if let Some((x, y)) = element.transform_to_root() {
        visual.x = sanitize(x);
        visual.y = sanitize(y);
    }

    if let Some(layout) = element.layout() {
        visual.width = sanitize(layout.width);
        visual.height = sanitize(layout.height);
    }
    visual.opacity = Some(sanitize(element.opacity()));

    if element.is_a(NativeClass::Control) {
        let style = element.style();
        visual.font_size = Some(sanitize(style.font_size));
        visual.font_weight = Some(style.font_weight.to_string());
        visual.foreground = style.foreground.map(|c| c.to_string());
        visual.background = style.background.map(|c| c.to_string());
    } else if element.is_a(NativeClass::TextBlock) {
        let style = element.style();
        visual.font_size = Some(sanitize(style.font_size));
        visual.font_weight = Some(style.font_weight.to_string());
        visual.foreground = style.foreground.map(|c| c.to_string());
    }

    visual
}
