//! Frame and navigation-menu discovery.

use crate::element::ElementRef;
use crate::element::NativeClass;
use crate::element::Widget;
use crate::model::NavigationInfo;

const UNKNOWN_PAGE: &str = "Unknown";

/// The last frame met in a pre-order walk; with nested frames that is the
/// innermost content frame.
pub fn find_frame(root: &ElementRef) -> Option<ElementRef> {
    root.descendants()
        .into_iter()
        .rev()
        .find(|e| e.is_a(NativeClass::Frame))
}

pub fn find_navigation_menu(root: &ElementRef) -> Option<ElementRef> {
    root.descendants()
        .into_iter()
        .find(|e| e.is_a(NativeClass::NavigationView))
}

/// Type name of the current frame content, if any.
pub fn current_page_name(root: &ElementRef) -> Option<String> {
    find_frame(root)
        .and_then(|frame| frame.frame_content())
        .map(|page| page.type_name().to_string())
}

pub fn available_routes(menu: &ElementRef) -> Vec<String> {
    match &*menu.widget() {
        Widget::Menu(items) => items
            .iter()
            .map(|item| {
                item.tag
                    .clone()
                    .or_else(|| item.content.clone())
                    .unwrap_or_else(|| NativeClass::NavigationViewItem.name().to_string())
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn navigation_info(root: Option<&ElementRef>) -> NavigationInfo {
    let Some(root) = root else {
        return NavigationInfo {
            current_page: UNKNOWN_PAGE.to_string(),
            back_stack_depth: 0,
            available_routes: None,
        };
    };

    let (current_page, back_stack_depth) = match find_frame(root) {
        Some(frame) => (
            frame
                .frame_content()
                .map(|page| page.type_name().to_string())
                .unwrap_or_else(|| UNKNOWN_PAGE.to_string()),
            frame.back_stack_depth(),
        ),
        None => (root.type_name().to_string(), 0),
    };

    NavigationInfo {
        current_page,
        back_stack_depth,
        available_routes: find_navigation_menu(root).map(|menu| available_routes(&menu)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::element::MenuItem;

    fn page(type_name: &str) -> ElementRef {
        Element::builder(NativeClass::Page)
            .type_name(type_name)
            .build()
    }

    #[test]
    fn test_nested_frame_wins() {
        let inner = Element::builder(NativeClass::Frame).build();
        inner.navigate(page("LoginPage"));
        inner.navigate(page("HomePage"));
        let shell = page("ShellPage");
        shell.append_child(inner);
        let outer = Element::builder(NativeClass::Frame).build();
        outer.navigate(shell);

        let info = navigation_info(Some(&outer));
        assert_eq!(info.current_page, "HomePage");
        assert_eq!(info.back_stack_depth, 1);
        assert_eq!(info.available_routes, None);
        assert_eq!(current_page_name(&outer).as_deref(), Some("HomePage"));
    }

    #[test]
    fn test_empty_frame_is_unknown() {
        let root = Element::builder(NativeClass::Grid)
            .child(Element::builder(NativeClass::Frame).build())
            .build();
        let info = navigation_info(Some(&root));
        assert_eq!(info.current_page, "Unknown");
        assert_eq!(current_page_name(&root), None);
    }

    #[test]
    fn test_no_frame_reports_root_type() {
        let root = Element::builder(NativeClass::Grid)
            .type_name("MainGrid")
            .build();
        let info = navigation_info(Some(&root));
        assert_eq!(info.current_page, "MainGrid");
        assert_eq!(info.back_stack_depth, 0);
    }

    #[test]
    fn test_routes_prefer_tag_then_content() {
        let menu = Element::builder(NativeClass::NavigationView)
            .widget(Widget::Menu(vec![
                MenuItem::new(Some("home"), Some("Home")),
                MenuItem::new(None, Some("Settings")),
                MenuItem::new(None, None),
            ]))
            .build();
        let root = Element::builder(NativeClass::Grid).child(menu).build();

        let info = navigation_info(Some(&root));
        assert_eq!(
            info.available_routes,
            Some(vec![
                "home".to_string(),
                "Settings".to_string(),
                "NavigationViewItem".to_string()
            ])
        );
    }

    #[test]
    fn test_no_content_loaded() {
        let info = navigation_info(None);
        assert_eq!(info.current_page, "Unknown");
        assert_eq!(info.available_routes, None);
    }
}
