use std::collections::HashSet;

use proptest::prelude::*;
use ui_spy_core::element::Element;
use ui_spy_core::element::ElementRef;
use ui_spy_core::element::NativeClass;
use ui_spy_core::model::AbstractControl;
use ui_spy_core::TreeMapper;

const CLASSES: &[NativeClass] = &[
    NativeClass::Grid,
    NativeClass::StackPanel,
    NativeClass::Border,
    NativeClass::ContentPresenter,
    NativeClass::Button,
    NativeClass::TextBlock,
    NativeClass::TextBox,
    NativeClass::CheckBox,
    NativeClass::ComboBox,
    NativeClass::Slider,
    NativeClass::ProgressRing,
    NativeClass::Page,
];

#[derive(Debug, Clone)]
struct Shape {
    class: usize,
    named: bool,
    layout: Option<(f64, f64, f64, f64)>,
    children: Vec<Shape>,
}

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -500.0..2000.0f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (
        0..CLASSES.len(),
        any::<bool>(),
        proptest::option::of((coordinate(), coordinate(), coordinate(), coordinate())),
    )
        .prop_map(|(class, named, layout)| Shape {
            class,
            named,
            layout,
            children: Vec::new(),
        });
    leaf.prop_recursive(6, 48, 4, |inner| {
        (
            0..CLASSES.len(),
            any::<bool>(),
            proptest::option::of((coordinate(), coordinate(), coordinate(), coordinate())),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(class, named, layout, children)| Shape {
                class,
                named,
                layout,
                children,
            })
    })
}

/// Builds the tree and records every assigned name with its depth.
fn build(
    shape: &Shape,
    depth: usize,
    counter: &mut usize,
    names: &mut Vec<(String, usize)>,
) -> ElementRef {
    let mut builder = Element::builder(CLASSES[shape.class]);
    if shape.named {
        *counter += 1;
        let name = format!("n{}", counter);
        names.push((name.clone(), depth));
        builder = builder.name(name);
    }
    if let Some((x, y, w, h)) = shape.layout {
        builder = builder.layout(x, y, w, h);
    }
    for child in &shape.children {
        builder = builder.child(build(child, depth + 1, counter, names));
    }
    builder.build()
}

fn walk<'a>(node: &'a AbstractControl, out: &mut Vec<&'a AbstractControl>) {
    out.push(node);
    for child in &node.children {
        walk(child, out);
    }
}

fn flatten(root: &Option<AbstractControl>) -> Vec<&AbstractControl> {
    let mut out = Vec::new();
    if let Some(root) = root {
        walk(root, &mut out);
    }
    out
}

proptest! {
    #[test]
    fn synthesized_nodes_always_have_children(tree in shape(), max_depth in 0usize..8) {
        let root = build(&tree, 0, &mut 0, &mut Vec::new());
        let mapped = TreeMapper::new().map(&root, 0, max_depth);
        for node in flatten(&mapped) {
            if node.id.starts_with('_') {
                prop_assert!(!node.children.is_empty(), "empty synthesized node {}", node.id);
            }
        }
    }

    #[test]
    fn named_nodes_within_depth_are_kept(tree in shape(), max_depth in 0usize..8) {
        let mut names = Vec::new();
        let root = build(&tree, 0, &mut 0, &mut names);
        let mapped = TreeMapper::new().map(&root, 0, max_depth);
        let ids: HashSet<&str> = flatten(&mapped).iter().map(|n| n.id.as_str()).collect();

        for (name, depth) in &names {
            if *depth <= max_depth {
                prop_assert!(ids.contains(name.as_str()), "{} at depth {} was pruned", name, depth);
            } else {
                prop_assert!(!ids.contains(name.as_str()), "{} beyond depth {} was kept", name, max_depth);
            }
        }
    }

    #[test]
    fn visuals_are_always_finite(tree in shape()) {
        let root = build(&tree, 0, &mut 0, &mut Vec::new());
        let mapped = TreeMapper::new().map(&root, 0, 50);
        for node in flatten(&mapped) {
            prop_assert!(node.visual.is_finite(), "non-finite visual on {}", node.id);
        }
        if let Some(mapped) = &mapped {
            prop_assert!(serde_json::to_string(mapped).is_ok());
        }
    }

    #[test]
    fn mapping_is_idempotent(tree in shape()) {
        let root = build(&tree, 0, &mut 0, &mut Vec::new());
        let mapper = TreeMapper::new();
        prop_assert_eq!(mapper.map(&root, 0, 50), mapper.map(&root, 0, 50));
    }
}
