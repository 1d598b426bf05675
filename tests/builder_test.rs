//! Tree builder behavior against the component arena

use std::sync::Arc;

use rstest::rstest;

use flowtree::attrs;
use flowtree::domain::{
    AttrValue, BuildError, Catalog, ComponentArena, Declaration, Host, HostError, NodeId,
    TreeBuilder,
};
use flowtree::util::testing;

fn setup() -> (TreeBuilder, ComponentArena) {
    testing::init_test_setup();
    let catalog = Arc::new(Catalog::standard());
    (TreeBuilder::from_catalog(&catalog), ComponentArena::new(catalog))
}

// ============================================================
// Attachment and ordering
// ============================================================

#[test]
fn given_nested_blocks_when_building_then_each_node_attached_to_lexical_parent() {
    let (builder, mut ui) = setup();
    let mut toolbar = None;
    let mut search = None;
    let mut new_button = None;

    let root = builder
        .build(&mut ui, "vertical_layout", attrs! {}, |root| {
            toolbar = Some(root.add_with("horizontal_layout", attrs! {}, |bar| {
                search = Some(bar.add("text_field", attrs! { "placeholder" => "Search" })?);
                new_button = Some(bar.add("button", attrs! { "text" => "New review" })?);
                Ok(())
            })?);
            root.add("grid", attrs! {})?;
            Ok(())
        })
        .unwrap();

    let toolbar = toolbar.unwrap();
    assert_eq!(ui.parent_of(toolbar).unwrap(), Some(root));
    assert_eq!(ui.parent_of(search.unwrap()).unwrap(), Some(toolbar));
    assert_eq!(ui.parent_of(new_button.unwrap()).unwrap(), Some(toolbar));
    assert_eq!(
        ui.children_of(toolbar).unwrap(),
        &[search.unwrap(), new_button.unwrap()]
    );
    assert_eq!(ui.roots(), &[root]);
}

#[test]
fn given_node_declared_in_nested_block_when_building_then_not_attached_to_grandparent() {
    let (builder, mut ui) = setup();
    let mut form = None;
    let mut field = None;

    let root = builder
        .build(&mut ui, "dialog", attrs! {}, |dialog| {
            form = Some(dialog.add_with("form_layout", attrs! {}, |form| {
                field = Some(form.add("text_field", attrs! {})?);
                Ok(())
            })?);
            Ok(())
        })
        .unwrap();

    assert_eq!(ui.children_of(root).unwrap(), &[form.unwrap()]);
    assert_eq!(ui.children_of(form.unwrap()).unwrap(), &[field.unwrap()]);
}

#[test]
fn given_block_when_running_then_context_reports_node_parent_and_path() {
    let (builder, mut ui) = setup();
    let mut seen = Vec::new();

    builder
        .build(&mut ui, "vertical_layout", attrs! {}, |root| {
            let root_node = root.node();
            seen.push((root.kind().to_string(), root.path().to_string(), root.parent()));
            root.add("h1", attrs! {})?;
            root.add_with("horizontal_layout", attrs! {}, |bar| {
                assert_eq!(bar.parent(), Some(root_node));
                seen.push((bar.kind().to_string(), bar.path().to_string(), bar.parent()));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    assert_eq!(seen[0].0, "vertical_layout");
    assert_eq!(seen[0].1, "/vertical_layout");
    assert_eq!(seen[0].2, None);
    assert_eq!(seen[1].0, "horizontal_layout");
    assert_eq!(seen[1].1, "/vertical_layout/horizontal_layout[1]");
}

#[test]
fn given_same_declaration_twice_when_building_under_fresh_parents_then_identical_subtrees() {
    let (builder, mut ui) = setup();
    let declaration = Declaration::new("horizontal_layout")
        .with_attributes(attrs! { "spacing" => true })
        .with_child(Declaration::new("button").with_attributes(attrs! { "text" => "Save" }))
        .with_child(Declaration::new("button").with_attributes(attrs! { "text" => "Cancel" }));

    let first_parent = ui.instantiate("vertical_layout").unwrap();
    let second_parent = ui.instantiate("vertical_layout").unwrap();
    let first = builder
        .build_declaration(&mut ui, Some(first_parent), &declaration)
        .unwrap();
    let second = builder
        .build_declaration(&mut ui, Some(second_parent), &declaration)
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(ui.snapshot(first).unwrap(), ui.snapshot(second).unwrap());
    assert_eq!(ui.snapshot(first).unwrap(), declaration);
    let shared: Vec<NodeId> = ui
        .iter(first)
        .map(|(id, _)| id)
        .filter(|id| ui.iter(second).any(|(other, _)| other == *id))
        .collect();
    assert!(shared.is_empty());
}

#[test]
fn given_built_subtree_when_building_into_existing_parent_then_appends_after_siblings() {
    let (builder, mut ui) = setup();
    let root = builder
        .build(&mut ui, "vertical_layout", attrs! {}, |root| {
            root.add("h3", attrs! { "text" => "Reviews" })?;
            Ok(())
        })
        .unwrap();

    let grid = builder
        .build_into(&mut ui, root, "grid", attrs! { "page_size" => 50 }, |grid| {
            assert_eq!(grid.path().as_str(), "/vertical_layout/grid[1]");
            Ok(())
        })
        .unwrap();

    assert_eq!(ui.children_of(root).unwrap()[1], grid);
}

// ============================================================
// Attribute binding
// ============================================================

#[test]
fn given_attributes_when_building_then_applied_properties_equal_supplied() {
    let (builder, mut ui) = setup();
    let supplied = attrs! {
        "label" => "Times tasted",
        "min" => 1,
        "max" => 99,
        "required" => true,
        "class_names" => vec!["count"],
    };

    let field = builder
        .build(&mut ui, "integer_field", supplied.clone(), |_| Ok(()))
        .unwrap();

    assert_eq!(ui.get_node(field).unwrap().properties, supplied);
}

#[test]
fn given_block_when_setting_and_getting_then_values_go_through_capabilities() {
    let (builder, mut ui) = setup();

    builder
        .build(&mut ui, "button", attrs! { "text" => "Save" }, |button| {
            assert!(button.has("theme_variants"));
            assert!(!button.has("items"));
            assert_eq!(button.get("text")?, Some(AttrValue::from("Save")));
            button.set("text", "Saved")?;
            button.set("enabled", false)?;
            assert_eq!(button.get("text")?, Some(AttrValue::from("Saved")));
            assert_eq!(button.get("width")?, None);
            Ok(())
        })
        .unwrap();
}

#[test]
fn given_int_for_float_property_when_building_then_widened() {
    let (builder, mut ui) = setup();

    let bar = builder
        .build(&mut ui, "progress_bar", attrs! { "value" => 1 }, |_| Ok(()))
        .unwrap();

    assert_eq!(
        ui.read_property(bar, "value").unwrap(),
        Some(AttrValue::Float(1.0))
    );
}

#[rstest]
#[case::one_of_outside_set("split_layout", "orientation", AttrValue::from("diagonal"))]
#[case::string_for_bool("checkbox", "value", AttrValue::from("true"))]
#[case::float_for_int("integer_field", "step", AttrValue::Float(1.5))]
#[case::scalar_for_list("grid", "columns", AttrValue::from("name"))]
fn given_mistyped_value_when_building_strictly_then_invalid_value(
    #[case] kind: &str,
    #[case] attribute: &str,
    #[case] value: AttrValue,
) {
    let (builder, mut ui) = setup();
    let mut attrs = attrs! {};
    attrs.insert(attribute.to_string(), value);

    let result = builder.build(&mut ui, kind, attrs, |_| Ok(()));

    match result {
        Err(BuildError::InvalidValue {
            kind: k,
            attribute: a,
            ..
        }) => {
            assert_eq!(k, kind);
            assert_eq!(a, attribute);
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
    assert!(ui.is_empty());
}

// ============================================================
// Errors
// ============================================================

#[test]
fn given_unknown_attribute_among_valid_ones_when_nesting_then_no_partial_child() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "vertical_layout", attrs! {}, |root| {
        root.add("button", attrs! { "enabled" => false, "text" => "Go", "onclick" => "x" })?;
        Ok(())
    });

    match result {
        Err(BuildError::UnsupportedAttribute {
            kind,
            attribute,
            path,
        }) => {
            assert_eq!(kind, "button");
            assert_eq!(attribute, "onclick");
            assert_eq!(path, "/vertical_layout/button[0]");
        }
        other => panic!("expected UnsupportedAttribute, got {other:?}"),
    }
    // only the layout exists, it has no children and no stray button
    assert_eq!(ui.len(), 1);
    let root = ui.roots()[0];
    assert!(ui.children_of(root).unwrap().is_empty());
}

#[test]
fn given_error_in_later_sibling_when_building_then_earlier_siblings_stay_attached() {
    let (builder, mut ui) = setup();
    let mut root_node = None;

    let result = builder.build(&mut ui, "vertical_layout", attrs! {}, |root| {
        root_node = Some(root.node());
        root.add("h1", attrs! { "text" => "Title" })?;
        root.add("paragraph", attrs! { "href" => "/" })?;
        Ok(())
    });

    assert!(matches!(result, Err(BuildError::UnsupportedAttribute { .. })));
    let root = root_node.unwrap();
    assert_eq!(ui.children_of(root).unwrap().len(), 1);
}

#[test]
fn given_split_layout_when_adding_third_child_then_capacity_attachment_error() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "split_layout", attrs! {}, |split| {
        split.add("div", attrs! {})?;
        split.add("div", attrs! {})?;
        split.add("div", attrs! {})?;
        Ok(())
    });

    match result {
        Err(BuildError::Attachment {
            parent,
            child,
            path,
            source,
        }) => {
            assert_eq!(parent, "split_layout");
            assert_eq!(child, "div");
            assert_eq!(path, "/split_layout/div[2]");
            assert!(matches!(source, HostError::CapacityExceeded { max: 2, .. }));
        }
        other => panic!("expected Attachment, got {other:?}"),
    }
    assert_eq!(ui.len(), 3);
}

#[test]
fn given_tabs_when_adding_non_tab_then_child_kind_not_allowed() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "tabs", attrs! {}, |tabs| {
        tabs.add("tab", attrs! { "label" => "Reviews" })?;
        tabs.add("button", attrs! {})?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(BuildError::Attachment {
            source: HostError::ChildKindNotAllowed { .. },
            ..
        })
    ));
}

#[test]
fn given_ancestor_node_when_declared_inside_descendant_then_cycle_attachment_error() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "vertical_layout", attrs! {}, |root| {
        let root_node = root.node();
        root.add_with("div", attrs! {}, |div| {
            div.add(root_node, attrs! { "spacing" => true, "width" => "10px" })?;
            Ok(())
        })?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(BuildError::Attachment {
            source: HostError::Cycle { .. },
            ..
        })
    ));
    let root = ui.roots()[0];
    assert_eq!(ui.read_property(root, "spacing").unwrap(), None);
    assert_eq!(ui.read_property(root, "width").unwrap(), None);
    assert_eq!(ui.len(), 2);
}

#[test]
fn given_existing_child_when_redeclared_with_bad_attribute_then_path_points_at_last_slot() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "vertical_layout", attrs! {}, |root| {
        let save = root.add("button", attrs! { "text" => "Save" })?;
        root.add("button", attrs! { "text" => "Cancel" })?;
        root.add(save, attrs! { "opened" => true })?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedAttribute { .. }));
    assert_eq!(err.path(), "/vertical_layout/button[1]");
}

#[test]
fn given_block_error_when_building_then_error_propagates_unchanged() {
    let (builder, mut ui) = setup();

    let result = builder.build(&mut ui, "vertical_layout", attrs! {}, |root| {
        root.add_with("button", attrs! {}, |button| button.set("opened", true))?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert_eq!(err.path(), "/vertical_layout/button[0]");
    assert!(err.to_string().contains("opened"));
}

// ============================================================
// Host abstraction
// ============================================================

#[test]
fn given_host_trait_object_when_building_then_works_through_dyn_host() {
    let (builder, mut ui) = setup();
    let host: &mut dyn Host = &mut ui;

    let root = builder
        .build(host, "vertical_layout", attrs! {}, |root| {
            root.add("button", attrs! { "text" => "Save" })?;
            assert_eq!(root.host().children_of(root.node()).unwrap().len(), 1);
            Ok(())
        })
        .unwrap();

    assert_eq!(ui.depth(root), 2);
}
