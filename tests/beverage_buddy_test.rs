//! The Beverage Buddy review view, declared in code and loaded from the demo file

use std::path::PathBuf;
use std::sync::Arc;

use flowtree::application::services::{CheckSummary, ViewService};
use flowtree::attrs;
use flowtree::config::Settings;
use flowtree::domain::{
    BuildResult, BuilderContext, Catalog, ComponentArena, Host, NodeId, TreeBuilder,
};
use flowtree::infrastructure::traits::RealFileSystem;
use flowtree::util::testing;

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/beverage_buddy.toml")
}

fn categories() -> Vec<&'static str> {
    vec![
        "Undefined",
        "Mineral Water",
        "Soft Drink",
        "Coffee",
        "Tea",
        "Dairy",
        "Cider",
        "Beer",
        "Wine",
        "Other",
    ]
}

fn review_editor<H: Host + ?Sized>(dialog: &mut BuilderContext<'_, H>) -> BuildResult<()> {
    dialog.add("h3", attrs! { "text" => "Edit review" })?;
    dialog.add_with("form_layout", attrs! {}, |form| {
        form.add(
            "text_field",
            attrs! { "label" => "Beverage name", "required" => true, "min_length" => 3 },
        )?;
        form.add(
            "integer_field",
            attrs! {
                "label" => "Times tasted",
                "min" => 1,
                "max" => 99,
                "value" => 1,
                "has_controls" => true,
            },
        )?;
        form.add(
            "combo_box",
            attrs! { "label" => "Choose a category", "items" => categories() },
        )?;
        form.add("date_picker", attrs! { "label" => "Choose the date" })?;
        form.add(
            "combo_box",
            attrs! {
                "label" => "Mark a score",
                "items" => vec!["1", "2", "3", "4", "5"],
                "allow_custom_value" => false,
            },
        )?;
        Ok(())
    })?;
    dialog.add_with(
        "horizontal_layout",
        attrs! { "spacing" => true, "class_names" => vec!["buttons"] },
        |buttons| {
            for (text, theme) in [("Save", "primary"), ("Delete", "error"), ("Cancel", "tertiary")] {
                buttons.add(
                    "button",
                    attrs! { "text" => text, "theme_variants" => vec![theme] },
                )?;
            }
            Ok(())
        },
    )?;
    Ok(())
}

fn build_in_code(builder: &TreeBuilder, ui: &mut ComponentArena) -> BuildResult<NodeId> {
    builder.build(
        ui,
        "vertical_layout",
        attrs! { "id" => "reviews-list", "padding" => true, "spacing" => true, "width" => "100%" },
        |view| {
            view.add_with(
                "horizontal_layout",
                attrs! {
                    "class_names" => vec!["view-toolbar"],
                    "width" => "100%",
                    "align_items" => "baseline",
                },
                |toolbar| {
                    toolbar.add(
                        "text_field",
                        attrs! {
                            "placeholder" => "Search",
                            "clear_button_visible" => true,
                            "class_names" => vec!["view-toolbar__search-field"],
                        },
                    )?;
                    toolbar.add_with(
                        "button",
                        attrs! { "text" => "New review", "theme_variants" => vec!["primary"] },
                        |button| {
                            button.add("icon", attrs! { "icon" => "vaadin:plus" })?;
                            Ok(())
                        },
                    )?;
                    Ok(())
                },
            )?;
            view.add("h3", attrs! { "text" => "Reviews", "class_names" => vec!["view-header"] })?;
            view.add(
                "grid",
                attrs! {
                    "columns" => vec!["name", "score", "count", "category", "date"],
                    "selection_mode" => "single",
                    "width" => "100%",
                },
            )?;
            view.add_with(
                "dialog",
                attrs! {
                    "id" => "review-editor",
                    "modal" => true,
                    "close_on_esc" => true,
                    "opened" => false,
                },
                review_editor,
            )?;
            Ok(())
        },
    )
}

#[test]
fn given_demo_file_when_building_then_view_has_expected_shape() {
    testing::init_test_setup();
    let service = ViewService::new(Arc::new(RealFileSystem), &Settings::default()).unwrap();

    let view = service.build_file(&demo_path(), None).unwrap();

    let root_children = view.arena.children_of(view.root).unwrap();
    let kinds: Vec<&str> = root_children
        .iter()
        .map(|&id| view.arena.kind_of(id).unwrap())
        .collect();
    assert_eq!(kinds, ["horizontal_layout", "h3", "grid", "dialog"]);
    assert_eq!(view.arena.depth(view.root), 4);
    assert_eq!(view.arena.len(), 19);
}

#[test]
fn given_code_and_demo_file_when_building_both_then_snapshots_equal() {
    testing::init_test_setup();
    let catalog = Arc::new(Catalog::standard());
    let builder = TreeBuilder::from_catalog(&catalog);
    let mut ui = ComponentArena::new(Arc::clone(&catalog));
    let service = ViewService::new(Arc::new(RealFileSystem), &Settings::default()).unwrap();

    let root = build_in_code(&builder, &mut ui).unwrap();
    let from_file = service.build_file(&demo_path(), None).unwrap();

    assert_eq!(ui.snapshot(root).unwrap(), from_file.snapshot().unwrap());
}

#[test]
fn given_editor_block_when_reused_under_two_dialogs_then_builds_independent_copies() {
    let catalog = Arc::new(Catalog::standard());
    let builder = TreeBuilder::from_catalog(&catalog);
    let mut ui = ComponentArena::new(catalog);

    let first = builder.build(&mut ui, "dialog", attrs! {}, review_editor).unwrap();
    let second = builder.build(&mut ui, "dialog", attrs! {}, review_editor).unwrap();

    assert_eq!(ui.snapshot(first).unwrap(), ui.snapshot(second).unwrap());
    assert_eq!(ui.roots(), &[first, second]);
}

#[test]
fn given_built_view_when_rendering_then_tree_lists_save_button() {
    let service = ViewService::new(Arc::new(RealFileSystem), &Settings::default()).unwrap();

    let rendered = service.build_file(&demo_path(), None).unwrap().render().to_string();

    assert!(rendered.starts_with("vertical_layout {"));
    assert!(rendered.contains("button {text=\"Save\", theme_variants=[\"primary\"]}"));
}

#[test]
fn given_demo_file_when_checking_then_summary_counts_leaves() {
    let service = ViewService::new(Arc::new(RealFileSystem), &Settings::default()).unwrap();

    let reports = service.check_files(&[demo_path()]);

    assert_eq!(
        reports[0].outcome.as_ref().ok(),
        Some(&CheckSummary {
            components: 19,
            leaves: 13,
            depth: 4
        })
    );
}
