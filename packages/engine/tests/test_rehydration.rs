/// Rehydration tests - a fresh engine over a pre-rendered sheet
///
/// These tests validate that:
/// - Re-registering the same styles inserts nothing new
/// - Class names are identical across the rehydration boundary
/// - `cx` works on rehydrated caches, including property dedup
use swatch_engine::{
    cx, style, Css, EngineOptions, Keyframes, Layer, StyleMap, VirtualDocument,
};

fn options() -> EngineOptions {
    EngineOptions::default().with_diagnostics(false)
}

fn app_styles() -> StyleMap {
    let mut styles = StyleMap::new();
    styles.insert("$root".to_string(), style! { "margin": 0, "lineClamp": 2 });
    styles.insert(
        "button".to_string(),
        style! {
            "backgroundColor": "rgba(0, 0, 0, 0.5)",
            "appearance": "none",
            "paddingHorizontal": 12,
            ":hover": { "backgroundColor": "black" },
            ":focus": { "outlineWidth": 2 },
            ":active": { "opacity": 0.9 },
        },
    );
    styles.insert("primary".to_string(), style! { "backgroundColor": "blue" });
    styles
}

fn fade() -> Keyframes {
    let mut frames = Keyframes::new();
    frames.insert("from".to_string(), style! { "opacity": 0 });
    frames.insert("to".to_string(), style! { "opacity": 1 });
    frames
}

/// Render the sheet of a first engine the way a build would
fn prerender() -> (String, swatch_engine::ClassMap, Option<String>) {
    let mut css = Css::new(swatch_engine::StyleEngine::new(options()));
    let animation = css.keyframes(&fade());
    let classes = css.make(&app_styles());
    (css.serialize_sheet(), classes, animation)
}

#[test]
fn test_rehydrated_engine_inserts_nothing() {
    let (sheet_text, classes, animation) = prerender();
    let id = options().sheet_id;

    let mut document = VirtualDocument::new()
        .with_sheet(id.as_str(), &sheet_text)
        .unwrap();
    let mut css = Css::attach(&mut document, options()).unwrap();

    assert_eq!(css.keyframes(&fade()), animation);
    assert_eq!(css.make(&app_styles()), classes);

    let sheet = document.sheet(&id).unwrap();
    assert_eq!(sheet.borrow().insertions(), 0);
    assert_eq!(sheet.borrow().to_css(), sheet_text);
    assert_eq!(css.serialize_sheet(), sheet_text);
}

#[test]
fn test_rehydrated_caches_match_inserted_caches() {
    let mut fresh = Css::new(swatch_engine::StyleEngine::new(options()));
    fresh.make(&app_styles());

    let mut document = VirtualDocument::new()
        .with_sheet(options().sheet_id, &fresh.serialize_sheet())
        .unwrap();
    let rehydrated = Css::attach(&mut document, options()).unwrap();

    assert_eq!(rehydrated.caches(), fresh.caches());
}

#[test]
fn test_cx_after_rehydration() {
    let (sheet_text, classes, _) = prerender();
    let mut document = VirtualDocument::new()
        .with_sheet(options().sheet_id, &sheet_text)
        .unwrap();
    let css = Css::attach(&mut document, options()).unwrap();

    let merged = cx!(css, &classes["button"], &classes["primary"], &classes["$root"]);
    let tokens: Vec<_> = merged.split(' ').collect();

    assert_eq!(tokens[0], classes["$root"]);
    assert!(tokens.contains(&classes["primary"].as_str()));
    // primary's background-color replaces button's
    let button_background = classes["button"].split(' ').next().unwrap_or_default();
    assert!(!tokens.contains(&button_background));
}

#[test]
fn test_new_styles_after_rehydration_append() {
    let (sheet_text, _, _) = prerender();
    let id = options().sheet_id;
    let mut document = VirtualDocument::new()
        .with_sheet(id.as_str(), &sheet_text)
        .unwrap();
    let mut css = Css::attach(&mut document, options()).unwrap();

    let before = css.engine().layer_rules(Layer::Atomic).count();
    let mut styles = StyleMap::new();
    styles.insert("extra".to_string(), style! { "zIndex": 10 });
    css.make(&styles);

    let sheet = document.sheet(&id).unwrap();
    assert_eq!(sheet.borrow().insertions(), 1);
    assert_eq!(css.engine().layer_rules(Layer::Atomic).count(), before + 1);
    assert!(sheet.borrow().nested_rules(Layer::Atomic.index()).last().unwrap().to_string().ends_with("{z-index:10}"));
}
