use patchy::ui::data::Focus;
use patchy::ui::tui::footer_legend;

#[test]
fn footer_legend_follows_focus() {
    let query = footer_legend(Focus::Query, false);
    assert!(query.contains("Enter search"), "query footer should show submit");
    assert!(query.contains("Esc quit"), "query footer should show Esc quit");
    assert!(query.contains("F2 theme"));

    let results = footer_legend(Focus::Results, false);
    assert!(
        results.contains("Enter open"),
        "results footer should show Enter open"
    );
    assert!(results.contains("Space expand"));
    assert!(!results.contains("Esc quit"), "Esc leaves the list, not the app");
}

#[test]
fn footer_legend_in_overlay() {
    let overlay = footer_legend(Focus::Results, true);
    assert!(overlay.contains("Esc close"));
    assert!(overlay.contains("o open source"));
    assert!(!overlay.contains("Enter"));
}
