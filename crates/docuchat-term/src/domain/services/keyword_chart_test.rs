use super::ChartRegistry;
use super::ChartSlot;
use crate::domain::models::ThemeMode;

fn keywords(words: &[&str]) -> Vec<String> {
    return words.iter().map(|e| return e.to_string()).collect();
}

#[test]
fn it_builds_one_bar_per_keyword_ranked() {
    let mut slot = ChartSlot::new(ChartRegistry::default());
    let chart = slot
        .render(&keywords(&["compression", "pdf", "ratio"]), ThemeMode::Dark)
        .unwrap();

    assert_eq!(
        chart.bars(),
        &[
            ("compression".to_string(), 3),
            ("pdf".to_string(), 2),
            ("ratio".to_string(), 1)
        ]
    );
}

#[test]
fn it_keeps_exactly_one_live_chart_across_renders() {
    let registry = ChartRegistry::default();
    let mut slot = ChartSlot::new(registry.clone());

    slot.render(&keywords(&["a", "b"]), ThemeMode::Dark);
    slot.render(&keywords(&["c", "d", "e"]), ThemeMode::Dark);

    assert_eq!(registry.live(), 1);
    assert_eq!(registry.created(), 2);
    assert_eq!(slot.current().unwrap().bars().len(), 3);
}

#[test]
fn it_skips_rerender_when_nothing_changed() {
    let registry = ChartRegistry::default();
    let mut slot = ChartSlot::new(registry.clone());

    slot.render(&keywords(&["a"]), ThemeMode::Dark);
    slot.render(&keywords(&["a"]), ThemeMode::Dark);

    assert_eq!(registry.created(), 1);
    assert_eq!(registry.live(), 1);
}

#[test]
fn it_rerenders_on_theme_change() {
    let registry = ChartRegistry::default();
    let mut slot = ChartSlot::new(registry.clone());

    slot.render(&keywords(&["a"]), ThemeMode::Dark);
    let chart = slot.render(&keywords(&["a"]), ThemeMode::Light).unwrap();

    assert_eq!(chart.theme(), ThemeMode::Light);
    assert_eq!(registry.created(), 2);
    assert_eq!(registry.live(), 1);
}

#[test]
fn it_renders_no_chart_for_empty_keywords() {
    let registry = ChartRegistry::default();
    let mut slot = ChartSlot::new(registry.clone());

    slot.render(&keywords(&["a"]), ThemeMode::Dark);
    assert!(slot.render(&[], ThemeMode::Dark).is_none());

    assert_eq!(registry.live(), 0);
    assert!(slot.current().is_none());
}

#[test]
fn it_releases_chart_when_slot_is_dropped() {
    let registry = ChartRegistry::default();
    {
        let mut slot = ChartSlot::new(registry.clone());
        slot.render(&keywords(&["a"]), ThemeMode::Dark);
        assert_eq!(registry.live(), 1);
    }
    assert_eq!(registry.live(), 0);
}
