use super::*;

fn monitor(id: &str, url: &str) -> Monitor {
    Monitor {
        id: MonitorId::from(id),
        url: url.to_owned(),
        css_selector: format!("#{id}"),
        user_email: format!("{id}@example.test"),
        user_key: None,
    }
}

fn card(id: &str, url: &str) -> Card {
    Card::from(&monitor(id, url))
}

fn cards(ids: &[&str]) -> ListView {
    ListView::Cards(ids.iter().map(|id| card(id, "https://a.test")).collect())
}

fn assert_converges(prev: &ListView, next: &ListView) -> Vec<ViewPatch> {
    let patches = diff(prev, next);
    let mut applied = prev.clone();
    applied.apply_all(&patches);
    assert_eq!(&applied, next, "patches {patches:?} did not converge");
    patches
}

#[test]
fn card_element_id_is_derived_from_monitor_id() {
    assert_eq!(card_element_id(&MonitorId::from("42")), "monitor-42");
}

#[test]
fn delete_target_reads_button_data_id() {
    let c = card("42", "https://a.test");
    assert_eq!(delete_target(Some(c.monitor_id.as_str())), Some(MonitorId::from("42")));
    assert_eq!(delete_target(Some(" 42 ")), Some(MonitorId::from("42")));
    assert_eq!(delete_target(Some("  ")), None);
    assert_eq!(delete_target(None), None);
}

#[test]
fn card_projects_monitor_fields() {
    let c = card("7", "https://shop.test/item");
    assert_eq!(c.element_id, "monitor-7");
    assert_eq!(c.monitor_id, MonitorId::from("7"));
    assert_eq!(c.url, "https://shop.test/item");
    assert_eq!(c.css_selector, "#7");
    assert_eq!(c.user_email, "7@example.test");
}

#[test]
fn render_maps_each_state() {
    assert_eq!(render(&ListState::Loading), ListView::Loading);
    assert_eq!(render(&ListState::Failed), ListView::Error(LOAD_ERROR_MESSAGE.to_owned()));
    assert_eq!(render(&ListState::Loaded(Vec::new())), ListView::Empty);

    let view = render(&ListState::Loaded(vec![monitor("1", "https://a.test"), monitor("2", "https://b.test")]));
    assert_eq!(view.cards().len(), 2);
    assert_eq!(view.cards()[1].element_id, "monitor-2");
    assert_eq!(view.message(), None);
}

#[test]
fn view_messages() {
    assert_eq!(ListView::Loading.message(), Some(LOADING_MESSAGE));
    assert_eq!(ListView::Empty.message(), Some(EMPTY_MESSAGE));
    assert_eq!(ListView::Error("boom".into()).message(), Some("boom"));
    assert!(ListView::Empty.cards().is_empty());
}

#[test]
fn diff_of_equal_views_is_empty() {
    assert!(diff(&ListView::Empty, &ListView::Empty).is_empty());
    assert!(diff(&cards(&["1", "2"]), &cards(&["1", "2"])).is_empty());
}

#[test]
fn diff_to_placeholders_is_single_patch() {
    assert_eq!(assert_converges(&cards(&["1"]), &ListView::Empty), vec![ViewPatch::ShowEmpty]);
    assert_eq!(assert_converges(&ListView::Empty, &ListView::Loading), vec![ViewPatch::ShowLoading]);
    assert_eq!(
        assert_converges(&ListView::Loading, &ListView::Error("x".into())),
        vec![ViewPatch::ShowError("x".into())]
    );
}

#[test]
fn diff_from_placeholder_clears_then_appends() {
    let patches = assert_converges(&ListView::Empty, &cards(&["1", "2"]));
    assert_eq!(patches.len(), 3);
    assert_eq!(patches[0], ViewPatch::ClearPlaceholder);
    assert!(matches!(&patches[1], ViewPatch::AppendCard(c) if c.element_id == "monitor-1"));
    assert!(matches!(&patches[2], ViewPatch::AppendCard(c) if c.element_id == "monitor-2"));
}

#[test]
fn diff_appends_new_card_at_end() {
    let patches = assert_converges(&cards(&["1", "2"]), &cards(&["1", "2", "3"]));
    assert_eq!(patches.len(), 1);
    assert!(matches!(&patches[0], ViewPatch::AppendCard(c) if c.element_id == "monitor-3"));
}

#[test]
fn diff_removes_only_the_targeted_card() {
    let patches = assert_converges(&cards(&["1", "2", "3"]), &cards(&["1", "3"]));
    assert_eq!(patches, vec![ViewPatch::RemoveCard("monitor-2".into())]);
}

#[test]
fn diff_replaces_when_order_changes() {
    let patches = assert_converges(&cards(&["1", "2"]), &cards(&["2", "1"]));
    assert!(matches!(patches.as_slice(), [ViewPatch::ReplaceCards(_)]));
}

#[test]
fn diff_replaces_changed_card_in_the_middle() {
    let prev = ListView::Cards(vec![card("1", "https://a.test"), card("2", "https://b.test")]);
    let next = ListView::Cards(vec![card("1", "https://changed.test"), card("2", "https://b.test")]);
    let patches = assert_converges(&prev, &next);
    assert!(matches!(patches.as_slice(), [ViewPatch::ReplaceCards(_)]));
}

#[test]
fn diff_swaps_changed_last_card_in_place() {
    let prev = ListView::Cards(vec![card("1", "https://a.test"), card("2", "https://b.test")]);
    let next = ListView::Cards(vec![card("1", "https://a.test"), card("2", "https://changed.test")]);
    let patches = assert_converges(&prev, &next);
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0], ViewPatch::RemoveCard("monitor-2".into()));
    assert!(matches!(&patches[1], ViewPatch::AppendCard(c) if c.url == "https://changed.test"));
}

#[test]
fn diff_handles_duplicate_element_ids() {
    let dup = card("1", "https://a.test");
    let prev = ListView::Cards(vec![dup.clone(), dup.clone()]);
    let next = ListView::Cards(vec![dup]);
    assert_converges(&prev, &next);

    let prev = ListView::Cards(vec![card("1", "https://a.test"), card("1", "https://b.test")]);
    let next = ListView::Cards(vec![card("1", "https://a.test")]);
    let patches = assert_converges(&prev, &next);
    assert!(matches!(patches.as_slice(), [ViewPatch::ReplaceCards(_)]));
}

#[test]
fn apply_remove_of_missing_card_is_noop() {
    let mut view = cards(&["1"]);
    view.apply(&ViewPatch::RemoveCard("monitor-9".into()));
    assert_eq!(view, cards(&["1"]));

    let mut placeholder = ListView::Empty;
    placeholder.apply(&ViewPatch::RemoveCard("monitor-1".into()));
    assert_eq!(placeholder, ListView::Empty);
}

#[test]
fn apply_append_onto_placeholder_starts_card_list() {
    let mut view = ListView::Error("x".into());
    view.apply(&ViewPatch::AppendCard(card("1", "https://a.test")));
    assert_eq!(view, cards(&["1"]));
}

#[test]
fn submit_state_labels() {
    assert_eq!(SubmitState::default(), SubmitState::Idle);
    assert_eq!(SubmitState::Idle.label(), "Start Monitoring");
    assert!(!SubmitState::Idle.disabled());
    assert_eq!(SubmitState::Pending.label(), "Adding...");
    assert!(SubmitState::Pending.disabled());
}
