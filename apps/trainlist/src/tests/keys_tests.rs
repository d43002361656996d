use super::*;

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn territories() -> Vec<TerritoryId> {
    vec![TerritoryId(100), TerritoryId(110), TerritoryId(150)]
}

#[test]
fn digits_sort_by_column() {
    assert_eq!(
        key_action(press(KeyCode::Char('1')), &territories()),
        Some(KeyAction::View(ViewCommand::SortBy(Column::LeadUnit)))
    );
    assert_eq!(
        key_action(press(KeyCode::Char('9')), &territories()),
        Some(KeyAction::View(ViewCommand::SortBy(Column::Crew)))
    );
    assert_eq!(
        key_action(press(KeyCode::Char('0')), &territories()),
        Some(KeyAction::View(ViewCommand::ToggleUnknown))
    );
}

#[test]
fn function_keys_toggle_known_territories() {
    assert_eq!(
        key_action(press(KeyCode::F(3)), &territories()),
        Some(KeyAction::View(ViewCommand::ToggleTerritory(TerritoryId(150))))
    );
    assert_eq!(key_action(press(KeyCode::F(4)), &territories()), None);
    assert_eq!(key_action(press(KeyCode::F(0)), &territories()), None);
}

#[test]
fn quit_keys() {
    assert_eq!(
        key_action(press(KeyCode::Char('q')), &territories()),
        Some(KeyAction::Quit)
    );
    assert_eq!(key_action(press(KeyCode::Esc), &territories()), Some(KeyAction::Quit));
    assert_eq!(
        key_action(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &territories()
        ),
        Some(KeyAction::Quit)
    );
    assert_eq!(key_action(press(KeyCode::Char('c')), &territories()), None);
}

#[test]
fn releases_are_ignored() {
    let mut key = press(KeyCode::Char('1'));
    key.kind = KeyEventKind::Release;
    assert_eq!(key_action(key, &territories()), None);
}

#[test]
fn key_presses_resort_and_purge_the_list() {
    use client_core::{
        Gazetteer, LocationTable, NullObserver, SessionMessage, SortKey, TerritoryFilter,
        TrainList,
    };
    use shared::{domain::BlockId, protocol::TrainData};

    let mut list = TrainList::new(
        Gazetteer::run8(LocationTable::default()),
        TerritoryFilter::default(),
        SortKey::ascending(Column::Symbol),
    );
    let mut observer = NullObserver;
    for (id, symbol, block) in [(1, "A", 1501), (2, "B", 1104), (3, "C", -1)] {
        let mut data = TrainData::new(shared::domain::TrainId(id));
        data.symbol = symbol.to_string();
        data.block = BlockId(block);
        list.apply(&SessionMessage::TrainUpdate(data), &mut observer);
    }
    let known = list.gazetteer().territories().known_territories();

    for key in [KeyCode::Char('2'), KeyCode::F(5), KeyCode::Char('0')] {
        if let Some(KeyAction::View(command)) = key_action(press(key), &known) {
            list.execute(command, &mut observer);
        }
    }

    let order: Vec<u32> = list.order().into_iter().map(|id| id.0).collect();
    assert_eq!(order, [2]);
    assert_eq!(list.sort_key().column, Column::Symbol);
    assert_eq!(
        list.sort_key().direction,
        client_core::SortDirection::Descending
    );
}
