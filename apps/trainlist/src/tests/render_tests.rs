use super::*;
use chrono::TimeZone;
use client_core::{Gazetteer, LocationTable, SessionMessage, TerritoryFilter, ViewCommand};
use ratatui::backend::TestBackend;
use shared::{
    domain::{BlockId, TerritoryId, TrainId},
    protocol::{SimulationState, TrainData},
};

fn list() -> TrainList {
    TrainList::new(
        Gazetteer::run8(LocationTable::default()),
        TerritoryFilter::default(),
        SortKey::ascending(Column::LeadUnit),
    )
}

fn screen() -> Screen<TestBackend> {
    Screen::new(Terminal::new(TestBackend::new(160, 12)).expect("terminal"))
}

fn train(id: u32, initials: &str, number: u32, symbol: &str, block: i32) -> SessionMessage {
    let mut data = TrainData::new(TrainId(id));
    data.railroad_initials = initials.to_string();
    data.loco_number = number;
    data.symbol = symbol.to_string();
    data.block = BlockId(block);
    data.speed_mph = 42.0;
    SessionMessage::TrainUpdate(data)
}

fn heartbeat() -> SessionMessage {
    SessionMessage::Heartbeat(SimulationState {
        is_client: false,
        simulation_time: Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
            .single()
            .expect("time"),
    })
}

fn lines(screen: &Screen<TestBackend>) -> Vec<String> {
    let buffer = screen.terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            let line: String = (0..buffer.area.width)
                .map(|x| buffer.get(x, y).symbol())
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

#[test]
fn table_lists_rows_in_view_order() {
    let mut list = list();
    let mut screen = screen();
    list.apply(&train(2, "UP", 4410, "MNYBA", 1501), &mut screen);
    list.apply(&train(1, "BNSF", 7702, "ZLACWSP", 1104), &mut screen);
    list.apply(&heartbeat(), &mut screen);
    screen.refresh(&list);

    let lines = lines(&screen);
    assert_eq!(
        lines[0],
        "Simulation time 2024-05-01 08:30:00 | 2 trains | sorted by Lead Unit (ascending)"
    );
    assert!(lines[1].starts_with("Lead Unit ▲"));
    assert!(lines[1].ends_with("Crew"));
    assert!(lines[2].starts_with("BNSF7702"));
    assert!(lines[2].contains("ZLACWSP"));
    assert!(lines[2].contains("Needles"));
    assert!(lines[3].starts_with("UP4410"));
    assert!(lines[3].contains("Barstow"));
    assert!(lines.iter().any(|line| line.contains("F2 Needles [x]")));
    assert!(lines.iter().any(|line| line.contains("0 Unknown [x]")));
}

#[test]
fn empty_list_shows_placeholder_clock() {
    let list = list();
    let mut screen = screen();
    screen.refresh(&list);
    let lines = lines(&screen);
    assert!(lines[0].starts_with("Simulation time -- | 0 trains |"));
    assert!(lines[2].is_empty());
}

#[test]
fn screen_redraws_only_after_a_change() {
    let mut list = list();
    let mut screen = screen();
    screen.refresh(&list);
    assert!(!screen.pending);

    screen.refresh(&list);
    assert!(!screen.pending);

    list.apply(&train(1, "BNSF", 7702, "ZLACWSP", 1501), &mut screen);
    assert!(screen.pending);
    screen.refresh(&list);
    assert!(!screen.pending);
    assert!(lines(&screen)[2].starts_with("BNSF7702"));
}

#[test]
fn commands_show_up_on_the_next_draw() {
    let mut list = list();
    let mut screen = screen();
    list.apply(&train(1, "BNSF", 7702, "ZLACWSP", 1501), &mut screen);
    list.apply(&train(2, "UP", 4410, "MNYBA", 1104), &mut screen);
    screen.refresh(&list);

    list.execute(ViewCommand::SortBy(Column::LeadUnit), &mut screen);
    screen.refresh(&list);
    let lines_after_sort = lines(&screen);
    assert!(lines_after_sort[0].ends_with("sorted by Lead Unit (descending)"));
    assert!(lines_after_sort[1].starts_with("Lead Unit ▼"));
    assert!(lines_after_sort[2].starts_with("UP4410"));

    list.execute(ViewCommand::ToggleTerritory(TerritoryId(150)), &mut screen);
    screen.refresh(&list);
    let lines_after_toggle = lines(&screen);
    assert!(lines_after_toggle[0].contains("| 1 trains |"));
    assert!(lines_after_toggle[2].starts_with("UP4410"));
    assert!(lines_after_toggle[3].is_empty());
    assert!(lines_after_toggle
        .iter()
        .any(|line| line.contains("F5 Barstow [ ]")));
}

#[test]
fn toggling_a_territory_with_no_rows_still_redraws_the_filter() {
    let mut list = list();
    let mut screen = screen();
    screen.refresh(&list);

    list.execute(ViewCommand::ToggleUnknown, &mut screen);
    assert!(screen.pending);
    screen.refresh(&list);
    assert!(lines(&screen)
        .iter()
        .any(|line| line.contains("0 Unknown [ ]")));
}
