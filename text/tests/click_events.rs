use std::io::Cursor;

use nbt::{
    io::{Compression, NbtReader, NbtWriter},
    snbt,
    NbtCompound,
    NbtRepr,
};
use nbt_text::{click_event, ClickAction, ClickEvent};

#[test]
fn survives_binary_round_trip() {
    let root = NbtCompound::builder()
        .put_compound("clickEvent", click_event::serialize(&ClickEvent::run_command("/spawn")))
        .build();

    let mut buffer = Vec::new();
    NbtWriter::new()
        .write(&root, &mut buffer, Compression::Gzip)
        .expect("Failed to write root");
    let read = NbtReader::new()
        .read(Cursor::new(buffer), Compression::Gzip)
        .expect("Failed to read root");

    let event = read
        .get_compound("clickEvent")
        .and_then(click_event::deserialize)
        .expect("Missing click event");
    assert_eq!(event.action(), ClickAction::RunCommand);
    assert_eq!(event.value(), "/spawn");
}

#[test]
fn json_and_nbt_agree() {
    let json = r#"{"action":"open_url","value":"https://example.com"}"#;
    let event = ClickEvent::from_json(json).expect("Failed to parse JSON");

    let from_snbt = ClickEvent::from_nbt(
        &snbt::parse("{action: open_url, value: 'https://example.com'}").expect("Failed to parse SNBT"),
    )
    .expect("Failed to read click event");

    assert_eq!(event, from_snbt);
    assert_eq!(from_snbt.to_json(), json);
}
