#![no_main]
use libfuzzer_sys::fuzz_target;
use tempo_tarifs::Snapshot;
use tempo_tarifs::tempo::ENDPOINT_CATALOG;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Same payload under every endpoint, then as a whole snapshot
    let snapshot: Snapshot = ENDPOINT_CATALOG
        .iter()
        .map(|(name, _)| (*name, value.clone()))
        .collect();
    let first = tempo_tarifs::measurements::render_all(&snapshot);
    let second = tempo_tarifs::measurements::render_all(&snapshot);
    assert_eq!(first.len(), second.len());

    if let Ok(snapshot) = serde_json::from_value::<Snapshot>(value) {
        let _ = tempo_tarifs::measurements::render_all(&snapshot);
    }
});
