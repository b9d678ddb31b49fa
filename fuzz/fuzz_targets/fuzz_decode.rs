#![no_main]
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use wtg::{Decoder, Document, FunctionKind, Signature, TriggerData};

fn trigger_data() -> &'static TriggerData {
    static DATA: OnceLock<TriggerData> = OnceLock::new();
    DATA.get_or_init(|| {
        let mut data = TriggerData::new();
        data.insert(FunctionKind::Event, "MapInitializationEvent", Signature::default());
        data.insert(FunctionKind::Action, "DoNothing", Signature::default());
        data.insert(FunctionKind::Action, "IfThenElseMultiple", Signature::default());
        data.insert(
            FunctionKind::Action,
            "SetVariable",
            Signature::new(["AnyGlobal", "VarAsString_Real"]),
        );
        data.insert(
            FunctionKind::Condition,
            "OperatorCompareInteger",
            Signature::new(["integer", "ComparisonOperator", "integer"]),
        );
        data.insert(
            FunctionKind::Call,
            "OperatorInt",
            Signature::new(["integer", "ArithmeticOperator", "integer"]).returns("integer"),
        );
        data.insert(
            FunctionKind::Call,
            "GetPlayersAll",
            Signature::default().returns("force"),
        );
        data
    })
}

fuzz_target!(|data: &[u8]| {
    let decoder = Decoder::builder().verify_references(false).build();
    let Ok(doc) = decoder.decode(data, trigger_data()) else {
        return;
    };

    // Anything that decodes re-encodes to an equivalent document
    let encoded = doc.to_vec().unwrap();
    let redecoded = decoder.decode(&encoded, trigger_data()).unwrap();
    assert_eq!(doc, redecoded);
    let _ = Document::diagnose(&doc, trigger_data());
    let _ = wtg::TriggerData::from_text(data);
});
