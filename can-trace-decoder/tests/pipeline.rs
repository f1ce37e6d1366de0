//! End-to-end tests: log text in, decoded samples out

use can_trace_decoder::{
    decode, parse, DecodeEngine, Decoder, DecoderConfig, DropReason, LineFormat, LogParser,
    MalformedCause, RawFrame, SignalDescriptor, SignalDictionary, SignalExtractor,
};

const DEMO_LOG: &str = "\
0.001,0x0CFF050,00,10,34,12,00,00,00,00
0.101,0x0CFF050,10,10,40,12,00,00,00,00
0.201,0x0CFF050,20,10,48,12,00,00,00,00
0.301,0x0CFF050,30,10,58,12,00,00,00,00
0.401,0x0CFF050,40,10,58,12,00,00,00,00
0.501,0x0CFF050,50,10,60,12,00,00,00,00";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_demo_scenario() {
    init_logging();
    let dictionary = SignalDictionary::demo();
    let frames = parse("0.001,0x0CFF050,00,10,34,12,00,00,00,00");
    let samples = decode(&frames, &dictionary);

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].timestamp, 0.001);
    assert_eq!(samples[0].value("VehicleSpeed"), Some(40.96));
    assert_eq!(samples[0].value("EngineRPM"), Some(1165.0));
    assert_eq!(
        samples[0].values.names().collect::<Vec<_>>(),
        vec!["VehicleSpeed", "EngineRPM"]
    );
}

#[test]
fn test_demo_log_series() {
    let decoder = Decoder::new(SignalDictionary::demo());
    let samples = decoder.decode_text(DEMO_LOG);

    assert_eq!(samples.len(), 6);
    // Byte 0 steps by 0x10 -> speed steps by 0.16 km/h
    let last = samples.last().unwrap();
    assert_eq!(last.timestamp, 0.501);
    assert_eq!(last.value("VehicleSpeed"), Some(0x1050 as f64 * 0.01));
    assert_eq!(last.value("EngineRPM"), Some(0x1260 as f64 * 0.25));
}

#[test]
fn test_bracketed_and_delimited_frames_match() {
    let bracketed = parse("(0.001) can0 0CFF050#0010341200000000");
    let delimited = parse("0.001,0x0CFF050,00,10,34,12,00,00,00,00");
    assert_eq!(bracketed, delimited);

    let dictionary = SignalDictionary::demo();
    assert_eq!(decode(&bracketed, &dictionary), decode(&delimited, &dictionary));
}

#[test]
fn test_order_preserved_and_unknown_ids_removed() {
    let text = "\
(0.40) can0 0CFF050#0100
0.10,0x0CFF050,02,00
0.30 0x123 FF FF
(0.20) can1 7FF#00
0.20,0x0CFF050,03,00
";
    let frames = LogParser::parse(text);
    let times: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
    assert_eq!(times, vec![0.10, 0.20, 0.20, 0.30, 0.40]);
    // Equal timestamps keep input order: the 0x7FF line came first
    assert_eq!(frames[1].id, 0x7FF);

    let dictionary = SignalDictionary::demo();
    let samples = DecodeEngine::new(&dictionary).decode(&frames);
    let decoded: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.timestamp, s.value("VehicleSpeed").unwrap()))
        .collect();
    assert_eq!(decoded, vec![(0.10, 0.02), (0.20, 0.03), (0.40, 0.01)]);
}

#[test]
fn test_unknown_id_does_not_disturb_neighbours() {
    let dictionary = SignalDictionary::demo();
    let with_unknown = parse("0.1,0x0CFF050,01\n0.2,0x555,FF,FF,FF,FF\n0.3,0x0CFF050,02");
    let without_unknown = parse("0.1,0x0CFF050,01\n0.3,0x0CFF050,02");

    assert_eq!(
        decode(&with_unknown, &dictionary),
        decode(&without_unknown, &dictionary)
    );
}

#[test]
fn test_malformed_line_resilience() {
    let decoder = Decoder::new(SignalDictionary::demo());
    let run = decoder.decode_text_with_report(
        "0.001,0x0CFF050,00,10,34,12,00,00,00,00\n0.002,0x0CFF050,00,XY,34,12,00,00,00,00",
    );

    assert_eq!(run.samples.len(), 1);
    assert_eq!(run.samples[0].timestamp, 0.001);
    assert_eq!(run.parse.dropped.len(), 1);
    assert_eq!(run.parse.dropped[0].line_number, 2);
    assert_eq!(
        run.parse.dropped[0].reason,
        DropReason::MalformedLine {
            format: LineFormat::Delimited,
            cause: MalformedCause::BadByte,
        }
    );
}

#[test]
fn test_pathological_input_yields_nothing() {
    let decoder = Decoder::new(SignalDictionary::demo());
    for text in ["", "\n\n", "#", "(x) can0 1#00", "a b c d", ",,,,", "0x1"] {
        assert!(decoder.decode_text(text).is_empty(), "input {:?}", text);
    }
}

#[test]
fn test_scaling_against_hand_computed_values() {
    let dictionary = SignalDictionary::builder()
        .frame(
            0x18FEEE00,
            vec![
                // J1939 engine coolant temperature style: 1 degC/bit, -40 offset
                SignalDescriptor::new("CoolantTemp", 0, 8)
                    .with_scaling(1.0, -40.0)
                    .with_unit("degC"),
                // 12-bit window straddling bytes 1 and 2 at an odd offset
                SignalDescriptor::new("Odd12", 10, 12).with_scaling(0.1, 5.0),
                SignalDescriptor::new("Bit23", 23, 1),
            ],
        )
        .build()
        .unwrap();

    let frames = parse("(5.0) can0 18FEEE00#78F3A5");
    let sample = &decode(&frames, &dictionary)[0];

    let payload = [0x78u8, 0xF3, 0xA5];
    let odd12 = SignalExtractor::extract_raw(&payload, 10, 12);
    // 0xA5F378 >> 10 = 0x297C, masked to 12 bits = 0x97C
    assert_eq!(odd12, 0x97C);

    assert_eq!(sample.value("CoolantTemp"), Some(0x78 as f64 - 40.0));
    assert_eq!(sample.value("Odd12"), Some(0x97C as f64 * 0.1 + 5.0));
    assert_eq!(sample.value("Bit23"), Some(1.0));
}

#[test]
fn test_overlapping_and_out_of_range_windows() {
    let dictionary = SignalDictionary::builder()
        .frame(
            0x10,
            vec![
                SignalDescriptor::new("Word", 0, 16),
                SignalDescriptor::new("LowByte", 0, 8),
                SignalDescriptor::new("Beyond", 56, 16),
            ],
        )
        .build()
        .unwrap();

    let sample = &Decoder::new(dictionary).decode_text("1.0 0x10 34 12")[0];
    assert_eq!(sample.value("Word"), Some(0x1234 as f64));
    assert_eq!(sample.value("LowByte"), Some(0x34 as f64));
    assert_eq!(sample.value("Beyond"), Some(0.0));
}

#[test]
fn test_strict_payload_option() {
    let text = "0.1,0x0CFF050,00,10\n0.2,0x0CFF050,00,10,34,12,00,00,00,00";

    let permissive = Decoder::new(SignalDictionary::demo()).decode_text(text);
    assert_eq!(permissive.len(), 2);
    assert_eq!(permissive[0].value("EngineRPM"), Some(0.0));

    let strict = Decoder::new(SignalDictionary::demo())
        .with_config(DecoderConfig::new().with_min_payload_len(8))
        .decode_text_with_report(text);
    assert_eq!(strict.samples.len(), 1);
    assert_eq!(strict.samples[0].timestamp, 0.2);
    assert_eq!(strict.decode.short_payload, 1);
}

#[test]
fn test_shared_dictionary_across_threads() {
    let dictionary = SignalDictionary::demo();
    let frames: Vec<RawFrame> = parse(DEMO_LOG);
    let expected = decode(&frames, &dictionary);

    let shared = &dictionary;
    std::thread::scope(|scope| {
        let handles: Vec<_> = frames
            .chunks(2)
            .map(|chunk| scope.spawn(move || DecodeEngine::new(shared).decode(chunk)))
            .collect();

        let merged: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        assert_eq!(merged, expected);
    });
}

#[test]
fn test_samples_serialize_to_json() {
    let samples = Decoder::new(SignalDictionary::demo())
        .decode_text("(0.001) can0 0CFF050#0010341200000000");
    let json = serde_json::to_value(&samples).unwrap();

    assert_eq!(json[0]["timestamp"], 0.001);
    assert_eq!(json[0]["values"]["VehicleSpeed"], 40.96);
    assert_eq!(json[0]["values"]["EngineRPM"], 1165.0);
}
