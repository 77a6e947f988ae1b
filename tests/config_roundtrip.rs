//! Scoring parameters are meant to live in a config file between runs;
//! check they survive a JSON round trip and still validate afterward.

use gaba_core::{Bandwidth, EngineContext, Model, ScoringParams};

fn sample_params(model: Model, gap_open: i32, gap_extend: i32) -> ScoringParams {
    ScoringParams {
        model,
        bandwidth: Bandwidth::Bw32,
        match_reward: 2,
        mismatch_penalty: 3,
        gap_open,
        gap_extend,
        x_drop: 50,
        filter_len: 4,
    }
}

#[test]
fn linear_params_round_trip_through_json() {
    let params = sample_params(Model::Linear, 1, 2);
    let json = serde_json::to_string(&params).unwrap();
    let restored: ScoringParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, restored);
    assert!(EngineContext::new(restored).is_ok());
}

#[test]
fn affine_params_round_trip_through_json() {
    // Affine requires gap_extend <= gap_open, the reverse of linear's usual shape.
    let params = sample_params(Model::Affine, 2, 1);
    let json = serde_json::to_string(&params).unwrap();
    let restored: ScoringParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, restored);
    assert!(EngineContext::new(restored).is_ok());
}

#[test]
fn malformed_json_is_rejected() {
    let bad = r#"{"model":"Linear","bandwidth":"Bw32"}"#; // missing required fields
    assert!(serde_json::from_str::<ScoringParams>(bad).is_err());
}
