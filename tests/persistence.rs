//! Sufficient statistics survive a serialization round trip and keep merging.

use anyhow::Result;
use monofold::compose::{Branch, Fanout};
use monofold::{
    Covariance, Histogram, KbnSum, P2Quantile, Reducer, ReservoirQuantile, Welford, fold,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

fn via_postcard<T: Serialize + DeserializeOwned>(value: &T) -> Result<T> {
    let bytes = postcard::to_allocvec(value)?;
    Ok(postcard::from_bytes(&bytes)?)
}

fn via_json<T: Serialize + DeserializeOwned>(value: &T) -> Result<T> {
    let text = serde_json::to_string(value)?;
    Ok(serde_json::from_str(&text)?)
}

#[test]
fn welford_resumes_after_transport() -> Result<()> {
    let data: Vec<f64> = (0..100).map(f64::from).collect();
    let local = fold(&Welford::new(), data[..60].iter().copied());
    let remote = via_postcard(&fold(&Welford::new(), data[60..].iter().copied()))?;

    let merged = local.merged(&remote)?;
    let whole = fold(&Welford::new(), data.iter().copied());
    assert_eq!(merged.count(), 100);
    assert!((merged.mean() - whole.mean()).abs() < 1e-12);
    assert!((merged.variance() - whole.variance()).abs() < 1e-9);
    Ok(())
}

#[test]
fn kbn_keeps_its_correction_term() -> Result<()> {
    let s = fold(&KbnSum::new(), [1e16, 1.0, 1.0]);
    let back = via_json(&s)?;
    assert_eq!(back, s);
    assert_eq!(back.correction_component(), s.correction_component());
    Ok(())
}

#[test]
fn histogram_and_covariance_round_trip() -> Result<()> {
    let mut h = Histogram::new(-1.0, 1.0, 8)?;
    h.update_all([-2.0, -0.5, 0.0, 0.3, 0.9, 3.0, f64::NAN]);
    assert_eq!(via_postcard(&h)?, h);

    let c = fold(&Covariance::new(), [(1.0, 1.5), (2.0, 2.0), (4.0, 5.0)]);
    assert_eq!(via_postcard(&c)?, c);
    Ok(())
}

#[test]
fn histogram_rejects_invalid_serialized_state() -> Result<()> {
    let no_bins = json!({
        "min": 0.0, "max": 1.0, "width": 0.1, "counts": [],
        "underflow": 0, "overflow": 0, "nan": 0, "total": 0
    });
    assert!(serde_json::from_value::<Histogram>(no_bins).is_err());

    let bad_bounds = json!({
        "min": 1.0, "max": 0.0, "width": 0.5, "counts": [0, 0],
        "underflow": 0, "overflow": 0, "nan": 0, "total": 0
    });
    assert!(serde_json::from_value::<Histogram>(bad_bounds).is_err());

    let bad_total = json!({
        "min": 0.0, "max": 1.0, "width": 0.5, "counts": [1, 2],
        "underflow": 1, "overflow": 0, "nan": 0, "total": 2
    });
    assert!(serde_json::from_value::<Histogram>(bad_total).is_err());

    let valid = json!({
        "min": 0.0, "max": 1.0, "width": 0.5, "counts": [1, 2],
        "underflow": 1, "overflow": 0, "nan": 4, "total": 4
    });
    let h: Histogram = serde_json::from_value(valid)?;
    assert_eq!(h.bin_count(1), 2);
    assert_eq!(h.nan_count(), 4);
    assert_eq!(h.bin_for(0.75), Some(1));
    Ok(())
}

#[test]
fn quantile_sketches_continue_after_round_trip() -> Result<()> {
    let data: Vec<f64> = (0..500).map(|i| f64::from((i * 37) % 500)).collect();

    let p2 = fold(&P2Quantile::new(0.75)?, data.iter().copied());
    let mut restored = via_postcard(&p2)?;
    let mut original = p2;
    restored.update(250.0);
    original.update(250.0);
    assert_eq!(restored, original);

    let res = fold(&ReservoirQuantile::new(64, 9)?, data.iter().copied());
    let mut restored = via_postcard(&res)?;
    let mut original = res;
    restored.update_all([1.0, 2.0, 3.0]);
    original.update_all([1.0, 2.0, 3.0]);
    // The RNG state travels with the sample, so both copies stay in lockstep.
    assert_eq!(restored.sample(), original.sample());
    Ok(())
}

#[test]
fn composite_state_round_trips() -> Result<()> {
    let f = fold(&Fanout::new((KbnSum::new(), Welford::new())), [1.0, 2.0, 4.0]);
    let back: Fanout<(KbnSum, Welford)> = via_postcard(&f)?;
    assert_eq!(back.result(), f.result());

    let b: Branch<u64, String> = Branch::Second("tail".to_string());
    assert_eq!(via_json(&b)?, b);
    Ok(())
}

#[test]
fn welford_from_parts_matches_serialized_form() -> Result<()> {
    let w = fold(&Welford::new(), [3.0, 5.0, 10.0]);
    let rebuilt = Welford::from_parts(w.count(), w.mean(), w.sum_of_squares());
    let a = via_json(&rebuilt)?;
    assert_eq!(a.count(), 3);
    assert!((a.variance() - w.variance()).abs() < 1e-12);
    Ok(())
}
